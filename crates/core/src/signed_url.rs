//! Time-limited signed URLs for storage objects.
//!
//! A signature is the HMAC-SHA256 of `"{path}\n{expires}"`, followed by
//! `"\n{filename}"` when the URL names a download filename. `expires` is a
//! Unix timestamp in seconds. The storage endpoint recomputes the signature
//! and refuses the request once the timestamp has passed.

use chrono::{Duration, TimeZone, Utc};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha256;

use crate::hashing::{hex_decode, hex_encode};
use crate::types::Timestamp;

type HmacSha256 = Hmac<Sha256>;

/// Default lifetime of a signed URL in seconds.
pub const DEFAULT_SIGNED_URL_TTL_SECS: i64 = 60;

/// Route prefix the storage handler is mounted under.
pub const STORAGE_ROUTE_PREFIX: &str = "/storage";

/// Reasons a signed request is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("Signed URL has expired")]
    Expired,
    #[error("Signed URL signature is invalid")]
    Invalid,
}

/// A signed URL together with the instant it stops working.
#[derive(Debug, Clone, Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: Timestamp,
}

/// Signs and verifies storage URLs with a shared secret.
#[derive(Clone)]
pub struct UrlSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for UrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UrlSigner").finish_non_exhaustive()
    }
}

impl UrlSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, path: &str, expires: i64, filename: Option<&str>) -> HmacSha256 {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts any key length");
        mac.update(path.as_bytes());
        mac.update(b"\n");
        mac.update(expires.to_string().as_bytes());
        if let Some(filename) = filename {
            mac.update(b"\n");
            mac.update(filename.as_bytes());
        }
        mac
    }

    /// Hex signature for `path` (and the optional download `filename`) valid
    /// until `expires` (Unix seconds).
    pub fn sign(&self, path: &str, expires: i64, filename: Option<&str>) -> String {
        hex_encode(self.mac(path, expires, filename).finalize().into_bytes())
    }

    /// Build a full URL for `path` under `base_url`, valid for `ttl_secs`.
    ///
    /// `path` must already have passed [`crate::storage::validate_object_path`]
    /// and `filename` [`crate::storage::validate_download_filename`]; both are
    /// embedded without percent-encoding.
    pub fn signed_url(
        &self,
        base_url: &str,
        path: &str,
        filename: Option<&str>,
        ttl_secs: i64,
        now: Timestamp,
    ) -> SignedUrl {
        let expires_at = now + Duration::seconds(ttl_secs);
        let expires = expires_at.timestamp();
        let signature = self.sign(path, expires, filename);
        let base = base_url.trim_end_matches('/');
        let filename_param = filename
            .map(|f| format!("&filename={f}"))
            .unwrap_or_default();
        SignedUrl {
            url: format!(
                "{base}{STORAGE_ROUTE_PREFIX}/{path}?expires={expires}{filename_param}&signature={signature}"
            ),
            expires_at: Utc
                .timestamp_opt(expires, 0)
                .single()
                .unwrap_or(expires_at),
        }
    }

    /// Check a signature. Expiry is checked first so stale links report
    /// `Expired` even when tampered.
    pub fn verify(
        &self,
        path: &str,
        expires: i64,
        filename: Option<&str>,
        signature: &str,
        now: Timestamp,
    ) -> Result<(), SignatureError> {
        if expires <= now.timestamp() {
            return Err(SignatureError::Expired);
        }
        let provided = hex_decode(signature).ok_or(SignatureError::Invalid)?;
        self.mac(path, expires, filename)
            .verify_slice(&provided)
            .map_err(|_| SignatureError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn signer() -> UrlSigner {
        UrlSigner::new("test-signing-secret")
    }

    #[test]
    fn signed_url_verifies_before_expiry() {
        let now = Utc::now();
        let signed = signer().signed_url("https://cdn.example.com/", "walls/a.jpg", None, 60, now);
        assert!(signed
            .url
            .starts_with("https://cdn.example.com/storage/walls/a.jpg?expires="));

        let expires = signed.expires_at.timestamp();
        let signature = signed.url.rsplit("signature=").next().unwrap();
        assert_matches!(signer().verify("walls/a.jpg", expires, None, signature, now), Ok(()));
    }

    #[test]
    fn expired_signature_is_rejected() {
        let now = Utc::now();
        let expires = now.timestamp() - 1;
        let signature = signer().sign("walls/a.jpg", expires, None);
        assert_matches!(
            signer().verify("walls/a.jpg", expires, None, &signature, now),
            Err(SignatureError::Expired)
        );
    }

    #[test]
    fn tampered_path_is_rejected() {
        let now = Utc::now();
        let expires = now.timestamp() + 60;
        let signature = signer().sign("walls/a.jpg", expires, None);
        assert_matches!(
            signer().verify("walls/b.jpg", expires, None, &signature, now),
            Err(SignatureError::Invalid)
        );
    }

    #[test]
    fn extended_expiry_is_rejected() {
        let now = Utc::now();
        let expires = now.timestamp() + 60;
        let signature = signer().sign("walls/a.jpg", expires, None);
        assert_matches!(
            signer().verify("walls/a.jpg", expires + 3600, None, &signature, now),
            Err(SignatureError::Invalid)
        );
    }

    #[test]
    fn different_secret_is_rejected() {
        let now = Utc::now();
        let expires = now.timestamp() + 60;
        let signature = UrlSigner::new("other").sign("walls/a.jpg", expires, None);
        assert_matches!(
            signer().verify("walls/a.jpg", expires, None, &signature, now),
            Err(SignatureError::Invalid)
        );
    }

    #[test]
    fn non_hex_signature_is_rejected() {
        let now = Utc::now();
        assert_matches!(
            signer().verify("walls/a.jpg", now.timestamp() + 60, None, "not-hex", now),
            Err(SignatureError::Invalid)
        );
    }

    #[test]
    fn filename_is_covered_by_the_signature() {
        let now = Utc::now();
        let signed = signer().signed_url(
            "https://cdn.example.com",
            "walls/a.jpg",
            Some("dunes-3840x2160.jpg"),
            60,
            now,
        );
        assert!(signed.url.contains("&filename=dunes-3840x2160.jpg&signature="));

        let expires = signed.expires_at.timestamp();
        let signature = signed.url.rsplit("signature=").next().unwrap();
        assert_matches!(
            signer().verify("walls/a.jpg", expires, Some("dunes-3840x2160.jpg"), signature, now),
            Ok(())
        );
        assert_matches!(
            signer().verify("walls/a.jpg", expires, Some("renamed.jpg"), signature, now),
            Err(SignatureError::Invalid)
        );
        assert_matches!(
            signer().verify("walls/a.jpg", expires, None, signature, now),
            Err(SignatureError::Invalid)
        );
    }
}
