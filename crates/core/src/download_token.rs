//! Download token generation and session lifecycle.
//!
//! A download token is a short-lived opaque string handed to the browser
//! after the access check passes. Only its SHA-256 hash is persisted in
//! `download_sessions`, so a leaked table cannot be replayed against the
//! storage endpoint.

use rand::Rng;
use serde::Serialize;

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of the generated token (alphanumeric characters).
pub const TOKEN_LENGTH: usize = 48;

/// Default lifetime of a download token in seconds.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 300;

// ---------------------------------------------------------------------------
// Generation
// ---------------------------------------------------------------------------

/// A freshly generated token. `plaintext` goes to the client exactly once.
pub struct GeneratedToken {
    pub plaintext: String,
    pub hash: String,
}

/// Generate a new random download token.
pub fn generate_download_token() -> GeneratedToken {
    let plaintext: String = rand::rng()
        .sample_iter(&rand::distr::Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    let hash = hash_download_token(&plaintext);
    GeneratedToken { plaintext, hash }
}

/// Compute the stored hash for a plaintext token.
pub fn hash_download_token(token: &str) -> String {
    crate::hashing::sha256_hex(token.as_bytes())
}

/// Cheap shape check before touching the database.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.chars().all(|c| c.is_ascii_alphanumeric())
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Where a download session is in its one-shot lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Expired,
    Redeemed,
}

impl SessionState {
    /// Human-readable reason used in 403 responses.
    pub fn rejection_message(self) -> &'static str {
        match self {
            Self::Active => "Download token is active",
            Self::Expired => "Download token has expired",
            Self::Redeemed => "Download token has already been used",
        }
    }
}

/// Classify a session. A redeemed session stays redeemed after it expires.
pub fn session_state(
    expires_at: Timestamp,
    redeemed_at: Option<Timestamp>,
    now: Timestamp,
) -> SessionState {
    if redeemed_at.is_some() {
        SessionState::Redeemed
    } else if expires_at <= now {
        SessionState::Expired
    } else {
        SessionState::Active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn generated_token_has_correct_shape() {
        let token = generate_download_token();
        assert_eq!(token.plaintext.len(), TOKEN_LENGTH);
        assert!(is_well_formed(&token.plaintext));
        assert_eq!(token.hash.len(), 64);
    }

    #[test]
    fn hash_matches_regeneration() {
        let token = generate_download_token();
        assert_eq!(token.hash, hash_download_token(&token.plaintext));
    }

    #[test]
    fn tokens_are_unique() {
        let a = generate_download_token();
        let b = generate_download_token();
        assert_ne!(a.plaintext, b.plaintext);
    }

    #[test]
    fn malformed_tokens_rejected() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("short"));
        assert!(!is_well_formed(&"a".repeat(TOKEN_LENGTH - 1)));
        assert!(!is_well_formed(&format!("{}!", "a".repeat(TOKEN_LENGTH - 1))));
    }

    #[test]
    fn active_before_expiry() {
        let now = Utc::now();
        assert_eq!(
            session_state(now + Duration::seconds(30), None, now),
            SessionState::Active
        );
    }

    #[test]
    fn expired_at_boundary() {
        let now = Utc::now();
        assert_eq!(session_state(now, None, now), SessionState::Expired);
    }

    #[test]
    fn redeemed_wins_over_expired() {
        let now = Utc::now();
        let state = session_state(
            now - Duration::seconds(10),
            Some(now - Duration::seconds(20)),
            now,
        );
        assert_eq!(state, SessionState::Redeemed);
    }
}
