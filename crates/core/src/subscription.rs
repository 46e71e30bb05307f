//! Subscription tiers and the premium download gate.

use crate::error::CoreError;
use crate::roles::ROLE_ADMIN;
use crate::types::Timestamp;

pub const TIER_FREE: &str = "free";
pub const TIER_PREMIUM: &str = "premium";

const VALID_TIERS: &[&str] = &[TIER_FREE, TIER_PREMIUM];

/// Validate that `tier` is `"free"` or `"premium"`.
pub fn validate_tier(tier: &str) -> Result<(), CoreError> {
    if VALID_TIERS.contains(&tier) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid subscription tier '{tier}'. Must be one of: {VALID_TIERS:?}"
        )))
    }
}

/// The parts of a profile the download gate looks at.
#[derive(Debug, Clone, Copy)]
pub struct Viewer<'a> {
    pub role: &'a str,
    pub tier: &'a str,
    pub premium_until: Option<Timestamp>,
}

/// Whether the viewer currently has premium access.
///
/// Admins always do. Premium-tier profiles do until `premium_until`, or
/// indefinitely when it is unset.
pub fn has_premium_access(viewer: &Viewer<'_>, now: Timestamp) -> bool {
    if viewer.role == ROLE_ADMIN {
        return true;
    }
    viewer.tier == TIER_PREMIUM && viewer.premium_until.map_or(true, |until| until > now)
}

/// Decide whether a download of a wallpaper may proceed.
///
/// Free wallpapers are open to everyone. Premium wallpapers need a signed-in
/// viewer (401 otherwise) with an active subscription (403 otherwise).
pub fn check_download_access(
    is_premium: bool,
    viewer: Option<&Viewer<'_>>,
    now: Timestamp,
) -> Result<(), CoreError> {
    if !is_premium {
        return Ok(());
    }
    let viewer = viewer.ok_or_else(|| {
        CoreError::Unauthorized("Sign in to download premium wallpapers".into())
    })?;
    if has_premium_access(viewer, now) {
        Ok(())
    } else {
        Err(CoreError::Forbidden(
            "An active premium subscription is required for this wallpaper".into(),
        ))
    }
}
