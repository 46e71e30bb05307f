//! Profile (account) model and DTOs.

use backdrop_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full row from the `profiles` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`ProfileResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct Profile {
    pub id: DbId,
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub subscription_tier: String,
    pub premium_until: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Safe profile representation for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub role: String,
    pub subscription_tier: String,
    pub premium_until: Option<Timestamp>,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl From<Profile> for ProfileResponse {
    fn from(p: Profile) -> Self {
        Self {
            id: p.id,
            email: p.email,
            display_name: p.display_name,
            avatar_url: p.avatar_url,
            role: p.role,
            subscription_tier: p.subscription_tier,
            premium_until: p.premium_until,
            is_active: p.is_active,
            created_at: p.created_at,
        }
    }
}

/// Insert DTO. Built by the register handler after hashing the password.
#[derive(Debug)]
pub struct CreateProfile {
    pub email: String,
    pub password_hash: String,
    pub display_name: String,
}

/// Self-service profile update. All fields are optional.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Admin subscription change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSubscription {
    pub subscription_tier: String,
    /// `None` means open-ended.
    pub premium_until: Option<Timestamp>,
}

/// Admin role change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRole {
    pub role: String,
}

/// Profile counts for the metrics dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProfileCounts {
    pub total: i64,
    pub premium_active: i64,
}
