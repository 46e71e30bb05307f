//! Admin gate for `/api/v1/admin`.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use backdrop_core::error::CoreError;
use backdrop_core::roles::ROLE_ADMIN;
use backdrop_db::repositories::ProfileRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// An authenticated caller whose profile is currently an active admin.
///
/// The token only identifies the profile. Role and `is_active` are read from
/// `profiles` on every request, so a demotion or deactivation takes effect
/// before the token expires. Missing or bad tokens are 401; anything else
/// short of an active admin is 403.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let profile = ProfileRepo::find_by_id(&state.pool, user.profile_id).await?;
        let is_admin = profile
            .as_ref()
            .is_some_and(|p| p.is_active && p.role == ROLE_ADMIN);
        if !is_admin {
            tracing::warn!(
                profile_id = user.profile_id,
                token_role = %user.role,
                "Admin request refused"
            );
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }

        Ok(RequireAdmin(AuthUser {
            profile_id: user.profile_id,
            role: ROLE_ADMIN.to_string(),
        }))
    }
}
