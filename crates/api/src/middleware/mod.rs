//! Authentication extractors and request middleware.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated profile from a JWT Bearer token.
//! - [`auth::OptionalAuthUser`] -- Same, but anonymous requests pass through.
//! - [`rbac::RequireAdmin`] -- Requires the `admin` role.
//! - [`timing::record_request_timing`] -- Writes a `performance_logs` row per request.

pub mod auth;
pub mod rbac;
pub mod timing;
