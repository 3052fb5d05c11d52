// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind jwt_auth_middleware, which injects the
// caller as an `AuthUser` extension. Role and pincode scoping happen inside
// each handler through `crate::scope`.

pub mod auth;
pub mod cleaning_staff;
pub mod event;
pub mod event_report;
pub mod post_office;
pub mod waste;

/// Default denial for role-gated endpoints
pub(crate) const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";
