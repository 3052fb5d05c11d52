// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (bearer token + live session)
pub mod protected; // Officer-facing resources, behind jwt_auth_middleware
pub mod public; // Signup, login and service status
