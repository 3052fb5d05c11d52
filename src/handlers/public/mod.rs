// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition and service status. Everything here validates its input
// without a trusted user context.

pub mod auth;
mod system;

pub use system::{health, root};
