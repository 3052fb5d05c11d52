// handlers/protected/auth/mod.rs - Session and profile endpoints

pub mod logout;
pub mod me;

pub use logout::logout;
pub use me::{divisional_me, sub_divisional_me};
