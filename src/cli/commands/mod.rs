pub mod fixture;
pub mod migrate;
pub mod server;
