// Netshare Core - Domain Logic & Ports
// NO infrastructure dependencies (hexagonal architecture)

pub mod application;
pub mod domain;
pub mod port;

pub use domain::error::TetherError;
pub use domain::outcome::AttemptOutcome;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
