pub mod auth;
pub mod configs;
pub mod orders;

// Re-export all commands
pub use auth::*;
pub use configs::*;
pub use orders::*;
