//! OnwardPath client core: session gating, config purchase and usage views
//! over the panel's JSON API.

// Module declarations
pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod mount;
pub mod orders;
pub mod state;
pub mod usage;

// Re-exports for easy access
pub use api::{ApiClient, Backend};
pub use auth::{
    AccountService, FileSessionStore, GateState, MemorySessionStore, Rendering, SessionGate,
    SessionStore,
};
pub use config::ClientConfig;
pub use error::ClientError;
pub use orders::{DurationSpec, Order, OrderBuilder, OrderForm, TrafficSpec};
pub use state::AppState;
pub use usage::{build_config_url, format_bytes, format_expiry, UsagePresentation, UsageView};
