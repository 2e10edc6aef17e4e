mod backend;
mod client;
pub mod types;

pub use backend::*;
pub use client::*;
pub use types::*;
