mod builder;
pub mod presets;
mod selection;

pub use builder::*;
pub use presets::{
    DurationPreset, ServerOption, DURATION_PRESETS, SERVER_OPTIONS, TRAFFIC_PRESETS_MB,
};
pub use selection::*;
