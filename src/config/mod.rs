//! Configuration subsystem.

pub mod loader;
pub mod schema;

pub use loader::{load_config, validate_config, ConfigError};
pub use schema::{
    ComputeConfig, ListenerConfig, ObservabilityConfig, PipelineConfig, PortalConfig, StoreConfig,
};
