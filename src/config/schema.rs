//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the portal.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::store::Person;

/// Root configuration for the portal service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PortalConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Request-pipeline behavior (artificial delay, identity baggage).
    pub pipeline: PipelineConfig,

    /// Data-store settings and fixture rows.
    pub store: StoreConfig,

    /// Downstream compute-service settings.
    pub compute: ComputeConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Request-pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Artificial delay in milliseconds, there to make the trace show an
    /// obvious bottleneck.
    pub delay_ms: u64,

    /// `user.id` baggage entry carried on the compute call.
    pub user_id: String,

    /// `user.name` baggage entry carried on the compute call.
    pub user_name: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delay_ms: 2000,
            user_id: "12345".to_string(),
            user_name: "john".to_string(),
        }
    }
}

/// Data-store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Statement handed to the store collaborator.
    pub statement: String,

    /// Rows served by the built-in fixture store.
    pub rows: Vec<Person>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            statement: "SELECT * FROM people".to_string(),
            rows: vec![
                Person { id: 1, name: "Alice".to_string(), age: 34 },
                Person { id: 2, name: "Bob".to_string(), age: 28 },
                Person { id: 3, name: "Carol".to_string(), age: 45 },
            ],
        }
    }
}

/// Compute-service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ComputeConfig {
    /// Endpoint of the compute service.
    pub endpoint: String,

    /// Downstream call timeout in milliseconds. The call is never left
    /// unbounded.
    pub timeout_ms: u64,
}

impl Default for ComputeConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/compute_average_age".to_string(),
            timeout_ms: 3000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            metrics_enabled: true,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
