//! Observability subsystem: logging and metrics.
//!
//! Span tracking itself lives in [`crate::trace`]; this module carries the
//! ambient concerns around it.

pub mod logging;
pub mod metrics;
