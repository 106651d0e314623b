//! people-portal: a distributed-tracing demo web app.
//!
//! One GET endpoint walks a traced request pipeline: a root span, an
//! artificial delay, a data fetch, and a downstream compute call whose
//! outbound request carries W3C `traceparent`/`baggage` headers so the
//! compute service continues the same trace. Stage failures downgrade their
//! span to error and substitute fallback values; the page always renders.

// Core subsystems
pub mod http;
pub mod pipeline;
pub mod trace;

// Collaborators
pub mod compute;
pub mod store;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::PortalConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
