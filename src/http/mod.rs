//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! inbound GET
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → pipeline (root span + three traced stages)
//!     → render.rs (HTML table + aggregate line)
//! ```

pub mod render;
pub mod server;

pub use server::HttpServer;
