//! Trace-context propagation and span-lifecycle core.
//!
//! # Data Flow
//! ```text
//! pipeline opens spans
//!     → span.rs (tracker + scoped guards, parent linkage)
//!     → context.rs (trace/span ids, active context, baggage)
//!     → propagation.rs (W3C traceparent/baggage on the wire)
//!     → export.rs (completed spans handed to the exporter seam)
//! ```

pub mod context;
pub mod export;
pub mod propagation;
pub mod span;

pub use context::{Baggage, SpanId, TraceContext, TraceId};
pub use export::{BufferSink, LogSink, SpanSink};
pub use span::{Span, SpanGuard, SpanKind, SpanStatus, SpanTracker};
