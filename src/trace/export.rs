//! Exporter seam for completed spans.
//!
//! Batching and collector transport live outside this service; the tracker
//! only guarantees that a span handed to the sink is complete and immutable.

use std::sync::Mutex;

use crate::trace::span::Span;

/// Receives every completed span exactly once.
pub trait SpanSink: Send + Sync {
    fn export(&self, span: Span);
}

/// Production sink: emits each completed span as a structured log event.
pub struct LogSink;

impl SpanSink for LogSink {
    fn export(&self, span: Span) {
        let duration = span
            .end_time
            .and_then(|end| end.duration_since(span.start_time).ok());
        tracing::debug!(
            trace_id = %span.trace_id,
            span_id = %span.span_id,
            parent_span_id = ?span.parent_span_id.map(|id| id.to_string()),
            name = span.name,
            kind = ?span.kind,
            status = ?span.status,
            duration_ms = duration.map(|d| d.as_millis() as u64),
            "span completed"
        );
    }
}

/// Collects completed spans in memory for assertions.
#[derive(Default)]
pub struct BufferSink {
    spans: Mutex<Vec<Span>>,
}

impl BufferSink {
    /// Drain everything exported so far, in export order.
    pub fn take(&self) -> Vec<Span> {
        std::mem::take(&mut *self.spans.lock().expect("span buffer mutex poisoned"))
    }
}

impl SpanSink for BufferSink {
    fn export(&self, span: Span) {
        self.spans
            .lock()
            .expect("span buffer mutex poisoned")
            .push(span);
    }
}
