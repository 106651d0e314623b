//! Span lifecycle tracking.
//!
//! Spans are opened through [`SpanTracker`] and closed exactly once through
//! the returned [`SpanGuard`], which releases on drop so early returns and
//! panics in the guarded block still close the span. Ending a span consumes
//! its guard, so children can only ever parent on a live span; double-ending
//! one is a bug and panics.

use std::sync::Arc;
use std::time::SystemTime;

use crate::trace::context::{SpanId, TraceContext, TraceId};
use crate::trace::export::SpanSink;

/// What kind of work a span covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    Internal,
    Client,
    Server,
}

/// Outcome recorded on a span when it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanStatus {
    Unset,
    Ok,
    Error,
}

/// One timed unit of traced work.
///
/// `end_time` is set exactly once, and only after all work attributed to the
/// span has completed. An ended span is immutable.
#[derive(Debug, Clone)]
pub struct Span {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    pub parent_span_id: Option<SpanId>,
    pub sampled: bool,
    pub name: &'static str,
    pub kind: SpanKind,
    pub start_time: SystemTime,
    pub end_time: Option<SystemTime>,
    pub status: SpanStatus,
}

impl Span {
    pub fn is_ended(&self) -> bool {
        self.end_time.is_some()
    }

    /// The context descendants use to parent themselves on this span.
    pub fn context(&self) -> TraceContext {
        TraceContext {
            trace_id: self.trace_id,
            span_id: self.span_id,
            sampled: self.sampled,
        }
    }
}

/// Allocates span identity and hands completed spans to the exporter seam.
///
/// The tracker itself holds no per-request state; each in-flight request owns
/// its spans through guards, so concurrent requests need no locking here.
pub struct SpanTracker {
    sink: Arc<dyn SpanSink>,
}

impl SpanTracker {
    pub fn new(sink: Arc<dyn SpanSink>) -> Self {
        Self { sink }
    }

    /// Open a root span with a freshly generated trace id.
    pub fn start_root(self: &Arc<Self>, name: &'static str, kind: SpanKind) -> SpanGuard {
        self.start(name, kind, TraceId::generate(), None, true)
    }

    /// Open the request's top span.
    ///
    /// Continues `remote` (trace id and sampling decision included) when an
    /// upstream caller propagated one, otherwise starts a fresh root trace.
    pub fn start_request(
        self: &Arc<Self>,
        name: &'static str,
        kind: SpanKind,
        remote: Option<TraceContext>,
    ) -> SpanGuard {
        match remote {
            Some(ctx) => self.start(name, kind, ctx.trace_id, Some(ctx.span_id), ctx.sampled),
            None => self.start(name, kind, TraceId::generate(), None, true),
        }
    }

    /// Open a child span parented on `parent`.
    ///
    /// The parent guard holds an open span by construction (ending a span
    /// consumes its guard), so a child always nests inside a live parent.
    pub fn start_child(
        self: &Arc<Self>,
        name: &'static str,
        kind: SpanKind,
        parent: &SpanGuard,
    ) -> SpanGuard {
        let parent = parent.span();
        self.start(
            name,
            kind,
            parent.trace_id,
            Some(parent.span_id),
            parent.sampled,
        )
    }

    fn start(
        self: &Arc<Self>,
        name: &'static str,
        kind: SpanKind,
        trace_id: TraceId,
        parent_span_id: Option<SpanId>,
        sampled: bool,
    ) -> SpanGuard {
        let span = Span {
            trace_id,
            span_id: SpanId::generate(),
            parent_span_id,
            sampled,
            name,
            kind,
            start_time: SystemTime::now(),
            end_time: None,
            status: SpanStatus::Unset,
        };
        SpanGuard {
            tracker: Arc::clone(self),
            span: Some(span),
            status: SpanStatus::Ok,
        }
    }

    /// Stamp the end time and hand the completed span to the sink.
    ///
    /// Panics if the span has already ended; a double end is a programming
    /// invariant violation, never silently ignored.
    pub fn end(&self, span: &mut Span, status: SpanStatus) {
        assert!(
            !span.is_ended(),
            "span {:?} ({}) ended twice",
            span.name,
            span.span_id
        );
        span.end_time = Some(SystemTime::now());
        span.status = status;
        self.sink.export(span.clone());
    }
}

/// Scoped-acquisition handle for an open span.
///
/// Dropping the guard ends the span with the last status recorded via
/// [`SpanGuard::set_status`] (defaulting to ok), which is what closes spans
/// on error and panic exit paths. [`SpanGuard::finish`] ends it explicitly.
pub struct SpanGuard {
    tracker: Arc<SpanTracker>,
    span: Option<Span>,
    status: SpanStatus,
}

impl SpanGuard {
    pub fn span(&self) -> &Span {
        self.span.as_ref().expect("span taken before drop")
    }

    /// Context for propagation and for parenting children on this span.
    pub fn context(&self) -> TraceContext {
        self.span().context()
    }

    /// Record the status the span will close with.
    pub fn set_status(&mut self, status: SpanStatus) {
        self.status = status;
    }

    /// Close the span now with the given status.
    pub fn finish(mut self, status: SpanStatus) {
        let mut span = self.span.take().expect("span taken before finish");
        self.tracker.end(&mut span, status);
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if let Some(mut span) = self.span.take() {
            self.tracker.end(&mut span, self.status);
        }
    }
}
