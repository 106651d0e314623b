//! Request pipeline orchestration.
//!
//! One request walks `Start → DelayDone → DataFetchDone → ComputeDone →
//! Rendered`, strictly sequentially. A stage failure never aborts the
//! pipeline: it downgrades that stage's span to error and substitutes a
//! fallback value (empty rows, unavailable aggregate), so a page is always
//! produced and the end-to-end trace stays visible even when a dependency
//! fails.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::compute::ComputeClient;
use crate::config::PipelineConfig;
use crate::observability::metrics::RequestCounter;
use crate::store::{Datastore, Person};
use crate::trace::{Baggage, SpanGuard, SpanKind, SpanStatus, SpanTracker, TraceContext};

/// Computed average age, or the sentinel when the compute stage failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Aggregate {
    Available(f64),
    Unavailable,
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Aggregate::Available(value) => write!(f, "{}", value),
            Aggregate::Unavailable => write!(f, "unavailable"),
        }
    }
}

/// Everything the page render needs.
#[derive(Debug, Clone)]
pub struct PageData {
    pub rows: Vec<Person>,
    pub average: Aggregate,
}

/// Orchestrates the root span and the three child stages for one request.
pub struct RequestPipeline {
    tracker: Arc<SpanTracker>,
    store: Arc<dyn Datastore>,
    compute: ComputeClient,
    counter: Arc<RequestCounter>,
    config: PipelineConfig,
    statement: String,
}

impl RequestPipeline {
    pub fn new(
        tracker: Arc<SpanTracker>,
        store: Arc<dyn Datastore>,
        compute: ComputeClient,
        counter: Arc<RequestCounter>,
        config: PipelineConfig,
        statement: String,
    ) -> Self {
        Self {
            tracker,
            store,
            compute,
            counter,
            config,
            statement,
        }
    }

    /// Run the whole pipeline for one inbound request.
    ///
    /// `remote` is the trace context extracted from the inbound request, if
    /// any; a missing or malformed one just means a fresh root trace.
    /// Always returns page data; the request span always ends ok, the last
    /// tracing event of the request.
    pub async fn handle(&self, remote: Option<TraceContext>) -> PageData {
        let root = self
            .tracker
            .start_request("handle_people_request", SpanKind::Server, remote);
        tracing::debug!(trace_id = %root.span().trace_id, "request pipeline started");

        self.delay_stage(&root).await;

        self.counter.increment();

        let rows = self.fetch_stage(&root).await;
        let average = self.compute_stage(&root, &rows).await;

        root.finish(SpanStatus::Ok);
        PageData { rows, average }
    }

    /// Fixed artificial delay, spanned so the trace shows a bottleneck.
    async fn delay_stage(&self, root: &SpanGuard) {
        let delay = self
            .tracker
            .start_child("artificial_delay", SpanKind::Internal, root);
        tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
        delay.finish(SpanStatus::Ok);
    }

    /// Fetch rows; on any store failure, log and continue with none.
    async fn fetch_stage(&self, root: &SpanGuard) -> Vec<Person> {
        let fetch = self
            .tracker
            .start_child("fetch_people", SpanKind::Client, root);
        match self.store.query(&self.statement).await {
            Ok(rows) => {
                fetch.finish(SpanStatus::Ok);
                rows
            }
            Err(e) => {
                tracing::error!(error = %e, "Data fetch failed; continuing with empty rows");
                fetch.finish(SpanStatus::Error);
                Vec::new()
            }
        }
    }

    /// Call the compute service with injected context and identity baggage;
    /// on any failure substitute the unavailable sentinel.
    async fn compute_stage(&self, root: &SpanGuard, rows: &[Person]) -> Aggregate {
        let compute = self
            .tracker
            .start_child("compute_average_age", SpanKind::Client, root);

        let mut baggage = Baggage::new();
        baggage.insert("user.id", self.config.user_id.clone());
        baggage.insert("user.name", self.config.user_name.clone());

        match self
            .compute
            .average_age(rows, &compute.context(), &baggage)
            .await
        {
            Ok(value) => {
                compute.finish(SpanStatus::Ok);
                Aggregate::Available(value)
            }
            Err(e) => {
                tracing::error!(error = %e, "Compute call failed; using sentinel aggregate");
                compute.finish(SpanStatus::Error);
                Aggregate::Unavailable
            }
        }
    }
}
