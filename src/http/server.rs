//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router and dispatch requests to the pipeline
//! - Wire up middleware (timeout, request logging)
//! - Run the server with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::http::HeaderMap;
use axum::{extract::State, response::Html, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::compute::ComputeClient;
use crate::config::{ConfigError, PortalConfig};
use crate::http::render;
use crate::observability::metrics::RequestCounter;
use crate::pipeline::RequestPipeline;
use crate::store::{Datastore, FixtureStore};
use crate::trace::propagation;
use crate::trace::{LogSink, SpanSink, SpanTracker};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<RequestPipeline>,
}

/// HTTP server for the portal.
pub struct HttpServer {
    router: Router,
    counter: Arc<RequestCounter>,
}

impl HttpServer {
    /// Create a server with the default collaborators: the config-seeded
    /// fixture store and the logging span sink.
    pub fn new(config: PortalConfig) -> Result<Self, ConfigError> {
        let store = Arc::new(FixtureStore::new(config.store.rows.clone()));
        Self::with_collaborators(config, store, Arc::new(LogSink))
    }

    /// Create a server with explicit store and span-sink collaborators.
    /// Tests use this to inject failing stores and span buffers.
    pub fn with_collaborators(
        config: PortalConfig,
        store: Arc<dyn Datastore>,
        sink: Arc<dyn SpanSink>,
    ) -> Result<Self, ConfigError> {
        let endpoint = config
            .compute
            .endpoint
            .parse()
            .map_err(|e| ConfigError::Validation(format!("compute.endpoint: {e}")))?;
        let compute = ComputeClient::new(endpoint, Duration::from_millis(config.compute.timeout_ms));

        let tracker = Arc::new(SpanTracker::new(sink));
        let counter = Arc::new(RequestCounter::new());
        let pipeline = Arc::new(RequestPipeline::new(
            tracker,
            store,
            compute,
            counter.clone(),
            config.pipeline.clone(),
            config.store.statement.clone(),
        ));

        let router = Self::build_router(&config, AppState { pipeline });
        Ok(Self { router, counter })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &PortalConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(portal_handler))
            .route("/people", get(portal_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(TraceLayer::new_for_http())
    }

    /// The request counter shared with the pipeline.
    pub fn counter(&self) -> Arc<RequestCounter> {
        self.counter.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Portal handler: runs the pipeline and renders the page.
///
/// Continues the caller's trace when the request carries a valid
/// `traceparent`. Always responds 200 with a page; stage failures were
/// already downgraded to fallback values inside the pipeline.
async fn portal_handler(State(state): State<AppState>, headers: HeaderMap) -> Html<String> {
    let (remote, _) = propagation::extract(&headers);
    let page = state.pipeline.handle(remote).await;
    Html(render::render_page(&page))
}
