//! Downstream compute collaborator.
//!
//! Posts the fetched rows to the compute service's `/compute_average_age`
//! endpoint and awaits a single scalar reply. The outbound request carries
//! the injected `traceparent` and `baggage` headers so the compute service
//! continues the same trace. Every failure mode maps to a sentinel fallback
//! in the pipeline; nothing here aborts a request.

use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode, Uri};
use hyper_util::client::legacy::{connect::HttpConnector, Client, Error as ClientError};
use hyper_util::rt::TokioExecutor;
use thiserror::Error;

use crate::store::Person;
use crate::trace::propagation;
use crate::trace::{Baggage, TraceContext};

// Replies larger than this are malformed, not data.
const MAX_REPLY_BYTES: usize = 64 * 1024;

/// Failure modes of the downstream call.
#[derive(Debug, Error)]
pub enum ComputeError {
    #[error("compute service unreachable: {0}")]
    Unreachable(#[from] ClientError),
    #[error("compute service returned {0}")]
    Status(StatusCode),
    #[error("compute call timed out after {0:?}")]
    Timeout(Duration),
    #[error("malformed compute reply: {0}")]
    Malformed(String),
}

/// HTTP client for the compute service.
pub struct ComputeClient {
    client: Client<HttpConnector, Body>,
    endpoint: Uri,
    timeout: Duration,
}

impl ComputeClient {
    pub fn new(endpoint: Uri, timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            endpoint,
            timeout,
        }
    }

    /// POST the rows and await the computed average age.
    ///
    /// `ctx` must be the compute span's own context so the downstream
    /// service parents its spans correctly.
    pub async fn average_age(
        &self,
        rows: &[Person],
        ctx: &TraceContext,
        baggage: &Baggage,
    ) -> Result<f64, ComputeError> {
        let payload = serde_json::json!({ "data": rows });

        let mut request = Request::builder()
            .method(Method::POST)
            .uri(self.endpoint.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .map_err(|e| ComputeError::Malformed(format!("request build failed: {e}")))?;

        // fresh carrier per outbound call
        propagation::inject(ctx, baggage, request.headers_mut());

        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| ComputeError::Timeout(self.timeout))??;

        let status = response.status();
        if !status.is_success() {
            return Err(ComputeError::Status(status));
        }

        let body = Body::new(response.into_body());
        let bytes = axum::body::to_bytes(body, MAX_REPLY_BYTES)
            .await
            .map_err(|e| ComputeError::Malformed(e.to_string()))?;

        let reply: serde_json::Value =
            serde_json::from_slice(&bytes).map_err(|e| ComputeError::Malformed(e.to_string()))?;
        reply
            .get("average_age")
            .and_then(|v| v.as_f64())
            .ok_or_else(|| ComputeError::Malformed("reply missing average_age".to_string()))
    }
}
