//! Data-store collaborator.
//!
//! The pipeline only needs `query(statement) -> rows`; everything behind
//! that seam (driver, connection pool, credentials) stays outside this
//! service. [`FixtureStore`] serves rows seeded from configuration so the
//! demo runs without a database; a real driver plugs in through the trait.

use futures_util::future::BoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One row of the demo table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub age: i64,
}

/// Failure modes of the store. All of them are recovered locally by the
/// pipeline with an empty row set.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unreachable: {0}")]
    Unreachable(String),
    #[error("malformed result: {0}")]
    Malformed(String),
}

/// Synchronous-from-the-pipeline's-view query capability.
pub trait Datastore: Send + Sync {
    fn query<'a>(&'a self, statement: &'a str) -> BoxFuture<'a, Result<Vec<Person>, StoreError>>;
}

/// In-memory store serving a fixed row set.
pub struct FixtureStore {
    rows: Vec<Person>,
}

impl FixtureStore {
    pub fn new(rows: Vec<Person>) -> Self {
        Self { rows }
    }
}

impl Datastore for FixtureStore {
    fn query<'a>(&'a self, statement: &'a str) -> BoxFuture<'a, Result<Vec<Person>, StoreError>> {
        tracing::debug!(%statement, rows = self.rows.len(), "serving fixture rows");
        Box::pin(async move { Ok(self.rows.clone()) })
    }
}
