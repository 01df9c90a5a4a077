//! Backend seam and the shared graph accessor.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use roam_core::{BlockInput, EntityId, Location, PageInput, QueryRows, RawNode};

/// Selector used when the caller does not ask for specific attributes.
pub const DEFAULT_SELECTOR: &str = "[*]";

/// Errors from graph operations.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    #[error("Graph backend error ({backend}): {source}")]
    Backend {
        backend: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    #[error("Node not found: {kind} {id}")]
    NotFound { kind: String, id: String },

    #[error("Invalid mutation: {0}")]
    InvalidMutation(String),

    #[error(transparent)]
    Record(#[from] roam_core::RoamError),
}

impl GraphError {
    /// Wrap an arbitrary engine failure.
    pub fn backend(backend: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Backend {
            backend: backend.into(),
            source: source.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GraphError>;

/// The primitives a host graph engine must provide.
///
/// Implementations are expected to be thin: no caching, no retries. Every
/// call is a fresh round trip.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// Short name used in error messages and logs.
    fn name(&self) -> &str;

    /// Run a datalog query with positional inputs.
    async fn q(&self, query: &str, inputs: &[Value]) -> Result<QueryRows>;

    /// Pull one record. `None` when the id names nothing.
    async fn pull(&self, selector: &str, id: &EntityId) -> Result<Option<RawNode>>;

    async fn create_block(&self, location: &Location, block: &BlockInput) -> Result<()>;

    async fn update_block(&self, block: &BlockInput) -> Result<()>;

    async fn move_block(&self, location: &Location, block: &BlockInput) -> Result<()>;

    async fn delete_block(&self, block: &BlockInput) -> Result<()>;

    async fn create_page(&self, page: &PageInput) -> Result<()>;

    async fn update_page(&self, page: &PageInput) -> Result<()>;

    async fn delete_page(&self, page: &PageInput) -> Result<()>;
}

/// Shared accessor over a graph backend.
///
/// This is the single point of access for all graph reads and writes.
/// Clone is cheap (inner Arc).
#[derive(Clone)]
pub struct Roam {
    backend: Arc<dyn GraphBackend>,
    graph_name: String,
}

impl std::fmt::Debug for Roam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Roam")
            .field("backend", &self.backend.name())
            .field("graph_name", &self.graph_name)
            .finish()
    }
}

impl Roam {
    pub fn new(backend: Arc<dyn GraphBackend>, graph_name: impl Into<String>) -> Self {
        let graph_name = graph_name.into();
        tracing::debug!(backend = backend.name(), graph = %graph_name, "Graph accessor ready");
        Self {
            backend,
            graph_name,
        }
    }

    /// Get a reference to the underlying backend for direct operations.
    pub fn backend(&self) -> &Arc<dyn GraphBackend> {
        &self.backend
    }

    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }

    /// Deep link into the app for a uid in this graph.
    pub fn url_for_uid(&self, uid: &str) -> String {
        roam_core::url_for_uid(&self.graph_name, uid)
    }

    /// Run a datalog query and return every row.
    pub async fn query(&self, query: &str, params: &[Value]) -> Result<QueryRows> {
        self.backend.q(query, params).await
    }

    /// Pull a record with the default selector.
    pub async fn pull(&self, id: impl Into<EntityId>) -> Result<Option<RawNode>> {
        self.pull_with(id, DEFAULT_SELECTOR).await
    }

    /// Pull a record with an explicit selector.
    ///
    /// A falsy id (`0`, `""`) is logged and treated as absent.
    pub async fn pull_with(
        &self,
        id: impl Into<EntityId>,
        selector: &str,
    ) -> Result<Option<RawNode>> {
        let id = id.into();
        if id.is_falsy() {
            tracing::warn!(id = %id, "Refusing to pull with an empty id");
            return Ok(None);
        }
        self.backend.pull(selector, &id).await
    }

    /// Run a query and pull the entity named by the first column of the first row.
    pub async fn query_first(&self, query: &str, params: &[Value]) -> Result<Option<RawNode>> {
        let rows = self.query(query, params).await?;
        let Some(first) = rows.first().and_then(|row| row.first()) else {
            return Ok(None);
        };
        if matches!(first, Value::Null | Value::Bool(false)) {
            tracing::warn!(value = %first, "Query returned an empty id");
            return Ok(None);
        }
        let id = EntityId::try_from(first)?;
        self.pull(id).await
    }
}
