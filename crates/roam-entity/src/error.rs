//! Error types for the roam-entity crate.

use thiserror::Error;

/// Lookups never fail on their own; only the graph underneath can.
#[derive(Error, Debug)]
pub enum EntityError {
    #[error("Graph error: {0}")]
    Graph(#[from] roam_graph::GraphError),
}

pub type Result<T> = std::result::Result<T, EntityError>;
