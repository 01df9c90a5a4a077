//! Roam Graph — accessor over the graph's query/pull/mutation primitives.
//!
//! Every read and write of the entity layer flows through [`Roam`], which
//! wraps an injected [`GraphBackend`]. Nothing is cached: every call is a
//! fresh round trip, so repeated reads observe concurrent changes.

pub mod client;
pub mod memory;
pub mod mutations;
pub mod queries;

pub use client::{GraphBackend, GraphError, Roam, DEFAULT_SELECTOR};
pub use memory::MemoryBackend;
