//! roam-core: Shared types, configuration, and error handling for the Roam navigation layer.
//!
//! This crate provides the foundational types used across all roam crates:
//! - Raw pull records (`RawNode`) as returned by the graph's pull API
//! - Wire types for block/page mutations and the REST action envelope
//! - Uid generation and deep-link URLs
//! - Configuration loading
//! - Common error types

pub mod config;
pub mod error;
pub mod types;
pub mod wire;

pub use error::RoamError;
pub use types::{
    attribute_string, generate_uid, url_for_uid, EntityId, NodeRef, QueryRows, RawNode,
    ATTRIBUTE_DELIMITER,
};
pub use wire::{
    Action, ActionParams, BasicBlock, BasicPage, BlockInput, Location, PageInput, ORDER_LAST,
};
