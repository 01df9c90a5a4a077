//! roam-entity: Navigable views over pages and blocks of a Roam graph.
//!
//! Wraps raw pull records in [`Page`], [`Block`] and [`Attribute`] views
//! that support positional, exact-text and pattern-based child lookup
//! through [`Entity::get`], path walks, and the `key::value` attribute
//! convention including graph-wide value aggregation.
//!
//! ```no_run
//! # async fn demo(roam: roam_graph::Roam) -> roam_entity::error::Result<()> {
//! use roam_entity::{Entity, Page};
//!
//! if let Some(page) = Page::from_name(&roam, "Projects").await? {
//!     let status = page.child_at_path(&["Website", "Status"]).await?;
//!     page.set_attribute("Reviewed", "yes").await?;
//! #   let _ = status;
//! }
//! # Ok(())
//! # }
//! ```

pub mod attribute;
pub mod block;
pub mod entity;
pub mod error;
pub mod lookup;
pub mod page;
pub mod split;

pub use attribute::{count_values, Attribute};
pub use block::Block;
pub use entity::Entity;
pub use error::EntityError;
pub use lookup::{Lookup, Member, Node};
pub use page::Page;
pub use split::{split_bracket_boundaries, Splitter};
