//! Write operations for the graph.
//!
//! Each call is one round trip to the backend and resolves once the backend
//! has acknowledged it. Nothing is batched or retried here.

use roam_core::{BlockInput, Location, PageInput};

use crate::client::{Result, Roam};

impl Roam {
    // ── Blocks ───────────────────────────────────────────────────

    /// Create a block under `location.parent_uid`.
    pub async fn create_block(&self, location: &Location, block: &BlockInput) -> Result<()> {
        tracing::debug!(parent = %location.parent_uid, order = location.order, "create-block");
        self.backend().create_block(location, block).await
    }

    /// Update the string and/or open state of the block named by `block.uid`.
    pub async fn update_block(&self, block: &BlockInput) -> Result<()> {
        tracing::debug!(uid = ?block.uid, "update-block");
        self.backend().update_block(block).await
    }

    /// Move a block under a new parent and position.
    pub async fn move_block(&self, uid: &str, location: &Location) -> Result<()> {
        tracing::debug!(uid, parent = %location.parent_uid, order = location.order, "move-block");
        self.backend()
            .move_block(location, &BlockInput::with_uid(uid))
            .await
    }

    /// Delete a block and everything nested under it.
    pub async fn delete_block(&self, uid: &str) -> Result<()> {
        tracing::debug!(uid, "delete-block");
        self.backend().delete_block(&BlockInput::with_uid(uid)).await
    }

    // ── Pages ────────────────────────────────────────────────────

    pub async fn create_page(&self, page: &PageInput) -> Result<()> {
        tracing::debug!(title = ?page.title, "create-page");
        self.backend().create_page(page).await
    }

    /// Rename the page named by `uid`.
    pub async fn update_page(&self, uid: &str, title: &str) -> Result<()> {
        tracing::debug!(uid, title, "update-page");
        self.backend()
            .update_page(&PageInput::new(Some(uid.to_string()), Some(title.to_string())))
            .await
    }

    pub async fn delete_page(&self, uid: &str) -> Result<()> {
        tracing::debug!(uid, "delete-page");
        self.backend()
            .delete_page(&PageInput::new(Some(uid.to_string()), None))
            .await
    }
}
