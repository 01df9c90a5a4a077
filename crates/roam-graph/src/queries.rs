//! Read operations and the datalog queries behind them.

use serde_json::{json, Value};

use roam_core::{NodeRef, RawNode};

use crate::client::{Result, Roam};

/// Entity id of the page with title `?a`.
pub const PAGE_BY_TITLE: &str = "[:find ?e :in $ ?a :where [?e :node/title ?a]]";

/// Entity id of the page or block with uid `?a`.
pub const BLOCK_BY_UID: &str = "[:find ?e :in $ ?a :where [?e :block/uid ?a]]";

/// Every entity that has both a title and a uid, i.e. every page.
pub const LIST_PAGE_IDS: &str =
    "[:find ?page :where [?page :node/title ?title] [?page :block/uid ?uid]]";

/// Uids of blocks whose refs include the page titled `?title`.
pub const BLOCK_UIDS_REFERENCING_PAGE: &str = "[:find ?uid :in $ ?title :where [?page :node/title ?title] [?block :block/refs ?page] [?block :block/uid ?uid]]";

impl Roam {
    // ── Single Record Lookups ────────────────────────────────────

    /// Pull the page with exactly this title.
    pub async fn page_by_title(&self, title: &str) -> Result<Option<RawNode>> {
        self.query_first(PAGE_BY_TITLE, &[json!(title)]).await
    }

    /// Pull the block (or page) with this uid.
    pub async fn block_by_uid(&self, uid: &str) -> Result<Option<RawNode>> {
        self.query_first(BLOCK_BY_UID, &[json!(uid)]).await
    }

    /// Resolve the uid of a pointer by pulling it.
    pub async fn get_uid(&self, node: NodeRef) -> Result<Option<String>> {
        Ok(self.pull(node).await?.and_then(|raw| raw.uid))
    }

    // ── List Queries ─────────────────────────────────────────────

    /// Ids of every page in the graph.
    pub async fn list_page_ids(&self) -> Result<Vec<i64>> {
        let rows = self.query(LIST_PAGE_IDS, &[]).await?;
        Ok(rows.iter().flatten().filter_map(Value::as_i64).collect())
    }

    /// Pull every page in the graph. Ids that no longer resolve are skipped.
    pub async fn list_pages(&self) -> Result<Vec<RawNode>> {
        let ids = self.list_page_ids().await?;
        let mut pages = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(page) = self.pull(id).await? {
                pages.push(page);
            }
        }
        Ok(pages)
    }

    // ── Back-references ──────────────────────────────────────────

    /// Uids of all blocks referencing the page titled `title`, in the order
    /// the engine returns them.
    pub async fn block_uids_referencing_page(&self, title: &str) -> Result<Vec<String>> {
        let rows = self
            .query(BLOCK_UIDS_REFERENCING_PAGE, &[json!(title)])
            .await?;
        Ok(rows
            .iter()
            .filter_map(|row| row.first())
            .filter_map(|uid| uid.as_str().map(str::to_string))
            .collect())
    }
}
