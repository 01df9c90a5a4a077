//! Pages used as attribute keys, and aggregation over their declarations.
//!
//! A block declares attribute `Status` by starting with `Status::`, which
//! also makes it reference the `Status` page. Everything here is computed
//! from those back-references at call time.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use roam_core::RawNode;
use roam_graph::Roam;

use crate::block::Block;
use crate::entity::Entity;
use crate::error::Result;
use crate::lookup::{Member, Node};
use crate::page::Page;

/// Members an attribute page answers to in [`Entity::get`].
pub const ATTRIBUTE_MEMBERS: &[&str] = &[
    "raw",
    "text",
    "uid",
    "url",
    "raw_children",
    "children",
    "linked_entities",
    "get",
    "child_with_value",
    "child_at_path",
    "children_matching",
    "set_text",
    "set_attribute",
    "set_as_attribute",
    "append_child",
    "all_values",
    "unique_values",
    "values_by_count",
    "find_blocks_with_value",
];

/// A page whose title is an attribute key.
#[derive(Debug, Clone)]
pub struct Attribute {
    page: Page,
}

impl Attribute {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub async fn from_name(roam: &Roam, title: &str) -> Result<Option<Self>> {
        Ok(Page::from_name(roam, title).await?.map(Self::new))
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Every value declared for this attribute anywhere in the graph.
    ///
    /// Ordered by back-reference order, then by each block's own
    /// in-place-then-children order. Blocks that fail to load are skipped.
    pub async fn all_values(&self) -> Result<Vec<String>> {
        let uids = self.roam().block_uids_referencing_page(self.text()).await?;
        let mut values = Vec::new();

        for uid in uids {
            let block = match Block::from_uid(self.roam(), &uid).await {
                Ok(Some(block)) => block,
                Ok(None) => {
                    tracing::debug!(uid = %uid, "Referencing block vanished, skipping");
                    continue;
                }
                Err(e) => {
                    tracing::warn!(uid = %uid, error = %e, "Failed to load referencing block");
                    continue;
                }
            };
            match block.list_attribute_values(None).await {
                Ok(block_values) => values.extend(block_values),
                Err(e) => {
                    tracing::warn!(uid = %uid, error = %e, "Failed to read attribute values");
                }
            }
        }

        Ok(values)
    }

    pub async fn unique_values(&self) -> Result<HashSet<String>> {
        Ok(self.all_values().await?.into_iter().collect())
    }

    /// `(value, occurrences)`, most frequent first.
    pub async fn values_by_count(&self) -> Result<Vec<(String, usize)>> {
        Ok(count_values(&self.all_values().await?))
    }

    /// Blocks that reference both this attribute and the page titled `value`.
    ///
    /// This is co-occurrence, not a check that `value` sits in the attribute's
    /// value slot: `Status:: [[Done]]` and `Status:: [[Todo]], see [[Done]]`
    /// both match `Done`.
    pub async fn find_blocks_with_value(&self, value: &str) -> Result<Vec<Block>> {
        let roam = self.roam();
        let attribute_blocks = roam.block_uids_referencing_page(self.text()).await?;
        let value_blocks: HashSet<String> = roam
            .block_uids_referencing_page(value)
            .await?
            .into_iter()
            .collect();

        let mut seen = HashSet::new();
        let mut blocks = Vec::new();
        for uid in attribute_blocks {
            if !value_blocks.contains(&uid) || !seen.insert(uid.clone()) {
                continue;
            }
            if let Some(block) = Block::from_uid(roam, &uid).await? {
                blocks.push(block);
            }
        }
        Ok(blocks)
    }
}

/// Count occurrences, most frequent first.
///
/// Groups in first-seen order, sorts ascending by count (stable), then
/// reverses; equal counts therefore come out in reverse first-seen order.
pub fn count_values<S: AsRef<str>>(values: &[S]) -> Vec<(String, usize)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();

    for value in values {
        let value = value.as_ref();
        match positions.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                positions.insert(value, counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }

    counts.sort_by_key(|(_, count)| *count);
    counts.reverse();
    counts
}

#[async_trait]
impl Entity for Attribute {
    fn roam(&self) -> &Roam {
        self.page.roam()
    }

    fn raw(&self) -> &RawNode {
        self.page.raw()
    }

    fn text(&self) -> &str {
        self.page.text()
    }

    async fn set_text(&self, value: &str) -> Result<()> {
        self.page.set_text(value).await
    }

    fn member_names(&self) -> &'static [&'static str] {
        ATTRIBUTE_MEMBERS
    }

    async fn member(&self, name: &str) -> Result<Option<Member>> {
        self.common_member(name).await
    }

    fn to_node(&self) -> Node {
        Node::Page(self.page.clone())
    }
}
