//! Nested free-text entities and the `key::value` attribute convention.

use async_trait::async_trait;
use regex::Regex;

use roam_core::{BlockInput, RawNode, ATTRIBUTE_DELIMITER};
use roam_graph::Roam;

use crate::entity::Entity;
use crate::error::Result;
use crate::lookup::{Member, Node};
use crate::page::Page;
use crate::split::Splitter;

/// Members a block answers to in [`Entity::get`].
pub const BLOCK_MEMBERS: &[&str] = &[
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
    "container_page",
    "attribute_value",
    "defines_attribute",
    "list_attribute_values",
    "list_in_place_attribute_values",
];

/// A block. Its text is the block string.
#[derive(Debug, Clone)]
pub struct Block {
    roam: Roam,
    raw: RawNode,
}

impl Block {
    pub fn new(roam: Roam, raw: RawNode) -> Self {
        Self { roam, raw }
    }

    /// Look up a block by uid.
    pub async fn from_uid(roam: &Roam, uid: &str) -> Result<Option<Self>> {
        Ok(roam
            .block_by_uid(uid)
            .await?
            .map(|raw| Self::new(roam.clone(), raw)))
    }

    /// The page this block lives on, pulled fresh.
    pub async fn container_page(&self) -> Result<Option<Page>> {
        let Some(page) = self.raw.page else {
            return Ok(None);
        };
        Ok(self
            .roam
            .pull(page)
            .await?
            .map(|raw| Page::new(self.roam.clone(), raw)))
    }

    /// The trimmed text between the first and second `::`.
    pub fn attribute_value(&self) -> Option<String> {
        self.text()
            .split(ATTRIBUTE_DELIMITER)
            .nth(1)
            .map(|value| value.trim().to_string())
    }

    pub fn defines_attribute(&self) -> bool {
        self.text().contains(ATTRIBUTE_DELIMITER)
    }

    /// Every value this block declares: in-place values first, then the text
    /// of each child. Empty when the block declares no attribute.
    ///
    /// `split` overrides the bracket-boundary splitter for the in-place part.
    pub async fn list_attribute_values(&self, split: Option<&Regex>) -> Result<Vec<String>> {
        if !self.defines_attribute() {
            return Ok(Vec::new());
        }

        let mut values = self.list_in_place_attribute_values(Splitter::from(split));
        values.extend(
            self.children()
                .await?
                .iter()
                .map(|child| child.text().to_string()),
        );
        Ok(values)
    }

    /// The in-place values only, empty pieces dropped.
    pub fn list_in_place_attribute_values(&self, splitter: Splitter<'_>) -> Vec<String> {
        let Some(value) = self.attribute_value() else {
            return Vec::new();
        };
        splitter
            .split(&value)
            .into_iter()
            .filter(|piece| !piece.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[async_trait]
impl Entity for Block {
    fn roam(&self) -> &Roam {
        &self.roam
    }

    fn raw(&self) -> &RawNode {
        &self.raw
    }

    fn text(&self) -> &str {
        self.raw.string.as_deref().unwrap_or_default()
    }

    async fn set_text(&self, value: &str) -> Result<()> {
        self.roam
            .update_block(&BlockInput::with_uid(self.uid()).text(value))
            .await?;
        Ok(())
    }

    fn member_names(&self) -> &'static [&'static str] {
        BLOCK_MEMBERS
    }

    async fn member(&self, name: &str) -> Result<Option<Member>> {
        let member = match name {
            "container_page" => Member::ContainerPage(self.container_page().await?),
            "attribute_value" => Member::AttributeValue(self.attribute_value()),
            "defines_attribute" => Member::DefinesAttribute(self.defines_attribute()),
            other => return self.common_member(other).await,
        };
        Ok(Some(member))
    }

    fn to_node(&self) -> Node {
        Node::Block(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use roam_graph::MemoryBackend;

    use super::*;

    fn detached(text: &str) -> Block {
        let roam = Roam::new(Arc::new(MemoryBackend::new()), "test");
        Block::new(
            roam,
            RawNode {
                db_id: Some(1),
                uid: Some("blockuid1".to_string()),
                string: Some(text.to_string()),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_attribute_value_is_second_segment() {
        assert_eq!(detached("Status:: Done ").attribute_value().as_deref(), Some("Done"));
        assert_eq!(detached("a::b::c").attribute_value().as_deref(), Some("b"));
        assert_eq!(detached("no attribute").attribute_value(), None);
    }

    #[test]
    fn test_defines_attribute() {
        assert!(detached("Status::").defines_attribute());
        assert!(!detached("Status: Done").defines_attribute());
    }

    #[test]
    fn test_in_place_values_drop_empties() {
        let block = detached("Tags:: [[A]] [[B]]");
        assert_eq!(
            block.list_in_place_attribute_values(Splitter::BracketBoundary),
            vec!["[[A]]", "[[B]]"]
        );

        let comma = Regex::new(",").unwrap();
        let block = detached("Tags:: a,,b,");
        assert_eq!(
            block.list_in_place_attribute_values(Splitter::Pattern(&comma)),
            vec!["a", "b"]
        );

        assert!(detached("Tags::   ")
            .list_in_place_attribute_values(Splitter::default())
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_values_without_declaration_is_empty() {
        let block = detached("[[A]] [[B]]");
        assert!(block.list_attribute_values(None).await.unwrap().is_empty());
    }
}
