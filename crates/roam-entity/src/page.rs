//! Top-level, title-addressed entities.

use async_trait::async_trait;

use roam_core::RawNode;
use roam_graph::Roam;

use crate::entity::{Entity, ENTITY_MEMBERS};
use crate::error::Result;
use crate::lookup::{Member, Node};

/// A page. Its text is its title.
#[derive(Debug, Clone)]
pub struct Page {
    roam: Roam,
    raw: RawNode,
}

impl Page {
    pub fn new(roam: Roam, raw: RawNode) -> Self {
        Self { roam, raw }
    }

    /// Look up a page by exact title.
    pub async fn from_name(roam: &Roam, title: &str) -> Result<Option<Self>> {
        Ok(roam
            .page_by_title(title)
            .await?
            .map(|raw| Self::new(roam.clone(), raw)))
    }

    pub fn title(&self) -> &str {
        self.raw.title.as_deref().unwrap_or_default()
    }
}

#[async_trait]
impl Entity for Page {
    fn roam(&self) -> &Roam {
        &self.roam
    }

    fn raw(&self) -> &RawNode {
        &self.raw
    }

    fn text(&self) -> &str {
        self.title()
    }

    /// Rename the page.
    async fn set_text(&self, value: &str) -> Result<()> {
        self.roam.update_page(self.uid(), value).await?;
        Ok(())
    }

    fn member_names(&self) -> &'static [&'static str] {
        ENTITY_MEMBERS
    }

    async fn member(&self, name: &str) -> Result<Option<Member>> {
        self.common_member(name).await
    }

    fn to_node(&self) -> Node {
        Node::Page(self.clone())
    }
}
