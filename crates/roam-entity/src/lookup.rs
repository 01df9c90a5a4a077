//! Results of dynamic lookup.

use async_trait::async_trait;

use roam_core::RawNode;
use roam_graph::Roam;

use crate::block::Block;
use crate::entity::Entity;
use crate::error::Result;
use crate::page::Page;

/// Any entity, owned.
#[derive(Debug, Clone)]
pub enum Node {
    Page(Page),
    Block(Block),
}

impl Node {
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Self::Block(block) => Some(block),
            Self::Page(_) => None,
        }
    }

    pub fn as_page(&self) -> Option<&Page> {
        match self {
            Self::Page(page) => Some(page),
            Self::Block(_) => None,
        }
    }

    fn inner(&self) -> &dyn Entity {
        match self {
            Self::Page(page) => page,
            Self::Block(block) => block,
        }
    }
}

#[async_trait]
impl Entity for Node {
    fn roam(&self) -> &Roam {
        self.inner().roam()
    }

    fn raw(&self) -> &RawNode {
        self.inner().raw()
    }

    fn text(&self) -> &str {
        self.inner().text()
    }

    async fn set_text(&self, value: &str) -> Result<()> {
        self.inner().set_text(value).await
    }

    fn member_names(&self) -> &'static [&'static str] {
        self.inner().member_names()
    }

    async fn member(&self, name: &str) -> Result<Option<Member>> {
        self.inner().member(name).await
    }

    fn to_node(&self) -> Node {
        self.clone()
    }
}

/// A member value returned by [`Entity::get`] when the key names one.
#[derive(Debug, Clone)]
pub enum Member {
    Raw(RawNode),
    Text(String),
    Uid(String),
    Url(String),
    RawChildren(Vec<RawNode>),
    Children(Vec<Block>),
    LinkedEntities(Vec<RawNode>),
    ContainerPage(Option<Page>),
    AttributeValue(Option<String>),
    DefinesAttribute(bool),
    /// A callable member; it shadows content but has no value of its own.
    Method(&'static str),
}

/// What a dynamic lookup found.
#[derive(Debug, Clone)]
pub enum Lookup {
    /// One child by position, exact text, or `key::` declaration.
    Entity(Node),
    /// Every child matching the key as a regex. Never empty.
    Matches(Vec<Block>),
    /// A member that shadowed content lookup.
    Member(Member),
}

impl Lookup {
    /// The single entity this lookup landed on, if any.
    ///
    /// A member counts only when it holds one entity (`container_page`).
    pub fn into_entity(self) -> Option<Node> {
        match self {
            Self::Entity(node) => Some(node),
            Self::Member(Member::ContainerPage(Some(page))) => Some(Node::Page(page)),
            Self::Matches(_) | Self::Member(_) => None,
        }
    }

    pub fn as_entity(&self) -> Option<&Node> {
        match self {
            Self::Entity(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_block(&self) -> Option<&Block> {
        self.as_entity().and_then(Node::as_block)
    }

    pub fn as_matches(&self) -> Option<&[Block]> {
        match self {
            Self::Matches(blocks) => Some(blocks),
            _ => None,
        }
    }

    pub fn as_member(&self) -> Option<&Member> {
        match self {
            Self::Member(member) => Some(member),
            _ => None,
        }
    }
}

impl From<Block> for Lookup {
    fn from(block: Block) -> Self {
        Self::Entity(Node::Block(block))
    }
}

impl From<Page> for Lookup {
    fn from(page: Page) -> Self {
        Self::Entity(Node::Page(page))
    }
}
