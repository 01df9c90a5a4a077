//! Wire types shared by the in-process mutation primitives and the REST API.
//!
//! Key spellings (`parent-uid`, `graph-name`) are part of the external
//! contract and must not change.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Order value meaning "append after the last sibling".
pub const ORDER_LAST: i64 = -1;

/// REST action names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    Pull,
    Q,
    CreateBlock,
    UpdateBlock,
    CreatePage,
    MoveBlock,
    DeleteBlock,
    DeletePage,
    UpdatePage,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pull => "pull",
            Self::Q => "q",
            Self::CreateBlock => "create-block",
            Self::UpdateBlock => "update-block",
            Self::CreatePage => "create-page",
            Self::MoveBlock => "move-block",
            Self::DeleteBlock => "delete-block",
            Self::DeletePage => "delete-page",
            Self::UpdatePage => "update-page",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a block goes: under `parent-uid`, at sibling position `order`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    #[serde(rename = "parent-uid")]
    pub parent_uid: String,
    pub order: i64,
}

impl Location {
    pub fn new(parent_uid: impl Into<String>, order: i64) -> Self {
        Self {
            parent_uid: parent_uid.into(),
            order,
        }
    }

    /// Tail position under `parent_uid`.
    pub fn last(parent_uid: impl Into<String>) -> Self {
        Self::new(parent_uid, ORDER_LAST)
    }
}

/// Block fields for create/update/move/delete. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlockInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
}

impl BlockInput {
    pub fn with_uid(uid: impl Into<String>) -> Self {
        Self {
            uid: Some(uid.into()),
            ..Default::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.string = Some(text.into());
        self
    }

    pub fn open(mut self, open: bool) -> Self {
        self.open = Some(open);
        self
    }
}

/// Page fields for create/update/delete. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
}

impl PageInput {
    pub fn new(uid: Option<String>, title: Option<String>) -> Self {
        Self { title, uid }
    }
}

/// Action-specific keys of a REST request body, flattened next to
/// `action` and `graph-name`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ActionParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<BlockInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<PageInput>,
}

/// The record echoed back by create-block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BasicBlock {
    pub string: String,
    pub uid: String,
}

/// The record echoed back by create-page / update-page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BasicPage {
    pub title: String,
    pub uid: String,
}
