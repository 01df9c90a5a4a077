//! Raw record types for the Roam graph.
//!
//! These mirror what the graph's `pull` API returns for `[*]`-style selectors.
//! The in-app API spells attributes with a leading colon (`:block/uid`), some
//! backends return them bare (`block/uid`); both deserialize.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::error::{Result, RoamError};

/// Separator between an attribute key and its in-place value (`Status:: Done`).
pub const ATTRIBUTE_DELIMITER: &str = "::";

/// Base URL for deep links into the hosted app.
pub const APP_URL: &str = "https://roamresearch.com/#/app";

/// Length of uids minted by [`generate_uid`].
pub const UID_LENGTH: usize = 9;

const UID_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-_";

/// Rows returned by a datalog `q` call. Each row is one `:find` tuple.
pub type QueryRows = Vec<Vec<Value>>;

// ── Pointers ──────────────────────────────────────────────────────

/// A `{":db/id": n}` pointer to another record.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NodeRef {
    #[serde(rename = ":db/id", alias = "db/id")]
    pub id: i64,
}

impl NodeRef {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

/// Anything `pull` accepts as an entity id: an internal db id or a block/page uid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EntityId {
    Db(i64),
    Uid(String),
}

impl EntityId {
    /// `0` and the empty uid never name a record.
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Db(id) => *id == 0,
            Self::Uid(uid) => uid.is_empty(),
        }
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(id) => write!(f, "{id}"),
            Self::Uid(uid) => write!(f, "[:block/uid \"{uid}\"]"),
        }
    }
}

impl From<i64> for EntityId {
    fn from(id: i64) -> Self {
        Self::Db(id)
    }
}

impl From<NodeRef> for EntityId {
    fn from(node: NodeRef) -> Self {
        Self::Db(node.id)
    }
}

impl From<&str> for EntityId {
    fn from(uid: &str) -> Self {
        Self::Uid(uid.to_string())
    }
}

impl From<String> for EntityId {
    fn from(uid: String) -> Self {
        Self::Uid(uid)
    }
}

impl TryFrom<&Value> for EntityId {
    type Error = RoamError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::Number(n) => n
                .as_i64()
                .map(Self::Db)
                .ok_or_else(|| RoamError::InvalidRecord(format!("non-integer entity id {n}"))),
            Value::String(uid) => Ok(Self::Uid(uid.clone())),
            other => Err(RoamError::InvalidRecord(format!(
                "cannot use {other} as an entity id"
            ))),
        }
    }
}

// ── Records ───────────────────────────────────────────────────────

/// One pulled page or block.
///
/// Pages carry `title`, blocks carry `string`. `order` is the position among
/// siblings and is not guaranteed to be consistent with the order `children`
/// arrives in.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawNode {
    #[serde(rename = ":db/id", alias = "db/id", skip_serializing_if = "Option::is_none")]
    pub db_id: Option<i64>,

    #[serde(rename = ":block/uid", alias = "block/uid", skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(rename = ":node/title", alias = "node/title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = ":block/string", alias = "block/string", skip_serializing_if = "Option::is_none")]
    pub string: Option<String>,

    #[serde(rename = ":block/order", alias = "block/order", skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,

    #[serde(rename = ":block/children", alias = "block/children", default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeRef>,

    #[serde(rename = ":block/refs", alias = "block/refs", default, skip_serializing_if = "Vec::is_empty")]
    pub refs: Vec<NodeRef>,

    #[serde(rename = ":block/page", alias = "block/page", skip_serializing_if = "Option::is_none")]
    pub page: Option<NodeRef>,

    #[serde(rename = ":block/open", alias = "block/open", skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,

    #[serde(rename = ":block/heading", alias = "block/heading", skip_serializing_if = "Option::is_none")]
    pub heading: Option<i64>,

    #[serde(rename = ":create/time", alias = "create/time", skip_serializing_if = "Option::is_none")]
    pub create_time: Option<i64>,

    #[serde(rename = ":edit/time", alias = "edit/time", skip_serializing_if = "Option::is_none")]
    pub edit_time: Option<i64>,
}

impl RawNode {
    /// Decode a pull payload.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Pages are the records that carry a title.
    pub fn is_page(&self) -> bool {
        self.title.is_some()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.create_time.and_then(DateTime::from_timestamp_millis)
    }

    pub fn edited_at(&self) -> Option<DateTime<Utc>> {
        self.edit_time.and_then(DateTime::from_timestamp_millis)
    }
}

// ── Helpers ───────────────────────────────────────────────────────

/// Canonical attribute text: `name::value`.
pub fn attribute_string(name: &str, value: &str) -> String {
    format!("{name}{ATTRIBUTE_DELIMITER}{value}")
}

/// Deep link for a page or block uid.
pub fn url_for_uid(graph_name: &str, uid: &str) -> String {
    format!("{APP_URL}/{graph_name}/page/{uid}")
}

/// Mint a fresh 9-character uid over the graph's uid alphabet.
pub fn generate_uid() -> String {
    // Bytes 6 and 8 carry the v4 version/variant bits.
    const RANDOM_BYTES: [usize; UID_LENGTH] = [0, 1, 2, 3, 4, 5, 10, 11, 12];
    let bytes = Uuid::new_v4().into_bytes();
    RANDOM_BYTES
        .iter()
        .map(|&i| UID_ALPHABET[(bytes[i] & 0x3f) as usize] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_node_accepts_both_key_spellings() {
        let colon = serde_json::json!({
            ":db/id": 42,
            ":block/uid": "abc123XYZ",
            ":block/string": "Status:: Done",
            ":block/order": 3,
            ":block/children": [{":db/id": 7}, {":db/id": 8}],
            ":block/page": {":db/id": 1},
        });
        let bare = serde_json::json!({
            "db/id": 42,
            "block/uid": "abc123XYZ",
            "block/string": "Status:: Done",
            "block/order": 3,
            "block/children": [{"db/id": 7}, {"db/id": 8}],
            "block/page": {"db/id": 1},
        });

        let a = RawNode::from_value(colon).unwrap();
        let b = RawNode::from_value(bare).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.uid.as_deref(), Some("abc123XYZ"));
        assert_eq!(a.children, vec![NodeRef::new(7), NodeRef::new(8)]);
        assert_eq!(a.page, Some(NodeRef::new(1)));
        assert!(!a.is_page());
    }

    #[test]
    fn raw_node_serializes_with_colon_keys() {
        let node = RawNode {
            db_id: Some(1),
            uid: Some("pageuid01".to_string()),
            title: Some("Status".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json[":node/title"], "Status");
        assert!(json.get(":block/children").is_none());
    }

    #[test]
    fn timestamps_convert_from_millis() {
        let node = RawNode {
            edit_time: Some(1_700_000_000_000),
            ..Default::default()
        };
        let edited = node.edited_at().unwrap();
        assert_eq!(edited.timestamp(), 1_700_000_000);
        assert!(node.created_at().is_none());
    }

    #[test]
    fn entity_id_from_query_values() {
        assert_eq!(
            EntityId::try_from(&serde_json::json!(12)).unwrap(),
            EntityId::Db(12)
        );
        assert_eq!(
            EntityId::try_from(&serde_json::json!("uid")).unwrap(),
            EntityId::Uid("uid".to_string())
        );
        assert!(EntityId::try_from(&serde_json::json!(null)).is_err());
        assert!(EntityId::Db(0).is_falsy());
        assert!(EntityId::Uid(String::new()).is_falsy());
        assert!(!EntityId::Db(5).is_falsy());
    }

    #[test]
    fn generated_uids_use_the_uid_alphabet() {
        let uid = generate_uid();
        assert_eq!(uid.len(), UID_LENGTH);
        assert!(uid.bytes().all(|b| UID_ALPHABET.contains(&b)));
        assert_ne!(uid, generate_uid());
    }

    #[test]
    fn attribute_and_url_helpers() {
        assert_eq!(attribute_string("Status", "Done"), "Status::Done");
        assert_eq!(
            url_for_uid("MY_GRAPH", "abc"),
            "https://roamresearch.com/#/app/MY_GRAPH/page/abc"
        );
    }
}
