//! In-memory graph backend.
//!
//! Holds every record in a map keyed by db id and answers the accessor's own
//! datalog queries (see [`crate::queries`]). Any other query text is rejected
//! with [`GraphError::UnsupportedQuery`]; this is not a datalog engine.
//!
//! Mutations keep the derived attributes consistent: sibling `order` is
//! renumbered densely, `:block/page` follows moves, and `:block/refs` is
//! re-derived from the block string (`[[Title]]`, `#Tag`, a leading `key::`
//! and `((uid))` block refs). Only references to existing records are kept.
//!
//! `:block/children` is kept in insertion order, not sibling order, the same
//! way the hosted engine hands children back unsorted.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use chrono::Utc;
use regex::Regex;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use roam_core::{generate_uid, BlockInput, EntityId, Location, NodeRef, PageInput, QueryRows, RawNode};

use crate::client::{GraphBackend, GraphError, Result};
use crate::queries::{BLOCK_BY_UID, BLOCK_UIDS_REFERENCING_PAGE, LIST_PAGE_IDS, PAGE_BY_TITLE};

/// A graph held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: RwLock<MemoryState>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pre-existing records. Every record must carry a db id.
    pub fn from_nodes(nodes: Vec<RawNode>) -> Result<Self> {
        let mut state = MemoryState::default();
        for node in nodes {
            let id = node.db_id.ok_or_else(|| {
                GraphError::InvalidMutation(format!("record {:?} has no :db/id", node.uid))
            })?;
            state.next_id = state.next_id.max(id + 1);
            state.nodes.insert(id, node);
        }
        Ok(Self {
            state: RwLock::new(state),
        })
    }

    /// Build from a JSON array of pulled records (a saved snapshot).
    pub fn from_json(value: Value) -> Result<Self> {
        let nodes: Vec<RawNode> =
            serde_json::from_value(value).map_err(roam_core::RoamError::from)?;
        Self::from_nodes(nodes)
    }

    /// Add a page while building a fixture. Returns its uid.
    pub fn add_page(&mut self, title: &str) -> Result<String> {
        let state = self.state.get_mut();
        let id = state.insert_page(title, None)?;
        Ok(state.uid_of(id))
    }

    /// Append a block under `parent_uid` while building a fixture. Returns its uid.
    pub fn add_block(&mut self, parent_uid: &str, text: &str) -> Result<String> {
        let state = self.state.get_mut();
        let id = state.insert_block(&Location::last(parent_uid), &BlockInput::default().text(text))?;
        Ok(state.uid_of(id))
    }

    /// Copy of every record, ordered by db id.
    pub async fn snapshot(&self) -> Vec<RawNode> {
        self.state.read().await.nodes.values().cloned().collect()
    }
}

#[async_trait]
impl GraphBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn q(&self, query: &str, inputs: &[Value]) -> Result<QueryRows> {
        let state = self.state.read().await;
        let input = || {
            inputs.first().and_then(Value::as_str).ok_or_else(|| {
                GraphError::UnsupportedQuery(format!("{query} expects one string input"))
            })
        };

        let rows = match query {
            PAGE_BY_TITLE => single_row(state.id_by_title(input()?)),
            BLOCK_BY_UID => single_row(state.id_by_uid(input()?)),
            LIST_PAGE_IDS => state
                .nodes
                .values()
                .filter(|n| n.is_page() && n.uid.is_some())
                .filter_map(|n| n.db_id)
                .map(|id| vec![json!(id)])
                .collect(),
            BLOCK_UIDS_REFERENCING_PAGE => match state.id_by_title(input()?) {
                Some(page_id) => state
                    .nodes
                    .values()
                    .filter(|n| n.refs.iter().any(|r| r.id == page_id))
                    .filter_map(|n| n.uid.clone())
                    .map(|uid| vec![json!(uid)])
                    .collect(),
                None => Vec::new(),
            },
            other => return Err(GraphError::UnsupportedQuery(other.to_string())),
        };
        Ok(rows)
    }

    async fn pull(&self, selector: &str, id: &EntityId) -> Result<Option<RawNode>> {
        tracing::trace!(selector, id = %id, "memory pull");
        let state = self.state.read().await;
        Ok(state
            .resolve(id)
            .and_then(|db_id| state.nodes.get(&db_id).cloned()))
    }

    async fn create_block(&self, location: &Location, block: &BlockInput) -> Result<()> {
        self.state.write().await.insert_block(location, block)?;
        Ok(())
    }

    async fn update_block(&self, block: &BlockInput) -> Result<()> {
        self.state.write().await.update_block(block)
    }

    async fn move_block(&self, location: &Location, block: &BlockInput) -> Result<()> {
        self.state.write().await.move_block(location, block)
    }

    async fn delete_block(&self, block: &BlockInput) -> Result<()> {
        let mut state = self.state.write().await;
        let uid = required(&block.uid, "delete-block requires a uid")?;
        let id = state.require_block(uid)?;
        state.remove_subtree(id);
        Ok(())
    }

    async fn create_page(&self, page: &PageInput) -> Result<()> {
        let title = required(&page.title, "create-page requires a title")?;
        self.state
            .write()
            .await
            .insert_page(title, page.uid.clone())?;
        Ok(())
    }

    async fn update_page(&self, page: &PageInput) -> Result<()> {
        self.state.write().await.rename_page(page)
    }

    async fn delete_page(&self, page: &PageInput) -> Result<()> {
        let mut state = self.state.write().await;
        let uid = required(&page.uid, "delete-page requires a uid")?;
        let id = state.require_page(uid)?;
        state.remove_subtree(id);
        Ok(())
    }
}

// ── State ────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct MemoryState {
    nodes: BTreeMap<i64, RawNode>,
    next_id: i64,
}

impl MemoryState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id = self.next_id.max(1);
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn uid_of(&self, id: i64) -> String {
        self.nodes
            .get(&id)
            .and_then(|n| n.uid.clone())
            .unwrap_or_default()
    }

    fn id_by_uid(&self, uid: &str) -> Option<i64> {
        self.nodes
            .iter()
            .find(|(_, n)| n.uid.as_deref() == Some(uid))
            .map(|(id, _)| *id)
    }

    fn id_by_title(&self, title: &str) -> Option<i64> {
        self.nodes
            .iter()
            .find(|(_, n)| n.title.as_deref() == Some(title))
            .map(|(id, _)| *id)
    }

    fn resolve(&self, id: &EntityId) -> Option<i64> {
        match id {
            EntityId::Db(db_id) => self.nodes.contains_key(db_id).then_some(*db_id),
            EntityId::Uid(uid) => self.id_by_uid(uid),
        }
    }

    fn require(&self, kind: &str, uid: &str) -> Result<i64> {
        self.id_by_uid(uid).ok_or_else(|| GraphError::NotFound {
            kind: kind.to_string(),
            id: uid.to_string(),
        })
    }

    fn require_block(&self, uid: &str) -> Result<i64> {
        let id = self.require("block", uid)?;
        if self.nodes[&id].is_page() {
            return Err(GraphError::InvalidMutation(format!("{uid} is a page, not a block")));
        }
        Ok(id)
    }

    fn require_page(&self, uid: &str) -> Result<i64> {
        let id = self.require("page", uid)?;
        if !self.nodes[&id].is_page() {
            return Err(GraphError::InvalidMutation(format!("{uid} is a block, not a page")));
        }
        Ok(id)
    }

    fn ensure_uid_free(&self, uid: &str) -> Result<()> {
        match self.id_by_uid(uid) {
            Some(_) => Err(GraphError::InvalidMutation(format!("uid {uid} already exists"))),
            None => Ok(()),
        }
    }

    /// The page a record lives on; pages own themselves.
    fn page_of(&self, id: i64) -> Option<i64> {
        let node = self.nodes.get(&id)?;
        if node.is_page() {
            Some(id)
        } else {
            node.page.map(|p| p.id)
        }
    }

    fn parent_of(&self, child_id: i64) -> Option<i64> {
        self.nodes
            .iter()
            .find(|(_, n)| n.children.iter().any(|c| c.id == child_id))
            .map(|(id, _)| *id)
    }

    /// `id` followed by everything nested under it, breadth first.
    fn subtree(&self, id: i64) -> Vec<i64> {
        let mut out = vec![id];
        let mut cursor = 0;
        while cursor < out.len() {
            if let Some(node) = self.nodes.get(&out[cursor]) {
                out.extend(node.children.iter().map(|c| c.id));
            }
            cursor += 1;
        }
        out
    }

    fn ordered_children(&self, parent_id: i64) -> Vec<i64> {
        let Some(parent) = self.nodes.get(&parent_id) else {
            return Vec::new();
        };
        let mut ids: Vec<i64> = parent.children.iter().map(|c| c.id).collect();
        ids.sort_by_key(|id| {
            self.nodes
                .get(id)
                .and_then(|n| n.order)
                .unwrap_or(i64::MAX)
        });
        ids
    }

    fn renumber(&mut self, ordered: &[i64]) {
        for (position, id) in ordered.iter().enumerate() {
            if let Some(node) = self.nodes.get_mut(id) {
                node.order = Some(position as i64);
            }
        }
    }

    /// Negative or past-the-end orders append.
    fn attach(&mut self, parent_id: i64, child_id: i64, order: i64) {
        let mut siblings = self.ordered_children(parent_id);
        let position = usize::try_from(order)
            .ok()
            .filter(|&p| p <= siblings.len())
            .unwrap_or(siblings.len());
        siblings.insert(position, child_id);
        if let Some(parent) = self.nodes.get_mut(&parent_id) {
            parent.children.push(NodeRef::new(child_id));
        }
        self.renumber(&siblings);
    }

    fn detach(&mut self, child_id: i64) {
        let Some(parent_id) = self.parent_of(child_id) else {
            return;
        };
        if let Some(parent) = self.nodes.get_mut(&parent_id) {
            parent.children.retain(|c| c.id != child_id);
        }
        let remaining = self.ordered_children(parent_id);
        self.renumber(&remaining);
    }

    fn insert_page(&mut self, title: &str, uid: Option<String>) -> Result<i64> {
        if self.id_by_title(title).is_some() {
            return Err(GraphError::InvalidMutation(format!(
                "page {title:?} already exists"
            )));
        }
        let uid = uid.unwrap_or_else(generate_uid);
        self.ensure_uid_free(&uid)?;

        let id = self.allocate_id();
        let now = Utc::now().timestamp_millis();
        self.nodes.insert(
            id,
            RawNode {
                db_id: Some(id),
                uid: Some(uid),
                title: Some(title.to_string()),
                create_time: Some(now),
                edit_time: Some(now),
                ..Default::default()
            },
        );
        Ok(id)
    }

    fn insert_block(&mut self, location: &Location, block: &BlockInput) -> Result<i64> {
        let parent_id = self.require("parent", &location.parent_uid)?;
        let uid = block.uid.clone().unwrap_or_else(generate_uid);
        self.ensure_uid_free(&uid)?;

        let string = block.string.clone().unwrap_or_default();
        let refs = self.extract_refs(&string);
        let page = self.page_of(parent_id).map(NodeRef::new);
        let id = self.allocate_id();
        let now = Utc::now().timestamp_millis();
        self.nodes.insert(
            id,
            RawNode {
                db_id: Some(id),
                uid: Some(uid),
                string: Some(string),
                open: Some(block.open.unwrap_or(true)),
                page,
                refs,
                create_time: Some(now),
                edit_time: Some(now),
                ..Default::default()
            },
        );
        self.attach(parent_id, id, location.order);
        Ok(id)
    }

    fn update_block(&mut self, block: &BlockInput) -> Result<()> {
        let uid = required(&block.uid, "update-block requires a uid")?;
        let id = self.require_block(uid)?;
        let refs = block.string.as_deref().map(|s| self.extract_refs(s));

        if let Some(node) = self.nodes.get_mut(&id) {
            if let (Some(string), Some(refs)) = (&block.string, refs) {
                node.string = Some(string.clone());
                node.refs = refs;
            }
            if let Some(open) = block.open {
                node.open = Some(open);
            }
            node.edit_time = Some(Utc::now().timestamp_millis());
        }
        Ok(())
    }

    fn move_block(&mut self, location: &Location, block: &BlockInput) -> Result<()> {
        let uid = required(&block.uid, "move-block requires a uid")?;
        let id = self.require_block(uid)?;
        let parent_id = self.require("parent", &location.parent_uid)?;
        let subtree = self.subtree(id);
        if subtree.contains(&parent_id) {
            return Err(GraphError::InvalidMutation(format!(
                "cannot move {uid} under its own descendant {}",
                location.parent_uid
            )));
        }

        self.detach(id);
        self.attach(parent_id, id, location.order);
        let page = self.page_of(parent_id).map(NodeRef::new);
        for moved in subtree {
            if let Some(node) = self.nodes.get_mut(&moved) {
                node.page = page;
            }
        }
        Ok(())
    }

    fn rename_page(&mut self, page: &PageInput) -> Result<()> {
        let uid = required(&page.uid, "update-page requires a uid")?;
        let title = required(&page.title, "update-page requires a title")?;
        let id = self.require_page(uid)?;
        if self.id_by_title(title).is_some_and(|other| other != id) {
            return Err(GraphError::InvalidMutation(format!(
                "page {title:?} already exists"
            )));
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.title = Some(title.to_string());
            node.edit_time = Some(Utc::now().timestamp_millis());
        }
        Ok(())
    }

    fn remove_subtree(&mut self, id: i64) {
        self.detach(id);
        let removed = self.subtree(id);
        for gone in &removed {
            self.nodes.remove(gone);
        }
        for node in self.nodes.values_mut() {
            node.refs.retain(|r| !removed.contains(&r.id));
        }
    }

    /// Refs derived from block text, deduplicated, in order of first mention.
    fn extract_refs(&self, text: &str) -> Vec<NodeRef> {
        let patterns = reference_patterns();
        let mut refs: Vec<NodeRef> = Vec::new();
        let mut push = |id: Option<i64>| {
            if let Some(id) = id {
                if !refs.iter().any(|r| r.id == id) {
                    refs.push(NodeRef::new(id));
                }
            }
        };

        if let Some(key) = patterns.attribute.captures(text) {
            push(self.id_by_title(key[1].trim()));
        }
        for caps in patterns.page_link.captures_iter(text) {
            push(self.id_by_title(&caps[1]));
        }
        for caps in patterns.tag.captures_iter(text) {
            push(self.id_by_title(&caps[1]));
        }
        for caps in patterns.block_ref.captures_iter(text) {
            push(self.id_by_uid(&caps[1]));
        }
        refs
    }
}

struct ReferencePatterns {
    attribute: Regex,
    page_link: Regex,
    tag: Regex,
    block_ref: Regex,
}

fn reference_patterns() -> &'static ReferencePatterns {
    static PATTERNS: OnceLock<ReferencePatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ReferencePatterns {
        attribute: Regex::new(r"^([^:\n`]+?)::").expect("valid attribute pattern"),
        page_link: Regex::new(r"\[\[([^\[\]]+)\]\]").expect("valid page link pattern"),
        tag: Regex::new(r"#([\w/-]+)").expect("valid tag pattern"),
        block_ref: Regex::new(r"\(\(([\w-]+)\)\)").expect("valid block ref pattern"),
    })
}

fn single_row(id: Option<i64>) -> QueryRows {
    id.map(|id| vec![vec![json!(id)]]).unwrap_or_default()
}

fn required<'a>(field: &'a Option<String>, message: &str) -> Result<&'a str> {
    field
        .as_deref()
        .ok_or_else(|| GraphError::InvalidMutation(message.to_string()))
}
