//! The capability set shared by pages and blocks.
//!
//! An entity is a throwaway view over one pulled record. Children, links and
//! members are fetched again on every call; two views of the same uid share
//! nothing.

use async_trait::async_trait;
use regex::Regex;

use roam_core::{attribute_string, generate_uid, BlockInput, Location, RawNode};
use roam_graph::Roam;

use crate::block::Block;
use crate::error::Result;
use crate::lookup::{Lookup, Member, Node};

/// Member names every entity answers to in [`Entity::get`].
pub const ENTITY_MEMBERS: &[&str] = &[
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
];

/// An optional sign followed by one or more ASCII digits.
fn is_integer_key(key: &str) -> bool {
    let digits = key.strip_prefix(['+', '-']).unwrap_or(key);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[async_trait]
pub trait Entity: Send + Sync {
    fn roam(&self) -> &Roam;

    /// The wrapped snapshot.
    fn raw(&self) -> &RawNode;

    /// Title for pages, block string for blocks.
    fn text(&self) -> &str;

    /// Replace [`Entity::text`] in the graph. The wrapped snapshot is not
    /// touched; pull again to observe the change.
    async fn set_text(&self, value: &str) -> Result<()>;

    /// Names that resolve to members in [`Entity::get`] before any content
    /// match is attempted.
    fn member_names(&self) -> &'static [&'static str];

    /// Resolve one of [`Entity::member_names`].
    async fn member(&self, name: &str) -> Result<Option<Member>>;

    /// Owned, type-erased copy of this view.
    fn to_node(&self) -> Node;

    fn uid(&self) -> &str {
        self.raw().uid.as_deref().unwrap_or_default()
    }

    fn url(&self) -> String {
        self.roam().url_for_uid(self.uid())
    }

    /// Children as pulled records, sorted by sibling order.
    ///
    /// Records without an order sort after every ordered sibling and keep
    /// their fetch order among themselves.
    async fn raw_children(&self) -> Result<Vec<RawNode>> {
        let mut children = Vec::with_capacity(self.raw().children.len());
        for child in &self.raw().children {
            if let Some(raw) = self.roam().pull(*child).await? {
                children.push(raw);
            }
        }
        children.sort_by_key(|c| (c.order.is_none(), c.order));
        Ok(children)
    }

    /// Children in sibling order. Nested structure is always blocks.
    async fn children(&self) -> Result<Vec<Block>> {
        let roam = self.roam();
        Ok(self
            .raw_children()
            .await?
            .into_iter()
            .map(|raw| Block::new(roam.clone(), raw))
            .collect())
    }

    /// Dynamic child lookup.
    ///
    /// 1. An integer key is a 0-based position among the children. Negative
    ///    or out-of-range keys, however large, are absent.
    /// 2. A member name resolves to that member. Members shadow content, so
    ///    a child whose text is exactly `"children"` cannot be reached here.
    /// 3. Otherwise the first hit of: a child whose text equals `key`; the
    ///    first child declaring `key::`; every child matching `key` as a regex.
    ///
    /// `None` when nothing matches. A key that is not a valid regex simply
    /// matches nothing in step 3.
    async fn get(&self, key: &str) -> Result<Option<Lookup>> {
        if is_integer_key(key) {
            // Too large for usize or negative: no such position.
            let Ok(index) = key.trim_start_matches('+').parse::<usize>() else {
                return Ok(None);
            };
            let child = self.children().await?.into_iter().nth(index);
            return Ok(child.map(Lookup::from));
        }

        if self.member_names().iter().any(|name| *name == key) {
            return Ok(self.member(key).await?.map(Lookup::Member));
        }

        let children = self.children().await?;
        if let Some(exact) = children.iter().find(|c| c.text() == key) {
            return Ok(Some(Lookup::from(exact.clone())));
        }
        if let Ok(declaration) = Regex::new(&format!("^{key}::")) {
            if let Some(declared) = children.iter().find(|c| declaration.is_match(c.text())) {
                return Ok(Some(Lookup::from(declared.clone())));
            }
        }
        if let Ok(pattern) = Regex::new(key) {
            let matches: Vec<Block> = children
                .into_iter()
                .filter(|c| pattern.is_match(c.text()))
                .collect();
            if !matches.is_empty() {
                return Ok(Some(Lookup::Matches(matches)));
            }
        }
        Ok(None)
    }

    /// The first child whose text is exactly `content`.
    async fn child_with_value(&self, content: &str) -> Result<Option<Block>> {
        Ok(self
            .children()
            .await?
            .into_iter()
            .find(|c| c.text() == content))
    }

    /// Fold [`Entity::get`] over `path`.
    ///
    /// Every intermediate step must land on a single entity; a member value
    /// or a list of regex matches ends the walk as `None`. An empty path
    /// yields this entity.
    async fn child_at_path(&self, path: &[&str]) -> Result<Option<Lookup>> {
        let Some((first, rest)) = path.split_first() else {
            return Ok(Some(Lookup::Entity(self.to_node())));
        };
        let Some(mut found) = self.get(first).await? else {
            return Ok(None);
        };
        for key in rest {
            let Some(node) = found.into_entity() else {
                return Ok(None);
            };
            found = match node.get(key).await? {
                Some(next) => next,
                None => return Ok(None),
            };
        }
        Ok(Some(found))
    }

    /// Children whose text matches `regex`; `None` rather than an empty list
    /// when nothing matches.
    async fn children_matching(&self, regex: &Regex) -> Result<Option<Vec<Block>>> {
        let matches: Vec<Block> = self
            .children()
            .await?
            .into_iter()
            .filter(|c| regex.is_match(c.text()))
            .collect();
        Ok((!matches.is_empty()).then_some(matches))
    }

    /// Every record this one references. Pages and blocks are mixed.
    async fn linked_entities(&self) -> Result<Vec<RawNode>> {
        let mut linked = Vec::with_capacity(self.raw().refs.len());
        for target in &self.raw().refs {
            if let Some(raw) = self.roam().pull(*target).await? {
                linked.push(raw);
            }
        }
        Ok(linked)
    }

    /// Set `name::value` on the child found by `get(name)`, or append it.
    ///
    /// Uses the same resolution as [`Entity::get`], so an unrelated child
    /// that happens to match `name` as a regex is overwritten too. A member
    /// hit never counts as an existing child.
    async fn set_attribute(&self, name: &str, value: &str) -> Result<()> {
        let existing = match self.get(name).await? {
            Some(Lookup::Entity(node)) => Some(node),
            Some(Lookup::Matches(blocks)) => blocks.into_iter().next().map(Node::Block),
            _ => None,
        };

        match existing {
            Some(node) => node.set_as_attribute(name, value).await,
            None => {
                self.append_child(&attribute_string(name, value)).await?;
                Ok(())
            }
        }
    }

    /// Make this entity's own text the declaration `name::value`.
    async fn set_as_attribute(&self, name: &str, value: &str) -> Result<()> {
        self.set_text(&attribute_string(name, value)).await
    }

    /// Append a child block and return its uid.
    async fn append_child(&self, text: &str) -> Result<String> {
        let uid = generate_uid();
        self.roam()
            .create_block(
                &Location::last(self.uid()),
                &BlockInput::with_uid(uid.clone()).text(text),
            )
            .await?;
        tracing::debug!(parent = self.uid(), uid = %uid, "Appended child block");
        Ok(uid)
    }

    /// Members every entity shares; variants delegate here for names they
    /// do not handle themselves.
    async fn common_member(&self, name: &str) -> Result<Option<Member>> {
        let member = match name {
            "raw" => Member::Raw(self.raw().clone()),
            "text" => Member::Text(self.text().to_string()),
            "uid" => Member::Uid(self.uid().to_string()),
            "url" => Member::Url(self.url()),
            "raw_children" => Member::RawChildren(self.raw_children().await?),
            "children" => Member::Children(self.children().await?),
            "linked_entities" => Member::LinkedEntities(self.linked_entities().await?),
            other => match self.member_names().iter().copied().find(|n| *n == other) {
                Some(method) => Member::Method(method),
                None => return Ok(None),
            },
        };
        Ok(Some(member))
    }
}
