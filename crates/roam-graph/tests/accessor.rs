//! Accessor tests against the in-memory backend and a scripted stub.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use roam_core::{BlockInput, EntityId, Location, NodeRef, PageInput, QueryRows, RawNode};
use roam_graph::client::Result;
use roam_graph::{GraphBackend, GraphError, MemoryBackend, Roam};

fn fixture() -> (Roam, String, String) {
    let mut backend = MemoryBackend::new();
    let projects = backend.add_page("Projects").unwrap();
    backend.add_page("Status").unwrap();
    let block = backend.add_block(&projects, "Status:: [[Done]]").unwrap();
    backend.add_block(&projects, "plain note").unwrap();
    let roam = Roam::new(Arc::new(backend), "MY_GRAPH");
    (roam, projects, block)
}

/// Backend that answers every query with fixed rows and fails every write.
struct ScriptedBackend {
    rows: QueryRows,
}

#[async_trait]
impl GraphBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn q(&self, _query: &str, _inputs: &[Value]) -> Result<QueryRows> {
        Ok(self.rows.clone())
    }

    async fn pull(&self, _selector: &str, id: &EntityId) -> Result<Option<RawNode>> {
        Ok(match id {
            EntityId::Db(db_id) => Some(RawNode {
                db_id: Some(*db_id),
                uid: Some(format!("uid-{db_id}")),
                ..Default::default()
            }),
            EntityId::Uid(_) => None,
        })
    }

    async fn create_block(&self, _: &Location, _: &BlockInput) -> Result<()> {
        Err(GraphError::backend("scripted", anyhow::anyhow!("read-only")))
    }

    async fn update_block(&self, _: &BlockInput) -> Result<()> {
        Err(GraphError::backend("scripted", anyhow::anyhow!("read-only")))
    }

    async fn move_block(&self, _: &Location, _: &BlockInput) -> Result<()> {
        Err(GraphError::backend("scripted", anyhow::anyhow!("read-only")))
    }

    async fn delete_block(&self, _: &BlockInput) -> Result<()> {
        Err(GraphError::backend("scripted", anyhow::anyhow!("read-only")))
    }

    async fn create_page(&self, _: &PageInput) -> Result<()> {
        Err(GraphError::backend("scripted", anyhow::anyhow!("read-only")))
    }

    async fn update_page(&self, _: &PageInput) -> Result<()> {
        Err(GraphError::backend("scripted", anyhow::anyhow!("read-only")))
    }

    async fn delete_page(&self, _: &PageInput) -> Result<()> {
        Err(GraphError::backend("scripted", anyhow::anyhow!("read-only")))
    }
}

fn scripted(rows: QueryRows) -> Roam {
    Roam::new(Arc::new(ScriptedBackend { rows }), "MY_GRAPH")
}

#[tokio::test]
async fn test_pull_with_falsy_id_is_absent() {
    let (roam, _, _) = fixture();
    assert!(roam.pull(0i64).await.unwrap().is_none());
    assert!(roam.pull("").await.unwrap().is_none());
    assert!(roam.pull(9_999i64).await.unwrap().is_none());
}

#[tokio::test]
async fn test_query_first_resolves_first_column() {
    let roam = scripted(vec![vec![json!(7), json!("ignored")], vec![json!(8)]]);
    let node = roam.query_first("[:find ?e]", &[]).await.unwrap().unwrap();
    assert_eq!(node.db_id, Some(7));
}

#[tokio::test]
async fn test_query_first_with_no_rows_or_empty_row() {
    assert!(scripted(vec![]).query_first("[:find ?e]", &[]).await.unwrap().is_none());
    assert!(scripted(vec![vec![]])
        .query_first("[:find ?e]", &[])
        .await
        .unwrap()
        .is_none());
    assert!(scripted(vec![vec![Value::Null]])
        .query_first("[:find ?e]", &[])
        .await
        .unwrap()
        .is_none());
    assert!(scripted(vec![vec![json!(false)]])
        .query_first("[:find ?e]", &[])
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_query_first_rejects_non_id_values() {
    let err = scripted(vec![vec![json!({"not": "an id"})]])
        .query_first("[:find ?e]", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::Record(_)));
    assert_eq!(err.to_string().matches("Invalid record").count(), 1);
}

#[tokio::test]
async fn test_page_and_block_lookups() {
    let (roam, projects, block) = fixture();

    let page = roam.page_by_title("Projects").await.unwrap().unwrap();
    assert_eq!(page.uid.as_deref(), Some(projects.as_str()));
    assert!(roam.page_by_title("Nope").await.unwrap().is_none());

    let raw = roam.block_by_uid(&block).await.unwrap().unwrap();
    assert_eq!(raw.string.as_deref(), Some("Status:: [[Done]]"));
    assert_eq!(
        roam.get_uid(NodeRef::new(raw.db_id.unwrap())).await.unwrap(),
        Some(block)
    );
}

#[tokio::test]
async fn test_list_pages() {
    let (roam, _, _) = fixture();
    let mut titles: Vec<String> = roam
        .list_pages()
        .await
        .unwrap()
        .into_iter()
        .filter_map(|p| p.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["Projects", "Status"]);
    assert_eq!(roam.list_page_ids().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_back_references() {
    let (roam, _, block) = fixture();
    assert_eq!(
        roam.block_uids_referencing_page("Status").await.unwrap(),
        vec![block]
    );
    // "Done" never existed as a page, so nothing references it.
    assert!(roam
        .block_uids_referencing_page("Done")
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn test_mutations_round_trip() {
    let (roam, projects, block) = fixture();

    roam.create_block(
        &Location::new(projects.clone(), 0),
        &BlockInput::with_uid("newblock1").text("top"),
    )
    .await
    .unwrap();
    let created = roam.block_by_uid("newblock1").await.unwrap().unwrap();
    assert_eq!(created.order, Some(0));

    roam.update_block(&BlockInput::with_uid(block.clone()).text("Status:: [[Doing]]"))
        .await
        .unwrap();
    let updated = roam.block_by_uid(&block).await.unwrap().unwrap();
    assert_eq!(updated.string.as_deref(), Some("Status:: [[Doing]]"));

    roam.update_page(&projects, "Archive").await.unwrap();
    assert!(roam.page_by_title("Archive").await.unwrap().is_some());

    roam.delete_block(&block).await.unwrap();
    assert!(roam.block_by_uid(&block).await.unwrap().is_none());

    roam.delete_page(&projects).await.unwrap();
    assert_eq!(roam.list_page_ids().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_backend_errors_propagate() {
    let roam = scripted(vec![]);
    let err = roam.delete_block("anything").await.unwrap_err();
    assert!(matches!(err, GraphError::Backend { .. }));
    assert!(err.to_string().contains("read-only"));
}

#[tokio::test]
async fn test_memory_backend_rejects_foreign_queries() {
    let (roam, _, _) = fixture();
    let err = roam
        .query("[:find ?e :where [?e :block/heading 1]]", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, GraphError::UnsupportedQuery(_)));
}

#[tokio::test]
async fn test_snapshot_reload() {
    let mut backend = MemoryBackend::new();
    let page = backend.add_page("Saved").unwrap();
    backend.add_block(&page, "kept").unwrap();
    let json = serde_json::to_value(backend.snapshot().await).unwrap();

    let reloaded = Roam::new(Arc::new(MemoryBackend::from_json(json).unwrap()), "MY_GRAPH");
    let raw = reloaded.page_by_title("Saved").await.unwrap().unwrap();
    assert_eq!(raw.children.len(), 1);
    assert_eq!(
        reloaded.url_for_uid(&page),
        format!("https://roamresearch.com/#/app/MY_GRAPH/page/{page}")
    );
}
