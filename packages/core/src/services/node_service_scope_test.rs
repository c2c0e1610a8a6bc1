//! NodeService scoping and search tests
//!
//! Covers owner/project isolation, the read-side `NotFound` masking of
//! ownership failures, round-trip persistence, and search semantics.

use crate::db::MemoryStore;
use crate::models::NodeKind;
use crate::services::{CreateNodeParams, NodeService, NodeServiceConfig, NodeServiceError};
use std::sync::Arc;

fn create_test_service() -> NodeService {
    NodeService::new(Arc::new(MemoryStore::new()))
}

async fn create_file_in(
    service: &NodeService,
    owner: &str,
    project: &str,
    name: &str,
    content: Option<&str>,
) -> crate::models::Node {
    service
        .create(CreateNodeParams {
            owner_id: owner.to_string(),
            project_id: project.to_string(),
            parent_id: None,
            kind: NodeKind::File,
            name: name.to_string(),
            content: content.map(String::from),
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_get_round_trip() {
    let service = create_test_service();
    let created = create_file_in(&service, "owner-1", "project-1", "ch1.txt", Some("text")).await;

    let fetched = service.get(&created.id, "owner-1").await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.version, 1);
}

#[tokio::test]
async fn test_update_refreshes_updated_at_and_version() {
    let service = create_test_service();
    let created = create_file_in(&service, "owner-1", "project-1", "ch1.txt", None).await;

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let updated = service.rename(&created.id, "owner-1", "ch2.txt").await.unwrap();

    assert!(updated.updated_at > created.updated_at);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.version, created.version + 1);
}

#[tokio::test]
async fn test_reads_hide_foreign_nodes_as_not_found() {
    let service = create_test_service();
    let node = create_file_in(&service, "owner-1", "project-1", "secret.txt", None).await;

    let err = service.get(&node.id, "owner-2").await.unwrap_err();
    assert!(matches!(err, NodeServiceError::NotFound { .. }));

    let err = service
        .rename(&node.id, "owner-2", "renamed.txt")
        .await
        .unwrap_err();
    assert!(matches!(err, NodeServiceError::NotFound { .. }));

    let err = service.delete(&node.id, "owner-2").await.unwrap_err();
    assert!(matches!(err, NodeServiceError::NotFound { .. }));
}

#[tokio::test]
async fn test_sibling_groups_are_scoped_per_project() {
    let service = create_test_service();

    // Same name at root of two projects: no collision suffix
    let a = create_file_in(&service, "owner-1", "project-1", "Report.txt", None).await;
    let b = create_file_in(&service, "owner-1", "project-2", "Report.txt", None).await;
    assert_eq!(a.name, "Report.txt");
    assert_eq!(b.name, "Report.txt");

    let p1 = service.list_children("owner-1", "project-1", None).await.unwrap();
    assert_eq!(p1.len(), 1);
}

#[tokio::test]
async fn test_parent_in_other_project_is_rejected() {
    let service = create_test_service();
    let foreign_folder = service
        .create(CreateNodeParams {
            owner_id: "owner-1".to_string(),
            project_id: "project-2".to_string(),
            parent_id: None,
            kind: NodeKind::Folder,
            name: "Drafts".to_string(),
            content: None,
        })
        .await
        .unwrap();

    let err = service
        .create(CreateNodeParams {
            owner_id: "owner-1".to_string(),
            project_id: "project-1".to_string(),
            parent_id: Some(foreign_folder.id),
            kind: NodeKind::File,
            name: "ch1.txt".to_string(),
            content: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, NodeServiceError::ParentNotFound { .. }));
}

#[tokio::test]
async fn test_search_name_and_content_semantics() {
    let service = create_test_service();
    create_file_in(&service, "owner-1", "project-1", "Chapter One", Some("The Winter came")).await;
    create_file_in(&service, "owner-1", "project-2", "Chapter Two", None).await;
    create_file_in(&service, "owner-2", "project-1", "Chapter Three", None).await;

    // Name match is case-insensitive and scoped to owner + project
    let hits = service.search("owner-1", "project-1", "chapter").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Chapter One");

    // Content match is case-sensitive
    assert_eq!(
        service.search("owner-1", "project-1", "Winter").await.unwrap().len(),
        1
    );
    assert_eq!(
        service.search("owner-1", "project-1", "winter").await.unwrap().len(),
        0
    );
}

#[tokio::test]
async fn test_search_rejects_blank_query() {
    let service = create_test_service();
    let err = service.search("owner-1", "project-1", "   ").await.unwrap_err();
    assert!(matches!(err, NodeServiceError::InvalidQuery(_)));
}

#[tokio::test]
async fn test_search_truncates_to_limit() {
    let store = Arc::new(MemoryStore::new());
    let service = NodeService::with_config(
        store,
        NodeServiceConfig {
            search_limit: 2,
            ..Default::default()
        },
    );

    for i in 0..4 {
        create_file_in(&service, "owner-1", "project-1", &format!("draft-{}.txt", i), None).await;
    }

    let hits = service.search("owner-1", "project-1", "draft").await.unwrap();
    assert_eq!(hits.len(), 2);
}

#[tokio::test]
async fn test_name_length_limit_is_configurable() {
    let store = Arc::new(MemoryStore::new());
    let service = NodeService::with_config(
        store,
        NodeServiceConfig {
            max_name_len: 10,
            ..Default::default()
        },
    );

    let err = service
        .create(CreateNodeParams {
            owner_id: "owner-1".to_string(),
            project_id: "project-1".to_string(),
            parent_id: None,
            kind: NodeKind::File,
            name: "a-very-long-name.txt".to_string(),
            content: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, NodeServiceError::InvalidName(_)));
}
