use super::*;
use crate::mock::MockWarehouse;
use crate::types::ColumnMetadata;
use std::collections::BTreeMap;

fn table_target() -> SyncTarget {
    SyncTarget::Table {
        project: "mock-project".to_string(),
        dataset: "ds".to_string(),
        name: "t".to_string(),
    }
}

fn remote_metadata() -> ResourceMetadata {
    ResourceMetadata {
        description: Some("remote description".to_string()),
        labels: BTreeMap::from([("env".to_string(), "prod".to_string())]),
        columns: vec![ColumnMetadata {
            name: "x".to_string(),
            description: Some("remote col".to_string()),
        }],
    }
}

#[tokio::test]
async fn test_pull_writes_remote_state_to_disk() {
    let warehouse = MockWarehouse::new("mock-project");
    warehouse.add_table_with("ds", "t", remote_metadata());
    let dir = tempfile::tempdir().unwrap();

    sync_metadata(&warehouse, &table_target(), dir.path(), false)
        .await
        .unwrap();

    let written: ResourceMetadata =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("metadata.json")).unwrap())
            .unwrap();
    assert_eq!(written, remote_metadata());
}

#[tokio::test]
async fn test_push_overlays_local_file_and_updates_remote() {
    let warehouse = MockWarehouse::new("mock-project");
    warehouse.add_table_with("ds", "t", remote_metadata());
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("metadata.json"),
        r#"{"description": "local description", "labels": {"team": "data"}}"#,
    )
    .unwrap();

    sync_metadata(&warehouse, &table_target(), dir.path(), true)
        .await
        .unwrap();

    let remote = warehouse.get_table("mock-project", "ds", "t").await.unwrap();
    assert_eq!(
        remote.metadata.description.as_deref(),
        Some("local description")
    );
    // merged labels: remote's env plus local's team
    assert_eq!(remote.metadata.labels.get("env").map(String::as_str), Some("prod"));
    assert_eq!(remote.metadata.labels.get("team").map(String::as_str), Some("data"));
    // columns untouched locally, so the remote ones survive
    assert_eq!(remote.metadata.columns.len(), 1);

    // the file is rewritten with the merged state
    let written: ResourceMetadata =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("metadata.json")).unwrap())
            .unwrap();
    assert_eq!(written, remote.metadata);
}

#[tokio::test]
async fn test_push_without_local_file_behaves_as_pull() {
    let warehouse = MockWarehouse::new("mock-project");
    warehouse.add_table_with("ds", "t", remote_metadata());
    let dir = tempfile::tempdir().unwrap();

    sync_metadata(&warehouse, &table_target(), dir.path(), true)
        .await
        .unwrap();

    let written: ResourceMetadata =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("metadata.json")).unwrap())
            .unwrap();
    assert_eq!(written, remote_metadata());
}

#[tokio::test]
async fn test_invalid_local_file_is_rejected() {
    let warehouse = MockWarehouse::new("mock-project");
    warehouse.add_table("ds", "t");
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("metadata.json"), "not json").unwrap();

    let err = sync_metadata(&warehouse, &table_target(), dir.path(), true)
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::InvalidMetadata { .. }));
}

#[tokio::test]
async fn test_dataset_target_sync() {
    let warehouse = MockWarehouse::new("mock-project");
    let mut metadata = ResourceMetadata::default();
    metadata.description = Some("sales mart".to_string());
    warehouse.add_dataset_with("ds", metadata);
    let dir = tempfile::tempdir().unwrap();

    let target = SyncTarget::Dataset {
        project: "mock-project".to_string(),
        dataset: "ds".to_string(),
    };
    sync_metadata(&warehouse, &target, dir.path(), false)
        .await
        .unwrap();

    let written: ResourceMetadata =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("metadata.json")).unwrap())
            .unwrap();
    assert_eq!(written.description.as_deref(), Some("sales mart"));
}

#[tokio::test]
async fn test_missing_remote_resource_errors() {
    let warehouse = MockWarehouse::new("mock-project");
    let dir = tempfile::tempdir().unwrap();

    let err = sync_metadata(&warehouse, &table_target(), dir.path(), false)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
