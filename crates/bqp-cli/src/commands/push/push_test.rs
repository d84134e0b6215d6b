use super::*;
use crate::cli::OutputFormat;
use bqp_core::CoreError;
use bqp_db::types::{JobMetadata, JobStatistics};
use bqp_db::MockWarehouse;
use std::path::Path;

const PROJECT: &str = "mock-project";

fn touch(path: &Path, content: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn push_args() -> PushArgs {
    PushArgs {
        projects: Vec::new(),
        threads: Some(2),
        format: OutputFormat::Json,
        force: true,
        dry_run: false,
        labels: Vec::new(),
        parameters: Vec::new(),
        maximum_bytes_billed: None,
    }
}

fn config_for(root: &Path) -> Config {
    Config {
        root_path: root.display().to_string(),
        ..Config::default()
    }
}

fn ddl_job(id: &str) -> JobMetadata {
    JobMetadata {
        id: id.to_string(),
        statement_type: Some("CREATE_TABLE".to_string()),
        statistics: Some(JobStatistics {
            total_bytes_processed: Some(1024),
            start_time: None,
            end_time: None,
        }),
        ..JobMetadata::default()
    }
}

#[tokio::test]
async fn test_trivial_push_deploys_single_file() {
    let dir = tempfile::tempdir().unwrap();
    touch(
        &dir.path().join("@default/ds/tbl/ddl.sql"),
        "CREATE TABLE ds.tbl (x INT64)",
    );

    let warehouse = Arc::new(MockWarehouse::new(PROJECT));
    warehouse.add_table("ds", "tbl");
    warehouse.queue_job(ddl_job("job-1"));

    run_push(&push_args(), &config_for(dir.path()), warehouse.clone())
        .await
        .unwrap();

    let submitted = warehouse.submitted();
    assert_eq!(submitted.len(), 1);
    assert!(submitted[0].query.contains("CREATE TABLE ds.tbl"));
}

#[tokio::test]
async fn test_cross_file_dependency_submits_in_order() {
    let dir = tempfile::tempdir().unwrap();
    touch(
        &dir.path().join("@default/ds/a/ddl.sql"),
        "CREATE TABLE ds.a AS SELECT * FROM ds.b",
    );
    touch(
        &dir.path().join("@default/ds/b/ddl.sql"),
        "CREATE TABLE ds.b (x INT64)",
    );

    let warehouse = Arc::new(MockWarehouse::new(PROJECT));
    warehouse.add_table("ds", "a");
    warehouse.add_table("ds", "b");
    warehouse.queue_job(ddl_job("job-1"));
    warehouse.queue_job(ddl_job("job-2"));

    run_push(&push_args(), &config_for(dir.path()), warehouse.clone())
        .await
        .unwrap();

    let submitted = warehouse.submitted();
    assert_eq!(submitted.len(), 2);
    assert!(
        submitted[0].query.contains("ds.b"),
        "dependency must deploy first, got {}",
        submitted[0].query
    );
    assert!(submitted[1].query.contains("ds.a"));
}

#[tokio::test]
async fn test_cycle_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    touch(
        &dir.path().join("@default/ds/x/ddl.sql"),
        "CREATE TABLE ds.x AS SELECT * FROM ds.y",
    );
    touch(
        &dir.path().join("@default/ds/y/ddl.sql"),
        "CREATE TABLE ds.y AS SELECT * FROM ds.x",
    );

    let warehouse = Arc::new(MockWarehouse::new(PROJECT));
    let err = run_push(&push_args(), &config_for(dir.path()), warehouse.clone())
        .await
        .unwrap_err();

    match err.downcast_ref::<CoreError>() {
        Some(CoreError::CycleDetected { nodes }) => {
            assert!(nodes.contains("mock-project.ds.x"));
            assert!(nodes.contains("mock-project.ds.y"));
        }
        other => panic!("expected CycleDetected, got {other:?}"),
    }
    assert!(warehouse.submitted().is_empty());
}

#[tokio::test]
async fn test_failed_parent_suspends_dependent_without_submission() {
    let dir = tempfile::tempdir().unwrap();
    touch(
        &dir.path().join("@default/ds/a/ddl.sql"),
        "CREATE TABLE ds.a AS SELECT * FROM ds.b",
    );
    touch(
        &dir.path().join("@default/ds/b/ddl.sql"),
        "CREATE TABLE ds.b (x INT64)",
    );

    let warehouse = Arc::new(MockWarehouse::new(PROJECT));
    warehouse.queue_job(JobMetadata {
        id: "job-1".to_string(),
        statement_type: Some("CREATE_TABLE".to_string()),
        error_result: Some(bqp_db::types::JobError {
            reason: None,
            message: "quota exceeded".to_string(),
        }),
        ..JobMetadata::default()
    });

    run_push(&push_args(), &config_for(dir.path()), warehouse.clone())
        .await
        .unwrap();

    // only b was ever submitted; a was suspended
    assert_eq!(warehouse.submitted().len(), 1);
}

#[tokio::test]
async fn test_push_reconciles_orphans_with_force() {
    let dir = tempfile::tempdir().unwrap();
    touch(
        &dir.path().join("@default/ds/@routines/r1/ddl.sql"),
        "CREATE FUNCTION ds.r1(x INT64) AS (x)",
    );

    let warehouse = Arc::new(MockWarehouse::new(PROJECT));
    warehouse.add_routine("ds", "r1");
    warehouse.add_routine("ds", "r2");
    warehouse.queue_job(JobMetadata {
        id: "job-1".to_string(),
        statement_type: Some("CREATE_FUNCTION".to_string()),
        statistics: Some(JobStatistics::default()),
        ..JobMetadata::default()
    });

    run_push(&push_args(), &config_for(dir.path()), warehouse.clone())
        .await
        .unwrap();

    assert_eq!(warehouse.deleted(), vec!["ROUTINE:mock-project.ds.r2"]);
}

#[tokio::test]
async fn test_dry_run_submits_dry_jobs_only() {
    let dir = tempfile::tempdir().unwrap();
    touch(
        &dir.path().join("@default/ds/tbl/ddl.sql"),
        "CREATE TABLE ds.tbl (x INT64)",
    );

    let warehouse = Arc::new(MockWarehouse::new(PROJECT));
    warehouse.add_table("ds", "orphan");

    let mut args = push_args();
    args.dry_run = true;
    run_push(&args, &config_for(dir.path()), warehouse.clone())
        .await
        .unwrap();

    let submitted = warehouse.submitted();
    assert_eq!(submitted.len(), 1);
    assert!(submitted[0].dry_run);
    // dry-run reconciliation never deletes
    assert!(warehouse.deleted().is_empty());
}
