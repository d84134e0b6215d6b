use super::*;
use bqp_core::plan::{FileAnalysis, StatementCategory};
use bqp_core::project::LocalFile;
use bqp_core::resource::ResourceKind;
use std::path::{Path, PathBuf};

fn analyzed(
    rel: &str,
    sql: &str,
    dest: &str,
    refs: &[&str],
) -> (LocalFile, FileAnalysis) {
    (
        LocalFile {
            path: PathBuf::from("bigquery").join(rel),
            sql: sql.to_string(),
        },
        FileAnalysis {
            destinations: vec![(dest.to_string(), ResourceKind::Table)],
            references: refs.iter().map(|r| r.to_string()).collect(),
            category: StatementCategory::Ddl,
        },
    )
}

#[test]
fn test_bundle_orders_dependencies_first() {
    let files = vec![
        analyzed(
            "@default/ds/a/ddl.sql",
            "CREATE TABLE ds.a AS SELECT * FROM ds.b",
            "ds.a",
            &["ds.b"],
        ),
        analyzed(
            "@default/ds/b/ddl.sql",
            "CREATE TABLE ds.b (x INT64)",
            "ds.b",
            &[],
        ),
    ];
    let plan = plan::build_plan(files, Path::new("bigquery"), DEFAULT_PROJECT).unwrap();

    let script = render_bundle(&plan);
    let pos_a = script.find("ds.a").unwrap();
    let pos_b = script.find("CREATE TABLE ds.b").unwrap();
    assert!(pos_b < pos_a, "{script}");
}

#[test]
fn test_bundle_headers_and_semicolons() {
    let files = vec![analyzed(
        "@default/ds/t/ddl.sql",
        "CREATE TABLE ds.t (x INT64)",
        "ds.t",
        &[],
    )];
    let plan = plan::build_plan(files, Path::new("bigquery"), DEFAULT_PROJECT).unwrap();

    let script = render_bundle(&plan);
    assert!(script.starts_with("-- @default/ds/t/ddl\n"), "{script}");
    assert!(script.contains("CREATE TABLE ds.t (x INT64);\n"), "{script}");
}

#[test]
fn test_bundle_keeps_existing_semicolon() {
    let files = vec![analyzed(
        "@default/ds/t/ddl.sql",
        "CREATE TABLE ds.t (x INT64);",
        "ds.t",
        &[],
    )];
    let plan = plan::build_plan(files, Path::new("bigquery"), DEFAULT_PROJECT).unwrap();

    let script = render_bundle(&plan);
    assert!(!script.contains(";;"), "{script}");
}
