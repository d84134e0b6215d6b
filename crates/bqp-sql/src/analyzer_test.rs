use super::*;
use crate::parser::SqlParser;

fn analyze_sql(sql: &str) -> FileAnalysis {
    let statements = SqlParser::bigquery().parse(sql).unwrap();
    analyze(&statements)
}

#[test]
fn test_create_table_destination() {
    let analysis = analyze_sql("CREATE TABLE ds.tbl (x INT64)");
    assert_eq!(
        analysis.destinations,
        vec![("ds.tbl".to_string(), ResourceKind::Table)]
    );
    assert_eq!(analysis.category, StatementCategory::Ddl);
}

#[test]
fn test_create_table_as_select_references_source() {
    let analysis = analyze_sql("CREATE TABLE ds.a AS SELECT * FROM ds.b");
    assert_eq!(
        analysis.destinations,
        vec![("ds.a".to_string(), ResourceKind::Table)]
    );
    assert!(analysis.references.contains(&"ds.b".to_string()));
}

#[test]
fn test_create_view_is_table_destination() {
    let analysis = analyze_sql("CREATE OR REPLACE VIEW ds.v AS SELECT * FROM ds.t");
    assert_eq!(
        analysis.destinations,
        vec![("ds.v".to_string(), ResourceKind::Table)]
    );
    assert_eq!(analysis.category, StatementCategory::Ddl);
}

#[test]
fn test_create_schema_destination() {
    let analysis = analyze_sql("CREATE SCHEMA ds");
    assert_eq!(
        analysis.destinations,
        vec![("ds".to_string(), ResourceKind::Schema)]
    );
}

#[test]
fn test_drop_table_destination() {
    let analysis = analyze_sql("DROP TABLE ds.old");
    assert_eq!(
        analysis.destinations,
        vec![("ds.old".to_string(), ResourceKind::Table)]
    );
    assert_eq!(analysis.category, StatementCategory::Ddl);
}

#[test]
fn test_create_function_is_routine_destination() {
    let analysis = analyze_sql("CREATE FUNCTION ds.double_it(x INT64) AS (x * 2)");
    assert_eq!(
        analysis.destinations,
        vec![("ds.double_it".to_string(), ResourceKind::Routine)]
    );
}

#[test]
fn test_insert_is_dml_with_table_destination() {
    let analysis = analyze_sql("INSERT INTO ds.t SELECT * FROM ds.src");
    assert_eq!(
        analysis.destinations,
        vec![("ds.t".to_string(), ResourceKind::Table)]
    );
    assert!(analysis.references.contains(&"ds.src".to_string()));
    assert_eq!(analysis.category, StatementCategory::Dml);
}

#[test]
fn test_merge_target_destination() {
    let analysis = analyze_sql(
        "MERGE INTO ds.t USING ds.s ON ds.t.id = ds.s.id WHEN MATCHED THEN UPDATE SET x = 1",
    );
    assert_eq!(
        analysis.destinations,
        vec![("ds.t".to_string(), ResourceKind::Table)]
    );
    assert!(analysis.references.contains(&"ds.s".to_string()));
    assert_eq!(analysis.category, StatementCategory::Dml);
}

#[test]
fn test_cte_references_suppressed() {
    let analysis = analyze_sql("SELECT * FROM (WITH c AS (SELECT 1) SELECT * FROM c)");
    assert!(
        analysis.references.is_empty(),
        "expected no references, got {:?}",
        analysis.references
    );
    assert_eq!(analysis.category, StatementCategory::Query);
}

#[test]
fn test_top_level_cte_suppressed_but_real_table_kept() {
    let analysis =
        analyze_sql("WITH staged AS (SELECT * FROM ds.raw) SELECT * FROM staged");
    assert_eq!(analysis.references, vec!["ds.raw".to_string()]);
}

#[test]
fn test_multi_part_function_call_is_reference() {
    let analysis = analyze_sql("SELECT ds.udf(x), SUM(x) FROM ds.t GROUP BY 1");
    assert!(analysis.references.contains(&"ds.udf".to_string()));
    assert!(analysis.references.contains(&"ds.t".to_string()));
    assert!(!analysis.references.iter().any(|r| r == "SUM"));
}

#[test]
fn test_call_statement_is_reference_only() {
    let analysis = analyze_sql("CALL ds.refresh_stats()");
    assert!(analysis.destinations.is_empty());
    assert!(analysis.references.contains(&"ds.refresh_stats".to_string()));
}

#[test]
fn test_bare_select_has_no_destination() {
    let analysis = analyze_sql("SELECT * FROM ds.t");
    assert!(analysis.destinations.is_empty());
    assert_eq!(analysis.references, vec!["ds.t".to_string()]);
    assert_eq!(analysis.category, StatementCategory::Query);
}

#[test]
fn test_script_with_ddl_and_dml_classified_ddl() {
    let analysis = analyze_sql("CREATE TABLE ds.t (x INT64); INSERT INTO ds.t VALUES (1);");
    assert_eq!(analysis.category, StatementCategory::Ddl);
    assert_eq!(
        analysis.destinations,
        vec![("ds.t".to_string(), ResourceKind::Table)]
    );
}

#[test]
fn test_backticked_reference_preserved() {
    let analysis = analyze_sql("SELECT * FROM `proj.ds.t`");
    assert_eq!(analysis.references.len(), 1);
    let reference = &analysis.references[0];
    assert!(reference.contains("proj.ds.t"), "got {reference}");
}
