use super::*;

fn relations(pairs: &[(&str, Option<&str>)]) -> BTreeSet<(String, Option<String>)> {
    pairs
        .iter()
        .map(|(d, s)| (d.to_string(), s.map(String::from)))
        .collect()
}

#[test]
fn test_build_orders_dependencies_first() {
    let dag = ResourceDag::build(&relations(&[
        ("p.ds.fct", Some("p.ds.stg")),
        ("p.ds.fct", None),
        ("p.ds.stg", None),
    ]))
    .unwrap();

    let order = dag.topological_order().unwrap();
    let stg = order.iter().position(|n| n == "p.ds.stg").unwrap();
    let fct = order.iter().position(|n| n == "p.ds.fct").unwrap();
    assert!(stg < fct);
}

#[test]
fn test_sentinel_keeps_isolated_destination() {
    let dag = ResourceDag::build(&relations(&[("p.ds.only", None)])).unwrap();
    assert!(dag.contains("p.ds.only"));
    assert_eq!(dag.topological_order().unwrap(), vec!["p.ds.only"]);
}

#[test]
fn test_deterministic_tie_break_is_lexicographic() {
    let dag = ResourceDag::build(&relations(&[
        ("p.ds.c", Some("p.ds.root")),
        ("p.ds.a", Some("p.ds.root")),
        ("p.ds.b", Some("p.ds.root")),
        ("p.ds.root", None),
    ]))
    .unwrap();

    let order = dag.topological_order().unwrap();
    assert_eq!(order, vec!["p.ds.root", "p.ds.a", "p.ds.b", "p.ds.c"]);
}

#[test]
fn test_same_edges_same_order() {
    let rels = relations(&[
        ("p.a.x", Some("p.b.y")),
        ("p.b.y", Some("p.c.z")),
        ("p.d.w", None),
        ("p.c.z", None),
    ]);
    let first = ResourceDag::build(&rels).unwrap().topological_order().unwrap();
    for _ in 0..10 {
        let again = ResourceDag::build(&rels).unwrap().topological_order().unwrap();
        assert_eq!(again, first);
    }
}

#[test]
fn test_cycle_detected_names_residual_nodes() {
    let result = ResourceDag::build(&relations(&[
        ("p.ds.x", Some("p.ds.y")),
        ("p.ds.y", Some("p.ds.x")),
    ]));

    let err = result.unwrap_err();
    match err {
        CoreError::CycleDetected { nodes } => {
            assert!(nodes.contains("p.ds.x"));
            assert!(nodes.contains("p.ds.y"));
        }
        other => panic!("expected CycleDetected, got {other}"),
    }
}

#[test]
fn test_self_loop_ignored() {
    let mut dag = ResourceDag::new();
    dag.add_edge("p.ds.a", "p.ds.a");
    assert_eq!(dag.topological_order().unwrap(), vec!["p.ds.a"]);
}

#[test]
fn test_dependencies_sorted() {
    let dag = ResourceDag::build(&relations(&[
        ("p.ds.t", Some("p.ds.b")),
        ("p.ds.t", Some("p.ds.a")),
        ("p.ds.a", None),
        ("p.ds.b", None),
    ]))
    .unwrap();

    assert_eq!(dag.dependencies("p.ds.t"), vec!["p.ds.a", "p.ds.b"]);
    assert!(dag.dependencies("p.ds.missing").is_empty());
}

#[test]
fn test_duplicate_edges_counted_once() {
    let mut dag = ResourceDag::new();
    dag.add_edge("p.a.x", "p.b.y");
    dag.add_edge("p.a.x", "p.b.y");
    let order = dag.topological_order().unwrap();
    assert_eq!(order, vec!["p.a.x", "p.b.y"]);
}
