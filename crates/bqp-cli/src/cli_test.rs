use super::*;
use clap::Parser;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_push_defaults() {
    let cli = parse(&["bqport", "push"]);
    let Commands::Push(args) = &cli.command else {
        panic!("expected push");
    };
    assert!(args.projects.is_empty());
    assert!(args.threads.is_none());
    assert_eq!(args.format, OutputFormat::Console);
    assert!(!args.force);
    assert!(!args.dry_run);
}

#[test]
fn test_push_full_flags() {
    let cli = parse(&[
        "bqport",
        "push",
        "@default",
        "other-proj",
        "--threads",
        "4",
        "--root-path",
        "./sql",
        "--format",
        "json",
        "--force",
        "--dry-run",
        "--maximum_bytes_billed",
        "1000000",
    ]);
    let Commands::Push(args) = &cli.command else {
        panic!("expected push");
    };
    assert_eq!(args.projects, vec!["@default", "other-proj"]);
    assert_eq!(args.threads, Some(4));
    assert_eq!(cli.global.root_path.as_deref(), Some(std::path::Path::new("./sql")));
    assert_eq!(args.format, OutputFormat::Json);
    assert!(args.force);
    assert!(args.dry_run);
    assert_eq!(args.maximum_bytes_billed, Some(1_000_000));
}

#[test]
fn test_labels_repeatable() {
    let cli = parse(&[
        "bqport", "push", "--label", "team:data", "--label", "env:prod",
    ]);
    let Commands::Push(args) = &cli.command else {
        panic!("expected push");
    };
    assert_eq!(
        args.labels,
        vec![
            ("team".to_string(), "data".to_string()),
            ("env".to_string(), "prod".to_string())
        ]
    );
}

#[test]
fn test_label_without_colon_rejected() {
    assert!(Cli::try_parse_from(["bqport", "push", "--label", "nocolon"]).is_err());
}

#[test]
fn test_parameter_named_integer() {
    let cli = parse(&["bqport", "push", "--parameter", "count:integers:42"]);
    let Commands::Push(args) = &cli.command else {
        panic!("expected push");
    };
    assert_eq!(
        args.parameters,
        vec![QueryParam {
            name: Some("count".to_string()),
            value: ParamValue::Int(42),
        }]
    );
}

#[test]
fn test_parameter_positional_string() {
    let cli = parse(&["bqport", "push", "--parameter", "::hello"]);
    let Commands::Push(args) = &cli.command else {
        panic!("expected push");
    };
    assert_eq!(
        args.parameters,
        vec![QueryParam {
            name: None,
            value: ParamValue::String("hello".to_string()),
        }]
    );
}

#[test]
fn test_parameter_null_literal() {
    let cli = parse(&["bqport", "push", "--parameter", "maybe:string:NULL"]);
    let Commands::Push(args) = &cli.command else {
        panic!("expected push");
    };
    assert_eq!(args.parameters[0].value, ParamValue::Null);
}

#[test]
fn test_parameter_bad_integer_rejected() {
    assert!(
        Cli::try_parse_from(["bqport", "push", "--parameter", "n:integers:abc"]).is_err()
    );
}

#[test]
fn test_bundle_projects() {
    let cli = parse(&["bqport", "bundle", "analytics"]);
    let Commands::Bundle(args) = &cli.command else {
        panic!("expected bundle");
    };
    assert_eq!(args.projects, vec!["analytics"]);
}
