//! End-to-end runs over the built-in catalog: manifests and flags in,
//! rendered policies out.

use clap::Parser;

use crate::{
    ActionCatalog, ActionName, Capability, Cli, GenerationRequest, GeneratorError,
    PolicyDocument, PolicyGenerator, StaticCatalog, Statement, collapse, create_policy,
    request_from_yaml, simplify, statement,
};


use snapshot::snapshot_policy;

const MULTIPLE_SERVICES: &str = include_str!("../../demos/multiple-services.yaml");

fn cli(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("aws-iam-generator").chain(args.iter().copied())).unwrap()
}

/// What main does: manifests first, then the command-line flags.
fn run(args: &[&str], manifests: &[&str]) -> Result<String, GeneratorError> {
    let cli = cli(args);
    let generator = PolicyGenerator::builtin()?.with_options(cli.assembly_options());
    let mut requests: Vec<GenerationRequest> = manifests
        .iter()
        .map(|text| request_from_yaml(text))
        .collect::<Result<_, _>>()?;
    requests.push(cli.to_request()?);
    generator.generate_and_render(&requests, &cli.output_options())
}

fn for_service(catalog: &StaticCatalog, service: &str, levels: &[Capability]) -> PolicyDocument {
    create_policy([Statement::allow(
        catalog.actions_for_service(service, levels).unwrap(),
    )])
}

#[test]
fn test_multiple_services_manifest() {
    let catalog = StaticCatalog::builtin().unwrap();
    let list = &[Capability::List];
    let read = &[Capability::List, Capability::Read];
    let write = &[Capability::List, Capability::Read, Capability::Write];

    let expected = simplify(&collapse(&[
        for_service(&catalog, "iam", list),
        create_policy([Statement::allow(
            catalog
                .actions_for_resource_type("ec2", "instance", write, false)
                .unwrap(),
        )]),
        for_service(&catalog, "lambda", read),
        create_policy([Statement::allow(catalog.full_access_actions("s3").unwrap())]),
        for_service(&catalog, "lambda", read),
        for_service(&catalog, "s3", read),
        for_service(&catalog, "iam", read),
        create_policy([
            statement("s3:ListBucket", "arn:aws:s3:::my-test-bucket", None, None),
            statement(
                "s3:ListBucket",
                ["arn:aws:s3:::my-test-bucket", "arn:aws:s3:::my-test-bucket/*"],
                None,
                None,
            ),
        ]),
    ]));

    let rendered = run(&[], &[MULTIPLE_SERVICES]).unwrap();
    let policy = PolicyDocument::from_json(&rendered).unwrap();

    assert!(policy.is_equivalent(&expected));
    assert_eq!(policy.statements.len(), 3);
    assert!(policy.actions().any(|a| a.as_str() == "s3:*"));
    assert!(!policy.statements[0].actions.contains(&ActionName::from("s3:GetObject")));
}

#[test]
fn test_flags_render_compact() {
    let rendered = run(&["-r", "sts", "-A", "ec2:DescribeRegions", "-c"], &[]).unwrap();
    insta::assert_snapshot!(rendered, @r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":["ec2:DescribeRegions","sts:GetAccessKeyInfo","sts:GetCallerIdentity","sts:GetFederationToken","sts:GetSessionToken"],"Resource":["*"]}]}"#);
}

#[test]
fn test_manifest_and_flags_combine() {
    let manifest = "policies:\n  - service: sts\n    access_level: list\n  - action: sts:GetCallerIdentity\n";
    let rendered = run(&["--tagging", "sts"], &[manifest]).unwrap();
    let policy = PolicyDocument::from_json(&rendered).unwrap();
    snapshot_policy!(policy, @r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":["sts:GetCallerIdentity","sts:TagSession"],"Resource":["*"]}]}"#);
}

#[test]
fn test_resource_type_with_service_wide_actions() {
    let narrow = run(&["-l", "s3:bucket", "-c"], &[]).unwrap();
    let wide = run(&["-l", "s3:bucket", "-c", "--include-service-wide-actions"], &[]).unwrap();

    let narrow = PolicyDocument::from_json(&narrow).unwrap();
    let wide = PolicyDocument::from_json(&wide).unwrap();
    assert!(!narrow.actions().any(|a| a.as_str() == "s3:ListAllMyBuckets"));
    assert!(wide.actions().any(|a| a.as_str() == "s3:ListAllMyBuckets"));
    assert!(narrow.actions().all(|a| wide.actions().any(|b| a == b)));
}

#[test]
fn test_minimized_manifest_keeps_bucket_statements() {
    let rendered = run(&["-m", "-c"], &[MULTIPLE_SERVICES]).unwrap();
    let policy = PolicyDocument::from_json(&rendered).unwrap();
    let unminimized = run(&["-c"], &[MULTIPLE_SERVICES]).unwrap();

    let bucket_statements: Vec<&Statement> = policy
        .statements
        .iter()
        .filter(|s| s.resources.iter().any(|r| r.starts_with("arn:aws:s3")))
        .collect();
    assert_eq!(bucket_statements.len(), 2);
    assert!(policy.actions().all(|a| a.as_str() == a.as_str().to_lowercase()));
    // None of these services is listed completely, so nothing may be widened.
    assert!(policy.is_equivalent(&PolicyDocument::from_json(&unminimized).unwrap()));
    assert_eq!(rendered.chars().count(), unminimized.chars().count());
}

#[test]
fn test_auto_shorten_fits_manifest_into_small_budget() {
    let full = run(&[], &[MULTIPLE_SERVICES]).unwrap().chars().count();
    let compact = run(&["-c"], &[MULTIPLE_SERVICES]).unwrap().chars().count();
    let budget = compact.to_string();

    let shortened = run(&["--auto-shorten", "--max-length", &budget], &[MULTIPLE_SERVICES]).unwrap();
    assert!(shortened.chars().count() <= compact);

    let err = run(&["--max-length", &budget], &[MULTIPLE_SERVICES]).unwrap_err();
    assert_eq!(
        err,
        GeneratorError::PolicyTooLong {
            length: full,
            max_length: compact,
            auto_shortened: false,
        }
    );
}

#[test]
fn test_no_wildcards_expands_full_access() {
    let rendered = run(&["-a", "sts", "--no-wildcards", "-c"], &[]).unwrap();
    insta::assert_snapshot!(rendered, @r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":["sts:AssumeRole","sts:AssumeRoleWithSAML","sts:AssumeRoleWithWebIdentity","sts:AssumeRoot","sts:DecodeAuthorizationMessage","sts:GetAccessKeyInfo","sts:GetCallerIdentity","sts:GetDelegatedAccessToken","sts:GetFederationToken","sts:GetServiceBearerToken","sts:GetSessionToken","sts:SetContext","sts:SetSourceIdentity","sts:TagSession"],"Resource":["*"]}]}"#);
}

#[test]
fn test_unknown_service_fails() {
    assert_eq!(
        run(&["-r", "notaservice"], &[]).unwrap_err(),
        GeneratorError::UnknownService("notaservice".to_string())
    );
}

#[test]
fn test_bad_manifest_level_fails() {
    let manifest = "policies:\n  - service: iam\n    access_level: everything\n";
    assert_eq!(
        run(&[], &[manifest]).unwrap_err(),
        GeneratorError::UnknownAccessLevel("everything".to_string())
    );
}
