use std::sync::Mutex;

use super::*;
use crate::traits::MinimizerError;
use crate::types::{AccessLevel, ActionGrant, ActionName, Capability, statement};
use yare::parameterized;


/// Answers every lookup with `service:level` actions and records what it was asked.
#[derive(Default)]
struct FakeCatalog {
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

fn tags(levels: &[Capability]) -> Vec<String> {
    levels.iter().map(|l| l.to_string().to_lowercase()).collect()
}

impl ActionCatalog for FakeCatalog {
    fn actions_for_service(
        &self,
        service: &str,
        levels: &[Capability],
    ) -> Result<Vec<ActionName>, GeneratorError> {
        self.record(format!("service({service}, {:?})", tags(levels)));
        Ok(tags(levels)
            .into_iter()
            .map(|tag| ActionName::new(format!("{}:{tag}", service.to_lowercase())))
            .collect())
    }

    fn full_access_actions(&self, service: &str) -> Result<Vec<ActionName>, GeneratorError> {
        self.record(format!("full({service})"));
        Ok(vec![ActionName::new(format!("{}:*", service.to_lowercase()))])
    }

    fn actions_for_resource_type(
        &self,
        service: &str,
        resource_type: &str,
        levels: &[Capability],
        include_service_wide: bool,
    ) -> Result<Vec<ActionName>, GeneratorError> {
        self.record(format!(
            "resource_type({service}, {resource_type}, {:?}, {include_service_wide})",
            tags(levels)
        ));
        Ok(tags(levels)
            .into_iter()
            .map(|tag| {
                ActionName::new(format!(
                    "{}:{tag}{}",
                    service.to_lowercase(),
                    resource_type.to_lowercase()
                ))
            })
            .collect())
    }
}

fn passthrough(policy: &PolicyDocument) -> Result<PolicyDocument, MinimizerError> {
    Ok(policy.clone())
}

fn generator_with(catalog: Arc<FakeCatalog>) -> PolicyGenerator {
    PolicyGenerator::new(catalog, Arc::new(passthrough))
}

fn request(access: Vec<AccessRequest>, grants: Vec<ActionGrant>) -> GenerationRequest {
    GenerationRequest { access, grants }
}

fn access(target: &str, level: AccessLevel) -> AccessRequest {
    AccessRequest::parse(target, level).unwrap()
}

fn action_keys(policy: &PolicyDocument) -> Vec<String> {
    let mut keys: Vec<String> = policy.actions().map(ActionName::key).collect();
    keys.sort();
    keys
}

#[parameterized(
    list = { AccessLevel::List, "service(iam, [\"list\"])", &["iam:list"] },
    read = { AccessLevel::Read, "service(iam, [\"list\", \"read\"])", &["iam:list", "iam:read"] },
    write = { AccessLevel::Write, "service(iam, [\"list\", \"read\", \"write\"])", &["iam:list", "iam:read", "iam:write"] },
    tagging = { AccessLevel::Tagging, "service(iam, [\"tagging\"])", &["iam:tagging"] },
    permissions = { AccessLevel::Permissions, "service(iam, [\"permissions\"])", &["iam:permissions"] },
    all = { AccessLevel::All, "full(iam)", &["iam:*"] },
)]
fn test_single_service(level: AccessLevel, expected_call: &str, expected_actions: &[&str]) {
    let catalog = Arc::new(FakeCatalog::default());
    let generator = generator_with(catalog.clone());

    let policy = generator
        .assemble(&request(vec![access("iam", level)], vec![]))
        .unwrap();

    assert_eq!(catalog.calls(), vec![expected_call.to_string()]);
    assert_eq!(policy.statements.len(), 1);
    assert_eq!(policy.statements[0].resources, vec!["*"]);
    assert_eq!(action_keys(&policy), expected_actions);
}

#[test]
fn test_list_iam_renders_single_statement() {
    let generator = generator_with(Arc::new(FakeCatalog::default()));
    let policy = generator
        .generate(&[request(vec![access("iam", AccessLevel::List)], vec![])])
        .unwrap();
    let rendered = generator.render(&policy, &OutputOptions::default()).unwrap();
    insta::assert_snapshot!(rendered, @r#"
    {
      "Version": "2012-10-17",
      "Statement": [
        {
          "Effect": "Allow",
          "Action": [
            "iam:list"
          ],
          "Resource": [
            "*"
          ]
        }
      ]
    }
    "#);
}

#[test]
fn test_services_and_actions_merge_into_one_statement() {
    let generator = generator_with(Arc::new(FakeCatalog::default()));
    let policy = generator
        .assemble(&request(
            vec![
                access("lambda", AccessLevel::Read),
                access("cloudwatch", AccessLevel::Read),
            ],
            vec![ActionGrant::new(["ec2:DescribeInstances", "s3:ListAllMyBuckets"])],
        ))
        .unwrap();

    insta::assert_snapshot!(policy.to_json(true).unwrap(), @r#"{"Version":"2012-10-17","Statement":[{"Effect":"Allow","Action":["cloudwatch:list","cloudwatch:read","ec2:DescribeInstances","lambda:list","lambda:read","s3:ListAllMyBuckets"],"Resource":["*"]}]}"#);
}

#[test]
fn test_grants_on_other_resources_stay_separate() {
    let generator = generator_with(Arc::new(FakeCatalog::default()));
    let policy = generator
        .assemble(&request(
            vec![access("s3", AccessLevel::List)],
            vec![
                ActionGrant::new("s3:GetObject").on("arn:aws:s3:::bucket/*"),
                ActionGrant::new("s3:PutObject").on("arn:aws:s3:::bucket/*"),
            ],
        ))
        .unwrap();

    assert!(policy.is_equivalent(&create_policy([
        Statement::allow("s3:list"),
        statement(
            ["s3:GetObject", "s3:PutObject"],
            "arn:aws:s3:::bucket/*",
            None,
            None
        ),
    ])));
    assert_eq!(policy.statements.len(), 2);
}

#[parameterized(
    without_service_wide = { false },
    with_service_wide = { true },
)]
fn test_resource_type_lookup(include_service_wide: bool) {
    let catalog = Arc::new(FakeCatalog::default());
    let generator = generator_with(catalog.clone()).with_options(AssemblyOptions {
        include_service_wide_actions: include_service_wide,
    });

    let policy = generator
        .assemble(&request(vec![access("ec2:Instance", AccessLevel::Read)], vec![]))
        .unwrap();

    assert_eq!(
        catalog.calls(),
        vec![format!(
            "resource_type(ec2, Instance, [\"list\", \"read\"], {include_service_wide})"
        )]
    );
    assert_eq!(action_keys(&policy), vec!["ec2:listinstance", "ec2:readinstance"]);
}

#[test]
fn test_all_with_resource_type_requests_every_capability() {
    let catalog = Arc::new(FakeCatalog::default());
    let generator = generator_with(catalog.clone());
    generator
        .assemble(&request(vec![access("s3:bucket", AccessLevel::All)], vec![]))
        .unwrap();
    assert_eq!(
        catalog.calls(),
        vec![
            "resource_type(s3, bucket, [\"list\", \"read\", \"write\", \"tagging\", \"permissions\"], false)"
                .to_string()
        ]
    );
}

#[test]
fn test_full_access_absorbs_narrower_actions() {
    let generator = generator_with(Arc::new(FakeCatalog::default()));
    let policy = generator
        .assemble(&request(
            vec![access("s3", AccessLevel::All)],
            vec![ActionGrant::new(["s3:GetObject", "sts:GetCallerIdentity"])],
        ))
        .unwrap();
    assert_eq!(action_keys(&policy), vec!["s3:*", "sts:getcalleridentity"]);
}

#[test]
fn test_access_levels_are_cumulative() {
    let generator = generator_with(Arc::new(FakeCatalog::default()));
    let actions_for = |level| {
        let policy = generator
            .assemble(&request(vec![access("lambda", level)], vec![]))
            .unwrap();
        action_keys(&policy)
    };
    let list = actions_for(AccessLevel::List);
    let read = actions_for(AccessLevel::Read);
    let write = actions_for(AccessLevel::Write);
    assert!(list.iter().all(|a| read.contains(a)));
    assert!(read.iter().all(|a| write.contains(a)));
}

#[test]
fn test_generate_merges_requests_in_order() {
    let catalog = Arc::new(FakeCatalog::default());
    let generator = generator_with(catalog.clone());
    let from_manifest = request(vec![access("iam", AccessLevel::List)], vec![]);
    let from_flags = request(
        vec![access("ec2", AccessLevel::All)],
        vec![ActionGrant::new("iam:ListUsers")],
    );

    let policy = generator.generate(&[from_manifest, from_flags]).unwrap();

    assert_eq!(catalog.calls(), vec!["service(iam, [\"list\"])", "full(ec2)"]);
    assert_eq!(action_keys(&policy), vec!["ec2:*", "iam:list", "iam:listusers"]);
}

#[test]
fn test_nothing_requested_gives_empty_policy() {
    let generator = generator_with(Arc::new(FakeCatalog::default()));
    let policy = generator.generate(&[]).unwrap();
    assert!(policy.is_empty());
    let policy = generator.generate(&[GenerationRequest::default()]).unwrap();
    insta::assert_snapshot!(generator.render(&policy, &OutputOptions { compact: true, ..OutputOptions::default() }).unwrap(), @r#"{"Version":"2012-10-17","Statement":[]}"#);
}

#[test]
fn test_catalog_errors_propagate() {
    let generator = PolicyGenerator::builtin().unwrap();
    let err = generator
        .assemble(&request(vec![access("notaservice", AccessLevel::Read)], vec![]))
        .unwrap_err();
    assert_eq!(err, GeneratorError::UnknownService("notaservice".to_string()));
}

#[test]
fn test_concurrent_generation() {
    use std::thread;

    let generator = PolicyGenerator::builtin().unwrap();
    let handles: Vec<_> = ["iam", "s3", "ec2", "lambda"]
        .into_iter()
        .map(|service| {
            let generator = generator.clone();
            thread::spawn(move || {
                let requests = [request(vec![access(service, AccessLevel::Read)], vec![])];
                generator.generate_and_render(
                    &requests,
                    &OutputOptions {
                        minimize: true,
                        ..OutputOptions::default()
                    },
                )
            })
        })
        .collect();

    for handle in handles {
        assert!(handle.join().unwrap().is_ok());
    }
}
