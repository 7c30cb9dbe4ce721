// Copyright (c) 2025 - Cowboy AI, Inc.
//! Synthesis Tests
//!
//! End-to-end tests of the hello deployment: unit definition from files on
//! disk, ordering, rendered templates and the written cloud assembly.

mod fixtures;

use cim_deployment::deployment::{
    compute_unit, define_app, function_unit, network_unit, COMPUTE_UNIT, FUNCTION_UNIT,
    NETWORK_CIDR, NETWORK_UNIT, PUBLIC_SUBNET_MASK, USER_DATA_PATH,
};
use cim_deployment::domain::{
    Ipv4Cidr, Peer, Protocol, ResourceName, ServicePrincipal, UnitId, ValidationError,
};
use cim_deployment::expand::{DEPLOYMENT_TAG, UNIT_TAG};
use cim_deployment::units::network_intents;
use cim_deployment::{
    App, Dependency, DependencyError, DeploymentError, Environment, ResourceIntent,
};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn id(s: &str) -> UnitId {
    UnitId::new(s).unwrap()
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_materialization_order() {
    let root = fixtures::app_root();
    let assembly = fixtures::hello_app(root.path()).synthesize().unwrap();

    let order: Vec<&str> = assembly.manifest.order().iter().map(|u| u.as_str()).collect();
    assert_eq!(order, vec![FUNCTION_UNIT, NETWORK_UNIT, COMPUTE_UNIT]);
}

#[test]
fn test_compute_depends_on_network() {
    let root = fixtures::app_root();
    let app = fixtures::hello_app(root.path());

    assert_eq!(
        app.dependencies(),
        &[Dependency {
            dependent: id(COMPUTE_UNIT),
            prerequisite: id(NETWORK_UNIT),
        }]
    );

    let assembly = app.synthesize().unwrap();
    let compute = assembly.manifest.unit(&id(COMPUTE_UNIT)).unwrap();
    assert_eq!(compute.dependencies, vec![id(NETWORK_UNIT)]);
    assert!(assembly
        .manifest
        .unit(&id(NETWORK_UNIT))
        .unwrap()
        .dependencies
        .is_empty());
}

#[test]
fn test_undeclared_network_dependency_rejected() {
    let root = fixtures::app_root();
    let network = network_unit(NETWORK_CIDR, PUBLIC_SUBNET_MASK).unwrap();
    let compute = compute_unit(&network, &root.path().join(USER_DATA_PATH)).unwrap();

    let app = App::new(
        "hello-cdk",
        Environment::default(),
        vec![network.into(), compute.into()],
        Vec::new(),
    )
    .unwrap();

    let err = app.synthesize().unwrap_err();
    assert!(matches!(
        err,
        DeploymentError::Validation(ValidationError::MissingDependency { .. })
    ));
}

#[test]
fn test_cycle_rejected_before_rendering() {
    let root = fixtures::app_root();
    let mut app = fixtures::hello_app(root.path());
    app.add_dependency(&id(NETWORK_UNIT), &id(COMPUTE_UNIT)).unwrap();

    let err = app.synthesize().unwrap_err();
    assert!(matches!(
        err,
        DeploymentError::Dependency(DependencyError::Cycle(_))
    ));
}

#[test]
fn test_duplicate_unit_rejected() {
    let network = network_unit(NETWORK_CIDR, PUBLIC_SUBNET_MASK).unwrap();
    let err = App::new(
        "hello-cdk",
        Environment::default(),
        vec![network.clone().into(), network.into()],
        Vec::new(),
    )
    .unwrap_err();

    assert!(matches!(
        err,
        DeploymentError::Validation(ValidationError::DuplicateUnit(_))
    ));
}

#[test]
fn test_edge_to_unknown_unit_rejected() {
    let network = network_unit(NETWORK_CIDR, PUBLIC_SUBNET_MASK).unwrap();
    let err = App::new(
        "hello-cdk",
        Environment::default(),
        vec![network.into()],
        vec![Dependency {
            dependent: id(COMPUTE_UNIT),
            prerequisite: id(NETWORK_UNIT),
        }],
    )
    .unwrap_err();

    assert!(matches!(
        err,
        DeploymentError::Dependency(DependencyError::UnknownUnit(_))
    ));
}

// ============================================================================
// Network
// ============================================================================

#[test_case("10.0.0.0/24", 24, true ; "subnet as large as the network")]
#[test_case("10.0.0.0/24", 25, true ; "subnet narrower than the network")]
#[test_case("10.0.0.0/24", 23, false ; "subnet wider than the network")]
#[test_case("10.0.0.0/16", 15, false ; "subnet wider than a /16")]
fn test_public_subnet_mask_boundary(cidr: &str, mask: u8, accepted: bool) {
    let unit = network_unit(cidr, mask).unwrap();
    assert_eq!(network_intents(&unit).is_ok(), accepted);
}

#[test]
fn test_network_template_shape() {
    let root = fixtures::app_root();
    let assembly = fixtures::hello_app(root.path()).synthesize().unwrap();
    let template = assembly.template(&id(NETWORK_UNIT)).unwrap();
    let resources = template["Resources"].as_object().unwrap();

    let types: Vec<&str> = resources
        .values()
        .map(|r| r["Type"].as_str().unwrap())
        .collect();
    assert_eq!(types.iter().filter(|t| **t == "AWS::EC2::VPC").count(), 1);
    assert_eq!(types.iter().filter(|t| **t == "AWS::EC2::Subnet").count(), 1);
    assert_eq!(
        types.iter().filter(|t| **t == "AWS::EC2::InternetGateway").count(),
        1
    );
    assert!(!types.contains(&"AWS::EC2::NatGateway"));

    let vpc = &resources["VpcDemo"]["Properties"];
    assert_eq!(vpc["CidrBlock"], "10.0.0.0/24");
    assert_eq!(vpc["EnableDnsSupport"], true);
    assert_eq!(vpc["EnableDnsHostnames"], true);

    let subnet = &resources["VpcDemoPublicSubnet1"]["Properties"];
    let cidr: Ipv4Cidr = subnet["CidrBlock"].as_str().unwrap().parse().unwrap();
    assert!(Ipv4Cidr::new(NETWORK_CIDR).unwrap().contains(&cidr));
    assert_eq!(subnet["MapPublicIpOnLaunch"], true);
}

// ============================================================================
// Compute
// ============================================================================

#[test]
fn test_rule_set_allows_only_http() {
    let root = fixtures::app_root();
    let assembly = fixtures::hello_app(root.path()).synthesize().unwrap();

    let rule_sets: Vec<_> = assembly
        .intents(&id(COMPUTE_UNIT))
        .iter()
        .filter_map(ResourceIntent::as_rule_set)
        .collect();
    assert_eq!(rule_sets.len(), 1);

    let rule_set = rule_sets[0];
    assert_eq!(rule_set.ingress.len(), 1);
    let rule = &rule_set.ingress[0];
    assert_eq!(rule.peer, Peer::AnyIpv4);
    assert_eq!(rule.protocol, Protocol::Tcp);
    assert_eq!(rule.port, 80);

    let template = assembly.template(&id(COMPUTE_UNIT)).unwrap();
    let ingress = template["Resources"]["SecurityGroupForWebServer"]["Properties"]
        ["SecurityGroupIngress"]
        .as_array()
        .unwrap();
    assert_eq!(ingress.len(), 1);
    assert_eq!(ingress[0]["CidrIp"], "0.0.0.0/0");
    assert_eq!(ingress[0]["IpProtocol"], "tcp");
    assert_eq!(ingress[0]["FromPort"], 80);
    assert_eq!(ingress[0]["ToPort"], 80);
}

#[test]
fn test_instance_template() {
    let root = fixtures::app_root();
    let assembly = fixtures::hello_app(root.path()).synthesize().unwrap();
    let template = assembly.template(&id(COMPUTE_UNIT)).unwrap();
    let instance = &template["Resources"]["WebServerDemo"]["Properties"];

    assert_eq!(instance["InstanceType"], "t2.small");
    assert_eq!(
        instance["SubnetId"]["Fn::ImportValue"],
        "VpcStack:VpcDemoPublicSubnet1"
    );
    assert_eq!(
        template["Parameters"]["WebServerDemoImageId"]["Default"],
        "/aws/service/ami-amazon-linux-latest/amzn2-ami-hvm-x86_64-gp2"
    );

    let user_data = instance["UserData"]["Fn::Base64"].as_str().unwrap();
    assert_eq!(
        user_data,
        format!("#!/bin/bash\n{}", fixtures::USER_DATA_SCRIPT)
    );
}

#[test]
fn test_missing_user_data_emits_nothing() {
    let root = fixtures::app_root_without_user_data();

    let err = define_app(&fixtures::config(root.path())).unwrap_err();
    assert!(err.is_local_construction_failure());
    assert!(matches!(
        &err,
        DeploymentError::LocalRead { path, .. } if path.ends_with(USER_DATA_PATH)
    ));

    // The network alone still declares fine; the compute unit never exists
    let network = network_unit(NETWORK_CIDR, PUBLIC_SUBNET_MASK).unwrap();
    let compute = compute_unit(&network, &root.path().join(USER_DATA_PATH));
    assert!(matches!(
        compute,
        Err(DeploymentError::LocalRead { ref path, .. }) if path.ends_with(USER_DATA_PATH)
    ));
}

#[test]
fn test_imports_resolve_to_prerequisite_exports() {
    let root = fixtures::app_root();
    let assembly = fixtures::hello_app(root.path()).synthesize().unwrap();

    let network = assembly.manifest.unit(&id(NETWORK_UNIT)).unwrap();
    let compute = assembly.manifest.unit(&id(COMPUTE_UNIT)).unwrap();
    assert!(!compute.imports.is_empty());
    assert!(compute.imports.is_subset(&network.exports));
}

// ============================================================================
// Roles
// ============================================================================

#[test]
fn test_role_trust_principals() {
    let root = fixtures::app_root();
    let assembly = fixtures::hello_app(root.path()).synthesize().unwrap();

    let principal = |unit: &str| {
        assembly
            .intents(&id(unit))
            .iter()
            .find_map(ResourceIntent::as_role)
            .map(|role| role.assumed_by)
            .unwrap()
    };
    assert_eq!(principal(FUNCTION_UNIT), ServicePrincipal::FunctionExecution);
    assert_eq!(principal(COMPUTE_UNIT), ServicePrincipal::Compute);

    let trust = |unit: &str, role: &str| {
        assembly.template(&id(unit)).unwrap()["Resources"][role]["Properties"]
            ["AssumeRolePolicyDocument"]["Statement"][0]["Principal"]["Service"]
            .clone()
    };
    assert_eq!(
        trust(FUNCTION_UNIT, "ExecutionRoleForHelloLambda"),
        "lambda.amazonaws.com"
    );
    assert_eq!(trust(COMPUTE_UNIT, "RoleForWebServer"), "ec2.amazonaws.com");
}

#[test]
fn test_duplicate_role_names_rejected() {
    let root = fixtures::app_root();
    let mut function = function_unit(root.path()).unwrap();
    function.role_name = ResourceName::new("RoleForWebServer").unwrap();
    let network = network_unit(NETWORK_CIDR, PUBLIC_SUBNET_MASK).unwrap();
    let compute = compute_unit(&network, &root.path().join(USER_DATA_PATH)).unwrap();
    let dependency = Dependency {
        dependent: compute.id.clone(),
        prerequisite: network.id.clone(),
    };

    let app = App::new(
        "hello-cdk",
        Environment::default(),
        vec![function.into(), network.into(), compute.into()],
        vec![dependency],
    )
    .unwrap();

    let err = app.synthesize().unwrap_err();
    assert!(matches!(
        err,
        DeploymentError::Validation(ValidationError::DuplicateRoleName(name)) if name == "RoleForWebServer"
    ));
}

// ============================================================================
// Function
// ============================================================================

#[test]
fn test_function_template() {
    let root = fixtures::app_root();
    let assembly = fixtures::hello_app(root.path()).synthesize().unwrap();
    let template = assembly.template(&id(FUNCTION_UNIT)).unwrap();
    let function = &template["Resources"]["HelloLambdaFunction"]["Properties"];

    assert_eq!(function["Handler"], "index.py");
    assert_eq!(function["Runtime"], "python3.10");
    assert_eq!(function["Timeout"], 10);
    assert_eq!(function["MemorySize"], 512);
    assert_eq!(function["Environment"]["Variables"]["TABLE_NAME"], "MessageTable");
}

#[test]
fn test_table_is_unresolved_reference() {
    let root = fixtures::app_root();
    let assembly = fixtures::hello_app(root.path()).synthesize().unwrap();
    let unit = assembly.manifest.unit(&id(FUNCTION_UNIT)).unwrap();

    assert_eq!(unit.unresolved_references.len(), 1);
    let reference = &unit.unresolved_references[0];
    assert_eq!(reference.variable, "TABLE_NAME");
    assert_eq!(reference.name, "MessageTable");

    // Nothing in the deployment declares a table
    assert!(assembly.templates.values().all(|t| {
        t["Resources"]
            .as_object()
            .unwrap()
            .values()
            .all(|r| r["Type"] != "AWS::DynamoDB::Table")
    }));

    assert_eq!(unit.assets.len(), 1);
    assert!(unit.assets[0].object_key.ends_with(".zip"));
}

// ============================================================================
// Derived fields and output
// ============================================================================

#[test]
fn test_default_tags_applied_to_every_intent() {
    let root = fixtures::app_root();
    let assembly = fixtures::hello_app(root.path()).synthesize().unwrap();

    for unit in &assembly.manifest.units {
        for intent in assembly.intents(&unit.id) {
            assert_eq!(intent.tags()[DEPLOYMENT_TAG], "hello-cdk");
            assert_eq!(intent.tags()[UNIT_TAG], unit.id.as_str());
        }
    }
    assert_eq!(assembly.all_intents().count(), 6);
}

#[test]
fn test_synthesis_is_byte_identical() {
    let root = fixtures::app_root();

    let first = fixtures::hello_app(root.path())
        .synthesize()
        .unwrap()
        .render_files()
        .unwrap();
    let second = fixtures::hello_app(root.path())
        .synthesize()
        .unwrap()
        .render_files()
        .unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_write_assembly() {
    let root = fixtures::app_root();
    let config = fixtures::config(root.path());
    let assembly = fixtures::hello_app(root.path()).synthesize().unwrap();

    let written = assembly.write_to(&config.out_dir).unwrap();
    let mut names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "ApplicationStack.template.json",
            "HelloCdkStack.template.json",
            "VpcStack.template.json",
            "manifest.json",
        ]
    );

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(config.out_dir.join("manifest.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["environment"], "aws://123456789012/eu-west-1");
    assert_eq!(manifest["units"][2]["id"], COMPUTE_UNIT);
    assert_eq!(manifest["units"][2]["dependencies"][0], NETWORK_UNIT);
}
