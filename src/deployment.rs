// Copyright (c) 2025 - Cowboy AI, Inc.
//! Hello deployment
//!
//! The deployment `cim-synth` builds: a function unit, a network unit and a
//! compute unit placed inside that network. Local inputs are resolved against
//! the configured app root:
//!
//! - `data/user-data.sh` - startup script for the web server
//! - `lambda/` - function code directory

use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::app::App;
use crate::config::SynthConfig;
use crate::domain::{
    AmazonLinuxEdition, AmazonLinuxGeneration, CodeAsset, EnvironmentValue, InstanceClass,
    InstanceSize, InstanceType, Ipv4Cidr, LogicalId, MachineImage, NatStrategy,
    NetworkDescriptor, ResourceName, Runtime, SubnetConfiguration, SubnetType, UnitId, UserData,
};
use crate::errors::DeploymentResult;
use crate::graph::Dependency;
use crate::units::{ComputeUnit, FunctionUnit, NetworkUnit};

pub const DEPLOYMENT_NAME: &str = "hello-cdk";

pub const FUNCTION_UNIT: &str = "HelloCdkStack";
pub const NETWORK_UNIT: &str = "VpcStack";
pub const COMPUTE_UNIT: &str = "ApplicationStack";

pub const NETWORK_CIDR: &str = "10.0.0.0/24";
pub const PUBLIC_SUBNET_MASK: u8 = 24;
pub const MAX_AZS: u32 = 1;

pub const USER_DATA_PATH: &str = "data/user-data.sh";
pub const LAMBDA_ASSET_DIR: &str = "lambda";

/// Environment variable carrying the message table name
pub const TABLE_NAME_VAR: &str = "TABLE_NAME";
pub const MESSAGE_TABLE: &str = "MessageTable";

/// Execution role plus a python function reading its code from `lambda/`
pub fn function_unit(app_root: &Path) -> DeploymentResult<FunctionUnit> {
    let code = CodeAsset::from_directory(app_root.join(LAMBDA_ASSET_DIR))?;

    let mut environment = BTreeMap::new();
    environment.insert(
        TABLE_NAME_VAR.to_string(),
        EnvironmentValue::external(MESSAGE_TABLE, "table"),
    );

    Ok(FunctionUnit {
        id: UnitId::new(FUNCTION_UNIT)?,
        role_id: LogicalId::new("ExecutionRoleForHelloLambda")?,
        role_name: ResourceName::new("ExecutionRoleForHelloLambda")?,
        function_id: LogicalId::new("HelloLambdaFunction")?,
        function_name: ResourceName::new("HelloLambdaFunction")?,
        code,
        handler: "index.py".to_string(),
        runtime: Runtime::Python310,
        timeout_secs: 10,
        memory_mb: 512,
        environment,
    })
}

/// One network over `cidr`, a single public subnet group of `subnet_mask`
pub fn network_unit(cidr: &str, subnet_mask: u8) -> DeploymentResult<NetworkUnit> {
    Ok(NetworkUnit {
        id: UnitId::new(NETWORK_UNIT)?,
        network: NetworkDescriptor {
            logical_id: LogicalId::new("VpcDemo")?,
            name: "VpcDemo".to_string(),
            cidr: Ipv4Cidr::new(cidr)?,
            max_azs: MAX_AZS,
            enable_dns_support: true,
            enable_dns_hostnames: true,
            nat: NatStrategy::Gateway { gateways: 1 },
            subnets: vec![SubnetConfiguration {
                name: "Public".to_string(),
                cidr_mask: subnet_mask,
                subnet_type: SubnetType::Public,
            }],
            tags: BTreeMap::new(),
        },
    })
}

/// Web server in the public subnets of `network`
///
/// The startup script is read here; a missing file fails before any
/// descriptor exists.
pub fn compute_unit(network: &NetworkUnit, user_data: &Path) -> DeploymentResult<ComputeUnit> {
    let user_data = UserData::from_file(user_data)?;

    Ok(ComputeUnit {
        id: UnitId::new(COMPUTE_UNIT)?,
        network: network.network_ref()?,
        subnet_type: SubnetType::Public,
        role_id: LogicalId::new("RoleForWebServer")?,
        role_name: ResourceName::new("RoleForWebServer")?,
        rule_set_id: LogicalId::new("SecurityGroupForWebServer")?,
        rule_set_name: ResourceName::new("SecurityGroupForWebServer")?,
        instance_id: LogicalId::new("WebServerDemo")?,
        instance_name: ResourceName::new("WebServerDemo")?,
        instance_type: InstanceType::of(InstanceClass::T2, InstanceSize::Small),
        machine_image: MachineImage::AmazonLinux {
            generation: AmazonLinuxGeneration::AmazonLinux2,
            edition: AmazonLinuxEdition::Standard,
        },
        user_data,
    })
}

/// All three units and the single compute-on-network edge
pub fn define_app(config: &SynthConfig) -> DeploymentResult<App> {
    let root = config.app_root.as_path();
    debug!(app_root = %root.display(), "Defining {} deployment", DEPLOYMENT_NAME);

    let function = function_unit(root)?;
    let network = network_unit(NETWORK_CIDR, PUBLIC_SUBNET_MASK)?;
    let compute = compute_unit(&network, &root.join(USER_DATA_PATH))?;

    let dependency = Dependency {
        dependent: compute.id.clone(),
        prerequisite: network.id.clone(),
    };

    App::new(
        DEPLOYMENT_NAME,
        config.environment.clone(),
        vec![function.into(), network.into(), compute.into()],
        vec![dependency],
    )
}
