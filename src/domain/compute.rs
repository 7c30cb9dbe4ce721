// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compute Instance Descriptor
//!
//! An instance is placed in subnets selected from a [`NetworkRef`], runs with
//! a role from its own unit and is filtered by a [`TrafficRuleSet`] declared
//! alongside it. Its startup script is read once, when the deployment is
//! defined, and travels inside the descriptor as opaque text.
//!
//! [`TrafficRuleSet`]: super::TrafficRuleSet

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use super::{LogicalId, NetworkRef, ResourceName, SubnetType};
use crate::errors::{DeploymentError, DeploymentResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceClass {
    T2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceSize {
    Small,
}

/// Instance size class, rendered as `t2.small`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceType {
    pub class: InstanceClass,
    pub size: InstanceSize,
}

impl InstanceType {
    pub fn of(class: InstanceClass, size: InstanceSize) -> Self {
        Self { class, size }
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = match self.class {
            InstanceClass::T2 => "t2",
        };
        let size = match self.size {
            InstanceSize::Small => "small",
        };
        write!(f, "{}.{}", class, size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmazonLinuxGeneration {
    AmazonLinux2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmazonLinuxEdition {
    Standard,
}

/// Machine image selection, resolved by the provider at deploy time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum MachineImage {
    AmazonLinux {
        generation: AmazonLinuxGeneration,
        edition: AmazonLinuxEdition,
    },
}

impl MachineImage {
    /// Public parameter that resolves to the latest image id
    pub fn parameter_name(&self) -> String {
        match self {
            MachineImage::AmazonLinux {
                generation: AmazonLinuxGeneration::AmazonLinux2,
                edition,
            } => {
                let flavour = match edition {
                    AmazonLinuxEdition::Standard => "amzn2-ami-hvm-x86_64-gp2",
                };
                format!("/aws/service/ami-amazon-linux-latest/{}", flavour)
            }
        }
    }
}

/// Startup script executed once at first boot
///
/// The body is kept byte for byte as read; only the shell line is added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    body: String,
}

impl UserData {
    pub const SHEBANG: &'static str = "#!/bin/bash";

    /// Read the script now; a missing file fails the whole definition.
    pub fn from_file(path: impl AsRef<Path>) -> DeploymentResult<Self> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)
            .map_err(|e| DeploymentError::local_read(path, e))?;
        Ok(Self::from_script(body))
    }

    pub fn from_script(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    /// Full script text with the shell line prepended
    pub fn render(&self) -> String {
        format!("{}\n{}", Self::SHEBANG, self.body)
    }
}

/// Which subnets of the network the instance may land in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetSelection {
    pub subnet_type: SubnetType,
}

/// Compute instance descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDescriptor {
    pub logical_id: LogicalId,
    pub name: ResourceName,
    /// Role declared in the same unit
    pub role: LogicalId,
    pub network: NetworkRef,
    pub subnet_selection: SubnetSelection,
    /// Rule set declared in the same unit
    pub rule_set: LogicalId,
    pub instance_type: InstanceType,
    pub machine_image: MachineImage,
    pub user_data: UserData,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}
