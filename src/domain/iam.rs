// Copyright (c) 2025 - Cowboy AI, Inc.
//! Role Descriptors and Trust Principals

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{LogicalId, ResourceName};

/// Service allowed to assume a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServicePrincipal {
    /// Serverless function execution service
    FunctionExecution,
    /// Virtual machine service
    Compute,
}

impl ServicePrincipal {
    /// Principal identifier as it appears in a trust policy
    pub fn as_str(&self) -> &'static str {
        match self {
            ServicePrincipal::FunctionExecution => "lambda.amazonaws.com",
            ServicePrincipal::Compute => "ec2.amazonaws.com",
        }
    }
}

impl fmt::Display for ServicePrincipal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Provider-managed permission set attached by name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManagedPolicy(String);

impl ManagedPolicy {
    pub fn from_managed_policy_name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Basic log-writing permissions for functions
    pub fn basic_execution() -> Self {
        Self::from_managed_policy_name("service-role/AWSLambdaBasicExecutionRole")
    }

    /// Remote session management for instances
    pub fn remote_management() -> Self {
        Self::from_managed_policy_name("AmazonSSMManagedInstanceCore")
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ManagedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role descriptor
///
/// The name must be unique within the deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDescriptor {
    pub logical_id: LogicalId,
    pub name: ResourceName,
    pub assumed_by: ServicePrincipal,
    pub managed_policies: Vec<ManagedPolicy>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}
