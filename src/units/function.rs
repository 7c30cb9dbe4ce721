// Copyright (c) 2025 - Cowboy AI, Inc.
//! Function Unit
//!
//! One execution role trusted by the function service, with basic execution
//! permissions, and one function bound to it.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::domain::invariants::validate_unit_intents;
use crate::domain::{
    CodeAsset, EnvironmentValue, FunctionDescriptor, LogicalId, ManagedPolicy, ResourceName,
    RoleDescriptor, Runtime, ServicePrincipal, UnitId,
};
use crate::errors::DeploymentResult;
use crate::intent::ResourceIntent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionUnit {
    pub id: UnitId,
    pub role_id: LogicalId,
    pub role_name: ResourceName,
    pub function_id: LogicalId,
    pub function_name: ResourceName,
    /// Fingerprinted when the unit is defined
    pub code: CodeAsset,
    pub handler: String,
    pub runtime: Runtime,
    pub timeout_secs: u32,
    pub memory_mb: u32,
    pub environment: BTreeMap<String, EnvironmentValue>,
}

/// Intents for a function unit: execution role, then function
pub fn function_intents(unit: &FunctionUnit) -> DeploymentResult<Vec<ResourceIntent>> {
    let role = RoleDescriptor {
        logical_id: unit.role_id.clone(),
        name: unit.role_name.clone(),
        assumed_by: ServicePrincipal::FunctionExecution,
        managed_policies: vec![ManagedPolicy::basic_execution()],
        tags: BTreeMap::new(),
    };

    let function = FunctionDescriptor {
        logical_id: unit.function_id.clone(),
        name: unit.function_name.clone(),
        code: unit.code.clone(),
        handler: unit.handler.clone(),
        runtime: unit.runtime,
        role: role.logical_id.clone(),
        timeout_secs: unit.timeout_secs,
        memory_mb: unit.memory_mb,
        environment: unit.environment.clone(),
        tags: BTreeMap::new(),
    };

    for (key, reference) in function.unresolved_references() {
        warn!(
            unit = %unit.id,
            function = %function.name,
            variable = key,
            target = %reference.name,
            "Environment variable points at a {} not declared in this deployment",
            reference.purpose
        );
    }

    let intents = vec![ResourceIntent::Role(role), ResourceIntent::Function(function)];
    validate_unit_intents(unit.id.as_str(), &intents)?;

    debug!(unit = %unit.id, count = intents.len(), "Declared function unit");
    Ok(intents)
}
