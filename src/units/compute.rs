// Copyright (c) 2025 - Cowboy AI, Inc.
//! Compute Unit
//!
//! An instance role with remote-management permissions, a rule set admitting
//! TCP 80 from anywhere, and one instance in a subnet of another unit's
//! network. The startup script is already loaded in [`UserData`], so a
//! `ComputeUnit` cannot exist without it.

use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::invariants::validate_unit_intents;
use crate::domain::{
    IngressRule, InstanceDescriptor, InstanceType, LogicalId, MachineImage, ManagedPolicy,
    NetworkRef, Peer, ResourceName, RoleDescriptor, ServicePrincipal, SubnetSelection,
    SubnetType, TrafficRuleSet, UnitId, UserData,
};
use crate::errors::DeploymentResult;
use crate::intent::ResourceIntent;

/// Port the instance serves on
pub const HTTP_PORT: u16 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComputeUnit {
    pub id: UnitId,
    pub network: NetworkRef,
    pub subnet_type: SubnetType,
    pub role_id: LogicalId,
    pub role_name: ResourceName,
    pub rule_set_id: LogicalId,
    pub rule_set_name: ResourceName,
    pub instance_id: LogicalId,
    pub instance_name: ResourceName,
    pub instance_type: InstanceType,
    pub machine_image: MachineImage,
    pub user_data: UserData,
}

/// Intents for a compute unit: role, rule set, then instance
pub fn compute_intents(unit: &ComputeUnit) -> DeploymentResult<Vec<ResourceIntent>> {
    let role = RoleDescriptor {
        logical_id: unit.role_id.clone(),
        name: unit.role_name.clone(),
        assumed_by: ServicePrincipal::Compute,
        managed_policies: vec![ManagedPolicy::remote_management()],
        tags: BTreeMap::new(),
    };

    let rule_set = TrafficRuleSet {
        logical_id: unit.rule_set_id.clone(),
        name: unit.rule_set_name.clone(),
        ingress: vec![IngressRule::tcp(Peer::AnyIpv4, HTTP_PORT)],
        allow_all_outbound: true,
        tags: BTreeMap::new(),
    };

    let instance = InstanceDescriptor {
        logical_id: unit.instance_id.clone(),
        name: unit.instance_name.clone(),
        role: role.logical_id.clone(),
        network: unit.network.clone(),
        subnet_selection: SubnetSelection {
            subnet_type: unit.subnet_type,
        },
        rule_set: rule_set.logical_id.clone(),
        instance_type: unit.instance_type,
        machine_image: unit.machine_image,
        user_data: unit.user_data.clone(),
        tags: BTreeMap::new(),
    };

    let intents = vec![
        ResourceIntent::Role(role),
        ResourceIntent::RuleSet(rule_set),
        ResourceIntent::Instance(instance),
    ];
    validate_unit_intents(unit.id.as_str(), &intents)?;

    debug!(
        unit = %unit.id,
        network = %unit.network.unit,
        instance_type = %unit.instance_type,
        "Declared compute unit"
    );
    Ok(intents)
}
