// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Unit
//!
//! Owns one network descriptor. Given an address range it declares one
//! network with one public subnet per zone and a shared internet gateway.
//! Other units see the network only through [`NetworkUnit::network_ref`].

use tracing::debug;

use crate::domain::invariants::validate_network;
use crate::domain::{NetworkDescriptor, NetworkRef, SubnetRef, UnitId};
use crate::errors::DeploymentResult;
use crate::intent::ResourceIntent;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkUnit {
    pub id: UnitId,
    pub network: NetworkDescriptor,
}

impl NetworkUnit {
    /// Read-only handle for units placed inside this network
    pub fn network_ref(&self) -> DeploymentResult<NetworkRef> {
        let subnets = self
            .network
            .carve_subnets()?
            .into_iter()
            .map(|subnet| -> DeploymentResult<SubnetRef> {
                Ok(SubnetRef {
                    logical_id: self.network.logical_id.child(&subnet.name)?,
                    subnet_type: subnet.subnet_type,
                    zone_index: subnet.zone_index,
                })
            })
            .collect::<DeploymentResult<Vec<_>>>()?;

        Ok(NetworkRef {
            unit: self.id.clone(),
            network_id: self.network.logical_id.clone(),
            subnets,
        })
    }
}

/// Intents for a network unit: the network itself
pub fn network_intents(unit: &NetworkUnit) -> DeploymentResult<Vec<ResourceIntent>> {
    validate_network(&unit.network)?;

    debug!(
        unit = %unit.id,
        cidr = %unit.network.cidr,
        zones = unit.network.max_azs,
        "Declaring network"
    );

    Ok(vec![ResourceIntent::Network(unit.network.clone())])
}
