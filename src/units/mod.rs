// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Units
//!
//! A unit is a plain configuration struct plus a free function that turns it
//! into [`ResourceIntent`] records. Units never hold references to each other;
//! the only cross-unit data is a [`NetworkRef`](crate::domain::NetworkRef)
//! copied out of a [`NetworkUnit`].
//!
//! | Unit | Intents |
//! |---|---|
//! | [`FunctionUnit`] | execution role, function |
//! | [`NetworkUnit`] | network |
//! | [`ComputeUnit`] | instance role, rule set, instance |

pub mod compute;
pub mod function;
pub mod network;

pub use compute::{compute_intents, ComputeUnit};
pub use function::{function_intents, FunctionUnit};
pub use network::{network_intents, NetworkUnit};

use crate::domain::UnitId;
use crate::errors::DeploymentResult;
use crate::intent::ResourceIntent;

/// Any unit an [`App`](crate::app::App) can hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitDefinition {
    Function(FunctionUnit),
    Network(NetworkUnit),
    Compute(ComputeUnit),
}

impl UnitDefinition {
    pub fn id(&self) -> &UnitId {
        match self {
            UnitDefinition::Function(unit) => &unit.id,
            UnitDefinition::Network(unit) => &unit.id,
            UnitDefinition::Compute(unit) => &unit.id,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UnitDefinition::Function(_) => "function",
            UnitDefinition::Network(_) => "network",
            UnitDefinition::Compute(_) => "compute",
        }
    }

    /// Resource intents declared by this unit
    pub fn intents(&self) -> DeploymentResult<Vec<ResourceIntent>> {
        match self {
            UnitDefinition::Function(unit) => function_intents(unit),
            UnitDefinition::Network(unit) => network_intents(unit),
            UnitDefinition::Compute(unit) => compute_intents(unit),
        }
    }

    /// Other units whose resources this unit refers to
    pub fn referenced_units(&self) -> Vec<&UnitId> {
        match self {
            UnitDefinition::Compute(unit) => vec![&unit.network.unit],
            UnitDefinition::Function(_) | UnitDefinition::Network(_) => Vec::new(),
        }
    }
}

impl From<FunctionUnit> for UnitDefinition {
    fn from(unit: FunctionUnit) -> Self {
        UnitDefinition::Function(unit)
    }
}

impl From<NetworkUnit> for UnitDefinition {
    fn from(unit: NetworkUnit) -> Self {
        UnitDefinition::Network(unit)
    }
}

impl From<ComputeUnit> for UnitDefinition {
    fn from(unit: ComputeUnit) -> Self {
        UnitDefinition::Compute(unit)
    }
}
