// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Domain Invariants
//!
//! Business rules checked before any template is rendered. Every function is
//! pure and returns the first violation it finds.
//!
//! # Invariant Categories
//!
//! 1. **Descriptor Invariants**: one descriptor in isolation (address layout,
//!    function limits)
//! 2. **Unit Invariants**: references between intents of the same unit
//! 3. **Deployment Invariants**: uniqueness across every unit

use std::collections::BTreeSet;

use super::{
    FunctionDescriptor, InstanceDescriptor, LogicalId, NameError, NetworkDescriptor, NetworkError,
    RoleDescriptor, TrafficRuleSet,
};
use crate::intent::ResourceIntent;

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Validation error with context
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Address layout is invalid
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Identifier is malformed
    #[error(transparent)]
    Name(#[from] NameError),

    /// Network must declare exactly one (public) subnet group
    #[error("Network {network} declares {found} subnet groups, expected exactly one")]
    SubnetGroupCount { network: String, found: usize },

    /// Network must span at least one zone
    #[error("Network {0} must span at least one availability zone")]
    NoAvailabilityZones(String),

    /// Role names collide within the deployment
    #[error("Role name {0} is declared more than once")]
    DuplicateRoleName(String),

    /// Two intents of one unit share a logical id
    #[error("Logical id {id} is declared more than once in unit {unit}")]
    DuplicateLogicalId { unit: String, id: String },

    /// Two units share an id
    #[error("Unit {0} is declared more than once")]
    DuplicateUnit(String),

    /// An intent points at a resource its unit does not declare
    #[error("{resource} references {target}, which unit {unit} does not declare as a {expected}")]
    DanglingReference {
        unit: String,
        resource: String,
        target: String,
        expected: &'static str,
    },

    /// Subnet selection matched nothing
    #[error("Instance {instance} selects {subnet_type} subnets but network {network} has none")]
    NoSubnetsSelected {
        instance: String,
        network: String,
        subnet_type: String,
    },

    /// A unit consumes another unit's network without declaring the edge
    #[error("Unit {dependent} references unit {prerequisite} without depending on it")]
    MissingDependency {
        dependent: String,
        prerequisite: String,
    },

    /// A template imports a value no prerequisite unit exports
    #[error("Unit {unit} imports {export}, which no prerequisite unit exports")]
    UnresolvedImport { unit: String, export: String },

    /// Function timeout out of range
    #[error("Function timeout {0}s outside 1-900s")]
    TimeoutOutOfRange(u32),

    /// Function memory out of range
    #[error("Function memory {0}MB outside 128-10240MB")]
    MemoryOutOfRange(u32),

    /// Function handler missing
    #[error("Function {0} has an empty handler")]
    EmptyHandler(String),

    /// Environment variable name is not a valid identifier
    #[error("Invalid environment variable name: {0:?}")]
    InvalidEnvironmentKey(String),

    /// Rule uses port zero
    #[error("Rule set {0} contains a rule for port 0")]
    InvalidPort(String),
}

/// Smallest network the provider accepts
pub const MIN_NETWORK_PREFIX: u8 = 16;
/// Largest network the provider accepts
pub const MAX_NETWORK_PREFIX: u8 = 28;

pub const MAX_FUNCTION_TIMEOUT_SECS: u32 = 900;
pub const MIN_FUNCTION_MEMORY_MB: u32 = 128;
pub const MAX_FUNCTION_MEMORY_MB: u32 = 10240;

fn check_prefix(prefix: u8) -> Result<(), NetworkError> {
    if !(MIN_NETWORK_PREFIX..=MAX_NETWORK_PREFIX).contains(&prefix) {
        return Err(NetworkError::PrefixOutOfRange {
            prefix,
            min: MIN_NETWORK_PREFIX,
            max: MAX_NETWORK_PREFIX,
        });
    }
    Ok(())
}

/// Validate a network descriptor
///
/// # Rules
/// - Network prefix /16-/28
/// - Exactly one subnet group
/// - Subnet mask /16-/28 and not wider than the network
/// - At least one zone, and room for one subnet per zone
pub fn validate_network(network: &NetworkDescriptor) -> ValidationResult {
    check_prefix(network.cidr.prefix_length())?;

    if network.subnets.len() != 1 {
        return Err(ValidationError::SubnetGroupCount {
            network: network.logical_id.to_string(),
            found: network.subnets.len(),
        });
    }

    if network.max_azs == 0 {
        return Err(ValidationError::NoAvailabilityZones(
            network.logical_id.to_string(),
        ));
    }

    for group in &network.subnets {
        check_prefix(group.cidr_mask)?;
    }

    network.carve_subnets()?;
    Ok(())
}

/// Validate function limits
///
/// # Rules
/// - Timeout 1-900 seconds
/// - Memory 128-10240 MB
/// - Handler present
/// - Environment names are identifiers (`[A-Za-z][A-Za-z0-9_]*`)
pub fn validate_function(function: &FunctionDescriptor) -> ValidationResult {
    if !(1..=MAX_FUNCTION_TIMEOUT_SECS).contains(&function.timeout_secs) {
        return Err(ValidationError::TimeoutOutOfRange(function.timeout_secs));
    }

    if !(MIN_FUNCTION_MEMORY_MB..=MAX_FUNCTION_MEMORY_MB).contains(&function.memory_mb) {
        return Err(ValidationError::MemoryOutOfRange(function.memory_mb));
    }

    if function.handler.trim().is_empty() {
        return Err(ValidationError::EmptyHandler(function.name.to_string()));
    }

    for key in function.environment.keys() {
        let valid = key.starts_with(|c: char| c.is_ascii_alphabetic())
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(ValidationError::InvalidEnvironmentKey(key.clone()));
        }
    }

    Ok(())
}

/// Validate a rule set
pub fn validate_rule_set(rule_set: &TrafficRuleSet) -> ValidationResult {
    if rule_set.ingress.iter().any(|rule| rule.port == 0) {
        return Err(ValidationError::InvalidPort(rule_set.name.to_string()));
    }
    Ok(())
}

/// Validate the instance can be placed in its network
pub fn validate_subnet_selection(instance: &InstanceDescriptor) -> ValidationResult {
    if instance
        .network
        .subnets_of(instance.subnet_selection.subnet_type)
        .is_empty()
    {
        return Err(ValidationError::NoSubnetsSelected {
            instance: instance.name.to_string(),
            network: instance.network.network_id.to_string(),
            subnet_type: instance.subnet_selection.subnet_type.to_string(),
        });
    }
    Ok(())
}

/// Validate the intents of one unit
///
/// # Rules
/// - Logical ids are unique
/// - Every descriptor passes its own rules
/// - Role and rule set references resolve inside the unit
pub fn validate_unit_intents(unit: &str, intents: &[ResourceIntent]) -> ValidationResult {
    let mut seen = BTreeSet::new();
    for intent in intents {
        if !seen.insert(intent.logical_id().as_str()) {
            return Err(ValidationError::DuplicateLogicalId {
                unit: unit.to_string(),
                id: intent.logical_id().to_string(),
            });
        }
    }

    let declares_role = |id: &LogicalId| {
        intents
            .iter()
            .any(|i| i.as_role().is_some_and(|r| &r.logical_id == id))
    };
    let declares_rule_set = |id: &LogicalId| {
        intents
            .iter()
            .any(|i| i.as_rule_set().is_some_and(|r| &r.logical_id == id))
    };

    for intent in intents {
        match intent {
            ResourceIntent::Network(network) => validate_network(network)?,
            ResourceIntent::RuleSet(rule_set) => validate_rule_set(rule_set)?,
            ResourceIntent::Role(_) => {}
            ResourceIntent::Function(function) => {
                validate_function(function)?;
                if !declares_role(&function.role) {
                    return Err(ValidationError::DanglingReference {
                        unit: unit.to_string(),
                        resource: function.logical_id.to_string(),
                        target: function.role.to_string(),
                        expected: "role",
                    });
                }
            }
            ResourceIntent::Instance(instance) => {
                validate_subnet_selection(instance)?;
                if !declares_role(&instance.role) {
                    return Err(ValidationError::DanglingReference {
                        unit: unit.to_string(),
                        resource: instance.logical_id.to_string(),
                        target: instance.role.to_string(),
                        expected: "role",
                    });
                }
                if !declares_rule_set(&instance.rule_set) {
                    return Err(ValidationError::DanglingReference {
                        unit: unit.to_string(),
                        resource: instance.logical_id.to_string(),
                        target: instance.rule_set.to_string(),
                        expected: "rule set",
                    });
                }
            }
        }
    }

    Ok(())
}

/// Validate role names are unique across the deployment
pub fn validate_unique_role_names<'a>(
    roles: impl IntoIterator<Item = &'a RoleDescriptor>,
) -> ValidationResult {
    let mut seen = BTreeSet::new();
    for role in roles {
        if !seen.insert(role.name.as_str()) {
            return Err(ValidationError::DuplicateRoleName(role.name.to_string()));
        }
    }
    Ok(())
}
