// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Domain Models
//!
//! Descriptors for everything a deployment unit can declare, and the value
//! objects they are built from. Descriptors are assembled once by field
//! initialization and never mutated afterwards.
//!
//! # Value Objects with Invariants
//!
//! - [`Ipv4Cidr`] - IPv4 range in CIDR notation, no host bits
//! - [`UnitId`], [`LogicalId`], [`ResourceName`] - validated identifiers
//! - [`InstanceType`], [`MachineImage`], [`Runtime`] - provider vocabularies
//!
//! # Descriptors
//!
//! - [`NetworkDescriptor`] - network range, zones and subnet groups
//! - [`RoleDescriptor`] - trust principal plus managed permission sets
//! - [`TrafficRuleSet`] - additive inbound allow rules
//! - [`InstanceDescriptor`] - one virtual machine
//! - [`FunctionDescriptor`] - one serverless function

pub mod compute;
pub mod function;
pub mod iam;
pub mod invariants;
pub mod names;
pub mod network;
pub mod security_group;

pub use compute::{
    AmazonLinuxEdition, AmazonLinuxGeneration, InstanceClass, InstanceDescriptor, InstanceSize,
    InstanceType, MachineImage, SubnetSelection, UserData,
};
pub use function::{CodeAsset, EnvironmentValue, ExternalReference, FunctionDescriptor, Runtime};
pub use iam::{ManagedPolicy, RoleDescriptor, ServicePrincipal};
pub use invariants::{ValidationError, ValidationResult};
pub use names::{LogicalId, NameError, ResourceName, UnitId};
pub use network::{
    export_name, CarvedSubnet, Ipv4Cidr, NatStrategy, NetworkDescriptor, NetworkError, NetworkRef,
    SubnetConfiguration, SubnetRef, SubnetType,
};
pub use security_group::{IngressRule, Peer, Protocol, TrafficRuleSet};
