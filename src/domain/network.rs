// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network Value Objects with Validation Invariants

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

use super::{LogicalId, UnitId};

/// Network validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    #[error("Invalid IPv4 address format: {0}")]
    InvalidIpAddress(String),

    #[error("Invalid CIDR notation: {0}")]
    InvalidCidr(String),

    #[error("Invalid prefix length: {0} (must be 0-32 for IPv4)")]
    InvalidPrefixLength(u8),

    #[error("Address {address} has host bits set for prefix /{prefix}")]
    HostBitsSet { address: Ipv4Addr, prefix: u8 },

    #[error("Prefix /{prefix} outside the allowed range /{min}-/{max}")]
    PrefixOutOfRange { prefix: u8, min: u8, max: u8 },

    #[error("Subnet mask /{mask} is wider than network {network}")]
    SubnetMaskTooWide { mask: u8, network: Ipv4Cidr },

    #[error("Network {network} cannot hold {requested} subnets of size /{mask}")]
    InsufficientAddressSpace {
        network: Ipv4Cidr,
        mask: u8,
        requested: u32,
    },
}

/// IPv4 network range in CIDR notation
///
/// Invariants:
/// - Valid IPv4 address format
/// - Prefix length present and 0-32
/// - No host bits set below the prefix
///
/// # Examples
///
/// ```rust
/// use cim_deployment::domain::Ipv4Cidr;
///
/// let range = Ipv4Cidr::new("10.0.0.0/24").unwrap();
/// assert_eq!(range.prefix_length(), 24);
/// assert_eq!(range.address_count(), 256);
/// assert!(Ipv4Cidr::new("10.0.0.1/24").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ipv4Cidr {
    address: Ipv4Addr,
    prefix_length: u8,
}

impl Ipv4Cidr {
    /// Parse a range such as `10.0.0.0/16`
    pub fn new(cidr: impl AsRef<str>) -> Result<Self, NetworkError> {
        let cidr = cidr.as_ref();

        let (addr_str, prefix_str) = cidr
            .split_once('/')
            .ok_or_else(|| NetworkError::InvalidCidr(cidr.to_string()))?;

        let address = Ipv4Addr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidIpAddress(addr_str.to_string()))?;

        let prefix_length = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidCidr(cidr.to_string()))?;

        Self::from_parts(address, prefix_length)
    }

    /// Create from a network address and prefix
    pub fn from_parts(address: Ipv4Addr, prefix_length: u8) -> Result<Self, NetworkError> {
        if prefix_length > 32 {
            return Err(NetworkError::InvalidPrefixLength(prefix_length));
        }

        if u32::from(address) & !Self::mask_bits(prefix_length) != 0 {
            return Err(NetworkError::HostBitsSet {
                address,
                prefix: prefix_length,
            });
        }

        Ok(Self {
            address,
            prefix_length,
        })
    }

    fn mask_bits(prefix_length: u8) -> u32 {
        if prefix_length == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix_length))
        }
    }

    /// Network address
    pub fn address(&self) -> Ipv4Addr {
        self.address
    }

    /// Prefix length
    pub fn prefix_length(&self) -> u8 {
        self.prefix_length
    }

    /// Number of addresses in the range
    pub fn address_count(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix_length))
    }

    /// Last address in the range
    pub fn last_address(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.address) | !Self::mask_bits(self.prefix_length))
    }

    /// True when `other` lies entirely inside this range
    pub fn contains(&self, other: &Ipv4Cidr) -> bool {
        other.prefix_length >= self.prefix_length
            && u32::from(other.address) & Self::mask_bits(self.prefix_length)
                == u32::from(self.address)
    }

    /// True when the two ranges share at least one address
    pub fn overlaps(&self, other: &Ipv4Cidr) -> bool {
        self.contains(other) || other.contains(self)
    }

    /// How many `/mask` subnets fit in this range
    pub fn subnet_capacity(&self, mask: u8) -> Result<u64, NetworkError> {
        if mask > 32 {
            return Err(NetworkError::InvalidPrefixLength(mask));
        }
        if mask < self.prefix_length {
            return Err(NetworkError::SubnetMaskTooWide {
                mask,
                network: *self,
            });
        }
        Ok(1u64 << u32::from(mask - self.prefix_length))
    }

    /// Get as CIDR notation string
    pub fn as_cidr(&self) -> String {
        format!("{}/{}", self.address, self.prefix_length)
    }
}

impl fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_cidr())
    }
}

impl FromStr for Ipv4Cidr {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for Ipv4Cidr {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_cidr())
    }
}

impl<'de> Deserialize<'de> for Ipv4Cidr {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(&raw).map_err(serde::de::Error::custom)
    }
}

/// Visibility class of a subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubnetType {
    /// Routed to the internet gateway, instances receive public addresses
    Public,
}

impl SubnetType {
    /// Whether instances launched here get a public address
    pub fn maps_public_ip(&self) -> bool {
        matches!(self, SubnetType::Public)
    }
}

impl fmt::Display for SubnetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubnetType::Public => write!(f, "Public"),
        }
    }
}

/// One subnet group, repeated in every zone of the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetConfiguration {
    pub name: String,
    pub cidr_mask: u8,
    pub subnet_type: SubnetType,
}

/// How private subnets reach the internet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "snake_case")]
pub enum NatStrategy {
    /// Managed NAT gateways, at most `gateways` shared across zones
    Gateway { gateways: u32 },
    /// No NAT path
    None,
}

impl NatStrategy {
    /// NAT gateways actually materialized given the declared subnets.
    ///
    /// Public subnets route through the internet gateway directly, so a
    /// network made only of public subnets never gets a NAT gateway.
    pub fn effective_gateways(&self, subnets: &[SubnetConfiguration]) -> u32 {
        let needs_nat = subnets.iter().any(|s| !s.subnet_type.maps_public_ip());
        match self {
            NatStrategy::Gateway { gateways } if needs_nat => *gateways,
            _ => 0,
        }
    }
}

/// A subnet carved from the network range for one zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarvedSubnet {
    /// Subnet group name plus 1-based zone ordinal, e.g. `PublicSubnet1`
    pub name: String,
    pub group: String,
    pub zone_index: u32,
    pub cidr: Ipv4Cidr,
    pub subnet_type: SubnetType,
}

/// Network descriptor
///
/// Created once per deployment; changing it means redeploying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    pub logical_id: LogicalId,
    pub name: String,
    pub cidr: Ipv4Cidr,
    pub max_azs: u32,
    pub enable_dns_support: bool,
    pub enable_dns_hostnames: bool,
    pub nat: NatStrategy,
    pub subnets: Vec<SubnetConfiguration>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl NetworkDescriptor {
    /// Lay out every subnet group across `max_azs` zones.
    ///
    /// Groups are placed in declaration order, zones in ascending order,
    /// each subnet taking the next free block of its mask size.
    pub fn carve_subnets(&self) -> Result<Vec<CarvedSubnet>, NetworkError> {
        let mut carved = Vec::new();
        let mut cursor = u64::from(u32::from(self.cidr.address()));
        let end = cursor + self.cidr.address_count();

        for config in &self.subnets {
            let capacity = self.cidr.subnet_capacity(config.cidr_mask)?;
            if capacity < u64::from(self.max_azs) {
                return Err(NetworkError::InsufficientAddressSpace {
                    network: self.cidr,
                    mask: config.cidr_mask,
                    requested: self.max_azs,
                });
            }

            let step = 1u64 << (32 - u32::from(config.cidr_mask));
            for zone in 0..self.max_azs {
                // Align to the subnet size before placing it
                let start = cursor.div_ceil(step) * step;
                if start + step > end {
                    return Err(NetworkError::InsufficientAddressSpace {
                        network: self.cidr,
                        mask: config.cidr_mask,
                        requested: self.max_azs,
                    });
                }
                carved.push(CarvedSubnet {
                    name: format!("{}Subnet{}", config.name, zone + 1),
                    group: config.name.clone(),
                    zone_index: zone,
                    cidr: Ipv4Cidr::from_parts(Ipv4Addr::from(start as u32), config.cidr_mask)?,
                    subnet_type: config.subnet_type,
                });
                cursor = start + step;
            }
        }

        Ok(carved)
    }
}

/// A subnet exposed to other units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubnetRef {
    pub logical_id: LogicalId,
    pub subnet_type: SubnetType,
    pub zone_index: u32,
}

/// Name under which `unit` publishes the identifier of resource `id`
pub fn export_name(unit: &UnitId, id: &LogicalId) -> String {
    format!("{}:{}", unit, id)
}

/// Read-only handle on a network owned by another unit
///
/// Carries identifiers only; the owning unit exports them and the consuming
/// unit imports them by export name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkRef {
    pub unit: UnitId,
    pub network_id: LogicalId,
    pub subnets: Vec<SubnetRef>,
}

impl NetworkRef {
    /// Export name under which the owning unit publishes `id`
    pub fn export_name(&self, id: &LogicalId) -> String {
        export_name(&self.unit, id)
    }

    /// Subnets of the requested visibility class, in zone order
    pub fn subnets_of(&self, subnet_type: SubnetType) -> Vec<&SubnetRef> {
        let mut selected: Vec<&SubnetRef> = self
            .subnets
            .iter()
            .filter(|s| s.subnet_type == subnet_type)
            .collect();
        selected.sort_by_key(|s| s.zone_index);
        selected
    }
}
