// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Subnet Carving
//!
//! Any layout that validates must place every subnet inside the network
//! range, aligned to its own mask, without overlapping another subnet.

use cim_deployment::domain::invariants::validate_network;
use cim_deployment::domain::{
    Ipv4Cidr, LogicalId, NatStrategy, NetworkDescriptor, SubnetConfiguration, SubnetType,
};
use proptest::prelude::*;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

fn descriptor(cidr: Ipv4Cidr, mask: u8, max_azs: u32) -> NetworkDescriptor {
    NetworkDescriptor {
        logical_id: LogicalId::new("VpcDemo").unwrap(),
        name: "VpcDemo".to_string(),
        cidr,
        max_azs,
        enable_dns_support: true,
        enable_dns_hostnames: true,
        nat: NatStrategy::Gateway { gateways: 1 },
        subnets: vec![SubnetConfiguration {
            name: "Public".to_string(),
            cidr_mask: mask,
            subnet_type: SubnetType::Public,
        }],
        tags: BTreeMap::new(),
    }
}

/// Network range with its host bits cleared
fn network_strategy() -> impl Strategy<Value = Ipv4Cidr> {
    (any::<u32>(), 16u8..=28).prop_map(|(raw, prefix)| {
        let mask = u32::MAX << (32 - u32::from(prefix));
        Ipv4Cidr::from_parts(Ipv4Addr::from(raw & mask), prefix).unwrap()
    })
}

proptest! {
    /// Property: carved subnets are disjoint and inside the network
    #[test]
    fn prop_carved_subnets_disjoint_and_contained(
        network in network_strategy(),
        extra_bits in 0u8..=12,
        max_azs in 1u32..=6,
    ) {
        let mask = (network.prefix_length() + extra_bits).min(28);
        let descriptor = descriptor(network, mask, max_azs);
        prop_assume!(validate_network(&descriptor).is_ok());

        let carved = descriptor.carve_subnets().unwrap();
        prop_assert_eq!(carved.len(), max_azs as usize);

        for (i, subnet) in carved.iter().enumerate() {
            prop_assert!(network.contains(&subnet.cidr));
            prop_assert_eq!(subnet.cidr.prefix_length(), mask);
            prop_assert_eq!(subnet.zone_index, i as u32);
            for other in &carved[i + 1..] {
                prop_assert!(!subnet.cidr.overlaps(&other.cidr));
                prop_assert!(subnet.cidr.address() < other.cidr.address());
            }
        }
    }

    /// Property: a subnet mask wider than the network is always rejected
    #[test]
    fn prop_wider_mask_rejected(
        network in network_strategy(),
        wider_by in 1u8..=4,
    ) {
        prop_assume!(network.prefix_length() > 16);
        let mask = network.prefix_length().saturating_sub(wider_by).max(16);
        prop_assume!(mask < network.prefix_length());

        prop_assert!(validate_network(&descriptor(network, mask, 1)).is_err());
    }

    /// Property: validation succeeds exactly when the range holds one subnet per zone
    #[test]
    fn prop_zone_capacity(
        network in network_strategy(),
        extra_bits in 0u8..=4,
        max_azs in 1u32..=20,
    ) {
        let mask = network.prefix_length() + extra_bits;
        prop_assume!(mask <= 28);
        let capacity = 1u64 << extra_bits;

        let result = validate_network(&descriptor(network, mask, max_azs));
        prop_assert_eq!(result.is_ok(), u64::from(max_azs) <= capacity);
    }
}
