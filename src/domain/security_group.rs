// Copyright (c) 2025 - Cowboy AI, Inc.
//! Traffic Rule Sets
//!
//! Rules are additive allow rules. There is no deny or override: a rule set
//! only ever grows, and the effective policy is the union of its rules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::{LogicalId, ResourceName};

/// Source of inbound traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Peer {
    /// Every IPv4 address
    AnyIpv4,
}

impl Peer {
    pub fn cidr(&self) -> String {
        match self {
            Peer::AnyIpv4 => "0.0.0.0/0".to_string(),
        }
    }
}

impl fmt::Display for Peer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Peer::AnyIpv4 => write!(f, "Any IPv4"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Allow rule for inbound traffic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IngressRule {
    pub peer: Peer,
    pub protocol: Protocol,
    pub port: u16,
}

impl IngressRule {
    pub fn tcp(peer: Peer, port: u16) -> Self {
        Self {
            peer,
            protocol: Protocol::Tcp,
            port,
        }
    }

    /// Human-readable description, e.g. `from 0.0.0.0/0:80`
    pub fn description(&self) -> String {
        format!("from {}:{}", self.peer.cidr(), self.port)
    }
}

/// Named collection of allow rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficRuleSet {
    pub logical_id: LogicalId,
    pub name: ResourceName,
    pub ingress: Vec<IngressRule>,
    /// Outbound traffic left open; not modelled as a rule
    pub allow_all_outbound: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_ipv4_peer() {
        assert_eq!(Peer::AnyIpv4.cidr(), "0.0.0.0/0");
        assert_eq!(Peer::AnyIpv4.to_string(), "Any IPv4");
        assert_eq!(Protocol::Tcp.as_str(), "tcp");
    }

    #[test]
    fn test_rule_description() {
        assert_eq!(IngressRule::tcp(Peer::AnyIpv4, 80).description(), "from 0.0.0.0/0:80");
    }
}
