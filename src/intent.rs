// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Intents
//!
//! Every unit reduces to a flat list of tagged intent records. An intent says
//! what should exist; rendering it into a provider template happens later in
//! [`crate::template`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{
    FunctionDescriptor, InstanceDescriptor, LogicalId, NetworkDescriptor, RoleDescriptor,
    TrafficRuleSet,
};

/// One resource a unit wants materialized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent")]
pub enum ResourceIntent {
    #[serde(rename = "NetworkIntent")]
    Network(NetworkDescriptor),
    #[serde(rename = "RoleIntent")]
    Role(RoleDescriptor),
    #[serde(rename = "RuleSetIntent")]
    RuleSet(TrafficRuleSet),
    #[serde(rename = "InstanceIntent")]
    Instance(InstanceDescriptor),
    #[serde(rename = "FunctionIntent")]
    Function(FunctionDescriptor),
}

impl ResourceIntent {
    pub fn logical_id(&self) -> &LogicalId {
        match self {
            ResourceIntent::Network(d) => &d.logical_id,
            ResourceIntent::Role(d) => &d.logical_id,
            ResourceIntent::RuleSet(d) => &d.logical_id,
            ResourceIntent::Instance(d) => &d.logical_id,
            ResourceIntent::Function(d) => &d.logical_id,
        }
    }

    /// Record kind, as it appears in serialized output
    pub fn kind(&self) -> &'static str {
        match self {
            ResourceIntent::Network(_) => "NetworkIntent",
            ResourceIntent::Role(_) => "RoleIntent",
            ResourceIntent::RuleSet(_) => "RuleSetIntent",
            ResourceIntent::Instance(_) => "InstanceIntent",
            ResourceIntent::Function(_) => "FunctionIntent",
        }
    }

    pub fn tags(&self) -> &BTreeMap<String, String> {
        match self {
            ResourceIntent::Network(d) => &d.tags,
            ResourceIntent::Role(d) => &d.tags,
            ResourceIntent::RuleSet(d) => &d.tags,
            ResourceIntent::Instance(d) => &d.tags,
            ResourceIntent::Function(d) => &d.tags,
        }
    }

    /// Same intent with a different tag map
    pub fn with_tags(self, tags: BTreeMap<String, String>) -> Self {
        match self {
            ResourceIntent::Network(d) => ResourceIntent::Network(NetworkDescriptor { tags, ..d }),
            ResourceIntent::Role(d) => ResourceIntent::Role(RoleDescriptor { tags, ..d }),
            ResourceIntent::RuleSet(d) => ResourceIntent::RuleSet(TrafficRuleSet { tags, ..d }),
            ResourceIntent::Instance(d) => {
                ResourceIntent::Instance(InstanceDescriptor { tags, ..d })
            }
            ResourceIntent::Function(d) => {
                ResourceIntent::Function(FunctionDescriptor { tags, ..d })
            }
        }
    }

    pub fn as_role(&self) -> Option<&RoleDescriptor> {
        match self {
            ResourceIntent::Role(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_rule_set(&self) -> Option<&TrafficRuleSet> {
        match self {
            ResourceIntent::RuleSet(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&InstanceDescriptor> {
        match self {
            ResourceIntent::Instance(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&FunctionDescriptor> {
        match self {
            ResourceIntent::Function(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_network(&self) -> Option<&NetworkDescriptor> {
        match self {
            ResourceIntent::Network(d) => Some(d),
            _ => None,
        }
    }
}
