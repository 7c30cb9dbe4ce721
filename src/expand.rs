// Copyright (c) 2025 - Cowboy AI, Inc.
//! Derived Fields
//!
//! Intents come out of the unit functions with only the tags their author
//! wrote. This pass adds the deployment-wide defaults. It is a pure
//! `Vec<ResourceIntent> -> Vec<ResourceIntent>` map: explicit tags always win
//! over defaults and nothing else in the intent changes.

use std::collections::BTreeMap;

use crate::domain::UnitId;
use crate::intent::ResourceIntent;

/// Tag naming the deployment an intent belongs to
pub const DEPLOYMENT_TAG: &str = "cim:deployment";
/// Tag naming the unit an intent belongs to
pub const UNIT_TAG: &str = "cim:unit";

/// Default tags for every intent of `unit`
pub fn default_tags(deployment: &str, unit: &UnitId) -> BTreeMap<String, String> {
    BTreeMap::from([
        (DEPLOYMENT_TAG.to_string(), deployment.to_string()),
        (UNIT_TAG.to_string(), unit.to_string()),
    ])
}

/// Merge `defaults` under each intent's own tags
pub fn apply_default_tags(
    intents: Vec<ResourceIntent>,
    defaults: &BTreeMap<String, String>,
) -> Vec<ResourceIntent> {
    intents
        .into_iter()
        .map(|intent| {
            let mut tags = defaults.clone();
            tags.extend(intent.tags().iter().map(|(k, v)| (k.clone(), v.clone())));
            intent.with_tags(tags)
        })
        .collect()
}
