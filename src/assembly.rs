// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cloud Assembly
//!
//! The static output handed to the external provisioning tool: a manifest
//! listing units in materialization order with their dependencies, plus one
//! template per unit.
//!
//! # Layout
//!
//! ```text
//! <out_dir>/
//!   manifest.json
//!   HelloCdkStack.template.json
//!   VpcStack.template.json
//!   ApplicationStack.template.json
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::UnitId;
use crate::errors::{DeploymentError, DeploymentResult};
use crate::intent::ResourceIntent;
use crate::template::{AssetEntry, UnresolvedReference};

pub const MANIFEST_FILE: &str = "manifest.json";
pub const ASSEMBLY_VERSION: &str = "1.0.0";

/// Target account and region, `aws://<account>/<region>`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub account: Option<String>,
    pub region: Option<String>,
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "aws://{}/{}",
            self.account.as_deref().unwrap_or("unknown-account"),
            self.region.as_deref().unwrap_or("unknown-region")
        )
    }
}

/// Kind and id of one declared intent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentSummary {
    pub kind: String,
    pub logical_id: String,
}

/// Manifest entry for one unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitManifest {
    pub id: UnitId,
    pub kind: String,
    pub template_file: String,
    pub dependencies: Vec<UnitId>,
    pub intents: Vec<IntentSummary>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assets: Vec<AssetEntry>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub exports: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub imports: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved_references: Vec<UnresolvedReference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyManifest {
    pub version: String,
    pub deployment: String,
    pub environment: String,
    /// Units in materialization order
    pub units: Vec<UnitManifest>,
}

impl AssemblyManifest {
    pub fn unit(&self, id: &UnitId) -> Option<&UnitManifest> {
        self.units.iter().find(|u| &u.id == id)
    }

    /// Unit ids in materialization order
    pub fn order(&self) -> Vec<&UnitId> {
        self.units.iter().map(|u| &u.id).collect()
    }
}

/// Synthesized deployment description
#[derive(Debug, Clone, PartialEq)]
pub struct CloudAssembly {
    pub manifest: AssemblyManifest,
    pub templates: BTreeMap<UnitId, Value>,
    pub intents: BTreeMap<UnitId, Vec<ResourceIntent>>,
}

impl CloudAssembly {
    pub fn template(&self, unit: &UnitId) -> Option<&Value> {
        self.templates.get(unit)
    }

    /// Expanded intents of `unit`, empty if the unit is unknown
    pub fn intents(&self, unit: &UnitId) -> &[ResourceIntent] {
        self.intents.get(unit).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every intent of the deployment, in unit order
    pub fn all_intents(&self) -> impl Iterator<Item = &ResourceIntent> {
        self.manifest
            .units
            .iter()
            .flat_map(move |unit| self.intents(&unit.id).iter())
    }

    /// File name to contents for every file of the assembly
    pub fn render_files(&self) -> DeploymentResult<BTreeMap<String, String>> {
        let mut files = BTreeMap::new();
        files.insert(MANIFEST_FILE.to_string(), to_json(&self.manifest)?);
        for unit in &self.manifest.units {
            let template = self.templates.get(&unit.id).ok_or_else(|| {
                DeploymentError::Serialization(format!("No template rendered for unit {}", unit.id))
            })?;
            files.insert(unit.template_file.clone(), to_json(template)?);
        }
        Ok(files)
    }

    /// Write the assembly under `dir`, creating it if needed
    pub fn write_to(&self, dir: impl AsRef<Path>) -> DeploymentResult<Vec<PathBuf>> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| DeploymentError::Output {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::new();
        for (name, contents) in self.render_files()? {
            let path = dir.join(&name);
            std::fs::write(&path, contents).map_err(|source| DeploymentError::Output {
                path: path.clone(),
                source,
            })?;
            debug!(file = %path.display(), "Wrote assembly file");
            written.push(path);
        }

        info!(
            dir = %dir.display(),
            files = written.len(),
            "Cloud assembly written"
        );
        Ok(written)
    }
}

fn to_json<T: Serialize>(value: &T) -> DeploymentResult<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}
