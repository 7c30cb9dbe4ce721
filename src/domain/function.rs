// Copyright (c) 2025 - Cowboy AI, Inc.
//! Serverless Function Descriptor

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use super::{LogicalId, ResourceName};
use crate::errors::{DeploymentError, DeploymentResult};

/// Function runtime identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Runtime {
    #[serde(rename = "python3.10")]
    Python310,
}

impl Runtime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Python310 => "python3.10",
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Local code directory bundled as the function artifact
///
/// The fingerprint is a SHA-256 over every file's relative path and
/// contents, visited in sorted order, so identical trees always hash the
/// same regardless of filesystem iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeAsset {
    pub path: PathBuf,
    pub fingerprint: String,
}

impl CodeAsset {
    /// Fingerprint `dir` now; a missing directory fails the definition.
    pub fn from_directory(dir: impl AsRef<Path>) -> DeploymentResult<Self> {
        let dir = dir.as_ref();
        let mut files = Vec::new();
        collect_files(dir, dir, &mut files)?;
        files.sort();

        let mut hasher = Sha256::new();
        for relative in &files {
            let full = dir.join(relative);
            let contents =
                std::fs::read(&full).map_err(|e| DeploymentError::local_read(&full, e))?;
            hasher.update(relative.as_bytes());
            hasher.update([0u8]);
            hasher.update((contents.len() as u64).to_be_bytes());
            hasher.update(&contents);
        }

        Ok(Self {
            path: dir.to_path_buf(),
            fingerprint: format!("{:x}", hasher.finalize()),
        })
    }

    /// Object key of the zipped artifact in the staging bucket
    pub fn object_key(&self) -> String {
        format!("{}.zip", self.fingerprint)
    }
}

/// Collect every regular file under `dir` as a `/`-joined path relative to
/// `root`. Symlinks are followed; a dangling link or a link back into a
/// directory being walked fails the definition.
fn collect_files(root: &Path, dir: &Path, out: &mut Vec<String>) -> DeploymentResult<()> {
    let mut walking = Vec::new();
    walk(root, dir, &mut walking, out)
}

fn walk(
    root: &Path,
    dir: &Path,
    walking: &mut Vec<PathBuf>,
    out: &mut Vec<String>,
) -> DeploymentResult<()> {
    let canonical = dir
        .canonicalize()
        .map_err(|e| DeploymentError::local_read(dir, e))?;
    if walking.contains(&canonical) {
        return Err(DeploymentError::local_read(
            dir,
            io::Error::new(io::ErrorKind::InvalidInput, "symlink loop in code directory"),
        ));
    }
    walking.push(canonical);

    let entries = std::fs::read_dir(dir).map_err(|e| DeploymentError::local_read(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| DeploymentError::local_read(dir, e))?;
        let path = entry.path();
        let metadata =
            std::fs::metadata(&path).map_err(|e| DeploymentError::local_read(&path, e))?;

        if metadata.is_dir() {
            walk(root, &path, walking, out)?;
        } else if metadata.is_file() {
            if let Ok(relative) = path.strip_prefix(root) {
                let parts: Vec<String> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                out.push(parts.join("/"));
            }
        }
    }

    walking.pop();
    Ok(())
}

/// Value lookup that no unit in this deployment declares
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalReference {
    /// Logical name the function is told about
    pub name: String,
    /// What the name is expected to identify
    pub purpose: String,
}

/// Environment variable value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EnvironmentValue {
    Literal { value: String },
    External(ExternalReference),
}

impl EnvironmentValue {
    pub fn literal(value: impl Into<String>) -> Self {
        EnvironmentValue::Literal {
            value: value.into(),
        }
    }

    pub fn external(name: impl Into<String>, purpose: impl Into<String>) -> Self {
        EnvironmentValue::External(ExternalReference {
            name: name.into(),
            purpose: purpose.into(),
        })
    }

    /// String handed to the function at runtime
    pub fn rendered(&self) -> &str {
        match self {
            EnvironmentValue::Literal { value } => value,
            EnvironmentValue::External(reference) => &reference.name,
        }
    }
}

/// Function descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDescriptor {
    pub logical_id: LogicalId,
    pub name: ResourceName,
    pub code: CodeAsset,
    pub handler: String,
    pub runtime: Runtime,
    /// Role declared in the same unit
    pub role: LogicalId,
    pub timeout_secs: u32,
    pub memory_mb: u32,
    pub environment: BTreeMap<String, EnvironmentValue>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: BTreeMap<String, String>,
}

impl FunctionDescriptor {
    /// Environment entries pointing at resources outside this deployment
    pub fn unresolved_references(&self) -> Vec<(&str, &ExternalReference)> {
        self.environment
            .iter()
            .filter_map(|(key, value)| match value {
                EnvironmentValue::External(reference) => Some((key.as_str(), reference)),
                EnvironmentValue::Literal { .. } => None,
            })
            .collect()
    }
}
