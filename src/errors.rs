// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for deployment definition and synthesis

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{NameError, NetworkError, ValidationError};
use crate::graph::DependencyError;

/// Errors that can occur while defining or synthesizing a deployment
#[derive(Debug, Error)]
pub enum DeploymentError {
    /// A local file referenced at definition time could not be read
    #[error("Failed to read {}: {source}", path.display())]
    LocalRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Descriptor values are inconsistent with provider constraints
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Address range or subnet layout is invalid
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Unit ordering could not be resolved
    #[error(transparent)]
    Dependency(#[from] DependencyError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Writing the cloud assembly failed
    #[error("Failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl DeploymentError {
    /// Build a local read failure for `path`
    pub fn local_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DeploymentError::LocalRead {
            path: path.into(),
            source,
        }
    }

    /// True when the failure happened before any descriptor was produced
    pub fn is_local_construction_failure(&self) -> bool {
        matches!(self, DeploymentError::LocalRead { .. })
    }
}

/// Result type for deployment operations
pub type DeploymentResult<T> = Result<T, DeploymentError>;

impl From<serde_json::Error> for DeploymentError {
    fn from(err: serde_json::Error) -> Self {
        DeploymentError::Serialization(err.to_string())
    }
}

impl From<NameError> for DeploymentError {
    fn from(err: NameError) -> Self {
        DeploymentError::Validation(err.into())
    }
}
