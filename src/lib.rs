// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment definitions for the Composable Information Machine
//!
//! Declares a small cloud deployment as units of resource intents and
//! synthesizes it into a deterministic cloud assembly for an external
//! provisioning tool.

pub mod app;
pub mod assembly;
pub mod config;
pub mod deployment;
pub mod domain;
pub mod errors;
pub mod expand;
pub mod graph;
pub mod intent;
pub mod template;
pub mod units;

// Re-export commonly used types
pub use app::App;
pub use assembly::{AssemblyManifest, CloudAssembly, Environment};
pub use config::SynthConfig;
pub use errors::{DeploymentError, DeploymentResult};
pub use graph::{Dependency, DependencyError, DependencyGraph};
pub use intent::ResourceIntent;
pub use units::{ComputeUnit, FunctionUnit, NetworkUnit, UnitDefinition};
