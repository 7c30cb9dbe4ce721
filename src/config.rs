// Copyright (c) 2025 - Cowboy AI, Inc.
//! Synthesis configuration loaded from environment variables
//!
//! | Variable | Default | Purpose |
//! |---|---|---|
//! | `CDK_OUTDIR` | `cdk.out` | where the cloud assembly is written |
//! | `CIM_APP_ROOT` | `.` | base directory for user data and code assets |
//! | `CDK_DEFAULT_ACCOUNT` | unset | target account |
//! | `CDK_DEFAULT_REGION` | unset | target region |

use std::path::PathBuf;

use crate::assembly::Environment;

pub const OUT_DIR_VAR: &str = "CDK_OUTDIR";
pub const APP_ROOT_VAR: &str = "CIM_APP_ROOT";
pub const ACCOUNT_VAR: &str = "CDK_DEFAULT_ACCOUNT";
pub const REGION_VAR: &str = "CDK_DEFAULT_REGION";

pub const DEFAULT_OUT_DIR: &str = "cdk.out";
pub const DEFAULT_APP_ROOT: &str = ".";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthConfig {
    /// Directory the cloud assembly is written to
    pub out_dir: PathBuf,
    /// Local files referenced by units are resolved against this
    pub app_root: PathBuf,
    pub environment: Environment,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            app_root: PathBuf::from(DEFAULT_APP_ROOT),
            environment: Environment::default(),
        }
    }
}

impl SynthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            out_dir: get(OUT_DIR_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR)),
            app_root: get(APP_ROOT_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_APP_ROOT)),
            environment: Environment {
                account: get(ACCOUNT_VAR),
                region: get(REGION_VAR),
            },
        }
    }

    /// Configuration rooted at `app_root`, everything else defaulted
    pub fn with_app_root(app_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
            ..Self::default()
        }
    }
}
