// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-deployment
//!
//! Provides an app root on disk with the two local inputs the hello
//! deployment reads at definition time.
//!
//! # Design Principles
//! - File contents are fixed constants so fingerprints are reproducible
//! - Every fixture lives in its own temporary directory
//! - Tests that need a missing input start from a complete root and remove it

#![allow(dead_code)]

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use cim_deployment::deployment::{define_app, LAMBDA_ASSET_DIR, USER_DATA_PATH};
use cim_deployment::{App, SynthConfig};

pub const USER_DATA_SCRIPT: &str = "\
yum update -y
yum install -y httpd
systemctl start httpd
systemctl enable httpd
echo '<h1>Hello from WebServerDemo</h1>' > /var/www/html/index.html
";

pub const HANDLER_SOURCE: &str = "\
def handler(event, context):
    return {'statusCode': 200, 'body': 'hello'}
";

/// App root holding `data/user-data.sh` and `lambda/index.py`
pub fn app_root() -> TempDir {
    let root = tempfile::tempdir().expect("Failed to create app root");
    write(root.path(), USER_DATA_PATH, USER_DATA_SCRIPT);
    write(
        root.path(),
        &format!("{}/index.py", LAMBDA_ASSET_DIR),
        HANDLER_SOURCE,
    );
    root
}

/// App root without the startup script
pub fn app_root_without_user_data() -> TempDir {
    let root = app_root();
    fs::remove_file(root.path().join(USER_DATA_PATH)).expect("Failed to remove user data");
    root
}

/// Configuration pointing at `root`, with a fixed target environment
pub fn config(root: &Path) -> SynthConfig {
    SynthConfig::from_lookup(|key| match key {
        "CIM_APP_ROOT" => Some(root.display().to_string()),
        "CDK_OUTDIR" => Some(root.join("cdk.out").display().to_string()),
        "CDK_DEFAULT_ACCOUNT" => Some("123456789012".to_string()),
        "CDK_DEFAULT_REGION" => Some("eu-west-1".to_string()),
        _ => None,
    })
}

/// The hello deployment rooted at `root`
pub fn hello_app(root: &Path) -> App {
    define_app(&config(root)).expect("Failed to define hello deployment")
}

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(&path, contents).expect("Failed to write fixture file");
}
