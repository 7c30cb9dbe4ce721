// Copyright (c) 2025 - Cowboy AI, Inc.
//! Identifier Value Objects
//!
//! - [`UnitId`] names a deployment unit (one template in the assembly)
//! - [`LogicalId`] names a resource inside a unit's template
//! - [`ResourceName`] is the physical name given to roles, functions,
//!   security groups and instances

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identifier validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Name is empty")]
    Empty,

    #[error("Name exceeds maximum length of {max} characters: {value}")]
    TooLong { value: String, max: usize },

    #[error("Invalid character {ch:?} in name: {value}")]
    InvalidCharacter { value: String, ch: char },

    #[error("Name must start with a letter: {0}")]
    InvalidStart(String),
}

fn check_length(value: &str, max: usize) -> Result<(), NameError> {
    if value.is_empty() {
        return Err(NameError::Empty);
    }
    if value.len() > max {
        return Err(NameError::TooLong {
            value: value.to_string(),
            max,
        });
    }
    Ok(())
}

fn check_chars(value: &str, allowed: impl Fn(char) -> bool) -> Result<(), NameError> {
    match value.chars().find(|ch| !allowed(*ch)) {
        Some(ch) => Err(NameError::InvalidCharacter {
            value: value.to_string(),
            ch,
        }),
        None => Ok(()),
    }
}

/// Deployment unit identifier
///
/// Invariants:
/// - 1-128 characters
/// - Starts with a letter
/// - Alphanumeric and hyphens only
///
/// # Examples
///
/// ```rust
/// use cim_deployment::domain::UnitId;
///
/// assert!(UnitId::new("VpcStack").is_ok());
/// assert!(UnitId::new("1Stack").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub const MAX_LENGTH: usize = 128;

    pub fn new(id: impl Into<String>) -> Result<Self, NameError> {
        let id = id.into();
        check_length(&id, Self::MAX_LENGTH)?;
        if !id.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(NameError::InvalidStart(id));
        }
        check_chars(&id, |c| c.is_ascii_alphanumeric() || c == '-')?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of this unit's template inside the assembly
    pub fn template_file(&self) -> String {
        format!("{}.template.json", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for UnitId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for UnitId {
    type Error = NameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Template-local resource identifier (alphanumeric only)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    pub const MAX_LENGTH: usize = 255;

    pub fn new(id: impl Into<String>) -> Result<Self, NameError> {
        let id = id.into();
        check_length(&id, Self::MAX_LENGTH)?;
        check_chars(&id, |c| c.is_ascii_alphanumeric())?;
        Ok(Self(id))
    }

    /// Derive a child id by appending an alphanumeric suffix
    pub fn child(&self, suffix: &str) -> Result<Self, NameError> {
        Self::new(format!("{}{}", self.0, suffix))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for LogicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Physical resource name
///
/// Invariants:
/// - 1-64 characters
/// - Alphanumeric plus `+=,.@_-`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceName(String);

impl ResourceName {
    pub const MAX_LENGTH: usize = 64;

    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();
        check_length(&name, Self::MAX_LENGTH)?;
        check_chars(&name, |c| c.is_ascii_alphanumeric() || "+=,.@_-".contains(c))?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ResourceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
