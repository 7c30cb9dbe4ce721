// Copyright (c) 2025 - Cowboy AI, Inc.
//! Unit Dependency Graph
//!
//! Ordering between units is an explicit list of directed edges. Before any
//! unit is rendered the list is sorted topologically; a unit always comes
//! after every unit it depends on.
//!
//! The sort is a depth-first walk in unit declaration order, so the result
//! is fully determined by the order units and edges were declared.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::UnitId;

/// Errors raised while recording or resolving unit ordering
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("Circular dependency detected involving unit '{0}'")]
    Cycle(UnitId),

    #[error("Dependency names unknown unit '{0}'")]
    UnknownUnit(UnitId),

    #[error("Unit '{0}' cannot depend on itself")]
    SelfDependency(UnitId),
}

/// `dependent` must not be materialized before `prerequisite` completes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub dependent: UnitId,
    pub prerequisite: UnitId,
}

/// Directed dependency list over a fixed set of units
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    units: Vec<UnitId>,
    edges: Vec<Dependency>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit; re-registering is a no-op
    pub fn add_unit(&mut self, unit: UnitId) {
        if !self.units.contains(&unit) {
            self.units.push(unit);
        }
    }

    /// Record that `dependent` waits for `prerequisite`
    pub fn add_dependency(
        &mut self,
        dependent: &UnitId,
        prerequisite: &UnitId,
    ) -> Result<(), DependencyError> {
        for unit in [dependent, prerequisite] {
            if !self.units.contains(unit) {
                return Err(DependencyError::UnknownUnit(unit.clone()));
            }
        }
        if dependent == prerequisite {
            return Err(DependencyError::SelfDependency(dependent.clone()));
        }

        let edge = Dependency {
            dependent: dependent.clone(),
            prerequisite: prerequisite.clone(),
        };
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
        Ok(())
    }

    pub fn units(&self) -> &[UnitId] {
        &self.units
    }

    pub fn edges(&self) -> &[Dependency] {
        &self.edges
    }

    /// Units that `unit` waits for, in declaration order
    pub fn prerequisites_of(&self, unit: &UnitId) -> Vec<&UnitId> {
        self.edges
            .iter()
            .filter(|e| &e.dependent == unit)
            .map(|e| &e.prerequisite)
            .collect()
    }

    /// True when `dependent` waits for `prerequisite`, directly or transitively
    pub fn depends_on(&self, dependent: &UnitId, prerequisite: &UnitId) -> bool {
        let mut stack = vec![dependent];
        let mut seen = Vec::new();
        while let Some(unit) = stack.pop() {
            for next in self.prerequisites_of(unit) {
                if next == prerequisite {
                    return true;
                }
                if !seen.contains(&next) {
                    seen.push(next);
                    stack.push(next);
                }
            }
        }
        false
    }

    /// Every unit, prerequisites first
    pub fn topological_order(&self) -> Result<Vec<UnitId>, DependencyError> {
        let mut result = Vec::with_capacity(self.units.len());
        let mut marks = BTreeMap::new();

        for unit in &self.units {
            self.visit(unit, &mut marks, &mut result)?;
        }

        Ok(result)
    }

    fn visit<'a>(
        &'a self,
        unit: &'a UnitId,
        marks: &mut BTreeMap<&'a UnitId, Mark>,
        result: &mut Vec<UnitId>,
    ) -> Result<(), DependencyError> {
        match marks.get(unit) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => return Err(DependencyError::Cycle(unit.clone())),
            None => {}
        }

        marks.insert(unit, Mark::InProgress);
        for prerequisite in self.prerequisites_of(unit) {
            self.visit(prerequisite, marks, result)?;
        }
        marks.insert(unit, Mark::Done);
        result.push(unit.clone());

        Ok(())
    }
}
