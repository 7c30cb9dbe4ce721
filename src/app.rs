// Copyright (c) 2025 - Cowboy AI, Inc.
//! Deployment Description
//!
//! An [`App`] holds the declared units and the explicit dependency edges
//! between them. [`App::synthesize`] is the only operation: it orders the
//! units, reduces each to intents, applies derived fields, renders templates
//! and checks deployment-wide invariants.
//!
//! ```text
//! units + edges ──> topological order ──> intents ──> default tags ──> templates
//!                                                                        │
//!                                   role names / imports checked <───────┘
//! ```

use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::assembly::{
    AssemblyManifest, CloudAssembly, Environment, IntentSummary, UnitManifest, ASSEMBLY_VERSION,
};
use crate::domain::invariants::validate_unique_role_names;
use crate::domain::{UnitId, ValidationError};
use crate::errors::DeploymentResult;
use crate::expand::{apply_default_tags, default_tags};
use crate::graph::{Dependency, DependencyError, DependencyGraph};
use crate::intent::ResourceIntent;
use crate::template::render_unit;
use crate::units::UnitDefinition;

/// A complete deployment description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    name: String,
    environment: Environment,
    units: Vec<UnitDefinition>,
    graph: DependencyGraph,
}

impl App {
    /// Assemble an app from its units and explicit dependency edges.
    ///
    /// Unit ids must be unique and every edge must name declared units.
    pub fn new(
        name: impl Into<String>,
        environment: Environment,
        units: Vec<UnitDefinition>,
        dependencies: Vec<Dependency>,
    ) -> DeploymentResult<Self> {
        let mut graph = DependencyGraph::new();
        for unit in &units {
            if graph.units().contains(unit.id()) {
                return Err(ValidationError::DuplicateUnit(unit.id().to_string()).into());
            }
            graph.add_unit(unit.id().clone());
        }
        for edge in &dependencies {
            graph.add_dependency(&edge.dependent, &edge.prerequisite)?;
        }

        Ok(Self {
            name: name.into(),
            environment,
            units,
            graph,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn units(&self) -> &[UnitDefinition] {
        &self.units
    }

    pub fn unit(&self, id: &UnitId) -> Option<&UnitDefinition> {
        self.units.iter().find(|u| u.id() == id)
    }

    /// Record that `dependent` is materialized after `prerequisite`
    pub fn add_dependency(
        &mut self,
        dependent: &UnitId,
        prerequisite: &UnitId,
    ) -> DeploymentResult<()> {
        self.graph.add_dependency(dependent, prerequisite)?;
        Ok(())
    }

    pub fn dependencies(&self) -> &[Dependency] {
        self.graph.edges()
    }

    /// Units in materialization order
    pub fn materialization_order(&self) -> DeploymentResult<Vec<UnitId>> {
        Ok(self.graph.topological_order()?)
    }

    /// Every cross-unit reference must be backed by a declared edge
    fn check_references(&self) -> DeploymentResult<()> {
        for unit in &self.units {
            for referenced in unit.referenced_units() {
                if self.unit(referenced).is_none() {
                    return Err(DependencyError::UnknownUnit(referenced.clone()).into());
                }
                if !self.graph.depends_on(unit.id(), referenced) {
                    return Err(ValidationError::MissingDependency {
                        dependent: unit.id().to_string(),
                        prerequisite: referenced.to_string(),
                    }
                    .into());
                }
            }
        }
        Ok(())
    }

    /// Produce the static deployment description
    pub fn synthesize(&self) -> DeploymentResult<CloudAssembly> {
        let order = self.materialization_order()?;
        self.check_references()?;

        info!(
            deployment = %self.name,
            environment = %self.environment,
            units = order.len(),
            "Synthesizing deployment"
        );

        let mut manifests = Vec::with_capacity(order.len());
        let mut templates = BTreeMap::new();
        let mut intents_by_unit = BTreeMap::new();
        // Exports visible to each unit, keyed by the unit that produced them
        let mut exports: BTreeMap<UnitId, BTreeSet<String>> = BTreeMap::new();

        for id in &order {
            let Some(unit) = self.unit(id) else {
                return Err(DependencyError::UnknownUnit(id.clone()).into());
            };

            let intents = apply_default_tags(unit.intents()?, &default_tags(&self.name, id));
            let description = format!("{} {} unit ({})", self.name, unit.kind(), id);
            let rendered = render_unit(id, &description, &intents)?;

            for import in &rendered.imports {
                let resolved = exports.iter().any(|(producer, names)| {
                    names.contains(import) && self.graph.depends_on(id, producer)
                });
                if !resolved {
                    return Err(ValidationError::UnresolvedImport {
                        unit: id.to_string(),
                        export: import.clone(),
                    }
                    .into());
                }
            }

            debug!(
                unit = %id,
                intents = intents.len(),
                exports = rendered.exports.len(),
                imports = rendered.imports.len(),
                "Rendered unit"
            );

            manifests.push(UnitManifest {
                id: id.clone(),
                kind: unit.kind().to_string(),
                template_file: id.template_file(),
                dependencies: self.graph.prerequisites_of(id).into_iter().cloned().collect(),
                intents: intents
                    .iter()
                    .map(|i| IntentSummary {
                        kind: i.kind().to_string(),
                        logical_id: i.logical_id().to_string(),
                    })
                    .collect(),
                assets: rendered.assets,
                exports: rendered.exports.clone(),
                imports: rendered.imports,
                unresolved_references: rendered.unresolved,
            });
            exports.insert(id.clone(), rendered.exports);
            templates.insert(id.clone(), rendered.body);
            intents_by_unit.insert(id.clone(), intents);
        }

        validate_unique_role_names(
            intents_by_unit
                .values()
                .flatten()
                .filter_map(ResourceIntent::as_role),
        )?;

        info!(
            deployment = %self.name,
            order = ?order.iter().map(UnitId::as_str).collect::<Vec<_>>(),
            "Synthesis complete"
        );

        Ok(CloudAssembly {
            manifest: AssemblyManifest {
                version: ASSEMBLY_VERSION.to_string(),
                deployment: self.name.clone(),
                environment: self.environment.to_string(),
                units: manifests,
            },
            templates,
            intents: intents_by_unit,
        })
    }
}
