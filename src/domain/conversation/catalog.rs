//! Scenario catalog.
//!
//! An immutable table of scenarios per flow, injected into the batch runner.
//! The default catalog is compiled in from `data/scenarios.yaml`; a different
//! one can be loaded from any YAML file of the same shape.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use super::flow::FlowType;
use super::scenario::{CheckinScenario, CrisisScenario, ScenarioRef};

const BUILTIN_CATALOG: &str = include_str!("../../../data/scenarios.yaml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read scenario catalog {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse scenario catalog: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioCatalog {
    #[serde(default)]
    pub checkin: Vec<CheckinScenario>,
    #[serde(default)]
    pub crisis: Vec<CrisisScenario>,
}

impl ScenarioCatalog {
    pub fn new(checkin: Vec<CheckinScenario>, crisis: Vec<CrisisScenario>) -> Self {
        Self { checkin, crisis }
    }

    /// The catalog shipped with the generator (20 scenarios per flow).
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let yaml = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| CatalogError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Self::from_yaml_str(&yaml)
    }

    /// Number of scenarios for a flow.
    pub fn len(&self, flow: FlowType) -> usize {
        match flow {
            FlowType::Checkin => self.checkin.len(),
            FlowType::Crisis => self.crisis.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.checkin.is_empty() && self.crisis.is_empty()
    }

    pub fn get(&self, flow: FlowType, index: usize) -> Option<ScenarioRef<'_>> {
        match flow {
            FlowType::Checkin => self.checkin.get(index).map(ScenarioRef::Checkin),
            FlowType::Crisis => self.crisis.get(index).map(ScenarioRef::Crisis),
        }
    }

    /// Scenarios of a flow in catalog order.
    pub fn scenarios(&self, flow: FlowType) -> Vec<ScenarioRef<'_>> {
        match flow {
            FlowType::Checkin => self.checkin.iter().map(ScenarioRef::Checkin).collect(),
            FlowType::Crisis => self.crisis.iter().map(ScenarioRef::Crisis).collect(),
        }
    }
}
