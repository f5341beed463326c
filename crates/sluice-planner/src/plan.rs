//! Plan documents as written by users.

use serde::{Deserialize, Serialize};
use sluice_core::config::EngineConfig;

use crate::error::PlanError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Plan {
    /// Replaces the environment-derived engine config when present.
    #[serde(default)]
    pub config: Option<EngineConfig>,
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlanStep {
    pub op: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

impl PlanStep {
    pub fn new(op: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            op: op.into(),
            args,
        }
    }
}

impl Plan {
    pub fn from_json(src: &str) -> Result<Self, PlanError> {
        serde_json::from_str(src).map_err(|e| PlanError::Invalid(e.to_string()))
    }

    pub fn from_yaml(src: &str) -> Result<Self, PlanError> {
        serde_yaml::from_str(src).map_err(|e| PlanError::Invalid(e.to_string()))
    }

    /// JSON when the document starts with `{`, YAML otherwise.
    pub fn parse(src: &str) -> Result<Self, PlanError> {
        if src.trim_start().starts_with('{') {
            Self::from_json(src)
        } else {
            Self::from_yaml(src)
        }
    }

    pub fn to_json(&self) -> Result<String, PlanError> {
        serde_json::to_string_pretty(self).map_err(|e| PlanError::Invalid(e.to_string()))
    }
}
