//! Analyzer configuration.
//!
//! Options are plain serde data (camelCase JSON), typically loaded from
//! `opcheck.json`:
//!
//! ```json
//! {
//!   "executionMode": "sequential",
//!   "generatedCode": "skip",
//!   "rules": { "CA2011": { "severity": "error" } }
//! }
//! ```

use std::sync::Arc;

use opcheck_common::{DiagnosticDescriptor, Severity};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::GeneratedCodeAnalysis;
use crate::driver::ExecutionMode;
use crate::rules::Rule;

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid analyzer options: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown rule id '{0}' in analyzer options")]
    UnknownRule(String),
}

/// Per-rule overrides keyed by rule id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleSetting {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnalyzerOptions {
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    /// Overrides the generated-code policy declared by every rule.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_code: Option<GeneratedCodeAnalysis>,
    #[serde(default)]
    pub rules: FxHashMap<String, RuleSetting>,
}

impl AnalyzerOptions {
    pub fn from_json(text: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn rule(&self, id: &str) -> Option<&RuleSetting> {
        self.rules.get(id)
    }

    /// Whether `descriptor` is enabled after applying overrides.
    pub fn is_enabled(&self, descriptor: &DiagnosticDescriptor) -> bool {
        self.rule(descriptor.id)
            .and_then(|setting| setting.enabled)
            .unwrap_or(descriptor.is_enabled_by_default)
    }

    pub fn severity_override(&self, id: &str) -> Option<Severity> {
        self.rule(id).and_then(|setting| setting.severity)
    }

    /// Reject settings for rule ids that none of `rules` declares.
    pub fn check_rule_ids(&self, rules: &[Arc<dyn Rule>]) -> Result<(), OptionsError> {
        let mut configured: Vec<&String> = self.rules.keys().collect();
        configured.sort();
        for id in configured {
            let known = rules
                .iter()
                .flat_map(|rule| rule.descriptors())
                .any(|descriptor| descriptor.id == id.as_str());
            if !known {
                return Err(OptionsError::UnknownRule(id.clone()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../tests/options_tests.rs"]
mod tests;
