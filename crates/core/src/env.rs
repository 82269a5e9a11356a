//! Whitelisting of process-wide variables for constant injection

use crate::mode::BuildMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The filtered name/value set injected as build-time constants
///
/// BTreeMap keeps iteration order deterministic, so identical inputs always
/// render an identical literal.
pub type VariableSet = BTreeMap<String, String>;

/// Extracts the whitelisted subset of process-wide variables
///
/// Only names starting with `prefix` (compared ASCII-case-insensitively) are
/// retained; the reserved `mode_key` entry is synthesized from the active
/// mode and wins any collision with a caller-supplied value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableFilter {
    pub prefix: String,
    pub mode_key: String,
}

impl Default for VariableFilter {
    fn default() -> Self {
        Self {
            prefix: "REACT_APP".to_string(),
            mode_key: "NODE_ENV".to_string(),
        }
    }
}

impl VariableFilter {
    /// Check a single name against the prefix whitelist
    pub fn matches(&self, name: &str) -> bool {
        // get() avoids panicking on a non-boundary slice of a non-ASCII key.
        name.get(..self.prefix.len())
            .map_or(false, |head| head.eq_ignore_ascii_case(&self.prefix))
    }

    /// Filter `vars` down to the whitelisted entries plus the mode marker
    ///
    /// An empty or absent input yields a set containing only the marker.
    pub fn filter(&self, vars: &BTreeMap<String, String>, mode: BuildMode) -> VariableSet {
        let mut result: VariableSet = vars
            .iter()
            .filter(|(name, _)| self.matches(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        // Inserted last: the synthetic entry overrides any supplied value
        // under the reserved key.
        result.insert(self.mode_key.clone(), mode.as_str().to_string());
        result
    }
}

/// Render a variable set as the JSON literal embedded into injected constants
pub fn render_define_literal(vars: &VariableSet) -> String {
    // BTreeMap serializes in key order; infallible for string maps.
    serde_json::to_string(vars).unwrap_or_else(|_| "{}".to_string())
}
