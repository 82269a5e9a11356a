//! Diagnostic reporting filter
//!
//! Pass-through configuration deciding which build diagnostics reach the
//! caller. Nothing here is computed from the mode; the resolver embeds the
//! filter into the plan as-is.

use crate::rules::Pattern;
use serde::{Deserialize, Serialize};

/// Section toggles plus suppression patterns for build reports
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportFilter {
    pub built_at: bool,
    pub children: bool,
    pub entrypoints: bool,
    pub hash: bool,
    pub modules: bool,
    pub version: bool,
    pub public_path: bool,
    /// Assets matching any of these patterns are dropped from reports
    pub exclude_assets: Vec<Pattern>,
    /// Warnings matching any of these patterns are suppressed
    pub suppress_warnings: Vec<Pattern>,
}

impl Default for ReportFilter {
    fn default() -> Self {
        Self {
            built_at: false,
            children: false,
            entrypoints: false,
            hash: false,
            modules: false,
            version: false,
            public_path: true,
            exclude_assets: Vec::new(),
            suppress_warnings: Vec::new(),
        }
    }
}

impl ReportFilter {
    /// Should this asset path be omitted from the report?
    pub fn excludes_asset(&self, path: &str) -> bool {
        self.exclude_assets.iter().any(|p| p.is_match(path))
    }

    /// Should this warning message be suppressed?
    pub fn suppresses(&self, message: &str) -> bool {
        self.suppress_warnings.iter().any(|p| p.is_match(message))
    }
}
