//! Named build-plan contributors
//!
//! Each contributor is declarative data with an explicit input; executing a
//! step is the engine's concern. The resolver composes the list, it never
//! constructs anything side-effecting.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One named step the engine runs around the main transform loop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum PlanStep {
    /// Inject the rendered variable-set literal as build-time constants
    InjectVariables { literal: String },
    /// Render the HTML shell from the given template
    EmitHtml { template: PathBuf },
    /// Fold emitted files into the post-build manifest
    EmitManifest {
        file_name: String,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        seed: BTreeMap<String, String>,
    },
    /// Run the type/lint checker over the given sources
    CheckTypes { include: String },
}

impl PlanStep {
    /// Stable step name for logs and plan dumps
    pub fn name(&self) -> &'static str {
        match self {
            PlanStep::InjectVariables { .. } => "inject-variables",
            PlanStep::EmitHtml { .. } => "emit-html",
            PlanStep::EmitManifest { .. } => "emit-manifest",
            PlanStep::CheckTypes { .. } => "check-types",
        }
    }
}
