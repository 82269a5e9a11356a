//! Build plan resolution
//!
//! `resolve_plan` is the single entry point: given the mode, the caller's
//! variable map and the static declarations, it composes one immutable
//! [`BuildPlan`]. A pure function: no environment reads, no I/O, no
//! randomness. The execution engine consumes the plan; workers may share it
//! freely since nothing mutates after creation.

use crate::cache::CacheMode;
use crate::config::{BuildConfig, DevServer, ProjectPaths};
use crate::env::{render_define_literal, VariableSet};
use crate::error::{ConfigError, Warning};
use crate::mode::BuildMode;
use crate::output::OutputPolicy;
use crate::report::ReportFilter;
use crate::rules::RulePipeline;
use crate::steps::PlanStep;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// The resolved, immutable output of one resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub mode: BuildMode,
    /// Whitelisted variables plus the mode marker
    pub variables: VariableSet,
    /// Validated rule table, in declaration order
    pub rules: RulePipeline,
    /// Extensions tried, in order, for extensionless imports
    pub resolve_extensions: Vec<String>,
    pub output: OutputPolicy,
    pub cache: CacheMode,
    /// Named contributors the engine runs around the transform loop
    pub steps: Vec<PlanStep>,
    pub report: ReportFilter,
    pub paths: ProjectPaths,
    pub dev_server: DevServer,
}

/// Resolve one build plan
///
/// Fatal configuration errors (malformed rule declarations) abort before any
/// build work; lint warnings are returned alongside the plan and resolution
/// continues best-effort.
pub fn resolve_plan(
    mode: BuildMode,
    vars: &BTreeMap<String, String>,
    config: &BuildConfig,
) -> Result<(BuildPlan, Vec<Warning>), ConfigError> {
    let rules = config.pipeline();
    let warnings = rules.validate()?;

    let variables = config.env.filter(vars, mode);
    let output = OutputPolicy::resolve(mode, config.source_map);
    let cache = CacheMode::for_mode(mode);

    let steps = vec![
        PlanStep::InjectVariables {
            literal: render_define_literal(&variables),
        },
        PlanStep::EmitHtml {
            template: config.paths.html_template.clone(),
        },
        PlanStep::EmitManifest {
            file_name: config.manifest_name.clone(),
            seed: BTreeMap::new(),
        },
        PlanStep::CheckTypes {
            include: config.check_include.clone(),
        },
    ];

    debug!(%mode, ?cache, "resolved build plan");

    Ok((
        BuildPlan {
            mode,
            variables,
            rules,
            resolve_extensions: config.resolve_extensions.clone(),
            output,
            cache,
            steps,
            report: config.report.clone(),
            paths: config.paths.clone(),
            dev_server: config.dev_server.clone(),
        },
        warnings,
    ))
}
