//! packplan-core: environment-aware build-configuration resolution
//!
//! Given a build mode and the caller's variable map, this crate resolves one
//! immutable [`BuildPlan`]: injected constants, the ordered rule table,
//! output naming and source-map policy, cache strategy, and the named plan
//! steps. After a build completes, [`ManifestBuilder`] folds the emitted
//! files into the durable manifest artifact.

mod cache;
mod config;
mod env;
mod error;
mod hash;
mod manifest;
mod mode;
mod output;
mod plan;
mod report;
mod rules;
mod steps;

pub use cache::CacheMode;
pub use config::{BuildConfig, DevServer, ProjectPaths};
pub use env::{render_define_literal, VariableFilter, VariableSet};
pub use error::{ConfigError, Warning};
pub use manifest::{EmittedFile, FileRole, Manifest, ManifestBuilder};
pub use mode::BuildMode;
pub use output::{OutputNaming, OutputPolicy, SourceMapLevel};
pub use plan::{resolve_plan, BuildPlan};
pub use report::ReportFilter;
pub use rules::{
    MatchPredicate, MatchRule, ModeKeyed, Pattern, Route, RuleGroup, RuleOptions, RulePipeline,
    TransformerChain,
};
pub use steps::PlanStep;

/// Result type for resolver operations
pub type Result<T> = std::result::Result<T, ConfigError>;
