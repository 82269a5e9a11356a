//! Error and warning types for packplan-core

use thiserror::Error;

/// Fatal configuration errors
///
/// Any of these aborts resolution before build work starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown build mode '{0}' (expected 'development' or 'production')")]
    UnknownMode(String),

    #[error("rule '{rule}' in group '{group}' declares no transformer chain")]
    EmptyTransformerChain { group: String, rule: String },

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule group '{0}' declares no rules")]
    EmptyRuleGroup(String),

    #[error("duplicate rule group id '{0}'")]
    DuplicateGroup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Non-fatal diagnostics surfaced to the caller
///
/// Resolution continues best-effort after any of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    /// Two rules in a non-exclusive group share a predicate; the chains would
    /// double-apply to the same input. Usually a copy-paste defect in the
    /// rule table.
    #[error("group '{group}' contains duplicate predicate '{predicate}'; chains would apply twice")]
    DuplicatePredicate { group: String, predicate: String },

    /// A file matched no predicate and no catch-all is declared; the file is
    /// passed through unmodified.
    #[error("no rule matches '{path}'; file passes through unmodified")]
    UnmatchedFile { path: String },

    /// Two emitted files share a logical name but disagree on role. Last
    /// write wins in the manifest, but this usually indicates a rule-table
    /// bug.
    #[error("emitted file '{name}' recorded as both {first_role} and {last_role}")]
    RoleConflict {
        name: String,
        first_role: String,
        last_role: String,
    },
}
