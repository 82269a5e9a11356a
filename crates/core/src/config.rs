//! Static build declarations
//!
//! Everything here is fixed configuration supplied from outside the
//! resolver: project paths, the rule table, the reporting filter. The
//! defaults mirror a typical single-page-app setup; a `packplan.toml` file
//! overrides them.

use crate::env::VariableFilter;
use crate::error::ConfigError;
use crate::report::ReportFilter;
use crate::rules::{
    MatchPredicate, MatchRule, ModeKeyed, Pattern, RuleGroup, RuleOptions, RulePipeline,
    TransformerChain,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Fixed project paths consumed by the plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectPaths {
    /// Main entry file
    pub entry: PathBuf,
    /// Build output directory
    pub output_dir: PathBuf,
    /// Static content root served as-is
    pub public_dir: PathBuf,
    /// HTML shell template
    pub html_template: PathBuf,
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self {
            entry: PathBuf::from("src/index.tsx"),
            output_dir: PathBuf::from("build"),
            public_dir: PathBuf::from("public"),
            html_template: PathBuf::from("public/index.html"),
        }
    }
}

/// Pass-through settings for the development server
///
/// The server itself is a black-box consumer of the plan; these fields are
/// carried, never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DevServer {
    pub port: u16,
    pub open: bool,
    pub history_api_fallback: bool,
    /// Show build errors as a full-screen overlay in the browser
    pub overlay: bool,
    /// Verbosity preset for rebuild output
    pub stats: String,
}

impl Default for DevServer {
    fn default() -> Self {
        Self {
            port: 3000,
            open: true,
            history_api_fallback: true,
            overlay: true,
            stats: "errors-warnings".to_string(),
        }
    }
}

/// The full static declaration set the resolver consumes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub paths: ProjectPaths,
    /// Source-map feature flag; the CLI may clear it from the environment
    pub source_map: bool,
    pub env: VariableFilter,
    pub rules: Vec<RuleGroup>,
    /// Extensions tried, in order, when resolving an import without one
    pub resolve_extensions: Vec<String>,
    pub report: ReportFilter,
    pub dev_server: DevServer,
    /// File name of the post-build manifest artifact
    pub manifest_name: String,
    /// Entry group whose files become manifest entrypoints
    pub main_group: String,
    /// Source glob handed to the type/lint checker
    pub check_include: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            paths: ProjectPaths::default(),
            source_map: true,
            env: VariableFilter::default(),
            rules: default_rules(),
            resolve_extensions: vec!["tsx".to_string(), "ts".to_string(), "js".to_string()],
            report: default_report(),
            dev_server: DevServer::default(),
            manifest_name: "asset-manifest.json".to_string(),
            main_group: "main".to_string(),
            check_include: "src/**/*.{ts,tsx,js,jsx}".to_string(),
        }
    }
}

impl BuildConfig {
    /// Load declarations from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: BuildConfig = toml::from_str(&text)?;
        Ok(config)
    }

    /// The rule table as a routable pipeline
    pub fn pipeline(&self) -> RulePipeline {
        RulePipeline::new(self.rules.clone())
    }
}

/// Compile a default-table pattern literal
///
/// Invariant: only called from the default tables in this module; every
/// literal is exercised by `test_default_patterns_are_valid`, so the panic
/// path is unreachable for shipped defaults.
fn static_pattern(source: &str) -> Pattern {
    Pattern::new(source).expect("default pattern literal must compile")
}

/// The default rule table: one exclusive group routing images inline,
/// TypeScript through the cached transpiler, and everything else to the
/// copy transformer
fn default_rules() -> Vec<RuleGroup> {
    vec![RuleGroup {
        id: "app".to_string(),
        exclusive: true,
        rules: vec![
            MatchRule {
                name: "images".to_string(),
                predicate: MatchPredicate::Extensions(vec![
                    "bmp".to_string(),
                    "gif".to_string(),
                    "jpg".to_string(),
                    "jpeg".to_string(),
                    "png".to_string(),
                ]),
                exclude: None,
                transformers: TransformerChain(vec!["inline-asset".to_string()]),
                options: RuleOptions {
                    inline_limit: Some(10_000),
                    output_name: Some("static/media/[name].[hash:8].[ext]".to_string()),
                    transpile_only: None,
                },
            },
            MatchRule {
                name: "typescript".to_string(),
                predicate: MatchPredicate::Extensions(vec!["ts".to_string(), "tsx".to_string()]),
                exclude: Some(static_pattern("node_modules")),
                transformers: TransformerChain(vec![
                    "transpile-cache".to_string(),
                    "typescript".to_string(),
                ]),
                options: RuleOptions {
                    inline_limit: None,
                    output_name: None,
                    // Development trades type checking for rebuild speed;
                    // the separate check-types step still covers it.
                    transpile_only: Some(ModeKeyed {
                        development: true,
                        production: false,
                    }),
                },
            },
            MatchRule {
                name: "assets".to_string(),
                predicate: MatchPredicate::CatchAll {
                    exclude: vec![
                        "js".to_string(),
                        "mjs".to_string(),
                        "jsx".to_string(),
                        "ts".to_string(),
                        "tsx".to_string(),
                        "html".to_string(),
                        "json".to_string(),
                    ],
                },
                exclude: None,
                transformers: TransformerChain(vec!["copy".to_string()]),
                options: RuleOptions {
                    inline_limit: None,
                    output_name: Some("static/media/[name].[hash:8].[ext]".to_string()),
                    transpile_only: None,
                },
            },
        ],
    }]
}

fn default_report() -> ReportFilter {
    ReportFilter {
        exclude_assets: vec![
            static_pattern(r"\.(map|txt|html|jpg|png)$"),
            static_pattern(r"\.json$"),
        ],
        suppress_warnings: vec![static_pattern("exceed"), static_pattern("performance")],
        ..ReportFilter::default()
    }
}
