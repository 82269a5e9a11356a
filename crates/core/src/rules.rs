//! Rule routing: match predicates to ordered transformer chains

use crate::error::{ConfigError, Warning};
use crate::mode::BuildMode;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use tracing::warn;

/// A compiled path pattern
///
/// Keeps the source string next to the compiled regex so rule tables stay
/// comparable and serializable; equality is over the source.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: regex::Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, ConfigError> {
        let regex = regex::Regex::new(source).map_err(|e| ConfigError::InvalidPattern {
            pattern: source.to_string(),
            source: e,
        })?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for Pattern {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Pattern::new(&source).map_err(D::Error::custom)
    }
}

/// What a rule matches an input file on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPredicate {
    /// File-extension membership, compared case-insensitively, no dot
    Extensions(Vec<String>),
    /// Regex over the full path
    Pattern(Pattern),
    /// Matches any file whose extension is not excluded; the
    /// lowest-priority fallback when declared last in a group
    CatchAll { exclude: Vec<String> },
}

impl MatchPredicate {
    fn matches(&self, path: &Path) -> bool {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match self {
            MatchPredicate::Extensions(exts) => match ext {
                Some(ext) => exts.iter().any(|e| e.eq_ignore_ascii_case(&ext)),
                None => false,
            },
            MatchPredicate::Pattern(pattern) => pattern.is_match(&path.to_string_lossy()),
            MatchPredicate::CatchAll { exclude } => match ext {
                Some(ext) => !exclude.iter().any(|e| e.eq_ignore_ascii_case(&ext)),
                None => true,
            },
        }
    }
}

impl fmt::Display for MatchPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchPredicate::Extensions(exts) => write!(f, "ext:{}", exts.join("|")),
            MatchPredicate::Pattern(pattern) => write!(f, "pattern:{}", pattern),
            MatchPredicate::CatchAll { exclude } => {
                write!(f, "catch-all(!{})", exclude.join("|"))
            }
        }
    }
}

/// An ordered list of named transformers applied to one input file
///
/// Transformers are declared left-to-right, but the engine applies the
/// *last* listed transformer to the raw file first and threads its output
/// backward through the list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformerChain(pub Vec<String>);

impl TransformerChain {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Transformers in declaration order
    pub fn as_declared(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Transformers in the order the engine must invoke them: last declared
    /// runs first, each output feeding the transformer to its left
    pub fn application_order(&self) -> impl Iterator<Item = &str> {
        self.0.iter().rev().map(String::as_str)
    }
}

/// A per-mode value pair, the explicit lookup that replaces mode-gated
/// conditionals in rule options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeKeyed<T> {
    pub development: T,
    pub production: T,
}

impl<T: Copy> ModeKeyed<T> {
    pub fn for_mode(&self, mode: BuildMode) -> T {
        match mode {
            BuildMode::Development => self.development,
            BuildMode::Production => self.production,
        }
    }
}

/// Declarative options handed to a rule's transformer chain
///
/// The resolver never interprets these; they ride along in the plan for the
/// engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RuleOptions {
    /// Files up to this many bytes are inlined instead of emitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_limit: Option<u64>,
    /// Output-name template for files the chain emits
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
    /// Whether the transpiler skips full type checking, keyed by mode
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transpile_only: Option<ModeKeyed<bool>>,
}

impl RuleOptions {
    pub fn is_empty(&self) -> bool {
        self.inline_limit.is_none() && self.output_name.is_none() && self.transpile_only.is_none()
    }
}

/// One predicate → transformer-chain binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRule {
    pub name: String,
    pub predicate: MatchPredicate,
    /// Paths matching this pattern never match the rule
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Pattern>,
    pub transformers: TransformerChain,
    #[serde(default, skip_serializing_if = "RuleOptions::is_empty")]
    pub options: RuleOptions,
}

impl MatchRule {
    fn matches(&self, path: &Path) -> bool {
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(&path.to_string_lossy()) {
                return false;
            }
        }
        self.predicate.matches(path)
    }
}

/// A named set of rules sharing one exclusivity policy
///
/// Declaration order within a group is significant and preserved exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleGroup {
    pub id: String,
    /// First match wins when set; otherwise every matching rule applies
    pub exclusive: bool,
    pub rules: Vec<MatchRule>,
}

/// The routing decision for one input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    /// Chains to run, in declaration order
    Matched(Vec<&'a TransformerChain>),
    /// No predicate and no catch-all applied; the file passes through
    /// unmodified
    Passthrough,
}

/// The ordered rule groups an input file is routed through
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RulePipeline {
    pub groups: Vec<RuleGroup>,
}

impl RulePipeline {
    pub fn new(groups: Vec<RuleGroup>) -> Self {
        Self { groups }
    }

    /// Validate the rule table before any routing happens
    ///
    /// Malformed declarations (a rule with no transformer chain, an empty
    /// group, a reused group id) are fatal. A duplicate predicate inside a
    /// non-exclusive group is flagged as a lint warning: the chains would
    /// silently double-apply, which usually means a stale copy of the table
    /// was left behind.
    pub fn validate(&self) -> Result<Vec<Warning>, ConfigError> {
        let mut warnings = Vec::new();
        let mut seen_ids: Vec<&str> = Vec::new();

        for group in &self.groups {
            if seen_ids.contains(&group.id.as_str()) {
                return Err(ConfigError::DuplicateGroup(group.id.clone()));
            }
            seen_ids.push(&group.id);

            if group.rules.is_empty() {
                return Err(ConfigError::EmptyRuleGroup(group.id.clone()));
            }

            for (i, rule) in group.rules.iter().enumerate() {
                if rule.transformers.is_empty() {
                    return Err(ConfigError::EmptyTransformerChain {
                        group: group.id.clone(),
                        rule: rule.name.clone(),
                    });
                }

                if !group.exclusive {
                    let duplicated = group.rules[..i]
                        .iter()
                        .any(|earlier| earlier.predicate == rule.predicate);
                    if duplicated {
                        let warning = Warning::DuplicatePredicate {
                            group: group.id.clone(),
                            predicate: rule.predicate.to_string(),
                        };
                        warn!("{}", warning);
                        warnings.push(warning);
                    }
                }
            }
        }

        Ok(warnings)
    }

    /// Route one input file to its transformer chains
    ///
    /// Groups are scanned in declaration order; the first group containing
    /// any matching rule handles the file. Within an exclusive group the
    /// first matching rule wins; within a non-exclusive group every matching
    /// rule's chain applies, in declaration order.
    ///
    /// A file matching nothing passes through unmodified; the accompanying
    /// warning is both logged and returned so callers without a tracing
    /// subscriber still see it.
    pub fn route(&self, path: &Path) -> (Route<'_>, Option<Warning>) {
        for group in &self.groups {
            let mut chains: Vec<&TransformerChain> = Vec::new();
            for rule in &group.rules {
                if rule.matches(path) {
                    chains.push(&rule.transformers);
                    if group.exclusive {
                        break;
                    }
                }
            }
            if !chains.is_empty() {
                return (Route::Matched(chains), None);
            }
        }

        let warning = Warning::UnmatchedFile {
            path: path.display().to_string(),
        };
        warn!("{}", warning);
        (Route::Passthrough, Some(warning))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn rule(name: &str, predicate: MatchPredicate, chain: &[&str]) -> MatchRule {
        MatchRule {
            name: name.to_string(),
            predicate,
            exclude: None,
            transformers: TransformerChain(chain.iter().map(|s| s.to_string()).collect()),
            options: RuleOptions::default(),
        }
    }

    fn image_rule() -> MatchRule {
        rule(
            "images",
            MatchPredicate::Extensions(vec![
                "bmp".into(),
                "gif".into(),
                "jpg".into(),
                "jpeg".into(),
                "png".into(),
            ]),
            &["inline-asset"],
        )
    }

    fn catch_all_rule() -> MatchRule {
        rule(
            "assets",
            MatchPredicate::CatchAll {
                exclude: vec!["js".into(), "ts".into(), "html".into(), "json".into()],
            },
            &["copy"],
        )
    }

    fn exclusive_group() -> RuleGroup {
        RuleGroup {
            id: "main".to_string(),
            exclusive: true,
            rules: vec![image_rule(), catch_all_rule()],
        }
    }

    #[test]
    fn test_exclusive_group_first_match_wins() {
        let pipeline = RulePipeline::new(vec![exclusive_group()]);

        // logo.png matches both the image rule and the catch-all; only the
        // first match may apply.
        match pipeline.route(&PathBuf::from("src/logo.png")).0 {
            Route::Matched(chains) => {
                assert_eq!(chains.len(), 1);
                assert_eq!(chains[0].0, vec!["inline-asset"]);
            }
            Route::Passthrough => panic!("expected a match"),
        }
    }

    #[test]
    fn test_catch_all_handles_unknown_extension() {
        let pipeline = RulePipeline::new(vec![exclusive_group()]);

        match pipeline.route(&PathBuf::from("src/app.data")).0 {
            Route::Matched(chains) => {
                assert_eq!(chains.len(), 1);
                assert_eq!(chains[0].0, vec!["copy"]);
            }
            Route::Passthrough => panic!("expected catch-all"),
        }
    }

    #[test]
    fn test_catch_all_exclusions_fall_through() {
        let pipeline = RulePipeline::new(vec![exclusive_group()]);

        // html is excluded from the catch-all and matches nothing else.
        let (route, warning) = pipeline.route(&PathBuf::from("public/index.html"));
        assert_eq!(route, Route::Passthrough);
        assert!(matches!(
            warning,
            Some(Warning::UnmatchedFile { ref path }) if path == "public/index.html"
        ));
    }

    #[test]
    fn test_matched_route_carries_no_warning() {
        let pipeline = RulePipeline::new(vec![exclusive_group()]);

        let (route, warning) = pipeline.route(&PathBuf::from("src/logo.png"));
        assert!(matches!(route, Route::Matched(_)));
        assert!(warning.is_none());
    }

    #[test]
    fn test_non_exclusive_group_applies_all_matches_in_order() {
        let group = RuleGroup {
            id: "styles".to_string(),
            exclusive: false,
            rules: vec![
                rule(
                    "css",
                    MatchPredicate::Extensions(vec!["css".into()]),
                    &["style"],
                ),
                rule(
                    "all-text",
                    MatchPredicate::Pattern(Pattern::new(r"\.(css|txt)$").unwrap()),
                    &["minify"],
                ),
            ],
        };
        let pipeline = RulePipeline::new(vec![group]);

        match pipeline.route(&PathBuf::from("src/app.css")).0 {
            Route::Matched(chains) => {
                assert_eq!(chains.len(), 2);
                assert_eq!(chains[0].0, vec!["style"]);
                assert_eq!(chains[1].0, vec!["minify"]);
            }
            Route::Passthrough => panic!("expected two matches"),
        }
    }

    #[test]
    fn test_first_matching_group_handles_the_file() {
        let first = RuleGroup {
            id: "scripts".to_string(),
            exclusive: true,
            rules: vec![rule(
                "ts",
                MatchPredicate::Extensions(vec!["ts".into()]),
                &["typescript"],
            )],
        };
        let second = RuleGroup {
            id: "fallback".to_string(),
            exclusive: true,
            rules: vec![catch_all_rule()],
        };
        let pipeline = RulePipeline::new(vec![first, second]);

        // .ts is handled by the first group; .data falls to the second.
        match pipeline.route(&PathBuf::from("src/index.ts")).0 {
            Route::Matched(chains) => assert_eq!(chains[0].0, vec!["typescript"]),
            Route::Passthrough => panic!("expected first group"),
        }
        match pipeline.route(&PathBuf::from("src/app.data")).0 {
            Route::Matched(chains) => assert_eq!(chains[0].0, vec!["copy"]),
            Route::Passthrough => panic!("expected second group"),
        }
    }

    #[test]
    fn test_exclude_pattern_blocks_match() {
        let mut ts = rule(
            "ts",
            MatchPredicate::Extensions(vec!["ts".into(), "tsx".into()]),
            &["transpile-cache", "typescript"],
        );
        ts.exclude = Some(Pattern::new("node_modules").unwrap());
        let pipeline = RulePipeline::new(vec![RuleGroup {
            id: "main".to_string(),
            exclusive: true,
            rules: vec![ts],
        }]);

        assert!(matches!(
            pipeline.route(&PathBuf::from("src/index.tsx")).0,
            Route::Matched(_)
        ));
        assert_eq!(
            pipeline.route(&PathBuf::from("node_modules/lib/index.ts")).0,
            Route::Passthrough
        );
    }

    #[test]
    fn test_application_order_is_reversed_declaration_order() {
        let chain = TransformerChain(vec!["transpile-cache".into(), "typescript".into()]);

        let declared: Vec<&str> = chain.as_declared().collect();
        let applied: Vec<&str> = chain.application_order().collect();

        assert_eq!(declared, vec!["transpile-cache", "typescript"]);
        // The raw file hits the last declared transformer first.
        assert_eq!(applied, vec!["typescript", "transpile-cache"]);
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let pipeline = RulePipeline::new(vec![exclusive_group()]);
        assert!(matches!(
            pipeline.route(&PathBuf::from("src/LOGO.PNG")).0,
            Route::Matched(_)
        ));
    }

    #[test]
    fn test_mode_keyed_lookup() {
        let transpile_only = ModeKeyed {
            development: true,
            production: false,
        };

        assert!(transpile_only.for_mode(BuildMode::Development));
        assert!(!transpile_only.for_mode(BuildMode::Production));
    }

    #[test]
    fn test_validate_rejects_empty_chain() {
        let pipeline = RulePipeline::new(vec![RuleGroup {
            id: "main".to_string(),
            exclusive: true,
            rules: vec![rule(
                "broken",
                MatchPredicate::Extensions(vec!["css".into()]),
                &[],
            )],
        }]);

        let err = pipeline.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::EmptyTransformerChain { ref group, ref rule }
                if group == "main" && rule == "broken"
        ));
    }

    #[test]
    fn test_validate_rejects_empty_group_and_duplicate_id() {
        let empty = RulePipeline::new(vec![RuleGroup {
            id: "main".to_string(),
            exclusive: true,
            rules: vec![],
        }]);
        assert!(matches!(
            empty.validate().unwrap_err(),
            ConfigError::EmptyRuleGroup(_)
        ));

        let duplicated = RulePipeline::new(vec![exclusive_group(), exclusive_group()]);
        assert!(matches!(
            duplicated.validate().unwrap_err(),
            ConfigError::DuplicateGroup(_)
        ));
    }

    #[test]
    fn test_validate_flags_duplicate_predicate_in_non_exclusive_group() {
        let pipeline = RulePipeline::new(vec![RuleGroup {
            id: "styles".to_string(),
            exclusive: false,
            rules: vec![
                rule(
                    "css",
                    MatchPredicate::Extensions(vec!["css".into()]),
                    &["style"],
                ),
                rule(
                    "css-again",
                    MatchPredicate::Extensions(vec!["css".into()]),
                    &["style"],
                ),
            ],
        }]);

        let warnings = pipeline.validate().unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            warnings[0],
            Warning::DuplicatePredicate { ref group, .. } if group == "styles"
        ));
    }

    #[test]
    fn test_duplicate_predicate_in_exclusive_group_is_not_flagged() {
        // First-match-wins makes the duplicate unreachable but harmless.
        let pipeline = RulePipeline::new(vec![RuleGroup {
            id: "main".to_string(),
            exclusive: true,
            rules: vec![image_rule(), image_rule()],
        }]);

        assert!(pipeline.validate().unwrap().is_empty());
    }
}
