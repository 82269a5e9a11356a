//! Output naming and source-map policy

use crate::hash;
use crate::mode::BuildMode;
use serde::{Deserialize, Serialize};

/// How much source-map detail a build emits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMapLevel {
    /// No map at all
    None,
    /// Abbreviated per-module map, fast to regenerate
    Cheap,
    /// Full external map
    Full,
}

/// How output files are named
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputNaming {
    /// Fixed name, overwritten on every rebuild
    Fixed { template: String },
    /// Content-addressed name; the hash token is replaced with a prefix of
    /// the SHA-256 of the file contents
    ContentHash { template: String, hash_len: usize },
}

/// Mode-dependent output settings, resolved once per build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputPolicy {
    pub naming: OutputNaming,
    pub source_map: SourceMapLevel,
}

impl OutputPolicy {
    /// Resolve the policy from the mode and the source-map feature flag
    pub fn resolve(mode: BuildMode, source_map_enabled: bool) -> Self {
        let naming = match mode {
            BuildMode::Development => OutputNaming::Fixed {
                template: "static/js/bundle.js".to_string(),
            },
            BuildMode::Production => OutputNaming::ContentHash {
                template: "static/js/[name].[contenthash:8].js".to_string(),
                hash_len: 8,
            },
        };

        let source_map = match (mode, source_map_enabled) {
            // Development always gets the cheap map, flag or not.
            (BuildMode::Development, _) => SourceMapLevel::Cheap,
            (BuildMode::Production, true) => SourceMapLevel::Full,
            (BuildMode::Production, false) => SourceMapLevel::None,
        };

        Self { naming, source_map }
    }

    /// Render the output file name for one chunk
    pub fn render_filename(&self, name: &str, content: &[u8]) -> String {
        match &self.naming {
            OutputNaming::Fixed { template } => template.replace("[name]", name),
            OutputNaming::ContentHash { template, hash_len } => {
                let full = hash::hash_bytes(content);
                let token = format!("[contenthash:{}]", hash_len);
                template
                    .replace("[name]", name)
                    .replace(&token, hash::short_hash(&full, *hash_len))
            }
        }
    }
}
