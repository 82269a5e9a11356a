//! Post-build manifest folding

use crate::error::Warning;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::warn;

/// Role classification of one emitted file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    /// A file belonging to an entrypoint bundle
    Entry,
    /// Any other build product
    Asset,
    /// An external source map
    Map,
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileRole::Entry => "entry",
            FileRole::Asset => "asset",
            FileRole::Map => "map",
        };
        f.write_str(s)
    }
}

/// One file produced by a completed build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmittedFile {
    /// Logical name, the manifest key
    pub name: String,
    /// Output path, the manifest value
    pub path: String,
    pub role: FileRole,
    /// Entry group this file belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

/// The durable post-build artifact: a flat name→path mapping plus the
/// ordered entrypoint list
///
/// Consumers depend on exactly this two-key shape; `entrypoints` never
/// contains a map-role path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Manifest {
    pub files: BTreeMap<String, String>,
    pub entrypoints: Vec<String>,
}

/// Folds emitted files into a [`Manifest`]
///
/// Runs once, after all emitted files for a build are known.
#[derive(Debug, Clone, Default)]
pub struct ManifestBuilder {
    seed: BTreeMap<String, String>,
    main_group: Option<String>,
}

impl ManifestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed mapping for incremental builds; emitted files override seed
    /// entries with the same logical name
    pub fn with_seed(mut self, seed: BTreeMap<String, String>) -> Self {
        self.seed = seed;
        self
    }

    /// Entry group whose files populate `entrypoints` (default `"main"`)
    pub fn with_main_group(mut self, group: impl Into<String>) -> Self {
        self.main_group = Some(group.into());
        self
    }

    /// Fold the emitted files into the final manifest
    ///
    /// Later entries override earlier ones with the same logical name; a
    /// name recorded under two different roles is surfaced as a warning
    /// since it usually indicates a rule-table bug.
    pub fn build(&self, emitted: &[EmittedFile]) -> (Manifest, Vec<Warning>) {
        let main_group = self.main_group.as_deref().unwrap_or("main");
        let mut warnings = Vec::new();

        let mut files = self.seed.clone();
        let mut roles: BTreeMap<&str, FileRole> = BTreeMap::new();

        for file in emitted {
            if let Some(&first_role) = roles.get(file.name.as_str()) {
                if first_role != file.role {
                    let warning = Warning::RoleConflict {
                        name: file.name.clone(),
                        first_role: first_role.to_string(),
                        last_role: file.role.to_string(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
            roles.insert(&file.name, file.role);
            files.insert(file.name.clone(), file.path.clone());
        }

        let entrypoints = emitted
            .iter()
            .filter(|f| f.role == FileRole::Entry)
            .filter(|f| f.group.as_deref() == Some(main_group))
            .map(|f| f.path.clone())
            .collect();

        (Manifest { files, entrypoints }, warnings)
    }
}
