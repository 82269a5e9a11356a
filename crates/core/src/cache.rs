//! Build cache strategy selection

use crate::mode::BuildMode;
use serde::{Deserialize, Serialize};

/// Where transform results are cached between builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    /// Memory-resident, discarded at process exit
    Transient,
    /// Durable across process restarts
    Persistent,
}

impl CacheMode {
    /// Explicit mode → strategy table
    pub fn for_mode(mode: BuildMode) -> Self {
        match mode {
            BuildMode::Development => CacheMode::Transient,
            BuildMode::Production => CacheMode::Persistent,
        }
    }
}
