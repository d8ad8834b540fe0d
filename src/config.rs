// ⚙️ League Configuration
// Roster size and keeper rule table, optionally loaded from league.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::classifier::RuleTable;

pub const DEFAULT_ROSTER_SIZE: usize = 16;

/// File looked up under the data root when no config path is given
pub const CONFIG_FILE: &str = "league.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    /// Players every manager must carry on the evaluated roster
    pub roster_size: usize,

    pub rules: RuleTable,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        LeagueConfig {
            roster_size: DEFAULT_ROSTER_SIZE,
            rules: RuleTable::default(),
        }
    }
}

impl LeagueConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read league config: {:?}", path.as_ref()))?;

        let config: LeagueConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse league config: {:?}", path.as_ref()))?;
        config
            .rules
            .validate()
            .with_context(|| format!("Invalid league config: {:?}", path.as_ref()))?;

        Ok(config)
    }

    /// Explicit path if given, else `<data>/league.json` if present, else defaults.
    pub fn resolve(explicit: Option<&Path>, data_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let fallback = data_root.join(CONFIG_FILE);
        if fallback.exists() {
            Self::from_file(fallback)
        } else {
            Ok(Self::default())
        }
    }
}
