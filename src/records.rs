// 📋 Source Records - Normalized per-season league data
// Roster, draft and drop entries keyed by a stable player identity

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::KeeperError;

/// Oldest season we accept. Guards against `year - 3` underflowing.
pub const MIN_SEASON: u16 = 1900;

/// Number of prior seasons that feed a keeper decision.
pub const HISTORY_DEPTH: usize = 3;

// ============================================================================
// PLAYER IDENTITY
// ============================================================================

/// What kind of roster slot an identity refers to.
///
/// Team defenses are exempt from the three-year keeper lock, so the kind is
/// decided once at ingestion and carried explicitly from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PlayerKind {
    Individual,
    TeamDefense,
}

impl PlayerKind {
    /// Assign a kind from the raw source fields.
    ///
    /// League exports mark defenses with position `DEF`, and team units use
    /// identifiers of the form `nfl.t.teams.<n>`.
    pub fn from_source(playerid: &str, position: &str) -> Self {
        let position = position.trim();
        if position.eq_ignore_ascii_case("DEF")
            || position.eq_ignore_ascii_case("DST")
            || playerid.contains("teams")
        {
            PlayerKind::TeamDefense
        } else {
            PlayerKind::Individual
        }
    }

    pub fn is_defense(&self) -> bool {
        matches!(self, PlayerKind::TeamDefense)
    }
}

/// Stable player identifier, identical across every season's records.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        PlayerId(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        PlayerId::new(id)
    }
}

// ============================================================================
// SEASONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Season(u16);

impl Season {
    pub fn new(year: u16) -> Result<Self, KeeperError> {
        if year < MIN_SEASON {
            return Err(KeeperError::InvalidSeason { year });
        }
        Ok(Season(year))
    }

    pub fn year(&self) -> u16 {
        self.0
    }

    /// Two-digit label used in column headers and markers ("23" for 2023).
    pub fn short(&self) -> String {
        format!("{:02}", self.0 % 100)
    }

    /// The season `n` years before this one. Callers check the range first.
    fn back(&self, n: u16) -> Season {
        Season(self.0 - n)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three seasons before the target year, most recent first.
///
/// Index 0 is "season 1" (the year whose draft sets the prior round).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorSeasons {
    pub target: Season,
    seasons: [Season; HISTORY_DEPTH],
}

impl PriorSeasons {
    pub fn for_target(target: Season) -> Result<Self, KeeperError> {
        let year = target.year();
        if year < MIN_SEASON + HISTORY_DEPTH as u16 {
            return Err(KeeperError::InvalidSeason { year });
        }
        Ok(PriorSeasons {
            target,
            seasons: [target.back(1), target.back(2), target.back(3)],
        })
    }

    /// The most recent completed season; its roster is the one evaluated.
    pub fn latest(&self) -> Season {
        self.seasons[0]
    }

    pub fn get(&self, index: usize) -> Season {
        self.seasons[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = Season> + '_ {
        self.seasons.iter().copied()
    }
}

// ============================================================================
// SOURCE ENTRIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Manager identifier as it appears in the league export (not the display name)
    pub manager: String,
    pub playerid: PlayerId,
    pub display_name: String,
    pub position: String,
    pub kind: PlayerKind,
}

impl RosterEntry {
    pub fn new(
        manager: impl Into<String>,
        playerid: impl Into<PlayerId>,
        display_name: impl Into<String>,
        position: impl Into<String>,
    ) -> Self {
        let playerid = playerid.into();
        let position = position.into();
        let kind = PlayerKind::from_source(playerid.as_str(), &position);
        RosterEntry {
            manager: manager.into(),
            playerid,
            display_name: display_name.into(),
            position,
            kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftEntry {
    pub round: u8,
    pub was_kept: bool,
    /// Overall pick number, kept for debugging the draft board
    pub pick: u16,
    pub manager: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropEntry {
    pub display_name: String,
}

/// One season's draft and drop records.
#[derive(Debug, Clone, Default)]
pub struct SeasonRecords {
    pub draft: HashMap<PlayerId, DraftEntry>,
    pub drops: HashMap<PlayerId, DropEntry>,
}

impl SeasonRecords {
    pub fn was_kept(&self, playerid: &PlayerId) -> bool {
        self.draft.get(playerid).map_or(false, |d| d.was_kept)
    }

    pub fn was_dropped(&self, playerid: &PlayerId) -> bool {
        self.drops.contains_key(playerid)
    }

    pub fn draft_round(&self, playerid: &PlayerId) -> Option<u8> {
        self.draft.get(playerid).map(|d| d.round)
    }
}

/// Draft and drop history aligned with `PriorSeasons`, most recent first.
#[derive(Debug, Clone)]
pub struct SeasonHistory {
    pub seasons: PriorSeasons,
    records: [SeasonRecords; HISTORY_DEPTH],
}

impl SeasonHistory {
    pub fn new(seasons: PriorSeasons, records: [SeasonRecords; HISTORY_DEPTH]) -> Self {
        SeasonHistory { seasons, records }
    }

    /// Records for season `index` (0 = most recent).
    pub fn records(&self, index: usize) -> &SeasonRecords {
        &self.records[index]
    }

    pub fn kept_flags(&self, playerid: &PlayerId) -> [bool; HISTORY_DEPTH] {
        [0, 1, 2].map(|i| self.records[i].was_kept(playerid))
    }

    pub fn dropped_flags(&self, playerid: &PlayerId) -> [bool; HISTORY_DEPTH] {
        [0, 1, 2].map(|i| self.records[i].was_dropped(playerid))
    }
}

/// Manager id → display name.
#[derive(Debug, Clone, Default)]
pub struct ManagerNames {
    names: HashMap<String, String>,
}

impl ManagerNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, manager: impl Into<String>, name: impl Into<String>) {
        self.names.insert(manager.into(), name.into());
    }

    pub fn get(&self, manager: &str) -> Option<&str> {
        self.names.get(manager).map(String::as_str)
    }

    /// (manager id, display name) pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.names.iter().map(|(id, name)| (id.as_str(), name.as_str()))
    }
}

impl FromIterator<(String, String)> for ManagerNames {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        ManagerNames {
            names: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
