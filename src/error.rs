//! Fatal faults raised by the keeper engine.
//!
//! Every variant aborts the run. Messages carry the player, manager and
//! season needed to fix the upstream data before re-running.

use thiserror::Error;

/// Result alias for core engine operations
pub type Result<T> = std::result::Result<T, KeeperError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeeperError {
    /// A rostered player belongs to a manager with no name mapping
    #[error("no manager name for manager id '{manager}' (player {player} [{playerid}], season {season})")]
    UnknownManager {
        manager: String,
        playerid: String,
        player: String,
        season: u16,
    },

    /// A manager's roster does not have the expected number of players
    #[error("manager '{manager}' has {found} players in season {season}, want {expected}")]
    RosterSize {
        manager: String,
        season: u16,
        found: usize,
        expected: usize,
    },

    /// Two distinct player ids resolved to the same display name
    #[error("duplicate player name '{name}' for player ids {}", .playerids.join(", "))]
    DuplicateName { name: String, playerids: Vec<String> },

    /// Two manager ids share a display name, so their sheets would merge
    #[error("manager name '{name}' is used by manager ids {}", .managers.join(", "))]
    AmbiguousManagerName { name: String, managers: Vec<String> },

    /// Distinct manager names map to the same options file
    #[error("managers {} would share options file '{file}'", .managers.join(", "))]
    SheetNameCollision { file: String, managers: Vec<String> },

    #[error("invalid rule table: {message}")]
    InvalidRuleTable { message: String },

    #[error("season {year} is out of range")]
    InvalidSeason { year: u16 },

    #[error("invalid draft round '{value}' for player {playerid} in season {season}")]
    InvalidRound {
        playerid: String,
        season: u16,
        value: String,
    },

    #[error("invalid kept flag '{value}' for player {playerid} in season {season}")]
    InvalidKeptFlag {
        playerid: String,
        season: u16,
        value: String,
    },
}
