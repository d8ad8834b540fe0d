// Keeper Eligibility Engine - Core Library
// Exposes all modules for use in the CLI and tests

pub mod error;
pub mod records;        // Source records + explicit player identity
pub mod source;         // Season sources (CSV / in-memory)
pub mod linker;         // Identity linker - cross-season fact records
pub mod classifier;     // Keeper rules + rule table
pub mod report;         // Validation, ordering, grouping
pub mod output;         // CSV + manifest writer
pub mod config;
pub mod pipeline;

// Re-export commonly used types
pub use error::KeeperError;
pub use records::{
    DraftEntry, DropEntry, ManagerNames, PlayerId, PlayerKind, PriorSeasons,
    RosterEntry, Season, SeasonHistory, SeasonRecords,
};
pub use source::{load_history, CsvSeasonSource, InputDigest, MemorySource, SeasonSource};
pub use linker::{
    check_draft_rounds, check_manager_names, check_roster_sizes, link, link_all, EligibilityFacts,
};
pub use classifier::{classify, Classification, KeeperRound, Reason, RuleTable};
pub use report::{
    classify_all, group_by_manager, sanitize_file_name, sort_rulings, validate_sheet_names,
    validate_unique_names,
    AdminRow, ManagerSheet, OptionRow, Report, Ruling,
};
pub use output::{write_report, FlaggedPlayer, Manifest};
pub use config::LeagueConfig;
pub use pipeline::{evaluate, run, RunOptions, RunSummary};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
