// 📥 Season Sources - Load normalized league records
// CSV files under <data>/<season>/ → roster, draft, drop and manager records

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::error::KeeperError;
use crate::records::{
    DraftEntry, DropEntry, ManagerNames, PlayerId, PriorSeasons, RosterEntry, Season,
    SeasonHistory, SeasonRecords,
};

// ============================================================================
// SOURCE TRAIT
// ============================================================================

/// Producer of normalized league records for one season at a time.
pub trait SeasonSource {
    /// Manager id → display name
    fn managers(&mut self, season: Season) -> Result<ManagerNames>;

    /// Final roster for the season
    fn roster(&mut self, season: Season) -> Result<Vec<RosterEntry>>;

    /// Draft results keyed by player
    fn draft(&mut self, season: Season) -> Result<HashMap<PlayerId, DraftEntry>>;

    /// Players dropped during the season
    fn drops(&mut self, season: Season) -> Result<HashMap<PlayerId, DropEntry>>;
}

/// Load draft and drop records for the three prior seasons.
pub fn load_history<S: SeasonSource + ?Sized>(
    source: &mut S,
    seasons: PriorSeasons,
) -> Result<SeasonHistory> {
    let mut load = |index: usize| -> Result<SeasonRecords> {
        let season = seasons.get(index);
        let records = SeasonRecords {
            draft: source.draft(season)?,
            drops: source.drops(season)?,
        };
        info!(
            season = season.year(),
            drafted = records.draft.len(),
            dropped = records.drops.len(),
            "loaded season history"
        );
        Ok(records)
    };

    let records = [load(0)?, load(1)?, load(2)?];
    Ok(SeasonHistory::new(seasons, records))
}

// ============================================================================
// CSV ROWS
// ============================================================================

#[derive(Debug, Deserialize)]
struct ManagerRow {
    manager: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    manager: String,
    playerid: String,
    player: String,
    #[serde(default)]
    position: String,
}

#[derive(Debug, Deserialize)]
struct DraftRow {
    playerid: String,
    player: String,
    #[serde(default)]
    manager: String,
    #[serde(default)]
    pick: Option<u16>,
    round: String,
    #[serde(default)]
    kept: String,
}

#[derive(Debug, Deserialize)]
struct DropRow {
    playerid: String,
    player: String,
}

fn parse_round(value: &str, playerid: &str, season: Season) -> Result<u8, KeeperError> {
    match value.trim().parse::<u8>() {
        Ok(round) if round >= 1 => Ok(round),
        _ => Err(KeeperError::InvalidRound {
            playerid: playerid.to_string(),
            season: season.year(),
            value: value.to_string(),
        }),
    }
}

/// Draft boards mark keepers in several ways; accept the common ones.
fn parse_kept(value: &str, playerid: &str, season: Season) -> Result<bool, KeeperError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" | "n" => Ok(false),
        "true" | "1" | "yes" | "y" | "k" => Ok(true),
        _ => Err(KeeperError::InvalidKeptFlag {
            playerid: playerid.to_string(),
            season: season.year(),
            value: value.to_string(),
        }),
    }
}

// ============================================================================
// CSV SOURCE
// ============================================================================

/// Provenance of one input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputDigest {
    pub path: PathBuf,
    pub sha256: String,
}

/// Reads `<root>/<season>/{managers,roster,draft,drops}.csv`.
pub struct CsvSeasonSource {
    root: PathBuf,
    inputs: Vec<InputDigest>,
}

impl CsvSeasonSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        CsvSeasonSource {
            root: root.into(),
            inputs: Vec::new(),
        }
    }

    /// Every file read so far, in read order
    pub fn inputs(&self) -> &[InputDigest] {
        &self.inputs
    }

    fn path(&self, season: Season, file: &str) -> PathBuf {
        self.root.join(season.to_string()).join(file)
    }

    /// Read, fingerprint and deserialize one CSV file.
    fn read_rows<T: for<'de> Deserialize<'de>>(&mut self, season: Season, file: &str) -> Result<Vec<T>> {
        let path = self.path(season, file);
        let bytes = fs::read(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let sha256 = format!("{:x}", Sha256::digest(&bytes));
        debug!(path = %path.display(), %sha256, "reading input");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(bytes.as_slice());

        let mut rows = Vec::new();
        for (line_num, result) in reader.deserialize().enumerate() {
            let row: T = result.with_context(|| {
                format!("Failed to parse CSV line {} in {}", line_num + 2, path.display())
            })?;
            rows.push(row);
        }

        self.inputs.push(InputDigest { path, sha256 });
        Ok(rows)
    }
}

impl SeasonSource for CsvSeasonSource {
    fn managers(&mut self, season: Season) -> Result<ManagerNames> {
        let rows: Vec<ManagerRow> = self.read_rows(season, "managers.csv")?;
        Ok(rows.into_iter().map(|r| (r.manager, r.name)).collect())
    }

    fn roster(&mut self, season: Season) -> Result<Vec<RosterEntry>> {
        let rows: Vec<RosterRow> = self.read_rows(season, "roster.csv")?;
        Ok(rows
            .into_iter()
            .map(|r| RosterEntry::new(r.manager, PlayerId::new(r.playerid), r.player, r.position))
            .collect())
    }

    fn draft(&mut self, season: Season) -> Result<HashMap<PlayerId, DraftEntry>> {
        let rows: Vec<DraftRow> = self.read_rows(season, "draft.csv")?;
        let mut draft = HashMap::with_capacity(rows.len());
        for row in rows {
            let entry = DraftEntry {
                round: parse_round(&row.round, &row.playerid, season)?,
                was_kept: parse_kept(&row.kept, &row.playerid, season)?,
                pick: row.pick.unwrap_or_default(),
                manager: row.manager,
                display_name: row.player,
            };
            let playerid = PlayerId::new(row.playerid);
            if draft.contains_key(&playerid) {
                warn!(%playerid, season = season.year(), "player drafted twice, keeping first pick");
                continue;
            }
            draft.insert(playerid, entry);
        }
        Ok(draft)
    }

    fn drops(&mut self, season: Season) -> Result<HashMap<PlayerId, DropEntry>> {
        let rows: Vec<DropRow> = self.read_rows(season, "drops.csv")?;
        let mut drops = HashMap::with_capacity(rows.len());
        for row in rows {
            // A player dropped more than once is still one drop
            drops
                .entry(PlayerId::new(row.playerid))
                .or_insert(DropEntry { display_name: row.player });
        }
        Ok(drops)
    }
}

// ============================================================================
// IN-MEMORY SOURCE
// ============================================================================

/// Source backed by maps, for embedding callers and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub managers: HashMap<Season, ManagerNames>,
    pub rosters: HashMap<Season, Vec<RosterEntry>>,
    pub drafts: HashMap<Season, HashMap<PlayerId, DraftEntry>>,
    pub drops: HashMap<Season, HashMap<PlayerId, DropEntry>>,
}

impl SeasonSource for MemorySource {
    fn managers(&mut self, season: Season) -> Result<ManagerNames> {
        self.managers
            .get(&season)
            .cloned()
            .with_context(|| format!("No managers for season {}", season))
    }

    fn roster(&mut self, season: Season) -> Result<Vec<RosterEntry>> {
        self.rosters
            .get(&season)
            .cloned()
            .with_context(|| format!("No roster for season {}", season))
    }

    fn draft(&mut self, season: Season) -> Result<HashMap<PlayerId, DraftEntry>> {
        Ok(self.drafts.get(&season).cloned().unwrap_or_default())
    }

    fn drops(&mut self, season: Season) -> Result<HashMap<PlayerId, DropEntry>> {
        Ok(self.drops.get(&season).cloned().unwrap_or_default())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::TempDir;

    fn write(dir: &Path, season: u16, file: &str, content: &str) {
        let season_dir = dir.join(season.to_string());
        fs::create_dir_all(&season_dir).unwrap();
        fs::write(season_dir.join(file), content).unwrap();
    }

    fn season(year: u16) -> Season {
        Season::new(year).unwrap()
    }

    #[test]
    fn test_parse_kept_variants() {
        let s = season(2023);
        assert!(parse_kept("K", "p", s).unwrap());
        assert!(parse_kept(" true ", "p", s).unwrap());
        assert!(!parse_kept("", "p", s).unwrap());
        assert!(!parse_kept("0", "p", s).unwrap());
        assert!(matches!(
            parse_kept("maybe", "p", s),
            Err(KeeperError::InvalidKeptFlag { .. })
        ));
    }

    #[test]
    fn test_parse_round_rejects_zero() {
        let s = season(2023);
        assert_eq!(parse_round("7", "p", s).unwrap(), 7);
        assert!(parse_round("0", "p", s).is_err());
        assert!(parse_round("x", "p", s).is_err());
    }

    #[test]
    fn test_csv_roster_assigns_kind() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            2023,
            "roster.csv",
            "manager,playerid,player,position\n\
             g1,nfl.p.30977,Josh Allen (Buf - QB),QB\n\
             g1,nfl.t.teams.33,Baltimore (Bal - DEF),DEF\n",
        );

        let mut source = CsvSeasonSource::new(dir.path());
        let roster = source.roster(season(2023)).unwrap();
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].kind, crate::records::PlayerKind::Individual);
        assert_eq!(roster[1].kind, crate::records::PlayerKind::TeamDefense);
        assert_eq!(source.inputs().len(), 1);
        assert_eq!(source.inputs()[0].sha256.len(), 64);
    }

    #[test]
    fn test_csv_draft_and_drops() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            2022,
            "draft.csv",
            "playerid,player,manager,pick,round,kept\n\
             p1,One,Alice,3,1,K\n\
             p2,Two,Bob,20,2,\n\
             p2,Two,Bob,44,4,\n",
        );
        write(dir.path(), 2022, "drops.csv", "playerid,player\np2,Two\np2,Two\n");

        let mut source = CsvSeasonSource::new(dir.path());
        let draft = source.draft(season(2022)).unwrap();
        assert_eq!(draft.len(), 2);
        assert!(draft[&PlayerId::new("p1")].was_kept);
        assert_eq!(draft[&PlayerId::new("p2")].round, 2);
        assert_eq!(draft[&PlayerId::new("p2")].pick, 20);

        let drops = source.drops(season(2022)).unwrap();
        assert_eq!(drops.len(), 1);
    }

    #[test]
    fn test_bad_round_names_player_and_season() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            2021,
            "draft.csv",
            "playerid,player,manager,pick,round,kept\np9,Nine,Al,1,first,\n",
        );
        let mut source = CsvSeasonSource::new(dir.path());
        let err = source.draft(season(2021)).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("p9"));
        assert!(msg.contains("2021"));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let mut source = CsvSeasonSource::new(dir.path());
        let err = source.managers(season(2023)).unwrap_err();
        assert!(err.to_string().contains("managers.csv"));
    }

    #[test]
    fn test_load_history_from_memory() {
        let prior = PriorSeasons::for_target(season(2024)).unwrap();
        let mut source = MemorySource::default();
        let mut draft = HashMap::new();
        draft.insert(
            PlayerId::new("p1"),
            DraftEntry {
                round: 2,
                was_kept: true,
                pick: 14,
                manager: "Alice".to_string(),
                display_name: "One".to_string(),
            },
        );
        source.drafts.insert(season(2022), draft);

        let history = load_history(&mut source, prior).unwrap();
        assert_eq!(history.kept_flags(&PlayerId::new("p1")), [false, true, false]);
        assert!(history.records(0).draft.is_empty());
    }
}
