// 🔗 Identity Linker - Join a roster entry to its keeper history
// One consolidated fact record per rostered player

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use crate::config::LeagueConfig;
use crate::error::{KeeperError, Result};
use crate::records::{
    ManagerNames, PlayerId, PlayerKind, RosterEntry, Season, SeasonHistory, HISTORY_DEPTH,
};

/// Everything the classifier needs to know about one player.
///
/// Flags are indexed by season, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityFacts {
    pub playerid: PlayerId,
    pub display_name: String,
    /// Manager display name
    pub manager: String,
    pub kind: PlayerKind,
    pub prior_draft_round: Option<u8>,
    pub kept: [bool; HISTORY_DEPTH],
    pub dropped: [bool; HISTORY_DEPTH],
}

impl EligibilityFacts {
    pub fn is_defense(&self) -> bool {
        self.kind.is_defense()
    }

    pub fn kept_every_season(&self) -> bool {
        self.kept.iter().all(|&k| k)
    }

    /// Dropped in either of the two older seasons
    pub fn dropped_before_latest(&self) -> bool {
        self.dropped[1..].iter().any(|&d| d)
    }
}

/// Link a single roster entry.
pub fn link(
    entry: &RosterEntry,
    managers: &ManagerNames,
    history: &SeasonHistory,
) -> Result<EligibilityFacts> {
    let season = history.seasons.latest();
    let manager = managers
        .get(&entry.manager)
        .ok_or_else(|| KeeperError::UnknownManager {
            manager: entry.manager.clone(),
            playerid: entry.playerid.to_string(),
            player: entry.display_name.clone(),
            season: season.year(),
        })?;

    let facts = EligibilityFacts {
        playerid: entry.playerid.clone(),
        display_name: entry.display_name.clone(),
        manager: manager.to_string(),
        kind: entry.kind,
        prior_draft_round: history.records(0).draft_round(&entry.playerid),
        kept: history.kept_flags(&entry.playerid),
        dropped: history.dropped_flags(&entry.playerid),
    };

    debug!(
        playerid = %facts.playerid,
        round = ?facts.prior_draft_round,
        kept = ?facts.kept,
        dropped = ?facts.dropped,
        "linked player"
    );

    Ok(facts)
}

/// Every manager must carry exactly `expected` players.
///
/// Faults are reported for the first offending manager in id order so
/// repeated runs fail the same way.
pub fn check_roster_sizes(roster: &[RosterEntry], expected: usize, season: Season) -> Result<()> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for entry in roster {
        *counts.entry(entry.manager.as_str()).or_default() += 1;
    }

    for (manager, found) in counts {
        if found != expected {
            return Err(KeeperError::RosterSize {
                manager: manager.to_string(),
                season: season.year(),
                found,
                expected,
            });
        }
    }

    Ok(())
}

/// Rostered managers must resolve to distinct display names, otherwise
/// their sheets would merge.
pub fn check_manager_names(roster: &[RosterEntry], managers: &ManagerNames) -> Result<()> {
    let rostered: BTreeSet<&str> = roster.iter().map(|e| e.manager.as_str()).collect();

    let mut by_name: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for id in rostered {
        if let Some(name) = managers.get(id) {
            by_name.entry(name).or_default().push(id);
        }
    }

    if let Some((name, ids)) = by_name.into_iter().find(|(_, ids)| ids.len() > 1) {
        return Err(KeeperError::AmbiguousManagerName {
            name: name.to_string(),
            managers: ids.iter().map(|id| id.to_string()).collect(),
        });
    }

    Ok(())
}

/// Draft rounds must fall inside the league's draft.
///
/// Seasons are scanned most recent first; within a season the smallest
/// player id is reported.
pub fn check_draft_rounds(history: &SeasonHistory, max_round: u8) -> Result<()> {
    for (i, season) in history.seasons.iter().enumerate() {
        let offender = history
            .records(i)
            .draft
            .iter()
            .filter(|(_, d)| d.round > max_round)
            .min_by(|a, b| a.0.cmp(b.0));

        if let Some((playerid, entry)) = offender {
            return Err(KeeperError::InvalidRound {
                playerid: playerid.to_string(),
                season: season.year(),
                value: entry.round.to_string(),
            });
        }
    }

    Ok(())
}

/// Check roster cardinality, draft rounds and manager names, then link
/// every entry.
pub fn link_all(
    roster: &[RosterEntry],
    managers: &ManagerNames,
    history: &SeasonHistory,
    config: &LeagueConfig,
) -> Result<Vec<EligibilityFacts>> {
    check_roster_sizes(roster, config.roster_size, history.seasons.latest())?;
    check_draft_rounds(history, config.rules.max_round)?;
    check_manager_names(roster, managers)?;
    roster
        .iter()
        .map(|entry| link(entry, managers, history))
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{DraftEntry, DropEntry, PriorSeasons, SeasonRecords};

    fn draft(round: u8, kept: bool) -> DraftEntry {
        DraftEntry {
            round,
            was_kept: kept,
            pick: round as u16 * 12,
            manager: "m1".to_string(),
            display_name: "x".to_string(),
        }
    }

    fn history() -> SeasonHistory {
        let prior = PriorSeasons::for_target(Season::new(2024).unwrap()).unwrap();
        let mut s1 = SeasonRecords::default();
        let mut s2 = SeasonRecords::default();
        let mut s3 = SeasonRecords::default();

        s1.draft.insert(PlayerId::new("p1"), draft(5, true));
        s2.draft.insert(PlayerId::new("p1"), draft(6, false));
        s3.drops.insert(PlayerId::new("p1"), DropEntry { display_name: "x".to_string() });

        // p2 drafted two seasons ago only
        s2.draft.insert(PlayerId::new("p2"), draft(3, true));
        s1.drops.insert(PlayerId::new("p2"), DropEntry { display_name: "y".to_string() });

        SeasonHistory::new(prior, [s1, s2, s3])
    }

    fn managers() -> ManagerNames {
        let mut m = ManagerNames::new();
        m.insert("m1", "Alice - Gridiron Geeks");
        m
    }

    #[test]
    fn test_link_collects_history_by_season() {
        let entry = RosterEntry::new("m1", "p1", "Player One (Buf - WR)", "WR");
        let facts = link(&entry, &managers(), &history()).unwrap();

        assert_eq!(facts.manager, "Alice - Gridiron Geeks");
        assert_eq!(facts.prior_draft_round, Some(5));
        assert_eq!(facts.kept, [true, false, false]);
        assert_eq!(facts.dropped, [false, false, true]);
        assert!(!facts.is_defense());
    }

    #[test]
    fn test_prior_round_only_from_latest_season() {
        let entry = RosterEntry::new("m1", "p2", "Player Two (KC - RB)", "RB");
        let facts = link(&entry, &managers(), &history()).unwrap();

        assert_eq!(facts.prior_draft_round, None);
        assert_eq!(facts.kept, [false, true, false]);
        assert_eq!(facts.dropped, [true, false, false]);
    }

    #[test]
    fn test_defense_tag_flows_through() {
        let entry = RosterEntry::new("m1", "nfl.t.teams.3", "Baltimore (Bal - DEF)", "DEF");
        let facts = link(&entry, &managers(), &history()).unwrap();
        assert!(facts.is_defense());
    }

    #[test]
    fn test_unknown_manager_is_fatal() {
        let entry = RosterEntry::new("ghost", "p1", "Player One", "WR");
        let err = link(&entry, &managers(), &history()).unwrap_err();
        assert!(matches!(err, KeeperError::UnknownManager { ref manager, season: 2023, .. } if manager == "ghost"));
    }

    #[test]
    fn test_roster_size_check() {
        let season = Season::new(2023).unwrap();
        let roster: Vec<RosterEntry> = (0..3)
            .map(|i| RosterEntry::new("m1", format!("p{}", i).as_str(), format!("P{}", i), "WR"))
            .chain(std::iter::once(RosterEntry::new("m2", "q1", "Q1", "QB")))
            .collect();

        let err = check_roster_sizes(&roster, 3, season).unwrap_err();
        assert_eq!(
            err,
            KeeperError::RosterSize {
                manager: "m2".to_string(),
                season: 2023,
                found: 1,
                expected: 3,
            }
        );
        assert!(check_roster_sizes(&roster[..3], 3, season).is_ok());
    }

    #[test]
    fn test_link_all_aborts_before_linking_on_bad_size() {
        // Unknown manager would also fail, but cardinality is checked first.
        let roster = vec![RosterEntry::new("ghost", "p1", "Player One", "WR")];
        let err = link_all(&roster, &managers(), &history(), &LeagueConfig::default()).unwrap_err();
        assert!(matches!(err, KeeperError::RosterSize { found: 1, .. }));
    }

    #[test]
    fn test_shared_manager_name_is_fatal() {
        let mut managers = managers();
        managers.insert("m2", "Alice - Gridiron Geeks");
        let roster = vec![
            RosterEntry::new("m2", "p2", "Player Two", "RB"),
            RosterEntry::new("m1", "p1", "Player One", "WR"),
        ];

        let err = check_manager_names(&roster, &managers).unwrap_err();
        assert_eq!(
            err,
            KeeperError::AmbiguousManagerName {
                name: "Alice - Gridiron Geeks".to_string(),
                managers: vec!["m1".to_string(), "m2".to_string()],
            }
        );

        // A mapping nobody on the roster uses is harmless
        assert!(check_manager_names(&roster[1..], &managers).is_ok());
    }

    #[test]
    fn test_draft_round_past_last_round_is_fatal() {
        let mut history = history();
        let prior = history.seasons;
        let mut records = [0, 1, 2].map(|i| history.records(i).clone());
        records[1].draft.insert(PlayerId::new("p9"), draft(20, false));
        records[1].draft.insert(PlayerId::new("p7"), draft(17, false));
        history = SeasonHistory::new(prior, records);

        let err = check_draft_rounds(&history, 16).unwrap_err();
        assert_eq!(
            err,
            KeeperError::InvalidRound {
                playerid: "p7".to_string(),
                season: 2022,
                value: "17".to_string(),
            }
        );
        assert!(check_draft_rounds(&history, 20).is_ok());
    }

    #[test]
    fn test_link_all_rejects_out_of_range_round() {
        let mut records = [0, 1, 2].map(|_| SeasonRecords::default());
        records[0].draft.insert(PlayerId::new("p1"), draft(20, false));
        let history = SeasonHistory::new(history().seasons, records);
        let config = LeagueConfig { roster_size: 1, ..LeagueConfig::default() };
        let roster = vec![RosterEntry::new("m1", "p1", "One", "WR")];

        let err = link_all(&roster, &managers(), &history, &config).unwrap_err();
        assert!(matches!(err, KeeperError::InvalidRound { season: 2023, ref value, .. } if value == "20"));
    }
}
