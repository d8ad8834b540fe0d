// 📊 Report Builder - Validate, sort and group keeper rulings
// Produces per-manager option sheets and the administrative audit table

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

use crate::classifier::{KeeperRound, Reason, RuleTable};
use crate::error::{KeeperError, Result};
use crate::linker::EligibilityFacts;
use crate::records::{PlayerId, PriorSeasons, HISTORY_DEPTH};

// ============================================================================
// RULING
// ============================================================================

/// The outcome for one rostered player, with the facts that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ruling {
    pub manager: String,
    pub playerid: PlayerId,
    pub display_name: String,
    pub keeper_round: KeeperRound,
    pub reason: Reason,
    pub prior_draft_round: Option<u8>,
    pub kept: [bool; HISTORY_DEPTH],
    pub dropped: [bool; HISTORY_DEPTH],
}

impl Ruling {
    pub fn from_facts(facts: EligibilityFacts, rules: &RuleTable) -> Self {
        let classification = rules.classify(&facts);
        Ruling {
            manager: facts.manager,
            playerid: facts.playerid,
            display_name: facts.display_name,
            keeper_round: classification.round,
            reason: classification.reason,
            prior_draft_round: facts.prior_draft_round,
            kept: facts.kept,
            dropped: facts.dropped,
        }
    }

    #[allow(clippy::type_complexity)]
    fn sort_key(
        &self,
    ) -> (
        &str,
        KeeperRound,
        &str,
        &str,
        &PlayerId,
        Option<u8>,
        [bool; HISTORY_DEPTH],
        [bool; HISTORY_DEPTH],
    ) {
        (
            &self.manager,
            self.keeper_round,
            self.reason.as_str(),
            &self.display_name,
            &self.playerid,
            self.prior_draft_round,
            self.kept,
            self.dropped,
        )
    }
}

pub fn classify_all(facts: Vec<EligibilityFacts>, rules: &RuleTable) -> Vec<Ruling> {
    facts
        .into_iter()
        .map(|f| Ruling::from_facts(f, rules))
        .collect()
}

// ============================================================================
// VALIDATION / ORDERING
// ============================================================================

/// A display name may appear only once across the whole ruling set.
pub fn validate_unique_names(rulings: &[Ruling]) -> Result<()> {
    let mut by_name: BTreeMap<&str, Vec<&PlayerId>> = BTreeMap::new();
    for ruling in rulings {
        by_name
            .entry(ruling.display_name.as_str())
            .or_default()
            .push(&ruling.playerid);
    }

    if let Some((name, ids)) = by_name.into_iter().find(|(_, ids)| ids.len() > 1) {
        return Err(KeeperError::DuplicateName {
            name: name.to_string(),
            playerids: ids.iter().map(|id| id.to_string()).collect(),
        });
    }

    Ok(())
}

/// Manager names become file names; keep them inside the options directory.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        "_".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Every sheet must land in its own options file.
pub fn validate_sheet_names(sheets: &[ManagerSheet]) -> Result<()> {
    let mut by_file: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for sheet in sheets {
        by_file
            .entry(sheet.file_stem.as_str())
            .or_default()
            .push(sheet.manager.as_str());
    }

    if let Some((file, managers)) = by_file.into_iter().find(|(_, m)| m.len() > 1) {
        return Err(KeeperError::SheetNameCollision {
            file: format!("{}.csv", file),
            managers: managers.iter().map(|m| m.to_string()).collect(),
        });
    }

    Ok(())
}

/// Stable sort: manager, keeper round (ineligible last), reason, name, id.
pub fn sort_rulings(rulings: &mut [Ruling]) {
    rulings.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}

/// Partition sorted rulings into contiguous per-manager groups.
pub fn group_by_manager(rulings: &[Ruling]) -> Vec<(&str, &[Ruling])> {
    let mut groups = Vec::new();
    let mut start = 0;
    for i in 1..=rulings.len() {
        if i == rulings.len() || rulings[i].manager != rulings[start].manager {
            groups.push((rulings[start].manager.as_str(), &rulings[start..i]));
            start = i;
        }
    }
    groups
}

// ============================================================================
// OUTPUT ROWS
// ============================================================================

/// One row of a manager's keeper options sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionRow {
    pub player: String,
    pub playerid: String,
    pub keeper_round: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerSheet {
    pub manager: String,
    /// Options file name without extension
    pub file_stem: String,
    pub rows: Vec<OptionRow>,
}

/// One row of the administrative table, every column rendered
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminRow {
    pub manager: String,
    pub player: String,
    pub playerid: String,
    pub keeper_round: String,
    pub draft_round: String,
    pub reason: String,
    /// (kept, dropped) markers per season, most recent first
    pub history: [(String, String); HISTORY_DEPTH],
}

impl AdminRow {
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.manager.as_str(),
            self.player.as_str(),
            self.playerid.as_str(),
            self.keeper_round.as_str(),
            self.draft_round.as_str(),
            self.reason.as_str(),
        ];
        for (kept, dropped) in &self.history {
            fields.push(kept);
            fields.push(dropped);
        }
        fields
    }
}

/// Column labels for the administrative table.
pub fn admin_header(seasons: &PriorSeasons) -> Vec<String> {
    let mut header = vec![
        "Manager".to_string(),
        "Player".to_string(),
        "Player ID".to_string(),
        format!("Keeper round {}", seasons.target.short()),
        format!("Draft round {}", seasons.latest().short()),
        "Reason".to_string(),
    ];
    for season in seasons.iter() {
        header.push(format!("Kept {}", season.short()));
        header.push(format!("Dropped {}", season.short()));
    }
    header
}

pub const OPTION_HEADER: [&str; 3] = ["Player", "Player ID", "Keeper Round"];

fn admin_row(ruling: &Ruling, seasons: &PriorSeasons) -> AdminRow {
    let history = [0, 1, 2].map(|i| {
        let label = seasons.get(i).short();
        let kept = if ruling.kept[i] { format!("K{}", label) } else { String::new() };
        let dropped = if ruling.dropped[i] { format!("D{}", label) } else { String::new() };
        (kept, dropped)
    });

    AdminRow {
        manager: ruling.manager.clone(),
        player: ruling.display_name.clone(),
        playerid: ruling.playerid.to_string(),
        keeper_round: ruling.keeper_round.to_string(),
        draft_round: ruling
            .prior_draft_round
            .map(|r| r.to_string())
            .unwrap_or_default(),
        reason: ruling.reason.as_str().to_string(),
        history,
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone)]
pub struct Report {
    pub seasons: PriorSeasons,
    /// Sorted, validated rulings
    pub rulings: Vec<Ruling>,
    pub sheets: Vec<ManagerSheet>,
    pub admin: Vec<AdminRow>,
}

impl Report {
    /// Validate, sort and group. Fails before anything can be written.
    pub fn build(mut rulings: Vec<Ruling>, seasons: PriorSeasons) -> Result<Self> {
        validate_unique_names(&rulings)?;
        sort_rulings(&mut rulings);

        let sheets = group_by_manager(&rulings)
            .into_iter()
            .map(|(manager, group)| ManagerSheet {
                manager: manager.to_string(),
                file_stem: sanitize_file_name(manager),
                rows: group
                    .iter()
                    .map(|r| OptionRow {
                        player: r.display_name.clone(),
                        playerid: r.playerid.to_string(),
                        keeper_round: r.keeper_round.to_string(),
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();
        validate_sheet_names(&sheets)?;

        let admin = rulings.iter().map(|r| admin_row(r, &seasons)).collect();

        let report = Report { seasons, rulings, sheets, admin };
        for ruling in report.flagged() {
            warn!(
                manager = %ruling.manager,
                playerid = %ruling.playerid,
                player = %ruling.display_name,
                "ruling flagged for manual review"
            );
        }
        info!(
            rulings = report.rulings.len(),
            managers = report.sheets.len(),
            "keeper report built"
        );

        Ok(report)
    }

    /// Rulings carrying the manual-review advisory
    pub fn flagged(&self) -> impl Iterator<Item = &Ruling> {
        self.rulings.iter().filter(|r| r.reason.needs_review())
    }

    pub fn admin_header(&self) -> Vec<String> {
        admin_header(&self.seasons)
    }
}

// ============================================================================
// TESTS
// ============================================================================
