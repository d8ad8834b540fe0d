// 💾 Output Writer - Persist keeper reports
// admin.csv + options/<manager>.csv + manifest.json under <out>/<year>/

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::report::{Report, OPTION_HEADER};
use crate::source::InputDigest;

pub const ADMIN_FILE: &str = "admin.csv";
pub const OPTIONS_DIR: &str = "options";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Flagged ruling as recorded in the manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlaggedPlayer {
    pub manager: String,
    pub player: String,
    pub playerid: String,
    pub keeper_round: String,
}

/// Audit record written next to the CSV files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub season: u16,
    pub generated_at: DateTime<Utc>,
    pub rule_table_version: String,
    pub inputs: Vec<InputDigest>,
    pub rulings: usize,
    pub managers: usize,
    pub flagged: Vec<FlaggedPlayer>,
}

impl Manifest {
    pub fn new(report: &Report, rule_table_version: &str, inputs: &[InputDigest]) -> Self {
        Manifest {
            season: report.seasons.target.year(),
            generated_at: Utc::now(),
            rule_table_version: rule_table_version.to_string(),
            inputs: inputs.to_vec(),
            rulings: report.rulings.len(),
            managers: report.sheets.len(),
            flagged: report
                .flagged()
                .map(|r| FlaggedPlayer {
                    manager: r.manager.clone(),
                    player: r.display_name.clone(),
                    playerid: r.playerid.to_string(),
                    keeper_round: r.keeper_round.to_string(),
                })
                .collect(),
        }
    }
}

/// Write every record set for a built report. Returns the output directory.
pub fn write_report(report: &Report, out_root: &Path, manifest: &Manifest) -> Result<PathBuf> {
    let dir = out_root.join(report.seasons.target.to_string());
    let options_dir = dir.join(OPTIONS_DIR);
    fs::create_dir_all(&options_dir)
        .with_context(|| format!("Failed to create {}", options_dir.display()))?;

    let admin_path = dir.join(ADMIN_FILE);
    let mut admin = csv::Writer::from_path(&admin_path)
        .with_context(|| format!("Failed to create {}", admin_path.display()))?;
    admin.write_record(report.admin_header())?;
    for row in &report.admin {
        admin.write_record(row.fields())?;
    }
    admin
        .flush()
        .with_context(|| format!("Failed to write {}", admin_path.display()))?;
    info!(path = %admin_path.display(), rows = report.admin.len(), "wrote admin table");

    for sheet in &report.sheets {
        let path = options_dir.join(format!("{}.csv", sheet.file_stem));
        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(OPTION_HEADER)?;
        for row in &sheet.rows {
            writer.write_record([&row.player, &row.playerid, &row.keeper_round])?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    info!(dir = %options_dir.display(), managers = report.sheets.len(), "wrote manager options");

    let manifest_path = dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(manifest).context("Failed to serialize manifest")?;
    fs::write(&manifest_path, json)
        .with_context(|| format!("Failed to write {}", manifest_path.display()))?;

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{KeeperRound, Reason};
    use crate::records::{PlayerId, PriorSeasons, Season};
    use crate::report::Ruling;
    use tempfile::TempDir;

    fn report() -> Report {
        let seasons = PriorSeasons::for_target(Season::new(2024).unwrap()).unwrap();
        let rulings = vec![
            Ruling {
                manager: "Alice / The Champs".to_string(),
                playerid: PlayerId::new("nfl.p.1"),
                display_name: "One (Buf - QB)".to_string(),
                keeper_round: KeeperRound::Ineligible,
                reason: Reason::KeptRoundOne,
                prior_draft_round: Some(1),
                kept: [true, false, false],
                dropped: [false; 3],
            },
            Ruling {
                manager: "Bob".to_string(),
                playerid: PlayerId::new("nfl.p.2"),
                display_name: "Two (KC - WR)".to_string(),
                keeper_round: KeeperRound::Round(3),
                reason: Reason::DroppedNeedsReview,
                prior_draft_round: Some(1),
                kept: [false; 3],
                dropped: [true, false, false],
            },
        ];
        Report::build(rulings, seasons).unwrap()
    }

    #[test]
    fn test_write_report_files() {
        let dir = TempDir::new().unwrap();
        let report = report();
        let manifest = Manifest::new(&report, "2023", &[]);
        let out = write_report(&report, dir.path(), &manifest).unwrap();

        assert_eq!(out, dir.path().join("2024"));

        let admin = fs::read_to_string(out.join(ADMIN_FILE)).unwrap();
        let mut lines = admin.lines();
        assert!(lines.next().unwrap().starts_with("Manager,Player,Player ID,Keeper round 24"));
        assert_eq!(
            lines.next().unwrap(),
            "Alice / The Champs,One (Buf - QB),nfl.p.1,n/a,1,kept round 1,K23,,,,,"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Bob,Two (KC - WR),nfl.p.2,3,1,\"dropped, flagged for manual review\",,D23,,,,"
        );

        let alice = fs::read_to_string(out.join(OPTIONS_DIR).join("Alice _ The Champs.csv")).unwrap();
        assert_eq!(alice, "Player,Player ID,Keeper Round\nOne (Buf - QB),nfl.p.1,n/a\n");

        let manifest: Manifest =
            serde_json::from_str(&fs::read_to_string(out.join(MANIFEST_FILE)).unwrap()).unwrap();
        assert_eq!(manifest.season, 2024);
        assert_eq!(manifest.rulings, 2);
        assert_eq!(manifest.flagged.len(), 1);
        assert_eq!(manifest.flagged[0].playerid, "nfl.p.2");
    }
}
