// 🏈 Keeper Pipeline - One evaluation run, end to end
// load → link → classify → validate/sort/group → write

use anyhow::Result;
use std::path::PathBuf;
use tracing::info;

use crate::config::LeagueConfig;
use crate::linker::link_all;
use crate::output::{write_report, FlaggedPlayer, Manifest};
use crate::records::{PriorSeasons, Season};
use crate::report::{classify_all, Report};
use crate::source::{load_history, CsvSeasonSource, InputDigest, SeasonSource};

#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Season whose draft the keepers are for
    pub year: u16,
    pub data_root: PathBuf,
    pub out_root: PathBuf,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub season: u16,
    pub rulings: usize,
    pub managers: usize,
    pub flagged: Vec<FlaggedPlayer>,
    pub output_dir: PathBuf,
}

/// Build the report from any source. Nothing is written here.
pub fn evaluate<S: SeasonSource + ?Sized>(
    source: &mut S,
    target: Season,
    config: &LeagueConfig,
) -> Result<Report> {
    let seasons = PriorSeasons::for_target(target)?;
    let latest = seasons.latest();

    let managers = source.managers(latest)?;
    let roster = source.roster(latest)?;
    info!(
        season = latest.year(),
        managers = managers.iter().count(),
        players = roster.len(),
        "loaded roster"
    );

    let history = load_history(source, seasons)?;
    let facts = link_all(&roster, &managers, &history, config)?;
    let rulings = classify_all(facts, &config.rules);

    Ok(Report::build(rulings, seasons)?)
}

/// Evaluate from CSV under the data root and write every output.
pub fn run(options: &RunOptions) -> Result<RunSummary> {
    let target = Season::new(options.year)?;
    let config = LeagueConfig::resolve(options.config.as_deref(), &options.data_root)?;
    info!(
        year = options.year,
        rules = %config.rules.version,
        roster_size = config.roster_size,
        "starting keeper evaluation"
    );

    let mut source = CsvSeasonSource::new(&options.data_root);
    let report = evaluate(&mut source, target, &config)?;

    let inputs: Vec<InputDigest> = source.inputs().to_vec();
    let manifest = Manifest::new(&report, &config.rules.version, &inputs);
    let output_dir = write_report(&report, &options.out_root, &manifest)?;

    Ok(RunSummary {
        season: target.year(),
        rulings: manifest.rulings,
        managers: manifest.managers,
        flagged: manifest.flagged,
        output_dir,
    })
}

// ============================================================================
// TESTS
// ============================================================================
