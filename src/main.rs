use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use keeper_eligibility::{run, RunOptions, VERSION};

#[derive(Parser)]
#[command(name = "keeper-eligibility")]
#[command(about = "Compute keeper rounds for every rostered player")]
#[command(version = VERSION)]
struct Cli {
    /// Season to generate keeper options for
    year: u16,

    /// Data root holding <season>/ directories (default: $HOME/keeperdata)
    #[arg(long)]
    data: Option<PathBuf>,

    /// Output root (default: <data>/out)
    #[arg(long)]
    out: Option<PathBuf>,

    /// League config JSON (default: <data>/league.json if present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    let data_root = match cli.data {
        Some(path) => path,
        None => {
            let home = std::env::var("HOME").context("HOME not set; pass --data")?;
            PathBuf::from(home).join("keeperdata")
        }
    };
    let out_root = cli.out.unwrap_or_else(|| data_root.join("out"));

    println!("🏈 Keeper options for {}", cli.year);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("📂 Data: {}", data_root.display());

    let summary = run(&RunOptions {
        year: cli.year,
        data_root,
        out_root,
        config: cli.config,
    })?;

    println!("✓ {} rulings across {} managers", summary.rulings, summary.managers);
    if !summary.flagged.is_empty() {
        println!("\n⚠️  {} flagged for manual review:", summary.flagged.len());
        for player in &summary.flagged {
            println!(
                "   {} - {} [{}] @ {}",
                player.manager, player.player, player.playerid, player.keeper_round
            );
        }
    }
    println!("\n💾 Wrote {}", summary.output_dir.display());

    Ok(())
}
