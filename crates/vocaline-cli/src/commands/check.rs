//! Validate a language table.

use std::path::PathBuf;

use clap::Args;
use vocaline_config::{has_errors, load_for_singer};
use vocaline_core::{AliasSet, Timing};
use vocaline_voicebank::VoicebankQuery;

use super::common::{load_table, load_voicebank};

/// Check a table for malformed entries.
#[derive(Args)]
pub struct CheckArgs {
    /// Language table name or path
    pub table: String,

    /// Also layer this voicebank's override and activate its fallbacks
    #[arg(short = 'b', long)]
    pub voicebank: Option<PathBuf>,
}

/// Run the check command.
pub fn run(args: CheckArgs) -> anyhow::Result<()> {
    let table = load_table(&args.table)?;

    let report = match &args.voicebank {
        Some(dir) => {
            let bank = load_voicebank(dir)?;
            let query = VoicebankQuery::new(&bank, Timing::default());
            load_for_singer(&table, Some(dir), &query)
        }
        None => load_for_singer(&table, None, &AliasSet::new()),
    };

    for diagnostic in &report.diagnostics {
        println!("{diagnostic}");
    }

    let config = &report.config;
    println!(
        "{}: {} symbols, {} repairs, {} active fallbacks",
        if table.name.is_empty() { &args.table } else { &table.name },
        config.alphabet().len(),
        config.repairs().len(),
        config.active_fallbacks().len()
    );

    if has_errors(&report.diagnostics) {
        let errors = report.diagnostics.iter().filter(|d| d.is_error()).count();
        anyhow::bail!("{errors} error(s) in table '{}'", args.table);
    }
    println!("ok");
    Ok(())
}
