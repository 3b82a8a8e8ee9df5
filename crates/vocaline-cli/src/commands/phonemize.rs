//! Phonemize a score file.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use serde::Serialize;
use vocaline_core::{Tick, Timing};
use vocaline_voicebank::VoicebankQuery;

use super::common::{load_table, load_voicebank, phonemizer};
use crate::score::{Score, group_at, group_ranges};

/// Phonemize a score.
#[derive(Args)]
pub struct PhonemizeArgs {
    /// Score file (TOML)
    pub score: PathBuf,

    /// Language table name or path
    #[arg(short, long, default_value = "cvvc")]
    pub table: String,

    /// Voicebank directory
    #[arg(short = 'b', long)]
    pub voicebank: PathBuf,

    /// Tempo override (defaults to the score's bpm)
    #[arg(long)]
    pub bpm: Option<f64>,

    /// Print events as JSON
    #[arg(long)]
    pub json: bool,
}

/// One emitted event with its absolute position.
#[derive(Debug, Serialize)]
struct EventRow<'a> {
    note: usize,
    lyric: &'a str,
    position: Tick,
    alias: String,
}

/// Run the phonemize command.
pub fn run(args: PhonemizeArgs) -> anyhow::Result<()> {
    let score = Score::load(&args.score)?;
    let notes = score
        .to_notes()
        .with_context(|| format!("in score {}", args.score.display()))?;
    let table = load_table(&args.table)?;
    let bank = load_voicebank(&args.voicebank)?;
    let query = VoicebankQuery::new(&bank, Timing::with_bpm(args.bpm.unwrap_or(score.bpm)));
    let phonemizer = phonemizer(&table, &args.voicebank, &query);

    let ranges = group_ranges(&notes);
    let mut rows = Vec::new();
    for (i, range) in ranges.iter().enumerate() {
        let group = group_at(&notes, &ranges, i);
        let lead = &notes[range.start];
        for event in phonemizer.process(&group, &query) {
            rows.push(EventRow {
                note: range.start,
                lyric: &lead.lyric,
                position: lead.position + event.position,
                alias: event.alias,
            });
        }
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        for row in &rows {
            println!("{}\t{}", row.position, row.alias);
        }
    }
    Ok(())
}
