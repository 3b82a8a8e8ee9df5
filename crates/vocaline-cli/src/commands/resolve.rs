//! Resolve one syllable from explicit symbols.

use std::path::PathBuf;

use clap::Args;
use vocaline_core::{Note, NoteGroup, Timing};
use vocaline_voicebank::VoicebankQuery;

use super::common::{load_table, load_voicebank, phonemizer};

/// Show the aliases chosen for one syllable.
#[derive(Args)]
pub struct ResolveArgs {
    /// Phonetic symbols, e.g. `s t aa`
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,

    /// Language table name or path
    #[arg(short, long, default_value = "cvvc")]
    pub table: String,

    /// Voicebank directory
    #[arg(short = 'b', long)]
    pub voicebank: PathBuf,

    /// Note tone (MIDI)
    #[arg(long, default_value_t = 60)]
    pub tone: i32,

    /// Note length in ticks
    #[arg(long, default_value_t = 480)]
    pub duration: i64,

    /// Tempo for oto timing conversion
    #[arg(long, default_value_t = 120.0)]
    pub bpm: f64,

    /// Symbols of a touching previous note, e.g. `--after "k a"`
    #[arg(long)]
    pub after: Option<String>,
}

/// Run the resolve command.
pub fn run(args: ResolveArgs) -> anyhow::Result<()> {
    let table = load_table(&args.table)?;
    let bank = load_voicebank(&args.voicebank)?;
    let query = VoicebankQuery::new(&bank, Timing::with_bpm(args.bpm));
    let phonemizer = phonemizer(&table, &args.voicebank, &query);

    let hint = args.symbols.join(" ");
    let prev: Vec<Note> = args
        .after
        .iter()
        .map(|after| Note::new(after.clone(), args.tone, 0, args.duration).with_hint(after.clone()))
        .collect();
    let notes = [Note::new(hint.clone(), args.tone, args.duration, args.duration).with_hint(hint)];
    let mut group = NoteGroup::new(&notes);
    if !prev.is_empty() {
        group = group.with_prev(&prev, true);
    }

    for event in phonemizer.process(&group, &query) {
        println!("{}\t{}", event.position, event.alias);
    }
    Ok(())
}
