//! Score files.
//!
//! A score is a TOML list of notes. Positions default to the end of the
//! previous note; lyrics starting with `+` continue the previous group.
//!
//! ```toml
//! bpm = 120
//!
//! [[notes]]
//! lyric = "hello"
//! tone = "C4"
//! duration = 480
//!
//! [[notes]]
//! lyric = "+"
//! tone = 62
//! duration = 480
//!
//! [[notes.attributes]]
//! index = 0
//! color = "soft"
//! ```

use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use vocaline_core::{Note, NoteGroup, PositionAttribute, Tick};
use vocaline_voicebank::parse_tone_name;

/// Errors reading a score.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Failed to read the file
    #[error("failed to read score '{path}': {source}")]
    ReadFile {
        /// Path of the score.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("failed to parse score: {0}")]
    Parse(#[from] toml::de::Error),

    /// A tone name that is not a note name
    #[error("note {index}: unknown tone '{tone}'")]
    BadTone {
        /// Zero-based note index.
        index: usize,
        /// The tone as written.
        tone: String,
    },

    /// A note with a negative duration
    #[error("note {index}: negative duration")]
    NegativeDuration {
        /// Zero-based note index.
        index: usize,
    },
}

/// A tone as a MIDI number or a note name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ToneSpec {
    /// MIDI number, 60 = C4.
    Midi(i32),
    /// Note name such as `"C#4"`.
    Name(String),
}

/// `[[notes.attributes]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreAttribute {
    /// Output index.
    pub index: usize,
    /// Voice color.
    pub color: Option<String>,
    /// Semitone shift for lookup.
    #[serde(default)]
    pub tone_shift: i32,
    /// Alternate take.
    pub alternate: Option<u32>,
    /// Consonant stretch ratio.
    pub stretch: Option<f64>,
}

/// `[[notes]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoreNote {
    /// Lyric.
    pub lyric: String,
    /// Tone.
    pub tone: ToneSpec,
    /// Length in ticks.
    pub duration: Tick,
    /// Phonetic hint.
    pub hint: Option<String>,
    /// Absolute start; defaults to the previous note's end.
    pub position: Option<Tick>,
    /// Output overrides.
    #[serde(default)]
    pub attributes: Vec<ScoreAttribute>,
}

fn default_bpm() -> f64 {
    120.0
}

/// A parsed score.
#[derive(Debug, Clone, Deserialize)]
pub struct Score {
    /// Tempo.
    #[serde(default = "default_bpm")]
    pub bpm: f64,
    /// Notes in order.
    #[serde(default)]
    pub notes: Vec<ScoreNote>,
}

impl Score {
    /// Load a score file.
    pub fn load(path: &Path) -> Result<Self, ScoreError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScoreError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Parse a score.
    pub fn from_toml(text: &str) -> Result<Self, ScoreError> {
        Ok(toml::from_str(text)?)
    }

    /// Engine notes with absolute positions.
    pub fn to_notes(&self) -> Result<Vec<Note>, ScoreError> {
        let mut cursor: Tick = 0;
        let mut out = Vec::with_capacity(self.notes.len());
        for (index, n) in self.notes.iter().enumerate() {
            if n.duration < 0 {
                return Err(ScoreError::NegativeDuration { index });
            }
            let tone = match &n.tone {
                ToneSpec::Midi(t) => *t,
                ToneSpec::Name(name) => {
                    parse_tone_name(name).ok_or_else(|| ScoreError::BadTone {
                        index,
                        tone: name.clone(),
                    })?
                }
            };
            let position = n.position.unwrap_or(cursor);
            let mut note = Note::new(n.lyric.clone(), tone, position, n.duration);
            if let Some(hint) = &n.hint {
                note = note.with_hint(hint.clone());
            }
            for a in &n.attributes {
                let mut attr = PositionAttribute::at(a.index).with_tone_shift(a.tone_shift);
                attr.voice_color = a.color.clone();
                attr.alternate = a.alternate;
                attr.consonant_stretch = a.stretch;
                note = note.with_attribute(attr);
            }
            cursor = note.end();
            out.push(note);
        }
        Ok(out)
    }
}

/// Index ranges of note groups: a lead note plus its `+` continuations.
pub fn group_ranges(notes: &[Note]) -> Vec<Range<usize>> {
    let mut out: Vec<Range<usize>> = Vec::new();
    for (i, note) in notes.iter().enumerate() {
        match out.last_mut() {
            Some(range) if note.lyric.starts_with('+') => range.end = i + 1,
            _ => out.push(i..i + 1),
        }
    }
    out
}

/// The group at `at` with its previous and next groups wired in.
///
/// Groups are neighbours when one ends exactly where the other starts.
pub fn group_at<'a>(notes: &'a [Note], ranges: &[Range<usize>], at: usize) -> NoteGroup<'a> {
    let range = ranges[at].clone();
    let current = &notes[range];
    let mut group = NoteGroup::new(current);
    let (Some(first), Some(last)) = (current.first(), current.last()) else {
        return group;
    };
    if let Some(prev) = at.checked_sub(1).map(|p| &notes[ranges[p].clone()])
        && let Some(prev_last) = prev.last()
    {
        group = group.with_prev(prev, prev_last.end() == first.position);
    }
    if let Some(next) = ranges.get(at + 1).map(|r| &notes[r.start]) {
        group = group.with_next(next, last.end() == next.position);
    }
    group
}
