//! Syllable and ending segmentation.
//!
//! The symbols of a lead note are cut at every vowel. Each vowel opens a
//! [`Syllable`] whose onset is the consonant run before it; the consonants
//! after the last vowel become the group's [`Ending`]. Syllables are laid
//! over the group's notes one per note, with `+~`/`+*` extension notes
//! folded into the note before them. When there are more vowels than notes
//! the last note is split evenly.
//!
//! A previous neighbour's ending is carried into the first syllable, so its
//! coda consonants join this syllable's onset and its last vowel becomes
//! the previous vowel.

use crate::config::ResolverConfig;
use crate::extract::extract;
use crate::g2p::G2p;
use crate::note::{Note, Tick};
use crate::symbol::Symbol;

/// Split notes are quantized to this many ticks.
pub const SPLIT_QUANTUM: Tick = 15;

/// Structural shape of a syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyllableShape {
    /// Phrase-initial, empty onset.
    StartingVowel,
    /// Empty onset after a vowel.
    VowelVowel,
    /// Phrase-initial with this many onset consonants.
    StartingConsonantVowel(usize),
    /// Interior with this many onset consonants.
    MiddleConsonantVowel(usize),
}

/// Structural shape of an ending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndingShape {
    /// No coda.
    None,
    /// One coda consonant.
    One,
    /// A coda cluster.
    Many,
}

/// One vowel with the consonants leading into it.
#[derive(Debug, Clone, PartialEq)]
pub struct Syllable {
    /// Vowel of the previous syllable. `None` at phrase start.
    pub prev_vowel: Option<String>,
    /// Onset consonants, including any carried over from the previous word.
    pub cluster: Vec<String>,
    /// Nucleus.
    pub vowel: String,
    /// Tone under which the onset is sung.
    pub tone: i32,
    /// Tone of the nucleus.
    pub vowel_tone: i32,
    /// Nucleus offset from the group start.
    pub position: Tick,
    /// Duration of the note the onset intrudes into. `None` at phrase start.
    pub duration: Option<Tick>,
    /// How many leading cluster members belong to the previous word.
    pub prev_word_consonants: usize,
    /// Interior syllable whose nucleus may sustain the previous vowel.
    pub can_extend: bool,
}

impl Syllable {
    /// Classify the syllable.
    pub fn shape(&self) -> SyllableShape {
        match (self.prev_vowel.is_some(), self.cluster.len()) {
            (false, 0) => SyllableShape::StartingVowel,
            (true, 0) => SyllableShape::VowelVowel,
            (false, n) => SyllableShape::StartingConsonantVowel(n),
            (true, n) => SyllableShape::MiddleConsonantVowel(n),
        }
    }

    /// Onset members that belong to the previous word.
    pub fn previous_word_cluster(&self) -> &[String] {
        &self.cluster[..self.prev_word_consonants.min(self.cluster.len())]
    }
}

/// Coda of the last syllable of a phrase.
#[derive(Debug, Clone, PartialEq)]
pub struct Ending {
    /// Last vowel of the group.
    pub prev_vowel: String,
    /// Coda consonants.
    pub cluster: Vec<String>,
    /// Tone of the last note.
    pub tone: i32,
    /// Offset of the group end from the group start.
    pub position: Tick,
    /// Duration of the last syllable, including continuation notes.
    pub duration: Tick,
}

impl Ending {
    /// Classify the ending.
    pub fn shape(&self) -> EndingShape {
        match self.cluster.len() {
            0 => EndingShape::None,
            1 => EndingShape::One,
            _ => EndingShape::Many,
        }
    }
}

/// A note after extension folding and splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyllableNote {
    /// Tone.
    pub tone: i32,
    /// Duration in ticks.
    pub duration: Tick,
}

/// Symbols of a group laid over its notes.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// Extracted symbols.
    pub symbols: Vec<Symbol>,
    /// Indices of vowels in `symbols`. Never empty.
    pub vowels: Vec<usize>,
    /// One entry per syllable slot, at least as many as `vowels`.
    pub notes: Vec<SyllableNote>,
}

/// Cuts note groups into syllables and endings.
pub struct Segmenter<'a> {
    config: &'a ResolverConfig,
    g2p: &'a dyn G2p,
}

impl<'a> Segmenter<'a> {
    /// Create a segmenter.
    pub fn new(config: &'a ResolverConfig, g2p: &'a dyn G2p) -> Self {
        Self { config, g2p }
    }

    /// Extract and lay out the symbols of a group.
    ///
    /// `None` when the lead note has no phonetic structure: a forced alias,
    /// a tail or silence lyric, or nothing extractable.
    pub fn analyze(&self, notes: &[Note]) -> Option<Analysis> {
        let lead = notes.first()?;
        if lead.forced_alias().is_some() || lead.is_tail() || self.config.is_silence(&lead.lyric) {
            return None;
        }
        let symbols = extract(lead, self.config, self.g2p);
        if symbols.is_empty() {
            return None;
        }

        let mut vowels: Vec<usize> = symbols
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_vowel())
            .map(|(i, _)| i)
            .collect();
        if vowels.is_empty() {
            vowels.push(symbols.len() - 1);
        }

        let mut slots: Vec<SyllableNote> = Vec::with_capacity(notes.len());
        for note in notes {
            match slots.last_mut() {
                Some(prev) if note.is_extension() => prev.duration += note.duration,
                _ => slots.push(SyllableNote {
                    tone: note.tone,
                    duration: note.duration,
                }),
            }
        }
        if slots.len() < vowels.len() {
            split_last(&mut slots, vowels.len());
        }

        Some(Analysis {
            symbols,
            vowels,
            notes: slots,
        })
    }

    /// Syllables of a group, optionally continuing from the previous group's ending.
    pub fn syllables(&self, notes: &[Note], prev: Option<&Ending>) -> Option<Vec<Syllable>> {
        let analysis = self.analyze(notes)?;
        Some(layout_syllables(&analysis, prev))
    }

    /// The coda left after the group's last vowel.
    pub fn ending(&self, notes: &[Note]) -> Option<Ending> {
        let analysis = self.analyze(notes)?;
        Some(layout_ending(&analysis))
    }
}

fn names(symbols: &[Symbol]) -> Vec<String> {
    symbols.iter().map(|s| s.name().to_string()).collect()
}

fn split_last(slots: &mut Vec<SyllableNote>, wanted: usize) {
    let Some(last) = slots.pop() else {
        return;
    };
    let parts = (wanted - slots.len()) as Tick;
    let each = last.duration / parts / SPLIT_QUANTUM * SPLIT_QUANTUM;
    for i in 0..parts {
        let duration = if i == parts - 1 {
            last.duration - each * (parts - 1)
        } else {
            each
        };
        slots.push(SyllableNote {
            tone: last.tone,
            duration,
        });
    }
}

/// Lay syllables over an analysis.
pub fn layout_syllables(analysis: &Analysis, prev: Option<&Ending>) -> Vec<Syllable> {
    let symbols = &analysis.symbols;
    let notes = &analysis.notes;
    let first_vowel = analysis.vowels[0];

    let mut syllables = Vec::with_capacity(analysis.vowels.len());
    let onset = names(&symbols[..first_vowel]);
    let vowel = symbols[first_vowel].name().to_string();
    syllables.push(match prev {
        Some(ending) => Syllable {
            prev_vowel: Some(ending.prev_vowel.clone()),
            cluster: ending.cluster.iter().cloned().chain(onset).collect(),
            vowel,
            tone: ending.tone,
            vowel_tone: notes[0].tone,
            position: 0,
            duration: Some(ending.duration),
            prev_word_consonants: ending.cluster.len(),
            can_extend: false,
        },
        None => Syllable {
            prev_vowel: None,
            cluster: onset,
            vowel,
            tone: notes[0].tone,
            vowel_tone: notes[0].tone,
            position: 0,
            duration: None,
            prev_word_consonants: 0,
            can_extend: false,
        },
    });

    let mut position = 0;
    for (n, pair) in analysis.vowels.windows(2).enumerate() {
        let (prev_i, i) = (pair[0], pair[1]);
        let note = n + 1;
        position += notes[note - 1].duration;
        syllables.push(Syllable {
            prev_vowel: Some(symbols[prev_i].name().to_string()),
            cluster: names(&symbols[prev_i + 1..i]),
            vowel: symbols[i].name().to_string(),
            tone: notes[note - 1].tone,
            vowel_tone: notes[note].tone,
            position,
            duration: Some(notes[note - 1].duration),
            prev_word_consonants: 0,
            can_extend: true,
        });
    }
    syllables
}

/// Coda of an analysis.
pub fn layout_ending(analysis: &Analysis) -> Ending {
    let last_vowel = analysis.vowels[analysis.vowels.len() - 1];
    let notes = &analysis.notes;
    Ending {
        prev_vowel: analysis.symbols[last_vowel].name().to_string(),
        cluster: names(&analysis.symbols[last_vowel + 1..]),
        tone: notes.last().map_or(0, |n| n.tone),
        position: notes.iter().map(|n| n.duration).sum(),
        duration: notes[analysis.vowels.len() - 1..]
            .iter()
            .map(|n| n.duration)
            .sum(),
    }
}
