//! Pitch and color subbanks.
//!
//! Multi-pitch voicebanks record each alias several times and tell the
//! takes apart with a prefix or suffix (`"ka_C5"`, `"ka↑"`). A subbank
//! maps a tone range and voice color onto that decoration. `prefix.map`
//! lists one tone per line:
//!
//! ```text
//! C4<TAB><TAB>_C4
//! C#4<TAB><TAB>_C4
//! ```
//!
//! Lines sharing a prefix and suffix form one subbank. Maps under
//! `prefix/<color>.map` define the subbanks of a voice color; the color
//! name is prepended to their suffix.

use std::collections::BTreeSet;

/// Pitch classes by name, sharps and flats.
const NOTE_NAMES: [(&str, i32); 17] = [
    ("C", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
];

/// MIDI tone of a note name, with `C4` = 60.
///
/// ```
/// use vocaline_voicebank::parse_tone_name;
///
/// assert_eq!(parse_tone_name("C4"), Some(60));
/// assert_eq!(parse_tone_name("A#3"), Some(58));
/// assert_eq!(parse_tone_name("H2"), None);
/// ```
pub fn parse_tone_name(name: &str) -> Option<i32> {
    let name = name.trim();
    let split = match name.as_bytes().get(1) {
        Some(b'#' | b'b') => 2,
        Some(_) => 1,
        None => return None,
    };
    let (pitch, octave) = name.split_at_checked(split)?;
    let octave: i32 = octave.parse().ok()?;
    let class = NOTE_NAMES
        .iter()
        .find(|(n, _)| *n == pitch)
        .map(|(_, c)| *c)?;
    Some(12 * (octave + 1) + class)
}

/// Alias decoration for a tone range and voice color.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Subbank {
    /// Voice color; empty for the default color.
    pub color: String,
    /// Prepended to the alias.
    pub prefix: String,
    /// Appended to the alias.
    pub suffix: String,
    /// Tones this subbank covers. Empty covers every tone.
    pub tones: BTreeSet<i32>,
}

impl Subbank {
    /// Subbank covering every tone.
    pub fn new(color: impl Into<String>, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            prefix: prefix.into(),
            suffix: suffix.into(),
            tones: BTreeSet::new(),
        }
    }

    /// Restrict to an inclusive tone range.
    pub fn with_tones(mut self, low: i32, high: i32) -> Self {
        self.tones.extend(low..=high);
        self
    }

    /// Whether `tone` falls in this subbank.
    pub fn covers(&self, tone: i32) -> bool {
        self.tones.is_empty() || self.tones.contains(&tone)
    }

    /// Decorated form of `alias`.
    pub fn apply(&self, alias: &str) -> String {
        format!("{}{alias}{}", self.prefix, self.suffix)
    }

    /// Length of the decoration; longer decorations are tried first.
    pub fn decoration_len(&self) -> usize {
        self.prefix.len() + self.suffix.len()
    }

    /// Parse a `prefix.map`. `color` is empty for the root map.
    ///
    /// Lines that do not have three tab-separated fields or whose tone
    /// name does not parse are skipped. Subbanks come out in order of
    /// first appearance.
    pub fn parse_prefix_map(text: &str, color: &str) -> Vec<Subbank> {
        let mut out: Vec<Subbank> = Vec::new();
        for line in text.lines() {
            let fields: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
            let [tone, prefix, suffix] = fields.as_slice() else {
                continue;
            };
            let Some(tone) = parse_tone_name(tone) else {
                tracing::debug!("prefix map: skipping tone '{tone}'");
                continue;
            };
            let suffix = format!("{color}{suffix}");
            match out
                .iter_mut()
                .find(|s| s.prefix == *prefix && s.suffix == suffix)
            {
                Some(subbank) => {
                    subbank.tones.insert(tone);
                }
                None => out.push(Subbank {
                    color: color.to_string(),
                    prefix: (*prefix).to_string(),
                    suffix,
                    tones: BTreeSet::from([tone]),
                }),
            }
        }
        out
    }
}
