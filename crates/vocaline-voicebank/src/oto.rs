//! `oto.ini` records.
//!
//! Each line maps a sample file to an alias and its timing, in
//! milliseconds:
//!
//! ```text
//! wav=alias,offset,consonant,cutoff,preutter,overlap
//! ```
//!
//! An empty alias means the file stem, empty numbers mean zero.

use crate::error::VoicebankError;

/// One alias record.
#[derive(Debug, Clone, PartialEq)]
pub struct OtoEntry {
    /// Sample file, relative to the voicebank root.
    pub wav: String,
    /// Alias the engine asks for.
    pub alias: String,
    /// Start of the sample in the file.
    pub offset: f64,
    /// End of the fixed (unstretched) region.
    pub consonant: f64,
    /// End of the sample; negative values count from `offset`.
    pub cutoff: f64,
    /// How far before the note the sample starts.
    pub preutter: f64,
    /// Crossfade with the previous sample.
    pub overlap: f64,
}

const FIELDS: [&str; 5] = ["offset", "consonant", "cutoff", "preutter", "overlap"];

impl OtoEntry {
    /// Entry with zero timing.
    pub fn new(wav: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            wav: wav.into(),
            alias: alias.into(),
            offset: 0.0,
            consonant: 0.0,
            cutoff: 0.0,
            preutter: 0.0,
            overlap: 0.0,
        }
    }

    /// Builder for the two timings the engine reads.
    pub fn with_timing(mut self, preutter: f64, overlap: f64) -> Self {
        self.preutter = preutter;
        self.overlap = overlap;
        self
    }

    /// Parse one line.
    ///
    /// Blank lines and `#` comments (including `#Charaset:`) yield `None`.
    ///
    /// # Errors
    ///
    /// [`VoicebankError::MalformedOto`] when there is no `=` or a number
    /// does not parse.
    pub fn parse_line(line: &str) -> Result<Option<Self>, VoicebankError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let Some((wav, rest)) = line.split_once('=') else {
            return Err(VoicebankError::malformed(line, "missing '='"));
        };
        let wav = wav.trim();
        if wav.is_empty() {
            return Err(VoicebankError::malformed(line, "empty file name"));
        }

        let mut parts = rest.split(',');
        let alias = match parts.next().map(str::trim) {
            Some(alias) if !alias.is_empty() => alias.to_string(),
            _ => file_stem(wav).to_string(),
        };

        let mut values = [0.0; 5];
        for (value, name) in values.iter_mut().zip(FIELDS) {
            let Some(text) = parts.next().map(str::trim).filter(|t| !t.is_empty()) else {
                continue;
            };
            *value = text
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| VoicebankError::malformed(line, format!("bad {name} '{text}'")))?;
        }
        let [offset, consonant, cutoff, preutter, overlap] = values;

        Ok(Some(Self {
            wav: wav.to_string(),
            alias,
            offset,
            consonant,
            cutoff,
            preutter,
            overlap,
        }))
    }
}

fn file_stem(wav: &str) -> &str {
    wav.rsplit_once('.').map_or(wav, |(stem, _)| stem)
}
