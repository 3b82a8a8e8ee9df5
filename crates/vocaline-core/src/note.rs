//! Notes, note groups, and emitted phoneme events.
//!
//! Positions and durations are in ticks. Emitted [`PhonemeEvent`] positions
//! are relative to the start of the group's lead note and may be negative
//! (pre-utterance into the previous note).

/// Time in sequencer ticks.
pub type Tick = i64;

/// Per-output-index override supplied by the host.
///
/// `index` addresses the n-th emitted event of the group, before the final
/// sort by position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PositionAttribute {
    /// Output index this attribute applies to.
    pub index: usize,
    /// Voice color (subbank) to prefer.
    pub voice_color: Option<String>,
    /// Semitones added to the covering note's tone for lookup.
    pub tone_shift: i32,
    /// Alternate take number, tried as `"<alias><n>"`.
    pub alternate: Option<u32>,
    /// Multiplier applied to the sample's transition width.
    pub consonant_stretch: Option<f64>,
}

impl PositionAttribute {
    /// Attribute for one output index with no overrides.
    pub fn at(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Set the voice color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.voice_color = Some(color.into());
        self
    }

    /// Set the tone shift.
    pub fn with_tone_shift(mut self, shift: i32) -> Self {
        self.tone_shift = shift;
        self
    }

    /// Set the alternate take.
    pub fn with_alternate(mut self, alternate: u32) -> Self {
        self.alternate = Some(alternate);
        self
    }

    /// Set the consonant stretch ratio.
    pub fn with_stretch(mut self, ratio: f64) -> Self {
        self.consonant_stretch = Some(ratio);
        self
    }
}

/// A note as supplied by the host.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Note {
    /// Lyric text.
    pub lyric: String,
    /// Whitespace-separated symbols overriding dictionary lookup.
    pub phonetic_hint: Option<String>,
    /// MIDI-style tone (60 = C4).
    pub tone: i32,
    /// Absolute start tick.
    pub position: Tick,
    /// Length in ticks.
    pub duration: Tick,
    /// Per-output-index overrides. Only the lead note's list is consulted.
    pub attributes: Vec<PositionAttribute>,
}

impl Note {
    /// Create a note with no hint and no attributes.
    pub fn new(lyric: impl Into<String>, tone: i32, position: Tick, duration: Tick) -> Self {
        Self {
            lyric: lyric.into(),
            phonetic_hint: None,
            tone,
            position,
            duration,
            attributes: Vec::new(),
        }
    }

    /// Attach a phonetic hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.phonetic_hint = Some(hint.into());
        self
    }

    /// Attach a position attribute.
    pub fn with_attribute(mut self, attribute: PositionAttribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// End tick.
    pub fn end(&self) -> Tick {
        self.position + self.duration
    }

    /// Attribute for an output index, if the host supplied one.
    pub fn attribute(&self, index: usize) -> Option<&PositionAttribute> {
        self.attributes.iter().find(|a| a.index == index)
    }

    /// `+~` / `+*` continuation that extends the previous vowel.
    pub fn is_extension(&self) -> bool {
        self.lyric.starts_with("+~") || self.lyric.starts_with("+*")
    }

    /// `+N` continuation pinning the N-th symbol (1-based) to this note's start.
    ///
    /// Returns the zero-based symbol index.
    pub fn alignment_index(&self) -> Option<usize> {
        let digits = self.lyric.strip_prefix('+')?;
        let n: usize = digits.parse().ok()?;
        n.checked_sub(1)
    }

    /// `?alias` lyric that bypasses resolution.
    pub fn forced_alias(&self) -> Option<&str> {
        self.lyric.strip_prefix('?')
    }

    /// `-` lyric that releases the previous note's last symbol.
    pub fn is_tail(&self) -> bool {
        self.lyric == "-"
    }
}

/// One output event: a voicebank alias at an offset from the lead note's start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonemeEvent {
    /// Voicebank alias.
    pub alias: String,
    /// Offset in ticks from the lead note's start.
    pub position: Tick,
}

impl PhonemeEvent {
    /// Create an event.
    pub fn new(alias: impl Into<String>, position: Tick) -> Self {
        Self {
            alias: alias.into(),
            position,
        }
    }
}

/// A lead note with its continuation notes and the neighbouring context.
///
/// `prev`/`next` are the closest groups in the score regardless of gaps;
/// `prev_neighbour`/`next_neighbour` are only set when the groups touch.
#[derive(Debug, Clone, Copy)]
pub struct NoteGroup<'a> {
    /// Lead note followed by its continuation notes.
    pub notes: &'a [Note],
    /// Last note of the previous group, if any.
    pub prev: Option<&'a Note>,
    /// Lead note of the next group, if any.
    pub next: Option<&'a Note>,
    /// Last note of the previous group when it ends where this one starts.
    pub prev_neighbour: Option<&'a Note>,
    /// Lead note of the next group when it starts where this one ends.
    pub next_neighbour: Option<&'a Note>,
    /// The whole touching previous group. Empty when there is none.
    pub prev_neighbours: &'a [Note],
}

impl<'a> NoteGroup<'a> {
    /// A group with no neighbours.
    pub fn new(notes: &'a [Note]) -> Self {
        Self {
            notes,
            prev: None,
            next: None,
            prev_neighbour: None,
            next_neighbour: None,
            prev_neighbours: &[],
        }
    }

    /// Set the previous group. `touching` marks it as a neighbour.
    pub fn with_prev(mut self, group: &'a [Note], touching: bool) -> Self {
        self.prev = group.last();
        if touching {
            self.prev_neighbour = group.last();
            self.prev_neighbours = group;
        }
        self
    }

    /// Set the next group's lead note. `touching` marks it as a neighbour.
    pub fn with_next(mut self, note: &'a Note, touching: bool) -> Self {
        self.next = Some(note);
        if touching {
            self.next_neighbour = Some(note);
        }
        self
    }

    /// Lead note.
    pub fn lead(&self) -> Option<&'a Note> {
        self.notes.first()
    }

    /// Sum of all note durations.
    pub fn total_duration(&self) -> Tick {
        self.notes.iter().map(|n| n.duration).sum()
    }
}
