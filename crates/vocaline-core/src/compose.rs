//! Final event composition.
//!
//! Each placed sample is re-resolved under its output slot's overrides:
//! the tone of the note covering the sample plus the attribute's tone
//! shift, the attribute's voice color, and its alternate take. When that
//! exact combination is missing the alias is looked up again under the
//! plain tone, and kept literally if even that fails. Events are then
//! sorted by offset.

use crate::note::{NoteGroup, PhonemeEvent, Tick};
use crate::query::AliasQuery;

/// A chosen alias at its offset, before per-slot overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedSample {
    /// Alias from the resolver.
    pub alias: String,
    /// Offset from the lead note's start.
    pub position: Tick,
}

impl PlacedSample {
    /// Create a placed sample.
    pub fn new(alias: impl Into<String>, position: Tick) -> Self {
        Self {
            alias: alias.into(),
            position,
        }
    }
}

/// Apply per-slot overrides and order the result.
pub fn compose(
    samples: Vec<PlacedSample>,
    group: &NoteGroup<'_>,
    query: &dyn AliasQuery,
) -> Vec<PhonemeEvent> {
    let Some(lead) = group.lead() else {
        return Vec::new();
    };
    let notes = group.notes;

    let mut note_index = 0;
    let mut events: Vec<PhonemeEvent> = samples
        .into_iter()
        .enumerate()
        .map(|(i, sample)| {
            while note_index < notes.len() - 1
                && notes[note_index].position - lead.position < sample.position
            {
                note_index += 1;
            }
            let note_start = notes[note_index].position - lead.position;
            let tone = if sample.position < note_start {
                if note_index > 0 {
                    notes[note_index - 1].tone
                } else {
                    group.prev_neighbours.last().map_or(lead.tone, |n| n.tone)
                }
            } else {
                notes[note_index].tone
            };

            let alias = match lead.attribute(i) {
                Some(attr) => {
                    let shifted = tone + attr.tone_shift;
                    let color = attr.voice_color.as_deref();
                    let mut names = Vec::with_capacity(2);
                    if let Some(alt) = attr.alternate {
                        names.push(format!("{}{alt}", sample.alias));
                    }
                    names.push(sample.alias.clone());
                    names
                        .iter()
                        .find_map(|name| query.resolve(name, shifted, color))
                        .or_else(|| query.resolve(&sample.alias, tone, None))
                        .map_or(sample.alias, |oto| oto.alias)
                }
                None => query
                    .resolve(&sample.alias, tone, None)
                    .map_or(sample.alias, |oto| oto.alias),
            };
            PhonemeEvent::new(alias, sample.position)
        })
        .collect();

    events.sort_by_key(|e| e.position);
    events
}
