//! The per-group entry point.
//!
//! [`Phonemizer::process`] runs the whole pipeline for one note group:
//! special lyrics first (`?alias`, `-`, silence tokens), then either the
//! syllable path (segment, resolve, allocate) or the manual alignment path
//! when the group carries `+N` notes, and finally composition.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vocaline_core::{
//!     AliasSet, Alphabet, ConsonantClass, DictionaryG2p, Note, NoteGroup, Phonemizer,
//!     ResolverConfigBuilder,
//! };
//!
//! let bank = AliasSet::from_aliases(["- ka", "a", "a -"]);
//! let config = ResolverConfigBuilder::new()
//!     .alphabet(
//!         Alphabet::new()
//!             .with_vowels(["a"])
//!             .with_consonants(ConsonantClass::Stop, ["k"]),
//!     )
//!     .attach(&bank);
//! let dictionary = DictionaryG2p::new().with_entry("ka", "k a");
//! let phonemizer = Phonemizer::new(Arc::new(config), Arc::new(dictionary));
//!
//! let notes = [Note::new("ka", 60, 0, 480)];
//! let events = phonemizer.process(&NoteGroup::new(&notes), &bank);
//! assert_eq!(events[0].alias, "- ka");
//! assert_eq!(events[0].position, 0);
//! assert_eq!(events[1].alias, "a -");
//! assert_eq!(events[1].position, 384);
//! ```

use std::sync::Arc;

use crate::allocate::{Allocator, align};
use crate::compose::{PlacedSample, compose};
use crate::config::ResolverConfig;
use crate::g2p::G2p;
use crate::note::{Note, NoteGroup, PhonemeEvent};
use crate::query::{AliasQuery, MemoQuery};
use crate::resolve::AliasResolver;
use crate::segment::{Segmenter, layout_ending, layout_syllables};
use crate::symbol::SymbolKind;

/// Tail symbol appended to manually aligned groups at phrase end.
const RELEASE: &str = "-";

/// The phonemizer: shared configuration plus a dictionary chain.
///
/// Holds no per-call state; `process` may run concurrently from several
/// threads against the same instance.
#[derive(Clone)]
pub struct Phonemizer {
    config: Arc<ResolverConfig>,
    g2p: Arc<dyn G2p>,
}

impl Phonemizer {
    /// Create a phonemizer.
    pub fn new(config: Arc<ResolverConfig>, g2p: Arc<dyn G2p>) -> Self {
        Self { config, g2p }
    }

    /// The resolver configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Turn one note group into ordered phoneme events.
    ///
    /// Never fails: unresolvable pieces degrade to bare symbols and lyrics
    /// without phonetic structure pass through as one literal event.
    pub fn process(&self, group: &NoteGroup<'_>, query: &dyn AliasQuery) -> Vec<PhonemeEvent> {
        let Some(lead) = group.lead() else {
            return Vec::new();
        };
        let memo = MemoQuery::new(query);

        if let Some(alias) = lead.forced_alias() {
            return vec![PhonemeEvent::new(alias, 0)];
        }
        if lead.is_tail() {
            return self.tail(group, lead, &memo);
        }
        if self.config.is_silence(&lead.lyric) {
            return passthrough(lead);
        }
        if group.notes[1..].iter().any(|n| n.alignment_index().is_some()) {
            return self.aligned(group, &memo);
        }

        let segmenter = Segmenter::new(&self.config, self.g2p.as_ref());
        let Some(analysis) = segmenter.analyze(group.notes) else {
            #[cfg(feature = "tracing")]
            tracing::debug!("process: passing '{}' through", lead.lyric);
            return passthrough(lead);
        };
        let prev_ending = self
            .context(group.prev_neighbours)
            .and_then(|notes| segmenter.ending(notes));
        let syllables = layout_syllables(&analysis, prev_ending.as_ref());

        let resolver = AliasResolver::new(&self.config, &memo);
        let allocator = Allocator::new(&self.config, &memo);
        let total = group.total_duration();
        let mut placed: Vec<PlacedSample> = Vec::new();

        for syllable in &syllables {
            let samples = resolver.syllable(syllable);
            let stretch = stretches(lead, placed.len(), samples.len());
            let offsets = allocator.allocate_syllable(&samples, syllable, total, &stretch);
            placed.extend(
                samples
                    .into_iter()
                    .zip(offsets)
                    .map(|(s, at)| PlacedSample::new(s.alias, at)),
            );
        }

        if self.phrase_ends(group) {
            let ending = layout_ending(&analysis);
            let samples = resolver.ending(&ending);
            let stretch = stretches(lead, placed.len(), samples.len());
            let offsets = allocator.allocate_ending(&samples, &ending, &stretch);
            placed.extend(
                samples
                    .into_iter()
                    .zip(offsets)
                    .map(|(s, at)| PlacedSample::new(s.alias, at)),
            );
        }

        compose(placed, group, &memo)
    }

    /// A neighbouring group that carries phrase context, if any.
    fn context<'n>(&self, notes: &'n [Note]) -> Option<&'n [Note]> {
        let lead = notes.first()?;
        (!self.config.is_silence(&lead.lyric)).then_some(notes)
    }

    /// Whether this group closes its phrase and must emit an ending.
    fn phrase_ends(&self, group: &NoteGroup<'_>) -> bool {
        match group.next_neighbour {
            None => true,
            Some(next) => next.forced_alias().is_some() || self.config.is_silence(&next.lyric),
        }
    }

    /// A `-` note closes the previous word: its whole ending, coda included,
    /// is laid out inside the tail note.
    fn tail(&self, group: &NoteGroup<'_>, lead: &Note, query: &dyn AliasQuery) -> Vec<PhonemeEvent> {
        let segmenter = Segmenter::new(&self.config, self.g2p.as_ref());
        let Some(analysis) = self
            .context(group.prev_neighbours)
            .and_then(|notes| segmenter.analyze(notes))
        else {
            return passthrough(lead);
        };
        let mut ending = layout_ending(&analysis);
        ending.tone = lead.tone;
        ending.position = lead.duration;
        ending.duration = lead.duration;

        let samples = AliasResolver::new(&self.config, query).ending(&ending);
        if samples.is_empty() {
            let last = analysis.symbols.last().map_or("", |s| s.name());
            let alias = format!("{last} {RELEASE}");
            let color = lead.attribute(0).and_then(|a| a.voice_color.as_deref());
            let mapped = query
                .resolve(&alias, lead.tone, color)
                .map_or(alias, |oto| oto.alias);
            return vec![PhonemeEvent::new(mapped, 0)];
        }
        let stretch = stretches(lead, 0, samples.len());
        let offsets = Allocator::new(&self.config, query).allocate_ending(&samples, &ending, &stretch);
        let first = offsets.first().copied().unwrap_or(0);
        let placed = samples
            .into_iter()
            .zip(offsets)
            .map(|(s, at)| PlacedSample::new(s.alias, at - first))
            .collect();
        compose(placed, group, query)
    }

    fn aligned(&self, group: &NoteGroup<'_>, query: &dyn AliasQuery) -> Vec<PhonemeEvent> {
        let Some(lead) = group.lead() else {
            return Vec::new();
        };
        let segmenter = Segmenter::new(&self.config, self.g2p.as_ref());
        let Some(analysis) = segmenter.analyze(group.notes) else {
            return passthrough(lead);
        };
        let mut names: Vec<String> = analysis
            .symbols
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        let mut kinds: Vec<SymbolKind> = analysis.symbols.iter().map(|s| s.kind()).collect();
        let release = self.phrase_ends(group);
        if release {
            names.push(RELEASE.to_string());
            kinds.push(SymbolKind::Consonant);
        }
        let context = self.context(group.prev_neighbours);
        let prev_analysis = context.and_then(|notes| segmenter.analyze(notes));
        let prev_duration = match &prev_analysis {
            Some(a) => Some(layout_ending(a).duration),
            None => context.and_then(<[Note]>::last).map(|n| n.duration),
        };
        let offsets = align(&kinds, group.notes, self.config.policy(), prev_duration);

        let resolver = AliasResolver::new(&self.config, query);
        let mut prev: Option<String> = prev_analysis
            .as_ref()
            .and_then(|a| a.symbols.last().map(|s| s.name().to_string()));
        let mut placed = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let tone = covering_tone(group, offsets[i]);
            let alias = if release && i == names.len() - 1 {
                prev.as_deref()
                    .and_then(|p| resolver.aligned_release(p, tone))
            } else {
                Some(resolver.aligned(prev.as_deref(), name, tone))
            };
            if let Some(alias) = alias {
                placed.push(PlacedSample::new(alias, offsets[i]));
            }
            prev = Some(name.clone());
        }
        compose(placed, group, query)
    }
}

fn passthrough(lead: &Note) -> Vec<PhonemeEvent> {
    vec![PhonemeEvent::new(lead.lyric.clone(), 0)]
}

/// Stretch ratios for output slots `from..from + len`.
fn stretches(lead: &Note, from: usize, len: usize) -> Vec<f64> {
    (from..from + len)
        .map(|i| {
            lead.attribute(i)
                .and_then(|a| a.consonant_stretch)
                .unwrap_or(1.0)
        })
        .collect()
}

/// Tone of the note sounding at `offset`.
fn covering_tone(group: &NoteGroup<'_>, offset: i64) -> i32 {
    let Some(lead) = group.lead() else {
        return 0;
    };
    if offset < 0 {
        return group.prev_neighbours.last().map_or(lead.tone, |n| n.tone);
    }
    group
        .notes
        .iter()
        .take_while(|n| n.position - lead.position <= offset)
        .last()
        .map_or(lead.tone, |n| n.tone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolverConfigBuilder;
    use crate::g2p::DictionaryG2p;
    use crate::note::PositionAttribute;
    use crate::query::AliasSet;
    use crate::symbol::{Alphabet, ConsonantClass};

    fn phonemizer(bank: &AliasSet) -> Phonemizer {
        let config = ResolverConfigBuilder::new()
            .alphabet(
                Alphabet::new()
                    .with_vowels(["a", "i", "o"])
                    .with_consonants(ConsonantClass::Stop, ["k", "t"])
                    .with_consonants(ConsonantClass::Fricative, ["s"]),
            )
            .attach(bank);
        let dict = DictionaryG2p::new()
            .with_entry("ka", "k a")
            .with_entry("to", "t o")
            .with_entry("as", "a s")
            .with_entry("kat", "k a t");
        Phonemizer::new(Arc::new(config), Arc::new(dict))
    }

    fn aliases(events: &[PhonemeEvent]) -> Vec<&str> {
        events.iter().map(|e| e.alias.as_str()).collect()
    }

    #[test]
    fn forced_alias_bypasses_everything() {
        let bank = AliasSet::new();
        let notes = [Note::new("?whatever x", 60, 0, 480)];
        let events = phonemizer(&bank).process(&NoteGroup::new(&notes), &bank);
        assert_eq!(events, [PhonemeEvent::new("whatever x", 0)]);
    }

    #[test]
    fn silence_and_unknown_pass_through() {
        let bank = AliasSet::new();
        let p = phonemizer(&bank);
        let notes = [Note::new("R", 60, 0, 480)];
        assert_eq!(p.process(&NoteGroup::new(&notes), &bank), [PhonemeEvent::new("R", 0)]);
        let notes = [Note::new("Zzz", 60, 0, 480)];
        assert_eq!(p.process(&NoteGroup::new(&notes), &bank), [PhonemeEvent::new("Zzz", 0)]);
    }

    #[test]
    fn empty_group_yields_nothing() {
        let bank = AliasSet::new();
        assert!(phonemizer(&bank).process(&NoteGroup::new(&[]), &bank).is_empty());
    }

    #[test]
    fn tail_note_releases_previous_symbol() {
        let bank = AliasSet::from_aliases(["a -"]);
        let p = phonemizer(&bank);
        let prev = [Note::new("ka", 60, 0, 480)];
        let notes = [Note::new("-", 60, 480, 240)];
        let group = NoteGroup::new(&notes).with_prev(&prev, true);
        assert_eq!(p.process(&group, &bank), [PhonemeEvent::new("a -", 0)]);

        let lonely = NoteGroup::new(&notes);
        assert_eq!(p.process(&lonely, &bank), [PhonemeEvent::new("-", 0)]);
    }

    #[test]
    fn tail_note_carries_coda_of_previous_word() {
        let bank = AliasSet::from_aliases(["- a", "a s", "s -", "a"]);
        let p = phonemizer(&bank);
        let word = [Note::new("as", 60, 0, 480)];
        let tail = [Note::new("-", 60, 480, 240)];

        let g1 = NoteGroup::new(&word).with_next(&tail[0], true);
        assert_eq!(aliases(&p.process(&g1, &bank)), ["- a"]);

        let g2 = NoteGroup::new(&tail).with_prev(&word, true);
        assert_eq!(
            p.process(&g2, &bank),
            [PhonemeEvent::new("a s", 0), PhonemeEvent::new("s -", 75)]
        );
    }

    #[test]
    fn continuing_phrase_skips_ending_and_carries_coda() {
        let bank = AliasSet::from_aliases(["- a", "a s", "s", "to", "o -"]);
        let p = phonemizer(&bank);
        let first = [Note::new("as", 60, 0, 480)];
        let second = [Note::new("to", 60, 480, 480)];

        let g1 = NoteGroup::new(&first).with_next(&second[0], true);
        assert_eq!(aliases(&p.process(&g1, &bank)), ["- a"]);

        let g2 = NoteGroup::new(&second).with_prev(&first, true);
        let events = p.process(&g2, &bank);
        assert_eq!(aliases(&events), ["a s", "s", "to", "o -"]);
        assert!(events[0].position < 0);
        assert!(events[0].position >= -240);
    }

    #[test]
    fn silence_neighbour_ends_phrase() {
        let bank = AliasSet::from_aliases(["- ka", "a -"]);
        let p = phonemizer(&bank);
        let notes = [Note::new("ka", 60, 0, 480)];
        let rest = [Note::new("R", 60, 480, 480)];
        let group = NoteGroup::new(&notes).with_next(&rest[0], true);
        assert_eq!(aliases(&p.process(&group, &bank)), ["- ka", "a -"]);

        let after = [Note::new("ka", 60, 960, 480)];
        let group = NoteGroup::new(&after).with_prev(&rest, true);
        assert_eq!(aliases(&p.process(&group, &bank)), ["- ka", "a -"]);
    }

    #[test]
    fn stretch_attribute_widens_slot() {
        let bank = AliasSet::from_aliases(["- a", "a k", "ka", "a -"]);
        let p = phonemizer(&bank);
        let first = [Note::new("a", 60, 0, 480).with_hint("a")];
        let plain = [Note::new("ka", 60, 480, 480)];
        let stretched =
            [Note::new("ka", 60, 480, 480).with_attribute(PositionAttribute::at(0).with_stretch(2.0))];

        let base = p.process(&NoteGroup::new(&plain).with_prev(&first, true), &bank);
        let wide = p.process(&NoteGroup::new(&stretched).with_prev(&first, true), &bank);
        assert_eq!(base[0].alias, "a k");
        assert_eq!(base[0].position, -60);
        assert_eq!(wide[0].position, -120);
    }

    #[test]
    fn manual_alignment_clamps_into_short_previous_note() {
        let bank = AliasSet::from_aliases(["- a", "a"]);
        let p = phonemizer(&bank);
        let prev = [Note::new("a", 60, 0, 60).with_hint("a")];
        let notes = [
            Note::new("x", 60, 60, 480).with_hint("s t k a"),
            Note::new("+4", 60, 540, 240),
        ];
        let group = NoteGroup::new(&notes).with_prev(&prev, true);
        let events = p.process(&group, &bank);
        let positions: Vec<i64> = events.iter().map(|e| e.position).collect();
        assert_eq!(&positions[..4], [-30, 140, 310, 480]);
        assert!(events.iter().all(|e| e.position >= -30));
    }

    #[test]
    fn manual_alignment_path() {
        let bank = AliasSet::from_aliases(["- k", "k a", "a t", "t -"]);
        let p = phonemizer(&bank);
        let notes = [Note::new("kat", 60, 0, 480), Note::new("+3", 60, 480, 240)];
        let events = p.process(&NoteGroup::new(&notes), &bank);
        assert_eq!(aliases(&events), ["- k", "k a", "a t", "t -"]);
        let positions: Vec<i64> = events.iter().map(|e| e.position).collect();
        assert_eq!(positions, [-60, 0, 480, 600]);
    }
}
