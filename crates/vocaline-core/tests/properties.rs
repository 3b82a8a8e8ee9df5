//! Property-based tests for the resolution and timing engine.
//!
//! Random symbol sequences and note layouts are pushed through the whole
//! pipeline against sparse voicebanks to check determinism, termination,
//! clamping and graceful degradation.

use std::sync::Arc;

use proptest::prelude::*;
use vocaline_core::{
    AliasSet, Alphabet, ConsonantClass, DictionaryG2p, Note, NoteGroup, Phonemizer,
    ResolverConfigBuilder, Tick, TimingPolicy, clamp_widths,
};

const SYMBOLS: &[&str] = &["a", "i", "o", "k", "t", "s", "n", "r"];

fn alphabet() -> Alphabet {
    Alphabet::new()
        .with_vowels(["a", "i", "o"])
        .with_consonants(ConsonantClass::Stop, ["k", "t"])
        .with_consonants(ConsonantClass::Fricative, ["s"])
        .with_consonants(ConsonantClass::Nasal, ["n"])
        .with_consonants(ConsonantClass::Liquid, ["r"])
}

fn phonemizer(bank: &AliasSet, extend: bool) -> Phonemizer {
    let config = ResolverConfigBuilder::new()
        .alphabet(alphabet())
        .policy(TimingPolicy {
            extend_same_vowel: extend,
            ..TimingPolicy::default()
        })
        .attach(bank);
    Phonemizer::new(Arc::new(config), Arc::new(DictionaryG2p::new()))
}

fn hint() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(SYMBOLS), 1..8).prop_map(|s| s.join(" "))
}

fn bank() -> impl Strategy<Value = AliasSet> {
    let aliases = [
        "- ka", "ka", "a", "i", "o", "a -", "i -", "o -", "a k", "k", "s", "t", "t a", "s t",
        "a i", "n", "r", "o n", "n -", "- s",
    ];
    prop::sample::subsequence(aliases.to_vec(), 0..aliases.len())
        .prop_map(|aliases| AliasSet::from_aliases(aliases))
}

fn group_notes(hint: &str, durations: &[Tick]) -> Vec<Note> {
    let mut notes = Vec::with_capacity(durations.len());
    let mut position = 0;
    for (i, &duration) in durations.iter().enumerate() {
        let lyric = if i == 0 { "x" } else { "+" };
        let mut note = Note::new(lyric, 60 + i as i32, position, duration);
        if i == 0 {
            note = note.with_hint(hint);
        }
        notes.push(note);
        position += duration;
    }
    notes
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Identical input always yields identical output.
    #[test]
    fn deterministic(
        hint in hint(),
        bank in bank(),
        durations in prop::collection::vec(60i64..960, 1..4),
    ) {
        let p = phonemizer(&bank, true);
        let notes = group_notes(&hint, &durations);
        let first = p.process(&NoteGroup::new(&notes), &bank);
        let second = p.process(&NoteGroup::new(&notes), &bank);
        prop_assert_eq!(first, second);
    }

    /// Every group yields events, ordered by position, none past the group end.
    #[test]
    fn ordered_and_bounded(
        hint in hint(),
        bank in bank(),
        durations in prop::collection::vec(60i64..960, 1..4),
    ) {
        let p = phonemizer(&bank, true);
        let notes = group_notes(&hint, &durations);
        let total: Tick = durations.iter().sum();
        let events = p.process(&NoteGroup::new(&notes), &bank);
        prop_assert!(!events.is_empty());
        for pair in events.windows(2) {
            prop_assert!(pair[0].position <= pair[1].position);
        }
        for event in &events {
            prop_assert!(event.position <= total);
            prop_assert!(!event.alias.is_empty());
        }
    }

    /// Leading samples of an interior group stay within half of the previous note.
    #[test]
    fn lead_clamp_holds(
        hint in hint(),
        bank in bank(),
        prev_duration in 60i64..960,
    ) {
        let p = phonemizer(&bank, true);
        let prev = [Note::new("x", 60, 0, prev_duration).with_hint("a")];
        let notes = group_notes(&hint, &[480]);
        let notes: Vec<Note> = notes
            .into_iter()
            .map(|mut n| {
                n.position += prev_duration;
                n
            })
            .collect();
        let group = NoteGroup::new(&notes).with_prev(&prev, true);
        for event in p.process(&group, &bank) {
            prop_assert!(event.position >= -(prev_duration / 2));
        }
    }

    /// Manually aligned groups keep the same bound on their leading symbols.
    #[test]
    fn aligned_lead_clamp_holds(
        hint in hint(),
        bank in bank(),
        prev_duration in 20i64..960,
        index in 1usize..8,
    ) {
        let p = phonemizer(&bank, true);
        let prev = [Note::new("x", 60, 0, prev_duration).with_hint("a")];
        let notes = [
            Note::new("x", 60, prev_duration, 480).with_hint(hint),
            Note::new(format!("+{index}"), 62, prev_duration + 480, 240),
        ];
        let group = NoteGroup::new(&notes).with_prev(&prev, true);
        for event in p.process(&group, &bank) {
            prop_assert!(event.position >= -(prev_duration / 2));
        }
    }

    /// With only bare vowels available, every vowel still sounds.
    #[test]
    fn degrades_to_vowels(
        vowels in prop::collection::vec(prop::sample::select(&["a", "i", "o"][..]), 1..5),
    ) {
        let bank = AliasSet::from_aliases(["a", "i", "o"]);
        let p = phonemizer(&bank, false);
        let hint = vowels.join(" ");
        let durations = vec![240; vowels.len()];
        let notes = group_notes(&hint, &durations);
        let events = p.process(&NoteGroup::new(&notes), &bank);
        let sounded: Vec<&str> = events.iter().map(|e| e.alias.as_str()).collect();
        prop_assert_eq!(sounded, vowels);
    }

    /// Clamped widths never exceed the cap and never grow.
    #[test]
    fn clamp_never_exceeds_cap(
        widths in prop::collection::vec(0i64..500, 1..6),
        cap in 0i64..1000,
        quantum in 1i64..20,
    ) {
        let mut clamped = widths.clone();
        clamp_widths(&mut clamped, cap, quantum);
        let sum: Tick = clamped.iter().sum();
        prop_assert!(sum <= cap.max(widths.iter().sum()));
        if widths.iter().sum::<Tick>() > cap {
            prop_assert!(sum <= cap);
        }
        for (before, after) in widths.iter().zip(&clamped) {
            prop_assert!(after <= before);
            prop_assert!(*after >= 0);
        }
    }
}
