//! End-to-end tests for the phonemizer pipeline.

use std::sync::Arc;

use vocaline_core::{
    AliasSet, Alphabet, ConsonantClass, DictionaryG2p, Note, NoteGroup, PhonemeEvent, Phonemizer,
    ResolverConfigBuilder, Substitution,
};

fn alphabet() -> Alphabet {
    Alphabet::new()
        .with_vowels(["a", "i", "u", "e", "o", "eh", "ae"])
        .with_consonants(ConsonantClass::Stop, ["k", "t", "b"])
        .with_consonants(ConsonantClass::Fricative, ["s"])
        .with_consonants(ConsonantClass::Semivowel, ["y"])
}

fn phonemizer(bank: &AliasSet) -> Phonemizer {
    let config = ResolverConfigBuilder::new()
        .alphabet(alphabet())
        .repair(Substitution::parse("eh=ae").unwrap())
        .attach(bank);
    let dict = DictionaryG2p::new()
        .with_entry("ka", "k a")
        .with_entry("sta", "s t a")
        .with_entry("ai", "a i");
    Phonemizer::new(Arc::new(config), Arc::new(dict))
}

fn aliases(events: &[PhonemeEvent]) -> Vec<&str> {
    events.iter().map(|e| e.alias.as_str()).collect()
}

fn is_ordered(events: &[PhonemeEvent]) -> bool {
    events.windows(2).all(|w| w[0].position <= w[1].position)
}

#[test]
fn single_cv_note_with_sparse_bank() {
    let bank = AliasSet::from_aliases(["- ka", "a", "a -"]);
    let notes = [Note::new("ka", 60, 0, 480)];
    let events = phonemizer(&bank).process(&NoteGroup::new(&notes), &bank);
    assert_eq!(
        events,
        [PhonemeEvent::new("- ka", 0), PhonemeEvent::new("a -", 384)]
    );
}

#[test]
fn vowel_to_vowel_inside_one_group() {
    let bank = AliasSet::from_aliases(["- a", "a i", "i -"]);
    let notes = [Note::new("ai", 60, 0, 480), Note::new("+", 62, 480, 480)];
    let events = phonemizer(&bank).process(&NoteGroup::new(&notes), &bank);
    assert_eq!(aliases(&events), ["- a", "a i", "i -"]);
    assert_eq!(events[1].position, 480);
}

#[test]
fn vowel_to_vowel_across_groups() {
    let bank = AliasSet::from_aliases(["- a", "a i", "i", "ai"]);
    let p = phonemizer(&bank);
    let first = [Note::new("a", 60, 0, 480).with_hint("a")];
    let second = [Note::new("i", 60, 480, 480).with_hint("i")];
    let group = NoteGroup::new(&second).with_prev(&first, true);
    let events = p.process(&group, &bank);
    assert_eq!(events[0], PhonemeEvent::new("a i", 0));
}

#[test]
fn cluster_peels_to_singleton_and_onset() {
    let bank = AliasSet::from_aliases(["s", "t a"]);
    let notes = [Note::new("sta", 60, 0, 480)];
    let events = phonemizer(&bank).process(&NoteGroup::new(&notes), &bank);
    assert_eq!(aliases(&events), ["s", "t a"]);
    assert!(events[0].position < 0);
    assert!(events[0].position >= -240);
    assert_eq!(events[1].position, 0);
}

#[test]
fn unknown_hint_tokens_are_dropped() {
    let bank = AliasSet::from_aliases(["- ka", "a -"]);
    let notes = [Note::new("whatever", 60, 0, 480).with_hint("k zz a")];
    let events = phonemizer(&bank).process(&NoteGroup::new(&notes), &bank);
    assert_eq!(aliases(&events), ["- ka", "a -"]);
}

#[test]
fn repair_finds_substitute_coda() {
    let bank = AliasSet::from_aliases(["- eh", "ae b"]);
    let notes = [Note::new("x", 60, 0, 480).with_hint("eh b")];
    let events = phonemizer(&bank).process(&NoteGroup::new(&notes), &bank);
    assert_eq!(aliases(&events), ["- eh", "ae b"]);
}

#[test]
fn continuation_notes_lengthen_the_ending() {
    let bank = AliasSet::from_aliases(["- ka", "a -"]);
    let notes = [
        Note::new("ka", 60, 0, 480),
        Note::new("+~", 60, 480, 240),
        Note::new("+", 60, 720, 240),
    ];
    let events = phonemizer(&bank).process(&NoteGroup::new(&notes), &bank);
    assert_eq!(aliases(&events), ["- ka", "a -"]);
    assert_eq!(events[1].position, 960 - 960 / 5);
}

#[test]
fn passthrough_and_forced_alias() {
    let bank = AliasSet::new();
    let p = phonemizer(&bank);
    for lyric in ["R", "unknown"] {
        let notes = [Note::new(lyric, 60, 0, 480)];
        assert_eq!(
            p.process(&NoteGroup::new(&notes), &bank),
            [PhonemeEvent::new(lyric, 0)]
        );
    }
    let notes = [Note::new("?a_C4", 60, 0, 480)];
    assert_eq!(
        p.process(&NoteGroup::new(&notes), &bank),
        [PhonemeEvent::new("a_C4", 0)]
    );
}

#[test]
fn empty_bank_degrades_to_symbols() {
    let bank = AliasSet::new();
    let notes = [Note::new("sta", 60, 0, 480)];
    let events = phonemizer(&bank).process(&NoteGroup::new(&notes), &bank);
    assert_eq!(aliases(&events), ["s", "t", "a"]);
    assert!(is_ordered(&events));
}

#[test]
fn manual_alignment_with_glide() {
    let bank = AliasSet::from_aliases(["- k", "k y", "y a", "a -"]);
    let notes = [
        Note::new("x", 60, 0, 480).with_hint("k y a"),
        Note::new("+3", 60, 480, 240),
    ];
    let events = phonemizer(&bank).process(&NoteGroup::new(&notes), &bank);
    assert_eq!(aliases(&events), ["- k", "k y", "y a", "a -"]);
    // the glide takes the note-start pin
    assert_eq!(events[1].position, 0);
    assert_eq!(events[2].position, 480);
    assert!(events[0].position < 0);
}

#[test]
fn process_is_deterministic_and_shareable() {
    let bank = AliasSet::from_aliases(["- ka", "a k", "ka", "a -"]);
    let p = phonemizer(&bank);
    let notes = [
        Note::new("x", 60, 0, 480).with_hint("k a k a"),
        Note::new("+", 64, 480, 480),
    ];
    let expected = p.process(&NoteGroup::new(&notes), &bank);
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                assert_eq!(p.process(&NoteGroup::new(&notes), &bank), expected);
            });
        }
    });
}
