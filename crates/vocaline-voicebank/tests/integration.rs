//! End-to-end tests: a voicebank directory on disk driving the phonemizer.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use vocaline_core::{
    Alphabet, ConsonantClass, DictionaryG2p, Note, NoteGroup, PhonemeEvent, Phonemizer,
    PositionAttribute, ResolverConfigBuilder, Timing,
};
use vocaline_voicebank::{COLOR_MAP_DIR, OTO_FILE, PREFIX_MAP_FILE, Voicebank, VoicebankQuery};

fn write_bank(root: &Path) {
    fs::write(
        root.join(OTO_FILE),
        "\
_ka.wav=- ka,0,80,-200,100,20
a_k.wav=a k,0,60,-150,62.5,15
ka.wav=ka,0,80,-200,90,20
a_R.wav=a -,0,40,-100,30,10
_kasoft.wav=- kasoft,0,80,-200,100,20
",
    )
    .unwrap();
    fs::create_dir(root.join("high")).unwrap();
    fs::write(root.join("high").join(OTO_FILE), "ka.wav=ka_H,0,80,-200,90,20\n").unwrap();
    fs::write(root.join(PREFIX_MAP_FILE), "C5\t\t_H\nC#5\t\t_H\nD5\t\t_H\n").unwrap();
    fs::create_dir(root.join(COLOR_MAP_DIR)).unwrap();
    fs::write(root.join(COLOR_MAP_DIR).join("soft.map"), "C4\t\t\n").unwrap();
}

fn phonemizer(query: &VoicebankQuery<'_>) -> Phonemizer {
    let config = ResolverConfigBuilder::new()
        .alphabet(
            Alphabet::new()
                .with_vowels(["a"])
                .with_consonants(ConsonantClass::Stop, ["k"]),
        )
        .attach(query);
    let dictionary = DictionaryG2p::new()
        .with_entry("ka", "k a")
        .with_entry("kaka", "k a k a");
    Phonemizer::new(Arc::new(config), Arc::new(dictionary))
}

#[test]
fn loads_directory() {
    let temp = TempDir::new().unwrap();
    write_bank(temp.path());
    let bank = Voicebank::load_dir(temp.path()).unwrap();
    assert_eq!(bank.len(), 6);
    assert_eq!(bank.get("ka_H").unwrap().wav, "high/ka.wav");
    assert_eq!(bank.subbanks().len(), 2);
}

#[test]
fn widths_come_from_preutterance_and_pitch_selects_subbank() {
    let temp = TempDir::new().unwrap();
    write_bank(temp.path());
    let bank = Voicebank::load_dir(temp.path()).unwrap();
    let query = VoicebankQuery::new(&bank, Timing::default());
    let p = phonemizer(&query);

    let notes = [Note::new("kaka", 60, 0, 480), Note::new("+", 72, 480, 480)];
    let events = p.process(&NoteGroup::new(&notes), &query);
    let expected = [
        PhonemeEvent::new("- ka", 0),
        // 62.5 ms at 120 bpm
        PhonemeEvent::new("a k", 420),
        PhonemeEvent::new("ka_H", 480),
        PhonemeEvent::new("a -", 864),
    ];
    assert_eq!(events, expected);
}

#[test]
fn voice_color_maps_through_color_subbank() {
    let temp = TempDir::new().unwrap();
    write_bank(temp.path());
    let bank = Voicebank::load_dir(temp.path()).unwrap();
    let query = VoicebankQuery::new(&bank, Timing::default());
    let p = phonemizer(&query);

    let notes = [Note::new("ka", 60, 0, 480)
        .with_attribute(PositionAttribute::at(0).with_color("soft"))];
    let events = p.process(&NoteGroup::new(&notes), &query);
    assert_eq!(
        events,
        [PhonemeEvent::new("- kasoft", 0), PhonemeEvent::new("a -", 384)]
    );
}

#[test]
fn missing_directory_is_an_error() {
    let temp = TempDir::new().unwrap();
    assert!(Voicebank::load_dir(temp.path().join("nope")).is_err());
}
