//! Integration tests for table loading and singer attachment.

use std::fs;
use std::sync::Arc;

use tempfile::TempDir;
use vocaline_config::{
    LanguageTable, Severity, get_factory_table, has_errors, list_tables_in_dir, load_for_singer,
    singer_override, table_name_from_path,
};
use vocaline_core::{AliasSet, Note, NoteGroup, PhonemeEvent, Phonemizer};

fn phonemizer(table: &LanguageTable, bank: &AliasSet) -> Phonemizer {
    let report = load_for_singer(table, None, bank);
    assert!(!has_errors(&report.diagnostics));
    Phonemizer::new(Arc::new(report.config), Arc::new(report.g2p))
}

#[test]
fn arpasing_dictionary_word() {
    let table = get_factory_table("arpasing").unwrap();
    let bank = AliasSet::from_aliases(["- l aa", "aa -"]);
    let notes = [Note::new("la", 60, 0, 480)];
    let events = phonemizer(&table, &bank).process(&NoteGroup::new(&notes), &bank);
    assert_eq!(
        events,
        [PhonemeEvent::new("- l aa", 0), PhonemeEvent::new("aa -", 384)]
    );
}

#[test]
fn cvvc_spelled_word_over_three_notes() {
    let table = get_factory_table("cvvc").unwrap();
    let bank = AliasSet::from_aliases(["- sa", "a k", "ku", "u r", "ra", "a -"]);
    let notes = [
        Note::new("sakura", 60, 0, 480),
        Note::new("+", 62, 480, 480),
        Note::new("+", 64, 960, 480),
    ];
    let events = phonemizer(&table, &bank).process(&NoteGroup::new(&notes), &bank);
    let expected = [
        PhonemeEvent::new("- sa", 0),
        PhonemeEvent::new("a k", 420),
        PhonemeEvent::new("ku", 480),
        PhonemeEvent::new("u r", 930),
        PhonemeEvent::new("ra", 960),
        PhonemeEvent::new("a -", 1344),
    ];
    assert_eq!(events, expected);
}

#[test]
fn user_table_file_with_problems_still_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tiny.toml");
    fs::write(
        &path,
        r#"
name = "tiny"
repairs = ["nonsense"]

[[symbols]]
symbol = "a"
type = "vowel"

[[symbols]]
symbol = "t"
type = "stop"

[dictionary]
ta = "t a"
"#,
    )
    .unwrap();

    let found = list_tables_in_dir(dir.path());
    assert_eq!(found.len(), 1);
    assert_eq!(table_name_from_path(&found[0]).as_deref(), Some("tiny"));

    let table = LanguageTable::load(&found[0]).unwrap();
    let bank = AliasSet::from_aliases(["- ta"]);
    let report = load_for_singer(&table, None, &bank);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics[0].severity, Severity::Error);
    assert_eq!(report.diagnostics[0].location, "repairs[0]");

    let p = Phonemizer::new(Arc::new(report.config), Arc::new(report.g2p));
    let notes = [Note::new("ta", 60, 0, 480)];
    let events = p.process(&NoteGroup::new(&notes), &bank);
    assert_eq!(events, [PhonemeEvent::new("- ta", 0)]);
}

#[test]
fn singer_override_changes_resolution() {
    let dir = TempDir::new().unwrap();
    fs::write(
        singer_override(dir.path()),
        r#"
[candidates]
starting_onset = ["{c}{v}"]
"#,
    )
    .unwrap();

    let table = get_factory_table("cvvc").unwrap();
    let bank = AliasSet::from_aliases(["- ka", "ka"]);
    let report = load_for_singer(&table, Some(dir.path()), &bank);
    assert!(report.diagnostics.is_empty());
    let p = Phonemizer::new(Arc::new(report.config), Arc::new(report.g2p));
    let notes = [Note::new("ka", 60, 0, 480)];
    let events = p.process(&NoteGroup::new(&notes), &bank);
    assert_eq!(events[0].alias, "ka");
}
