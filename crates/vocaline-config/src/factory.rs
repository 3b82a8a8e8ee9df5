//! Factory tables bundled with the library.
//!
//! These tables are embedded at compile time and are always available,
//! with or without a user tables directory.

use vocaline_core::{Alphabet, SymbolClass};

use crate::LanguageTable;

/// Names of the factory tables.
pub static FACTORY_TABLE_NAMES: &[&str] = &["cvvc", "arpasing"];

/// TOML content for the factory tables.
static FACTORY_TABLES_TOML: &[(&str, &str)] = &[
    ("cvvc", include_str!("../tables/cvvc.toml")),
    ("arpasing", include_str!("../tables/arpasing.toml")),
];

/// All factory tables.
pub fn factory_tables() -> Vec<LanguageTable> {
    FACTORY_TABLES_TOML
        .iter()
        .filter_map(|(_, toml)| LanguageTable::from_toml(toml).ok())
        .collect()
}

/// A factory table by name, case-insensitive.
pub fn get_factory_table(name: &str) -> Option<LanguageTable> {
    FACTORY_TABLES_TOML
        .iter()
        .find(|(table_name, _)| table_name.eq_ignore_ascii_case(name))
        .and_then(|(_, toml)| LanguageTable::from_toml(toml).ok())
}

/// Whether `name` names a factory table.
pub fn is_factory_table(name: &str) -> bool {
    FACTORY_TABLE_NAMES
        .iter()
        .any(|n| n.eq_ignore_ascii_case(name))
}

/// The cvvc alphabet, used when a table declares no usable symbols.
pub(crate) fn default_alphabet() -> Alphabet {
    let mut alphabet = Alphabet::new();
    if let Some(table) = get_factory_table("cvvc") {
        for entry in &table.symbols {
            if let Some(class) = SymbolClass::from_name(&entry.kind) {
                alphabet.insert(entry.symbol.as_str(), class);
            }
        }
    }
    alphabet
}
