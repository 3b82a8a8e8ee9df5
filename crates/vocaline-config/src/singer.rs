//! Per-singer configuration loading.
//!
//! A voicebank directory may carry a `vocaline.toml` with the same schema
//! as a language table. It is layered over the table: rules are appended,
//! timing and templates override, and its dictionary is consulted before
//! the table's.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use vocaline_core::{AliasQuery, G2pChain, GraphemeG2p, ResolverConfig};

use crate::diagnostic::Diagnostic;
use crate::table::{LanguageTable, compile_dictionary};

/// File name of the singer-local override.
pub const SINGER_OVERRIDE_FILE: &str = "vocaline.toml";

/// Path of the singer-local override inside a voicebank directory.
pub fn singer_override(singer_dir: &Path) -> PathBuf {
    singer_dir.join(SINGER_OVERRIDE_FILE)
}

/// Everything a host needs to phonemize for one singer.
pub struct LoadReport {
    /// Resolver configuration with the singer's fallbacks activated.
    pub config: ResolverConfig,
    /// Singer dictionary, then table dictionary, then spelling.
    pub g2p: G2pChain,
    /// Problems found while loading. Never fatal.
    pub diagnostics: Vec<Diagnostic>,
}

/// Compile `table` for the singer behind `query`.
///
/// The override in `singer_dir` is optional; a missing or unreadable
/// override only adds a diagnostic.
pub fn load_for_singer(
    table: &LanguageTable,
    singer_dir: Option<&Path>,
    query: &dyn AliasQuery,
) -> LoadReport {
    let mut diagnostics = Vec::new();
    let mut merged = table.clone();
    let mut singer_dictionary: Option<BTreeMap<String, String>> = None;

    if let Some(path) = singer_dir.map(singer_override).filter(|p| p.is_file()) {
        match LanguageTable::load(&path) {
            Ok(mut layer) => {
                tracing::debug!("load_for_singer: applying {}", path.display());
                singer_dictionary = Some(std::mem::take(&mut layer.dictionary));
                merged.merge(&layer);
            }
            Err(e) => diagnostics.push(Diagnostic::error(
                path.display().to_string(),
                format!("override ignored: {e}"),
            )),
        }
    }

    let compiled = merged.compile();
    diagnostics.extend(compiled.diagnostics);

    let mut g2p = G2pChain::new();
    if let Some(entries) = singer_dictionary {
        g2p.push(compile_dictionary(
            "singer.dictionary",
            &entries,
            &compiled.alphabet,
            &mut diagnostics,
        ));
    }
    g2p.push(compiled.dictionary);
    g2p.push(GraphemeG2p::new(&compiled.alphabet));

    for diagnostic in &diagnostics {
        tracing::warn!("{}: {diagnostic}", table.name);
    }

    LoadReport {
        config: compiled.builder.attach(query),
        g2p,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::get_factory_table;
    use std::fs;
    use tempfile::TempDir;
    use vocaline_core::{AliasSet, G2p};

    fn words(symbols: &str) -> Option<Vec<String>> {
        Some(symbols.split_whitespace().map(str::to_string).collect())
    }

    #[test]
    fn test_without_override() {
        let table = get_factory_table("arpasing").unwrap();
        let bank = AliasSet::from_aliases(["ah", "dx", "zh", "oy", "ng"]);
        let report = load_for_singer(&table, None, &bank);
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.g2p.len(), 2);
        assert_eq!(report.g2p.query("hello"), words("hh ah l ow"));
        // spelling fallback
        assert_eq!(report.g2p.query("shaa"), words("sh aa"));

        let active: Vec<String> = report
            .config
            .active_fallbacks()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(active, ["ax=ah"]);
    }

    #[test]
    fn test_override_layers_over_table() {
        let dir = TempDir::new().unwrap();
        fs::write(
            singer_override(dir.path()),
            r#"
cluster_exceptions = ["s"]

[timing]
consonant_length = 40

[dictionary]
hello = "hh eh l ow"
"#,
        )
        .unwrap();

        let table = get_factory_table("arpasing").unwrap();
        let report = load_for_singer(&table, Some(dir.path()), &AliasSet::new());
        assert!(report.diagnostics.is_empty(), "{:?}", report.diagnostics);
        assert_eq!(report.g2p.len(), 3);
        assert_eq!(report.g2p.query("hello"), words("hh eh l ow"));
        assert_eq!(report.g2p.query("world"), words("w er l d"));
        assert_eq!(report.config.policy().consonant_length, 40);
        assert!(report.config.is_cluster_exception("s"));
        assert!(report.config.is_cluster_exception("ch"));
    }

    #[test]
    fn test_broken_override_is_reported() {
        let dir = TempDir::new().unwrap();
        fs::write(singer_override(dir.path()), "this is = = not toml").unwrap();

        let table = get_factory_table("cvvc").unwrap();
        let report = load_for_singer(&table, Some(dir.path()), &AliasSet::new());
        assert_eq!(report.diagnostics.len(), 1);
        assert!(report.diagnostics[0].is_error());
        assert!(report.config.alphabet().is_vowel("a"));
    }

    #[test]
    fn test_missing_override_is_fine() {
        let dir = TempDir::new().unwrap();
        let table = get_factory_table("cvvc").unwrap();
        let report = load_for_singer(&table, Some(dir.path()), &AliasSet::new());
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.g2p.query("wo"), words("o"));
        assert_eq!(report.g2p.query("tsu"), words("ts u"));
    }
}
