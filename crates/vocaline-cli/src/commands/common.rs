//! Shared CLI helpers used across multiple commands.

use std::path::Path;
use std::sync::Arc;

use vocaline_config::{ConfigError, LanguageTable, load_for_singer};
use vocaline_core::{AliasQuery, Phonemizer};
use vocaline_voicebank::Voicebank;

/// Load a language table by name or path.
///
/// Factory tables come first, then the name as a file path, then the user
/// and system table directories.
pub fn load_table(name: &str) -> anyhow::Result<LanguageTable> {
    match vocaline_config::load_table(name) {
        Err(e @ ConfigError::UnknownTable { .. }) => {
            anyhow::bail!("{e}. Use 'vocaline tables' to see available tables.")
        }
        result => Ok(result?),
    }
}

/// Load a voicebank directory.
pub fn load_voicebank(dir: &Path) -> anyhow::Result<Voicebank> {
    let bank = Voicebank::load_dir(dir)?;
    if bank.is_empty() {
        tracing::warn!("voicebank {} has no aliases", dir.display());
    }
    Ok(bank)
}

/// Build a phonemizer for the singer in `singer_dir`, attached to `query`.
pub fn phonemizer(
    table: &LanguageTable,
    singer_dir: &Path,
    query: &dyn AliasQuery,
) -> Phonemizer {
    let report = load_for_singer(table, Some(singer_dir), query);
    Phonemizer::new(Arc::new(report.config), Arc::new(report.g2p))
}
