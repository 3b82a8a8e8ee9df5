//! The in-memory voicebank index.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::VoicebankError;
use crate::oto::OtoEntry;
use crate::subbank::Subbank;

/// Alias table file name.
pub const OTO_FILE: &str = "oto.ini";
/// Root prefix map file name.
pub const PREFIX_MAP_FILE: &str = "prefix.map";
/// Directory of per-color prefix maps.
pub const COLOR_MAP_DIR: &str = "prefix";

/// Every alias of a voicebank plus its subbanks.
///
/// When two records share an alias the first one loaded wins.
#[derive(Debug, Clone, Default)]
pub struct Voicebank {
    otos: HashMap<String, OtoEntry>,
    subbanks: Vec<Subbank>,
}

impl Voicebank {
    /// Empty voicebank.
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the lines of one `oto.ini`. Malformed lines are skipped.
    pub fn from_oto_str(text: &str) -> Self {
        let mut bank = Self::new();
        bank.add_oto_str(text, "");
        bank
    }

    /// Load a voicebank directory.
    ///
    /// Reads `oto.ini` in the root and in every subdirectory, then
    /// `prefix.map` and `prefix/<color>.map`. Files are decoded as UTF-8,
    /// replacing invalid sequences.
    ///
    /// # Errors
    ///
    /// Fails when `dir` is not a directory or a file cannot be read.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, VoicebankError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(VoicebankError::NotADirectory(dir.to_path_buf()));
        }

        let mut bank = Self::new();
        let mut oto_files = Vec::new();
        collect_oto_files(dir, &mut oto_files)?;
        for path in &oto_files {
            let text = read_lossy(path)?;
            let folder = path
                .parent()
                .and_then(|p| p.strip_prefix(dir).ok())
                .map(|rel| {
                    rel.components()
                        .map(|c| c.as_os_str().to_string_lossy())
                        .collect::<Vec<_>>()
                        .join("/")
                })
                .unwrap_or_default();
            bank.add_oto_str(&text, &folder);
        }

        let root_map = dir.join(PREFIX_MAP_FILE);
        if root_map.is_file() {
            for subbank in Subbank::parse_prefix_map(&read_lossy(&root_map)?, "") {
                bank.add_subbank(subbank);
            }
        }
        for (color, path) in color_maps(&dir.join(COLOR_MAP_DIR))? {
            for subbank in Subbank::parse_prefix_map(&read_lossy(&path)?, &color) {
                bank.add_subbank(subbank);
            }
        }

        tracing::debug!(
            "voicebank: {} aliases, {} subbanks from {}",
            bank.len(),
            bank.subbanks.len(),
            dir.display()
        );
        Ok(bank)
    }

    /// Builder form of [`Voicebank::add_subbank`].
    pub fn with_subbank(mut self, subbank: Subbank) -> Self {
        self.add_subbank(subbank);
        self
    }

    /// Register a subbank. Longer decorations are matched first.
    pub fn add_subbank(&mut self, subbank: Subbank) {
        self.subbanks.push(subbank);
        self.subbanks
            .sort_by_key(|s| std::cmp::Reverse(s.decoration_len()));
    }

    /// Add a record. Returns `false` if the alias was already taken.
    pub fn insert(&mut self, entry: OtoEntry) -> bool {
        if self.otos.contains_key(&entry.alias) {
            return false;
        }
        self.otos.insert(entry.alias.clone(), entry);
        true
    }

    /// The record stored under exactly `alias`.
    pub fn get(&self, alias: &str) -> Option<&OtoEntry> {
        self.otos.get(alias)
    }

    /// Look up `alias` for a tone and color.
    ///
    /// Tries the first subbank of `color` covering `tone`, then the first
    /// default-color subbank covering it, then the bare alias.
    pub fn find(&self, alias: &str, tone: i32, color: Option<&str>) -> Option<&OtoEntry> {
        let mapped = |wanted: &str| {
            self.subbanks
                .iter()
                .find(|s| s.color == wanted && s.covers(tone))
                .and_then(|s| self.get(&s.apply(alias)))
        };
        color
            .filter(|c| !c.is_empty())
            .and_then(mapped)
            .or_else(|| mapped(""))
            .or_else(|| self.get(alias))
    }

    /// Registered subbanks, longest decoration first.
    pub fn subbanks(&self) -> &[Subbank] {
        &self.subbanks
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.otos.len()
    }

    /// Whether the voicebank has no aliases.
    pub fn is_empty(&self) -> bool {
        self.otos.is_empty()
    }

    fn add_oto_str(&mut self, text: &str, folder: &str) {
        for (number, line) in text.lines().enumerate() {
            match OtoEntry::parse_line(line) {
                Ok(Some(mut entry)) => {
                    if !folder.is_empty() {
                        entry.wav = format!("{folder}/{}", entry.wav);
                    }
                    let alias = entry.alias.clone();
                    if !self.insert(entry) {
                        tracing::debug!("voicebank: duplicate alias '{alias}' ignored");
                    }
                }
                Ok(None) => {}
                Err(e) => tracing::warn!("voicebank: line {}: {e}", number + 1),
            }
        }
    }
}

fn read_lossy(path: &Path) -> Result<String, VoicebankError> {
    let bytes = fs::read(path).map_err(|e| VoicebankError::read_file(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// `oto.ini` files under `dir`, the directory's own file first, then
/// subdirectories in name order.
fn collect_oto_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), VoicebankError> {
    let oto = dir.join(OTO_FILE);
    if oto.is_file() {
        out.push(oto);
    }
    let mut subdirs: Vec<PathBuf> = fs::read_dir(dir)
        .map_err(|e| VoicebankError::read_dir(dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    subdirs.sort();
    for sub in subdirs {
        collect_oto_files(&sub, out)?;
    }
    Ok(())
}

/// `(color, path)` for each `*.map` in the color map directory.
fn color_maps(dir: &Path) -> Result<Vec<(String, PathBuf)>, VoicebankError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut maps: Vec<(String, PathBuf)> = fs::read_dir(dir)
        .map_err(|e| VoicebankError::read_dir(dir, e))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "map"))
        .filter_map(|path| {
            let color = path.file_stem()?.to_str()?.to_string();
            Some((color, path))
        })
        .collect();
    maps.sort();
    Ok(maps)
}
