//! Platform-specific paths for language tables.
//!
//! # Directory Structure
//!
//! - **User tables**: `~/.config/vocaline/tables/` (Linux), `~/Library/Application Support/vocaline/tables/` (macOS), `%APPDATA%\vocaline\tables\` (Windows)
//! - **System tables**: `/usr/share/vocaline/tables/` (Linux), `/Library/Application Support/vocaline/tables/` (macOS)
//!
//! # Example
//!
//! ```rust,no_run
//! use vocaline_config::paths;
//!
//! if let Some(path) = paths::find_table("arpasing_custom") {
//!     println!("Found table at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::{ConfigError, LanguageTable, get_factory_table};

/// Application name used for directory paths.
const APP_NAME: &str = "vocaline";

/// Subdirectory name for tables.
const TABLES_SUBDIR: &str = "tables";

/// Returns the user-specific tables directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_tables_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join(TABLES_SUBDIR)
}

/// Returns the system-wide tables directory.
pub fn system_tables_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        PathBuf::from("/usr/share").join(APP_NAME).join(TABLES_SUBDIR)
    }
    #[cfg(target_os = "macos")]
    {
        PathBuf::from("/Library/Application Support")
            .join(APP_NAME)
            .join(TABLES_SUBDIR)
    }
    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_NAME)
            .join(TABLES_SUBDIR)
    }
}

/// Find a table file by name.
///
/// Searches in the following order:
/// 1. The name as a path, if it is a file
/// 2. User tables directory
/// 3. System tables directory
///
/// A `.toml` extension is added to bare names.
pub fn find_table(name: &str) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if name.ends_with(".toml") {
        name.to_string()
    } else {
        format!("{name}.toml")
    };

    [user_tables_dir(), system_tables_dir()]
        .into_iter()
        .map(|dir| dir.join(&filename))
        .find(|candidate| candidate.is_file())
}

/// Load a table by factory name, path, or name in the table directories.
///
/// Factory tables win over files of the same name.
///
/// # Errors
///
/// [`ConfigError::UnknownTable`] when nothing answers to `name`, or the
/// error from [`LanguageTable::load`] for a file that was found.
pub fn load_table(name: &str) -> Result<LanguageTable, ConfigError> {
    if let Some(table) = get_factory_table(name) {
        return Ok(table);
    }
    match find_table(name) {
        Some(path) => LanguageTable::load(path),
        None => Err(ConfigError::UnknownTable {
            name: name.to_string(),
            searched: vec![user_tables_dir(), system_tables_dir()],
        }),
    }
}

/// List table files in the user and system directories, user first.
///
/// Duplicate names are not filtered.
pub fn list_tables() -> Vec<PathBuf> {
    let mut tables = list_tables_in_dir(&user_tables_dir());
    tables.extend(list_tables_in_dir(&system_tables_dir()));
    tables
}

/// `.toml` files directly inside `dir`, sorted.
pub fn list_tables_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut tables: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    tables.sort();
    tables
}

/// Table name from a file path: the file stem.
pub fn table_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dirs_mention_app() {
        assert!(user_tables_dir().to_string_lossy().contains("vocaline"));
        assert!(system_tables_dir().to_string_lossy().contains("vocaline"));
    }

    #[test]
    fn test_find_table_by_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mine.toml");
        fs::write(&path, "name = \"mine\"").unwrap();
        assert_eq!(find_table(path.to_str().unwrap()), Some(path));
    }

    #[test]
    fn test_find_table_not_found() {
        assert!(find_table("nonexistent_table_12345").is_none());
    }

    #[test]
    fn test_load_table_sources() {
        assert_eq!(load_table("cvvc").unwrap().name, "cvvc");

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mine.toml");
        fs::write(&path, "name = \"mine\"").unwrap();
        assert_eq!(load_table(path.to_str().unwrap()).unwrap().name, "mine");

        let err = load_table("nonexistent_table_12345").unwrap_err();
        match err {
            ConfigError::UnknownTable { name, searched } => {
                assert_eq!(name, "nonexistent_table_12345");
                assert_eq!(searched, [user_tables_dir(), system_tables_dir()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_list_tables_in_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.toml"), "").unwrap();
        fs::write(temp_dir.path().join("a.toml"), "").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), "").unwrap();

        let tables = list_tables_in_dir(temp_dir.path());
        let names: Vec<String> = tables
            .iter()
            .filter_map(|p| table_name_from_path(p))
            .collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn test_list_tables_missing_dir() {
        assert!(list_tables_in_dir(Path::new("/nonexistent/path/12345")).is_empty());
    }
}
