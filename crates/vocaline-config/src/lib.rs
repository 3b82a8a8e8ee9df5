//! Language tables for the vocaline phonemizer.
//!
//! A language table is a TOML file declaring a symbol alphabet, rewrite and
//! repair rules, timing overrides, candidate templates and a small bundled
//! dictionary. This crate loads tables, compiles them into a
//! [`ResolverConfigBuilder`](vocaline_core::ResolverConfigBuilder), and
//! layers a singer's own `vocaline.toml` on top.
//!
//! # Features
//!
//! - **Tables**: load and save [`LanguageTable`]s from TOML
//! - **Diagnostics**: malformed entries are skipped and reported, never fatal
//! - **Factory Tables**: built-in `cvvc` and `arpasing` tables
//! - **Paths**: platform-specific user and system table directories
//!
//! # Example
//!
//! ```rust
//! use vocaline_config::{get_factory_table, load_for_singer};
//! use vocaline_core::AliasSet;
//!
//! let table = get_factory_table("arpasing").unwrap();
//! let bank = AliasSet::from_aliases(["ah", "- hh ah", "l ow"]);
//! let report = load_for_singer(&table, None, &bank);
//! assert!(report.diagnostics.is_empty());
//! assert!(report.config.alphabet().is_vowel("ah"));
//! ```

mod diagnostic;
mod error;
mod singer;
mod table;

/// Factory tables bundled with the library.
pub mod factory;

/// Platform-specific table directories.
#[cfg(feature = "std")]
pub mod paths;

pub use diagnostic::{Diagnostic, Severity, has_errors};
pub use error::{ConfigError, FileOp};
pub use factory::{FACTORY_TABLE_NAMES, factory_tables, get_factory_table, is_factory_table};
#[cfg(feature = "std")]
pub use paths::{
    find_table, list_tables, list_tables_in_dir, load_table, system_tables_dir,
    table_name_from_path, user_tables_dir,
};
pub use singer::{LoadReport, SINGER_OVERRIDE_FILE, load_for_singer, singer_override};
pub use table::{Compiled, LanguageTable, ReplacementEntry, SymbolEntry, TimingTable};
