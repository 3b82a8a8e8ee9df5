//! Language table file format and compilation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use vocaline_core::{
    Alphabet, CandidateTable, ConsonantClass, DictionaryG2p, ReplacementRule,
    ResolverConfigBuilder, SlotRole, Substitution, SymbolClass, Template, TimingPolicy,
};

use crate::diagnostic::Diagnostic;
use crate::error::{ConfigError, FileOp};

/// A language table: symbols, rewrite rules, timing and templates.
///
/// Every section except `name` is optional. Missing sections keep the
/// built-in defaults.
///
/// # TOML Format
///
/// ```toml
/// name = "arpasing"
/// description = "English ARPAbet"
/// fallbacks = ["ax=ah"]
/// repairs = ["eh=ae"]
/// cluster_exceptions = ["ch", "sh"]
/// silence_tokens = ["R", "br"]
///
/// [[symbols]]
/// symbol = "aa"
/// type = "vowel"
///
/// [[symbols]]
/// symbol = "k"
/// type = "stop"
///
/// [[replacements]]
/// from = ["ax", "r"]
/// to = ["er"]
///
/// [timing]
/// consonant_length = 60
/// lead_clamp = 0.5
///
/// [timing.class_multipliers]
/// fricative = 1.5
///
/// [candidates]
/// onset = ["{cs} {v}", "{c}{v}"]
///
/// [dictionary]
/// hello = "hh ah l ow"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LanguageTable {
    /// Name of the table.
    #[serde(default)]
    pub name: String,

    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Missing-phoneme fallbacks, `"from=to"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<String>,

    /// Repair substitutions, `"from=to"`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repairs: Vec<String>,

    /// Consonants that never head a merged cluster sample.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cluster_exceptions: Vec<String>,

    /// Lyrics treated as silence.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub silence_tokens: Vec<String>,

    /// Symbol declarations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<SymbolEntry>,

    /// Symbol sequence rewrites, applied to dictionary output in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replacements: Vec<ReplacementEntry>,

    /// Timing overrides.
    #[serde(default, skip_serializing_if = "TimingTable::is_empty")]
    pub timing: TimingTable,

    /// Template overrides keyed by slot name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub candidates: BTreeMap<String, Vec<String>>,

    /// Bundled dictionary: word to space-separated symbols.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dictionary: BTreeMap<String, String>,
}

/// `[[symbols]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolEntry {
    /// Symbol name.
    pub symbol: String,
    /// `vowel` or a consonant class name.
    #[serde(rename = "type")]
    pub kind: String,
}

impl SymbolEntry {
    /// Create an entry.
    pub fn new(symbol: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            kind: kind.into(),
        }
    }
}

/// `[[replacements]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReplacementEntry {
    /// Symbols to find.
    pub from: Vec<String>,
    /// Replacement symbols. Empty deletes the match.
    #[serde(default)]
    pub to: Vec<String>,
}

/// `[timing]` section. Unset fields keep the default policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct TimingTable {
    /// Base consonant width in ticks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consonant_length: Option<i64>,
    /// Fraction of the previous note leading samples may take.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lead_clamp: Option<f64>,
    /// Fraction of the last syllable ending samples may take.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_clamp: Option<f64>,
    /// The final tail sample is `duration / tail_divisor` wide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tail_divisor: Option<i64>,
    /// Scaled widths are floored to this many ticks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_quantum: Option<i64>,
    /// Sustain identical vowels across notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extend_same_vowel: Option<bool>,
    /// Width multipliers keyed by consonant class name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub class_multipliers: BTreeMap<String, f64>,
    /// Width multipliers keyed by symbol.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub symbol_multipliers: BTreeMap<String, f64>,
}

impl TimingTable {
    /// True when nothing is overridden.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of compiling a table.
#[derive(Debug, Clone)]
pub struct Compiled {
    /// Builder carrying every valid entry. Attach a singer to finish it.
    pub builder: ResolverConfigBuilder,
    /// The alphabet the builder was given.
    pub alphabet: Alphabet,
    /// The bundled dictionary.
    pub dictionary: DictionaryG2p,
    /// Problems found. Entries with errors were skipped.
    pub diagnostics: Vec<Diagnostic>,
}

impl LanguageTable {
    /// Create an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Load a table from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::file(FileOp::Read, path, e))?;
        toml::from_str(&content).map_err(|e| ConfigError::malformed_file(path, e))
    }

    /// Load a table from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the table to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::file(FileOp::CreateDir, parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::file(FileOp::Write, path, e))?;
        Ok(())
    }

    /// Convert the table to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Layer `other` on top of this table.
    ///
    /// Rule lists are appended, symbols and dictionary entries of `other`
    /// replace ones with the same name, set timing fields and candidate
    /// lists override.
    pub fn merge(&mut self, other: &LanguageTable) {
        for entry in &other.symbols {
            self.symbols.retain(|s| s.symbol != entry.symbol);
            self.symbols.push(entry.clone());
        }
        self.replacements.extend(other.replacements.iter().cloned());
        self.fallbacks.extend(other.fallbacks.iter().cloned());
        self.repairs.extend(other.repairs.iter().cloned());
        self.cluster_exceptions
            .extend(other.cluster_exceptions.iter().cloned());
        self.silence_tokens.extend(other.silence_tokens.iter().cloned());

        let t = &other.timing;
        let mine = &mut self.timing;
        mine.consonant_length = t.consonant_length.or(mine.consonant_length);
        mine.lead_clamp = t.lead_clamp.or(mine.lead_clamp);
        mine.tail_clamp = t.tail_clamp.or(mine.tail_clamp);
        mine.tail_divisor = t.tail_divisor.or(mine.tail_divisor);
        mine.tick_quantum = t.tick_quantum.or(mine.tick_quantum);
        mine.extend_same_vowel = t.extend_same_vowel.or(mine.extend_same_vowel);
        mine.class_multipliers
            .extend(t.class_multipliers.iter().map(|(k, v)| (k.clone(), *v)));
        mine.symbol_multipliers
            .extend(t.symbol_multipliers.iter().map(|(k, v)| (k.clone(), *v)));

        self.candidates
            .extend(other.candidates.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.dictionary
            .extend(other.dictionary.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Compile into a resolver builder.
    ///
    /// Never fails. Malformed entries are skipped with an error diagnostic;
    /// suspicious but usable entries produce a warning.
    pub fn compile(&self) -> Compiled {
        let mut diagnostics = Vec::new();

        let mut alphabet = compile_symbols(&self.symbols, &mut diagnostics);
        if alphabet.is_empty() {
            diagnostics.push(Diagnostic::warning(
                "symbols",
                "no valid symbols declared, using the cvvc alphabet",
            ));
            alphabet = crate::factory::default_alphabet();
        }

        let mut builder = ResolverConfigBuilder::new().alphabet(alphabet.clone());

        for (i, entry) in self.replacements.iter().enumerate() {
            let location = format!("replacements[{i}]");
            if entry.from.is_empty() {
                diagnostics.push(Diagnostic::error(location, "'from' must be non-empty"));
                continue;
            }
            for symbol in entry.from.iter().chain(&entry.to) {
                if !alphabet.is_valid(symbol) {
                    diagnostics.push(Diagnostic::warning(
                        &location,
                        format!("'{symbol}' is not a declared symbol"),
                    ));
                }
            }
            builder = builder.replacement(ReplacementRule::new(
                entry.from.iter().map(String::as_str),
                entry.to.iter().map(String::as_str),
            ));
        }

        for rule in compile_rules("fallbacks", &self.fallbacks, &mut diagnostics) {
            builder = builder.fallback(rule);
        }
        for rule in compile_rules("repairs", &self.repairs, &mut diagnostics) {
            builder = builder.repair(rule);
        }

        for (i, symbol) in self.cluster_exceptions.iter().enumerate() {
            if !alphabet.is_valid(symbol) {
                diagnostics.push(Diagnostic::warning(
                    format!("cluster_exceptions[{i}]"),
                    format!("'{symbol}' is not a declared symbol"),
                ));
            }
            builder = builder.cluster_exception(symbol.as_str());
        }

        for (i, token) in self.silence_tokens.iter().enumerate() {
            if token.trim().is_empty() {
                diagnostics.push(Diagnostic::error(
                    format!("silence_tokens[{i}]"),
                    "empty silence token",
                ));
                continue;
            }
            builder = builder.silence_token(token.trim());
        }

        builder = builder.policy(compile_timing(&self.timing, &mut diagnostics));
        builder = builder.candidates(compile_candidates(&self.candidates, &mut diagnostics));

        let dictionary = compile_dictionary("dictionary", &self.dictionary, &alphabet, &mut diagnostics);

        Compiled {
            builder,
            alphabet,
            dictionary,
            diagnostics,
        }
    }
}

fn compile_symbols(entries: &[SymbolEntry], diagnostics: &mut Vec<Diagnostic>) -> Alphabet {
    let mut alphabet = Alphabet::new();
    for (i, entry) in entries.iter().enumerate() {
        let location = format!("symbols[{i}]");
        let name = entry.symbol.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            diagnostics.push(Diagnostic::error(
                location,
                format!("invalid symbol name '{}'", entry.symbol),
            ));
            continue;
        }
        let Some(class) = SymbolClass::from_name(&entry.kind) else {
            diagnostics.push(Diagnostic::error(
                location,
                format!("unknown symbol type '{}'", entry.kind),
            ));
            continue;
        };
        if alphabet.is_valid(name) {
            diagnostics.push(Diagnostic::warning(
                location,
                format!("duplicate symbol '{name}', first declaration kept"),
            ));
            continue;
        }
        alphabet.insert(name, class);
    }
    alphabet
}

fn compile_rules(
    section: &str,
    rules: &[String],
    diagnostics: &mut Vec<Diagnostic>,
) -> Vec<Substitution> {
    let mut out: Vec<Substitution> = Vec::new();
    for (i, text) in rules.iter().enumerate() {
        let location = format!("{section}[{i}]");
        let Some(rule) = Substitution::parse(text) else {
            diagnostics.push(Diagnostic::error(
                location,
                format!("expected 'from=to' with distinct sides, got '{text}'"),
            ));
            continue;
        };
        if out.contains(&rule) {
            diagnostics.push(Diagnostic::warning(
                location,
                format!("duplicate rule '{rule}'"),
            ));
            continue;
        }
        out.push(rule);
    }
    out
}

fn compile_timing(table: &TimingTable, diagnostics: &mut Vec<Diagnostic>) -> TimingPolicy {
    let mut policy = TimingPolicy::default();

    if let Some(v) = table.consonant_length {
        if v >= 0 {
            policy.consonant_length = v;
        } else {
            diagnostics.push(Diagnostic::error("timing.consonant_length", "must be >= 0"));
        }
    }
    for (name, value, slot) in [
        ("lead_clamp", table.lead_clamp, &mut policy.lead_clamp),
        ("tail_clamp", table.tail_clamp, &mut policy.tail_clamp),
    ] {
        if let Some(v) = value {
            if (0.0..=1.0).contains(&v) {
                *slot = v;
            } else {
                diagnostics.push(Diagnostic::error(
                    format!("timing.{name}"),
                    format!("{v} is outside [0, 1]"),
                ));
            }
        }
    }
    if let Some(v) = table.tail_divisor {
        if v > 0 {
            policy.tail_divisor = v;
        } else {
            diagnostics.push(Diagnostic::error("timing.tail_divisor", "must be > 0"));
        }
    }
    if let Some(v) = table.tick_quantum {
        if v > 0 {
            policy.tick_quantum = v;
        } else {
            diagnostics.push(Diagnostic::error("timing.tick_quantum", "must be > 0"));
        }
    }
    if let Some(v) = table.extend_same_vowel {
        policy.extend_same_vowel = v;
    }

    for (name, &m) in &table.class_multipliers {
        let location = format!("timing.class_multipliers.{name}");
        let Some(class) = ConsonantClass::from_name(name) else {
            diagnostics.push(Diagnostic::error(location, "unknown consonant class"));
            continue;
        };
        if valid_multiplier(m) {
            policy.class_multipliers.insert(class, m);
        } else {
            diagnostics.push(Diagnostic::error(location, format!("invalid multiplier {m}")));
        }
    }
    for (symbol, &m) in &table.symbol_multipliers {
        if valid_multiplier(m) {
            policy.symbol_multipliers.insert(symbol.clone(), m);
        } else {
            diagnostics.push(Diagnostic::error(
                format!("timing.symbol_multipliers.{symbol}"),
                format!("invalid multiplier {m}"),
            ));
        }
    }
    policy
}

fn valid_multiplier(m: f64) -> bool {
    m.is_finite() && m >= 0.0
}

fn compile_candidates(
    table: &BTreeMap<String, Vec<String>>,
    diagnostics: &mut Vec<Diagnostic>,
) -> CandidateTable {
    let mut candidates = CandidateTable::defaults();
    for (slot, sources) in table {
        let Some(role) = SlotRole::from_name(slot) else {
            diagnostics.push(Diagnostic::error(
                format!("candidates.{slot}"),
                "unknown slot",
            ));
            continue;
        };
        let mut templates = Vec::with_capacity(sources.len());
        for (i, source) in sources.iter().enumerate() {
            match Template::parse(source) {
                Ok(t) => templates.push(t),
                Err(e) => diagnostics.push(Diagnostic::error(
                    format!("candidates.{slot}[{i}]"),
                    e.to_string(),
                )),
            }
        }
        if templates.is_empty() {
            diagnostics.push(Diagnostic::warning(
                format!("candidates.{slot}"),
                "no valid templates, keeping the defaults",
            ));
        }
        candidates.set(role, templates);
    }
    candidates
}

/// Compile `word = "s y m"` entries.
///
/// Entries with no symbols are skipped. Undeclared symbols are kept (the
/// extractor drops them later) but reported.
pub(crate) fn compile_dictionary(
    section: &str,
    entries: &BTreeMap<String, String>,
    alphabet: &Alphabet,
    diagnostics: &mut Vec<Diagnostic>,
) -> DictionaryG2p {
    let mut dictionary = DictionaryG2p::new();
    for (word, pronunciation) in entries {
        let location = format!("{section}.{word}");
        let symbols: Vec<&str> = pronunciation.split_whitespace().collect();
        if symbols.is_empty() {
            diagnostics.push(Diagnostic::error(location, "empty pronunciation"));
            continue;
        }
        let unknown: Vec<&str> = symbols
            .iter()
            .copied()
            .filter(|s| !alphabet.is_valid(s))
            .collect();
        if !unknown.is_empty() {
            diagnostics.push(Diagnostic::warning(
                location,
                format!("undeclared symbols: {}", unknown.join(" ")),
            ));
        }
        dictionary.insert(word, symbols);
    }
    dictionary
}
