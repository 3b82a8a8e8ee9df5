//! Immutable resolver configuration.
//!
//! A [`ResolverConfig`] is everything language- and singer-specific the
//! engine needs: the alphabet, replacement and repair rules, cluster
//! exceptions, silence tokens, timing policy and candidate templates. It is
//! built once through [`ResolverConfigBuilder`] and never mutated while
//! notes are processed, so it can be shared freely across threads.
//!
//! # Example
//!
//! ```
//! use vocaline_core::{Alphabet, AliasSet, ConsonantClass, ResolverConfigBuilder, Substitution};
//!
//! let alphabet = Alphabet::new()
//!     .with_vowels(["a", "ah", "ax"])
//!     .with_consonants(ConsonantClass::Stop, ["k"]);
//!
//! let bank = AliasSet::from_aliases(["ah", "k ah"]);
//! let config = ResolverConfigBuilder::new()
//!     .alphabet(alphabet)
//!     .fallback(Substitution::parse("ax=ah").unwrap())
//!     .attach(&bank);
//!
//! // "ax" is missing from the bank, so its fallback is active.
//! assert_eq!(config.repair_candidate("k ax").as_deref(), Some("k ah"));
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::candidates::CandidateTable;
use crate::note::Tick;
use crate::query::AliasQuery;
use crate::symbol::{Alphabet, ConsonantClass};

/// Tone used when probing fallbacks at attach time.
pub const PROBE_TONE: i32 = 60;

// ---------------------------------------------------------------------------
// Timing policy
// ---------------------------------------------------------------------------

/// Tunable tick heuristics.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingPolicy {
    /// Nominal consonant width in ticks when the voicebank has no attack time.
    pub consonant_length: Tick,
    /// Fraction of the previous note that leading consonants may occupy.
    pub lead_clamp: f64,
    /// Fraction of the last syllable's duration that trailing samples may occupy.
    pub tail_clamp: f64,
    /// The final tail sample is `duration / tail_divisor` wide.
    pub tail_divisor: Tick,
    /// Scaled widths are floored to a multiple of this.
    pub tick_quantum: Tick,
    /// Sustain an identical vowel instead of emitting a new sample.
    pub extend_same_vowel: bool,
    /// Width multipliers per consonant class.
    pub class_multipliers: BTreeMap<ConsonantClass, f64>,
    /// Width multipliers per symbol. Win over class multipliers.
    pub symbol_multipliers: BTreeMap<String, f64>,
}

impl Default for TimingPolicy {
    fn default() -> Self {
        let class_multipliers = [
            (ConsonantClass::Stop, 1.0),
            (ConsonantClass::Fricative, 1.5),
            (ConsonantClass::Affricate, 1.5),
            (ConsonantClass::Nasal, 1.2),
            (ConsonantClass::Tap, 0.5),
            (ConsonantClass::Liquid, 1.2),
            (ConsonantClass::Semivowel, 1.2),
            (ConsonantClass::Other, 1.0),
        ]
        .into_iter()
        .collect();
        Self {
            consonant_length: 60,
            lead_clamp: 0.5,
            tail_clamp: 0.5,
            tail_divisor: 5,
            tick_quantum: 5,
            extend_same_vowel: true,
            class_multipliers,
            symbol_multipliers: BTreeMap::new(),
        }
    }
}

impl TimingPolicy {
    /// Width multiplier for a symbol.
    pub fn multiplier(&self, symbol: &str, class: Option<ConsonantClass>) -> f64 {
        if let Some(&m) = self.symbol_multipliers.get(symbol) {
            return m;
        }
        class
            .and_then(|c| self.class_multipliers.get(&c).copied())
            .unwrap_or(1.0)
    }

    /// Nominal width for a symbol without voicebank timing.
    pub fn nominal_width(&self, symbol: &str, class: Option<ConsonantClass>) -> Tick {
        (self.consonant_length as f64 * self.multiplier(symbol, class)).round() as Tick
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Symbol-sequence rewrite applied to extracted symbols.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementRule {
    /// Sequence to find.
    pub from: Vec<String>,
    /// Sequence to put in its place. May be empty.
    pub to: Vec<String>,
}

impl ReplacementRule {
    /// Create a rule.
    pub fn new<I, J, S, T>(from: I, to: J) -> Self
    where
        I: IntoIterator<Item = S>,
        J: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            from: from.into_iter().map(Into::into).collect(),
            to: to.into_iter().map(Into::into).collect(),
        }
    }

    /// Rewrite every non-overlapping occurrence, left to right.
    pub fn apply(&self, symbols: &[String]) -> Vec<String> {
        if self.from.is_empty() {
            return symbols.to_vec();
        }
        let mut out = Vec::with_capacity(symbols.len());
        let mut i = 0;
        while i < symbols.len() {
            if symbols[i..].starts_with(&self.from) {
                out.extend(self.to.iter().cloned());
                i += self.from.len();
            } else {
                out.push(symbols[i].clone());
                i += 1;
            }
        }
        out
    }
}

/// A token-wise substitution over a candidate alias, written `"from=to"`.
///
/// Both sides are space-separated token sequences: `"zh ae=sh ah"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    /// Tokens to find.
    pub from: Vec<String>,
    /// Replacement tokens.
    pub to: Vec<String>,
}

impl Substitution {
    /// Parse `"from=to"`. Both sides must be non-empty and differ.
    pub fn parse(text: &str) -> Option<Self> {
        let (from, to) = text.split_once('=')?;
        let from: Vec<String> = from.split_whitespace().map(str::to_string).collect();
        let to: Vec<String> = to.split_whitespace().map(str::to_string).collect();
        if from.is_empty() || to.is_empty() || from == to {
            return None;
        }
        Some(Self { from, to })
    }

    /// The `from` side as an alias.
    pub fn from_alias(&self) -> String {
        self.from.join(" ")
    }

    /// Replace the first occurrence. Returns whether anything changed.
    pub fn apply(&self, tokens: &mut Vec<String>) -> bool {
        let n = self.from.len();
        if n == 0 || n > tokens.len() {
            return false;
        }
        let Some(at) = (0..=tokens.len() - n).find(|&i| tokens[i..i + n] == self.from[..]) else {
            return false;
        };
        let tail = tokens.split_off(at + n);
        tokens.truncate(at);
        tokens.extend(self.to.iter().cloned());
        tokens.extend(tail);
        true
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.from.join(" "), self.to.join(" "))
    }
}

// ---------------------------------------------------------------------------
// ResolverConfig
// ---------------------------------------------------------------------------

/// Immutable, per-singer resolver configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    alphabet: Alphabet,
    replacements: Vec<ReplacementRule>,
    fallbacks: Vec<Substitution>,
    repairs: Vec<Substitution>,
    cluster_exceptions: BTreeSet<String>,
    silence_tokens: BTreeSet<String>,
    policy: TimingPolicy,
    candidates: CandidateTable,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfigBuilder::new().build()
    }
}

impl ResolverConfig {
    /// The language alphabet.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// Timing heuristics.
    pub fn policy(&self) -> &TimingPolicy {
        &self.policy
    }

    /// Candidate templates.
    pub fn candidates(&self) -> &CandidateTable {
        &self.candidates
    }

    /// Missing-phoneme fallbacks active for the attached singer.
    pub fn active_fallbacks(&self) -> &[Substitution] {
        &self.fallbacks
    }

    /// Language repair rules.
    pub fn repairs(&self) -> &[Substitution] {
        &self.repairs
    }

    /// Whether a consonant may not head a merged cluster.
    pub fn is_cluster_exception(&self, symbol: &str) -> bool {
        self.cluster_exceptions.contains(symbol)
    }

    /// Whether a lyric is a silence token.
    pub fn is_silence(&self, lyric: &str) -> bool {
        self.silence_tokens.contains(lyric)
    }

    /// Run every replacement rule over an extracted symbol sequence.
    pub fn apply_replacements(&self, symbols: Vec<String>) -> Vec<String> {
        self.replacements
            .iter()
            .fold(symbols, |acc, rule| rule.apply(&acc))
    }

    /// Repair a candidate alias: active fallbacks first, then language repairs.
    ///
    /// Every rule is applied at most once. Returns `None` when nothing changed.
    pub fn repair_candidate(&self, candidate: &str) -> Option<String> {
        let mut tokens: Vec<String> = candidate.split_whitespace().map(str::to_string).collect();
        let mut changed = false;
        for rule in self.fallbacks.iter().chain(&self.repairs) {
            changed |= rule.apply(&mut tokens);
        }
        changed.then(|| tokens.join(" "))
    }
}

/// Builder for [`ResolverConfig`].
#[derive(Debug, Clone, Default)]
pub struct ResolverConfigBuilder {
    alphabet: Alphabet,
    replacements: Vec<ReplacementRule>,
    fallbacks: Vec<Substitution>,
    repairs: Vec<Substitution>,
    cluster_exceptions: BTreeSet<String>,
    silence_tokens: BTreeSet<String>,
    policy: TimingPolicy,
    candidates: CandidateTable,
}

impl ResolverConfigBuilder {
    /// Start from built-in defaults: empty alphabet, `R` as silence, default policy and templates.
    pub fn new() -> Self {
        Self {
            silence_tokens: ["R".to_string()].into_iter().collect(),
            ..Self::default()
        }
    }

    /// Set the alphabet.
    pub fn alphabet(mut self, alphabet: Alphabet) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Append a replacement rule.
    pub fn replacement(mut self, rule: ReplacementRule) -> Self {
        self.replacements.push(rule);
        self
    }

    /// Append a missing-phoneme fallback. Only active once a singer lacking `from` is attached.
    pub fn fallback(mut self, rule: Substitution) -> Self {
        self.fallbacks.push(rule);
        self
    }

    /// Append a repair rule.
    pub fn repair(mut self, rule: Substitution) -> Self {
        self.repairs.push(rule);
        self
    }

    /// Mark a consonant as never heading a merged cluster.
    pub fn cluster_exception(mut self, symbol: impl Into<String>) -> Self {
        self.cluster_exceptions.insert(symbol.into());
        self
    }

    /// Add a silence token.
    pub fn silence_token(mut self, token: impl Into<String>) -> Self {
        self.silence_tokens.insert(token.into());
        self
    }

    /// Set the timing policy.
    pub fn policy(mut self, policy: TimingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the candidate templates.
    pub fn candidates(mut self, candidates: CandidateTable) -> Self {
        self.candidates = candidates;
        self
    }

    /// Build with no singer attached. No fallback is active.
    pub fn build(self) -> ResolverConfig {
        self.finish(Vec::new())
    }

    /// Build for a singer: a fallback is active when the voicebank lacks its `from` alias.
    pub fn attach(self, query: &dyn AliasQuery) -> ResolverConfig {
        let active: Vec<Substitution> = self
            .fallbacks
            .iter()
            .filter(|rule| !query.exists(&rule.from_alias(), PROBE_TONE, None))
            .cloned()
            .collect();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            "attach: {} of {} fallbacks active",
            active.len(),
            self.fallbacks.len()
        );
        self.finish(active)
    }

    fn finish(self, fallbacks: Vec<Substitution>) -> ResolverConfig {
        ResolverConfig {
            alphabet: self.alphabet,
            replacements: self.replacements,
            fallbacks,
            repairs: self.repairs,
            cluster_exceptions: self.cluster_exceptions,
            silence_tokens: self.silence_tokens,
            policy: self.policy,
            candidates: self.candidates,
        }
    }
}
