//! Grapheme-to-phoneme sources.
//!
//! Lookups go through an ordered [`G2pChain`]: a singer-local dictionary,
//! the language's bundled dictionary, and finally a [`GraphemeG2p`] that
//! splits the spelling into alphabet symbols. The first source that
//! produces a non-empty result wins.

use std::collections::HashMap;

use crate::symbol::Alphabet;

/// A word-to-symbols source.
pub trait G2p: Send + Sync {
    /// Symbols for a word, or `None` if the source has no entry.
    fn query(&self, word: &str) -> Option<Vec<String>>;
}

/// Case-insensitive word dictionary.
#[derive(Debug, Clone, Default)]
pub struct DictionaryG2p {
    entries: HashMap<String, Vec<String>>,
}

impl DictionaryG2p {
    /// Empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry.
    pub fn insert<I, S>(&mut self, word: &str, symbols: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.insert(
            word.to_lowercase(),
            symbols.into_iter().map(Into::into).collect(),
        );
    }

    /// Builder form of [`DictionaryG2p::insert`], taking a space-separated pronunciation.
    pub fn with_entry(mut self, word: &str, pronunciation: &str) -> Self {
        self.insert(word, pronunciation.split_whitespace());
        self
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl G2p for DictionaryG2p {
    fn query(&self, word: &str) -> Option<Vec<String>> {
        self.entries
            .get(&word.to_lowercase())
            .filter(|symbols| !symbols.is_empty())
            .cloned()
    }
}

/// Greedy longest-match spelling splitter over an alphabet.
///
/// `"shta"` over `{sh, s, t, a}` yields `sh t a`. Matching ignores case but
/// emits symbols as the alphabet spells them, so `"kaN"` over `{k, a, N}`
/// yields `k a N`. The whole word must be consumed, otherwise there is no
/// result.
#[derive(Debug, Clone)]
pub struct GraphemeG2p {
    /// `(match key, symbol)` pairs, longest key first.
    symbols: Vec<(String, String)>,
}

impl GraphemeG2p {
    /// Splitter over every symbol of the alphabet.
    ///
    /// Symbols that differ only in case share a key; the first in lexical
    /// order wins.
    pub fn new(alphabet: &Alphabet) -> Self {
        let mut symbols: Vec<(String, String)> = alphabet
            .iter()
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, _)| (name.to_lowercase(), name.to_string()))
            .collect();
        // longest first, lexical within a length
        symbols.sort_by(|a, b| {
            b.0.len()
                .cmp(&a.0.len())
                .then_with(|| a.0.cmp(&b.0))
                .then_with(|| a.1.cmp(&b.1))
        });
        symbols.dedup_by(|later, earlier| later.0 == earlier.0);
        Self { symbols }
    }
}

impl G2p for GraphemeG2p {
    fn query(&self, word: &str) -> Option<Vec<String>> {
        let word = word.to_lowercase();
        let mut rest = word.as_str();
        let mut out = Vec::new();
        while !rest.is_empty() {
            let (key, symbol) = self
                .symbols
                .iter()
                .find(|(key, _)| rest.starts_with(key.as_str()))?;
            rest = &rest[key.len()..];
            out.push(symbol.clone());
        }
        (!out.is_empty()).then_some(out)
    }
}

/// Ordered, short-circuiting chain of sources.
#[derive(Default)]
pub struct G2pChain {
    sources: Vec<Box<dyn G2p>>,
}

impl G2pChain {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source. Earlier sources take priority.
    pub fn push(&mut self, source: impl G2p + 'static) {
        self.sources.push(Box::new(source));
    }

    /// Builder form of [`G2pChain::push`].
    pub fn with(mut self, source: impl G2p + 'static) -> Self {
        self.push(source);
        self
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// True when the chain has no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl G2p for G2pChain {
    fn query(&self, word: &str) -> Option<Vec<String>> {
        self.sources
            .iter()
            .find_map(|source| source.query(word).filter(|symbols| !symbols.is_empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::ConsonantClass;

    fn alphabet() -> Alphabet {
        Alphabet::new()
            .with_vowels(["a", "i", "u"])
            .with_consonants(ConsonantClass::Fricative, ["s", "sh"])
            .with_consonants(ConsonantClass::Stop, ["t", "k"])
    }

    #[test]
    fn dictionary_is_case_insensitive() {
        let dict = DictionaryG2p::new().with_entry("Test", "t eh s t");
        assert_eq!(dict.query("TEST").unwrap(), vec!["t", "eh", "s", "t"]);
        assert!(dict.query("tests").is_none());
    }

    #[test]
    fn grapheme_prefers_longest_symbol() {
        let g2p = GraphemeG2p::new(&alphabet());
        assert_eq!(g2p.query("Shita").unwrap(), vec!["sh", "i", "t", "a"]);
        assert_eq!(g2p.query("suki").unwrap(), vec!["s", "u", "k", "i"]);
        assert!(g2p.query("xa").is_none());
        assert!(g2p.query("").is_none());
    }

    #[test]
    fn grapheme_keeps_symbol_case() {
        let alphabet = Alphabet::new()
            .with_vowels(["a", "N"])
            .with_consonants(ConsonantClass::Stop, ["k"]);
        let g2p = GraphemeG2p::new(&alphabet);
        assert_eq!(g2p.query("kaN").unwrap(), vec!["k", "a", "N"]);
        assert_eq!(g2p.query("KAn").unwrap(), vec!["k", "a", "N"]);
    }

    #[test]
    fn chain_short_circuits_in_order() {
        let local = DictionaryG2p::new().with_entry("ka", "k i");
        let bundled = DictionaryG2p::new()
            .with_entry("ka", "k a")
            .with_entry("ta", "t a");
        let chain = G2pChain::new()
            .with(local)
            .with(bundled)
            .with(GraphemeG2p::new(&alphabet()));

        assert_eq!(chain.len(), 3);
        assert_eq!(chain.query("ka").unwrap(), vec!["k", "i"]);
        assert_eq!(chain.query("ta").unwrap(), vec!["t", "a"]);
        assert_eq!(chain.query("sushi").unwrap(), vec!["s", "u", "sh", "i"]);
        assert!(chain.query("xyz").is_none());
    }

    #[test]
    fn empty_entries_fall_through() {
        let mut empty = DictionaryG2p::new();
        empty.insert("ka", Vec::<String>::new());
        let chain = G2pChain::new()
            .with(empty)
            .with(DictionaryG2p::new().with_entry("ka", "k a"));
        assert_eq!(chain.query("ka").unwrap(), vec!["k", "a"]);
    }
}
