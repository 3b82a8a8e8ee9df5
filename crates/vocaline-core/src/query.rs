//! The voicebank seam.
//!
//! The engine never reads a voicebank directly. It asks an [`AliasQuery`]
//! whether an alias exists for a tone and voice color, and for the sample's
//! timing when it needs a width. [`MemoQuery`] caches answers for the
//! duration of one call, since cascades probe the same names repeatedly.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};

use crate::note::Tick;

/// A resolved voicebank sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtoMatch {
    /// The alias the voicebank actually stores (prefix and suffix applied).
    pub alias: String,
    /// Pre-utterance in ticks: how far before the note the sample starts.
    pub attack: Tick,
    /// Overlap in ticks with the previous sample.
    pub overlap: Tick,
}

/// Read-only lookup into a voicebank.
pub trait AliasQuery {
    /// Resolve an alias under a tone and optional voice color.
    fn resolve(&self, name: &str, tone: i32, color: Option<&str>) -> Option<OtoMatch>;

    /// Whether the alias resolves.
    fn exists(&self, name: &str, tone: i32, color: Option<&str>) -> bool {
        self.resolve(name, tone, color).is_some()
    }
}

impl<T: AliasQuery + ?Sized> AliasQuery for &T {
    fn resolve(&self, name: &str, tone: i32, color: Option<&str>) -> Option<OtoMatch> {
        (**self).resolve(name, tone, color)
    }

    fn exists(&self, name: &str, tone: i32, color: Option<&str>) -> bool {
        (**self).exists(name, tone, color)
    }
}

type MemoKey = (String, i32, Option<String>);

/// Per-call cache in front of another query.
pub struct MemoQuery<'q> {
    inner: &'q dyn AliasQuery,
    cache: RefCell<HashMap<MemoKey, Option<OtoMatch>>>,
}

impl<'q> MemoQuery<'q> {
    /// Wrap a query.
    pub fn new(inner: &'q dyn AliasQuery) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of distinct lookups cached so far.
    pub fn cached(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl AliasQuery for MemoQuery<'_> {
    fn resolve(&self, name: &str, tone: i32, color: Option<&str>) -> Option<OtoMatch> {
        let key = (name.to_string(), tone, color.map(str::to_string));
        if let Some(hit) = self.cache.borrow().get(&key) {
            return hit.clone();
        }
        let result = self.inner.resolve(name, tone, color);
        self.cache.borrow_mut().insert(key, result.clone());
        result
    }
}

/// A flat in-memory alias set that ignores tone and color.
///
/// Useful for hosts without a voicebank on disk, and for tests.
#[derive(Debug, Clone, Default)]
pub struct AliasSet {
    aliases: BTreeMap<String, (Tick, Tick)>,
}

impl AliasSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set containing the given aliases with zero timing.
    pub fn from_aliases<I, S>(aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for alias in aliases {
            set.insert(alias, 0, 0);
        }
        set
    }

    /// Add an alias with explicit attack and overlap ticks.
    pub fn insert(&mut self, alias: impl Into<String>, attack: Tick, overlap: Tick) {
        self.aliases.insert(alias.into(), (attack, overlap));
    }

    /// Builder form of [`AliasSet::insert`].
    pub fn with_timing(mut self, alias: impl Into<String>, attack: Tick, overlap: Tick) -> Self {
        self.insert(alias, attack, overlap);
        self
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// True when empty.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl AliasQuery for AliasSet {
    fn resolve(&self, name: &str, _tone: i32, _color: Option<&str>) -> Option<OtoMatch> {
        self.aliases.get(name).map(|&(attack, overlap)| OtoMatch {
            alias: name.to_string(),
            attack,
            overlap,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Counting {
        calls: Cell<usize>,
        set: AliasSet,
    }

    impl AliasQuery for Counting {
        fn resolve(&self, name: &str, tone: i32, color: Option<&str>) -> Option<OtoMatch> {
            self.calls.set(self.calls.get() + 1);
            self.set.resolve(name, tone, color)
        }
    }

    #[test]
    fn alias_set_exists() {
        let set = AliasSet::from_aliases(["- ka", "a"]).with_timing("a i", 40, 10);
        assert!(set.exists("- ka", 60, None));
        assert!(!set.exists("ka", 60, None));
        let hit = set.resolve("a i", 72, Some("soft")).unwrap();
        assert_eq!((hit.attack, hit.overlap), (40, 10));
    }

    #[test]
    fn memo_caches_hits_and_misses() {
        let inner = Counting {
            calls: Cell::new(0),
            set: AliasSet::from_aliases(["a"]),
        };
        let memo = MemoQuery::new(&inner);
        for _ in 0..3 {
            assert!(memo.exists("a", 60, None));
            assert!(!memo.exists("b", 60, None));
        }
        assert_eq!(inner.calls.get(), 2);
        assert_eq!(memo.cached(), 2);

        assert!(memo.exists("a", 61, None));
        assert_eq!(inner.calls.get(), 3);
    }
}
