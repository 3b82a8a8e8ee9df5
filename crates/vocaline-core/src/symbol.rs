//! Phonetic symbols and the per-language alphabet.
//!
//! An [`Alphabet`] is the closed set of symbols a language table declares.
//! Every symbol carries a [`SymbolClass`]: vowels are syllable nuclei, and
//! consonants carry a [`ConsonantClass`] that drives nominal transition
//! widths. Liquids and semivowels are *glides*: they segment like
//! consonants but align differently in manual-alignment mode.

use std::collections::BTreeMap;
use std::fmt;

/// Coarse role of a symbol inside a syllable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SymbolKind {
    /// Syllable nucleus.
    Vowel,
    /// Onset or coda material.
    Consonant,
    /// Liquid or semivowel. Segments as a consonant.
    Glide,
}

/// Articulation class of a consonant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConsonantClass {
    /// Plosive (`p`, `t`, `k`, ...).
    Stop,
    /// Fricative (`s`, `sh`, `f`, ...).
    Fricative,
    /// Affricate (`ch`, `jh`, `ts`, ...).
    Affricate,
    /// Nasal (`m`, `n`, `ng`).
    Nasal,
    /// Tap or flap (`dx`).
    Tap,
    /// Liquid (`l`, `r`). A glide.
    Liquid,
    /// Semivowel (`w`, `y`). A glide.
    Semivowel,
    /// Anything the table does not classify further.
    Other,
}

impl ConsonantClass {
    /// Every class, in declaration order.
    pub const ALL: [ConsonantClass; 8] = [
        ConsonantClass::Stop,
        ConsonantClass::Fricative,
        ConsonantClass::Affricate,
        ConsonantClass::Nasal,
        ConsonantClass::Tap,
        ConsonantClass::Liquid,
        ConsonantClass::Semivowel,
        ConsonantClass::Other,
    ];

    /// Table name of the class.
    pub const fn name(self) -> &'static str {
        match self {
            ConsonantClass::Stop => "stop",
            ConsonantClass::Fricative => "fricative",
            ConsonantClass::Affricate => "affricate",
            ConsonantClass::Nasal => "nasal",
            ConsonantClass::Tap => "tap",
            ConsonantClass::Liquid => "liquid",
            ConsonantClass::Semivowel => "semivowel",
            ConsonantClass::Other => "consonant",
        }
    }

    /// Parse a table name. `"consonant"` and `"other"` both map to [`ConsonantClass::Other`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "stop" | "plosive" => Some(ConsonantClass::Stop),
            "fricative" => Some(ConsonantClass::Fricative),
            "affricate" => Some(ConsonantClass::Affricate),
            "nasal" => Some(ConsonantClass::Nasal),
            "tap" | "flap" => Some(ConsonantClass::Tap),
            "liquid" => Some(ConsonantClass::Liquid),
            "semivowel" => Some(ConsonantClass::Semivowel),
            "consonant" | "other" => Some(ConsonantClass::Other),
            _ => None,
        }
    }

    /// Liquids and semivowels are glides.
    pub const fn is_glide(self) -> bool {
        matches!(self, ConsonantClass::Liquid | ConsonantClass::Semivowel)
    }
}

/// Full classification of a symbol as declared by a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolClass {
    /// A vowel.
    Vowel,
    /// A consonant of the given class.
    Consonant(ConsonantClass),
}

impl SymbolClass {
    /// Coarse kind derived from the class.
    pub const fn kind(self) -> SymbolKind {
        match self {
            SymbolClass::Vowel => SymbolKind::Vowel,
            SymbolClass::Consonant(class) if class.is_glide() => SymbolKind::Glide,
            SymbolClass::Consonant(_) => SymbolKind::Consonant,
        }
    }

    /// Parse a table type string such as `"vowel"` or `"fricative"`.
    pub fn from_name(name: &str) -> Option<Self> {
        if name.trim().eq_ignore_ascii_case("vowel") {
            return Some(SymbolClass::Vowel);
        }
        ConsonantClass::from_name(name).map(SymbolClass::Consonant)
    }

    /// Table type string.
    pub const fn name(self) -> &'static str {
        match self {
            SymbolClass::Vowel => "vowel",
            SymbolClass::Consonant(class) => class.name(),
        }
    }

    /// Consonant class, if any.
    pub const fn consonant_class(self) -> Option<ConsonantClass> {
        match self {
            SymbolClass::Vowel => None,
            SymbolClass::Consonant(class) => Some(class),
        }
    }
}

/// A phonetic symbol with its coarse kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
}

impl Symbol {
    /// Create a symbol.
    pub fn new(name: impl Into<String>, kind: SymbolKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// The symbol text.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The symbol kind.
    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// True for vowels.
    pub fn is_vowel(&self) -> bool {
        self.kind == SymbolKind::Vowel
    }

    /// True for consonants and glides.
    pub fn is_consonant(&self) -> bool {
        !self.is_vowel()
    }

    /// True for glides.
    pub fn is_glide(&self) -> bool {
        self.kind == SymbolKind::Glide
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// The closed symbol set of one language.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alphabet {
    symbols: BTreeMap<String, SymbolClass>,
}

impl Alphabet {
    /// Create an empty alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a symbol. Returns the previous class when the symbol was already declared.
    pub fn insert(&mut self, name: impl Into<String>, class: SymbolClass) -> Option<SymbolClass> {
        self.symbols.insert(name.into(), class)
    }

    /// Builder form of [`Alphabet::insert`].
    pub fn with(mut self, name: impl Into<String>, class: SymbolClass) -> Self {
        self.insert(name, class);
        self
    }

    /// Declare several vowels at once.
    pub fn with_vowels<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Self {
        for name in names {
            self.insert(name, SymbolClass::Vowel);
        }
        self
    }

    /// Declare several consonants of one class at once.
    pub fn with_consonants<'a>(
        mut self,
        class: ConsonantClass,
        names: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        for name in names {
            self.insert(name, SymbolClass::Consonant(class));
        }
        self
    }

    /// Class of a symbol, if declared.
    pub fn class(&self, name: &str) -> Option<SymbolClass> {
        self.symbols.get(name).copied()
    }

    /// Kind of a symbol, if declared.
    pub fn kind(&self, name: &str) -> Option<SymbolKind> {
        self.class(name).map(SymbolClass::kind)
    }

    /// Whether the symbol is part of this alphabet.
    pub fn is_valid(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    /// Whether the symbol is a declared vowel.
    pub fn is_vowel(&self, name: &str) -> bool {
        self.kind(name) == Some(SymbolKind::Vowel)
    }

    /// Typed symbol for a declared name.
    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.kind(name).map(|kind| Symbol::new(name, kind))
    }

    /// Number of declared symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// True when nothing is declared.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Declared symbols in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, SymbolClass)> {
        self.symbols.iter().map(|(name, class)| (name.as_str(), *class))
    }
}
