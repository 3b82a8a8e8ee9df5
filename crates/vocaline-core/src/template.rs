//! Alias candidate templates.
//!
//! A template is literal text with placeholders that are filled from the
//! syllable being resolved:
//!
//! ```text
//! "- {c}{v}"     -> "- ka"      phrase-initial CV
//! "{pv} {c}{v}"  -> "a ka"      VCV
//! "{cs} {v}"     -> "s t a"     spaced cluster
//! ```
//!
//! ## Grammar
//!
//! ```text
//! template    ::= ( text | placeholder )*
//! placeholder ::= '{' name '}'
//! name        ::= 'pv' | 'v' | 'c' | 'cs' | 'c0' | 'cl' | 's' | 'ps'
//! text        ::= any char except '{' and '}', or '{{' / '}}' escapes
//! ```
//!
//! Templates are parsed once when the configuration is built. Rendering a
//! template whose placeholder has no value (for instance `{pv}` at the start
//! of a phrase) yields `None` and the candidate is skipped.

use std::fmt;

use thiserror::Error;

/// A placeholder inside a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// `{pv}`: vowel of the previous syllable.
    PrevVowel,
    /// `{v}`: vowel of the current syllable.
    Vowel,
    /// `{c}`: consonant cluster joined without separators.
    Cluster,
    /// `{cs}`: consonant cluster joined with spaces.
    SpacedCluster,
    /// `{c0}`: first consonant of the cluster.
    FirstConsonant,
    /// `{cl}`: last consonant of the cluster.
    LastConsonant,
    /// `{s}`: current symbol (manual alignment).
    Symbol,
    /// `{ps}`: previous symbol (manual alignment).
    PrevSymbol,
}

impl Placeholder {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "pv" => Placeholder::PrevVowel,
            "v" => Placeholder::Vowel,
            "c" => Placeholder::Cluster,
            "cs" => Placeholder::SpacedCluster,
            "c0" => Placeholder::FirstConsonant,
            "cl" => Placeholder::LastConsonant,
            "s" => Placeholder::Symbol,
            "ps" => Placeholder::PrevSymbol,
            _ => return None,
        })
    }
}

/// Template parse errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// `{name}` with an unknown name.
    #[error("unknown placeholder '{{{name}}}' at position {pos}")]
    UnknownPlaceholder {
        /// Placeholder name as written.
        name: String,
        /// Byte offset of the opening brace.
        pos: usize,
    },
    /// `{` without a matching `}`.
    #[error("unclosed placeholder at position {pos}")]
    Unclosed {
        /// Byte offset of the opening brace.
        pos: usize,
    },
    /// A lone `}`.
    #[error("unmatched '}}' at position {pos}")]
    UnmatchedClose {
        /// Byte offset of the brace.
        pos: usize,
    },
    /// Template renders to nothing.
    #[error("empty template")]
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Text(String),
    Slot(Placeholder),
}

/// Values available when rendering a template.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotContext<'a> {
    /// Previous syllable's vowel.
    pub prev_vowel: Option<&'a str>,
    /// Consonant cluster being covered.
    pub cluster: &'a [String],
    /// Current vowel.
    pub vowel: Option<&'a str>,
    /// Current symbol (manual alignment).
    pub symbol: Option<&'a str>,
    /// Previous symbol (manual alignment).
    pub prev_symbol: Option<&'a str>,
}

impl<'a> SlotContext<'a> {
    /// Context for a vowel-only slot.
    pub fn vowel(prev_vowel: Option<&'a str>, vowel: &'a str) -> Self {
        Self {
            prev_vowel,
            vowel: Some(vowel),
            ..Self::default()
        }
    }

    /// Context for a slot covering a consonant run.
    pub fn cluster(prev_vowel: Option<&'a str>, cluster: &'a [String], vowel: Option<&'a str>) -> Self {
        Self {
            prev_vowel,
            cluster,
            vowel,
            ..Self::default()
        }
    }

    /// Context for a manually aligned symbol.
    pub fn aligned(prev_symbol: Option<&'a str>, symbol: &'a str) -> Self {
        Self {
            symbol: Some(symbol),
            prev_symbol,
            ..Self::default()
        }
    }

    fn value(&self, placeholder: Placeholder) -> Option<String> {
        match placeholder {
            Placeholder::PrevVowel => self.prev_vowel.map(str::to_string),
            Placeholder::Vowel => self.vowel.map(str::to_string),
            Placeholder::Cluster if !self.cluster.is_empty() => Some(self.cluster.concat()),
            Placeholder::SpacedCluster if !self.cluster.is_empty() => Some(self.cluster.join(" ")),
            Placeholder::Cluster | Placeholder::SpacedCluster => None,
            Placeholder::FirstConsonant => self.cluster.first().cloned(),
            Placeholder::LastConsonant => self.cluster.last().cloned(),
            Placeholder::Symbol => self.symbol.map(str::to_string),
            Placeholder::PrevSymbol => self.prev_symbol.map(str::to_string),
        }
    }
}

/// A parsed alias template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    pieces: Vec<Piece>,
}

impl Template {
    /// Parse a template string.
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let pieces = Parser::new(source).parse()?;
        if pieces.is_empty() {
            return Err(TemplateError::Empty);
        }
        Ok(Self {
            source: source.to_string(),
            pieces,
        })
    }

    /// Source text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Render against a context. `None` when a placeholder has no value.
    pub fn render(&self, ctx: &SlotContext<'_>) -> Option<String> {
        let mut out = String::new();
        for piece in &self.pieces {
            match piece {
                Piece::Text(text) => out.push_str(text),
                Piece::Slot(placeholder) => out.push_str(&ctx.value(*placeholder)?),
            }
        }
        Some(out)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Single-pass scanner over the template source.
struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self, ch: char) {
        self.pos += ch.len_utf8();
    }

    fn starts_with(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn parse(&mut self) -> Result<Vec<Piece>, TemplateError> {
        let mut pieces = Vec::new();
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if self.starts_with("{{") || self.starts_with("}}") {
                text.push(ch);
                self.pos += 2;
                continue;
            }
            match ch {
                '{' => {
                    if !text.is_empty() {
                        pieces.push(Piece::Text(std::mem::take(&mut text)));
                    }
                    pieces.push(Piece::Slot(self.parse_placeholder()?));
                }
                '}' => return Err(TemplateError::UnmatchedClose { pos: self.pos }),
                _ => {
                    text.push(ch);
                    self.advance(ch);
                }
            }
        }
        if !text.is_empty() {
            pieces.push(Piece::Text(text));
        }
        Ok(pieces)
    }

    fn parse_placeholder(&mut self) -> Result<Placeholder, TemplateError> {
        let open = self.pos;
        self.pos += 1;
        let rest = &self.input[self.pos..];
        let Some(len) = rest.find('}') else {
            return Err(TemplateError::Unclosed { pos: open });
        };
        let name = rest[..len].trim();
        if name.contains('{') {
            return Err(TemplateError::Unclosed { pos: open });
        }
        let placeholder =
            Placeholder::from_name(name).ok_or_else(|| TemplateError::UnknownPlaceholder {
                name: name.to_string(),
                pos: open,
            })?;
        self.pos += len + 1;
        Ok(placeholder)
    }
}
