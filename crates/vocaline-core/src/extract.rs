//! Lyric to symbol extraction.

use crate::config::ResolverConfig;
use crate::g2p::G2p;
use crate::note::Note;
use crate::symbol::Symbol;

/// Characters that split a lyric into sub-words for dictionary lookup.
pub const WORD_SEPARATORS: [char; 2] = [' ', '_'];

/// Extract the typed symbol sequence for a note.
///
/// A non-empty phonetic hint wins over the dictionary: it is split on
/// whitespace and tokens outside the alphabet are dropped. Otherwise every
/// sub-word of the lyric is looked up through `g2p` and the language's
/// replacement rules run over the result. An empty return value means the
/// lyric should pass through unresolved.
pub fn extract(note: &Note, config: &ResolverConfig, g2p: &dyn G2p) -> Vec<Symbol> {
    let alphabet = config.alphabet();
    let hint = note
        .phonetic_hint
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty());

    let names = match hint {
        Some(hint) => hint
            .split_whitespace()
            .filter(|token| {
                let valid = alphabet.is_valid(token);
                #[cfg(feature = "tracing")]
                if !valid {
                    tracing::debug!("extract: dropping hint token '{token}'");
                }
                valid
            })
            .map(str::to_string)
            .collect(),
        None => match lookup(&note.lyric, g2p) {
            Some(names) => config.apply_replacements(names),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!("extract: no dictionary entry for '{}'", note.lyric);
                return Vec::new();
            }
        },
    };

    names
        .iter()
        .filter_map(|name| alphabet.symbol(name))
        .collect()
}

fn lookup(lyric: &str, g2p: &dyn G2p) -> Option<Vec<String>> {
    let mut out = Vec::new();
    for word in lyric
        .trim()
        .split(|c| WORD_SEPARATORS.contains(&c))
        .filter(|w| !w.is_empty())
    {
        out.extend(g2p.query(word)?);
    }
    (!out.is_empty()).then_some(out)
}
