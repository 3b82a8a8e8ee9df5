//! Vocaline Core - alias resolution and timing for concatenative singing
//!
//! This crate turns groups of sung notes into ordered phoneme events: each
//! event names a voicebank sample (an *alias*) and its tick offset from the
//! start of the group. It knows nothing about audio; the voicebank is seen
//! only through the [`AliasQuery`] trait.
//!
//! # Pipeline
//!
//! 1. **Extract** - [`extract`] reads a note's phonetic hint or looks its
//!    lyric up through a [`G2p`] chain, and keeps only symbols of the
//!    language's [`Alphabet`].
//! 2. **Segment** - [`Segmenter`] cuts the symbols into [`Syllable`]s, one
//!    per vowel, and an [`Ending`] for the trailing consonants.
//! 3. **Resolve** - [`AliasResolver`] renders each slot's candidate
//!    [`Template`]s and picks the first alias the voicebank has, repairing
//!    candidates once and degrading to bare symbols when nothing matches.
//! 4. **Allocate** - [`Allocator`] places samples around their anchor with
//!    widths from the voicebank or from the [`TimingPolicy`].
//! 5. **Compose** - [`compose`] applies per-slot overrides (tone shift,
//!    voice color, alternate) and orders the events.
//!
//! [`Phonemizer`] runs the whole pipeline for one [`NoteGroup`].
//!
//! # Configuration
//!
//! A [`ResolverConfig`] is built once per language table and singer with
//! [`ResolverConfigBuilder`]. Calling [`ResolverConfigBuilder::attach`]
//! probes the voicebank and activates only the fallbacks it needs. The
//! resulting config is immutable and may be shared across threads.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vocaline_core::{
//!     AliasSet, Alphabet, ConsonantClass, DictionaryG2p, Note, NoteGroup, Phonemizer,
//!     ResolverConfigBuilder,
//! };
//!
//! let bank = AliasSet::from_aliases(["- sa", "a k", "ka", "a -"]);
//! let config = ResolverConfigBuilder::new()
//!     .alphabet(
//!         Alphabet::new()
//!             .with_vowels(["a"])
//!             .with_consonants(ConsonantClass::Stop, ["k"])
//!             .with_consonants(ConsonantClass::Fricative, ["s"]),
//!     )
//!     .attach(&bank);
//! let g2p = DictionaryG2p::new().with_entry("saka", "s a k a");
//! let phonemizer = Phonemizer::new(Arc::new(config), Arc::new(g2p));
//!
//! let notes = [Note::new("saka", 60, 0, 480), Note::new("+", 62, 480, 480)];
//! let events = phonemizer.process(&NoteGroup::new(&notes), &bank);
//! let aliases: Vec<&str> = events.iter().map(|e| e.alias.as_str()).collect();
//! assert_eq!(aliases, ["- sa", "a k", "ka", "a -"]);
//! ```
//!
//! # Tracing
//!
//! With the `tracing` feature enabled, repairs and degradations are logged
//! at `warn` and passthroughs at `debug`.

pub mod allocate;
pub mod candidates;
pub mod compose;
pub mod config;
pub mod engine;
pub mod extract;
pub mod g2p;
pub mod note;
pub mod query;
pub mod resolve;
pub mod segment;
pub mod symbol;
pub mod template;
pub mod timing;

pub use allocate::{Allocator, align, clamp_widths, distribute};
pub use candidates::{CandidateTable, SlotRole};
pub use compose::{PlacedSample, compose};
pub use config::{
    PROBE_TONE, ReplacementRule, ResolverConfig, ResolverConfigBuilder, Substitution, TimingPolicy,
};
pub use engine::Phonemizer;
pub use extract::{WORD_SEPARATORS, extract};
pub use g2p::{DictionaryG2p, G2p, G2pChain, GraphemeG2p};
pub use note::{Note, NoteGroup, PhonemeEvent, PositionAttribute, Tick};
pub use query::{AliasQuery, AliasSet, MemoQuery, OtoMatch};
pub use resolve::{AliasResolver, Placement, ResolvedSample};
pub use segment::{
    Analysis, Ending, EndingShape, Segmenter, Syllable, SyllableNote, SyllableShape,
    layout_ending, layout_syllables,
};
pub use symbol::{Alphabet, ConsonantClass, Symbol, SymbolClass, SymbolKind};
pub use template::{Placeholder, SlotContext, Template, TemplateError};
pub use timing::Timing;
