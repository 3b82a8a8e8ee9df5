//! UTAU-style voicebanks for the vocaline phonemizer.
//!
//! Loads `oto.ini` alias tables and `prefix.map` subbanks from a voicebank
//! directory into memory and exposes them to the engine through
//! [`VoicebankQuery`], an [`AliasQuery`](vocaline_core::AliasQuery)
//! implementation that maps aliases through pitch and color subbanks and
//! converts oto timings to ticks.
//!
//! # Example
//!
//! ```rust
//! use vocaline_core::{AliasQuery, Timing};
//! use vocaline_voicebank::{Subbank, Voicebank, VoicebankQuery};
//!
//! let bank = Voicebank::from_oto_str(
//!     "ka.wav=- ka,0,80,-200,125,25\nka_H.wav=- ka_H,0,80,-200,100,25\n",
//! )
//! .with_subbank(Subbank::new("", "", "_H").with_tones(72, 84));
//!
//! let query = VoicebankQuery::new(&bank, Timing::default());
//! assert_eq!(query.resolve("- ka", 60, None).unwrap().attack, 120);
//! assert_eq!(query.resolve("- ka", 74, None).unwrap().alias, "- ka_H");
//! ```

mod error;
mod oto;
mod query;
mod subbank;
mod voicebank;

pub use error::VoicebankError;
pub use oto::OtoEntry;
pub use query::VoicebankQuery;
pub use subbank::{Subbank, parse_tone_name};
pub use voicebank::{COLOR_MAP_DIR, OTO_FILE, PREFIX_MAP_FILE, Voicebank};
