//! [`AliasQuery`] over a loaded voicebank.

use vocaline_core::{AliasQuery, OtoMatch, Timing};

use crate::voicebank::Voicebank;

/// A voicebank seen at one tempo.
///
/// Oto timings are milliseconds; the engine works in ticks, so every
/// match is converted with the tempo given here.
#[derive(Debug, Clone, Copy)]
pub struct VoicebankQuery<'a> {
    bank: &'a Voicebank,
    timing: Timing,
}

impl<'a> VoicebankQuery<'a> {
    /// Query `bank` at `timing`.
    pub fn new(bank: &'a Voicebank, timing: Timing) -> Self {
        Self { bank, timing }
    }

    /// The tempo used for conversions.
    pub fn timing(&self) -> Timing {
        self.timing
    }
}

impl AliasQuery for VoicebankQuery<'_> {
    fn resolve(&self, name: &str, tone: i32, color: Option<&str>) -> Option<OtoMatch> {
        let entry = self.bank.find(name, tone, color)?;
        Some(OtoMatch {
            alias: entry.alias.clone(),
            attack: self.timing.ms_to_tick(entry.preutter).max(0),
            overlap: self.timing.ms_to_tick(entry.overlap),
        })
    }

    fn exists(&self, name: &str, tone: i32, color: Option<&str>) -> bool {
        self.bank.find(name, tone, color).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subbank::Subbank;

    #[test]
    fn converts_milliseconds_to_ticks() {
        let bank = Voicebank::from_oto_str("ka.wav=- ka,0,80,-200,125,25\n");
        let query = VoicebankQuery::new(&bank, Timing::default());
        let hit = query.resolve("- ka", 60, None).unwrap();
        assert_eq!(hit.alias, "- ka");
        assert_eq!(hit.attack, 120);
        assert_eq!(hit.overlap, 24);

        let slow = VoicebankQuery::new(&bank, Timing::with_bpm(60.0));
        assert_eq!(slow.resolve("- ka", 60, None).unwrap().attack, 60);
    }

    #[test]
    fn negative_preutter_clamps_to_zero() {
        let bank = Voicebank::from_oto_str("a.wav=a,0,0,0,-30,0\n");
        let query = VoicebankQuery::new(&bank, Timing::default());
        assert_eq!(query.resolve("a", 60, None).unwrap().attack, 0);
    }

    #[test]
    fn reports_decorated_alias() {
        let bank = Voicebank::from_oto_str("a.wav=a,0,0,0,0,0\nah.wav=a_H,0,0,0,0,0\n")
            .with_subbank(Subbank::new("", "", "_H").with_tones(72, 84));
        let query = VoicebankQuery::new(&bank, Timing::default());
        assert!(query.exists("a", 60, None));
        assert_eq!(query.resolve("a", 76, None).unwrap().alias, "a_H");
        assert!(!query.exists("i", 76, None));
    }
}
