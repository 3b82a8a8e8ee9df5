//! Tempo conversion between milliseconds and ticks.
//!
//! Voicebank timings are authored in milliseconds, the score in ticks. A
//! quarter note is `resolution` ticks at `bpm` beats per minute, with the
//! beat unit scaling what a "beat" means.

use crate::note::Tick;

/// Tempo context used when turning voicebank milliseconds into ticks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timing {
    /// Beats per minute.
    pub bpm: f64,
    /// Beat unit (4 = quarter note).
    pub beat_unit: u32,
    /// Ticks per quarter note.
    pub resolution: u32,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            bpm: 120.0,
            beat_unit: 4,
            resolution: 480,
        }
    }
}

impl Timing {
    /// Timing at a given tempo with default beat unit and resolution.
    pub fn with_bpm(bpm: f64) -> Self {
        Self {
            bpm,
            ..Self::default()
        }
    }

    /// Milliseconds per tick.
    fn ms_per_tick(&self) -> f64 {
        60_000.0 / self.bpm * f64::from(self.beat_unit) / 4.0 / f64::from(self.resolution)
    }

    /// Convert a tick span to milliseconds.
    pub fn tick_to_ms(&self, tick: Tick) -> f64 {
        tick as f64 * self.ms_per_tick()
    }

    /// Convert milliseconds to the nearest tick.
    pub fn ms_to_tick(&self, ms: f64) -> Tick {
        let per = self.ms_per_tick();
        if !per.is_finite() || per <= 0.0 {
            return 0;
        }
        (ms / per).round() as Tick
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quarter_note_at_120_is_500ms() {
        let timing = Timing::default();
        assert!((timing.tick_to_ms(480) - 500.0).abs() < 1e-9);
        assert_eq!(timing.ms_to_tick(500.0), 480);
    }

    #[test]
    fn faster_tempo_means_more_ticks_per_ms() {
        let slow = Timing::with_bpm(60.0);
        let fast = Timing::with_bpm(240.0);
        assert_eq!(slow.ms_to_tick(100.0), 48);
        assert_eq!(fast.ms_to_tick(100.0), 192);
    }

    #[test]
    fn degenerate_tempo_yields_zero() {
        let timing = Timing {
            bpm: 0.0,
            ..Timing::default()
        };
        assert_eq!(timing.ms_to_tick(100.0), 0);
    }
}
