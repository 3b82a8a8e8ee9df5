//! Tick placement of resolved samples.
//!
//! Syllable samples hang off the nucleus anchor: leading samples stack
//! backwards from it with widths taken from the voicebank's attack time,
//! or the nominal consonant length when the voicebank has none. Ending
//! samples stack backwards from the end of the group. Both stacks are
//! clamped so they never eat more than a fraction of the note they
//! intrude into.
//!
//! Manually aligned groups (`+N` notes) use [`align`] instead, which pins
//! symbols to note starts and spreads the rest evenly between pins.

use crate::config::{ResolverConfig, TimingPolicy};
use crate::note::{Note, Tick};
use crate::query::AliasQuery;
use crate::resolve::{Placement, ResolvedSample};
use crate::segment::{Ending, Syllable};
use crate::symbol::{SymbolClass, SymbolKind};

/// Scale `widths` down so they sum to at most `cap`.
///
/// Scaled widths are floored to a multiple of `quantum`. Widths already
/// within the cap are left untouched.
pub fn clamp_widths(widths: &mut [Tick], cap: Tick, quantum: Tick) {
    let sum: Tick = widths.iter().sum();
    let cap = cap.max(0);
    if sum <= cap {
        return;
    }
    let ratio = cap as f64 / sum as f64;
    for width in widths.iter_mut() {
        let scaled = (*width as f64 * ratio).floor() as Tick;
        *width = if quantum > 1 {
            scaled / quantum * quantum
        } else {
            scaled
        };
    }
}

/// Assigns tick offsets to resolved samples.
pub struct Allocator<'a> {
    config: &'a ResolverConfig,
    query: &'a dyn AliasQuery,
}

impl<'a> Allocator<'a> {
    /// Create an allocator.
    pub fn new(config: &'a ResolverConfig, query: &'a dyn AliasQuery) -> Self {
        Self { config, query }
    }

    /// Width of one sample, scaled by `stretch`.
    pub fn width(&self, sample: &ResolvedSample, stretch: f64) -> Tick {
        let base = match self.query.resolve(&sample.alias, sample.tone, None) {
            Some(oto) if oto.attack > 0 => oto.attack,
            _ => {
                let class = self
                    .config
                    .alphabet()
                    .class(&sample.symbol)
                    .and_then(SymbolClass::consonant_class);
                self.config.policy().nominal_width(&sample.symbol, class)
            }
        };
        (base as f64 * stretch).round().max(0.0) as Tick
    }

    /// Offsets for a syllable's samples, in the same order.
    ///
    /// The nucleus sits on the syllable position. Leading samples may
    /// occupy at most `lead_clamp` of the previous note, or the whole group
    /// duration at phrase start.
    pub fn allocate_syllable(
        &self,
        samples: &[ResolvedSample],
        syllable: &Syllable,
        group_duration: Tick,
        stretch: &[f64],
    ) -> Vec<Tick> {
        let anchor = syllable.position;
        let nucleus = samples
            .iter()
            .rposition(|s| s.placement == Placement::Nucleus)
            .unwrap_or(samples.len().saturating_sub(1));

        let mut widths: Vec<Tick> = samples[..nucleus]
            .iter()
            .enumerate()
            .map(|(i, s)| self.width(s, ratio(stretch, i)))
            .collect();
        let policy = self.config.policy();
        let cap = match syllable.duration {
            Some(prev) => (prev as f64 * policy.lead_clamp).floor() as Tick,
            None => group_duration,
        };
        clamp_widths(&mut widths, cap, policy.tick_quantum);

        let mut out = vec![anchor; samples.len()];
        let mut offset = anchor;
        for i in (0..nucleus).rev() {
            offset -= widths[i];
            out[i] = offset;
        }
        out
    }

    /// Offsets for an ending's samples, counted back from the group end.
    ///
    /// The final sample is `duration / tail_divisor` wide. Together the
    /// samples occupy at most `tail_clamp` of the last syllable.
    pub fn allocate_ending(
        &self,
        samples: &[ResolvedSample],
        ending: &Ending,
        stretch: &[f64],
    ) -> Vec<Tick> {
        let policy = self.config.policy();
        let last = samples.len().saturating_sub(1);
        let mut widths: Vec<Tick> = samples
            .iter()
            .enumerate()
            .map(|(i, s)| {
                if i == last && policy.tail_divisor > 0 {
                    let tail = ending.duration / policy.tail_divisor;
                    (tail as f64 * ratio(stretch, i)).round() as Tick
                } else {
                    self.width(s, ratio(stretch, i))
                }
            })
            .collect();
        let cap = (ending.duration as f64 * policy.tail_clamp).floor() as Tick;
        clamp_widths(&mut widths, cap, policy.tick_quantum);

        let mut out = vec![ending.position; samples.len()];
        let mut offset = ending.position;
        for i in (0..samples.len()).rev() {
            offset -= widths[i];
            out[i] = offset;
        }
        out
    }
}

fn ratio(stretch: &[f64], i: usize) -> f64 {
    stretch
        .get(i)
        .copied()
        .filter(|r| r.is_finite() && *r >= 0.0)
        .unwrap_or(1.0)
}

/// Spread `kinds[start..end]` over `[start_tick, end_tick)`.
///
/// Consonants take `min(consonant_length, duration / 2 / consonants)` each
/// when vowels are present; vowels share what is left. Returns one offset
/// per symbol in the range.
pub fn distribute(
    kinds: &[SymbolKind],
    start: usize,
    end: usize,
    start_tick: Tick,
    end_tick: Tick,
    consonant_length: Tick,
) -> Vec<Tick> {
    if start >= end {
        return Vec::new();
    }
    let range = &kinds[start..end];
    let vowels = range.iter().filter(|k| **k == SymbolKind::Vowel).count() as Tick;
    let consonants = range.len() as Tick - vowels;
    let duration = end_tick - start_tick;

    let consonant_width = match (vowels, consonants) {
        (_, 0) => 0,
        (0, c) => duration / c,
        (_, c) => consonant_length.min(duration / 2 / c),
    };
    let vowel_width = if vowels > 0 {
        (duration - consonant_width * consonants) / vowels
    } else {
        0
    };

    let mut position = start_tick;
    range
        .iter()
        .map(|kind| {
            let at = position;
            position += if *kind == SymbolKind::Vowel {
                vowel_width
            } else {
                consonant_width
            };
            at
        })
        .collect()
}

#[derive(Debug, Clone, Copy)]
struct Pin {
    index: usize,
    tick: Tick,
    manual: bool,
}

/// Offsets for a manually aligned group.
///
/// One vowel is pinned to the start of each non-extension note (the glide
/// in a consonant-glide-vowel run), `+N` notes pin the N-th symbol to their
/// start, and the group end closes the last span. Conflicting automatic
/// pins give way to manual ones.
///
/// Symbols ahead of the first note's pin lead into the previous note and
/// are clamped like syllable onsets: at most `lead_clamp` of
/// `prev_duration`, or the whole group at phrase start.
pub fn align(
    kinds: &[SymbolKind],
    notes: &[Note],
    policy: &TimingPolicy,
    prev_duration: Option<Tick>,
) -> Vec<Tick> {
    let Some(lead) = notes.first() else {
        return vec![0; kinds.len()];
    };
    let is_vowel = |i: usize| kinds[i] == SymbolKind::Vowel;

    let starts: Vec<Tick> = notes
        .iter()
        .filter(|n| !n.is_extension())
        .map(|n| n.position - lead.position)
        .collect();
    let mut pins: Vec<Pin> = Vec::new();
    for i in 0..kinds.len() {
        if is_vowel(i) && pins.len() < starts.len() {
            let index = if i >= 2 && kinds[i - 1] == SymbolKind::Glide && !is_vowel(i - 2) {
                i - 1
            } else {
                i
            };
            pins.push(Pin {
                index,
                tick: starts[pins.len()],
                manual: false,
            });
        }
    }
    let leading = pins.first().map_or(0, |p| p.index);

    let mut position = lead.duration;
    for note in &notes[1..] {
        if let Some(index) = note.alignment_index().filter(|&i| i <= kinds.len()) {
            pins.push(Pin {
                index,
                tick: position,
                manual: true,
            });
        }
        position += note.duration;
    }
    pins.push(Pin {
        index: kinds.len(),
        tick: position,
        manual: true,
    });
    pins.sort_by_key(|p| p.index);

    let mut i = 0;
    while i < pins.len() {
        if pins[i].manual {
            while i > 0 && (pins[i - 1].tick >= pins[i].tick || pins[i - 1].index == pins[i].index) {
                pins.remove(i - 1);
                i -= 1;
            }
            while i + 1 < pins.len()
                && (pins[i + 1].tick <= pins[i].tick || pins[i + 1].index == pins[i].index)
            {
                pins.remove(i + 1);
            }
        }
        i += 1;
    }

    let cap = prev_duration.map_or(position, |d| (d as f64 * policy.lead_clamp).floor() as Tick);
    let mut widths = vec![policy.consonant_length; leading];
    clamp_widths(&mut widths, cap, policy.tick_quantum);

    let mut out = vec![0; kinds.len()];
    let mut start = 0;
    let mut start_tick = -widths.iter().sum::<Tick>();
    for pin in pins {
        let spread = distribute(
            kinds,
            start,
            pin.index,
            start_tick,
            pin.tick,
            policy.consonant_length,
        );
        out[start..start + spread.len()].copy_from_slice(&spread);
        start = pin.index;
        start_tick = pin.tick;
    }
    out
}
