//! Alias resolution.
//!
//! Every structural slot is resolved the same way:
//!
//! 1. Render the slot role's templates into an ordered candidate list.
//! 2. Take the first candidate the voicebank has.
//! 3. Otherwise repair every candidate once (active fallbacks, then
//!    language repairs) and retry the changed ones.
//! 4. Otherwise a required slot degrades to its bare symbol and an
//!    optional slot is left out.
//!
//! Onset clusters are peeled left to right. The resolver first tries the
//! whole remaining cluster with the vowel as one sample, then the whole
//! cluster as a boundary sample, then the leading pair, and finally the
//! first consonant on its own before recursing on the rest.

use crate::candidates::SlotRole;
use crate::config::ResolverConfig;
use crate::query::AliasQuery;
use crate::segment::{Ending, EndingShape, Syllable, SyllableShape};
use crate::template::SlotContext;

/// Where a sample sits relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Before the nucleus, at a negative offset.
    Leading,
    /// On the anchor.
    Nucleus,
    /// Counted back from the end of the group.
    Trailing,
}

/// A chosen alias with the context the allocator needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSample {
    /// Alias to emit.
    pub alias: String,
    /// Tone the alias was resolved under.
    pub tone: i32,
    /// Placement relative to the anchor.
    pub placement: Placement,
    /// Symbol whose class sets the nominal width.
    pub symbol: String,
}

impl ResolvedSample {
    fn new(alias: String, tone: i32, placement: Placement, symbol: &str) -> Self {
        Self {
            alias,
            tone,
            placement,
            symbol: symbol.to_string(),
        }
    }
}

/// Resolves syllables and endings against one voicebank.
pub struct AliasResolver<'a> {
    config: &'a ResolverConfig,
    query: &'a dyn AliasQuery,
}

impl<'a> AliasResolver<'a> {
    /// Create a resolver.
    pub fn new(config: &'a ResolverConfig, query: &'a dyn AliasQuery) -> Self {
        Self { config, query }
    }

    /// First candidate that exists under `tone`.
    pub fn first_match(&self, candidates: &[String], tone: i32) -> Option<String> {
        candidates
            .iter()
            .find(|c| self.query.exists(c, tone, None))
            .cloned()
    }

    /// Repaired forms of the candidates that actually changed, deduplicated.
    pub fn repair(&self, candidates: &[String]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for candidate in candidates {
            if let Some(fixed) = self.config.repair_candidate(candidate) {
                if !candidates.contains(&fixed) && !out.contains(&fixed) {
                    out.push(fixed);
                }
            }
        }
        out
    }

    /// Resolve one slot: templates, then one repair pass.
    pub fn resolve_slot(&self, role: SlotRole, ctx: &SlotContext<'_>, tone: i32) -> Option<String> {
        let candidates = self.candidates(role, ctx);
        if let Some(hit) = self.first_match(&candidates, tone) {
            return Some(hit);
        }
        let repaired = self.repair(&candidates);
        let hit = self.first_match(&repaired, tone);
        #[cfg(feature = "tracing")]
        if let Some(alias) = &hit {
            tracing::warn!("resolve: {} repaired {:?} to '{alias}'", role.name(), candidates);
        }
        hit
    }

    /// Samples for one syllable, nucleus last.
    ///
    /// Empty only when the syllable sustains the previous, identical vowel.
    pub fn syllable(&self, s: &Syllable) -> Vec<ResolvedSample> {
        let pv = s.prev_vowel.as_deref();
        match s.shape() {
            SyllableShape::StartingVowel => {
                vec![self.nucleus(SlotRole::StartingVowel, &SlotContext::vowel(None, &s.vowel), s)]
            }
            SyllableShape::VowelVowel => {
                if self.extends(s) {
                    #[cfg(feature = "tracing")]
                    tracing::debug!("resolve: sustaining '{}'", s.vowel);
                    return Vec::new();
                }
                vec![self.nucleus(SlotRole::VowelVowel, &SlotContext::vowel(pv, &s.vowel), s)]
            }
            SyllableShape::StartingConsonantVowel(_) => {
                let mut out = Vec::new();
                self.onset_chain(&mut out, s, 0, SlotRole::StartingOnset);
                if out.first().is_some_and(|first| !first.alias.starts_with('-')) {
                    let ctx = SlotContext::cluster(None, &s.cluster, None);
                    if let Some(alias) = self.resolve_slot(SlotRole::PhraseAttack, &ctx, s.tone) {
                        out.insert(
                            0,
                            ResolvedSample::new(alias, s.tone, Placement::Leading, &s.cluster[0]),
                        );
                    }
                }
                out
            }
            SyllableShape::MiddleConsonantVowel(_) => {
                if self.unit_allowed(s, 0) {
                    let ctx = SlotContext::cluster(pv, &s.cluster, Some(&s.vowel));
                    if let Some(alias) =
                        self.resolve_slot(SlotRole::VowelConsonantVowel, &ctx, s.vowel_tone)
                    {
                        return vec![ResolvedSample::new(
                            alias,
                            s.vowel_tone,
                            Placement::Nucleus,
                            &s.vowel,
                        )];
                    }
                }
                let mut out = Vec::new();
                self.transition(&mut out, s);
                self.onset_chain(&mut out, s, 0, SlotRole::Onset);
                out
            }
        }
    }

    /// Samples for a phrase ending, all trailing.
    pub fn ending(&self, e: &Ending) -> Vec<ResolvedSample> {
        let mut out = Vec::new();
        let pv = Some(e.prev_vowel.as_str());
        match e.shape() {
            EndingShape::None => {
                let ctx = SlotContext::cluster(pv, &[], None);
                if let Some(alias) = self.resolve_slot(SlotRole::VowelRelease, &ctx, e.tone) {
                    out.push(ResolvedSample::new(alias, e.tone, Placement::Trailing, &e.prev_vowel));
                }
            }
            EndingShape::One => {
                let ctx = SlotContext::cluster(pv, &e.cluster, None);
                match self.resolve_slot(SlotRole::VowelConsonantRelease, &ctx, e.tone) {
                    Some(alias) => out.push(ResolvedSample::new(
                        alias,
                        e.tone,
                        Placement::Trailing,
                        &e.cluster[0],
                    )),
                    None => self.coda(&mut out, e),
                }
            }
            EndingShape::Many => self.coda(&mut out, e),
        }
        out
    }

    /// Alias for one manually aligned symbol. Degrades to the bare symbol.
    pub fn aligned(&self, prev: Option<&str>, symbol: &str, tone: i32) -> String {
        let ctx = SlotContext::aligned(Some(prev.unwrap_or("-")), symbol);
        self.resolve_slot(SlotRole::Aligned, &ctx, tone)
            .unwrap_or_else(|| self.degrade(symbol, tone))
    }

    /// Release after a manually aligned sequence, if the voicebank has one.
    pub fn aligned_release(&self, prev: &str, tone: i32) -> Option<String> {
        let ctx = SlotContext::aligned(Some(prev), "-");
        self.resolve_slot(SlotRole::Aligned, &ctx, tone)
            .filter(|alias| alias != "-")
    }

    fn candidates(&self, role: SlotRole, ctx: &SlotContext<'_>) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for template in self.config.candidates().get(role) {
            if let Some(candidate) = template.render(ctx) {
                if !out.contains(&candidate) {
                    out.push(candidate);
                }
            }
        }
        out
    }

    /// Fall back to the bare symbol. Only worth a warning when the
    /// voicebank has no such sample either.
    fn degrade(&self, symbol: &str, tone: i32) -> String {
        if self.query.exists(symbol, tone, None) {
            #[cfg(feature = "tracing")]
            tracing::debug!("resolve: falling back to bare sample '{symbol}'");
        } else {
            #[cfg(feature = "tracing")]
            tracing::warn!("resolve: no sample for '{symbol}', using bare symbol");
        }
        symbol.to_string()
    }

    fn extends(&self, s: &Syllable) -> bool {
        self.config.policy().extend_same_vowel
            && s.can_extend
            && s.prev_vowel.as_deref() == Some(s.vowel.as_str())
            && s.tone == s.vowel_tone
            && self.query.exists(&s.vowel, s.vowel_tone, None)
    }

    fn nucleus(&self, role: SlotRole, ctx: &SlotContext<'_>, s: &Syllable) -> ResolvedSample {
        let alias = self
            .resolve_slot(role, ctx, s.vowel_tone)
            .unwrap_or_else(|| self.degrade(&s.vowel, s.vowel_tone));
        ResolvedSample::new(alias, s.vowel_tone, Placement::Nucleus, &s.vowel)
    }

    /// A lone consonant; `single` holds exactly that symbol.
    fn consonant(&self, single: &[String], tone: i32, placement: Placement) -> ResolvedSample {
        let ctx = SlotContext::cluster(None, single, None);
        let alias = self
            .resolve_slot(SlotRole::Consonant, &ctx, tone)
            .unwrap_or_else(|| self.degrade(&single[0], tone));
        ResolvedSample::new(alias, tone, placement, &single[0])
    }

    /// Whether `cluster[start..]` may merge with the vowel into one sample.
    ///
    /// A merged sample never spans a word boundary.
    fn unit_allowed(&self, s: &Syllable, start: usize) -> bool {
        let rest = &s.cluster[start..];
        rest.len() <= 1
            || (start >= s.previous_word_cluster().len()
                && !self.config.is_cluster_exception(&rest[0]))
    }

    /// Previous vowel into the onset: `V C`, or `V -` plus an optional `- C`.
    fn transition(&self, out: &mut Vec<ResolvedSample>, s: &Syllable) {
        let Some(pv) = s.prev_vowel.as_deref() else {
            return;
        };
        let ctx = SlotContext::cluster(Some(pv), &s.cluster, None);
        if let Some(alias) = self.resolve_slot(SlotRole::VowelConsonant, &ctx, s.tone) {
            out.push(ResolvedSample::new(alias, s.tone, Placement::Leading, &s.cluster[0]));
            return;
        }
        if let Some(alias) = self.resolve_slot(SlotRole::VowelRelease, &ctx, s.tone) {
            out.push(ResolvedSample::new(alias, s.tone, Placement::Leading, pv));
        }
        if let Some(alias) = self.resolve_slot(SlotRole::PhraseAttack, &ctx, s.tone) {
            out.push(ResolvedSample::new(alias, s.tone, Placement::Leading, &s.cluster[0]));
        }
    }

    fn onset_chain(&self, out: &mut Vec<ResolvedSample>, s: &Syllable, start: usize, role: SlotRole) {
        let rest = &s.cluster[start..];
        if rest.is_empty() {
            out.push(self.nucleus(SlotRole::VowelVowel, &SlotContext::vowel(None, &s.vowel), s));
            return;
        }
        if self.unit_allowed(s, start) {
            let ctx = SlotContext::cluster(None, rest, Some(&s.vowel));
            if let Some(alias) = self.resolve_slot(role, &ctx, s.vowel_tone) {
                out.push(ResolvedSample::new(alias, s.vowel_tone, Placement::Nucleus, &s.vowel));
                return;
            }
        }
        if rest.len() == 1 {
            out.push(self.consonant(&rest[..1], s.tone, Placement::Leading));
            out.push(ResolvedSample::new(
                self.degrade(&s.vowel, s.vowel_tone),
                s.vowel_tone,
                Placement::Nucleus,
                &s.vowel,
            ));
            return;
        }

        let whole = SlotContext::cluster(None, rest, None);
        if let Some(alias) = self.resolve_slot(SlotRole::ClusterBoundary, &whole, s.tone) {
            out.push(ResolvedSample::new(alias, s.tone, Placement::Leading, &rest[0]));
            return self.onset_chain(out, s, s.cluster.len() - 1, SlotRole::Onset);
        }
        if rest.len() > 2 {
            let pair = SlotContext::cluster(None, &rest[..2], None);
            if let Some(alias) = self.resolve_slot(SlotRole::ClusterBoundary, &pair, s.tone) {
                out.push(ResolvedSample::new(alias, s.tone, Placement::Leading, &rest[0]));
                return self.onset_chain(out, s, start + 1, SlotRole::Onset);
            }
        }
        out.push(self.consonant(&rest[..1], s.tone, Placement::Leading));
        self.onset_chain(out, s, start + 1, SlotRole::Onset);
    }

    /// `V C` into the coda, boundaries through it, then an optional release.
    fn coda(&self, out: &mut Vec<ResolvedSample>, e: &Ending) {
        let ctx = SlotContext::cluster(Some(&e.prev_vowel), &e.cluster, None);
        let alias = self
            .resolve_slot(SlotRole::VowelConsonant, &ctx, e.tone)
            .unwrap_or_else(|| self.degrade(&e.cluster[0], e.tone));
        out.push(ResolvedSample::new(alias, e.tone, Placement::Trailing, &e.cluster[0]));

        self.coda_chain(out, e, 0);

        let ctx = SlotContext::cluster(None, &e.cluster, None);
        if let Some(alias) = self.resolve_slot(SlotRole::ConsonantRelease, &ctx, e.tone) {
            let last = &e.cluster[e.cluster.len() - 1];
            out.push(ResolvedSample::new(alias, e.tone, Placement::Trailing, last));
        }
    }

    fn coda_chain(&self, out: &mut Vec<ResolvedSample>, e: &Ending, start: usize) {
        let rest = &e.cluster[start..];
        if rest.len() < 2 {
            return;
        }
        let whole = SlotContext::cluster(None, rest, None);
        if let Some(alias) = self.resolve_slot(SlotRole::ClusterBoundary, &whole, e.tone) {
            out.push(ResolvedSample::new(alias, e.tone, Placement::Trailing, &rest[1]));
            return;
        }
        if rest.len() > 2 {
            let pair = SlotContext::cluster(None, &rest[..2], None);
            if let Some(alias) = self.resolve_slot(SlotRole::ClusterBoundary, &pair, e.tone) {
                out.push(ResolvedSample::new(alias, e.tone, Placement::Trailing, &rest[1]));
                return self.coda_chain(out, e, start + 1);
            }
        }
        out.push(self.consonant(&rest[1..2], e.tone, Placement::Trailing));
        self.coda_chain(out, e, start + 1);
    }
}
