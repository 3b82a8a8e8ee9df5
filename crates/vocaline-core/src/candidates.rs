//! Ordered candidate templates per slot.
//!
//! Each [`SlotRole`] names one decision the resolver makes (a phrase-initial
//! vowel, a vowel-to-consonant transition, a coda release, ...). A
//! [`CandidateTable`] holds the ordered templates tried for each role; the
//! first rendered candidate the voicebank has wins. Language tables may
//! replace any list.

use std::collections::BTreeMap;

use crate::template::Template;

/// A resolution slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotRole {
    /// Vowel at phrase start.
    StartingVowel,
    /// Vowel directly after another vowel.
    VowelVowel,
    /// Onset cluster plus vowel at phrase start.
    StartingOnset,
    /// Previous vowel, whole cluster and vowel in one sample.
    VowelConsonantVowel,
    /// Onset cluster plus vowel after a transition.
    Onset,
    /// Optional attack on the first consonant at phrase start.
    PhraseAttack,
    /// Previous vowel into the first consonant.
    VowelConsonant,
    /// Release of a vowel into silence.
    VowelRelease,
    /// Previous vowel, single coda consonant and release in one sample.
    VowelConsonantRelease,
    /// Optional release of the last coda consonant.
    ConsonantRelease,
    /// Consonant-to-consonant boundary across a cluster.
    ClusterBoundary,
    /// A consonant on its own.
    Consonant,
    /// One symbol of a manually aligned sequence.
    Aligned,
}

impl SlotRole {
    /// Every role, in declaration order.
    pub const ALL: [SlotRole; 13] = [
        SlotRole::StartingVowel,
        SlotRole::VowelVowel,
        SlotRole::StartingOnset,
        SlotRole::VowelConsonantVowel,
        SlotRole::Onset,
        SlotRole::PhraseAttack,
        SlotRole::VowelConsonant,
        SlotRole::VowelRelease,
        SlotRole::VowelConsonantRelease,
        SlotRole::ConsonantRelease,
        SlotRole::ClusterBoundary,
        SlotRole::Consonant,
        SlotRole::Aligned,
    ];

    /// Key used in language tables.
    pub const fn name(self) -> &'static str {
        match self {
            SlotRole::StartingVowel => "starting_vowel",
            SlotRole::VowelVowel => "vowel_vowel",
            SlotRole::StartingOnset => "starting_onset",
            SlotRole::VowelConsonantVowel => "vowel_consonant_vowel",
            SlotRole::Onset => "onset",
            SlotRole::PhraseAttack => "phrase_attack",
            SlotRole::VowelConsonant => "vowel_consonant",
            SlotRole::VowelRelease => "vowel_release",
            SlotRole::VowelConsonantRelease => "vowel_consonant_release",
            SlotRole::ConsonantRelease => "consonant_release",
            SlotRole::ClusterBoundary => "cluster_boundary",
            SlotRole::Consonant => "consonant",
            SlotRole::Aligned => "aligned",
        }
    }

    /// Look up a role by table key.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.name() == name)
    }

    /// Built-in template sources for the role.
    pub const fn default_templates(self) -> &'static [&'static str] {
        match self {
            SlotRole::StartingVowel => &["- {v}", "-{v}", "{v}"],
            SlotRole::VowelVowel => &["{pv} {v}", "{pv}{v}", "{v}"],
            SlotRole::StartingOnset => &[
                "- {c}{v}",
                "-{c}{v}",
                "{c}{v}",
                "- {cs} {v}",
                "{cs} {v}",
                "{c} {v}",
            ],
            SlotRole::VowelConsonantVowel => &["{pv} {c}{v}"],
            SlotRole::Onset => &["{c}{v}", "{cs} {v}", "{c} {v}"],
            SlotRole::PhraseAttack => &["- {c0}", "-{c0}"],
            SlotRole::VowelConsonant => &["{pv} {c0}", "{pv}{c0}"],
            SlotRole::VowelRelease => &["{pv} -", "{pv} R", "{pv}-"],
            SlotRole::VowelConsonantRelease => &["{pv} {c0}-", "{pv}{c0} -"],
            SlotRole::ConsonantRelease => &["{cl} -", "{cl}-"],
            SlotRole::ClusterBoundary => &["{cs}", "{c}"],
            SlotRole::Consonant => &["{c0}", "- {c0}", "{c0} -"],
            SlotRole::Aligned => &["{ps} {s}", "{s}"],
        }
    }
}

/// Candidate templates for every slot role.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateTable {
    slots: BTreeMap<SlotRole, Vec<Template>>,
}

impl CandidateTable {
    /// The built-in lists for every role.
    pub fn defaults() -> Self {
        let mut slots = BTreeMap::new();
        for role in SlotRole::ALL {
            let templates = role
                .default_templates()
                .iter()
                .filter_map(|src| Template::parse(src).ok())
                .collect();
            slots.insert(role, templates);
        }
        Self { slots }
    }

    /// Replace the list for a role. An empty list keeps the current one.
    pub fn set(&mut self, role: SlotRole, templates: Vec<Template>) {
        if !templates.is_empty() {
            self.slots.insert(role, templates);
        }
    }

    /// Ordered templates for a role.
    pub fn get(&self, role: SlotRole) -> &[Template] {
        self.slots.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }
}

impl Default for CandidateTable {
    fn default() -> Self {
        Self::defaults()
    }
}
