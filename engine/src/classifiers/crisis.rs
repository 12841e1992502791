//! Crisis level classification.
//!
//! Case-insensitive substring matching against four ordered phrase tiers,
//! scanned most severe first so that conflicting signals resolve upward.
//! `Imminent` triggers the hard safety override in the facade: fixed
//! hotline response, human handoff, no interventions, no generation call.

use serde::{Deserialize, Serialize};

/// Ordered crisis severity. Higher always takes safety precedence.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum CrisisLevel {
    #[default]
    None,
    Mild,
    Moderate,
    Severe,
    Imminent,
}

impl std::fmt::Display for CrisisLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Mild => write!(f, "mild"),
            Self::Moderate => write!(f, "moderate"),
            Self::Severe => write!(f, "severe"),
            Self::Imminent => write!(f, "imminent"),
        }
    }
}

/// Explicit plan / intent phrases. Any match overrides everything else.
const IMMINENT_PHRASES: &[&str] = &[
    "want to end it",
    "end it all",
    "end my life",
    "kill myself",
    "have a plan",
    "want to die",
    "better off dead",
    "hurt myself",
    "not safe right now",
];

/// Hopelessness and exhaustion-of-options phrases.
const SEVERE_PHRASES: &[&str] = &[
    "hopeless",
    "can't go on",
    "cant go on",
    "no point anymore",
    "give up on everything",
    "can't do this anymore",
    "cant do this anymore",
    "nothing will ever change",
];

/// Acute overwhelm phrases.
const MODERATE_PHRASES: &[&str] = &[
    "overwhelmed",
    "panic",
    "can't cope",
    "cant cope",
    "falling apart",
    "breaking down",
    "spiraling",
    "losing it",
    "too much for me",
];

/// Everyday-stress phrases.
const MILD_PHRASES: &[&str] = &[
    "stressed",
    "anxious",
    "worried",
    "frustrated",
    "on edge",
    "tense",
    "having a hard time",
];

/// Classify a single message into a crisis level.
///
/// Pure and deterministic: the same input always yields the same level.
/// No match resolves to `CrisisLevel::None`.
pub fn classify(text: &str) -> CrisisLevel {
    let lower = text.to_lowercase();

    let tiers: [(&[&str], CrisisLevel); 4] = [
        (IMMINENT_PHRASES, CrisisLevel::Imminent),
        (SEVERE_PHRASES, CrisisLevel::Severe),
        (MODERATE_PHRASES, CrisisLevel::Moderate),
        (MILD_PHRASES, CrisisLevel::Mild),
    ];

    for (phrases, level) in tiers {
        if phrases.iter().any(|p| lower.contains(p)) {
            return level;
        }
    }

    CrisisLevel::None
}
