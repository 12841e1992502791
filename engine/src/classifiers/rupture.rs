//! Therapeutic rupture detection and repair lookup.
//!
//! A rupture is the user pushing back on the support process itself, not on
//! their situation. Four phrase families are matched over the concatenated
//! recent user turns; when any fire, the turn's normal phase progression is
//! pre-empted and a scripted repair strategy is surfaced instead.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// The flavor of rupture expressed.
///
/// Variant order is the fixed repair-lookup priority: when several types
/// fire on the same turn, the first by this order picks the repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuptureType {
    /// "this isn't working" — rejecting the current approach.
    Resistance,
    /// "slow down" — the process itself is too much right now.
    Overwhelm,
    /// "you're just a bot" — losing faith in the relationship.
    Disconnection,
    /// "sorry I'm like this" — turning the friction inward.
    Shame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuptureSeverity {
    Medium,
    High,
}

/// Scripted guidance for repairing a detected rupture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepairStrategy {
    /// What the agent should lead with.
    pub message: &'static str,
    /// Concrete choices to offer the user (structured choice is itself an
    /// ADHD accommodation).
    pub options: &'static [&'static str],
}

/// Rupture check outcome for a turn.
#[derive(Debug, Clone, Serialize)]
pub struct RuptureResult {
    pub detected: bool,
    pub types: BTreeSet<RuptureType>,
    pub severity: RuptureSeverity,
    pub repair: Option<RepairStrategy>,
}

impl RuptureResult {
    fn none() -> Self {
        Self {
            detected: false,
            types: BTreeSet::new(),
            severity: RuptureSeverity::Medium,
            repair: None,
        }
    }
}

const RESISTANCE_PHRASES: &[&str] = &[
    "this isn't working",
    "this isnt working",
    "this doesn't help",
    "this doesnt help",
    "you don't understand",
    "you dont understand",
    "that's not it",
    "stop telling me",
    "tried that already",
];

const OVERWHELM_PHRASES: &[&str] = &[
    "too many questions",
    "slow down",
    "can't keep up",
    "cant keep up",
    "this is a lot",
    "one thing at a time",
];

const DISCONNECTION_PHRASES: &[&str] = &[
    "just a bot",
    "just an app",
    "talking to a machine",
    "you don't care",
    "you dont care",
    "you can't actually help",
    "you cant actually help",
    "what's the point of this",
    "whats the point of this",
];

const SHAME_PHRASES: &[&str] = &[
    "sorry i'm like this",
    "sorry im like this",
    "i'm being stupid",
    "im being stupid",
    "shouldn't even be here",
    "shouldnt even be here",
    "i'm a burden",
    "im a burden",
    "wasting your time",
];

/// Fixed repair table, keyed by the first matched type in priority order.
fn repair_for(kind: RuptureType) -> RepairStrategy {
    match kind {
        RuptureType::Resistance => RepairStrategy {
            message: "You're right to say so — what we're doing isn't landing, \
                      and that's useful to know. You know your brain best.",
            options: &[
                "Try a completely different approach",
                "Tell me more about what isn't working",
                "Just sit with this for a minute, no techniques",
            ],
        },
        RuptureType::Overwhelm => RepairStrategy {
            message: "Let's slow way down. One small thing at a time, \
                      and nothing you have to answer right now.",
            options: &[
                "Pause for a short break",
                "Keep going, but slower",
                "Switch to something that takes zero effort",
            ],
        },
        RuptureType::Disconnection => RepairStrategy {
            message: "What you're feeling is real even if I'm software. \
                      I can also help you reach a human who can be there \
                      in a way I can't.",
            options: &[
                "Keep talking here for now",
                "See options for reaching a real person",
                "Take a break and come back later",
            ],
        },
        RuptureType::Shame => RepairStrategy {
            message: "You're not a burden here — this is exactly what this \
                      space is for. Needing support isn't something to \
                      apologize for.",
            options: &[
                "Hear why this reaction makes sense with ADHD",
                "Move on without dwelling on it",
                "Take a breather first",
            ],
        },
    }
}

/// Check the concatenated recent user text (≤3 turns) for a rupture.
///
/// Severity is High iff a disconnection phrase matched, else Medium. The
/// repair strategy comes from the first matched type in the fixed priority
/// order resistance → overwhelm → disconnection → shame.
pub fn detect(recent_user_text: &str) -> RuptureResult {
    let lower = recent_user_text.to_lowercase();

    let families: [(&[&str], RuptureType); 4] = [
        (RESISTANCE_PHRASES, RuptureType::Resistance),
        (OVERWHELM_PHRASES, RuptureType::Overwhelm),
        (DISCONNECTION_PHRASES, RuptureType::Disconnection),
        (SHAME_PHRASES, RuptureType::Shame),
    ];

    let mut types = BTreeSet::new();
    for (phrases, kind) in families {
        if phrases.iter().any(|p| lower.contains(p)) {
            types.insert(kind);
        }
    }

    // BTreeSet iterates in variant order, which is the priority order.
    let first = match types.iter().next() {
        Some(kind) => *kind,
        None => return RuptureResult::none(),
    };

    let severity = if types.contains(&RuptureType::Disconnection) {
        RuptureSeverity::High
    } else {
        RuptureSeverity::Medium
    };

    RuptureResult {
        detected: true,
        types,
        severity,
        repair: Some(repair_for(first)),
    }
}
