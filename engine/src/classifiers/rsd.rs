//! Rejection-sensitivity (RSD) spiral staging.
//!
//! RSD episodes tend to escalate through a recognisable sequence: a concrete
//! mistake, harsh self-judgment, "always/never" generalization, an attack on
//! identity, and finally worthlessness. Stages are scanned most severe
//! first so that mixed signals classify at the deepest point of the spiral —
//! the stage that most needs interrupting.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// The five stages of the RSD spiral, mildest to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RsdStage {
    Mistake,
    SelfJudgment,
    Generalization,
    IdentityAttack,
    Worthlessness,
}

impl RsdStage {
    /// Fixed severity weight, 1 (mistake) through 5 (worthlessness).
    pub fn severity(self) -> u8 {
        match self {
            Self::Mistake => 1,
            Self::SelfJudgment => 2,
            Self::Generalization => 3,
            Self::IdentityAttack => 4,
            Self::Worthlessness => 5,
        }
    }

    /// RSD-specific technique to interrupt this stage of the spiral.
    /// Only attached to outcomes with severity ≥ 2.
    pub fn intervention_id(self) -> &'static str {
        match self {
            Self::Mistake => "rsd-self-compassion",
            Self::SelfJudgment => "rsd-evidence-check",
            Self::Generalization => "rsd-always-never-audit",
            Self::IdentityAttack => "rsd-action-not-identity",
            Self::Worthlessness => "rsd-anchor-worth",
        }
    }
}

impl std::fmt::Display for RsdStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mistake => write!(f, "mistake"),
            Self::SelfJudgment => write!(f, "self_judgment"),
            Self::Generalization => write!(f, "generalization"),
            Self::IdentityAttack => write!(f, "identity_attack"),
            Self::Worthlessness => write!(f, "worthlessness"),
        }
    }
}

/// Staging outcome for one message. `severity` is 0 when no stage matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsdStageResult {
    pub stage: Option<RsdStage>,
    pub severity: u8,
}

impl RsdStageResult {
    /// Whether this result is strong enough to attach an RSD intervention.
    pub fn warrants_intervention(&self) -> bool {
        self.severity >= 2
    }

    /// Whether this result is strong enough to attach a validation phrase.
    pub fn warrants_validation(&self) -> bool {
        self.severity >= 3
    }
}

const MISTAKE_PHRASES: &[&str] = &[
    "i messed up",
    "i made a mistake",
    "i got it wrong",
    "i forgot to",
    "i screwed up",
];

const SELF_JUDGMENT_PHRASES: &[&str] = &[
    "i'm so stupid",
    "im so stupid",
    "i'm an idiot",
    "im an idiot",
    "how could i be so",
    "i should have known",
];

const GENERALIZATION_PHRASES: &[&str] = &[
    "i always",
    "i never get",
    "every time i",
    "nothing i do ever",
    "i ruin everything",
];

const IDENTITY_ATTACK_PHRASES: &[&str] = &[
    "i'm a failure",
    "im a failure",
    "i'm such a failure",
    "i'm broken",
    "im broken",
    "something is wrong with me",
    "i'm a bad person",
    "im a bad person",
];

const WORTHLESSNESS_PHRASES: &[&str] = &[
    "i'm worthless",
    "im worthless",
    "no one would care",
    "i don't deserve",
    "i dont deserve",
    "everyone would be better off without",
];

/// Classify a message into at most one RSD stage.
///
/// Stages are scanned from most to least severe and the first match wins,
/// so conflicting signals resolve to the more severe classification. No
/// match → `stage: None`, `severity: 0`.
pub fn classify(text: &str) -> RsdStageResult {
    let lower = text.to_lowercase();

    let stages: [(&[&str], RsdStage); 5] = [
        (WORTHLESSNESS_PHRASES, RsdStage::Worthlessness),
        (IDENTITY_ATTACK_PHRASES, RsdStage::IdentityAttack),
        (GENERALIZATION_PHRASES, RsdStage::Generalization),
        (SELF_JUDGMENT_PHRASES, RsdStage::SelfJudgment),
        (MISTAKE_PHRASES, RsdStage::Mistake),
    ];

    for (phrases, stage) in stages {
        if phrases.iter().any(|p| lower.contains(p)) {
            return RsdStageResult {
                stage: Some(stage),
                severity: stage.severity(),
            };
        }
    }

    RsdStageResult {
        stage: None,
        severity: 0,
    }
}

/// Per-stage validation phrase pools. Worded for RSD specifically: the pain
/// is named as real before any reframe is offered.
fn validation_pool(stage: RsdStage) -> &'static [&'static str] {
    match stage {
        RsdStage::Mistake => &[
            "Mistakes land harder on an ADHD brain — the sting you feel is real.",
            "One slip doesn't undo the effort you've been putting in.",
        ],
        RsdStage::SelfJudgment => &[
            "That inner voice is being far harsher with you than the facts are.",
            "You'd never talk to a friend the way you're talking to yourself right now.",
        ],
        RsdStage::Generalization => &[
            "\"Always\" and \"never\" are the spiral talking — today is one data point.",
            "Your brain is pattern-matching on pain right now, not on evidence.",
        ],
        RsdStage::IdentityAttack => &[
            "Something you did went sideways. That is not the same as something you are.",
            "A hard moment doesn't get to define you — you're more than this feeling.",
        ],
        RsdStage::Worthlessness => &[
            "This feeling is lying to you about your worth. You matter, right now, as you are.",
            "Rejection sensitivity at full volume says worthless — it's wrong, and it passes.",
        ],
    }
}

/// Pick a validation phrase for the stage from its fixed pool.
///
/// Randomness is injected so tests can seed it; the pool order is stable.
pub fn validation_phrase<R: Rng + ?Sized>(stage: RsdStage, rng: &mut R) -> &'static str {
    validation_pool(stage)
        .choose(rng)
        .copied()
        .unwrap_or("What you're feeling right now is real, and it makes sense.")
}
