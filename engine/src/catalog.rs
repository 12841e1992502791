//! Static intervention catalog.
//!
//! Immutable tables of named coping techniques, safely shared across
//! sessions. Each technique is tagged with the crisis levels it applies to
//! and an attention cost, which the session planner uses to sequence and
//! filter. The four categories are a closed discriminated union so an
//! undefined technique shape is unrepresentable.

use serde::Serialize;

use crate::classifiers::crisis::CrisisLevel;
use crate::classifiers::rsd::RsdStage;

/// How much sustained attention a technique demands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionCost {
    /// Doable mid-fade: under a minute, no working memory load.
    Minimal,
    /// A couple of minutes of light focus.
    Low,
    /// Needs several minutes of engagement.
    Moderate,
}

/// Category tag, mirroring the catalog's union variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TechniqueCategory {
    Breathing,
    Grounding,
    Cognitive,
    Rsd,
}

impl std::fmt::Display for TechniqueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Breathing => write!(f, "breathing"),
            Self::Grounding => write!(f, "grounding"),
            Self::Cognitive => write!(f, "cognitive"),
            Self::Rsd => write!(f, "rsd"),
        }
    }
}

/// Fields every technique carries.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TechniqueInfo {
    pub id: &'static str,
    pub name: &'static str,
    /// What the agent says to walk the user through it.
    pub script: &'static str,
    pub duration_minutes: u8,
    /// Crisis levels this technique is appropriate for.
    pub applicable: &'static [CrisisLevel],
    pub attention_cost: AttentionCost,
}

/// Breath pacing counts, in seconds.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BreathPattern {
    pub inhale: u8,
    pub hold: u8,
    pub exhale: u8,
}

/// What sensory channel a grounding technique works through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroundingChannel {
    Sensory,
    Somatic,
    Bilateral,
}

/// Which cognitive move a cognitive technique makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CognitiveSkill {
    Mindfulness,
    Labeling,
    Reframe,
    SafetyPlanning,
}

/// One catalog entry. The category payload carries what the category
/// actually needs: breath pacing, sensory channel, cognitive move, or the
/// RSD stage the technique interrupts.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum Technique {
    Breathing {
        info: TechniqueInfo,
        pattern: BreathPattern,
    },
    Grounding {
        info: TechniqueInfo,
        channel: GroundingChannel,
    },
    Cognitive {
        info: TechniqueInfo,
        skill: CognitiveSkill,
    },
    Rsd {
        info: TechniqueInfo,
        stage: RsdStage,
    },
}

impl Technique {
    pub fn info(&self) -> &TechniqueInfo {
        match self {
            Self::Breathing { info, .. }
            | Self::Grounding { info, .. }
            | Self::Cognitive { info, .. }
            | Self::Rsd { info, .. } => info,
        }
    }

    pub fn id(&self) -> &'static str {
        self.info().id
    }

    pub fn category(&self) -> TechniqueCategory {
        match self {
            Self::Breathing { .. } => TechniqueCategory::Breathing,
            Self::Grounding { .. } => TechniqueCategory::Grounding,
            Self::Cognitive { .. } => TechniqueCategory::Cognitive,
            Self::Rsd { .. } => TechniqueCategory::Rsd,
        }
    }

    pub fn applies_to(&self, level: CrisisLevel) -> bool {
        self.info().applicable.contains(&level)
    }
}

const MILD_UP: &[CrisisLevel] = &[CrisisLevel::Mild, CrisisLevel::Moderate, CrisisLevel::Severe];
const MODERATE_UP: &[CrisisLevel] = &[CrisisLevel::Moderate, CrisisLevel::Severe];
const ANY_DISTRESS: &[CrisisLevel] = &[
    CrisisLevel::Mild,
    CrisisLevel::Moderate,
    CrisisLevel::Severe,
    CrisisLevel::Imminent,
];

/// The full static catalog. Read-only; shared across sessions.
pub static CATALOG: &[Technique] = &[
    // -- breathing --
    Technique::Breathing {
        info: TechniqueInfo {
            id: "breath-446",
            name: "4-4-6 breath",
            script: "One deep breath together. In through your nose for 4, \
                     hold for 4, out through your mouth for 6.",
            duration_minutes: 1,
            applicable: ANY_DISTRESS,
            attention_cost: AttentionCost::Minimal,
        },
        pattern: BreathPattern {
            inhale: 4,
            hold: 4,
            exhale: 6,
        },
    },
    Technique::Breathing {
        info: TechniqueInfo {
            id: "breath-478",
            name: "4-7-8 breath",
            script: "Breathe in for 4, hold for 7, and let it out slowly for 8 counts.",
            duration_minutes: 2,
            applicable: MILD_UP,
            attention_cost: AttentionCost::Low,
        },
        pattern: BreathPattern {
            inhale: 4,
            hold: 7,
            exhale: 8,
        },
    },
    // -- grounding --
    Technique::Grounding {
        info: TechniqueInfo {
            id: "ground-54321",
            name: "5-4-3-2-1 senses",
            script: "Name 5 things you can see, 4 you can touch, 3 you can hear, \
                     2 you can smell, and 1 you can taste.",
            duration_minutes: 3,
            applicable: MODERATE_UP,
            attention_cost: AttentionCost::Moderate,
        },
        channel: GroundingChannel::Sensory,
    },
    Technique::Grounding {
        info: TechniqueInfo {
            id: "ground-feet",
            name: "Feet on the floor",
            script: "Press your feet firmly into the floor and feel the weight \
                     of your body in the chair.",
            duration_minutes: 1,
            applicable: ANY_DISTRESS,
            attention_cost: AttentionCost::Minimal,
        },
        channel: GroundingChannel::Somatic,
    },
    Technique::Grounding {
        info: TechniqueInfo {
            id: "ground-bilateral",
            name: "Bilateral tapping",
            script: "Tap your knees, alternating left and right, or cross your \
                     arms and pat your shoulders.",
            duration_minutes: 2,
            applicable: MODERATE_UP,
            attention_cost: AttentionCost::Low,
        },
        channel: GroundingChannel::Bilateral,
    },
    Technique::Grounding {
        info: TechniqueInfo {
            id: "ground-ice",
            name: "Cold sensory reset",
            script: "Hold an ice cube, splash cold water on your face, or smell \
                     something strong. A sharp sensation interrupts the spiral.",
            duration_minutes: 2,
            applicable: MODERATE_UP,
            attention_cost: AttentionCost::Minimal,
        },
        channel: GroundingChannel::Sensory,
    },
    // -- cognitive --
    Technique::Cognitive {
        info: TechniqueInfo {
            id: "cog-stop",
            name: "STOP",
            script: "Stop what you're doing, Take a breath, Observe your \
                     thoughts and feelings, then Proceed mindfully.",
            duration_minutes: 2,
            applicable: MILD_UP,
            attention_cost: AttentionCost::Low,
        },
        skill: CognitiveSkill::Mindfulness,
    },
    Technique::Cognitive {
        info: TechniqueInfo {
            id: "cog-label",
            name: "Name the emotion",
            script: "Say what's here out loud: \"I'm feeling overwhelming \
                     anxiety right now.\" Labeling helps your brain process it.",
            duration_minutes: 1,
            applicable: MILD_UP,
            attention_cost: AttentionCost::Minimal,
        },
        skill: CognitiveSkill::Labeling,
    },
    Technique::Cognitive {
        info: TechniqueInfo {
            id: "cog-wave",
            name: "Ride the wave",
            script: "ADHD emotions are like waves — they peak and then they \
                     recede. This intensity will pass; you've gotten through it before.",
            duration_minutes: 1,
            applicable: MODERATE_UP,
            attention_cost: AttentionCost::Minimal,
        },
        skill: CognitiveSkill::Reframe,
    },
    Technique::Cognitive {
        info: TechniqueInfo {
            id: "cog-safety-plan",
            name: "Safety check-in",
            script: "Your safety comes first. Are you somewhere safe right now? \
                     If not, can you move to a safer space?",
            duration_minutes: 1,
            applicable: &[CrisisLevel::Severe, CrisisLevel::Imminent],
            attention_cost: AttentionCost::Minimal,
        },
        skill: CognitiveSkill::SafetyPlanning,
    },
    // -- rsd-specific --
    Technique::Rsd {
        info: TechniqueInfo {
            id: "rsd-self-compassion",
            name: "Self-compassion break",
            script: "Put a hand on your chest and say: this stings, stings are \
                     human, may I be kind to myself about it.",
            duration_minutes: 2,
            applicable: MILD_UP,
            attention_cost: AttentionCost::Low,
        },
        stage: RsdStage::Mistake,
    },
    Technique::Rsd {
        info: TechniqueInfo {
            id: "rsd-evidence-check",
            name: "Evidence check",
            script: "That verdict about yourself — what's the actual evidence \
                     for it, and what's the evidence against it?",
            duration_minutes: 3,
            applicable: MILD_UP,
            attention_cost: AttentionCost::Moderate,
        },
        stage: RsdStage::SelfJudgment,
    },
    Technique::Rsd {
        info: TechniqueInfo {
            id: "rsd-always-never-audit",
            name: "Always/never audit",
            script: "Catch the \"always\" or \"never\". Can you find one single \
                     time it went differently? One is enough to break the rule.",
            duration_minutes: 3,
            applicable: MILD_UP,
            attention_cost: AttentionCost::Moderate,
        },
        stage: RsdStage::Generalization,
    },
    Technique::Rsd {
        info: TechniqueInfo {
            id: "rsd-action-not-identity",
            name: "Action, not identity",
            script: "Separate what happened from who you are: \"I missed a \
                     deadline\" is a fact. \"I'm a failure\" is the spiral talking.",
            duration_minutes: 2,
            applicable: MILD_UP,
            attention_cost: AttentionCost::Low,
        },
        stage: RsdStage::IdentityAttack,
    },
    Technique::Rsd {
        info: TechniqueInfo {
            id: "rsd-anchor-worth",
            name: "Anchor to worth",
            script: "Name one person or one thing that matters to you, and one \
                     small way you showed up for it recently. Worth isn't earned \
                     turn by turn — it's already there.",
            duration_minutes: 2,
            applicable: MODERATE_UP,
            attention_cost: AttentionCost::Low,
        },
        stage: RsdStage::Worthlessness,
    },
];

/// Look up a technique by id. Unknown ids are a normal `None`, not an error.
pub fn by_id(id: &str) -> Option<&'static Technique> {
    CATALOG.iter().find(|t| t.id() == id)
}

/// All techniques in a category, in catalog order.
pub fn by_category(category: TechniqueCategory) -> Vec<&'static Technique> {
    CATALOG.iter().filter(|t| t.category() == category).collect()
}
