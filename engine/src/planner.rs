//! Adaptive session planning and intervention sequencing.
//!
//! Two decisions per turn: how long this session should aim to run (with a
//! break or not), and which techniques to line up in what order. Both lean
//! conservative — when crisis severity and engagement disagree, the shorter
//! plan wins, and the crisis floor can only ever shorten, never extend.

use serde::Serialize;

use crate::catalog::{self, TechniqueCategory};
use crate::classifiers::crisis::CrisisLevel;
use crate::classifiers::rsd::RsdStage;
use crate::context::PreviousActivity;
use crate::scoring;

/// Session length tiers, shortest first so `min` picks the conservative one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionTier {
    /// ≈2–3 minutes; high crisis or low attention.
    Micro,
    Short,
    Standard,
}

impl SessionTier {
    pub fn duration_minutes(self) -> u8 {
        match self {
            Self::Micro => 3,
            Self::Short => 10,
            Self::Standard => 25,
        }
    }
}

/// What kind of break to schedule, when one is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    Movement,
    Breathing,
    Sensory,
}

/// The session-length decision for this turn.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SessionPlan {
    pub tier: SessionTier,
    pub duration_minutes: u8,
    pub break_scheduled: bool,
    pub break_kind: Option<BreakKind>,
}

/// One slot in an intervention sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum PlanItem {
    /// A catalog technique, by id.
    Technique(&'static str),
    /// Forced pause inserted under attention fade.
    MicroBreak,
    /// Quick "still with me?" probe after a break.
    CheckIn,
}

impl PlanItem {
    fn minutes(self) -> u8 {
        match self {
            Self::Technique(id) => catalog::by_id(id).map_or(2, |t| t.info().duration_minutes),
            Self::MicroBreak => 2,
            Self::CheckIn => 1,
        }
    }
}

/// An ordered intervention sequence with its adaptation flags.
#[derive(Debug, Clone, Serialize)]
pub struct InterventionPlan {
    pub sequence: Vec<PlanItem>,
    pub current_index: usize,
    pub estimated_total_minutes: u8,
    pub attention_adapted: bool,
    pub energy_adapted: bool,
    pub activities_already_completed: Vec<String>,
}

/// Everything the sequencer needs for one turn.
#[derive(Debug, Clone, Copy)]
pub struct SequencingInputs<'a> {
    pub crisis: CrisisLevel,
    pub previous_activity: Option<PreviousActivity>,
    /// Recent user turns, oldest first, for completion-phrase detection.
    pub recent_user_texts: &'a [&'a str],
    pub attention_fading: bool,
    pub low_energy: bool,
    /// RSD stage strong enough to warrant its mapped intervention, if any.
    pub rsd_stage: Option<RsdStage>,
}

const BREATHING_DONE_PHRASES: &[&str] = &[
    "did the breathing",
    "already did breathing",
    "tried the breathing",
    "just did a breathing",
    "finished the breathing",
];

const GROUNDING_DONE_PHRASES: &[&str] = &[
    "did the grounding",
    "already did grounding",
    "tried the grounding",
    "just did a grounding",
    "named five things",
];

/// Base technique sequence per crisis level. Order matters: the first item
/// is what the agent offers first.
fn base_sequence(crisis: CrisisLevel) -> &'static [&'static str] {
    match crisis {
        CrisisLevel::Imminent => &["cog-safety-plan", "breath-446", "ground-feet"],
        CrisisLevel::Severe => &["cog-safety-plan", "breath-446", "ground-feet", "ground-ice"],
        CrisisLevel::Moderate => &["breath-446", "ground-54321", "cog-wave", "ground-bilateral"],
        CrisisLevel::Mild => &["breath-478", "cog-stop", "cog-label"],
        CrisisLevel::None => &["cog-label", "breath-478"],
    }
}

/// Crisis-level floor for the session tier.
fn crisis_tier(crisis: CrisisLevel) -> SessionTier {
    match crisis {
        CrisisLevel::Imminent | CrisisLevel::Severe => SessionTier::Micro,
        CrisisLevel::Moderate | CrisisLevel::Mild => SessionTier::Short,
        CrisisLevel::None => SessionTier::Standard,
    }
}

/// Tier suggested by the recent engagement pattern alone.
fn engagement_tier(recent_user_texts: &[&str]) -> SessionTier {
    if recent_user_texts.is_empty() {
        return SessionTier::Standard;
    }
    let mut low = 0usize;
    let mut high = 0usize;
    for text in recent_user_texts {
        match scoring::engagement_score(text) {
            1..=3 => low += 1,
            7..=10 => high += 1,
            _ => {}
        }
    }
    let half = recent_user_texts.len().div_ceil(2);
    if low >= half {
        SessionTier::Micro
    } else if high >= half {
        SessionTier::Standard
    } else {
        SessionTier::Short
    }
}

/// Pick the session tier and break schedule for this turn.
///
/// The final tier is the shorter of the crisis floor and the engagement
/// signal; the crisis floor always wins when it says micro.
pub fn plan_session(crisis: CrisisLevel, recent_user_texts: &[&str]) -> SessionPlan {
    let from_crisis = crisis_tier(crisis);
    let from_engagement = engagement_tier(recent_user_texts);
    let tier = from_crisis.min(from_engagement);

    let break_scheduled = tier == SessionTier::Micro;
    let break_kind = if !break_scheduled {
        None
    } else if crisis >= CrisisLevel::Moderate {
        Some(BreakKind::Breathing)
    } else {
        Some(BreakKind::Movement)
    };

    SessionPlan {
        tier,
        duration_minutes: tier.duration_minutes(),
        break_scheduled,
        break_kind,
    }
}

/// Modalities the user has already done this episode.
fn completed_modalities(inputs: &SequencingInputs) -> Vec<TechniqueCategory> {
    let mut done = Vec::new();

    match inputs.previous_activity {
        Some(PreviousActivity::Breathing) => done.push(TechniqueCategory::Breathing),
        Some(PreviousActivity::Grounding) => done.push(TechniqueCategory::Grounding),
        None => {}
    }

    let joined = inputs.recent_user_texts.join(" ").to_lowercase();
    if !done.contains(&TechniqueCategory::Breathing)
        && BREATHING_DONE_PHRASES.iter().any(|p| joined.contains(p))
    {
        done.push(TechniqueCategory::Breathing);
    }
    if !done.contains(&TechniqueCategory::Grounding)
        && GROUNDING_DONE_PHRASES.iter().any(|p| joined.contains(p))
    {
        done.push(TechniqueCategory::Grounding);
    }

    done
}

/// Build the ordered intervention sequence for this turn.
///
/// Adaptations, in order: filter out already-completed modalities; under
/// low energy keep only grounding, breathing, and safety planning; under
/// attention fade truncate to two items and append a forced micro-break
/// plus a check-in.
pub fn sequence_interventions(inputs: &SequencingInputs) -> InterventionPlan {
    let done = completed_modalities(inputs);
    let done_names: Vec<String> = done.iter().map(|c| c.to_string()).collect();

    let mut sequence: Vec<PlanItem> = base_sequence(inputs.crisis)
        .iter()
        .filter_map(|id| {
            let technique = catalog::by_id(id)?;
            if done.contains(&technique.category()) {
                None
            } else {
                Some(PlanItem::Technique(id))
            }
        })
        .collect();

    // An active RSD spiral gets its stage-mapped interrupt at the front.
    if let Some(stage) = inputs.rsd_stage {
        let item = PlanItem::Technique(stage.intervention_id());
        if !sequence.contains(&item) {
            sequence.insert(0, item);
        }
    }

    let energy_adapted = inputs.low_energy;
    if inputs.low_energy {
        sequence.retain(|item| match item {
            PlanItem::Technique(id) => catalog::by_id(id).is_some_and(|t| {
                matches!(
                    t.category(),
                    TechniqueCategory::Breathing | TechniqueCategory::Grounding
                ) || *id == "cog-safety-plan"
            }),
            _ => true,
        });
    }

    let attention_adapted = inputs.attention_fading;
    if inputs.attention_fading {
        sequence.truncate(2);
        sequence.push(PlanItem::MicroBreak);
        sequence.push(PlanItem::CheckIn);
    }

    let estimated_total_minutes = sequence.iter().map(|i| i.minutes()).sum();

    InterventionPlan {
        sequence,
        current_index: 0,
        estimated_total_minutes,
        attention_adapted,
        energy_adapted,
        activities_already_completed: done_names,
    }
}
