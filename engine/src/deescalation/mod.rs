//! De-escalation phase state machine.
//!
//! Five phases in fixed order — safety → validation → cognitive → skills →
//! planning — each with scripted steps. The machine never skips a phase:
//! after any non-override observation the phase is unchanged or the
//! immediate successor. A severe-or-worse crisis observation hard-overrides
//! back to the first safety step regardless of progress.
//!
//! One `DeescalationState` is created per crisis episode and mutated only
//! through [`DeescalationState::observe`]; the facade commits the mutation
//! atomically at the end of a turn.

mod scripts;

pub use scripts::{script_for, PhaseScript, PhaseStep, SCRIPTS};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifiers::crisis::CrisisLevel;
use crate::config::EngineConfig;

/// The five de-escalation phases, in conversation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Safety,
    Validation,
    Cognitive,
    Skills,
    Planning,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Phase::Safety,
        Phase::Validation,
        Phase::Cognitive,
        Phase::Skills,
        Phase::Planning,
    ];

    /// The immediate successor, or `None` for the terminal planning phase.
    pub fn next(self) -> Option<Phase> {
        match self {
            Self::Safety => Some(Self::Validation),
            Self::Validation => Some(Self::Cognitive),
            Self::Cognitive => Some(Self::Skills),
            Self::Skills => Some(Self::Planning),
            Self::Planning => None,
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safety => write!(f, "safety"),
            Self::Validation => write!(f, "validation"),
            Self::Cognitive => write!(f, "cognitive"),
            Self::Skills => write!(f, "skills"),
            Self::Planning => write!(f, "planning"),
        }
    }
}

/// What the machine did with an observation. Recorded for logging and the
/// decision bundle; the facade also uses it to phrase the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Severe+ crisis forced a return to the first safety step.
    SafetyOverride,
    /// Phase completion criteria met; advanced to the successor phase.
    PhaseAdvanced,
    /// Effectiveness threshold met; advanced to the next step in the phase.
    StepAdvanced,
    /// Criteria not met; the current step repeats.
    Held,
}

/// Per-episode progression bookkeeping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EpisodeHistory {
    pub steps_visited: Vec<String>,
    pub effectiveness_scores: Vec<u8>,
    pub adaptations_applied: Vec<String>,
}

/// One per-turn observation fed into the machine.
#[derive(Debug, Clone, Copy)]
pub struct TurnObservation {
    pub crisis: CrisisLevel,
    pub effectiveness: u8,
    pub engagement: u8,
    pub stress: u8,
    pub now: DateTime<Utc>,
}

/// Mutable state of one de-escalation episode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeescalationState {
    pub current_phase: Phase,
    pub current_step_id: String,
    pub phase_started_at: DateTime<Utc>,
    /// 0–100, monotonically non-decreasing within the episode.
    pub total_progress: u8,
    pub stress_level: u8,
    pub engagement_level: u8,
    pub completed_techniques: Vec<String>,
    pub breakthrough_moments: Vec<String>,
    pub history: EpisodeHistory,
}

impl DeescalationState {
    /// Start a new episode: safety phase, first safety step, crisis-default
    /// stress 8, neutral engagement 5.
    pub fn new(now: DateTime<Utc>) -> Self {
        let first_step = script_for(Phase::Safety).steps[0].id;
        Self {
            current_phase: Phase::Safety,
            current_step_id: first_step.to_string(),
            phase_started_at: now,
            total_progress: 0,
            stress_level: 8,
            engagement_level: 5,
            completed_techniques: Vec::new(),
            breakthrough_moments: Vec::new(),
            history: EpisodeHistory::default(),
        }
    }

    /// The current scripted step.
    ///
    /// An unknown step id (stale persisted state, renamed script) recovers
    /// to the first safety step rather than erroring.
    pub fn current_step(&self) -> &'static PhaseStep {
        let script = script_for(self.current_phase);
        script
            .steps
            .iter()
            .find(|s| s.id == self.current_step_id)
            .unwrap_or_else(|| {
                tracing::warn!(
                    step = %self.current_step_id,
                    phase = %self.current_phase,
                    "unknown step id, recovering to first safety step"
                );
                &script_for(Phase::Safety).steps[0]
            })
    }

    /// Whether the episode has reached the last planning step.
    pub fn is_terminal(&self) -> bool {
        let script = script_for(Phase::Planning);
        self.current_phase == Phase::Planning
            && script.steps.last().map(|s| s.id) == Some(self.current_step_id.as_str())
    }

    /// Feed one turn's observation into the machine.
    ///
    /// Order of precedence:
    /// 1. Crisis ≥ severe → hard override to the first safety step.
    /// 2. Engagement/stress phase-completion criteria → advance phase.
    /// 3. Effectiveness ≥ step threshold → advance step within the phase.
    /// 4. Otherwise hold (the step repeats).
    pub fn observe(&mut self, obs: TurnObservation, config: &EngineConfig) -> Transition {
        self.engagement_level = obs.engagement.clamp(1, 10);
        self.stress_level = obs.stress.clamp(1, 10);
        self.history.effectiveness_scores.push(obs.effectiveness);

        let transition = if obs.crisis >= CrisisLevel::Severe {
            self.enter_phase(Phase::Safety, obs.now);
            Transition::SafetyOverride
        } else if self.engagement_level >= config.phase_complete_engagement
            && self.stress_level <= config.phase_complete_stress
        {
            match self.current_phase.next() {
                Some(next) => {
                    self.enter_phase(next, obs.now);
                    Transition::PhaseAdvanced
                }
                // Planning has no successor; completion evaluations are no-ops.
                None => Transition::Held,
            }
        } else if obs.effectiveness >= config.step_advance_effectiveness {
            if self.advance_step() {
                Transition::StepAdvanced
            } else {
                Transition::Held
            }
        } else {
            Transition::Held
        };

        self.update_progress();

        tracing::debug!(
            phase = %self.current_phase,
            step = %self.current_step_id,
            ?transition,
            stress = self.stress_level,
            engagement = self.engagement_level,
            "de-escalation observation"
        );

        transition
    }

    /// Record a completed technique so the planner won't re-suggest its
    /// modality this episode.
    pub fn record_completed_technique(&mut self, technique_id: &str) {
        if !self.completed_techniques.iter().any(|t| t == technique_id) {
            self.completed_techniques.push(technique_id.to_string());
        }
    }

    /// Record a breakthrough moment (strongly positive reply).
    pub fn record_breakthrough(&mut self, note: impl Into<String>) {
        self.breakthrough_moments.push(note.into());
    }

    fn enter_phase(&mut self, phase: Phase, now: DateTime<Utc>) {
        self.current_phase = phase;
        self.current_step_id = script_for(phase).steps[0].id.to_string();
        self.phase_started_at = now;
        self.history.steps_visited.push(self.current_step_id.clone());
    }

    /// Move to the next step in the current phase. Returns false when
    /// already on the last step (which then repeats).
    fn advance_step(&mut self) -> bool {
        let script = script_for(self.current_phase);
        let idx = script
            .steps
            .iter()
            .position(|s| s.id == self.current_step_id)
            .unwrap_or(0);
        if idx + 1 < script.steps.len() {
            self.current_step_id = script.steps[idx + 1].id.to_string();
            self.history.steps_visited.push(self.current_step_id.clone());
            true
        } else {
            false
        }
    }

    /// Recompute `total_progress` from phase/step position; never decreases.
    fn update_progress(&mut self) {
        let phase_idx = self.current_phase as usize;
        let script = script_for(self.current_phase);
        let step_idx = script
            .steps
            .iter()
            .position(|s| s.id == self.current_step_id)
            .unwrap_or(0);

        let computed = if self.is_terminal() {
            100
        } else {
            let per_phase = 100 / Phase::ALL.len();
            let within = (step_idx * per_phase) / script.steps.len();
            (phase_idx * per_phase + within) as u8
        };

        self.total_progress = self.total_progress.max(computed);
    }
}
