//! Per-turn orchestration: replay context, run classifiers, drive the phase
//! machine, compose instructions, generate, and enforce engine truth on the
//! result.
//!
//! The orchestrator holds no per-conversation state. Everything mutable —
//! message history, the de-escalation state — arrives in [`TurnInput`] and
//! leaves in [`TurnOutcome`], so sessions can be processed concurrently
//! without shared-state hazards. State commits are atomic: the incoming
//! `DeescalationState` is only replaced in the outcome when the turn fully
//! succeeds; on generation failure the caller gets it back untouched.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};

use helen_engine::classifiers::{attention, rsd, rupture};
use helen_engine::context::recent_user_turns;
use helen_engine::deescalation::Transition;
use helen_engine::planner::{self, SequencingInputs};
use helen_engine::{
    scoring, AttentionFadeResult, ConversationContext, CrisisLevel, DeescalationState,
    EngagementLevel, EngineConfig, InterventionPlan, Message, Phase, PreviousActivity,
    RsdStageResult, RuptureResult, Sender, SessionPlan, TurnObservation,
};

use crate::generation::Generator;
use crate::prompts::{self, TurnBriefing};
use crate::response::{self, ConversationState, StructuredResponse};

/// Everything the caller supplies for one turn.
#[derive(Debug, Clone)]
pub struct TurnInput {
    pub session_id: String,
    /// Full conversation history, oldest first, ending with the user's
    /// latest message.
    pub messages: Vec<Message>,
    pub previous_activity: Option<PreviousActivity>,
    /// De-escalation state from the previous turn, if an episode is active.
    pub deescalation: Option<DeescalationState>,
    pub now: DateTime<Utc>,
}

/// What the engine decided this turn, independent of what the model said.
/// Carried out for the caller's persistence/telemetry layer.
#[derive(Debug, Clone)]
pub struct TurnDecision {
    pub crisis: CrisisLevel,
    pub fade: AttentionFadeResult,
    pub rupture: RuptureResult,
    pub rsd: RsdStageResult,
    pub phase: Option<Phase>,
    pub step_id: Option<String>,
    pub transition: Option<Transition>,
    pub session: SessionPlan,
    pub interventions: InterventionPlan,
    /// Whether the fallback response was substituted for a failed generation.
    pub used_fallback: bool,
}

/// The result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub response: StructuredResponse,
    /// Updated de-escalation state, or the incoming one untouched when the
    /// turn could not commit.
    pub deescalation: Option<DeescalationState>,
    pub decision: TurnDecision,
}

/// The orchestration facade. Generic over the generation collaborator so
/// tests can substitute a scripted one.
pub struct Orchestrator<G: Generator> {
    generator: G,
    config: EngineConfig,
    rng: StdRng,
}

impl<G: Generator> Orchestrator<G> {
    pub fn new(generator: G, config: EngineConfig, seed: u64) -> Self {
        Self {
            generator,
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Run the full pipeline for one turn.
    pub async fn process_turn(&mut self, input: TurnInput) -> TurnOutcome {
        let latest = latest_user_text(&input.messages);
        let context = ConversationContext::from_history(
            input.session_id.clone(),
            &input.messages,
            input.previous_activity,
            &self.config,
        );

        let crisis = context.crisis_level;
        let recent = recent_user_turns(&input.messages, self.config.recent_turn_window);
        let fade = attention::detect(&recent, &self.config);
        let recent_texts: Vec<&str> = recent.iter().map(|m| m.text.as_str()).collect();
        let rupture = rupture::detect(&recent_texts.join(" "));
        let rsd = rsd::classify(latest);

        // Hard safety override: fixed hotline response, human handoff, no
        // interventions, and no generation call.
        if crisis == CrisisLevel::Imminent {
            return self.imminent_override(input, crisis, fade, rupture, rsd);
        }

        let effectiveness = scoring::effectiveness_score(latest);
        let engagement = scoring::engagement_score(latest);
        let prior_stress = input
            .deescalation
            .as_ref()
            .map_or(5, |state| state.stress_level);
        let stress = scoring::update_stress(prior_stress, latest);

        // Candidate state: observe on a copy, commit only on success. An
        // active rupture holds phase progression for the turn unless a
        // severe crisis forces the safety override anyway.
        let mut candidate = input
            .deescalation
            .clone()
            .or_else(|| (crisis >= CrisisLevel::Moderate).then(|| DeescalationState::new(input.now)));
        let transition = candidate.as_mut().map(|state| {
            if rupture.detected && crisis < CrisisLevel::Severe {
                Transition::Held
            } else {
                state.observe(
                    TurnObservation {
                        crisis,
                        effectiveness,
                        engagement,
                        stress,
                        now: input.now,
                    },
                    &self.config,
                )
            }
        });

        let session = planner::plan_session(crisis, &recent_texts);
        let interventions = planner::sequence_interventions(&SequencingInputs {
            crisis,
            previous_activity: input.previous_activity,
            recent_user_texts: &recent_texts,
            attention_fading: fade.fading,
            low_energy: context.engagement_level == EngagementLevel::Low,
            rsd_stage: rsd.stage.filter(|_| rsd.warrants_intervention()),
        });

        let validation = rsd
            .stage
            .filter(|_| rsd.warrants_validation())
            .map(|stage| rsd::validation_phrase(stage, &mut self.rng));

        let step = candidate
            .as_ref()
            .map_or_else(|| first_listening_step(), |state| state.current_step());
        let phase = candidate
            .as_ref()
            .map_or(Phase::Validation, |state| state.current_phase);
        let instructions = prompts::compose_turn_instructions(&TurnBriefing {
            crisis,
            phase,
            step,
            session: &session,
            interventions: &interventions,
            fade: &fade,
            rupture: rupture.detected.then_some(&rupture),
            validation,
        });

        let generated = self.generator.generate(&instructions, &input.messages).await;
        let parsed = match generated {
            Ok(raw) => {
                let parsed = response::parse_structured_response(&raw);
                if parsed.is_none() {
                    warn!(session = %input.session_id, "schema violation in generated response");
                }
                parsed
            }
            Err(e) => {
                warn!(session = %input.session_id, error = %e, "generation failed");
                None
            }
        };

        match parsed {
            Some(mut response) => {
                // Engine truth wins over whatever the model claimed.
                response.detected_crisis_level = crisis;
                response.is_rupture_repair = rupture.detected;
                response.is_attention_accommodation = fade.fading;
                if rupture.detected {
                    response.conversation_state_update = ConversationState::RuptureRepair;
                }
                if response.adhd_validation.is_none() {
                    response.adhd_validation = validation.map(String::from);
                }

                info!(
                    session = %input.session_id,
                    crisis = %crisis,
                    phase = %phase,
                    fading = fade.fading,
                    rupture = rupture.detected,
                    "turn committed"
                );

                TurnOutcome {
                    response,
                    deescalation: candidate.clone(),
                    decision: TurnDecision {
                        crisis,
                        fade,
                        rupture,
                        rsd,
                        phase: candidate.as_ref().map(|s| s.current_phase),
                        step_id: candidate.as_ref().map(|s| s.current_step_id.clone()),
                        transition,
                        session,
                        interventions,
                        used_fallback: false,
                    },
                }
            }
            None => TurnOutcome {
                response: StructuredResponse::fallback(crisis),
                // Atomic commit: the candidate is discarded, the caller
                // keeps the state they sent.
                deescalation: input.deescalation,
                decision: TurnDecision {
                    crisis,
                    fade,
                    rupture,
                    rsd,
                    phase: None,
                    step_id: None,
                    transition: None,
                    session,
                    interventions,
                    used_fallback: true,
                },
            },
        }
    }

    fn imminent_override(
        &self,
        input: TurnInput,
        crisis: CrisisLevel,
        fade: AttentionFadeResult,
        rupture: RuptureResult,
        rsd: RsdStageResult,
    ) -> TurnOutcome {
        info!(session = %input.session_id, "imminent crisis — hotline override, human handoff");

        // The phase machine still records the safety override so a resumed
        // episode starts from the first safety step.
        let mut candidate = input
            .deescalation
            .clone()
            .unwrap_or_else(|| DeescalationState::new(input.now));
        let transition = candidate.observe(
            TurnObservation {
                crisis,
                effectiveness: scoring::effectiveness_score(""),
                engagement: scoring::engagement_score(""),
                stress: 10,
                now: input.now,
            },
            &self.config,
        );

        let session = planner::plan_session(crisis, &[]);
        TurnOutcome {
            response: StructuredResponse::crisis_override(),
            deescalation: Some(candidate.clone()),
            decision: TurnDecision {
                crisis,
                fade,
                rupture,
                rsd,
                phase: Some(candidate.current_phase),
                step_id: Some(candidate.current_step_id.clone()),
                transition: Some(transition),
                session,
                interventions: InterventionPlan {
                    sequence: Vec::new(),
                    current_index: 0,
                    estimated_total_minutes: 0,
                    attention_adapted: false,
                    energy_adapted: false,
                    activities_already_completed: Vec::new(),
                },
                used_fallback: false,
            },
        }
    }
}

fn latest_user_text(messages: &[Message]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.sender == Sender::User)
        .map_or("", |m| m.text.as_str())
}

/// Step guidance for turns with no active de-escalation episode.
fn first_listening_step() -> &'static helen_engine::PhaseStep {
    &helen_engine::deescalation::script_for(Phase::Validation).steps[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_user_text_skips_agent_messages() {
        let t = Utc::now();
        let messages = vec![
            Message::user("first", t),
            Message::agent("reply", t),
            Message::user("second", t),
            Message::agent("another reply", t),
        ];
        assert_eq!(latest_user_text(&messages), "second");
    }

    #[test]
    fn test_latest_user_text_empty_history() {
        assert_eq!(latest_user_text(&[]), "");
    }
}
