//! End-to-end turn pipeline tests against a scripted generator.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use helen_agent::generation::{GenerationError, Generator};
use helen_agent::orchestrator::{Orchestrator, TurnInput};
use helen_agent::response::ConversationState;
use helen_engine::{CrisisLevel, DeescalationState, EngineConfig, Message, Phase};

/// Scripted generator: replies with a fixed string, or fails when `reply`
/// is `None`. Counts calls so tests can assert the no-generation paths.
struct MockGenerator {
    reply: Option<String>,
    calls: Arc<AtomicUsize>,
}

impl MockGenerator {
    fn returning(reply: impl Into<String>) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                reply: Some(reply.into()),
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn failing() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                reply: None,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(
        &self,
        _instructions: &str,
        _history: &[Message],
    ) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Some(reply) => Ok(reply.clone()),
            None => Err(GenerationError::Timeout),
        }
    }
}

fn valid_reply() -> String {
    serde_json::json!({
        "responseText": "I'm right here with you.",
        "detectedCrisisLevel": "none",
        "conversationStateUpdate": "supporting",
        "suggestedInterventions": [],
        "isRuptureRepair": false,
        "isAttentionAccommodation": false
    })
    .to_string()
}

fn at(secs: i64) -> chrono::DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn input(messages: Vec<Message>, deescalation: Option<DeescalationState>) -> TurnInput {
    TurnInput {
        session_id: "test-session".into(),
        messages,
        previous_activity: None,
        deescalation,
        now: at(600),
    }
}

#[tokio::test]
async fn imminent_crisis_skips_generation_and_returns_hotline() {
    let (generator, calls) = MockGenerator::returning(valid_reply());
    let mut orchestrator = Orchestrator::new(generator, EngineConfig::default(), 42);

    let messages = vec![Message::user("I want to end it, I have a plan", at(0))];
    let outcome = orchestrator.process_turn(input(messages, None)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(outcome.response.response_text.contains("988"));
    assert_eq!(
        outcome.response.conversation_state_update,
        ConversationState::HumanHandoff
    );
    assert!(outcome.response.suggested_interventions.is_empty());
    assert_eq!(outcome.decision.crisis, CrisisLevel::Imminent);
    // The episode lands on the first safety step for any later resume.
    let state = outcome.deescalation.unwrap();
    assert_eq!(state.current_phase, Phase::Safety);
    assert_eq!(state.current_step_id, "safety-1");
}

#[tokio::test]
async fn generation_failure_substitutes_fallback_and_keeps_state() {
    let (generator, calls) = MockGenerator::failing();
    let mut orchestrator = Orchestrator::new(generator, EngineConfig::default(), 42);

    let before = DeescalationState::new(at(0));
    let messages = vec![Message::user("I'm feeling really overwhelmed today", at(0))];
    let outcome = orchestrator.process_turn(input(messages, Some(before.clone()))).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(outcome.decision.used_fallback);
    assert!(outcome.response.response_text.contains("still here"));
    // Atomic commit: state comes back exactly as sent.
    let after = outcome.deescalation.unwrap();
    assert_eq!(after.current_phase, before.current_phase);
    assert_eq!(after.current_step_id, before.current_step_id);
    assert_eq!(after.stress_level, before.stress_level);
}

#[tokio::test]
async fn schema_violation_is_treated_as_generation_failure() {
    let (generator, _) = MockGenerator::returning("I hear you, that sounds hard.");
    let mut orchestrator = Orchestrator::new(generator, EngineConfig::default(), 42);

    let messages = vec![Message::user("I'm feeling anxious about tomorrow", at(0))];
    let outcome = orchestrator.process_turn(input(messages, None)).await;

    assert!(outcome.decision.used_fallback);
    assert_eq!(outcome.decision.crisis, CrisisLevel::Mild);
    assert_eq!(outcome.response.detected_crisis_level, CrisisLevel::Mild);
}

#[tokio::test]
async fn effective_reply_advances_step_within_safety_phase() {
    let (generator, _) = MockGenerator::returning(valid_reply());
    let mut orchestrator = Orchestrator::new(generator, EngineConfig::default(), 42);

    let before = DeescalationState::new(at(0));
    assert_eq!(before.current_step_id, "safety-1");
    let messages = vec![Message::user(
        "thank you, that helps a lot, can we try the next part together?",
        at(30),
    )];
    let outcome = orchestrator.process_turn(input(messages, Some(before))).await;

    let after = outcome.deescalation.unwrap();
    assert_eq!(after.current_phase, Phase::Safety);
    assert_eq!(after.current_step_id, "safety-2");
}

#[tokio::test]
async fn engine_truth_overrides_model_claims() {
    // The model claims "none" but the user's text is severe-tier.
    let (generator, _) = MockGenerator::returning(valid_reply());
    let mut orchestrator = Orchestrator::new(generator, EngineConfig::default(), 42);

    let before = DeescalationState::new(at(0));
    let messages = vec![Message::user("it all feels hopeless, I can't go on", at(30))];
    let outcome = orchestrator.process_turn(input(messages, Some(before))).await;

    assert_eq!(outcome.response.detected_crisis_level, CrisisLevel::Severe);
    // Severe forces the safety phase regardless of what the model said.
    let after = outcome.deescalation.unwrap();
    assert_eq!(after.current_phase, Phase::Safety);
}

#[tokio::test]
async fn rupture_sets_repair_flags_and_holds_phase() {
    let (generator, _) = MockGenerator::returning(valid_reply());
    let mut orchestrator = Orchestrator::new(generator, EngineConfig::default(), 42);

    let before = DeescalationState::new(at(0));
    let step_before = before.current_step_id.clone();
    let messages = vec![Message::user("this isn't working at all", at(30))];
    let outcome = orchestrator.process_turn(input(messages, Some(before))).await;

    assert!(outcome.decision.rupture.detected);
    assert!(outcome.response.is_rupture_repair);
    assert_eq!(
        outcome.response.conversation_state_update,
        ConversationState::RuptureRepair
    );
    let after = outcome.deescalation.unwrap();
    assert_eq!(after.current_step_id, step_before);
}

#[tokio::test]
async fn fade_scenario_flags_attention_accommodation() {
    let (generator, _) = MockGenerator::returning(valid_reply());
    let mut orchestrator = Orchestrator::new(generator, EngineConfig::default(), 42);

    let messages = vec![
        Message::user("I'm overwhelmed", at(0)),
        Message::user("yeah I guess", at(60)),
        Message::user("idk", at(120)),
    ];
    let outcome = orchestrator.process_turn(input(messages, None)).await;

    assert!(outcome.decision.fade.fading);
    assert!(outcome.response.is_attention_accommodation);
    assert!(outcome.decision.interventions.attention_adapted);
}
