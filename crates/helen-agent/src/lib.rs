//! Orchestration facade for Helen, an ADHD-aware crisis-support companion.
//!
//! The deterministic decision core lives in `helen-engine`; this crate wires
//! it to an external text-generation service: per-turn pipeline, persona and
//! prompt composition, the generation collaborator boundary, and the
//! fail-closed structured-response contract.

pub mod config;
pub mod generation;
pub mod orchestrator;
pub mod prompts;
pub mod response;

pub use config::AgentConfig;
pub use generation::{GenerationError, Generator, OpenAiGenerator};
pub use orchestrator::{Orchestrator, TurnDecision, TurnInput, TurnOutcome};
pub use response::{ConversationState, StructuredResponse, SuggestedIntervention};
