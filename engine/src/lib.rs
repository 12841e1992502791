//! Helen conversation orchestration core.
//!
//! This crate is the deterministic half of the Helen support agent:
//! - Signal classifiers for crisis level, attention fade, therapeutic
//!   rupture, and the five-stage RSD spiral.
//! - A static catalog of ADHD-adapted coping techniques.
//! - The five-phase de-escalation state machine.
//! - The adaptive session planner and intervention sequencer.
//!
//! Everything here is a pure function of explicitly passed state plus the
//! incoming message history. There is no I/O, no async, and no ambient
//! clock or randomness — callers supply `DateTime<Utc>` timestamps and a
//! seedable rng, which keeps every decision replayable in tests. The
//! LLM-facing facade lives in the `helen-agent` crate.

pub mod catalog;
pub mod classifiers;
pub mod config;
pub mod context;
pub mod deescalation;
pub mod planner;
pub mod scoring;

pub use catalog::{AttentionCost, Technique, TechniqueCategory};
pub use classifiers::attention::{AttentionFadeResult, FadeIndicator, FadeSeverity};
pub use classifiers::crisis::CrisisLevel;
pub use classifiers::rsd::{RsdStage, RsdStageResult};
pub use classifiers::rupture::{RepairStrategy, RuptureResult, RuptureSeverity, RuptureType};
pub use config::EngineConfig;
pub use context::{
    AttentionStatus, ConversationContext, EngagementLevel, Message, PreviousActivity, Sender,
};
pub use deescalation::{DeescalationState, EpisodeHistory, Phase, PhaseStep, TurnObservation};
pub use planner::{BreakKind, InterventionPlan, SessionPlan, SessionTier};
