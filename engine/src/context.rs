//! Conversation messages and the per-turn derived context.
//!
//! `ConversationContext` is never persisted — it is replayed from the
//! ordered message history at the start of every turn so the engine stays a
//! pure function of (history, new message, clock).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifiers::attention;
use crate::classifiers::crisis::{self, CrisisLevel};
use crate::config::EngineConfig;
use crate::scoring;

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Agent,
    System,
}

/// A single conversation message. Immutable once created; appended to a
/// per-session ordered list by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    /// Time the user took to reply to the previous agent message, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl Message {
    pub fn user(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
            timestamp,
            latency_ms: None,
        }
    }

    pub fn agent(text: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            sender: Sender::Agent,
            text: text.into(),
            timestamp,
            latency_ms: None,
        }
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

/// Coarse engagement bucket derived from recent user turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementLevel {
    Low,
    Medium,
    High,
}

/// Whether the user's attention is currently holding or fading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttentionStatus {
    Focused,
    Fading,
}

/// Activity the user completed immediately before this session, when the
/// caller knows about one. Used to avoid re-suggesting the same modality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviousActivity {
    Breathing,
    Grounding,
}

/// Per-turn derived view over the conversation. Created at turn start by
/// replaying history; discarded at turn end.
#[derive(Debug, Clone)]
pub struct ConversationContext {
    pub session_id: String,
    pub crisis_level: CrisisLevel,
    pub attention_status: AttentionStatus,
    pub engagement_level: EngagementLevel,
    pub last_interaction_time: Option<DateTime<Utc>>,
    pub session_start_time: Option<DateTime<Utc>>,
    pub previous_activity: Option<PreviousActivity>,
}

impl ConversationContext {
    /// Replay the ordered history into a fresh context for this turn.
    ///
    /// Crisis level comes from the latest user message alone (the hard
    /// safety signal must not be diluted by older calm turns); attention and
    /// engagement look at the trailing window of user turns.
    pub fn from_history(
        session_id: impl Into<String>,
        messages: &[Message],
        previous_activity: Option<PreviousActivity>,
        config: &EngineConfig,
    ) -> Self {
        let recent_user: Vec<&Message> = recent_user_turns(messages, config.recent_turn_window);

        let crisis_level = recent_user
            .last()
            .map(|m| crisis::classify(&m.text))
            .unwrap_or(CrisisLevel::None);

        let fade = attention::detect(&recent_user, config);
        let attention_status = if fade.fading {
            AttentionStatus::Fading
        } else {
            AttentionStatus::Focused
        };

        let engagement_level = bucket_engagement(&recent_user);

        Self {
            session_id: session_id.into(),
            crisis_level,
            attention_status,
            engagement_level,
            last_interaction_time: messages.last().map(|m| m.timestamp),
            session_start_time: messages.first().map(|m| m.timestamp),
            previous_activity,
        }
    }
}

/// The last `window` user messages, oldest first.
pub fn recent_user_turns(messages: &[Message], window: usize) -> Vec<&Message> {
    let mut turns: Vec<&Message> = messages
        .iter()
        .rev()
        .filter(|m| m.sender == Sender::User)
        .take(window)
        .collect();
    turns.reverse();
    turns
}

/// Majority vote over per-turn engagement scores.
fn bucket_engagement(recent_user: &[&Message]) -> EngagementLevel {
    if recent_user.is_empty() {
        return EngagementLevel::Medium;
    }
    let mut low = 0usize;
    let mut medium = 0usize;
    let mut high = 0usize;
    for msg in recent_user {
        match scoring::engagement_score(&msg.text) {
            1..=3 => low += 1,
            4..=6 => medium += 1,
            _ => high += 1,
        }
    }
    if high >= low && high >= medium {
        EngagementLevel::High
    } else if low > medium {
        EngagementLevel::Low
    } else {
        EngagementLevel::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_from_history_empty() {
        let config = EngineConfig::default();
        let ctx = ConversationContext::from_history("s-1", &[], None, &config);
        assert_eq!(ctx.crisis_level, CrisisLevel::None);
        assert_eq!(ctx.attention_status, AttentionStatus::Focused);
        assert_eq!(ctx.engagement_level, EngagementLevel::Medium);
        assert!(ctx.last_interaction_time.is_none());
        assert!(ctx.session_start_time.is_none());
    }

    #[test]
    fn test_crisis_comes_from_latest_user_message() {
        let config = EngineConfig::default();
        let messages = vec![
            Message::user("I'm feeling stressed", at(0)),
            Message::agent("I hear you.", at(5)),
            Message::user("actually I feel hopeless, I can't go on", at(10)),
        ];
        let ctx = ConversationContext::from_history("s-1", &messages, None, &config);
        assert_eq!(ctx.crisis_level, CrisisLevel::Severe);
    }

    #[test]
    fn test_recent_user_turns_skips_agent_messages() {
        let messages = vec![
            Message::user("one", at(0)),
            Message::agent("reply", at(1)),
            Message::user("two", at(2)),
            Message::user("three", at(3)),
            Message::user("four", at(4)),
        ];
        let turns = recent_user_turns(&messages, 3);
        let texts: Vec<&str> = turns.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["two", "three", "four"]);
    }

    #[test]
    fn test_fading_history_marks_attention() {
        let config = EngineConfig::default();
        let messages = vec![
            Message::user("I'm overwhelmed", at(0)),
            Message::user("yeah I guess", at(20)),
            Message::user("idk", at(40)),
        ];
        let ctx = ConversationContext::from_history("s-1", &messages, None, &config);
        assert_eq!(ctx.attention_status, AttentionStatus::Fading);
    }

    #[test]
    fn test_session_times_from_first_and_last_message() {
        let config = EngineConfig::default();
        let messages = vec![
            Message::user("hello there, how does this work?", at(0)),
            Message::agent("welcome", at(3)),
        ];
        let ctx = ConversationContext::from_history("s-1", &messages, None, &config);
        assert_eq!(ctx.session_start_time, Some(at(0)));
        assert_eq!(ctx.last_interaction_time, Some(at(3)));
    }
}
