//! Attention fade detection over the trailing user-turn window.
//!
//! ADHD attention fade shows up behaviorally before the user says anything
//! about it: replies slow down, shrink, and drift into disengagement
//! phrases. Three independent signal categories are checked; fade is only
//! reported when at least two distinct categories fire, so a single short
//! reply never triggers an accommodation on its own.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::context::Message;
use crate::scoring::{self, WITHDRAWAL};

/// Which fade signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeIndicator {
    /// Response latency above the configured threshold on some turn.
    SlowResponse,
    /// Strictly decreasing message length across the window.
    ShrinkingMessages,
    /// A disengagement phrase ("idk", "whatever", ...) was present.
    Disengagement,
    /// A withdrawal phrase ("leave me alone", "go away", ...) was present.
    Withdrawal,
}

/// How aggressively to adapt pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FadeSeverity {
    Low,
    Medium,
    High,
}

/// Result of a fade check over the recent window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionFadeResult {
    pub fading: bool,
    pub indicators: BTreeSet<FadeIndicator>,
    pub severity: FadeSeverity,
}

impl AttentionFadeResult {
    fn focused() -> Self {
        Self {
            fading: false,
            indicators: BTreeSet::new(),
            severity: FadeSeverity::Low,
        }
    }
}

/// Short, non-committal replies that signal drift without exit intent.
const DISENGAGEMENT_PHRASES: &[&str] = &[
    "idk",
    "whatever",
    "i guess",
    "sure",
    "nevermind",
    "never mind",
    "doesn't matter",
    "doesnt matter",
];

/// Check the last (≤3) user turns for attention fade.
///
/// `turns` is oldest-first. `fading` is true iff at least
/// `config.fade_min_signals` distinct categories fire; phrase hits count as
/// one category whether disengagement or withdrawal. Severity is High iff a
/// withdrawal phrase fired, Medium when fading, else Low.
pub fn detect(turns: &[&Message], config: &EngineConfig) -> AttentionFadeResult {
    if turns.is_empty() {
        return AttentionFadeResult::focused();
    }

    let mut indicators = BTreeSet::new();

    if turns
        .iter()
        .any(|m| m.latency_ms.is_some_and(|ms| ms > config.latency_threshold_ms))
    {
        indicators.insert(FadeIndicator::SlowResponse);
    }

    if turns.len() >= 2 {
        let lengths: Vec<usize> = turns.iter().map(|m| m.text.chars().count()).collect();
        if lengths.windows(2).all(|w| w[1] < w[0]) {
            indicators.insert(FadeIndicator::ShrinkingMessages);
        }
    }

    let mut withdrawal_hit = false;
    for msg in turns {
        let lower = msg.text.to_lowercase();
        if WITHDRAWAL.iter().any(|p| lower.contains(p)) {
            indicators.insert(FadeIndicator::Withdrawal);
            withdrawal_hit = true;
        } else if scoring::matches_any_phrase(&lower, DISENGAGEMENT_PHRASES) {
            // Word-boundary matching: "sure" must not fire inside "pressure".
            indicators.insert(FadeIndicator::Disengagement);
        }
    }

    // Disengagement and withdrawal are one signal category for the 2-of-N rule.
    let phrase_categories =
        usize::from(indicators.contains(&FadeIndicator::Disengagement) || withdrawal_hit);
    let categories = usize::from(indicators.contains(&FadeIndicator::SlowResponse))
        + usize::from(indicators.contains(&FadeIndicator::ShrinkingMessages))
        + phrase_categories;

    let fading = categories >= config.fade_min_signals;
    let severity = if withdrawal_hit {
        FadeSeverity::High
    } else if fading {
        FadeSeverity::Medium
    } else {
        FadeSeverity::Low
    };

    AttentionFadeResult {
        fading,
        indicators,
        severity,
    }
}
