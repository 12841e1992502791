//! Tunable decision thresholds.
//!
//! The defaults reproduce the behavior the heuristics were shipped with.
//! None of these values is derived from data — they are pacing knobs, so
//! they live in one struct instead of being scattered as magic numbers.

use serde::{Deserialize, Serialize};

/// Threshold configuration for the classifiers, the phase machine, and the
/// session planner.
///
/// Shared read-only across sessions; construct once and pass by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Response latency above which a turn counts as a slow-response
    /// attention signal.
    pub latency_threshold_ms: u64,
    /// Number of distinct fade signal categories required before the
    /// detector reports `fading = true`.
    pub fade_min_signals: usize,
    /// Per-turn effectiveness score required to advance to the next step
    /// within a de-escalation phase.
    pub step_advance_effectiveness: u8,
    /// Engagement level required for a phase to count as complete.
    pub phase_complete_engagement: u8,
    /// Stress level that must not be exceeded for a phase to count as
    /// complete.
    pub phase_complete_stress: u8,
    /// How many trailing user turns the attention and engagement windows
    /// look at.
    pub recent_turn_window: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            latency_threshold_ms: 15_000,
            fade_min_signals: 2,
            step_advance_effectiveness: 7,
            phase_complete_engagement: 6,
            phase_complete_stress: 5,
            recent_turn_window: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_shipped_thresholds() {
        let config = EngineConfig::default();
        assert_eq!(config.latency_threshold_ms, 15_000);
        assert_eq!(config.fade_min_signals, 2);
        assert_eq!(config.step_advance_effectiveness, 7);
        assert_eq!(config.phase_complete_engagement, 6);
        assert_eq!(config.phase_complete_stress, 5);
        assert_eq!(config.recent_turn_window, 3);
    }

    #[test]
    fn test_config_serde_roundtrip() {
        let config = EngineConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let restored: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.latency_threshold_ms, config.latency_threshold_ms);
        assert_eq!(restored.recent_turn_window, config.recent_turn_window);
    }
}
