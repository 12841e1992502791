//! Per-turn scoring heuristics.
//!
//! Three independent 1–10 scales drive pacing decisions:
//! - effectiveness: did the last intervention/step land?
//! - engagement: how present is the user right now?
//! - stress: carried turn to turn and nudged by relief/struggle phrases.
//!
//! These are keyword heuristics, not sentiment analysis. Scores are always
//! clamped to [1, 10] for arbitrary input, including empty strings.

/// Phrases indicating the current step is helping.
const AFFECT_POSITIVE: &[&str] = &["better", "helps", "thank"];

/// Phrases indicating the current step is hurting.
const AFFECT_NEGATIVE: &[&str] = &["worse", "angry", "pointless"];

/// Phrases indicating gratitude or an explicit ask for help.
const GRATITUDE_HELP: &[&str] = &["thank", "thanks", "help me", "can you help", "appreciate"];

/// Minimal-commitment replies.
const LOW_COMMITMENT: &[&str] = &["ok", "idk"];

/// Phrases signalling the user is pulling out of the conversation.
pub(crate) const WITHDRAWAL: &[&str] = &[
    "leave me alone",
    "go away",
    "forget it",
    "i'm done",
    "im done",
    "stop talking",
    "bye",
];

/// Phrases signalling relief / de-escalation.
const RELIEF: &[&str] = &["calmer", "breathing helped", "a bit better", "slowing down", "relieved"];

/// Phrases signalling ongoing struggle.
const STRUGGLE: &[&str] = &["still", "can't stop", "racing", "shaking", "struggling"];

/// Phrases signalling acute risk; these also feed the crisis classifier.
const ACUTE_RISK: &[&str] = &["hurt myself", "not safe", "scared of myself", "want to disappear"];

fn contains_any(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| text.contains(p))
}

/// True when the phrase occurs in the text. Single-word cues match on word
/// boundaries — "ok" must not fire inside "spoke" or "looking" — while
/// multi-word phrases keep plain substring search.
pub(crate) fn matches_phrase(text: &str, phrase: &str) -> bool {
    if phrase.contains(' ') {
        text.contains(phrase)
    } else {
        text.split(|c: char| !c.is_alphanumeric())
            .any(|token| token == phrase)
    }
}

pub(crate) fn matches_any_phrase(text: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|p| matches_phrase(text, p))
}

fn clamp_score(score: i32) -> u8 {
    score.clamp(1, 10) as u8
}

/// Score how well the current step landed, from the user's reply.
///
/// Baseline 5; +2 affect-positive, +1 length > 50, +1 contains '?',
/// −2 affect-negative; clamped to [1, 10]. An empty reply scores the
/// baseline 5.
pub fn effectiveness_score(text: &str) -> u8 {
    let lower = text.to_lowercase();
    let mut score: i32 = 5;

    if contains_any(&lower, AFFECT_POSITIVE) {
        score += 2;
    }
    if text.chars().count() > 50 {
        score += 1;
    }
    if text.contains('?') {
        score += 1;
    }
    if contains_any(&lower, AFFECT_NEGATIVE) {
        score -= 2;
    }

    clamp_score(score)
}

/// Score how engaged the user is, from a single reply.
///
/// Baseline 5; −2 for replies under 10 chars, +1 over 50 chars, +2 for
/// gratitude/help phrases, −1 for low-commitment replies, −3 for withdrawal
/// phrases, +1 for a question; clamped to [1, 10].
pub fn engagement_score(text: &str) -> u8 {
    let lower = text.to_lowercase();
    let mut score: i32 = 5;

    let len = text.chars().count();
    if len < 10 {
        score -= 2;
    }
    if len > 50 {
        score += 1;
    }
    if contains_any(&lower, GRATITUDE_HELP) {
        score += 2;
    }
    if matches_any_phrase(&lower, LOW_COMMITMENT) {
        score -= 1;
    }
    if contains_any(&lower, WITHDRAWAL) {
        score -= 3;
    }
    if text.contains('?') {
        score += 1;
    }

    clamp_score(score)
}

/// Update the carried stress level from the user's reply.
///
/// −1 for relief phrases, +1 for struggle phrases, +2 for acute-risk
/// phrases; clamped to [1, 10].
pub fn update_stress(previous: u8, text: &str) -> u8 {
    let lower = text.to_lowercase();
    let mut score: i32 = i32::from(previous);

    if contains_any(&lower, RELIEF) {
        score -= 1;
    }
    if contains_any(&lower, STRUGGLE) {
        score += 1;
    }
    if contains_any(&lower, ACUTE_RISK) {
        score += 2;
    }

    clamp_score(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- effectiveness --

    #[test]
    fn test_effectiveness_empty_is_baseline() {
        assert_eq!(effectiveness_score(""), 5);
    }

    #[test]
    fn test_effectiveness_positive_phrase() {
        assert_eq!(effectiveness_score("that helps"), 7);
    }

    #[test]
    fn test_effectiveness_negative_phrase() {
        assert_eq!(effectiveness_score("this is pointless"), 3);
    }

    #[test]
    fn test_effectiveness_long_question_stacks() {
        // +2 positive, +1 length, +1 question
        let text = "that actually helps a lot, can we try the next part of it together?";
        assert_eq!(effectiveness_score(text), 9);
    }

    #[test]
    fn test_effectiveness_clamped_low() {
        assert!(effectiveness_score("worse and angry and pointless") >= 1);
    }

    #[test]
    fn test_effectiveness_step_advance_threshold_reachable() {
        assert!(effectiveness_score("breathing helps, I feel better now honestly") >= 7);
    }

    // -- engagement --

    #[test]
    fn test_engagement_short_reply_penalised() {
        assert_eq!(engagement_score("fine"), 3);
    }

    #[test]
    fn test_engagement_idk_is_low() {
        // short (−2) and low-commitment (−1)
        assert_eq!(engagement_score("idk"), 2);
    }

    #[test]
    fn test_engagement_withdrawal_floors_out() {
        assert_eq!(engagement_score("go away"), 1);
    }

    #[test]
    fn test_engagement_gratitude_and_question() {
        let text = "thank you, that made sense to me. what should I try next time this happens?";
        // +1 length, +2 gratitude, +1 question
        assert_eq!(engagement_score(text), 9);
    }

    #[test]
    fn test_engagement_ok_only_matches_whole_word() {
        // "spoke" and "looking" contain "ok" but are not low-commitment.
        let text = "we spoke about what happened and I was looking for better words";
        // +1 length only
        assert_eq!(engagement_score(text), 6);
        // bare "ok" still fires: short (−2) and low-commitment (−1)
        assert_eq!(engagement_score("ok"), 2);
    }

    #[test]
    fn test_engagement_clamped_bounds() {
        for text in ["", "x", "ok idk go away forget it", &"a".repeat(5000)] {
            let score = engagement_score(text);
            assert!((1..=10).contains(&score), "score {score} for {text:?}");
        }
    }

    // -- stress --

    #[test]
    fn test_stress_relief_decrements() {
        assert_eq!(update_stress(8, "I feel calmer now"), 7);
    }

    #[test]
    fn test_stress_struggle_increments() {
        // "still" and "racing" are both struggle cues; the category counts once.
        assert_eq!(update_stress(5, "my thoughts are still racing"), 6);
    }

    #[test]
    fn test_stress_acute_risk_jumps() {
        assert_eq!(update_stress(7, "I don't feel safe, I might hurt myself"), 9);
    }

    #[test]
    fn test_stress_clamped_at_ten() {
        assert_eq!(update_stress(10, "still shaking, want to disappear"), 10);
    }

    #[test]
    fn test_stress_clamped_at_one() {
        assert_eq!(update_stress(1, "so much calmer, relieved"), 1);
    }

    #[test]
    fn test_stress_neutral_text_carries_previous() {
        assert_eq!(update_stress(6, "we talked about my week"), 6);
    }
}
