//! Structured response contract and fail-closed parsing.
//!
//! The generation service must return JSON conforming to
//! [`StructuredResponse`] or the call is treated as failed. Parsing is
//! fail-closed: anything that doesn't conform — missing fields, wrong enum
//! values, no JSON at all — is a schema violation, and the orchestrator
//! substitutes the fixed fallback response instead of showing the user
//! malformed output.

use serde::{Deserialize, Serialize};

use helen_engine::CrisisLevel;

/// The conversation states the agent can move between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationState {
    Listening,
    Supporting,
    Deescalating,
    RuptureRepair,
    MicroBreak,
    HumanHandoff,
}

/// One intervention offered to the user alongside the response text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedIntervention {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable duration, e.g. "2 minutes".
    pub duration: String,
    pub description: String,
}

/// The full per-turn response object. Wire form is camelCase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredResponse {
    pub response_text: String,
    pub detected_crisis_level: CrisisLevel,
    pub conversation_state_update: ConversationState,
    /// At most three; anything longer is a schema violation.
    pub suggested_interventions: Vec<SuggestedIntervention>,
    pub is_rupture_repair: bool,
    pub is_attention_accommodation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adhd_validation: Option<String>,
}

/// Shown when the generation collaborator fails. Never an error message —
/// the user is mid-crisis and gets a real sentence.
pub const FALLBACK_TEXT: &str = "I'm still here with you. I lost my train of \
thought for a second — can you tell me a bit more about what's going on \
right now?";

/// The fixed crisis-resource message for imminent-level classifications.
pub const CRISIS_HOTLINE_TEXT: &str = "I'm really concerned about your \
safety right now, and I want you to talk to someone who can help \
immediately. Please call or text 988 (Suicide & Crisis Lifeline) right now \
— they're available 24/7. If you can't call, text HOME to 741741 to reach \
the Crisis Text Line. You don't have to go through this alone, and you \
deserve support from a real person right now.";

impl StructuredResponse {
    /// The fixed fallback used when generation fails.
    pub fn fallback(crisis: CrisisLevel) -> Self {
        Self {
            response_text: FALLBACK_TEXT.to_string(),
            detected_crisis_level: crisis,
            conversation_state_update: ConversationState::Supporting,
            suggested_interventions: Vec::new(),
            is_rupture_repair: false,
            is_attention_accommodation: false,
            adhd_validation: None,
        }
    }

    /// The mandatory imminent-crisis response: hotline text, human handoff,
    /// zero interventions.
    pub fn crisis_override() -> Self {
        Self {
            response_text: CRISIS_HOTLINE_TEXT.to_string(),
            detected_crisis_level: CrisisLevel::Imminent,
            conversation_state_update: ConversationState::HumanHandoff,
            suggested_interventions: Vec::new(),
            is_rupture_repair: false,
            is_attention_accommodation: false,
            adhd_validation: None,
        }
    }
}

/// Parse raw model output into the contract. `None` means schema violation.
///
/// Models wrap JSON in prose or markdown fences; we extract the block first,
/// then require full schema conformance plus the 0–3 intervention bound.
pub fn parse_structured_response(raw: &str) -> Option<StructuredResponse> {
    let json_str = extract_json_block(raw)?;
    let response: StructuredResponse = serde_json::from_str(json_str).ok()?;
    if response.suggested_interventions.len() > 3 {
        return None;
    }
    if response.response_text.trim().is_empty() {
        return None;
    }
    Some(response)
}

/// Try to extract a JSON block from a response that may contain surrounding text.
fn extract_json_block(text: &str) -> Option<&str> {
    // Look for ```json ... ``` fenced blocks
    if let Some(start) = text.find("```json") {
        let json_start = start + 7;
        if let Some(end) = text[json_start..].find("```") {
            return Some(text[json_start..json_start + end].trim());
        }
    }

    // Look for first { to last }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end > start {
        Some(&text[start..=end])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_json() -> String {
        serde_json::json!({
            "responseText": "That sounds really heavy. I'm here.",
            "detectedCrisisLevel": "moderate",
            "conversationStateUpdate": "deescalating",
            "suggestedInterventions": [
                {
                    "name": "4-4-6 breathing",
                    "type": "breathing",
                    "duration": "2 minutes",
                    "description": "In for 4, hold 4, out for 6."
                }
            ],
            "isRuptureRepair": false,
            "isAttentionAccommodation": false,
            "adhdValidation": "ADHD brains feel everything at higher volume."
        })
        .to_string()
    }

    #[test]
    fn test_parse_bare_json() {
        let parsed = parse_structured_response(&valid_json()).unwrap();
        assert_eq!(parsed.detected_crisis_level, CrisisLevel::Moderate);
        assert_eq!(
            parsed.conversation_state_update,
            ConversationState::Deescalating
        );
        assert_eq!(parsed.suggested_interventions.len(), 1);
        assert_eq!(parsed.suggested_interventions[0].kind, "breathing");
    }

    #[test]
    fn test_parse_fenced_json_with_prose() {
        let raw = format!("Here is my response:\n```json\n{}\n```\nDone.", valid_json());
        assert!(parse_structured_response(&raw).is_some());
    }

    #[test]
    fn test_parse_rejects_missing_field() {
        let raw = r#"{"responseText": "hi", "detectedCrisisLevel": "mild"}"#;
        assert!(parse_structured_response(raw).is_none());
    }

    #[test]
    fn test_parse_rejects_unknown_enum_value() {
        let raw = valid_json().replace("moderate", "catastrophic");
        assert!(parse_structured_response(&raw).is_none());
    }

    #[test]
    fn test_parse_rejects_no_json() {
        assert!(parse_structured_response("I can't help with that.").is_none());
        assert!(parse_structured_response("").is_none());
    }

    #[test]
    fn test_parse_rejects_too_many_interventions() {
        let intervention = serde_json::json!({
            "name": "n", "type": "t", "duration": "d", "description": "x"
        });
        let raw = serde_json::json!({
            "responseText": "hi",
            "detectedCrisisLevel": "mild",
            "conversationStateUpdate": "supporting",
            "suggestedInterventions": [intervention.clone(), intervention.clone(),
                                       intervention.clone(), intervention],
            "isRuptureRepair": false,
            "isAttentionAccommodation": false
        })
        .to_string();
        assert!(parse_structured_response(&raw).is_none());
    }

    #[test]
    fn test_parse_rejects_empty_response_text() {
        let raw = valid_json().replace("That sounds really heavy. I'm here.", "  ");
        assert!(parse_structured_response(&raw).is_none());
    }

    #[test]
    fn test_adhd_validation_optional() {
        let raw = serde_json::json!({
            "responseText": "hi",
            "detectedCrisisLevel": "none",
            "conversationStateUpdate": "listening",
            "suggestedInterventions": [],
            "isRuptureRepair": false,
            "isAttentionAccommodation": false
        })
        .to_string();
        let parsed = parse_structured_response(&raw).unwrap();
        assert!(parsed.adhd_validation.is_none());
    }

    #[test]
    fn test_crisis_override_shape() {
        let response = StructuredResponse::crisis_override();
        assert!(response.response_text.contains("988"));
        assert_eq!(
            response.conversation_state_update,
            ConversationState::HumanHandoff
        );
        assert!(response.suggested_interventions.is_empty());
    }

    #[test]
    fn test_serialized_wire_form_is_camel_case() {
        let wire = serde_json::to_value(StructuredResponse::fallback(CrisisLevel::Mild)).unwrap();
        assert!(wire.get("responseText").is_some());
        assert!(wire.get("detectedCrisisLevel").is_some());
        assert!(wire.get("isRuptureRepair").is_some());
        // adhdValidation is None and skipped
        assert!(wire.get("adhdValidation").is_none());
    }
}
