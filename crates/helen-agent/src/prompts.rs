//! Persona preamble and per-turn instruction composition.
//!
//! Prompt versioning: bump `PROMPT_VERSION` whenever preamble content
//! changes, so logs can tie a given response back to the prompt that
//! produced it.

use helen_engine::{
    catalog, AttentionFadeResult, CrisisLevel, Phase, PhaseStep, RuptureResult, SessionPlan,
    SessionTier,
};
use helen_engine::planner::{InterventionPlan, PlanItem};

/// Prompt version. Bump on any preamble content change.
pub const PROMPT_VERSION: &str = "1.2.0";

/// Helen's persona and the response contract she must honor.
pub const HELEN_PREAMBLE: &str = "\
You are Helen, a warm, steady emotional-support companion for adults with \
ADHD. You are not a therapist and never claim to be one; you are a \
knowledgeable friend who understands how ADHD brains experience emotion — \
rejection sensitivity, emotional flooding, executive shutdown, time \
blindness — and you never pathologize any of it.

## How you talk
- Short sentences. One idea, then a pause. Never a wall of text.
- Validate before you redirect. The feeling is real even when the thought isn't.
- One question at a time. One micro-action at a time.
- Never say \"calm down\", \"just breathe\", \"you're overreacting\", or \
\"have you tried making a list\".
- Never diagnose, never mention medication changes, never promise outcomes.

## Response format
Respond ONLY with a JSON object, no surrounding prose:

```json
{
  \"responseText\": \"what you say to the user\",
  \"detectedCrisisLevel\": \"none|mild|moderate|severe|imminent\",
  \"conversationStateUpdate\": \"listening|supporting|deescalating|rupture_repair|micro_break|human_handoff\",
  \"suggestedInterventions\": [
    {\"name\": \"...\", \"type\": \"breathing|grounding|cognitive|rsd\", \"duration\": \"2 minutes\", \"description\": \"...\"}
  ],
  \"isRuptureRepair\": false,
  \"isAttentionAccommodation\": false,
  \"adhdValidation\": \"optional validation line, omit if none fits\"
}
```

Suggest at most 3 interventions, usually 0 or 1. The current-turn briefing \
below tells you the detected crisis level, the de-escalation step you are \
on, and which interventions to draw from — follow it.
";

/// Everything the composer needs for the current-turn briefing.
pub struct TurnBriefing<'a> {
    pub crisis: CrisisLevel,
    pub phase: Phase,
    pub step: &'a PhaseStep,
    pub session: &'a SessionPlan,
    pub interventions: &'a InterventionPlan,
    pub fade: &'a AttentionFadeResult,
    pub rupture: Option<&'a RuptureResult>,
    /// RSD validation line to weave in, when one is warranted.
    pub validation: Option<&'a str>,
}

/// Build the full instruction string: persona preamble plus the
/// contextual-awareness block for this turn.
pub fn compose_turn_instructions(briefing: &TurnBriefing) -> String {
    let mut prompt = String::from(HELEN_PREAMBLE);

    prompt.push_str("\n# Current turn\n\n");
    prompt.push_str(&format!(
        "**Crisis level:** {} | **Phase:** {} | **Step:** {}\n\n",
        briefing.crisis, briefing.phase, briefing.step.id
    ));
    prompt.push_str(&format!("**Step guidance:** {}\n", briefing.step.prompt));
    if !briefing.step.adhd_adaptations.is_empty() {
        prompt.push_str(&format!(
            "**ADHD adaptations:** {}\n",
            briefing.step.adhd_adaptations.join("; ")
        ));
    }
    if let Some(check) = briefing.step.safety_check {
        prompt.push_str(&format!("**Safety check:** {check}\n"));
    }

    prompt.push_str(&format!(
        "\n**Session length:** aim for a {} exchange",
        match briefing.session.tier {
            SessionTier::Micro => "very short (2-3 minute)",
            SessionTier::Short => "short (~10 minute)",
            SessionTier::Standard => "normal",
        }
    ));
    if briefing.session.break_scheduled {
        prompt.push_str("; offer a brief break soon");
    }
    prompt.push_str(".\n");

    let names: Vec<&str> = briefing
        .interventions
        .sequence
        .iter()
        .filter_map(|item| match item {
            PlanItem::Technique(id) => catalog::by_id(id).map(|t| t.info().name),
            _ => None,
        })
        .collect();
    if names.is_empty() {
        prompt.push_str("**Interventions:** none this turn — just listen.\n");
    } else {
        prompt.push_str(&format!(
            "**Interventions to draw from (in order):** {}\n",
            names.join(", ")
        ));
    }

    if briefing.fade.fading {
        prompt.push_str(
            "**Attention accommodation:** the user's attention is fading. \
             Keep your reply to 1-2 short sentences, drop anything optional, \
             and set isAttentionAccommodation to true.\n",
        );
    }

    if let Some(rupture) = briefing.rupture {
        if let Some(repair) = &rupture.repair {
            prompt.push_str(&format!(
                "**Rupture repair:** the user is frustrated with this \
                 conversation itself ({:?} severity). Lead with: \"{}\" \
                 Offer the choices verbatim, set isRuptureRepair to true, \
                 and do not push any technique this turn.\n",
                rupture.severity, repair.message
            ));
        }
    }

    if let Some(line) = briefing.validation {
        prompt.push_str(&format!(
            "**Validation to weave in (adhdValidation field):** {line}\n"
        ));
    }

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use helen_engine::deescalation::script_for;
    use helen_engine::planner::{self, SequencingInputs};

    fn briefing_parts(
        crisis: CrisisLevel,
    ) -> (SessionPlan, InterventionPlan, AttentionFadeResult) {
        let session = planner::plan_session(crisis, &[]);
        let plan = planner::sequence_interventions(&SequencingInputs {
            crisis,
            previous_activity: None,
            recent_user_texts: &[],
            attention_fading: false,
            low_energy: false,
            rsd_stage: None,
        });
        let fade = helen_engine::classifiers::attention::detect(&[], &Default::default());
        (session, plan, fade)
    }

    #[test]
    fn test_composed_prompt_contains_persona_and_step() {
        let (session, plan, fade) = briefing_parts(CrisisLevel::Moderate);
        let script = script_for(Phase::Safety);
        let prompt = compose_turn_instructions(&TurnBriefing {
            crisis: CrisisLevel::Moderate,
            phase: Phase::Safety,
            step: &script.steps[0],
            session: &session,
            interventions: &plan,
            fade: &fade,
            rupture: None,
            validation: None,
        });
        assert!(prompt.contains("You are Helen"));
        assert!(prompt.contains("safety-1"));
        assert!(prompt.contains("responseText"));
    }

    #[test]
    fn test_fade_directive_included_when_fading() {
        let (session, plan, mut fade) = briefing_parts(CrisisLevel::Mild);
        fade.fading = true;
        let script = script_for(Phase::Validation);
        let prompt = compose_turn_instructions(&TurnBriefing {
            crisis: CrisisLevel::Mild,
            phase: Phase::Validation,
            step: &script.steps[0],
            session: &session,
            interventions: &plan,
            fade: &fade,
            rupture: None,
            validation: None,
        });
        assert!(prompt.contains("Attention accommodation"));
    }

    #[test]
    fn test_intervention_names_resolved_from_catalog() {
        let (session, plan, fade) = briefing_parts(CrisisLevel::Severe);
        let script = script_for(Phase::Safety);
        let prompt = compose_turn_instructions(&TurnBriefing {
            crisis: CrisisLevel::Severe,
            phase: Phase::Safety,
            step: &script.steps[0],
            session: &session,
            interventions: &plan,
            fade: &fade,
            rupture: None,
            validation: None,
        });
        // Severe base sequence leads with safety planning.
        assert!(prompt.contains("Interventions to draw from"));
    }
}
