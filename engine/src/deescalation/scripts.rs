//! Scripted steps for each de-escalation phase.
//!
//! Success criteria and escalation triggers are documentation for reviewers
//! and prompt composition — the machine itself uses the engagement/stress
//! heuristic in `super::DeescalationState::observe`.

use super::Phase;

/// One scripted step within a phase.
#[derive(Debug, Clone, Copy)]
pub struct PhaseStep {
    pub id: &'static str,
    /// What the agent leads with on this step.
    pub prompt: &'static str,
    /// Gentle follow-ups if the user stalls.
    pub follow_ups: &'static [&'static str],
    /// Validation lines to weave in.
    pub validation: &'static [&'static str],
    /// ADHD-specific adaptations for delivering this step.
    pub adhd_adaptations: &'static [&'static str],
    /// Safety check to run alongside the step, if any.
    pub safety_check: Option<&'static str>,
}

/// A phase's full script.
#[derive(Debug, Clone, Copy)]
pub struct PhaseScript {
    pub phase: Phase,
    pub steps: &'static [PhaseStep],
    /// Documented success criteria (not machine-checked directly).
    pub success_criteria: &'static [&'static str],
    /// Documented triggers that should push the conversation back to safety.
    pub escalation_triggers: &'static [&'static str],
}

static SAFETY_STEPS: &[PhaseStep] = &[
    PhaseStep {
        id: "safety-1",
        prompt: "I'm here with you. Before anything else — are you somewhere \
                 safe right now?",
        follow_ups: &["You don't have to explain anything yet, just yes or no."],
        validation: &["Reaching out while feeling like this takes real strength."],
        adhd_adaptations: &["One question at a time", "No multi-part instructions"],
        safety_check: Some("Confirm physical safety before proceeding"),
    },
    PhaseStep {
        id: "safety-2",
        prompt: "Let's take one slow breath together. In for 4, hold for 4, \
                 out for 6. Just the one.",
        follow_ups: &["If counting is too much, just breathe out longer than you breathe in."],
        validation: &["Your body is working hard right now; this helps it settle."],
        adhd_adaptations: &["Single micro-action", "Counts given explicitly"],
        safety_check: None,
    },
    PhaseStep {
        id: "safety-3",
        prompt: "Press your feet into the floor and feel the chair holding \
                 your weight. You're here, and this moment is survivable.",
        follow_ups: &["Name one thing you can see around you."],
        validation: &["The intensity you feel is real — and it does pass."],
        adhd_adaptations: &["Concrete physical anchor, no abstraction"],
        safety_check: None,
    },
];

static VALIDATION_STEPS: &[PhaseStep] = &[
    PhaseStep {
        id: "validation-1",
        prompt: "What's hitting you the hardest right now? I'm listening.",
        follow_ups: &["There's no wrong answer — whatever comes up first."],
        validation: &[
            "ADHD brains feel everything at higher volume. What you're \
             experiencing is real and valid.",
        ],
        adhd_adaptations: &["Open question, zero structure demanded"],
        safety_check: None,
    },
    PhaseStep {
        id: "validation-2",
        prompt: "That makes sense given what you're carrying. It sounds \
                 genuinely heavy — not an overreaction.",
        follow_ups: &["Is there more underneath that?"],
        validation: &["You're not too sensitive. The feeling fits the load."],
        adhd_adaptations: &["Reflect in the user's own words", "Short sentences"],
        safety_check: None,
    },
];

static COGNITIVE_STEPS: &[PhaseStep] = &[
    PhaseStep {
        id: "cognitive-1",
        prompt: "Let's look at the thought itself for a second. What is your \
                 brain telling you about this?",
        follow_ups: &["Say it exactly the way it sounds in your head."],
        validation: &["Noticing the thought is the hard part, and you just did it."],
        adhd_adaptations: &["Externalize the thought before examining it"],
        safety_check: None,
    },
    PhaseStep {
        id: "cognitive-2",
        prompt: "Is that thought a fact, or is it the spiral talking? What \
                 would you tell a friend who said it?",
        follow_ups: &["One piece of evidence against it is enough to loosen it."],
        validation: &["Big feelings make thoughts feel like facts. They aren't."],
        adhd_adaptations: &["One reframe, not a worksheet"],
        safety_check: None,
    },
];

static SKILLS_STEPS: &[PhaseStep] = &[
    PhaseStep {
        id: "skills-1",
        prompt: "Want to try one small tool together? Two minutes, and I'll \
                 walk you through every part of it.",
        follow_ups: &["You can stop at any point — trying counts."],
        validation: &["Using a tool mid-storm is a skill in itself."],
        adhd_adaptations: &["Offer a choice of at most two techniques", "Time-box stated upfront"],
        safety_check: None,
    },
    PhaseStep {
        id: "skills-2",
        prompt: "How was that? Even a tiny shift counts — sharper, calmer, \
                 the same?",
        follow_ups: &["No shift is also information. We can try a different tool."],
        validation: &["You did the thing while feeling awful. That matters."],
        adhd_adaptations: &["Concrete scale, no open reflection required"],
        safety_check: None,
    },
];

static PLANNING_STEPS: &[PhaseStep] = &[
    PhaseStep {
        id: "planning-1",
        prompt: "What's one tiny thing from the next few hours that would \
                 make tonight a little easier?",
        follow_ups: &["Tiny means tiny — a glass of water counts."],
        validation: &["Planning while drained is hard; one step is plenty."],
        adhd_adaptations: &["Single next action, explicit time anchor"],
        safety_check: None,
    },
    PhaseStep {
        id: "planning-2",
        prompt: "If the wave comes back, what's your first move? Let's name \
                 it now so future-you doesn't have to decide.",
        follow_ups: &["We can make it the breath, the feet, or messaging here again."],
        validation: &["You got through today. That's evidence, not luck."],
        adhd_adaptations: &["Pre-decided if-then, externalized for working memory"],
        safety_check: Some("Confirm the user knows how to reach crisis resources"),
    },
];

/// Scripts for all five phases, in phase order.
pub static SCRIPTS: &[PhaseScript] = &[
    PhaseScript {
        phase: Phase::Safety,
        steps: SAFETY_STEPS,
        success_criteria: &[
            "User confirms physical safety",
            "Acute arousal visibly reduced (shorter gaps, steadier replies)",
        ],
        escalation_triggers: &["Any imminent-tier phrase", "User reports being unsafe"],
    },
    PhaseScript {
        phase: Phase::Validation,
        steps: VALIDATION_STEPS,
        success_criteria: &["User feels heard (affirms a reflection)"],
        escalation_triggers: &["Stress rises across two turns", "Severe-tier phrase"],
    },
    PhaseScript {
        phase: Phase::Cognitive,
        steps: COGNITIVE_STEPS,
        success_criteria: &["User restates the thought with any distance"],
        escalation_triggers: &["Rupture detected", "Severe-tier phrase"],
    },
    PhaseScript {
        phase: Phase::Skills,
        steps: SKILLS_STEPS,
        success_criteria: &["User attempts at least one technique"],
        escalation_triggers: &["Stress spikes during practice"],
    },
    PhaseScript {
        phase: Phase::Planning,
        steps: PLANNING_STEPS,
        success_criteria: &["One concrete next step named", "Re-contact path agreed"],
        escalation_triggers: &["Severe-tier phrase"],
    },
];

/// The script for a phase. Total over `Phase`, so no lookup can fail.
pub fn script_for(phase: Phase) -> &'static PhaseScript {
    &SCRIPTS[phase as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripts_cover_all_phases_in_order() {
        let phases: Vec<Phase> = SCRIPTS.iter().map(|s| s.phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Safety,
                Phase::Validation,
                Phase::Cognitive,
                Phase::Skills,
                Phase::Planning
            ]
        );
    }

    #[test]
    fn test_script_for_indexes_correctly() {
        for phase in Phase::ALL {
            assert_eq!(script_for(phase).phase, phase);
        }
    }

    #[test]
    fn test_step_ids_unique_across_phases() {
        let mut ids: Vec<&str> = SCRIPTS
            .iter()
            .flat_map(|s| s.steps.iter().map(|step| step.id))
            .collect();
        let before = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), before);
    }

    #[test]
    fn test_every_phase_has_steps_and_criteria() {
        for script in SCRIPTS {
            assert!(!script.steps.is_empty());
            assert!(!script.success_criteria.is_empty());
            assert!(!script.escalation_triggers.is_empty());
            for step in script.steps {
                assert!(!step.prompt.is_empty());
            }
        }
    }

    #[test]
    fn test_first_safety_step_checks_safety() {
        assert!(SAFETY_STEPS[0].safety_check.is_some());
    }
}
