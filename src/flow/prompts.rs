//! Question phrasing pools and phase-transition copy.
//!
//! Phrasing selection is random so the repeated stage prompts don't read
//! robotically. This is the only non-determinism in the engine — everything
//! upstream (extraction, classification, phase and stage decisions) is
//! fully deterministic.

use rand::seq::SliceRandom;

use crate::classifier::PersonaBucket;
use crate::onboarding::StageId;

/// Phrasing pool for a stage's question.
pub fn stage_questions(stage: StageId) -> &'static [&'static str] {
    match stage {
        StageId::Rapport => &[
            "Before we dive in — what should I call you?",
            "First things first, what's your name?",
            "I'd love to know who I'm talking to. What's your name?",
        ],
        StageId::LifeStage => &[
            "Where are you at right now — school, uni, working, or something else?",
            "What does life look like for you at the moment: studying, working, taking time out?",
            "Are you currently in education, in a job, or in between?",
        ],
        StageId::CareerDirection => &[
            "Do you have any careers in mind, or is it all pretty open right now?",
            "When you think about careers, is there anything that keeps coming up?",
            "Have you got a direction in mind, a shortlist, or nothing yet? All fine.",
        ],
        StageId::ConfidenceAssessment => &[
            "How sure do you feel about that direction, honestly?",
            "On a gut level, how certain are you it's the right path?",
            "If you had to commit today, how confident would you feel?",
        ],
        StageId::Motivation => &[
            "What draws you to it — the work itself, or what it gets you?",
            "What matters more to you in a career: loving the day-to-day, or things like pay and security?",
            "When you picture a good working life, what's driving that picture?",
        ],
        StageId::GoalClarification => &[
            "What would you like to have figured out by the end of these chats?",
            "If this conversation goes really well, what will you walk away with?",
            "What's the main thing you're hoping to get clearer on?",
        ],
        StageId::ExplorationHistory => &[
            "Have you tried anything yet — work experience, volunteering, shadowing someone?",
            "What have you already dipped a toe into, if anything?",
            "Any jobs, placements, or projects so far that shaped how you think about work?",
        ],
    }
}

/// Phrasing pool for the open career conversation after onboarding.
pub fn open_questions() -> &'static [&'static str] {
    &[
        "What would be most useful to dig into next?",
        "Want to look closer at one of the directions we've talked about?",
        "Is there a question about working life you've been sitting on?",
        "Shall we compare a couple of options side by side?",
    ]
}

/// Pick one phrasing at random.
pub fn pick(pool: &'static [&'static str]) -> &'static str {
    pool.choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("What would you like to talk about?")
}

/// Phase-transition message tailored to the persona bucket.
pub fn transition_message(bucket: PersonaBucket, name: Option<&str>) -> String {
    let greeting = match name {
        Some(n) => format!("Thanks {n} — "),
        None => "Thanks — ".to_string(),
    };
    let body = match bucket {
        PersonaBucket::Uncertain => {
            "I've got a good picture now. Not knowing where you're headed yet is completely \
             normal, and it's exactly what this is for. From here we can explore gently, \
             one small step at a time."
        }
        PersonaBucket::Exploring => {
            "I've got a good picture now. You've got some genuinely interesting options on \
             the table, so from here we can start comparing them properly and see which \
             ones hold up."
        }
        PersonaBucket::Decided => {
            "I've got a good picture now. You already have real direction, so from here we \
             can pressure-test the plan and work out the concrete next moves."
        }
    };
    format!("{greeting}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_stage_has_a_non_empty_pool() {
        for stage in StageId::ALL {
            assert!(!stage_questions(stage).is_empty(), "{stage} pool empty");
        }
        assert!(!open_questions().is_empty());
    }

    #[test]
    fn pick_returns_a_member_of_the_pool() {
        let pool = stage_questions(StageId::Rapport);
        for _ in 0..20 {
            assert!(pool.contains(&pick(pool)));
        }
    }

    #[test]
    fn transition_message_varies_by_bucket() {
        let uncertain = transition_message(PersonaBucket::Uncertain, None);
        let exploring = transition_message(PersonaBucket::Exploring, None);
        let decided = transition_message(PersonaBucket::Decided, None);
        assert_ne!(uncertain, exploring);
        assert_ne!(exploring, decided);
    }

    #[test]
    fn transition_message_uses_name_when_known() {
        let msg = transition_message(PersonaBucket::Decided, Some("Priya"));
        assert!(msg.starts_with("Thanks Priya"));
    }
}
