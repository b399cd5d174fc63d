//! Session scoring: per-answer correctness, the running tally of one level attempt,
//! and the star-rating policy for every activity.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ActivityInstance, ActivityType, Answer, StarRating, Submission};
use crate::util::normalize_word;

/// How an activity converts performance into stars.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StarPolicy {
    /// Three stars at `three` correct answers or more, two at `two` or more.
    CorrectCount { three: u32, two: u32 },
    /// Three stars within `ideal + three_slack` moves, two within `ideal + two_slack`.
    Efficiency { three_slack: u32, two_slack: u32 },
    /// Finishing at all earns three stars.
    Completion,
}

impl ActivityType {
    pub fn star_policy(self) -> StarPolicy {
        match self {
            ActivityType::Arithmetic | ActivityType::WordUnscramble | ActivityType::PatternSequence => {
                StarPolicy::CorrectCount { three: 4, two: 3 }
            }
            ActivityType::ColorMatch => StarPolicy::CorrectCount { three: 7, two: 5 },
            ActivityType::CountLearn => StarPolicy::CorrectCount { three: 5, two: 3 },
            ActivityType::MemoryMatch => StarPolicy::Efficiency { three_slack: 2, two_slack: 4 },
            ActivityType::ShapeMatch => StarPolicy::Efficiency { three_slack: 0, two_slack: 2 },
            ActivityType::ArtRecreate => StarPolicy::Completion,
        }
    }
}

pub fn rate_correct(correct: u32, three: u32, two: u32) -> StarRating {
    if correct >= three {
        StarRating::Three
    } else if correct >= two {
        StarRating::Two
    } else {
        StarRating::One
    }
}

pub fn rate_efficiency(taken: u32, ideal: u32, three_slack: u32, two_slack: u32) -> StarRating {
    if taken <= ideal + three_slack {
        StarRating::Three
    } else if taken <= ideal + two_slack {
        StarRating::Two
    } else {
        StarRating::One
    }
}

/// Moves (memory) or attempts (shapes) spent finishing a board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Efficiency {
    pub taken: u32,
    pub ideal: u32,
}

/// Running tally of one level attempt.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub activity: ActivityType,
    /// Zero-based index of the question currently shown.
    pub question_index: u32,
    pub correct: u32,
    pub attempted: u32,
    pub total_questions: u32,
    /// Set when a board activity is completed.
    #[serde(default)]
    pub efficiency: Option<Efficiency>,
}

impl SessionState {
    pub fn new(activity: ActivityType) -> Self {
        Self {
            activity,
            question_index: 0,
            correct: 0,
            attempted: 0,
            total_questions: activity.question_count(),
            efficiency: None,
        }
    }

    /// True once every question has been answered (or the board completed).
    pub fn is_finished(&self) -> bool {
        self.attempted >= self.total_questions
    }

    /// Record completion of a board activity.
    pub fn record_board(&self, efficiency: Efficiency) -> SessionState {
        let mut next = self.clone();
        next.efficiency = Some(efficiency);
        next.attempted = next.total_questions;
        next.correct = next.total_questions;
        next
    }
}

/// Result of scoring one submitted answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResponseOutcome {
    pub is_correct: bool,
    pub state: SessionState,
}

/// Compare a submission with the canonical answer of `instance`.
/// Unparseable or mismatched input is simply incorrect.
pub fn is_correct(submission: &Submission, instance: &ActivityInstance) -> bool {
    match (&instance.answer, submission) {
        (Answer::Number(expected), Submission::Text(text)) => {
            text.trim().parse::<i64>().map(|n| n == *expected).unwrap_or(false)
        }
        (Answer::Number(expected), Submission::Number(n)) => n == expected,
        (Answer::Choice(expected), Submission::Number(n)) => n.to_string() == *expected,
        (Answer::Word(expected), Submission::Text(text)) => normalize_word(text) == normalize_word(expected),
        (Answer::Choice(expected), Submission::Text(text)) => text == expected,
        (Answer::Grid(expected), Submission::Grid(grid)) => grid == expected,
        _ => false,
    }
}

/// Score one response and produce the next session state.
///
/// Art only advances on a matching canvas: the picture counts as done once,
/// and a wrong canvas leaves the board open.
pub fn record_response(state: &SessionState, submission: &Submission, instance: &ActivityInstance) -> ResponseOutcome {
    let correct = is_correct(submission, instance);
    let mut next = state.clone();
    let advances = correct || instance.activity.star_policy() != StarPolicy::Completion;
    if advances && !next.is_finished() {
        next.attempted += 1;
        if correct {
            next.correct += 1;
        }
        if !next.is_finished() {
            next.question_index += 1;
        }
    }
    debug!(target: "activity", activity = ?instance.activity, id = %instance.id, correct, attempted = next.attempted, total = next.total_questions, "Recorded response");
    ResponseOutcome { is_correct: correct, state: next }
}

/// Convert a finished session into stars.
pub fn finalize(state: &SessionState) -> StarRating {
    debug_assert!(state.is_finished(), "finalize called on an unfinished session");
    match state.activity.star_policy() {
        StarPolicy::CorrectCount { three, two } => rate_correct(state.correct, three, two),
        StarPolicy::Efficiency { three_slack, two_slack } => match state.efficiency {
            Some(e) => rate_efficiency(e.taken, e.ideal, three_slack, two_slack),
            // finished without a board result: lowest rating
            None => StarRating::One,
        },
        StarPolicy::Completion => StarRating::Three,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;

    fn finish_with(activity: ActivityType, correct: u32) -> StarRating {
        let mut state = SessionState::new(activity);
        state.attempted = state.total_questions;
        state.correct = correct;
        finalize(&state)
    }

    #[test]
    fn test_arithmetic_thresholds() {
        assert_eq!(finish_with(ActivityType::Arithmetic, 5), StarRating::Three);
        assert_eq!(finish_with(ActivityType::Arithmetic, 4), StarRating::Three);
        assert_eq!(finish_with(ActivityType::Arithmetic, 3), StarRating::Two);
        assert_eq!(finish_with(ActivityType::Arithmetic, 2), StarRating::One);
        assert_eq!(finish_with(ActivityType::Arithmetic, 0), StarRating::One);
    }

    #[test]
    fn test_color_and_count_thresholds() {
        assert_eq!(finish_with(ActivityType::ColorMatch, 7), StarRating::Three);
        assert_eq!(finish_with(ActivityType::ColorMatch, 6), StarRating::Two);
        assert_eq!(finish_with(ActivityType::ColorMatch, 5), StarRating::Two);
        assert_eq!(finish_with(ActivityType::ColorMatch, 4), StarRating::One);
        assert_eq!(finish_with(ActivityType::CountLearn, 5), StarRating::Three);
        assert_eq!(finish_with(ActivityType::CountLearn, 3), StarRating::Two);
    }

    #[test]
    fn test_board_without_efficiency_gets_one_star() {
        for activity in [ActivityType::MemoryMatch, ActivityType::ShapeMatch] {
            let mut state = SessionState::new(activity);
            state.attempted = state.total_questions;
            assert_eq!(state.efficiency, None);
            assert_eq!(finalize(&state), StarRating::One);
        }
    }

    #[test]
    fn test_numeric_submissions() {
        let gen = Generator::default();
        let inst = gen.generate_seeded(ActivityType::Arithmetic, 1, Some(4));
        let Answer::Number(n) = inst.answer else { panic!() };
        assert!(is_correct(&Submission::Number(n), &inst));
        assert!(!is_correct(&Submission::Number(n + 1), &inst));
        assert!(!is_correct(&Submission::Other(serde_json::json!(true)), &inst));
        assert!(!is_correct(&Submission::Other(serde_json::json!(12.5)), &inst));

        let state = SessionState::new(ActivityType::Arithmetic);
        let out = record_response(&state, &Submission::Other(serde_json::json!({"x": 1})), &inst);
        assert!(!out.is_correct);
        assert_eq!(out.state.attempted, 1);

        let word = gen.generate_seeded(ActivityType::WordUnscramble, 1, Some(4));
        assert!(!is_correct(&Submission::Number(7), &word));
    }

    #[test]
    fn test_memory_six_pairs_seven_moves() {
        let state = SessionState::new(ActivityType::MemoryMatch).record_board(Efficiency { taken: 7, ideal: 6 });
        assert_eq!(finalize(&state), StarRating::Three);
        let state = SessionState::new(ActivityType::MemoryMatch).record_board(Efficiency { taken: 10, ideal: 6 });
        assert_eq!(finalize(&state), StarRating::Two);
        let state = SessionState::new(ActivityType::MemoryMatch).record_board(Efficiency { taken: 11, ideal: 6 });
        assert_eq!(finalize(&state), StarRating::One);
    }

    #[test]
    fn test_shape_thresholds() {
        assert_eq!(rate_efficiency(4, 4, 0, 2), StarRating::Three);
        assert_eq!(rate_efficiency(6, 4, 0, 2), StarRating::Two);
        assert_eq!(rate_efficiency(7, 4, 0, 2), StarRating::One);
    }

    #[test]
    fn test_record_arithmetic_session() {
        let gen = Generator::default();
        let mut state = SessionState::new(ActivityType::Arithmetic);
        for seed in 0..5 {
            let inst = gen.generate_seeded(ActivityType::Arithmetic, 1, Some(seed));
            let answer = if seed < 4 { inst.expected_text() } else { "banana".into() };
            let out = record_response(&state, &Submission::Text(answer), &inst);
            assert_eq!(out.is_correct, seed < 4);
            state = out.state;
        }
        assert!(state.is_finished());
        assert_eq!(state.correct, 4);
        assert_eq!(state.attempted, 5);
        assert_eq!(state.question_index, 4);
        assert_eq!(finalize(&state), StarRating::Three);
    }

    #[test]
    fn test_numeric_answer_trimmed() {
        let inst = Generator::default().generate_seeded(ActivityType::Arithmetic, 2, Some(7));
        let padded = format!("  {} ", inst.expected_text());
        assert!(is_correct(&Submission::Text(padded), &inst));
        assert!(!is_correct(&Submission::Text(String::new()), &inst));
    }

    #[test]
    fn test_word_answer_case_insensitive() {
        let inst = Generator::default().generate_seeded(ActivityType::WordUnscramble, 1, Some(2));
        let shouted = format!(" {}\n", inst.expected_text().to_uppercase());
        assert!(is_correct(&Submission::Text(shouted), &inst));
    }

    #[test]
    fn test_choice_exact() {
        let inst = Generator::default().generate_seeded(ActivityType::ColorMatch, 1, Some(2));
        let expected = inst.expected_text();
        assert!(is_correct(&Submission::Text(expected.clone()), &inst));
        assert!(!is_correct(&Submission::Text(expected.to_lowercase() + "x"), &inst));
    }

    #[test]
    fn test_art_wrong_canvas_does_not_advance() {
        let inst = Generator::default().generate_seeded(ActivityType::ArtRecreate, 1, None);
        let state = SessionState::new(ActivityType::ArtRecreate);
        let blank = Submission::Grid(crate::domain::blank_grid(4));
        let out = record_response(&state, &blank, &inst);
        assert!(!out.is_correct);
        assert!(!out.state.is_finished());

        let Answer::Grid(target) = inst.answer.clone() else { panic!() };
        let out = record_response(&state, &Submission::Grid(target), &inst);
        assert!(out.is_correct);
        assert!(out.state.is_finished());
        assert_eq!(finalize(&out.state), StarRating::Three);
    }

    #[test]
    fn test_extra_responses_ignored_after_finish() {
        let inst = Generator::default().generate_seeded(ActivityType::Arithmetic, 1, Some(1));
        let mut state = SessionState::new(ActivityType::Arithmetic);
        for _ in 0..7 {
            state = record_response(&state, &Submission::Text(inst.expected_text()), &inst).state;
        }
        assert_eq!(state.attempted, 5);
        assert_eq!(state.correct, 5);
    }
}
