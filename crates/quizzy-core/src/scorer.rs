//! Attempt scoring.
//!
//! Scoring is a pure function of the question set, the collected answers and
//! the options that were shown; calling it twice with the same inputs yields
//! the same outcome.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerResult, FeedbackEntry, QuestionSet, UserAnswer};
use crate::presenter::ShownOptions;

/// Collected answers, keyed by question index.
pub type Answers = BTreeMap<usize, String>;

/// Result of scoring one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOutcome {
    /// Number of questions answered correctly.
    pub score: usize,
    /// Number of questions in the set.
    pub total: usize,
    /// One entry per question, in set order.
    pub feedback: Vec<FeedbackEntry>,
    /// Wall-clock time from start to submit.
    pub duration: Duration,
}

impl QuizOutcome {
    /// Fraction of questions answered correctly, in `[0.0, 1.0]`.
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.score as f64 / self.total as f64
    }

    /// Number of questions flagged as unscorable.
    pub fn unscorable_count(&self) -> usize {
        self.feedback.iter().filter(|f| f.unscorable).count()
    }
}

/// Score every question of `questions`.
///
/// Unanswered questions are always incorrect. A question whose correct
/// answer is missing from the options actually shown (`shown`, or the
/// source options when nothing was cached for it) is unscorable: it is
/// logged, flagged in its feedback entry and counted as incorrect.
pub fn score_attempt(
    questions: &QuestionSet,
    answers: &Answers,
    shown: &ShownOptions,
    duration: Duration,
) -> QuizOutcome {
    let mut score = 0;
    let mut feedback = Vec::with_capacity(questions.len());

    for (index, question) in questions.iter().enumerate() {
        let user_answer = answers
            .get(&index)
            .map(|a| UserAnswer::Given(a.clone()))
            .unwrap_or(UserAnswer::Unanswered);

        let options = shown.get(&index).unwrap_or(&question.options);
        let scorable = options.iter().any(|o| *o == question.correct_answer);
        if !scorable {
            tracing::warn!(
                index,
                question = %question.text,
                correct_answer = %question.correct_answer,
                "unscorable question: correct answer not among shown options"
            );
        }

        let is_correct = scorable && user_answer.matches(&question.correct_answer);
        if is_correct {
            score += 1;
        }

        feedback.push(FeedbackEntry {
            question_text: question.text.clone(),
            user_answer,
            correct_answer: question.correct_answer.clone(),
            result: if is_correct {
                AnswerResult::Correct
            } else {
                AnswerResult::Incorrect
            },
            unscorable: !scorable,
        });
    }

    QuizOutcome {
        score,
        total: questions.len(),
        feedback,
        duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Question;

    fn arithmetic() -> QuestionSet {
        QuestionSet::new(
            "math",
            vec![Question::new("2+2?", ["3", "4", "5", "6"], "4")],
        )
        .unwrap()
    }

    fn answers(pairs: &[(usize, &str)]) -> Answers {
        pairs.iter().map(|(i, a)| (*i, a.to_string())).collect()
    }

    #[test]
    fn correct_answer_scores_one() {
        let outcome = score_attempt(
            &arithmetic(),
            &answers(&[(0, "4")]),
            &ShownOptions::new(),
            Duration::ZERO,
        );
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.total, 1);
        assert_eq!(outcome.feedback[0].result, AnswerResult::Correct);
    }

    #[test]
    fn unanswered_scores_zero() {
        let outcome = score_attempt(
            &arithmetic(),
            &Answers::new(),
            &ShownOptions::new(),
            Duration::ZERO,
        );
        assert_eq!(outcome.score, 0);
        assert_eq!(outcome.feedback[0].user_answer, UserAnswer::Unanswered);
        assert_eq!(outcome.feedback[0].result, AnswerResult::Incorrect);
        assert!(!outcome.feedback[0].unscorable);
    }

    #[test]
    fn wrong_answer_is_incorrect() {
        let outcome = score_attempt(
            &arithmetic(),
            &answers(&[(0, "5")]),
            &ShownOptions::new(),
            Duration::ZERO,
        );
        assert_eq!(outcome.score, 0);
        assert_eq!(
            outcome.feedback[0].user_answer,
            UserAnswer::Given("5".into())
        );
    }

    #[test]
    fn unscorable_question_is_flagged_and_incorrect() {
        let set = QuestionSet::new(
            "broken",
            vec![Question::new("2+2?", ["3", "5", "6", "7"], "4")],
        )
        .unwrap();
        // Even typing the ground truth verbatim cannot score.
        let outcome = score_attempt(
            &set,
            &answers(&[(0, "4")]),
            &ShownOptions::new(),
            Duration::ZERO,
        );
        assert_eq!(outcome.score, 0);
        assert!(outcome.feedback[0].unscorable);
        assert_eq!(outcome.feedback[0].result, AnswerResult::Incorrect);
        assert_eq!(outcome.unscorable_count(), 1);
    }

    #[test]
    fn shown_options_take_precedence_over_source() {
        let mut shown = ShownOptions::new();
        shown.insert(0, ["3", "5", "6", "7"].map(String::from));
        let outcome = score_attempt(
            &arithmetic(),
            &answers(&[(0, "4")]),
            &shown,
            Duration::ZERO,
        );
        assert_eq!(outcome.score, 0);
        assert!(outcome.feedback[0].unscorable);
    }

    #[test]
    fn scoring_is_idempotent_and_bounded() {
        let set = QuestionSet::new(
            "mixed",
            vec![
                Question::new("a?", ["1", "2", "3", "4"], "1"),
                Question::new("b?", ["1", "2", "3", "4"], "2"),
                Question::new("c?", ["1", "2", "3", "4"], "9"),
            ],
        )
        .unwrap();
        let given = answers(&[(0, "1"), (1, "3"), (2, "9")]);
        let first = score_attempt(&set, &given, &ShownOptions::new(), Duration::from_secs(5));
        let second = score_attempt(&set, &given, &ShownOptions::new(), Duration::from_secs(5));
        assert_eq!(first, second);
        assert_eq!(first.score, 1);
        assert!(first.score <= first.total);
        assert_eq!(first.feedback.len(), 3);
        assert!((first.ratio() - 1.0 / 3.0).abs() < 1e-9);
    }
}
