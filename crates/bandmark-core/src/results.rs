//! Scoring result types.

use serde::{Deserialize, Serialize};

use crate::model::Response;

/// The outcome of scoring a full answer sheet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Points earned across the whole key.
    pub correct_count: u32,
    /// Points available across the whole key.
    pub total_questions: u32,
    /// `correct_count / total_questions` as a rounded percentage (0-100).
    pub percentage: u32,
    /// Band converted from `correct_count`.
    pub band_score: f64,
}

impl ScoreResult {
    /// Build a result, deriving the percentage.
    pub fn new(correct_count: u32, total_questions: u32, band_score: f64) -> Self {
        Self {
            correct_count,
            total_questions,
            percentage: percentage(correct_count, total_questions),
            band_score,
        }
    }
}

/// Rounded percentage; 0 when there is nothing to score.
pub fn percentage(correct: u32, total: u32) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct as f64 / total as f64 * 100.0).round() as u32
}

/// How one scoring unit fared. Backs the answer review and per-question
/// correctness badges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    /// Question id as it appears in the answer key.
    pub question_id: String,
    /// What the learner gave, if anything.
    pub response: Option<Response>,
    /// Display form of the canonical answer.
    pub expected: String,
    /// Points earned.
    pub points: u32,
    /// Points available.
    pub max_points: u32,
}

impl QuestionOutcome {
    /// Full credit for this unit.
    pub fn is_correct(&self) -> bool {
        self.max_points > 0 && self.points == self.max_points
    }

    /// Some, but not all, of the available credit.
    pub fn is_partial(&self) -> bool {
        self.points > 0 && self.points < self.max_points
    }

    /// Whether the learner left this unit blank.
    pub fn is_unanswered(&self) -> bool {
        match &self.response {
            None => true,
            Some(response) => response
                .selections()
                .iter()
                .all(|s| crate::normalize::is_blank(s)),
        }
    }
}
