//! Answer sheet scoring.
//!
//! Walks an answer key in authoring order and applies each entry's
//! aggregation rule:
//!
//! - Singleton / alternatives questions: 1 point or nothing
//! - Unordered pairs: both boxes resolved together, once, for up to 2 points
//! - Multi-select groups: 1 point per correct selection, capped at the set size
//!
//! Scoring is pure: the same sheet and key always produce the same result, and
//! neither input is modified.

use std::collections::HashSet;

use crate::band::band_for;
use crate::matcher::{canonical_options, is_correct};
use crate::model::{AnswerKey, AnswerKeyEntry, AnswerKind, AnswerSheet, TestDefinition, TestModule};
use crate::normalize::normalize;
use crate::results::{QuestionOutcome, ScoreResult};

/// Scores answer sheets against answer keys for one test module.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    module: TestModule,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(TestModule::AcademicReading)
    }
}

impl Scorer {
    pub fn new(module: TestModule) -> Self {
        Self { module }
    }

    /// A scorer using the band table of the test's module.
    pub fn for_test(test: &TestDefinition) -> Self {
        Self::new(test.info.module)
    }

    pub fn module(&self) -> TestModule {
        self.module
    }

    /// Score a full answer sheet.
    pub fn score(&self, answers: &AnswerSheet, key: &AnswerKey) -> ScoreResult {
        self.summarize(&self.evaluate(answers, key))
    }

    /// Fold per-question outcomes into a [`ScoreResult`].
    pub fn summarize(&self, outcomes: &[QuestionOutcome]) -> ScoreResult {
        let correct: u32 = outcomes.iter().map(|o| o.points).sum();
        let total: u32 = outcomes.iter().map(|o| o.max_points).sum();
        ScoreResult::new(correct, total, band_for(self.module, correct))
    }

    /// Per-unit outcomes in key order.
    ///
    /// Answers for ids that are not in the key are ignored. A resolved pair
    /// yields one outcome per box, so every key entry appears exactly once.
    pub fn evaluate(&self, answers: &AnswerSheet, key: &AnswerKey) -> Vec<QuestionOutcome> {
        let mut resolved: HashSet<&str> = HashSet::new();
        let mut outcomes = Vec::with_capacity(key.len());

        for entry in key.entries() {
            if resolved.contains(entry.id.as_str()) {
                continue;
            }
            match &entry.kind {
                AnswerKind::Singleton { .. } | AnswerKind::Alternatives { .. } => {
                    outcomes.push(score_text(entry, answers));
                }
                AnswerKind::UnorderedPair { partner, .. } => {
                    match key.get(partner).filter(|p| partners_with(p, &entry.id)) {
                        Some(partner_entry) => {
                            resolved.insert(partner_entry.id.as_str());
                            outcomes.extend(score_pair(entry, partner_entry, answers));
                        }
                        None => {
                            tracing::debug!(
                                "pair {} has no reciprocal partner '{}', scoring alone",
                                entry.id,
                                partner
                            );
                            outcomes.push(score_text(entry, answers));
                        }
                    }
                }
                AnswerKind::MultiSelect { .. } => {
                    outcomes.push(score_selection(entry, answers));
                }
            }
        }

        for outcome in &outcomes {
            tracing::debug!(
                "question {}: {}/{}",
                outcome.question_id,
                outcome.points,
                outcome.max_points
            );
        }

        outcomes
    }

    /// Whether the question earned full credit. Unknown ids are never correct.
    pub fn is_correct(&self, answers: &AnswerSheet, key: &AnswerKey, question_id: &str) -> bool {
        self.evaluate(answers, key)
            .iter()
            .find(|o| o.question_id == question_id)
            .is_some_and(QuestionOutcome::is_correct)
    }
}

fn partners_with(entry: &AnswerKeyEntry, id: &str) -> bool {
    matches!(&entry.kind, AnswerKind::UnorderedPair { partner, .. } if partner == id)
}

fn outcome(
    entry: &AnswerKeyEntry,
    answers: &AnswerSheet,
    points: u32,
    max_points: u32,
) -> QuestionOutcome {
    QuestionOutcome {
        question_id: entry.id.clone(),
        response: answers.get(&entry.id).cloned(),
        expected: entry.kind.to_string(),
        points,
        max_points,
    }
}

/// One box, one point.
fn score_text(entry: &AnswerKeyEntry, answers: &AnswerSheet) -> QuestionOutcome {
    let correct = answers
        .get(&entry.id)
        .and_then(|r| r.as_text())
        .is_some_and(|text| is_correct(text, &entry.kind));
    outcome(entry, answers, u32::from(correct), 1)
}

/// Two boxes sharing one unordered set. A letter repeated in both boxes is
/// credited once, to the box that comes first in the key.
fn score_pair(
    first: &AnswerKeyEntry,
    second: &AnswerKeyEntry,
    answers: &AnswerSheet,
) -> [QuestionOutcome; 2] {
    let options = canonical_options(&first.kind);
    let normalized = |entry: &AnswerKeyEntry| {
        answers
            .get(&entry.id)
            .and_then(|r| r.as_text())
            .map(normalize)
            .filter(|a| !a.is_empty())
    };
    let a = normalized(first);
    let b = normalized(second);

    let first_hit = a.as_ref().is_some_and(|a| options.contains(a));
    let second_hit = b.as_ref().is_some_and(|b| options.contains(b)) && !(first_hit && a == b);

    [
        outcome(first, answers, u32::from(first_hit), 1),
        outcome(second, answers, u32::from(second_hit), 1),
    ]
}

/// One point per distinct correct selection, up to the number of distinct
/// letters in the key. Extra wrong selections cost nothing; missed letters
/// earn nothing.
fn score_selection(entry: &AnswerKeyEntry, answers: &AnswerSheet) -> QuestionOutcome {
    let max_points = canonical_options(&entry.kind).len() as u32;
    let mut seen: HashSet<String> = HashSet::new();
    let points = answers
        .get(&entry.id)
        .map(|r| {
            r.selections()
                .into_iter()
                .filter(|s| seen.insert(normalize(s)))
                .filter(|s| is_correct(s, &entry.kind))
                .count() as u32
        })
        .unwrap_or(0)
        .min(max_points);
    outcome(entry, answers, points, max_points)
}
