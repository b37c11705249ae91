//! Test attempt sessions.
//!
//! A [`TestSession`] is a value: every operation takes the session and returns
//! the next one. A manual submit and a timer expiry are the same event; the
//! first one scores the sheet and every later submit is a no-op.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AnswerKey, AnswerSheet, Response};
use crate::results::{QuestionOutcome, ScoreResult};
use crate::scorer::Scorer;

/// What caused a submission. Recorded for history, never used for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitTrigger {
    Manual,
    TimeExpired,
}

/// A scored submission.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Submission {
    pub result: ScoreResult,
    pub trigger: SubmitTrigger,
    pub submitted_at: DateTime<Utc>,
}

/// One learner's attempt at one test.
#[derive(Debug, Clone)]
pub struct TestSession {
    test_id: String,
    answers: AnswerSheet,
    started_at: DateTime<Utc>,
    time_limit: Option<Duration>,
    submission: Option<Submission>,
}

impl TestSession {
    /// Start an attempt with an empty answer sheet.
    pub fn start(
        test_id: impl Into<String>,
        time_limit: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            answers: AnswerSheet::new(),
            started_at: now,
            time_limit,
            submission: None,
        }
    }

    /// Record (or overwrite) the answer to one question.
    ///
    /// Answers arriving after submission are dropped.
    pub fn record_answer(
        mut self,
        question_id: impl Into<String>,
        response: impl Into<Response>,
    ) -> Self {
        let question_id = question_id.into();
        if self.is_submitted() {
            tracing::warn!("ignoring answer to {question_id}: session already submitted");
            return self;
        }
        self.answers.insert(question_id, response);
        self
    }

    /// Clear the answer to one question.
    pub fn clear_answer(mut self, question_id: &str) -> Self {
        if !self.is_submitted() {
            self.answers.remove(question_id);
        }
        self
    }

    /// Score the sheet. Only the first submission counts.
    pub fn submit(
        mut self,
        key: &AnswerKey,
        scorer: &Scorer,
        trigger: SubmitTrigger,
        now: DateTime<Utc>,
    ) -> Self {
        if let Some(existing) = &self.submission {
            tracing::debug!(
                "{:?} submit ignored for {}: already submitted ({:?})",
                trigger,
                self.test_id,
                existing.trigger
            );
            return self;
        }

        let result = scorer.score(&self.answers, key);
        tracing::info!(
            "submitted {} ({:?}): {}/{} ({}%), band {:.1}",
            self.test_id,
            trigger,
            result.correct_count,
            result.total_questions,
            result.percentage,
            result.band_score
        );
        self.submission = Some(Submission {
            result,
            trigger,
            submitted_at: now,
        });
        self
    }

    /// "Try again": same test and time limit, empty sheet, clock restarted.
    pub fn reset(self, now: DateTime<Utc>) -> Self {
        Self::start(self.test_id, self.time_limit, now)
    }

    /// Per-question review of the current answers.
    pub fn review(&self, key: &AnswerKey, scorer: &Scorer) -> Vec<QuestionOutcome> {
        scorer.evaluate(&self.answers, key)
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    pub fn submission(&self) -> Option<&Submission> {
        self.submission.as_ref()
    }

    pub fn result(&self) -> Option<&ScoreResult> {
        self.submission.as_ref().map(|s| &s.result)
    }

    pub fn is_submitted(&self) -> bool {
        self.submission.is_some()
    }

    /// When the time limit runs out, if there is one.
    ///
    /// A limit that reaches past the last representable instant has no
    /// deadline and never expires.
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.time_limit.and_then(|limit| self.started_at.checked_add_signed(limit))
    }

    /// Time left before the deadline, never negative.
    pub fn remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.deadline()
            .map(|deadline| (deadline - now).max(Duration::zero()))
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.deadline().is_some_and(|deadline| now >= deadline)
    }

    /// Time from start to submission, capped at the time limit.
    pub fn time_taken(&self) -> Option<Duration> {
        let submitted_at = self.submission.as_ref()?.submitted_at;
        let taken = (submitted_at - self.started_at).max(Duration::zero());
        Some(match self.time_limit {
            Some(limit) => taken.min(limit),
            None => taken,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerKeyEntry, AnswerKind};

    fn key() -> AnswerKey {
        AnswerKey::new(vec![
            AnswerKeyEntry::new("1", AnswerKind::from_text("FALSE")),
            AnswerKeyEntry::new("2", AnswerKind::from_text("TRUE")),
        ])
        .unwrap()
    }

    fn t0() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn record_and_submit() {
        let session = TestSession::start("t1", Some(Duration::minutes(60)), t0())
            .record_answer("1", "false")
            .record_answer("2", "wrong")
            .record_answer("2", "true");
        assert_eq!(session.answers().len(), 2);

        let session = session.submit(
            &key(),
            &Scorer::default(),
            SubmitTrigger::Manual,
            t0() + Duration::minutes(20),
        );
        let result = session.result().unwrap();
        assert_eq!(result.correct_count, 2);
        assert_eq!(session.time_taken(), Some(Duration::minutes(20)));
    }

    #[test]
    fn second_submit_is_a_no_op() {
        let scorer = Scorer::default();
        let session = TestSession::start("t1", Some(Duration::minutes(60)), t0())
            .record_answer("1", "false")
            .submit(&key(), &scorer, SubmitTrigger::Manual, t0() + Duration::minutes(59))
            .record_answer("2", "true")
            .submit(&key(), &scorer, SubmitTrigger::TimeExpired, t0() + Duration::minutes(60));

        let submission = session.submission().unwrap();
        assert_eq!(submission.trigger, SubmitTrigger::Manual);
        assert_eq!(submission.result.correct_count, 1);
        assert!(session.answers().get("2").is_none());
    }

    #[test]
    fn timeout_scores_like_manual_submit() {
        let scorer = Scorer::default();
        let at = t0() + Duration::minutes(60);
        let start =
            TestSession::start("t1", Some(Duration::minutes(60)), t0()).record_answer("1", "FALSE");
        let manual = start.clone().submit(&key(), &scorer, SubmitTrigger::Manual, at);
        let expired = start.submit(&key(), &scorer, SubmitTrigger::TimeExpired, at);
        assert_eq!(manual.result(), expired.result());
    }

    #[test]
    fn timer_queries() {
        let session = TestSession::start("t1", Some(Duration::minutes(60)), t0());
        assert_eq!(session.deadline(), Some(t0() + Duration::minutes(60)));
        assert_eq!(
            session.remaining(t0() + Duration::minutes(45)),
            Some(Duration::minutes(15))
        );
        assert_eq!(session.remaining(t0() + Duration::minutes(90)), Some(Duration::zero()));
        assert!(!session.is_expired(t0() + Duration::minutes(59)));
        assert!(session.is_expired(t0() + Duration::minutes(60)));

        let untimed = TestSession::start("t1", None, t0());
        assert!(untimed.remaining(t0()).is_none());
        assert!(!untimed.is_expired(t0() + Duration::days(1)));
    }

    #[test]
    fn limit_past_the_end_of_time_has_no_deadline() {
        let session = TestSession::start("t1", Some(Duration::MAX), t0());
        assert!(session.deadline().is_none());
        assert!(session.remaining(t0()).is_none());
        assert!(!session.is_expired(t0() + Duration::days(365)));

        let session = session.submit(
            &key(),
            &Scorer::default(),
            SubmitTrigger::Manual,
            t0() + Duration::minutes(5),
        );
        assert_eq!(session.time_taken(), Some(Duration::minutes(5)));
    }

    #[test]
    fn time_taken_is_capped() {
        let session = TestSession::start("t1", Some(Duration::minutes(60)), t0()).submit(
            &key(),
            &Scorer::default(),
            SubmitTrigger::TimeExpired,
            t0() + Duration::minutes(61),
        );
        assert_eq!(session.time_taken(), Some(Duration::minutes(60)));
    }

    #[test]
    fn reset_starts_over() {
        let scorer = Scorer::default();
        let later = t0() + Duration::minutes(70);
        let session = TestSession::start("t1", Some(Duration::minutes(60)), t0())
            .record_answer("1", "false")
            .submit(&key(), &scorer, SubmitTrigger::Manual, t0() + Duration::minutes(5))
            .reset(later);
        assert!(!session.is_submitted());
        assert!(session.answers().is_empty());
        assert_eq!(session.started_at(), later);
        assert_eq!(session.time_limit(), Some(Duration::minutes(60)));
        assert!(session.time_taken().is_none());
    }

    #[test]
    fn clear_answer_before_submit() {
        let session = TestSession::start("t1", None, t0())
            .record_answer("1", "false")
            .clear_answer("1");
        assert!(session.answers().is_empty());
        let review = session.review(&key(), &Scorer::default());
        assert!(review.iter().all(|o| o.is_unanswered()));
    }
}
