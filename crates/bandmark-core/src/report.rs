//! Score reports with JSON persistence and attempt comparison.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{TestInfo, TestModule};
use crate::results::{QuestionOutcome, ScoreResult};
use crate::session::SubmitTrigger;

/// A scored attempt with its full answer review.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    /// Summary of the test.
    pub test: TestSummary,
    /// Aggregate score.
    pub result: ScoreResult,
    /// Per-question outcomes in key order.
    pub outcomes: Vec<QuestionOutcome>,
    /// Seconds from start to submission, for timed attempts.
    #[serde(default)]
    pub time_taken_secs: Option<u64>,
    /// What caused the submission, for timed attempts.
    #[serde(default)]
    pub trigger: Option<SubmitTrigger>,
}

/// Summary of a test (without its answer key).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSummary {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub book: String,
    pub module: TestModule,
    #[serde(default)]
    pub test_number: Option<u32>,
}

impl From<&TestInfo> for TestSummary {
    fn from(info: &TestInfo) -> Self {
        Self {
            id: info.id.clone(),
            title: info.title.clone(),
            book: info.book.clone(),
            module: info.module,
            test_number: info.test_number,
        }
    }
}

impl ScoreReport {
    pub fn new(info: &TestInfo, result: ScoreResult, outcomes: Vec<QuestionOutcome>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            test: TestSummary::from(info),
            result,
            outcomes,
            time_taken_secs: None,
            trigger: None,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: ScoreReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Render the answer review as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", self.test.title));
        md.push_str(&format!(
            "**Score:** {}/{} ({}%) | **Band:** {:.1}\n\n",
            self.result.correct_count,
            self.result.total_questions,
            self.result.percentage,
            self.result.band_score
        ));

        md.push_str("| Question | Your answer | Correct answer | Points |\n");
        md.push_str("|----------|-------------|----------------|--------|\n");
        for o in &self.outcomes {
            let answer = match &o.response {
                Some(r) if !o.is_unanswered() => r.to_string(),
                _ => "(No answer)".to_string(),
            };
            md.push_str(&format!(
                "| {} | {} | {} | {}/{} |\n",
                o.question_id, answer, o.expected, o.points, o.max_points
            ));
        }

        md
    }

    /// Compare this attempt against an earlier one, question by question.
    pub fn compare(&self, baseline: &ScoreReport) -> AttemptComparison {
        let points = |report: &ScoreReport| -> HashMap<String, (u32, u32)> {
            report
                .outcomes
                .iter()
                .map(|o| (o.question_id.clone(), (o.points, o.max_points)))
                .collect()
        };

        let baseline_points = points(baseline);
        let current_points = points(self);

        let mut fixed = Vec::new();
        let mut broken = Vec::new();
        let mut unchanged = 0usize;
        let mut new_questions = 0usize;

        for outcome in &self.outcomes {
            let id = &outcome.question_id;
            match baseline_points.get(id) {
                Some(&(before, max_points)) => {
                    let change = QuestionChange {
                        question_id: id.clone(),
                        baseline_points: before,
                        current_points: outcome.points,
                        max_points: max_points.max(outcome.max_points),
                    };
                    if outcome.points > before {
                        fixed.push(change);
                    } else if outcome.points < before {
                        broken.push(change);
                    } else {
                        unchanged += 1;
                    }
                }
                None => new_questions += 1,
            }
        }

        let removed_questions = baseline_points
            .keys()
            .filter(|k| !current_points.contains_key(*k))
            .count();

        AttemptComparison {
            baseline_result: baseline.result,
            current_result: self.result,
            band_delta: self.result.band_score - baseline.result.band_score,
            fixed,
            broken,
            unchanged,
            new_questions,
            removed_questions,
        }
    }
}

/// Result of comparing two attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptComparison {
    pub baseline_result: ScoreResult,
    pub current_result: ScoreResult,
    /// Current band minus baseline band.
    pub band_delta: f64,
    /// Questions that earned more points this time.
    pub fixed: Vec<QuestionChange>,
    /// Questions that earned fewer points this time.
    pub broken: Vec<QuestionChange>,
    /// Questions with the same points.
    pub unchanged: usize,
    /// Questions in current but not baseline.
    pub new_questions: usize,
    /// Questions in baseline but not current.
    pub removed_questions: usize,
}

/// A question whose points changed between attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionChange {
    pub question_id: String,
    pub baseline_points: u32,
    pub current_points: u32,
    pub max_points: u32,
}

impl AttemptComparison {
    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Summary:** {} -> {} correct, band {:.1} -> {:.1} ({:+.1}); \
             {} fixed, {} broken, {} unchanged\n\n",
            self.baseline_result.correct_count,
            self.current_result.correct_count,
            self.baseline_result.band_score,
            self.current_result.band_score,
            self.band_delta,
            self.fixed.len(),
            self.broken.len(),
            self.unchanged
        ));

        for (title, changes) in [("Broken", &self.broken), ("Fixed", &self.fixed)] {
            if changes.is_empty() {
                continue;
            }
            md.push_str(&format!("### {title}\n\n"));
            md.push_str("| Question | Baseline | Current |\n");
            md.push_str("|----------|----------|---------|\n");
            for c in changes {
                md.push_str(&format!(
                    "| {} | {}/{} | {}/{} |\n",
                    c.question_id, c.baseline_points, c.max_points, c.current_points, c.max_points
                ));
            }
            md.push('\n');
        }

        md
    }

    /// Returns true if any question lost points.
    pub fn has_regressions(&self) -> bool {
        !self.broken.is_empty()
    }
}
