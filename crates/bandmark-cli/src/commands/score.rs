//! The `bandmark score` command.

use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use comfy_table::{Cell, Table};

use bandmark_core::config::{load_config_from, BandmarkConfig};
use bandmark_core::model::TestDefinition;
use bandmark_core::parser;
use bandmark_core::record::{JsonlScoreLog, ScoreRecord, ScoreSink};
use bandmark_core::report::ScoreReport;
use bandmark_core::scorer::Scorer;
use bandmark_core::session::{SubmitTrigger, TestSession};

#[allow(clippy::too_many_arguments)]
pub async fn execute(
    key_path: PathBuf,
    answers_path: PathBuf,
    format: String,
    output: Option<PathBuf>,
    review: bool,
    record: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let test = parser::parse_test(&key_path, config.default_module)?;
    let sheet = parser::parse_answer_sheet(&answers_path)?;
    let scorer = Scorer::for_test(&test);

    let mut session = TestSession::start(test.info.id.clone(), None, Utc::now());
    for (id, response) in sheet.iter() {
        if test.key.get(id).is_none() {
            tracing::warn!("answer to unknown question {id} ignored");
        }
        session = session.record_answer(id.clone(), response.clone());
    }
    let session = session.submit(&test.key, &scorer, SubmitTrigger::Manual, Utc::now());

    let report = build_report(&test, &session, &scorer)?;

    match format.as_str() {
        "markdown" | "md" => println!("{}", report.to_markdown()),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => {
            print_summary(&report);
            if review {
                print_review(&report);
            }
        }
    }

    // Recorded attempts keep their report for later comparison
    let save_dir = output.or_else(|| record.then(|| config.output_dir.clone()));
    if let Some(dir) = save_dir {
        let path = save_report(&report, &dir)?;
        eprintln!("Report saved to: {}", path.display());
    }

    if record {
        record_score(&config, &test, &session).await?;
    }

    Ok(())
}

/// Build the score report for a submitted session.
pub fn build_report(
    test: &TestDefinition,
    session: &TestSession,
    scorer: &Scorer,
) -> Result<ScoreReport> {
    let submission = session
        .submission()
        .ok_or_else(|| anyhow::anyhow!("session for {} was never submitted", test.info.id))?;

    let mut report = ScoreReport::new(
        &test.info,
        submission.result,
        session.review(&test.key, scorer),
    );
    report.time_taken_secs = session
        .time_taken()
        .filter(|_| session.time_limit().is_some())
        .map(|d| d.num_seconds().max(0) as u64);
    report.trigger = session.time_limit().map(|_| submission.trigger);
    Ok(report)
}

/// Save a report as `report-{test}-{timestamp}.json` under `dir`.
pub fn save_report(report: &ScoreReport, dir: &Path) -> Result<PathBuf> {
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");
    let path = dir.join(format!("report-{}-{timestamp}.json", report.test.id));
    report.save_json(&path)?;
    Ok(path)
}

/// Append the session's score to the configured history log.
pub async fn record_score(
    config: &BandmarkConfig,
    test: &TestDefinition,
    session: &TestSession,
) -> Result<()> {
    let Some(record) = ScoreRecord::from_session(&test.info, session) else {
        anyhow::bail!("nothing to record: {} was never submitted", test.info.id);
    };
    let log = JsonlScoreLog::new(&config.history_path);
    log.save(&record).await?;
    eprintln!("Score recorded in: {}", log.path().display());
    Ok(())
}

pub fn print_summary(report: &ScoreReport) {
    let mut table = Table::new();
    table.set_header(vec!["Test", "Module", "Score", "Percentage", "Band"]);
    table.add_row(vec![
        Cell::new(&report.test.title),
        Cell::new(report.test.module),
        Cell::new(format!(
            "{}/{}",
            report.result.correct_count, report.result.total_questions
        )),
        Cell::new(format!("{}%", report.result.percentage)),
        Cell::new(format!("{:.1}", report.result.band_score)),
    ]);
    println!("{table}");
}

pub fn print_review(report: &ScoreReport) {
    let mut table = Table::new();
    table.set_header(vec!["Question", "Your answer", "Correct answer", "Result"]);

    for o in &report.outcomes {
        let answer = match &o.response {
            Some(r) if !o.is_unanswered() => r.to_string(),
            _ => "(No answer)".to_string(),
        };
        let verdict = if o.is_correct() {
            "correct".to_string()
        } else if o.is_partial() {
            format!("partial {}/{}", o.points, o.max_points)
        } else {
            "wrong".to_string()
        };
        table.add_row(vec![
            Cell::new(&o.question_id),
            Cell::new(answer),
            Cell::new(&o.expected),
            Cell::new(verdict),
        ]);
    }

    println!("{table}");
}
