//! The `bandmark take` command.
//!
//! Runs a timed attempt on the console. Answers are read from stdin as
//! `<question> <answer>` lines; the attempt ends on `submit`, end of input, or
//! when the time limit runs out, whichever comes first.

use std::path::PathBuf;

use anyhow::Result;
use chrono::{Duration, Utc};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::time::{sleep_until, Instant};

use bandmark_core::config::load_config_from;
use bandmark_core::matcher::canonical_options;
use bandmark_core::model::{AnswerKind, TestDefinition};
use bandmark_core::parser;
use bandmark_core::scorer::Scorer;
use bandmark_core::session::{SubmitTrigger, TestSession};

use super::score::{build_report, print_review, print_summary, record_score, save_report};

pub async fn execute(
    key_path: PathBuf,
    minutes: Option<u64>,
    record: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let test = parser::parse_test(&key_path, config.default_module)?;
    let scorer = Scorer::for_test(&test);

    let minutes = minutes
        .or(test.info.time_limit_minutes)
        .unwrap_or(config.time_limit_minutes);
    let time_limit = time_limit(minutes)?;

    print_instructions(&test, minutes);

    let session = TestSession::start(test.info.id.clone(), time_limit, Utc::now());
    let lines = BufReader::new(tokio::io::stdin()).lines();
    let session = run_attempt(lines, session, &test, &scorer).await?;

    let report = build_report(&test, &session, &scorer)?;
    print_summary(&report);
    print_review(&report);

    if record {
        let path = save_report(&report, &config.output_dir)?;
        eprintln!("Report saved to: {}", path.display());
        record_score(&config, &test, &session).await?;
    }

    Ok(())
}

/// `0` minutes means untimed.
fn time_limit(minutes: u64) -> Result<Option<Duration>> {
    if minutes == 0 {
        return Ok(None);
    }
    let limit = i64::try_from(minutes)
        .ok()
        .and_then(Duration::try_minutes)
        .filter(|limit| Utc::now().checked_add_signed(*limit).is_some())
        .ok_or_else(|| anyhow::anyhow!("time limit of {minutes} minutes is too large"))?;
    Ok(Some(limit))
}

/// One line of console input.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Blank,
    Submit,
    Time,
    Clear(&'a str),
    Answer(&'a str, &'a str),
    Invalid,
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line.split_once(char::is_whitespace) {
        _ if line.is_empty() => Input::Blank,
        None if line.eq_ignore_ascii_case("submit") => Input::Submit,
        None if line.eq_ignore_ascii_case("time") => Input::Time,
        Some((cmd, id)) if cmd.eq_ignore_ascii_case("clear") => Input::Clear(id.trim()),
        Some((id, answer)) => Input::Answer(id, answer.trim()),
        None => Input::Invalid,
    }
}

/// Feed input lines into the session until it is submitted.
async fn run_attempt<R>(
    mut lines: Lines<R>,
    mut session: TestSession,
    test: &TestDefinition,
    scorer: &Scorer,
) -> Result<TestSession>
where
    R: AsyncBufRead + Unpin,
{
    let deadline = session
        .remaining(Utc::now())
        .map(|left| Instant::now() + left.to_std().unwrap_or_default());
    let expiry = async move {
        match deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(expiry);

    loop {
        tokio::select! {
            _ = &mut expiry => {
                println!("Time is up.");
                let at = session.deadline().unwrap_or_else(Utc::now);
                return Ok(session.submit(&test.key, scorer, SubmitTrigger::TimeExpired, at));
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    return Ok(session.submit(&test.key, scorer, SubmitTrigger::Manual, Utc::now()));
                };
                match parse_input(&line) {
                    Input::Blank => {}
                    Input::Submit => {
                        let now = Utc::now();
                        return Ok(session.submit(&test.key, scorer, SubmitTrigger::Manual, now));
                    }
                    Input::Time => match session.remaining(Utc::now()) {
                        Some(left) => println!(
                            "{}:{:02} remaining",
                            left.num_minutes(),
                            left.num_seconds() % 60
                        ),
                        None => println!("untimed"),
                    },
                    Input::Clear(id) => session = session.clear_answer(id),
                    Input::Answer(id, _) if test.key.get(id).is_none() => {
                        eprintln!("no question {id}");
                    }
                    Input::Answer(id, answer) => session = session.record_answer(id, answer),
                    Input::Invalid => {
                        eprintln!(
                            "expected `<question> <answer>`, `clear <question>`, \
                             `time` or `submit`"
                        );
                    }
                }
            }
        }
    }
}

fn print_instructions(test: &TestDefinition, minutes: u64) {
    println!("{} ({})", test.info.title, test.info.module);
    if minutes > 0 {
        println!("Time limit: {minutes} minutes");
    }
    println!("Questions:");
    for entry in test.key.entries() {
        match &entry.kind {
            AnswerKind::MultiSelect { .. } => {
                let choose = canonical_options(&entry.kind).len();
                println!("  {}  (choose {choose}, comma-separated)", entry.id)
            }
            _ => println!("  {}", entry.id),
        }
    }
    println!("Enter `<question> <answer>` per line; `submit` when done.");
}
