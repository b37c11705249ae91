//! The `bandmark history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use bandmark_core::config::load_config_from;
use bandmark_core::record::{JsonlScoreLog, ScoreSink};
use bandmark_core::statistics::{compute_history_stats, round_to_half_band};

pub async fn execute(test: Option<String>, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let log = JsonlScoreLog::new(&config.history_path);

    let mut records = log.load().await?;
    if let Some(test_id) = &test {
        records.retain(|r| &r.test_id == test_id);
    }
    records.sort_by_key(|r| r.created_at);

    if records.is_empty() {
        println!("No attempts recorded in {}.", log.path().display());
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Date", "Test", "Module", "Score", "Band", "Time", "Submitted"]);
    for r in &records {
        let time = r
            .time_taken_secs
            .map(|secs| format!("{}:{:02}", secs / 60, secs % 60))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(r.created_at.format("%Y-%m-%d %H:%M")),
            Cell::new(&r.test_id),
            Cell::new(r.module),
            Cell::new(format!("{}/{} ({}%)", r.score, r.total_questions, r.percentage)),
            Cell::new(format!("{:.1}", r.band_score)),
            Cell::new(time),
            Cell::new(format!("{:?}", r.trigger)),
        ]);
    }
    println!("{table}");

    let stats = compute_history_stats(&records);
    println!(
        "\n{} attempt(s); best band {:.1}, average band {:.1}, average score {:.0}%",
        stats.attempts,
        stats.best_band,
        round_to_half_band(stats.average_band),
        stats.average_percentage
    );

    if stats.per_test.len() > 1 {
        let mut per_test: Vec<_> = stats.per_test.values().collect();
        per_test.sort_by(|a, b| a.test_id.cmp(&b.test_id));

        let mut table = Table::new();
        table.set_header(vec!["Test", "Attempts", "Best score", "Best band", "Latest band"]);
        for t in per_test {
            table.add_row(vec![
                Cell::new(&t.test_id),
                Cell::new(t.attempts),
                Cell::new(t.best_score),
                Cell::new(format!("{:.1}", t.best_band)),
                Cell::new(format!("{:.1}", t.latest_band)),
            ]);
        }
        println!("\n{table}");
    }

    Ok(())
}
