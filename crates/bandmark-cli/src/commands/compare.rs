//! The `bandmark compare` command.

use std::path::PathBuf;

use anyhow::Result;

use bandmark_core::report::ScoreReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    let baseline = ScoreReport::load_json(&baseline_path)?;
    let current = ScoreReport::load_json(&current_path)?;

    if baseline.test.id != current.test.id {
        eprintln!(
            "Warning: comparing different tests ({} vs {})",
            baseline.test.id, current.test.id
        );
    }

    let report = current.compare(&baseline);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Comparison: band {:.1} -> {:.1} ({:+.1}); \
                 {} regressions, {} improvements, {} unchanged",
                report.baseline_result.band_score,
                report.current_result.band_score,
                report.band_delta,
                report.broken.len(),
                report.fixed.len(),
                report.unchanged
            );

            if !report.broken.is_empty() {
                println!("\nRegressions:");
                for c in &report.broken {
                    println!(
                        "  {} {}/{} -> {}/{}",
                        c.question_id,
                        c.baseline_points,
                        c.max_points,
                        c.current_points,
                        c.max_points
                    );
                }
            }

            if !report.fixed.is_empty() {
                println!("\nImprovements:");
                for c in &report.fixed {
                    println!(
                        "  {} {}/{} -> {}/{}",
                        c.question_id,
                        c.baseline_points,
                        c.max_points,
                        c.current_points,
                        c.max_points
                    );
                }
            }

            if report.new_questions > 0 {
                println!("\n{} new question(s)", report.new_questions);
            }
            if report.removed_questions > 0 {
                println!("{} removed question(s)", report.removed_questions);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
