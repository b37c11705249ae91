//! Aggregate statistics over saved score records.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::record::ScoreRecord;

/// Statistics across every saved attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStats {
    /// Number of attempts.
    pub attempts: usize,
    /// Best band achieved.
    pub best_band: f64,
    /// Mean band across attempts.
    pub average_band: f64,
    /// Mean percentage across attempts.
    pub average_percentage: f64,
    /// Most recent attempt.
    pub latest: Option<ScoreRecord>,
    /// Per-test statistics.
    pub per_test: HashMap<String, TestStats>,
}

/// Statistics for a single test across attempts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestStats {
    /// Test identifier.
    pub test_id: String,
    /// Number of attempts at this test.
    pub attempts: usize,
    /// Best band on this test.
    pub best_band: f64,
    /// Band of the most recent attempt.
    pub latest_band: f64,
    /// Highest raw score on this test.
    pub best_score: u32,
    /// Average time taken, in seconds, over attempts that recorded it.
    pub avg_time_taken_secs: Option<u64>,
}

/// Round a mean band to the nearest half band; quarter bands round up.
pub fn round_to_half_band(band: f64) -> f64 {
    (band * 2.0).round() / 2.0
}

/// Compute aggregate statistics from all records.
pub fn compute_history_stats(records: &[ScoreRecord]) -> HistoryStats {
    if records.is_empty() {
        return HistoryStats {
            attempts: 0,
            best_band: 0.0,
            average_band: 0.0,
            average_percentage: 0.0,
            latest: None,
            per_test: HashMap::new(),
        };
    }

    let n = records.len() as f64;
    let best_band = records.iter().map(|r| r.band_score).fold(0.0, f64::max);
    let average_band = records.iter().map(|r| r.band_score).sum::<f64>() / n;
    let average_percentage = records.iter().map(|r| r.percentage as f64).sum::<f64>() / n;
    let latest = records.iter().max_by_key(|r| r.created_at).cloned();

    let mut grouped: HashMap<&str, Vec<&ScoreRecord>> = HashMap::new();
    for r in records {
        grouped.entry(r.test_id.as_str()).or_default().push(r);
    }

    let per_test = grouped
        .into_iter()
        .map(|(test_id, attempts)| {
            let latest_band = attempts
                .iter()
                .max_by_key(|r| r.created_at)
                .map(|r| r.band_score)
                .unwrap_or(0.0);
            let timed: Vec<u64> = attempts.iter().filter_map(|r| r.time_taken_secs).collect();
            let avg_time_taken_secs =
                (!timed.is_empty()).then(|| timed.iter().sum::<u64>() / timed.len() as u64);

            let stats = TestStats {
                test_id: test_id.to_string(),
                attempts: attempts.len(),
                best_band: attempts.iter().map(|r| r.band_score).fold(0.0, f64::max),
                latest_band,
                best_score: attempts.iter().map(|r| r.score).max().unwrap_or(0),
                avg_time_taken_secs,
            };
            (test_id.to_string(), stats)
        })
        .collect();

    HistoryStats {
        attempts: records.len(),
        best_band,
        average_band,
        average_percentage,
        latest,
        per_test,
    }
}
