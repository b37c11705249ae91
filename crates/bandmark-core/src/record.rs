//! Score records and the persistence hand-off.
//!
//! A [`ScoreRecord`] carries a submission's result to whatever stores score
//! history. The engine never depends on the store succeeding.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::model::{TestInfo, TestModule};
use crate::session::{SubmitTrigger, TestSession};

/// One saved submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// When the attempt was submitted.
    pub created_at: DateTime<Utc>,
    /// Test identifier.
    pub test_id: String,
    /// Source book.
    #[serde(default)]
    pub book: String,
    /// Test module.
    pub module: TestModule,
    /// Test number within the book.
    #[serde(default)]
    pub test_number: Option<u32>,
    /// Points earned.
    pub score: u32,
    /// Points available.
    pub total_questions: u32,
    /// Rounded percentage.
    pub percentage: u32,
    /// Band score.
    pub band_score: f64,
    /// Seconds from start to submission.
    #[serde(default)]
    pub time_taken_secs: Option<u64>,
    /// What caused the submission.
    pub trigger: SubmitTrigger,
}

impl ScoreRecord {
    /// Build a record from a submitted session. Returns `None` before submission.
    pub fn from_session(info: &TestInfo, session: &TestSession) -> Option<Self> {
        let submission = session.submission()?;
        Some(Self {
            id: Uuid::new_v4(),
            created_at: submission.submitted_at,
            test_id: info.id.clone(),
            book: info.book.clone(),
            module: info.module,
            test_number: info.test_number,
            score: submission.result.correct_count,
            total_questions: submission.result.total_questions,
            percentage: submission.result.percentage,
            band_score: submission.result.band_score,
            time_taken_secs: session
                .time_taken()
                .map(|d| d.num_seconds().max(0) as u64),
            trigger: submission.trigger,
        })
    }
}

/// Somewhere score records are kept.
#[async_trait]
pub trait ScoreSink: Send + Sync {
    /// Persist one record.
    async fn save(&self, record: &ScoreRecord) -> Result<()>;

    /// Every record saved so far, oldest first.
    async fn load(&self) -> Result<Vec<ScoreRecord>>;
}

/// Appends records to a JSON-lines file, one record per line.
#[derive(Debug, Clone)]
pub struct JsonlScoreLog {
    path: PathBuf,
}

impl JsonlScoreLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ScoreSink for JsonlScoreLog {
    async fn save(&self, record: &ScoreRecord) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut line = serde_json::to_string(record).context("failed to serialize score record")?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open score log {}", self.path.display()))?;
        file.write_all(line.as_bytes())
            .await
            .with_context(|| format!("failed to write score log {}", self.path.display()))?;
        file.flush().await?;
        Ok(())
    }

    async fn load(&self) -> Result<Vec<ScoreRecord>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("failed to read score log {}", self.path.display()))
            }
        };

        let mut records = Vec::new();
        for (n, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<ScoreRecord>(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("{}:{}: skipping bad record: {}", self.path.display(), n + 1, e);
                }
            }
        }
        Ok(records)
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ScoreRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreSink for MemorySink {
    async fn save(&self, record: &ScoreRecord) -> Result<()> {
        self.records
            .lock()
            .map_err(|_| anyhow::anyhow!("score sink lock poisoned"))?
            .push(record.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Vec<ScoreRecord>> {
        Ok(self
            .records
            .lock()
            .map_err(|_| anyhow::anyhow!("score sink lock poisoned"))?
            .clone())
    }
}
