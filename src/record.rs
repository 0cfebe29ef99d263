use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::collection_log::LogEntry;
use crate::error::ScorerError;
use crate::results::{Baseline, TestResults};
use crate::scoring::ScoreBreakdown;

/// Everything one `calculate` run produced, as written to `score-results.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRecord {
    pub score: ScoreBreakdown,
    pub results: TestResults,
    pub baseline: Baseline,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub log: Vec<LogEntry>,
}

impl ScoreRecord {
    pub fn new(
        score: ScoreBreakdown,
        results: TestResults,
        baseline: Baseline,
        log: Vec<LogEntry>,
    ) -> Self {
        Self {
            score,
            results,
            baseline,
            timestamp: Utc::now(),
            log,
        }
    }
}

pub fn save_record(path: &Path, record: &ScoreRecord) -> Result<(), ScorerError> {
    let json = serde_json::to_string_pretty(record)?;
    std::fs::write(path, json)?;
    info!("Score record written to {:?}", path);
    Ok(())
}

pub fn load_record(path: &Path) -> Result<ScoreRecord, ScorerError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ScorerError::ResultsNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_str(&content)?)
}

/// Read a baseline snapshot, e.g. one printed by `baseline` mode.
pub fn load_baseline(path: &Path) -> Result<Baseline, ScorerError> {
    let content = std::fs::read_to_string(path)?;
    let baseline: Baseline = serde_json::from_str(&content)?;
    baseline.validate()?;
    info!("Loaded baseline from {:?}", path);
    Ok(baseline)
}
