use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::ReconciliationResult;
use crate::error::ErrorInfo;

/// 任务状态: PENDING -> DONE | FAILED (终态)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Done,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            JobStatus::Pending => "pending",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// 一次对账计算, 由 JobRegistry 独占持有
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub result: Option<Arc<ReconciliationResult>>,
    pub error: Option<ErrorInfo>,
}

impl Job {
    pub fn pending(id: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            created_at,
            completed_at: None,
            result: None,
            error: None,
        }
    }
}
