use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::JobStatus;

pub type Result<T> = std::result::Result<T, ReconError>;

/// 对账核心错误
#[derive(Debug, Error)]
pub enum ReconError {
    /// 输入记录格式错误或为空 (来自标准化阶段或匹配前校验)
    #[error("validation error: {0}")]
    Validation(String),
    /// 任务不是 PENDING (status 为 None 表示任务不存在)
    #[error("job {job_id} is {}, expected pending", describe_status(.status))]
    InvalidTransition {
        job_id: String,
        status: Option<JobStatus>,
    },
    #[error("job {0} not found")]
    NotFound(String),
    #[error("export error: {0}")]
    Export(#[from] ExportError),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_status(status: &Option<JobStatus>) -> String {
    match status {
        Some(status) => status.to_string(),
        None => "absent".to_string(),
    }
}

impl ReconError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// 错误类别 (写入 ErrorInfo.kind)
    pub fn kind(&self) -> &'static str {
        match self {
            ReconError::Validation(_) => "validation",
            ReconError::InvalidTransition { .. } => "invalid_transition",
            ReconError::NotFound(_) => "not_found",
            ReconError::Export(_) => "export",
        }
    }
}

/// 失败任务中保存的错误快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub kind: String,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl From<&ReconError> for ErrorInfo {
    fn from(err: &ReconError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_info_captures_kind_and_message() {
        let err = ReconError::validation("bank row 3: amount 'abc' is not a number");
        let info = ErrorInfo::from(&err);
        assert_eq!(info.kind, "validation");
        assert_eq!(
            info.message,
            "validation error: bank row 3: amount 'abc' is not a number"
        );
    }

    #[test]
    fn invalid_transition_names_current_status() {
        let err = ReconError::InvalidTransition {
            job_id: "abc".to_string(),
            status: Some(JobStatus::Done),
        };
        assert_eq!(err.to_string(), "job abc is done, expected pending");

        let absent = ReconError::InvalidTransition {
            job_id: "xyz".to_string(),
            status: None,
        };
        assert_eq!(absent.to_string(), "job xyz is absent, expected pending");
        assert_eq!(err.kind(), "invalid_transition");
    }
}
