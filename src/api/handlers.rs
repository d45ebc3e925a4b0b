use crate::error::ReconError;
use crate::export;
use crate::models::{Job, JobStatus, ReconciliationResult};
use crate::service::{ReconcileRequest, ReconcileService};
use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 提交响应
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: String,
    pub status: JobStatus,
}

/// 错误响应体
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// 接口层错误
#[derive(Debug)]
pub enum ApiError {
    Recon(ReconError),
    /// 任务尚未完成或已失败, 没有可导出的结果
    NoResult { job_id: String, status: JobStatus },
}

impl From<ReconError> for ApiError {
    fn from(err: ReconError) -> Self {
        ApiError::Recon(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Recon(err) => {
                let status = match &err {
                    ReconError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    ReconError::NotFound(_) => StatusCode::NOT_FOUND,
                    ReconError::InvalidTransition { .. } => StatusCode::CONFLICT,
                    ReconError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
            ApiError::NoResult { job_id, status } => (
                StatusCode::CONFLICT,
                format!("job {} is {}, no result available", job_id, status),
            ),
        };
        let body = ErrorResponse {
            success: false,
            message,
        };
        (status, Json(body)).into_response()
    }
}

/// 健康检查
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Local::now().to_rfc3339(),
        "service": "statement-recon",
    }))
}

/// 提交对账任务, 立即返回任务ID
pub async fn submit_reconciliation(
    State(service): State<Arc<ReconcileService>>,
    Json(req): Json<ReconcileRequest>,
) -> (StatusCode, Json<SubmitResponse>) {
    let job_id = service.submit(req).await;
    let response = SubmitResponse {
        job_id,
        status: JobStatus::Pending,
    };
    (StatusCode::ACCEPTED, Json(response))
}

/// 查询任务状态与结果
pub async fn get_job(
    State(service): State<Arc<ReconcileService>>,
    Path(job_id): Path<String>,
) -> Result<Json<Job>, ApiError> {
    Ok(Json(service.registry().get(&job_id).await?))
}

/// 删除任务 (用户保存报告后清理)
pub async fn delete_job(
    State(service): State<Arc<ReconcileService>>,
    Path(job_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.registry().delete(&job_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// 结果行 (JSON)
pub async fn job_rows(
    State(service): State<Arc<ReconcileService>>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let result = done_result(&service, &job_id).await?;
    let body = export::rows_to_json(&result.rows())?;
    Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
}

/// 结果行 (CSV)
pub async fn job_rows_csv(
    State(service): State<Arc<ReconcileService>>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let result = done_result(&service, &job_id).await?;
    let body = export::rows_to_csv(&result.rows())?;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body).into_response())
}

async fn done_result(
    service: &ReconcileService,
    job_id: &str,
) -> Result<Arc<ReconciliationResult>, ApiError> {
    let job = service.registry().get(job_id).await?;
    match (job.status, job.result) {
        (JobStatus::Done, Some(result)) => Ok(result),
        (status, _) => Err(ApiError::NoResult {
            job_id: job.id,
            status,
        }),
    }
}
