pub mod handlers;

pub use handlers::*;

use crate::service::ReconcileService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// 构建路由
pub fn router(service: Arc<ReconcileService>) -> Router {
    let job_routes = Router::new()
        .route("/api/v1/reconcile", post(submit_reconciliation))
        .route("/api/v1/jobs/:job_id", get(get_job).delete(delete_job))
        .route("/api/v1/jobs/:job_id/rows", get(job_rows))
        .route("/api/v1/jobs/:job_id/rows.csv", get(job_rows_csv))
        .with_state(service);

    Router::new()
        .route("/health", get(health_check))
        .merge(job_routes)
}
