use std::sync::Arc;
use statement_recon::{api, spawn_daily_sweep, AppConfig, JobRegistry, ReconcileService};
use tower::ServiceBuilder;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载配置
    let config = AppConfig::from_env()?;

    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .with_max_level(config.log_level())
        .init();

    info!("Starting server with config: {:?}", config);

    // 任务登记表 + 每日过期清理
    let registry = Arc::new(JobRegistry::new());
    let retention = config.retention_policy()?;
    let sweeper = spawn_daily_sweep(registry.clone(), retention.clone());
    info!(
        "Job retention: {}h, daily cleanup at {}",
        retention.max_age.num_hours(),
        retention.sweep_at
    );

    let service = Arc::new(ReconcileService::new(registry, config.tolerance()));

    // 构建路由
    let app = api::router(service).layer(ServiceBuilder::new());

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST   /api/v1/reconcile              - submit reconciliation job");
    info!("  GET    /api/v1/jobs/:job_id           - job status and result");
    info!("  DELETE /api/v1/jobs/:job_id           - delete job");
    info!("  GET    /api/v1/jobs/:job_id/rows[.csv] - exported rows");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    sweeper.abort();
    info!("Server stopped");
    Ok(())
}
