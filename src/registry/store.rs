use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{ErrorInfo, ReconError, Result};
use crate::models::{Job, JobStatus, ReconciliationResult};

/// 内存任务登记表
///
/// 所有写操作 (create/complete/fail/delete/sweep) 共用同一把写锁,
/// 读操作 (get) 可并发; 状态与结果在同一次加锁内写入。
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, Job>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 新建 PENDING 任务, 返回任务ID
    pub async fn create(&self) -> String {
        let id = Uuid::new_v4().to_string();
        let job = Job::pending(id.clone(), Utc::now());
        self.jobs.write().await.insert(id.clone(), job);
        tracing::info!("Job {} created", id);
        id
    }

    /// PENDING -> DONE
    pub async fn complete(&self, job_id: &str, result: ReconciliationResult) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let job = pending_job(&mut jobs, job_id)?;
        job.status = JobStatus::Done;
        job.result = Some(Arc::new(result));
        job.completed_at = Some(Utc::now());
        Ok(())
    }

    /// PENDING -> FAILED
    pub async fn fail(&self, job_id: &str, error: ErrorInfo) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let job = pending_job(&mut jobs, job_id)?;
        job.status = JobStatus::Failed;
        job.error = Some(error);
        job.completed_at = Some(Utc::now());
        Ok(())
    }

    pub async fn get(&self, job_id: &str) -> Result<Job> {
        self.jobs
            .read()
            .await
            .get(job_id)
            .cloned()
            .ok_or_else(|| ReconError::NotFound(job_id.to_string()))
    }

    /// 删除任务; 不存在时返回 NotFound, 不影响其它任务
    pub async fn delete(&self, job_id: &str) -> Result<()> {
        match self.jobs.write().await.remove(job_id) {
            Some(_) => {
                tracing::info!("Job {} deleted", job_id);
                Ok(())
            }
            None => Err(ReconError::NotFound(job_id.to_string())),
        }
    }

    /// 删除创建时间早于 max_age 的任务 (不论状态), 返回删除数量
    pub async fn sweep(&self, max_age: Duration) -> usize {
        match Utc::now().checked_sub_signed(max_age) {
            Some(cutoff) => self.sweep_before(cutoff).await,
            // 截止时间超出可表示范围: 没有任务过期
            None => 0,
        }
    }

    pub async fn sweep_before(&self, cutoff: DateTime<Utc>) -> usize {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| job.created_at >= cutoff);
        let removed = before - jobs.len();
        if removed > 0 {
            tracing::info!("Removed {} expired reconciliation job(s)", removed);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

fn pending_job<'a>(jobs: &'a mut HashMap<String, Job>, job_id: &str) -> Result<&'a mut Job> {
    let Some(job) = jobs.get_mut(job_id) else {
        tracing::warn!("Job {} rejected transition: not in registry", job_id);
        return Err(ReconError::InvalidTransition {
            job_id: job_id.to_string(),
            status: None,
        });
    };
    if job.status != JobStatus::Pending {
        tracing::warn!("Job {} rejected transition from {}", job_id, job.status);
        return Err(ReconError::InvalidTransition {
            job_id: job_id.to_string(),
            status: Some(job.status),
        });
    }
    Ok(job)
}
