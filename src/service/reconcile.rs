use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{ErrorInfo, ReconError, Result};
use crate::models::{Origin, ReconciliationResult, TransactionRecord};
use crate::registry::JobRegistry;
use crate::service::matcher::{MatchTolerance, Matcher};
use crate::service::normalizer::{normalize, parse_amount, RawAmount, RecordInput};
use crate::service::report;

/// 对账请求: 两组抽取结果 + 可选容差
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileRequest {
    pub bank: Vec<RecordInput>,
    pub ledger: Vec<RecordInput>,
    /// 文本或 JSON 数字, 与记录金额同样解析
    #[serde(default)]
    pub amount_tolerance: Option<RawAmount>,
    #[serde(default)]
    pub date_tolerance_days: Option<u32>,
}

impl ReconcileRequest {
    /// 请求容差覆盖默认值; 范围校验由匹配引擎完成
    pub fn tolerance(&self, defaults: &MatchTolerance) -> Result<MatchTolerance> {
        let amount = match &self.amount_tolerance {
            Some(raw) => parse_amount(raw).ok_or_else(|| {
                ReconError::validation(format!("unparseable amount tolerance '{}'", raw))
            })?,
            None => defaults.amount.clone(),
        };
        Ok(MatchTolerance::new(
            amount,
            self.date_tolerance_days.unwrap_or(defaults.date_days),
        ))
    }
}

/// 对账服务: 同步建任务, 异步计算结果
pub struct ReconcileService {
    registry: Arc<JobRegistry>,
    defaults: MatchTolerance,
}

impl ReconcileService {
    pub fn new(registry: Arc<JobRegistry>, defaults: MatchTolerance) -> Self {
        Self { registry, defaults }
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// 创建 PENDING 任务并在后台执行, 立即返回任务ID
    pub async fn submit(&self, request: ReconcileRequest) -> String {
        let job_id = self.registry.create().await;
        tracing::info!(
            "Job {}: {} bank rows vs {} ledger rows",
            job_id,
            request.bank.len(),
            request.ledger.len()
        );

        let registry = self.registry.clone();
        let id = job_id.clone();
        let defaults = self.defaults.clone();
        tokio::spawn(async move { run_job(registry, id, request, defaults).await });

        job_id
    }
}

async fn run_job(
    registry: Arc<JobRegistry>,
    job_id: String,
    request: ReconcileRequest,
    defaults: MatchTolerance,
) {
    let computed = tokio::task::spawn_blocking(move || {
        let tolerance = request.tolerance(&defaults)?;
        reconcile(&request.bank, &request.ledger, &tolerance)
    })
    .await;

    let transition = match computed {
        Ok(Ok(result)) => {
            tracing::info!(
                "Reconciliation completed for job {}: {}/{} matched, bank balance {}, ledger balance {}",
                job_id,
                result.counts.matched,
                result.counts.total_bank,
                result.bank_total,
                result.ledger_total
            );
            registry.complete(&job_id, result).await
        }
        Ok(Err(err)) => {
            tracing::warn!("Job {} failed: {}", job_id, err);
            registry.fail(&job_id, ErrorInfo::from(&err)).await
        }
        Err(join_err) => {
            tracing::error!("Job {} worker aborted: {}", job_id, join_err);
            registry
                .fail(&job_id, ErrorInfo::new("internal", join_err.to_string()))
                .await
        }
    };

    // 任务可能在计算期间被删除或清理
    if let Err(err) = transition {
        tracing::warn!("Job {} result discarded: {}", job_id, err);
    }
}

/// 完整流水线: 标准化 -> 非空校验 -> 匹配 -> 汇总
pub fn reconcile(
    bank_inputs: &[RecordInput],
    ledger_inputs: &[RecordInput],
    tolerance: &MatchTolerance,
) -> Result<ReconciliationResult> {
    if bank_inputs.is_empty() {
        return Err(ReconError::validation("no transactions extracted from bank statement"));
    }
    if ledger_inputs.is_empty() {
        return Err(ReconError::validation("no transactions extracted from ledger"));
    }

    let bank = normalize(Origin::Bank, bank_inputs)?;
    let ledger = normalize(Origin::Ledger, ledger_inputs)?;
    reconcile_records(&bank, &ledger, tolerance)
}

/// 同步 match + build
pub fn reconcile_records(
    bank: &[TransactionRecord],
    ledger: &[TransactionRecord],
    tolerance: &MatchTolerance,
) -> Result<ReconciliationResult> {
    let outcomes = Matcher::new(tolerance.clone()).match_records(bank, ledger)?;
    Ok(report::build(outcomes))
}
