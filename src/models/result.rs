use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{MatchOutcome, Origin, OutcomeStatus};

/// 结论计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub matched: usize,
    pub missing: usize,
    pub orphan: usize,
    pub total_bank: usize,
    pub total_ledger: usize,
}

/// 总体结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// 无缺失, 无孤立
    Valid,
    /// 仅有孤立账簿记录
    NeedsReview,
    /// 存在缺失的银行记录
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagType {
    MissingData,
    Inconsistency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// 需要人工关注的记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flag {
    pub flag_type: FlagType,
    pub severity: Severity,
    pub message: String,
    pub date: NaiveDate,
    pub amount: BigDecimal,
    pub description: String,
}

/// 对账结果 (计算后不可变)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub outcomes: Vec<MatchOutcome>,
    pub bank_total: BigDecimal,
    pub ledger_total: BigDecimal,
    /// bank_total - ledger_total, 仅供参考, 不参与匹配
    pub balance_difference: BigDecimal,
    pub counts: Counts,
    /// 匹配成功但日期超出容差的数量
    pub date_mismatch: usize,
    pub missing_amount: BigDecimal,
    pub orphan_amount: BigDecimal,
    /// matched / total_bank * 100
    pub completion_rate: f64,
    pub verdict: Verdict,
    pub flags: Vec<Flag>,
}

impl ReconciliationResult {
    pub fn is_balanced(&self, amount_tolerance: &BigDecimal) -> bool {
        self.balance_difference.abs() < *amount_tolerance
    }

    /// 扁平导出视图, 顺序与 outcomes 一致
    pub fn rows(&self) -> Vec<ReportRow> {
        crate::service::report::build_rows(&self.outcomes)
    }
}

/// 导出行 (列集合与顺序是对外契约)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub origin: Origin,
    pub date: NaiveDate,
    pub amount: BigDecimal,
    pub description: String,
    pub status: OutcomeStatus,
    pub date_difference_days: Option<i64>,
    pub within_date_tolerance: Option<bool>,
}
