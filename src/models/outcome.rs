use serde::{Deserialize, Serialize};
use std::fmt;

use super::TransactionRecord;

/// 单条匹配结论
///
/// 每条银行记录和每条账簿记录恰好出现在一个结论中。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MatchOutcome {
    Matched {
        bank_record: TransactionRecord,
        ledger_record: TransactionRecord,
        date_difference_days: i64,
        within_date_tolerance: bool,
    },
    /// 银行有, 账簿无
    Missing { bank_record: TransactionRecord },
    /// 账簿有, 银行无
    Orphan { ledger_record: TransactionRecord },
}

/// 结论类别, 也是导出行的 status 列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Matched,
    Missing,
    Orphan,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Matched => "matched",
            OutcomeStatus::Missing => "missing",
            OutcomeStatus::Orphan => "orphan",
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl MatchOutcome {
    pub fn status(&self) -> OutcomeStatus {
        match self {
            MatchOutcome::Matched { .. } => OutcomeStatus::Matched,
            MatchOutcome::Missing { .. } => OutcomeStatus::Missing,
            MatchOutcome::Orphan { .. } => OutcomeStatus::Orphan,
        }
    }

    pub fn bank_record(&self) -> Option<&TransactionRecord> {
        match self {
            MatchOutcome::Matched { bank_record, .. } | MatchOutcome::Missing { bank_record } => {
                Some(bank_record)
            }
            MatchOutcome::Orphan { .. } => None,
        }
    }

    pub fn ledger_record(&self) -> Option<&TransactionRecord> {
        match self {
            MatchOutcome::Matched { ledger_record, .. } | MatchOutcome::Orphan { ledger_record } => {
                Some(ledger_record)
            }
            MatchOutcome::Missing { .. } => None,
        }
    }

    /// 导出行使用的主记录: 银行侧优先
    pub fn primary_record(&self) -> &TransactionRecord {
        match self {
            MatchOutcome::Matched { bank_record, .. } | MatchOutcome::Missing { bank_record } => {
                bank_record
            }
            MatchOutcome::Orphan { ledger_record } => ledger_record,
        }
    }
}
