use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 记录来源: 银行对账单 或 内部账簿
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Bank,
    Ledger,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Bank => "bank",
            Origin::Ledger => "ledger",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 标准化后的交易记录 (创建后不可变)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub date: NaiveDate,
    pub amount: BigDecimal,
    pub description: String,
    pub origin: Origin,
    /// 原始文档中的顺序, 仅用于确定性排序
    pub sequence_index: usize,
}

impl TransactionRecord {
    pub fn new(
        origin: Origin,
        sequence_index: usize,
        date: NaiveDate,
        amount: BigDecimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            description: description.into(),
            origin,
            sequence_index,
        }
    }

    /// 与另一条记录的日期间隔 (天, 绝对值)
    pub fn days_apart(&self, other: &TransactionRecord) -> i64 {
        (self.date - other.date).num_days().abs()
    }
}
