use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexSet;
use std::collections::HashSet;
use std::str::FromStr;

use crate::error::{ReconError, Result};
use crate::models::{MatchOutcome, Origin, TransactionRecord};
use crate::service::normalizer::{within_scale, MAX_AMOUNT_SCALE};

/// 匹配容差
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTolerance {
    /// 金额绝对值差的上限 (>= 0)
    pub amount: BigDecimal,
    /// 日期差的参考阈值, 只影响 within_date_tolerance 标记
    pub date_days: u32,
}

impl MatchTolerance {
    pub fn new(amount: BigDecimal, date_days: u32) -> Self {
        Self { amount, date_days }
    }
}

impl Default for MatchTolerance {
    fn default() -> Self {
        Self {
            amount: BigDecimal::from_str("0.01").unwrap_or_else(|_| BigDecimal::zero()),
            date_days: 5,
        }
    }
}

/// 匹配引擎: 银行记录 -> 账簿记录 一对一贪心匹配
///
/// 按银行记录原始顺序逐条处理:
/// 1. 候选 = 池中金额 (绝对值) 差 <= 容差的账簿记录
/// 2. 无候选 -> Missing
/// 3. 有候选 -> 取日期最近者, 同距离取 sequence_index 最小者, 从池中移除
///
/// 最后池中剩余的账簿记录按原始顺序输出为 Orphan。
/// 日期只用于排序和标记, 不过滤候选。
#[derive(Debug, Clone, Default)]
pub struct Matcher {
    tolerance: MatchTolerance,
}

impl Matcher {
    pub fn new(tolerance: MatchTolerance) -> Self {
        Self { tolerance }
    }

    pub fn match_records(
        &self,
        bank: &[TransactionRecord],
        ledger: &[TransactionRecord],
    ) -> Result<Vec<MatchOutcome>> {
        // 精度检查须在格式化金额之前
        if !within_scale(&self.tolerance.amount) {
            return Err(ReconError::validation(format!(
                "amount tolerance exceeds {} decimal places",
                MAX_AMOUNT_SCALE
            )));
        }
        if self.tolerance.amount < BigDecimal::zero() {
            return Err(ReconError::validation(format!(
                "amount tolerance must not be negative, got {}",
                self.tolerance.amount
            )));
        }
        check_sequence(bank, Origin::Bank)?;
        check_sequence(ledger, Origin::Ledger)?;

        // 未消费的账簿位置, 保持 sequence_index 顺序
        let mut pool: IndexSet<usize> = document_order(ledger).into_iter().collect();
        let mut outcomes = Vec::with_capacity(bank.len() + ledger.len());

        for bank_pos in document_order(bank) {
            let bank_record = &bank[bank_pos];
            let target_abs = bank_record.amount.abs();

            let best = pool
                .iter()
                .copied()
                .filter(|&pos| self.within_amount(&target_abs, &ledger[pos]))
                .min_by_key(|&pos| {
                    (
                        bank_record.days_apart(&ledger[pos]),
                        ledger[pos].sequence_index,
                    )
                });

            let Some(ledger_pos) = best else {
                tracing::debug!(
                    "bank #{} {} {}: no ledger candidate",
                    bank_record.sequence_index,
                    bank_record.date,
                    bank_record.amount
                );
                outcomes.push(MatchOutcome::Missing {
                    bank_record: bank_record.clone(),
                });
                continue;
            };

            pool.shift_remove(&ledger_pos);
            let ledger_record = &ledger[ledger_pos];
            let date_difference_days = bank_record.days_apart(ledger_record);
            tracing::debug!(
                "bank #{} matched ledger #{} (Δ {} days)",
                bank_record.sequence_index,
                ledger_record.sequence_index,
                date_difference_days
            );

            outcomes.push(MatchOutcome::Matched {
                bank_record: bank_record.clone(),
                ledger_record: ledger_record.clone(),
                date_difference_days,
                within_date_tolerance: date_difference_days <= i64::from(self.tolerance.date_days),
            });
        }

        outcomes.extend(pool.into_iter().map(|pos| MatchOutcome::Orphan {
            ledger_record: ledger[pos].clone(),
        }));

        Ok(outcomes)
    }

    /// |abs(a) - abs(b)| <= 容差
    fn within_amount(&self, target_abs: &BigDecimal, candidate: &TransactionRecord) -> bool {
        (target_abs - candidate.amount.abs()).abs() <= self.tolerance.amount
    }
}

/// 按 sequence_index 排序后的切片位置
fn document_order(records: &[TransactionRecord]) -> Vec<usize> {
    let mut positions: Vec<usize> = (0..records.len()).collect();
    positions.sort_by_key(|&pos| records[pos].sequence_index);
    positions
}

fn check_sequence(records: &[TransactionRecord], expected: Origin) -> Result<()> {
    let mut seen = HashSet::with_capacity(records.len());
    for record in records {
        if record.origin != expected {
            return Err(ReconError::validation(format!(
                "{} record #{} found in {} sequence",
                record.origin, record.sequence_index, expected
            )));
        }
        if !seen.insert(record.sequence_index) {
            return Err(ReconError::validation(format!(
                "duplicate sequence_index {} in {} sequence",
                record.sequence_index, expected
            )));
        }
        if !within_scale(&record.amount) {
            return Err(ReconError::validation(format!(
                "{} record #{}: amount exceeds {} decimal places",
                expected, record.sequence_index, MAX_AMOUNT_SCALE
            )));
        }
    }
    Ok(())
}
