use bigdecimal::{BigDecimal, Zero};

use crate::models::{
    Counts, Flag, FlagType, MatchOutcome, ReconciliationResult, ReportRow, Severity,
    TransactionRecord, Verdict,
};

/// 汇总匹配结论: 余额、计数、标记与总体结论
pub fn build(outcomes: Vec<MatchOutcome>) -> ReconciliationResult {
    let mut bank_total = BigDecimal::zero();
    let mut ledger_total = BigDecimal::zero();
    let mut missing_amount = BigDecimal::zero();
    let mut orphan_amount = BigDecimal::zero();
    let mut counts = Counts::default();
    let mut date_mismatch = 0;
    let mut flags = Vec::new();

    for outcome in &outcomes {
        match outcome {
            MatchOutcome::Matched {
                bank_record,
                ledger_record,
                within_date_tolerance,
                ..
            } => {
                counts.matched += 1;
                counts.total_bank += 1;
                counts.total_ledger += 1;
                bank_total += &bank_record.amount;
                ledger_total += &ledger_record.amount;
                if !within_date_tolerance {
                    date_mismatch += 1;
                }
            }
            MatchOutcome::Missing { bank_record } => {
                counts.missing += 1;
                counts.total_bank += 1;
                bank_total += &bank_record.amount;
                missing_amount += &bank_record.amount;
                flags.push(flag(
                    FlagType::MissingData,
                    Severity::Error,
                    "bank transaction not found in ledger",
                    bank_record,
                ));
            }
            MatchOutcome::Orphan { ledger_record } => {
                counts.orphan += 1;
                counts.total_ledger += 1;
                ledger_total += &ledger_record.amount;
                orphan_amount += &ledger_record.amount;
                flags.push(flag(
                    FlagType::Inconsistency,
                    Severity::Warning,
                    "ledger entry not found in bank statement",
                    ledger_record,
                ));
            }
        }
    }

    let balance_difference = &bank_total - &ledger_total;
    let completion_rate = if counts.total_bank > 0 {
        counts.matched as f64 / counts.total_bank as f64 * 100.0
    } else {
        0.0
    };

    ReconciliationResult {
        outcomes,
        bank_total,
        ledger_total,
        balance_difference,
        counts,
        date_mismatch,
        missing_amount,
        orphan_amount,
        completion_rate,
        verdict: verdict(&counts),
        flags,
    }
}

/// 每个结论一行, 顺序与匹配引擎输出一致
pub fn build_rows(outcomes: &[MatchOutcome]) -> Vec<ReportRow> {
    outcomes
        .iter()
        .map(|outcome| {
            let record = outcome.primary_record();
            let (date_difference_days, within_date_tolerance) = match outcome {
                MatchOutcome::Matched {
                    date_difference_days,
                    within_date_tolerance,
                    ..
                } => (Some(*date_difference_days), Some(*within_date_tolerance)),
                _ => (None, None),
            };
            ReportRow {
                origin: record.origin,
                date: record.date,
                amount: record.amount.clone(),
                description: record.description.clone(),
                status: outcome.status(),
                date_difference_days,
                within_date_tolerance,
            }
        })
        .collect()
}

fn verdict(counts: &Counts) -> Verdict {
    if counts.missing > 0 {
        Verdict::Invalid
    } else if counts.orphan > 0 {
        Verdict::NeedsReview
    } else {
        Verdict::Valid
    }
}

fn flag(
    flag_type: FlagType,
    severity: Severity,
    message: &str,
    record: &TransactionRecord,
) -> Flag {
    Flag {
        flag_type,
        severity,
        message: message.to_string(),
        date: record.date,
        amount: record.amount.clone(),
        description: record.description.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Origin, OutcomeStatus};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn record(origin: Origin, seq: usize, day: u32, amount: &str) -> TransactionRecord {
        TransactionRecord::new(
            origin,
            seq,
            NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            dec(amount),
            format!("{origin} {seq}"),
        )
    }

    fn mixed_outcomes() -> Vec<MatchOutcome> {
        vec![
            MatchOutcome::Matched {
                bank_record: record(Origin::Bank, 0, 1, "100.00"),
                ledger_record: record(Origin::Ledger, 1, 2, "100.004"),
                date_difference_days: 1,
                within_date_tolerance: true,
            },
            MatchOutcome::Missing {
                bank_record: record(Origin::Bank, 1, 3, "-50.00"),
            },
            MatchOutcome::Matched {
                bank_record: record(Origin::Bank, 2, 4, "20.00"),
                ledger_record: record(Origin::Ledger, 2, 20, "20.00"),
                date_difference_days: 16,
                within_date_tolerance: false,
            },
            MatchOutcome::Orphan {
                ledger_record: record(Origin::Ledger, 0, 5, "7.50"),
            },
        ]
    }

    #[test]
    fn totals_and_counts() {
        let result = build(mixed_outcomes());

        assert_eq!(result.bank_total, dec("70.00"));
        assert_eq!(result.ledger_total, dec("127.504"));
        assert_eq!(result.balance_difference, dec("-57.504"));
        assert_eq!(
            result.counts,
            Counts {
                matched: 2,
                missing: 1,
                orphan: 1,
                total_bank: 3,
                total_ledger: 3,
            }
        );
        assert_eq!(result.date_mismatch, 1);
        assert_eq!(result.missing_amount, dec("-50.00"));
        assert_eq!(result.orphan_amount, dec("7.50"));
        assert!((result.completion_rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(result.verdict, Verdict::Invalid);
    }

    #[test]
    fn flags_follow_outcome_order() {
        let result = build(mixed_outcomes());
        let kinds: Vec<(FlagType, Severity)> = result
            .flags
            .iter()
            .map(|f| (f.flag_type, f.severity))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (FlagType::MissingData, Severity::Error),
                (FlagType::Inconsistency, Severity::Warning),
            ]
        );
        assert_eq!(result.flags[1].amount, dec("7.50"));
    }

    #[test]
    fn rows_mirror_outcomes() {
        let result = build(mixed_outcomes());
        let rows = result.rows();

        assert_eq!(rows.len(), 4);
        let summary: Vec<(Origin, OutcomeStatus, Option<i64>, Option<bool>)> = rows
            .iter()
            .map(|r| (r.origin, r.status, r.date_difference_days, r.within_date_tolerance))
            .collect();
        assert_eq!(
            summary,
            vec![
                (Origin::Bank, OutcomeStatus::Matched, Some(1), Some(true)),
                (Origin::Bank, OutcomeStatus::Missing, None, None),
                (Origin::Bank, OutcomeStatus::Matched, Some(16), Some(false)),
                (Origin::Ledger, OutcomeStatus::Orphan, None, None),
            ]
        );
        assert_eq!(rows[0].amount, dec("100.00"));
        assert_eq!(rows[3].description, "ledger 0");
    }

    #[test]
    fn verdict_levels() {
        let only_orphan = build(vec![MatchOutcome::Orphan {
            ledger_record: record(Origin::Ledger, 0, 1, "1"),
        }]);
        assert_eq!(only_orphan.verdict, Verdict::NeedsReview);
        assert_eq!(only_orphan.completion_rate, 0.0);

        let clean = build(vec![MatchOutcome::Matched {
            bank_record: record(Origin::Bank, 0, 1, "1"),
            ledger_record: record(Origin::Ledger, 0, 1, "1"),
            date_difference_days: 0,
            within_date_tolerance: true,
        }]);
        assert_eq!(clean.verdict, Verdict::Valid);
        assert!(clean.is_balanced(&dec("0.01")));
        assert!(clean.flags.is_empty());
    }

    #[test]
    fn empty_outcomes() {
        let result = build(Vec::new());
        assert_eq!(result.counts, Counts::default());
        assert_eq!(result.bank_total, BigDecimal::zero());
        assert_eq!(result.verdict, Verdict::Valid);
        assert!(result.rows().is_empty());
    }
}
