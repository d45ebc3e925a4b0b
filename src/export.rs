use csv::Writer;

use crate::error::{ExportError, Result};
use crate::models::ReportRow;

/// 导出列 (顺序是对外契约)
pub const CSV_HEADER: [&str; 7] = [
    "origin",
    "date",
    "amount",
    "description",
    "status",
    "date_difference_days",
    "within_date_tolerance",
];

/// 将 Option 转换为 CSV 字符串
fn option_to_csv<T: ToString>(val: &Option<T>) -> String {
    val.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// 导出结果行为 CSV 文本
pub fn rows_to_csv(rows: &[ReportRow]) -> Result<String> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER).map_err(ExportError::from)?;

    for row in rows {
        writer
            .write_record(&[
                row.origin.to_string(),
                row.date.format("%Y-%m-%d").to_string(),
                row.amount.to_string(),
                row.description.clone(),
                row.status.to_string(),
                option_to_csv(&row.date_difference_days),
                option_to_csv(&row.within_date_tolerance),
            ])
            .map_err(ExportError::from)?;
    }

    writer.flush().map_err(ExportError::from)?;
    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::from(err.into_error()))?;
    Ok(String::from_utf8(bytes).map_err(ExportError::from)?)
}

/// 导出结果行为 JSON 数组 (记录格式)
pub fn rows_to_json(rows: &[ReportRow]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows).map_err(ExportError::from)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Origin, OutcomeStatus};
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn rows() -> Vec<ReportRow> {
        vec![
            ReportRow {
                origin: Origin::Bank,
                date: NaiveDate::from_ymd_opt(2024, 1, 10).unwrap(),
                amount: BigDecimal::from_str("100.00").unwrap(),
                description: "Bonifico, rif. 42".to_string(),
                status: OutcomeStatus::Matched,
                date_difference_days: Some(2),
                within_date_tolerance: Some(true),
            },
            ReportRow {
                origin: Origin::Ledger,
                date: NaiveDate::from_ymd_opt(2024, 1, 11).unwrap(),
                amount: BigDecimal::from_str("-20.5").unwrap(),
                description: "storno".to_string(),
                status: OutcomeStatus::Orphan,
                date_difference_days: None,
                within_date_tolerance: None,
            },
        ]
    }

    #[test]
    fn csv_has_header_and_blank_cells() {
        let csv = rows_to_csv(&rows()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines,
            vec![
                "origin,date,amount,description,status,date_difference_days,within_date_tolerance",
                "bank,2024-01-10,100.00,\"Bonifico, rif. 42\",matched,2,true",
                "ledger,2024-01-11,-20.5,storno,orphan,,",
            ]
        );
    }

    #[test]
    fn csv_of_no_rows_is_header_only() {
        let csv = rows_to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }

    #[test]
    fn json_is_record_oriented() {
        let json = rows_to_json(&rows()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let first = &value[0];
        assert_eq!(first["origin"], "bank");
        assert_eq!(first["status"], "matched");
        assert_eq!(first["date"], "2024-01-10");
        assert_eq!(first["date_difference_days"], 2);
        assert!(value[1]["within_date_tolerance"].is_null());
    }
}
