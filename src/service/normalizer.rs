use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ReconError, Result};
use crate::models::{Origin, TransactionRecord};

/// 支持的日期格式 (ISO 优先)
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y"];

/// 金额小数位数 (及十进制指数) 的上限
pub const MAX_AMOUNT_SCALE: i64 = 18;

/// 抽取层交付的原始行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordInput {
    pub date: String,
    pub amount: RawAmount,
    #[serde(default)]
    pub description: String,
}

/// 金额可以是文本或 JSON 数字
///
/// JSON 数字按原文保存 (serde_json `arbitrary_precision`), 不经过 f64。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl From<&str> for RawAmount {
    fn from(text: &str) -> Self {
        RawAmount::Text(text.to_string())
    }
}

impl fmt::Display for RawAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawAmount::Number(n) => write!(f, "{}", n),
            RawAmount::Text(s) => f.write_str(s),
        }
    }
}

impl RecordInput {
    pub fn new(date: impl Into<String>, amount: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            amount: RawAmount::Text(amount.into()),
            description: description.into(),
        }
    }
}

/// 将原始行转换为带来源和顺序号的交易记录
pub fn normalize(origin: Origin, inputs: &[RecordInput]) -> Result<Vec<TransactionRecord>> {
    inputs
        .iter()
        .enumerate()
        .map(|(idx, input)| {
            let date = parse_date(&input.date).ok_or_else(|| {
                ReconError::validation(format!(
                    "{} row {}: unparseable date '{}'",
                    origin, idx, input.date
                ))
            })?;
            let amount = parse_amount(&input.amount).ok_or_else(|| {
                ReconError::validation(format!(
                    "{} row {}: unparseable amount '{}'",
                    origin, idx, input.amount
                ))
            })?;
            if !within_scale(&amount) {
                return Err(ReconError::validation(format!(
                    "{} row {}: amount '{}' exceeds {} decimal places",
                    origin, idx, input.amount, MAX_AMOUNT_SCALE
                )));
            }
            Ok(TransactionRecord::new(
                origin,
                idx,
                date,
                amount,
                input.description.trim(),
            ))
        })
        .collect()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

pub fn parse_amount(raw: &RawAmount) -> Option<BigDecimal> {
    let text = raw.to_string();
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    BigDecimal::from_str(text).ok()
}

/// 指数过大的金额会让后续加减法按 10^scale 重新缩放
pub fn within_scale(amount: &BigDecimal) -> bool {
    let (_, exponent) = amount.as_bigint_and_exponent();
    exponent.abs() <= MAX_AMOUNT_SCALE
}
