use bigdecimal::BigDecimal;
use chrono::{Duration, NaiveTime};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::registry::RetentionPolicy;
use crate::service::MatchTolerance;

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub reconciliation: ReconciliationConfig,
    pub retention: RetentionConfig,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    pub amount_tolerance: BigDecimal,
    pub date_tolerance_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionConfig {
    pub max_age_hours: i64,
    /// 本地时间 HH:MM
    pub sweep_time: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            reconciliation: ReconciliationConfig {
                amount_tolerance: MatchTolerance::default().amount,
                date_tolerance_days: 5,
            },
            retention: RetentionConfig {
                max_age_hours: 24,
                sweep_time: "00:00".to_string(),
            },
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// 从环境变量加载配置 (前缀 RECON, 层级分隔符 __, 如 RECON_SERVER__PORT)
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let defaults = Self::default();
        config::Config::builder()
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", i64::from(defaults.server.port))?
            .set_default(
                "reconciliation.amount_tolerance",
                defaults.reconciliation.amount_tolerance.to_string(),
            )?
            .set_default(
                "reconciliation.date_tolerance_days",
                i64::from(defaults.reconciliation.date_tolerance_days),
            )?
            .set_default("retention.max_age_hours", defaults.retention.max_age_hours)?
            .set_default("retention.sweep_time", defaults.retention.sweep_time)?
            .set_default("log_level", defaults.log_level)?
            .add_source(
                config::Environment::with_prefix("RECON")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    pub fn tolerance(&self) -> MatchTolerance {
        MatchTolerance::new(
            self.reconciliation.amount_tolerance.clone(),
            self.reconciliation.date_tolerance_days,
        )
    }

    pub fn retention_policy(&self) -> Result<RetentionPolicy, String> {
        let sweep_at = NaiveTime::parse_from_str(self.retention.sweep_time.trim(), "%H:%M")
            .map_err(|e| format!("invalid sweep_time '{}': {}", self.retention.sweep_time, e))?;
        let hours = self.retention.max_age_hours;
        if hours <= 0 {
            return Err(format!("retention max_age_hours must be positive, got {}", hours));
        }
        let max_age = Duration::try_hours(hours)
            .ok_or_else(|| format!("retention max_age_hours {} is out of range", hours))?;
        Ok(RetentionPolicy { max_age, sweep_at })
    }

    pub fn log_level(&self) -> tracing::Level {
        tracing::Level::from_str(self.log_level.trim()).unwrap_or(tracing::Level::INFO)
    }
}
