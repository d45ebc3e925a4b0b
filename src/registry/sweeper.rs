use chrono::{DateTime, Duration, Local, NaiveTime, TimeZone};
use std::sync::Arc;
use tokio::task::JoinHandle;

use super::JobRegistry;

const ONE_DAY: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

/// 过期清理策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// 任务最长保留时间
    pub max_age: Duration,
    /// 每日清理的本地时刻
    pub sweep_at: NaiveTime,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::hours(24),
            sweep_at: NaiveTime::MIN,
        }
    }
}

/// 启动后台清理任务: 先立即清理一次, 之后每天在 sweep_at 清理
pub fn spawn_daily_sweep(registry: Arc<JobRegistry>, policy: RetentionPolicy) -> JoinHandle<()> {
    tokio::spawn(async move {
        let removed = registry.sweep(policy.max_age).await;
        tracing::info!("Startup cleanup executed, removed {} job(s)", removed);

        loop {
            let wait = duration_until_next(&Local::now(), policy.sweep_at);
            tracing::debug!("Next cleanup in {}s", wait.as_secs());
            tokio::time::sleep(wait).await;

            let removed = registry.sweep(policy.max_age).await;
            tracing::info!("Daily cleanup executed, removed {} job(s)", removed);
        }
    })
}

/// 距下一次 (严格晚于 now) 本地时刻 at 的时长
///
/// 夏令时跳过该时刻时退回 24 小时。
pub fn duration_until_next<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> std::time::Duration {
    let mut day = now.date_naive();
    for _ in 0..2 {
        let candidate = now.timezone().from_local_datetime(&day.and_time(at)).earliest();
        if let Some(next) = candidate {
            if next > *now {
                return (next - now.clone()).to_std().unwrap_or(ONE_DAY);
            }
        }
        match day.succ_opt() {
            Some(d) => day = d,
            None => break,
        }
    }
    ONE_DAY
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn waits_until_midnight() {
        let wait = duration_until_next(&utc("2024-01-10T23:30:00Z"), at(0, 0));
        assert_eq!(wait, std::time::Duration::from_secs(30 * 60));
    }

    #[test]
    fn later_same_day() {
        let wait = duration_until_next(&utc("2024-01-10T10:00:00Z"), at(12, 15));
        assert_eq!(wait, std::time::Duration::from_secs(2 * 3600 + 15 * 60));
    }

    #[test]
    fn exact_time_schedules_next_day() {
        let wait = duration_until_next(&utc("2024-01-10T00:00:00Z"), at(0, 0));
        assert_eq!(wait, ONE_DAY);
    }

    #[tokio::test]
    async fn startup_sweep_runs_immediately() {
        let registry = Arc::new(JobRegistry::new());
        registry.create().await;
        registry.create().await;

        // 负的 max_age 让截止时间落在未来, 所有任务都算过期
        let policy = RetentionPolicy {
            max_age: Duration::seconds(-60),
            sweep_at: at(0, 0),
        };
        let handle = spawn_daily_sweep(registry.clone(), policy);

        for _ in 0..100 {
            if registry.is_empty().await {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(registry.is_empty().await);
        handle.abort();
    }
}
