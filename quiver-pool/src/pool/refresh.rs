use chrono::{DateTime, TimeDelta, Utc};
use std::fmt;

/// 触发重载的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// 距上次重载超过刷新间隔
    Interval,
    /// 失效端点占比超过负载因子
    LoadFactor,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshReason::Interval => write!(f, "refresh interval elapsed"),
            RefreshReason::LoadFactor => write!(f, "invalid ratio above load factor"),
        }
    }
}

/// 刷新策略
///
/// 每次选择前按顺序检查两项：先间隔，再失效占比。两项相互独立，
/// 间隔检查触发重载后，占比检查针对新映射重新计算。
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    refresh_interval: TimeDelta,
    load_factor: f64,
}

impl RefreshPolicy {
    pub fn new(refresh_interval: TimeDelta, load_factor: f64) -> Self {
        Self {
            refresh_interval,
            load_factor,
        }
    }

    pub fn interval_due(&self, last_reload: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - last_reload > self.refresh_interval
    }

    pub fn load_factor_exceeded(&self, total: usize, invalid: usize) -> bool {
        if total == 0 {
            return false;
        }
        invalid as f64 / total as f64 > self.load_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_due_is_strict() {
        let policy = RefreshPolicy::new(TimeDelta::seconds(600), 0.8);
        let last = Utc::now();

        assert!(!policy.interval_due(last, last));
        assert!(!policy.interval_due(last, last + TimeDelta::seconds(600)));
        assert!(policy.interval_due(last, last + TimeDelta::seconds(601)));
    }

    #[test]
    fn test_load_factor_exceeded_is_strict() {
        let policy = RefreshPolicy::new(TimeDelta::seconds(600), 0.5);

        assert!(!policy.load_factor_exceeded(0, 0));
        assert!(!policy.load_factor_exceeded(4, 2));
        assert!(policy.load_factor_exceeded(4, 3));
    }

    #[test]
    fn test_zero_load_factor_reloads_on_first_invalid() {
        let policy = RefreshPolicy::new(TimeDelta::seconds(600), 0.0);

        assert!(!policy.load_factor_exceeded(10, 0));
        assert!(policy.load_factor_exceeded(10, 1));
    }

    #[test]
    fn test_full_load_factor_never_reloads() {
        let policy = RefreshPolicy::new(TimeDelta::seconds(600), 1.0);
        assert!(!policy.load_factor_exceeded(3, 3));
    }
}
