use crate::error::{PoolError, PoolResult};
use anyhow::Result;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
    /// 所有代理池共用的默认参数
    #[serde(default)]
    pub settings: PoolSettings,
    #[serde(default)]
    pub pools: HashMap<String, PoolConfig>,
}

/// 代理池参数
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct PoolSettings {
    /// 失效端点占比超过该值时强制重载
    #[serde(default = "default_load_factor")]
    pub load_factor: f64,
    /// 距上次重载超过该秒数时强制重载
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_seconds: f64,
    /// 端点被选中后的冷却秒数
    #[serde(default = "default_usage_threshold")]
    pub usage_threshold_seconds: f64,
    /// 随机选择的种子，不设置时使用系统熵
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            load_factor: default_load_factor(),
            refresh_interval_seconds: default_refresh_interval(),
            usage_threshold_seconds: default_usage_threshold(),
            seed: None,
        }
    }
}

impl PoolSettings {
    /// 校验构造参数
    pub fn validate(&self) -> PoolResult<()> {
        if !(0.0..=1.0).contains(&self.load_factor) {
            return Err(PoolError::config(
                "load_factor",
                format!("must be a number in [0, 1], got {}", self.load_factor),
            ));
        }

        if !self.refresh_interval_seconds.is_finite() || self.refresh_interval_seconds <= 0.0 {
            return Err(PoolError::config(
                "refresh_interval_seconds",
                format!(
                    "must be a positive number, got {}",
                    self.refresh_interval_seconds
                ),
            ));
        }

        if !self.usage_threshold_seconds.is_finite() || self.usage_threshold_seconds < 0.0 {
            return Err(PoolError::config(
                "usage_threshold_seconds",
                format!(
                    "must be a non-negative number, got {}",
                    self.usage_threshold_seconds
                ),
            ));
        }

        Ok(())
    }

    pub fn refresh_interval(&self) -> TimeDelta {
        seconds_to_delta(self.refresh_interval_seconds)
    }

    pub fn usage_threshold(&self) -> TimeDelta {
        seconds_to_delta(self.usage_threshold_seconds)
    }
}

/// 秒数转换为 `TimeDelta`，超出范围时饱和到 `TimeDelta::MAX`
fn seconds_to_delta(seconds: f64) -> TimeDelta {
    if seconds.is_nan() || seconds <= 0.0 {
        return TimeDelta::zero();
    }
    Duration::try_from_secs_f64(seconds)
        .ok()
        .and_then(|duration| TimeDelta::from_std(duration).ok())
        .unwrap_or(TimeDelta::MAX)
}

/// 单个代理池的配置
///
/// `endpoints` 与 `file` 二选一；其余字段覆盖全局 `settings`。
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PoolConfig {
    #[serde(default)]
    pub endpoints: Vec<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub load_factor: Option<f64>,
    #[serde(default)]
    pub refresh_interval_seconds: Option<f64>,
    #[serde(default)]
    pub usage_threshold_seconds: Option<f64>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            file: None,
            load_factor: None,
            refresh_interval_seconds: None,
            usage_threshold_seconds: None,
            seed: None,
            enabled: default_true(),
        }
    }
}

/// 端点列表的来源
#[derive(Debug, Clone, PartialEq)]
pub enum PoolSource {
    Inline(Vec<String>),
    File(PathBuf),
}

impl PoolConfig {
    /// 合并全局默认值后的参数
    pub fn effective_settings(&self, defaults: &PoolSettings) -> PoolSettings {
        PoolSettings {
            load_factor: self.load_factor.unwrap_or(defaults.load_factor),
            refresh_interval_seconds: self
                .refresh_interval_seconds
                .unwrap_or(defaults.refresh_interval_seconds),
            usage_threshold_seconds: self
                .usage_threshold_seconds
                .unwrap_or(defaults.usage_threshold_seconds),
            seed: self.seed.or(defaults.seed),
        }
    }

    pub fn source(&self) -> Result<PoolSource> {
        match (&self.file, self.endpoints.is_empty()) {
            (Some(_), false) => anyhow::bail!("both 'endpoints' and 'file' are set"),
            (Some(path), true) => Ok(PoolSource::File(path.clone())),
            (None, false) => Ok(PoolSource::Inline(self.endpoints.clone())),
            (None, true) => anyhow::bail!("neither 'endpoints' nor 'file' is set"),
        }
    }
}

impl Config {
    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        self.settings
            .validate()
            .map_err(|e| anyhow::anyhow!("Global settings are invalid: {}", e))?;

        for (pool_name, pool) in &self.pools {
            self.validate_pool_config(pool_name, pool)?;
        }

        Ok(())
    }

    fn validate_pool_config(&self, pool_name: &str, pool: &PoolConfig) -> Result<()> {
        if pool_name.trim().is_empty() {
            anyhow::bail!("Pool has empty name");
        }

        if pool_name.chars().any(char::is_whitespace) {
            anyhow::bail!(
                "Pool '{}' has invalid name format (cannot contain whitespace)",
                pool_name
            );
        }

        pool.source()
            .map_err(|e| anyhow::anyhow!("Pool '{}' has invalid source: {}", pool_name, e))?;

        if let Some(path) = &pool.file {
            if path.as_os_str().is_empty() {
                anyhow::bail!("Pool '{}' has empty file path", pool_name);
            }
        }

        pool.effective_settings(&self.settings)
            .validate()
            .map_err(|e| anyhow::anyhow!("Pool '{}' has invalid settings: {}", pool_name, e))?;

        Ok(())
    }

    /// 获取已启用的代理池名称（已排序）
    pub fn enabled_pools(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .pools
            .iter()
            .filter(|(_, pool)| pool.enabled)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn get_pool(&self, name: &str) -> Option<&PoolConfig> {
        self.pools.get(name)
    }
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_load_factor() -> f64 {
    0.8
}

fn default_refresh_interval() -> f64 {
    600.0 // 10分钟
}

fn default_usage_threshold() -> f64 {
    60.0
}
