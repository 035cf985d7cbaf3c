use super::producer::EndpointProducer;
use super::refresh::{RefreshPolicy, RefreshReason};
use super::selector::{EndpointSelector, SelectionKind};
use chrono::{DateTime, TimeDelta, Utc};
use quiver_core::{
    identity_key, parse_descriptor, Descriptor, EndpointRecord, PoolError, PoolResult,
    PoolSettings,
};
use std::collections::BTreeMap;

/// 标记失效的目标：身份键或记录
#[derive(Debug, Clone, Copy)]
pub enum InvalidationTarget<'a> {
    Identity(&'a str),
    Record(&'a EndpointRecord),
}

impl InvalidationTarget<'_> {
    /// 解析为映射中的身份键
    ///
    /// 记录使用其自身保存的身份键，带凭据的端点也能被正确定位。
    pub fn resolve(&self) -> String {
        match self {
            InvalidationTarget::Identity(identity) => identity_key(identity),
            InvalidationTarget::Record(record) => record.identity.clone(),
        }
    }
}

impl<'a> From<&'a str> for InvalidationTarget<'a> {
    fn from(identity: &'a str) -> Self {
        InvalidationTarget::Identity(identity)
    }
}

impl<'a> From<&'a String> for InvalidationTarget<'a> {
    fn from(identity: &'a String) -> Self {
        InvalidationTarget::Identity(identity)
    }
}

impl<'a> From<&'a EndpointRecord> for InvalidationTarget<'a> {
    fn from(record: &'a EndpointRecord) -> Self {
        InvalidationTarget::Record(record)
    }
}

/// 代理池引擎
///
/// 持有身份键到端点记录的映射，负责选择、标记失效和刷新。
/// 所有修改都以整条记录替换的方式进行，引擎内部不加锁；
/// 多个调用者共享时使用 [`super::SharedPool`]。
pub struct PoolEngine {
    endpoints: BTreeMap<String, EndpointRecord>,
    producer: Box<dyn EndpointProducer>,
    settings: PoolSettings,
    policy: RefreshPolicy,
    usage_threshold: TimeDelta,
    selector: EndpointSelector,
    last_reload_time: DateTime<Utc>,
    reload_count: u64,
    rejected_last_reload: usize,
    total_selections: u64,
}

impl PoolEngine {
    /// 创建代理池并立即调用一次生产者
    ///
    /// 参数非法时返回 `PoolError::Config`，此时不会调用生产者。
    pub fn new<P>(producer: P, settings: PoolSettings) -> PoolResult<Self>
    where
        P: EndpointProducer + 'static,
    {
        settings.validate()?;

        let policy = RefreshPolicy::new(settings.refresh_interval(), settings.load_factor);
        let usage_threshold = settings.usage_threshold();

        let mut engine = Self {
            endpoints: BTreeMap::new(),
            producer: Box::new(producer),
            selector: EndpointSelector::new(settings.seed),
            settings,
            policy,
            usage_threshold,
            last_reload_time: Utc::now(),
            reload_count: 0,
            rejected_last_reload: 0,
            total_selections: 0,
        };

        engine.load_endpoints()?;
        tracing::info!(
            "Initialized proxy pool with {} endpoints ({} rejected)",
            engine.endpoints.len(),
            engine.rejected_last_reload
        );
        Ok(engine)
    }

    /// 使用默认参数创建代理池
    pub fn with_defaults<P>(producer: P) -> PoolResult<Self>
    where
        P: EndpointProducer + 'static,
    {
        Self::new(producer, PoolSettings::default())
    }

    /// 重新调用生产者并整体替换映射
    ///
    /// 生产者出错时原映射保持不变，错误原样返回。
    pub fn reload(&mut self) -> PoolResult<()> {
        self.load_endpoints()?;
        self.reload_count += 1;
        tracing::info!(
            "Reloaded proxy pool: {} endpoints ({} rejected), reload #{}",
            self.endpoints.len(),
            self.rejected_last_reload,
            self.reload_count
        );
        Ok(())
    }

    fn load_endpoints(&mut self) -> PoolResult<()> {
        let descriptors = self
            .producer
            .produce()
            .map_err(PoolError::Producer)?
            .unwrap_or_default();

        let (endpoints, rejected) = build_endpoints(&descriptors);
        self.endpoints = endpoints;
        self.rejected_last_reload = rejected;
        self.last_reload_time = Utc::now();
        Ok(())
    }

    /// 选择下一个端点
    ///
    /// 先执行刷新检查；映射为空或没有有效端点时返回 `Ok(None)`。
    /// 只有刷新时生产者出错才会返回错误。
    pub fn select_next(&mut self) -> PoolResult<Option<EndpointRecord>> {
        self.run_refresh_checks()?;

        let now = Utc::now();
        let Some((identity, kind)) = self
            .selector
            .choose(&self.endpoints, now, self.usage_threshold)
        else {
            tracing::debug!(
                "No valid endpoint available (total: {}, invalid: {})",
                self.size(),
                self.invalid_count()
            );
            return Ok(None);
        };

        let Some(current) = self.endpoints.get(&identity) else {
            return Ok(None);
        };
        let updated = current.selected_at(now);
        self.endpoints.insert(identity, updated.clone());
        self.total_selections += 1;

        match kind {
            SelectionKind::Available => {
                tracing::debug!(
                    "Selected endpoint {} (usage_count: {})",
                    updated,
                    updated.usage_count
                );
            }
            SelectionKind::LeastRecentlyUsed => {
                tracing::warn!(
                    "All valid endpoints are cooling down, selected least recently used {} (usage_count: {})",
                    updated,
                    updated.usage_count
                );
            }
        }

        Ok(Some(updated))
    }

    /// 标记端点失效
    ///
    /// 目标不在当前映射中时返回 `PoolError::NotFound`，映射不变。
    pub fn mark_invalid<'a>(
        &mut self,
        target: impl Into<InvalidationTarget<'a>>,
    ) -> PoolResult<EndpointRecord> {
        let target: InvalidationTarget<'_> = target.into();
        let identity = target.resolve();

        let Some(current) = self.endpoints.get(&identity) else {
            tracing::debug!("Cannot invalidate unknown endpoint {}", identity);
            return Err(PoolError::not_found(identity));
        };

        let updated = current.invalidated_at(Utc::now());
        self.endpoints.insert(identity, updated.clone());
        tracing::debug!(
            "Marked endpoint {} as invalid ({} of {} now invalid)",
            updated,
            self.invalid_count(),
            self.size()
        );
        Ok(updated)
    }

    /// 按顺序执行间隔刷新和失效占比刷新
    fn run_refresh_checks(&mut self) -> PoolResult<()> {
        if self.policy.interval_due(self.last_reload_time, Utc::now()) {
            self.refresh(RefreshReason::Interval)?;
        }

        if self
            .policy
            .load_factor_exceeded(self.size(), self.invalid_count())
        {
            self.refresh(RefreshReason::LoadFactor)?;
        }

        Ok(())
    }

    fn refresh(&mut self, reason: RefreshReason) -> PoolResult<()> {
        tracing::debug!(
            "Refreshing proxy pool: {} (total: {}, invalid: {})",
            reason,
            self.size(),
            self.invalid_count()
        );
        self.reload()
    }

    pub fn get(&self, identity: &str) -> Option<&EndpointRecord> {
        self.endpoints.get(&identity_key(identity))
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.get(identity).is_some()
    }

    /// 所有记录的快照，按身份键排序
    pub fn records(&self) -> Vec<EndpointRecord> {
        self.endpoints.values().cloned().collect()
    }

    pub fn size(&self) -> usize {
        self.endpoints.len()
    }

    pub fn valid_count(&self) -> usize {
        self.endpoints.values().filter(|r| r.valid).count()
    }

    pub fn invalid_count(&self) -> usize {
        self.size() - self.valid_count()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    pub fn last_reload_time(&self) -> DateTime<Utc> {
        self.last_reload_time
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    /// 当前状态的快照
    pub fn stats(&self) -> PoolStats {
        let valid = self.valid_count();
        PoolStats {
            total: self.size(),
            valid,
            invalid: self.size() - valid,
            last_reload_time: self.last_reload_time,
            reload_count: self.reload_count,
            rejected_last_reload: self.rejected_last_reload,
            total_selections: self.total_selections,
        }
    }
}

/// 解析描述符并构建新映射，返回映射和被拒绝的数量
fn build_endpoints(descriptors: &[Descriptor]) -> (BTreeMap<String, EndpointRecord>, usize) {
    let mut endpoints = BTreeMap::new();
    let mut rejected = 0;

    for descriptor in descriptors {
        match parse_descriptor(descriptor) {
            Ok(record) => {
                endpoints.insert(record.identity.clone(), record);
            }
            Err(e) => {
                rejected += 1;
                tracing::warn!("Rejected endpoint descriptor {}: {}", descriptor, e);
            }
        }
    }

    (endpoints, rejected)
}

/// 代理池统计信息
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PoolStats {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub last_reload_time: DateTime<Utc>,
    /// 构造之后的重载次数
    pub reload_count: u64,
    /// 最近一次加载中被拒绝的描述符数量
    pub rejected_last_reload: usize,
    pub total_selections: u64,
}

impl PoolStats {
    /// 失效端点占比
    pub fn invalid_ratio(&self) -> f64 {
        if self.total > 0 {
            self.invalid as f64 / self.total as f64
        } else {
            0.0
        }
    }

    /// 是否还有可用端点
    pub fn is_healthy(&self) -> bool {
        self.valid > 0
    }
}
