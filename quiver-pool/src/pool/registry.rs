use super::engine::PoolEngine;
use super::producer::{EndpointProducer, FileProducer, StaticProducer};
use super::shared::SharedPool;
use anyhow::Result;
use parking_lot::RwLock;
use quiver_core::{Config, PoolError, PoolResult, PoolSettings, PoolSource};
use std::collections::HashMap;

/// 代理池注册表
///
/// 按名称管理代理池，由拥有代理池生命周期的一方显式创建和持有。
#[derive(Default)]
pub struct PoolRegistry {
    pools: RwLock<HashMap<String, SharedPool>>,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据配置创建所有已启用的代理池
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let registry = Self::new();
        for name in config.enabled_pools() {
            let Some(pool) = config.get_pool(&name) else {
                continue;
            };

            let producer: Box<dyn EndpointProducer> = match pool.source()? {
                PoolSource::Inline(endpoints) => Box::new(StaticProducer::new(endpoints)),
                PoolSource::File(path) => {
                    let producer = FileProducer::new(path);
                    tracing::debug!(
                        "Pool '{}' reads endpoints from {}",
                        name,
                        producer.path().display()
                    );
                    Box::new(producer)
                }
            };

            registry
                .create(&name, producer, pool.effective_settings(&config.settings))
                .map_err(|e| anyhow::anyhow!("Failed to create pool '{}': {}", name, e))?;
        }

        tracing::info!("Initialized {} proxy pools", registry.len());
        Ok(registry)
    }

    /// 创建并注册代理池
    ///
    /// 名称为空或已存在时返回错误，生产者不会被调用。
    pub fn create<P>(&self, name: &str, producer: P, settings: PoolSettings) -> PoolResult<SharedPool>
    where
        P: EndpointProducer + 'static,
    {
        if name.trim().is_empty() {
            return Err(PoolError::config("name", "pool name cannot be empty"));
        }
        if self.exists(name) {
            return Err(PoolError::already_exists(name));
        }

        // 在锁外构造，避免生产者调用阻塞注册表
        let pool = SharedPool::new(PoolEngine::new(producer, settings)?);

        let mut pools = self.pools.write();
        if pools.contains_key(name) {
            return Err(PoolError::already_exists(name));
        }
        pools.insert(name.to_string(), pool.clone());
        tracing::info!("Registered proxy pool '{}' ({} endpoints)", name, pool.size());
        Ok(pool)
    }

    pub fn lookup(&self, name: &str) -> Option<SharedPool> {
        self.pools.read().get(name).cloned()
    }

    pub fn exists(&self, name: &str) -> bool {
        self.pools.read().contains_key(name)
    }

    /// 移除代理池，返回被移除的池（如存在）
    pub fn remove(&self, name: &str) -> Option<SharedPool> {
        let removed = self.pools.write().remove(name);
        if removed.is_some() {
            tracing::info!("Removed proxy pool '{}'", name);
        }
        removed
    }

    /// 所有代理池名称（已排序）
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.pools.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn clear(&self) {
        let mut pools = self.pools.write();
        tracing::info!("Clearing {} proxy pools", pools.len());
        pools.clear();
    }

    pub fn len(&self) -> usize {
        self.pools.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.read().is_empty()
    }
}
