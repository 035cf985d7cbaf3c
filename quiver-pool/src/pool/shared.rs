use super::engine::{InvalidationTarget, PoolEngine, PoolStats};
use parking_lot::Mutex;
use quiver_core::{EndpointRecord, PoolResult};
use std::sync::Arc;

/// 可在多个调用者之间共享的代理池
///
/// 一把互斥锁保护整个映射和时间戳状态。生产者在锁内同步调用，
/// 重载期间其他调用者会等待。
#[derive(Clone)]
pub struct SharedPool {
    inner: Arc<Mutex<PoolEngine>>,
}

impl SharedPool {
    pub fn new(engine: PoolEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn select_next(&self) -> PoolResult<Option<EndpointRecord>> {
        self.inner.lock().select_next()
    }

    pub fn mark_invalid<'a>(
        &self,
        target: impl Into<InvalidationTarget<'a>>,
    ) -> PoolResult<EndpointRecord> {
        self.inner.lock().mark_invalid(target)
    }

    pub fn reload(&self) -> PoolResult<()> {
        self.inner.lock().reload()
    }

    pub fn get(&self, identity: &str) -> Option<EndpointRecord> {
        self.inner.lock().get(identity).cloned()
    }

    pub fn records(&self) -> Vec<EndpointRecord> {
        self.inner.lock().records()
    }

    pub fn size(&self) -> usize {
        self.inner.lock().size()
    }

    pub fn valid_count(&self) -> usize {
        self.inner.lock().valid_count()
    }

    pub fn invalid_count(&self) -> usize {
        self.inner.lock().invalid_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats()
    }

    /// 在持锁状态下执行多个操作
    pub fn with_engine<R>(&self, f: impl FnOnce(&mut PoolEngine) -> R) -> R {
        let mut engine = self.inner.lock();
        f(&mut engine)
    }
}

impl From<PoolEngine> for SharedPool {
    fn from(engine: PoolEngine) -> Self {
        Self::new(engine)
    }
}
