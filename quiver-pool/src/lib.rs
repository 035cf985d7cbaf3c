//! Quiver Pool Library
//!
//! This library provides the proxy endpoint pool engine for the Quiver system including:
//! - Endpoint selection with cooldown and least-recently-used fallback
//! - Invalidation of broken endpoints
//! - Interval and load-factor refresh policies
//! - Shared pools and a name-based pool registry

pub mod pool;

// Re-export commonly used types
pub use pool::{
    from_fn, EndpointProducer, EndpointSelector, FileProducer, FnProducer, InvalidationTarget,
    PoolEngine, PoolRegistry, PoolStats, RefreshPolicy, RefreshReason, SelectionKind, SharedPool,
    StaticProducer,
};
pub use quiver_core::{EndpointRecord, PoolError, PoolResult, PoolSettings};
