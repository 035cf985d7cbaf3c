pub mod engine;
pub mod producer;
pub mod refresh;
pub mod registry;
pub mod selector;
pub mod shared;

#[cfg(test)]
mod registry_tests;

pub use engine::{InvalidationTarget, PoolEngine, PoolStats};
pub use producer::{from_fn, EndpointProducer, FileProducer, FnProducer, StaticProducer};
pub use refresh::{RefreshPolicy, RefreshReason};
pub use registry::PoolRegistry;
pub use selector::{EndpointSelector, SelectionKind};
pub use shared::SharedPool;
