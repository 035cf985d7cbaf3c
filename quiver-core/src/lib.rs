//! Quiver Core Library
//!
//! This library provides core functionality for the Quiver proxy pool system including:
//! - Endpoint records and descriptor parsing
//! - Configuration management
//! - Shared error types

pub mod config;
pub mod endpoint;
pub mod error;

// Re-export commonly used types
pub use config::model::{Config, PoolConfig, PoolSettings, PoolSource};
pub use endpoint::{
    identity_key, parse_descriptor, parse_descriptor_str, Descriptor, EndpointRecord,
};
pub use error::{ParseError, PoolError, PoolResult};
