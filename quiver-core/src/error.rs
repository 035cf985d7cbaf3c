use thiserror::Error;

/// 代理池错误类型
#[derive(Debug, Error)]
pub enum PoolError {
    /// 构造参数非法，不会产生任何代理池
    #[error("invalid pool setting '{field}': {reason}")]
    Config { field: &'static str, reason: String },

    /// 标记失效的目标不在当前映射中
    #[error("endpoint '{identity}' not found in pool")]
    NotFound { identity: String },

    /// 注册表中已存在同名代理池
    #[error("pool '{name}' already exists")]
    AlreadyExists { name: String },

    /// 生产者自身的错误，原样透传
    #[error(transparent)]
    Producer(anyhow::Error),
}

impl PoolError {
    pub fn config(field: &'static str, reason: impl Into<String>) -> Self {
        PoolError::Config {
            field,
            reason: reason.into(),
        }
    }

    pub fn already_exists(name: impl Into<String>) -> Self {
        PoolError::AlreadyExists { name: name.into() }
    }

    pub fn not_found(identity: impl Into<String>) -> Self {
        PoolError::NotFound {
            identity: identity.into(),
        }
    }
}

/// 描述符解析被拒绝的原因
///
/// 拒绝不会中断重载，只会被记录和计数
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("descriptor is not a string")]
    NotAString,
    #[error("descriptor has no '://' separator")]
    MissingSeparator,
    #[error("descriptor has nothing after '://'")]
    EmptyAddress,
    #[error("descriptor has no port segment")]
    MissingPort,
    #[error("descriptor has an empty host")]
    EmptyHost,
    #[error("port '{0}' is not a number")]
    InvalidPort(String),
    #[error("port {0} is outside 1-65535")]
    PortOutOfRange(i64),
}

pub type PoolResult<T> = std::result::Result<T, PoolError>;
