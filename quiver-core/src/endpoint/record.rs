use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 单个代理端点及其健康/使用元数据
///
/// 记录本身视为不可变值：选择或失效时由池引擎用
/// [`EndpointRecord::selected_at`] / [`EndpointRecord::invalidated_at`]
/// 生成新副本整体替换旧记录。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointRecord {
    /// 映射中使用的身份键（协议段小写后的原始描述符）
    pub identity: String,
    pub protocol: String,
    pub host: String,
    pub port: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    pub valid: bool,
    #[serde(default)]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub usage_count: u64,
}

impl EndpointRecord {
    /// 新解析出的记录：有效、未使用
    pub fn new(
        identity: String,
        protocol: String,
        host: String,
        port: u16,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            identity,
            protocol,
            host,
            port,
            username,
            password,
            valid: true,
            last_used_at: None,
            usage_count: 0,
        }
    }

    /// 由协议、主机、端口重建的地址键，不含凭据
    ///
    /// 只有无凭据的描述符，这个键才会与 `identity` 相同。
    pub fn address_key(&self) -> String {
        format!("{}://{}:{}", self.protocol, self.host, self.port)
    }

    pub fn has_credentials(&self) -> bool {
        self.username.is_some()
    }

    /// 完整代理URL，包含凭据（如有）
    pub fn proxy_url(&self) -> String {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => {
                format!("{}://{}:{}@{}:{}", self.protocol, user, pass, self.host, self.port)
            }
            (Some(user), None) => format!("{}://{}@{}:{}", self.protocol, user, self.host, self.port),
            _ => self.address_key(),
        }
    }

    /// 冷却期已过（或从未使用）且仍然有效
    pub fn is_available(&self, now: DateTime<Utc>, usage_threshold: TimeDelta) -> bool {
        if !self.valid {
            return false;
        }
        match self.last_used_at {
            None => true,
            Some(last_used) => now - last_used > usage_threshold,
        }
    }

    /// 被选中后的副本
    pub fn selected_at(&self, now: DateTime<Utc>) -> Self {
        Self {
            last_used_at: Some(now),
            usage_count: self.usage_count.saturating_add(1),
            ..self.clone()
        }
    }

    /// 标记失效后的副本，使用计数不变
    pub fn invalidated_at(&self, now: DateTime<Utc>) -> Self {
        Self {
            valid: false,
            last_used_at: Some(now),
            ..self.clone()
        }
    }
}

/// 日志友好的显示形式，不输出凭据
impl fmt::Display for EndpointRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.protocol, self.host, self.port)
    }
}
