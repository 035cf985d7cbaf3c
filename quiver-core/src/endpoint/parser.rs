use super::record::EndpointRecord;
use crate::error::ParseError;
use serde_json::Value;

/// 生产者返回的原始描述符，类型不定，只有字符串会被接受
pub type Descriptor = Value;

const SCHEME_SEPARATOR: &str = "://";

/// 解析任意类型的描述符
pub fn parse_descriptor(descriptor: &Descriptor) -> Result<EndpointRecord, ParseError> {
    let raw = descriptor.as_str().ok_or(ParseError::NotAString)?;
    parse_descriptor_str(raw)
}

/// 解析描述符字符串
///
/// 语法: `scheme "://" [ username [ ":" password ] "@" ] host ":" port`
///
/// 协议段转为小写，主机和凭据原样保留。主机与端口按最后一个 `:` 分割，
/// 因此 `[::1]:8080` 这样的带括号IPv6地址可以被接受。
pub fn parse_descriptor_str(raw: &str) -> Result<EndpointRecord, ParseError> {
    let (scheme, rest) = raw
        .split_once(SCHEME_SEPARATOR)
        .ok_or(ParseError::MissingSeparator)?;

    if rest.is_empty() {
        return Err(ParseError::EmptyAddress);
    }

    let protocol = scheme.to_lowercase();

    let (credentials, address) = match rest.split_once('@') {
        Some((credentials, address)) => (Some(credentials), address),
        None => (None, rest),
    };

    let (username, password) = match credentials {
        Some(credentials) => match credentials.split_once(':') {
            Some((user, pass)) => (Some(user.to_string()), Some(pass.to_string())),
            None => (Some(credentials.to_string()), None),
        },
        None => (None, None),
    };

    let (host, port) = address.rsplit_once(':').ok_or(ParseError::MissingPort)?;
    if host.is_empty() {
        return Err(ParseError::EmptyHost);
    }

    let port = parse_port(port)?;
    let identity = format!("{protocol}{SCHEME_SEPARATOR}{rest}");

    Ok(EndpointRecord::new(
        identity,
        protocol,
        host.to_string(),
        port,
        username,
        password,
    ))
}

fn parse_port(raw: &str) -> Result<u16, ParseError> {
    let port: i64 = raw
        .parse()
        .map_err(|_| ParseError::InvalidPort(raw.to_string()))?;

    if port <= 0 || port > i64::from(u16::MAX) {
        return Err(ParseError::PortOutOfRange(port));
    }

    u16::try_from(port).map_err(|_| ParseError::PortOutOfRange(port))
}

/// 描述符的身份键，不解析其余部分
///
/// 与解析成功时记录上的 `identity` 一致；没有 `://` 时原样返回。
pub fn identity_key(raw: &str) -> String {
    match raw.split_once(SCHEME_SEPARATOR) {
        Some((scheme, rest)) => format!("{}{SCHEME_SEPARATOR}{rest}", scheme.to_lowercase()),
        None => raw.to_string(),
    }
}
