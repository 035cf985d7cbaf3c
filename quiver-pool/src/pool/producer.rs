use anyhow::{Context, Result};
use quiver_core::Descriptor;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// 端点生产者接口
///
/// 池引擎在构造和每次重载时同步调用一次 `produce`。
/// 返回 `Ok(None)` 表示没有结果，与空列表等价；返回的错误会原样
/// 传递给 `reload()` / `select_next()` 的调用者，引擎不重试。
///
/// 引擎不提供超时，需要限制耗时的调用者应自行包装生产者。
pub trait EndpointProducer: Send {
    fn produce(&mut self) -> Result<Option<Vec<Descriptor>>>;
}

impl<P: EndpointProducer + ?Sized> EndpointProducer for Box<P> {
    fn produce(&mut self) -> Result<Option<Vec<Descriptor>>> {
        (**self).produce()
    }
}

/// 闭包生产者，见 [`from_fn`]
pub struct FnProducer<F> {
    func: F,
}

/// 用闭包构造生产者，闭包可以持有状态
pub fn from_fn<F>(func: F) -> FnProducer<F>
where
    F: FnMut() -> Result<Option<Vec<Descriptor>>> + Send,
{
    FnProducer { func }
}

impl<F> EndpointProducer for FnProducer<F>
where
    F: FnMut() -> Result<Option<Vec<Descriptor>>> + Send,
{
    fn produce(&mut self) -> Result<Option<Vec<Descriptor>>> {
        (self.func)()
    }
}

/// 固定列表生产者，每次返回相同的描述符
#[derive(Debug, Clone)]
pub struct StaticProducer {
    descriptors: Vec<Descriptor>,
}

impl StaticProducer {
    pub fn new<I, S>(descriptors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            descriptors: descriptors
                .into_iter()
                .map(|d| Value::String(d.into()))
                .collect(),
        }
    }

    /// 直接使用任意类型的描述符
    pub fn from_values(descriptors: Vec<Descriptor>) -> Self {
        Self { descriptors }
    }
}

impl EndpointProducer for StaticProducer {
    fn produce(&mut self) -> Result<Option<Vec<Descriptor>>> {
        Ok(Some(self.descriptors.clone()))
    }
}

/// 文件生产者
///
/// 每次调用都重新读取文件，文件内容可以是JSON数组，
/// 也可以是每行一个描述符（忽略空行和 `#` 注释）。
#[derive(Debug, Clone)]
pub struct FileProducer {
    path: PathBuf,
}

impl FileProducer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EndpointProducer for FileProducer {
    fn produce(&mut self) -> Result<Option<Vec<Descriptor>>> {
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read endpoint file '{}'", self.path.display()))?;

        let descriptors = parse_descriptor_list(&content).with_context(|| {
            format!("failed to parse endpoint file '{}'", self.path.display())
        })?;

        tracing::debug!(
            "Read {} descriptors from {}",
            descriptors.len(),
            self.path.display()
        );
        Ok(Some(descriptors))
    }
}

fn parse_descriptor_list(content: &str) -> Result<Vec<Descriptor>> {
    if content.trim_start().starts_with('[') {
        return Ok(serde_json::from_str(content)?);
    }

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| Value::String(line.to_string()))
        .collect())
}
