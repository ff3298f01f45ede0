//! 行集配置。
//!
//! # 设计目的（Why）
//! - 有界变体的默认等待时长与容量需要由运行环境调节，但数据面不应在每次读写时访问环境；
//! - 因此配置以显式值的形式在构造期传入：编排层在启动时读取一次（[`RowSetConfig::from_env`]
//!   或反序列化配置文件），之后所有行集都从同一份快照构造。
//!
//! # 契约说明（What）
//! - `capacity`：有界变体的行容量，默认 10 000，必须为正；
//! - `put_timeout_ms` / `get_timeout_ms`：`put_row` / `get_row` 的默认等待，默认 50 毫秒；
//! - `batching`：普通多线程执行模式下是否改用批量变体，默认关闭；
//! - 环境变量缺失或无法解析时回退到默认值，并以 `warn` 级日志记录被忽略的取值，从不报错。

use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Result, RowSetError};

/// 默认行容量。
pub const DEFAULT_CAPACITY: usize = 10_000;
/// `put_row` / `get_row` 的默认等待（毫秒）。
pub const DEFAULT_TIMEOUT_MS: u64 = 50;

/// 默认写等待覆盖项。
pub const ENV_PUT_TIMEOUT: &str = "SPARK_ROWSET_PUT_TIMEOUT";
/// 默认读等待覆盖项。
pub const ENV_GET_TIMEOUT: &str = "SPARK_ROWSET_GET_TIMEOUT";
/// 行容量覆盖项。
pub const ENV_SIZE: &str = "SPARK_ROWSET_SIZE";
/// 批量变体开关。
pub const ENV_BATCHING: &str = "SPARK_ROWSET_BATCHING";

/// 行集构造参数快照。
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RowSetConfig {
    capacity: usize,
    put_timeout_ms: u64,
    get_timeout_ms: u64,
    batching: bool,
}

impl Default for RowSetConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            put_timeout_ms: DEFAULT_TIMEOUT_MS,
            get_timeout_ms: DEFAULT_TIMEOUT_MS,
            batching: false,
        }
    }
}

impl RowSetConfig {
    pub fn builder() -> RowSetConfigBuilder {
        RowSetConfigBuilder::default()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn put_timeout(&self) -> Duration {
        Duration::from_millis(self.put_timeout_ms)
    }

    pub fn get_timeout(&self) -> Duration {
        Duration::from_millis(self.get_timeout_ms)
    }

    pub fn batching(&self) -> bool {
        self.batching
    }

    /// 从进程环境读取覆盖项。
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取覆盖项。
    ///
    /// # 逻辑解析（How）
    /// 1. 以默认值为起点；
    /// 2. 逐个查询覆盖项，能解析的取值覆盖默认值；
    /// 3. 无法解析（或容量为 0）的取值被忽略，并记录 `warn` 日志。
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(ms) = read_override(&lookup, ENV_PUT_TIMEOUT, parse_millis) {
            config.put_timeout_ms = ms;
        }
        if let Some(ms) = read_override(&lookup, ENV_GET_TIMEOUT, parse_millis) {
            config.get_timeout_ms = ms;
        }
        if let Some(capacity) = read_override(&lookup, ENV_SIZE, parse_capacity) {
            config.capacity = capacity;
        }
        if let Some(batching) = read_override(&lookup, ENV_BATCHING, parse_flag) {
            config.batching = batching;
        }
        config
    }

    /// 校验反序列化或手工构造得到的配置。
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(RowSetError::invalid_configuration(
                "capacity",
                self.capacity,
                "row set capacity must be positive",
            ));
        }
        Ok(())
    }
}

/// [`RowSetConfig`] 的构建器。
#[derive(Clone, Debug, Default)]
pub struct RowSetConfigBuilder {
    config: RowSetConfig,
}

impl RowSetConfigBuilder {
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.config.capacity = capacity;
        self
    }

    /// 设置默认写等待；亚毫秒部分被截断。
    pub fn put_timeout(mut self, timeout: Duration) -> Self {
        self.config.put_timeout_ms = duration_to_millis(timeout);
        self
    }

    /// 设置默认读等待；亚毫秒部分被截断。
    pub fn get_timeout(mut self, timeout: Duration) -> Self {
        self.config.get_timeout_ms = duration_to_millis(timeout);
        self
    }

    pub fn batching(mut self, batching: bool) -> Self {
        self.config.batching = batching;
        self
    }

    pub fn build(self) -> Result<RowSetConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn read_override<F, T>(lookup: &F, key: &'static str, parse: fn(&str) -> Option<T>) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    let parsed = parse(raw.trim());
    if parsed.is_none() {
        warn!(key, value = %raw, "ignoring unparsable row set override, using default");
    }
    parsed
}

fn parse_millis(raw: &str) -> Option<u64> {
    raw.parse().ok()
}

fn parse_capacity(raw: &str) -> Option<usize> {
    raw.parse().ok().filter(|capacity| *capacity > 0)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_uppercase().as_str() {
        "Y" | "YES" | "TRUE" | "1" => Some(true),
        "N" | "NO" | "FALSE" | "0" => Some(false),
        _ => None,
    }
}
