//! # error 模块说明
//!
//! ## 角色定位（Why）
//! - 行集的数据面（`put_*`/`get_*`）从不返回错误：背压与超时以 `false`/`None` 表达；
//! - 只有构造期与配置期的误用需要显式失败，本模块集中定义这些失败语义。
//!
//! ## 设计要求（What）
//! - 错误类型派生 [`thiserror::Error`]，可直接交给 `anyhow` 等上层框架；
//! - 变体携带足够的上下文（变体名称、配置键、原始值），便于编排层在启动日志中定位问题。

use std::borrow::Cow;

use thiserror::Error;

/// crate 内统一的 `Result` 别名。
pub type Result<T, E = RowSetError> = core::result::Result<T, E>;

/// 行集构造与配置阶段的错误域。
///
/// # 教案式说明
/// - **意图 (Why)**：把“构造时就能发现的配置错误”与“运行中的背压”彻底分开，
///   让步骤的运行循环无需处理任何错误分支。
/// - **契约 (What)**：
///   - 所有变体均为 `Send + Sync + 'static`，可安全跨线程传播；
///   - 只在构造函数、工厂与配置校验中产生，绝不会在数据流转途中出现。
/// - **设计权衡 (Trade-offs)**：使用 `Cow<'static, str>` 保存配置键，静态键零分配，动态键按需分配。
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[non_exhaustive]
pub enum RowSetError {
    /// 有界变体要求容量为正。
    ///
    /// - **意图 (Why)**：容量为 0 的有界队列永远无法写入，步骤会在第一行处无限重试。
    /// - **契约 (What)**：`kind` 为变体名称，`capacity` 为调用方传入的原始值。
    #[error("row set `{kind}` requires a positive capacity, got {capacity}")]
    InvalidCapacity {
        kind: &'static str,
        capacity: usize,
    },

    /// 配置项取值非法。
    ///
    /// - **意图 (Why)**：配置来源（TOML、环境变量、编排层参数）可能携带不可用的值，
    ///   需要在启动期一次性暴露。
    /// - **契约 (What)**：`key` 为配置键，`value` 为原始取值的可读形式，`reason` 说明被拒绝的原因。
    #[error("invalid row set configuration `{key}` = `{value}`: {reason}")]
    InvalidConfiguration {
        key: Cow<'static, str>,
        value: String,
        reason: &'static str,
    },
}

impl RowSetError {
    /// 构造容量错误。
    pub fn invalid_capacity(kind: &'static str, capacity: usize) -> Self {
        Self::InvalidCapacity { kind, capacity }
    }

    /// 构造配置错误。
    pub fn invalid_configuration(
        key: impl Into<Cow<'static, str>>,
        value: impl ToString,
        reason: &'static str,
    ) -> Self {
        Self::InvalidConfiguration {
            key: key.into(),
            value: value.to_string(),
            reason,
        }
    }
}
