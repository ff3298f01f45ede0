//! 行集通道契约。
//!
//! # 教案级导览
//!
//! - **Why**：编排层在接线时按执行模式挑选变体，步骤线程只面向 `Arc<dyn RowSet>` 编程，
//!   因此契约必须对象安全，且五种变体可以互相替换。
//! - **How**：缓冲语义由各变体实现；身份、结束标志、行结构等公共状态通过 [`RowSet::base`]
//!   暴露给默认方法，变体无需重复实现。
//! - **What**：
//!   - `put_*` 返回 `false`、`get_*` 返回 `None` 只代表“这一次没成功”（超时或暂时为空），从不代表故障；
//!   - 消费者拿到 `None` 后必须检查 [`RowSet::is_done`]：为 `false` 则稍后重试；为 `true` 时再取一次，
//!     仍为 `None` 才说明通道已排空；
//!   - 在 [`RowSet::set_done`] 之后继续 `put` 属于调用方违约，通道不做拦截。

use std::{cmp::Ordering, fmt, sync::Arc, time::Duration};

use crate::{
    base::{BaseRowSet, DestinationKey, RowSetIdentity},
    row::{Row, SchemaRef},
};

/// 单生产者、单消费者的行通道。
///
/// # 契约说明（What）
/// - **线程模型**：同一实例恰好由一个生产者线程与一个消费者线程共享；
///   编排线程只触碰身份字段，监控线程只调用 `size`/`is_blocking`/`Display`；
/// - **顺序**：单个实例内严格保持生产者写入顺序；不同实例之间没有任何顺序保证；
/// - **所有权**：`put` 时行的所有权转移给通道，失败时行被丢弃。[`Row`] 的克隆只是句柄复制，
///   需要重试的调用方应在重试前自行克隆；
/// - **挂起点**：只有 `put_row`/`put_row_wait`/`get_row`/`get_row_wait` 可能挂起，且不超过给定或默认时长。
pub trait RowSet: Send + Sync {
    /// 公共身份与结束标志。
    fn base(&self) -> &BaseRowSet;

    /// 以变体的默认等待时长写入一行。
    fn put_row(&self, schema: &SchemaRef, row: Row) -> bool;

    /// 以调用方指定的最长等待写入一行。
    fn put_row_wait(&self, schema: &SchemaRef, row: Row, wait: Duration) -> bool;

    /// 以变体的默认等待时长读取一行。
    fn get_row(&self) -> Option<Row>;

    /// 不挂起的读取。
    fn get_row_immediate(&self) -> Option<Row>;

    /// 以调用方指定的最长等待读取一行。
    fn get_row_wait(&self, wait: Duration) -> Option<Row>;

    /// 当前缓冲的行数；批量变体返回近似值。
    fn size(&self) -> usize;

    /// 清空缓冲并把结束标志复位为开放。
    fn clear(&self);

    /// 生产者声明不再写入。只能由生产者线程调用一次，不得丢弃已缓冲的行。
    fn set_done(&self) {
        self.base().mark_done();
    }

    fn is_done(&self) -> bool {
        self.base().is_done()
    }

    /// 当前是否正处于阻塞等待中；只有活性上报变体会返回 `true`。
    fn is_blocking(&self) -> bool {
        false
    }

    fn row_schema(&self) -> Option<SchemaRef> {
        self.base().row_schema()
    }

    fn set_row_schema(&self, schema: &SchemaRef) {
        self.base().set_row_schema(schema);
    }

    fn identity(&self) -> RowSetIdentity {
        self.base().identity()
    }

    fn origin_step_name(&self) -> Option<Arc<str>> {
        self.base().origin_step_name()
    }

    fn origin_step_copy(&self) -> u32 {
        self.base().origin_step_copy()
    }

    fn destination_step_name(&self) -> Option<Arc<str>> {
        self.base().destination_step_name()
    }

    fn destination_step_copy(&self) -> u32 {
        self.base().destination_step_copy()
    }

    fn remote_peer(&self) -> Option<Arc<str>> {
        self.base().remote_peer()
    }

    fn set_remote_peer(&self, peer: Option<&str>) {
        self.base().set_remote_peer(peer);
    }

    /// 编排层接线入口：接线时调用一次，之后只允许在显式重分区时再次调用。
    fn set_thread_name_from_to_copy(&self, from: &str, from_copy: u32, to: &str, to_copy: u32) {
        self.base()
            .set_thread_name_from_to_copy(from, from_copy, to, to_copy);
    }

    fn destination_key(&self) -> DestinationKey {
        self.base().destination_key()
    }

    /// 与展示格式一致的名称，供按名查找使用。
    fn name(&self) -> String {
        self.base().to_string()
    }
}

impl fmt::Display for dyn RowSet + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.base(), f)
    }
}

impl fmt::Debug for dyn RowSet + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowSet")
            .field("name", &self.name())
            .field("size", &self.size())
            .field("done", &self.is_done())
            .finish()
    }
}

impl PartialEq for dyn RowSet + '_ {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for dyn RowSet + '_ {}

impl PartialOrd for dyn RowSet + '_ {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for dyn RowSet + '_ {
    fn cmp(&self, other: &Self) -> Ordering {
        self.base().compare(other.base())
    }
}

/// 为具体变体实现与 `dyn RowSet` 一致的展示格式。
macro_rules! impl_row_set_display {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ::std::fmt::Display for $ty {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    ::std::fmt::Display::fmt($crate::contract::RowSet::base(self), f)
                }
            }
        )+
    };
}

pub(crate) use impl_row_set_display;
