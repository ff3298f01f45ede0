//! 行集的身份、结束标志与排序支持。
//!
//! # 模块角色（Why）
//! - 五种行集变体共享同一套“身份 + 结束标志 + 行结构挂接”状态，本模块以可嵌入的
//!   [`BaseRowSet`] 结构体承载它们，各变体按值组合，不存在继承链；
//! - 身份字段由编排线程在接线与重分区时写入，由两端步骤线程、监控与日志频繁读取，
//!   因此采用读写锁：读多写少，读者之间互不阻塞。
//!
//! # 排序契约（What）
//! - 比较、相等与排序只看**目标三元组**（远端节点名、目标步骤名、目标副本号），从不看来源；
//!   这样重分区之后，无论哪一端发起重排，行集都能以相同的相对顺序重新挂接；
//! - 展示格式为 `来源.副本 - 目标.副本`，设置了远端节点时追加 ` (远端节点)`，缺失的名称显示为 `?`。

use std::{
    cmp::Ordering as CmpOrdering,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use arc_swap::ArcSwapOption;
use parking_lot::RwLock;

use crate::row::{RowSchema, SchemaRef};

/// 行集身份快照。
///
/// 字段以 `Arc<str>` 保存，读取方克隆快照的成本是若干次引用计数递增。
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RowSetIdentity {
    pub origin_step: Option<Arc<str>>,
    pub origin_copy: u32,
    pub destination_step: Option<Arc<str>>,
    pub destination_copy: u32,
    pub remote_peer: Option<Arc<str>>,
}

impl RowSetIdentity {
    /// 提取参与比较的目标三元组。
    pub fn destination_key(&self) -> DestinationKey {
        DestinationKey {
            remote_peer: self.remote_peer.clone(),
            destination_step: self.destination_step.clone(),
            destination_copy: self.destination_copy,
        }
    }
}

impl fmt::Display for RowSetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} - {}.{}",
            self.origin_step.as_deref().unwrap_or("?"),
            self.origin_copy,
            self.destination_step.as_deref().unwrap_or("?"),
            self.destination_copy
        )?;
        match self.remote_peer.as_deref() {
            Some(peer) if !peer.is_empty() => write!(f, " ({peer})"),
            _ => Ok(()),
        }
    }
}

/// 行集的全序键：远端节点名、目标步骤名、目标副本号，按此顺序逐项比较。
///
/// 未设置的名称排在任何已设置的名称之前；副本号按数值比较。
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DestinationKey {
    pub remote_peer: Option<Arc<str>>,
    pub destination_step: Option<Arc<str>>,
    pub destination_copy: u32,
}

/// 所有变体按值嵌入的公共状态。
///
/// # 契约说明（What）
/// - **线程安全**：身份字段由 [`RwLock`] 保护，结束标志为原子布尔，行结构引用由 [`ArcSwapOption`] 无锁发布；
/// - **结束标志**：[`mark_done`](Self::mark_done) 以 `Release` 写入，[`is_done`](Self::is_done) 以 `Acquire` 读取，
///   生产者在置位前写入缓冲的所有行对观察到结束标志的消费者可见；
/// - **行结构**：首次 `put` 挂接，后续 `put` 携带不同的结构引用时以最新者为准。
#[derive(Default)]
pub struct BaseRowSet {
    identity: RwLock<RowSetIdentity>,
    done: AtomicBool,
    schema: ArcSwapOption<RowSchema>,
}

impl BaseRowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 身份快照。
    pub fn identity(&self) -> RowSetIdentity {
        self.identity.read().clone()
    }

    pub fn destination_key(&self) -> DestinationKey {
        self.identity.read().destination_key()
    }

    pub fn origin_step_name(&self) -> Option<Arc<str>> {
        self.identity.read().origin_step.clone()
    }

    pub fn origin_step_copy(&self) -> u32 {
        self.identity.read().origin_copy
    }

    pub fn destination_step_name(&self) -> Option<Arc<str>> {
        self.identity.read().destination_step.clone()
    }

    pub fn destination_step_copy(&self) -> u32 {
        self.identity.read().destination_copy
    }

    pub fn remote_peer(&self) -> Option<Arc<str>> {
        self.identity.read().remote_peer.clone()
    }

    /// 设置远端节点名；空字符串等同于清除。
    pub fn set_remote_peer(&self, peer: Option<&str>) {
        self.identity.write().remote_peer = peer.filter(|p| !p.is_empty()).map(Arc::from);
    }

    /// 一次性写入来源与目标端点。
    pub fn set_thread_name_from_to_copy(&self, from: &str, from_copy: u32, to: &str, to_copy: u32) {
        let mut identity = self.identity.write();
        identity.origin_step = Some(Arc::from(from));
        identity.origin_copy = from_copy;
        identity.destination_step = Some(Arc::from(to));
        identity.destination_copy = to_copy;
    }

    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    pub fn mark_done(&self) {
        self.done.store(true, Ordering::Release);
    }

    /// 把结束标志复位为“开放”，仅供 `clear()` 使用。
    pub fn reopen(&self) {
        self.done.store(false, Ordering::Release);
    }

    pub fn row_schema(&self) -> Option<SchemaRef> {
        self.schema.load_full()
    }

    pub fn set_row_schema(&self, schema: &SchemaRef) {
        self.schema.store(Some(Arc::clone(schema)));
    }

    /// `put` 路径上的挂接：引用未变化时不产生写入。
    pub fn attach_schema(&self, schema: &SchemaRef) {
        let current = self.schema.load();
        let unchanged = matches!(&*current, Some(attached) if Arc::ptr_eq(attached, schema));
        drop(current);
        if !unchanged {
            self.set_row_schema(schema);
        }
    }

    /// 以目标三元组比较两个行集。
    ///
    /// 先各自取快照再比较，同一实例与自身比较时不会重复持有读锁。
    pub fn compare(&self, other: &BaseRowSet) -> CmpOrdering {
        let mine = self.destination_key();
        let theirs = other.destination_key();
        mine.cmp(&theirs)
    }
}

impl fmt::Display for BaseRowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let identity = self.identity();
        fmt::Display::fmt(&identity, f)
    }
}

impl fmt::Debug for BaseRowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseRowSet")
            .field("identity", &self.identity())
            .field("done", &self.is_done())
            .finish_non_exhaustive()
    }
}
