//! 活性上报阻塞行集。
//!
//! # 设计背景（Why）
//! - 执行图卡住时，编排层需要从外部判断“哪个步骤正阻塞在哪条通道上”；
//! - 本变体在每次等待前后维护一个活性标志，监控线程通过 [`RowSet::is_blocking`] 读取，
//!   不参与数据通路，也不承担任何正确性责任。
//!
//! # 契约说明（What）
//! - 缓冲语义与 [`BlockingRowSet`](crate::BlockingRowSet) 相同：定长 FIFO，超时返回失败；
//! - 标志在进入等待前置位，离开等待后立即清除，无论成功、超时还是栈展开；
//! - 默认等待只有 100 纳秒，轮询式调用方可以高频自旋而标志依旧准确。

use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::Duration,
};

use crate::{
    base::BaseRowSet,
    contract::{RowSet, impl_row_set_display},
    error::{Result, RowSetError},
    queue::BoundedQueue,
    row::{Row, SchemaRef},
};

/// 默认等待：100 纳秒。
pub const LISTENING_DEFAULT_WAIT: Duration = Duration::from_nanos(100);

pub struct BlockingListeningRowSet {
    base: BaseRowSet,
    queue: BoundedQueue<Row>,
    blocking: AtomicBool,
}

/// 离开作用域时清除活性标志。
struct BlockingGuard<'a>(&'a AtomicBool);

impl Drop for BlockingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl BlockingListeningRowSet {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(RowSetError::invalid_capacity(
                "BlockingListeningRowSet",
                capacity,
            ));
        }
        Ok(Self {
            base: BaseRowSet::new(),
            queue: BoundedQueue::with_capacity(capacity),
            blocking: AtomicBool::new(false),
        })
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    fn enter_wait(&self) -> BlockingGuard<'_> {
        self.blocking.store(true, Ordering::Release);
        BlockingGuard(&self.blocking)
    }
}

impl RowSet for BlockingListeningRowSet {
    fn base(&self) -> &BaseRowSet {
        &self.base
    }

    fn put_row(&self, schema: &SchemaRef, row: Row) -> bool {
        self.put_row_wait(schema, row, LISTENING_DEFAULT_WAIT)
    }

    fn put_row_wait(&self, schema: &SchemaRef, row: Row, wait: Duration) -> bool {
        self.base.attach_schema(schema);
        let _guard = self.enter_wait();
        self.queue.offer(row, wait).is_ok()
    }

    fn get_row(&self) -> Option<Row> {
        self.get_row_wait(LISTENING_DEFAULT_WAIT)
    }

    fn get_row_immediate(&self) -> Option<Row> {
        let _guard = self.enter_wait();
        self.queue.try_poll()
    }

    fn get_row_wait(&self, wait: Duration) -> Option<Row> {
        let _guard = self.enter_wait();
        self.queue.poll(wait)
    }

    fn size(&self) -> usize {
        self.queue.len()
    }

    fn clear(&self) {
        self.queue.clear();
        self.base.reopen();
    }

    fn is_blocking(&self) -> bool {
        self.blocking.load(Ordering::Acquire)
    }
}

impl_row_set_display!(BlockingListeningRowSet);
