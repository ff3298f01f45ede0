//! 定长阻塞行集：多线程执行模式下两个步骤副本之间的默认通道。

use std::time::Duration;

use crate::{
    base::BaseRowSet,
    config::RowSetConfig,
    contract::{RowSet, impl_row_set_display},
    error::{Result, RowSetError},
    queue::BoundedQueue,
    row::{Row, SchemaRef},
};

/// 以定长 FIFO 为后端的阻塞行集。
///
/// # 模块角色（Why）
/// - 生产者写满后最多等待给定时长，给下游留出消费窗口，从而把内存占用限制在 `capacity` 行以内；
/// - 消费者读空后同样有限等待，让步骤的运行循环有机会检查结束标志与停止信号。
///
/// # 契约说明（What）
/// - 容量在构造时固定，之后从不调整；
/// - `put_row`/`get_row` 使用构造时确定的默认等待（默认 50 毫秒），`*_wait` 使用调用方给定的时长；
/// - 超时返回 `false`/`None`，被拒绝的行不会进入队列。
pub struct BlockingRowSet {
    base: BaseRowSet,
    queue: BoundedQueue<Row>,
    put_timeout: Duration,
    get_timeout: Duration,
}

impl BlockingRowSet {
    /// 使用默认等待时长构造。
    pub fn new(capacity: usize) -> Result<Self> {
        let defaults = RowSetConfig::default();
        Self::with_timeouts(capacity, defaults.put_timeout(), defaults.get_timeout())
    }

    /// 按配置快照构造：容量与默认等待都取自配置。
    pub fn with_config(config: &RowSetConfig) -> Result<Self> {
        Self::with_timeouts(
            config.capacity(),
            config.put_timeout(),
            config.get_timeout(),
        )
    }

    pub fn with_timeouts(
        capacity: usize,
        put_timeout: Duration,
        get_timeout: Duration,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(RowSetError::invalid_capacity("BlockingRowSet", capacity));
        }
        Ok(Self {
            base: BaseRowSet::new(),
            queue: BoundedQueue::with_capacity(capacity),
            put_timeout,
            get_timeout,
        })
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    pub fn put_timeout(&self) -> Duration {
        self.put_timeout
    }

    pub fn get_timeout(&self) -> Duration {
        self.get_timeout
    }
}

impl RowSet for BlockingRowSet {
    fn base(&self) -> &BaseRowSet {
        &self.base
    }

    fn put_row(&self, schema: &SchemaRef, row: Row) -> bool {
        self.put_row_wait(schema, row, self.put_timeout)
    }

    fn put_row_wait(&self, schema: &SchemaRef, row: Row, wait: Duration) -> bool {
        self.base.attach_schema(schema);
        self.queue.offer(row, wait).is_ok()
    }

    fn get_row(&self) -> Option<Row> {
        self.queue.poll(self.get_timeout)
    }

    fn get_row_immediate(&self) -> Option<Row> {
        self.queue.try_poll()
    }

    fn get_row_wait(&self, wait: Duration) -> Option<Row> {
        self.queue.poll(wait)
    }

    fn size(&self) -> usize {
        self.queue.len()
    }

    fn clear(&self) {
        self.queue.clear();
        self.base.reopen();
    }
}

impl_row_set_display!(BlockingRowSet);
