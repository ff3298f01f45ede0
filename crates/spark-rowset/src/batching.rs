//! 批量阻塞行集。
//!
//! # 模块定位（Why）
//! - 高行速管线中，逐行加锁/唤醒的同步开销会成为瓶颈；本变体以“整批交接”摊薄这部分成本，
//!   代价是最多两个批次槽位的额外延迟；
//! - 属于需要显式开启的可选模式（见 [`RowSetConfig::batching`](crate::RowSetConfig::batching)）。
//!
//! # 核心机制（How）
//! - 生产者持有一个正在填充的批次，逐行写入；批次写满时，整批交给**已满批次池**（容量恰好 2，有界交接，受等待时长约束）；
//! - 消费者从已满批次池取出一整批，逐行取出并清空对应槽位（不再持有行的引用），取尽后把空批次放回**空批次池**（容量恰好 2）复用；
//! - 生产者需要新批次时优先从空批次池复用，池为空时才重新分配，因此稳态下不产生分配；
//! - `set_done` 冲刷未写满的最后一批：剩余槽位保持为空，作为批内的“数据结束”位置；空批次从不冲刷。
//!   若此时已满批次池没有空位，最后一批被暂存在尾批槽位中，消费者在取尽池中所有批次之后才会取到它，
//!   因此 `set_done` 从不挂起，也不会打乱顺序。
//!
//! # 契约说明（What）
//! - **顺序**：批内与批间均保持写入顺序；
//! - **背压**：若上一次交接超时导致当前批次仍是满的，新的行会在重试交接失败后被拒绝（返回 `false`，不写入）；
//!   恰好写满批次的那一行总是被接受，即使随后的交接超时；满批次会在下一次 `put` 或 `set_done` 时重试；
//! - **`size()` 为近似值**：正在消费的批次的精确剩余行数，加上每个排队批次的完整容量；
//!   生产者手中尚未交接的行不计入。
//!
//! # 设计权衡（Trade-offs）
//! - 批次大小取 `max(1, capacity / 2)`，两个排队槽位合计与同容量的 [`BlockingRowSet`](crate::BlockingRowSet) 缓冲量相当；
//! - 生产者与消费者游标各由一把互斥锁保护：正常情况下只有各自的线程访问，锁从不争用，只在 `clear()` 时与编排线程协调。

use std::{
    mem,
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use parking_lot::Mutex;
use tracing::trace;

use crate::{
    base::BaseRowSet,
    config::RowSetConfig,
    contract::{RowSet, impl_row_set_display},
    error::{Result, RowSetError},
    queue::BoundedQueue,
    row::{Row, SchemaRef},
};

/// 每个批次池的槽位数。
pub const BATCH_SLOTS: usize = 2;

type Batch = Box<[Option<Row>]>;

fn empty_batch(batch_size: usize) -> Batch {
    (0..batch_size).map(|_| None).collect()
}

/// 生产者游标：正在填充的批次与下一个写入位置。
struct ProducerCursor {
    batch: Option<Batch>,
    index: usize,
}

impl ProducerCursor {
    fn is_full(&self) -> bool {
        self.batch
            .as_ref()
            .is_some_and(|batch| self.index >= batch.len())
    }
}

/// 消费者游标：正在消费的批次与下一个读取位置。
struct ConsumerCursor {
    batch: Option<Batch>,
    index: usize,
}

pub struct BlockingBatchingRowSet {
    base: BaseRowSet,
    batch_size: usize,
    filled: BoundedQueue<Batch>,
    recycled: BoundedQueue<Batch>,
    tail: Mutex<Option<Batch>>,
    producer: Mutex<ProducerCursor>,
    consumer: Mutex<ConsumerCursor>,
    draining: AtomicUsize,
    put_timeout: Duration,
    get_timeout: Duration,
}

impl BlockingBatchingRowSet {
    pub fn new(capacity: usize) -> Result<Self> {
        let defaults = RowSetConfig::default();
        Self::with_timeouts(capacity, defaults.put_timeout(), defaults.get_timeout())
    }

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
            return Err(RowSetError::invalid_capacity(
                "BlockingBatchingRowSet",
                capacity,
            ));
        }
        let batch_size = (capacity / BATCH_SLOTS).max(1);
        let recycled = BoundedQueue::with_capacity(BATCH_SLOTS);
        for _ in 0..BATCH_SLOTS {
            let _ = recycled.try_offer(empty_batch(batch_size));
        }
        Ok(Self {
            base: BaseRowSet::new(),
            batch_size,
            filled: BoundedQueue::with_capacity(BATCH_SLOTS),
            recycled,
            tail: Mutex::new(None),
            producer: Mutex::new(ProducerCursor {
                batch: None,
                index: 0,
            }),
            consumer: Mutex::new(ConsumerCursor {
                batch: None,
                index: 0,
            }),
            draining: AtomicUsize::new(0),
            put_timeout,
            get_timeout,
        })
    }

    /// 单个批次的行数。
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    fn fresh_batch(&self) -> Batch {
        self.recycled
            .try_poll()
            .unwrap_or_else(|| empty_batch(self.batch_size))
    }

    /// 空批次池已满时直接丢弃，交由分配器回收。
    fn recycle(&self, mut batch: Batch) {
        batch.iter_mut().for_each(|slot| *slot = None);
        let _ = self.recycled.try_offer(batch);
    }

    /// 把生产者手中的满批次交给消费者；超时则原样留在游标上。
    fn hand_off(&self, cursor: &mut ProducerCursor, wait: Duration) -> bool {
        let Some(batch) = cursor.batch.take() else {
            return true;
        };
        match self.filled.offer(batch, wait) {
            Ok(()) => {
                trace!(rowset = %self.base, rows = cursor.index, "batch handed over");
                cursor.index = 0;
                true
            }
            Err(batch) => {
                cursor.batch = Some(batch);
                false
            }
        }
    }

    /// 取出尾批；只有在已满批次池中没有更早的批次时才交出尾批。
    fn take_tail(&self) -> Option<Batch> {
        let mut tail = self.tail.lock();
        if tail.is_none() {
            return None;
        }
        // 尾批写入发生在生产者最后一次成功交接之后，这里持锁再查一次池子即可保证顺序。
        if let Some(batch) = self.filled.try_poll() {
            return Some(batch);
        }
        tail.take()
    }

    fn next_batch(&self, wait: Option<Duration>) -> Option<Batch> {
        if let Some(batch) = self.filled.try_poll() {
            return Some(batch);
        }
        if let Some(batch) = self.take_tail() {
            return Some(batch);
        }
        let wait = wait?;
        self.filled.poll(wait).or_else(|| self.take_tail())
    }

    /// 从当前批次取出下一行；批次取尽时立即归还空批次池。
    fn serve(&self, cursor: &mut ConsumerCursor) -> Option<Row> {
        let batch = cursor.batch.as_mut()?;
        let row = batch.get_mut(cursor.index).and_then(Option::take);
        if row.is_some() {
            cursor.index += 1;
            self.draining.fetch_sub(1, Ordering::AcqRel);
        }
        let exhausted = batch.get(cursor.index).is_none_or(Option::is_none);
        if exhausted {
            if let Some(batch) = cursor.batch.take() {
                self.recycle(batch);
            }
            cursor.index = 0;
            self.draining.store(0, Ordering::Release);
        }
        row
    }

    fn get(&self, wait: Option<Duration>) -> Option<Row> {
        let mut cursor = self.consumer.lock();
        if cursor.batch.is_some() {
            return self.serve(&mut cursor);
        }
        let batch = self.next_batch(wait)?;
        let rows = batch.iter().take_while(|slot| slot.is_some()).count();
        self.draining.store(rows, Ordering::Release);
        cursor.batch = Some(batch);
        cursor.index = 0;
        self.serve(&mut cursor)
    }
}

impl RowSet for BlockingBatchingRowSet {
    fn base(&self) -> &BaseRowSet {
        &self.base
    }

    fn put_row(&self, schema: &SchemaRef, row: Row) -> bool {
        self.put_row_wait(schema, row, self.put_timeout)
    }

    fn put_row_wait(&self, schema: &SchemaRef, row: Row, wait: Duration) -> bool {
        self.base.attach_schema(schema);
        let mut cursor = self.producer.lock();
        if cursor.is_full() && !self.hand_off(&mut cursor, wait) {
            return false;
        }
        if cursor.batch.is_none() {
            cursor.batch = Some(self.fresh_batch());
            cursor.index = 0;
        }
        let index = cursor.index;
        if let Some(batch) = cursor.batch.as_mut() {
            batch[index] = Some(row);
        }
        cursor.index += 1;
        if cursor.is_full() {
            // 行已被接受；交接超时只意味着满批次留到下一次重试。
            let _ = self.hand_off(&mut cursor, wait);
        }
        true
    }

    fn get_row(&self) -> Option<Row> {
        self.get(Some(self.get_timeout))
    }

    fn get_row_immediate(&self) -> Option<Row> {
        self.get(None)
    }

    fn get_row_wait(&self, wait: Duration) -> Option<Row> {
        self.get(Some(wait))
    }

    fn set_done(&self) {
        {
            let mut cursor = self.producer.lock();
            if cursor.index > 0 {
                if let Some(mut batch) = cursor.batch.take() {
                    let end = cursor.index;
                    batch[end..].iter_mut().for_each(|slot| *slot = None);
                    cursor.index = 0;
                    trace!(rowset = %self.base, rows = end, "flushing final batch");
                    if let Err(batch) = self.filled.try_offer(batch) {
                        *self.tail.lock() = Some(batch);
                    }
                }
            }
        }
        self.base.mark_done();
    }

    fn size(&self) -> usize {
        let queued = self.filled.len() + usize::from(self.tail.lock().is_some());
        self.draining.load(Ordering::Acquire) + queued * self.batch_size
    }

    fn clear(&self) {
        {
            let mut producer = self.producer.lock();
            let mut consumer = self.consumer.lock();
            if let Some(batch) = producer.batch.take() {
                self.recycle(batch);
            }
            producer.index = 0;
            if let Some(batch) = consumer.batch.take() {
                self.recycle(batch);
            }
            consumer.index = 0;
            self.draining.store(0, Ordering::Release);
            drop(mem::take(&mut *self.tail.lock()));
            self.filled.clear();
        }
        trace!(rowset = %self.base, "row set cleared");
        self.base.reopen();
    }
}

impl_row_set_display!(BlockingBatchingRowSet);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{RowSchema, Value};
    use std::sync::Arc;

    fn row(n: i64) -> Row {
        Row::new(vec![Value::Integer(n)])
    }

    fn drain(rows: &BlockingBatchingRowSet) -> Vec<Row> {
        std::iter::from_fn(|| rows.get_row_immediate()).collect()
    }

    #[test]
    fn batch_size_is_half_the_capacity() {
        assert_eq!(BlockingBatchingRowSet::new(10).expect("容量为正").batch_size(), 5);
        assert_eq!(BlockingBatchingRowSet::new(1).expect("容量为正").batch_size(), 1);
    }

    #[test]
    fn rows_become_visible_batch_by_batch() {
        let schema = Arc::new(RowSchema::default());
        let rows = BlockingBatchingRowSet::new(6).expect("容量为正");
        assert!(rows.put_row(&schema, row(0)));
        assert!(rows.put_row(&schema, row(1)));
        assert!(rows.get_row_immediate().is_none(), "未满的批次不可见");
        assert_eq!(rows.size(), 0);

        assert!(rows.put_row(&schema, row(2)));
        assert_eq!(rows.size(), 3);
        assert_eq!(rows.get_row_immediate(), Some(row(0)));
        assert_eq!(rows.size(), 2, "正在消费的批次按精确剩余计数");
        assert_eq!(drain(&rows), vec![row(1), row(2)]);
        assert_eq!(rows.size(), 0);
    }

    #[test]
    fn set_done_flushes_partial_batch_only() {
        let schema = Arc::new(RowSchema::default());
        let rows = BlockingBatchingRowSet::new(8).expect("容量为正");
        for n in 0..6 {
            assert!(rows.put_row(&schema, row(n)));
        }
        rows.set_done();
        assert!(rows.is_done());
        assert_eq!(drain(&rows), (0..6).map(row).collect::<Vec<_>>());

        let empty = BlockingBatchingRowSet::new(8).expect("容量为正");
        empty.set_done();
        assert_eq!(empty.size(), 0, "空批次不应被冲刷");
        assert!(empty.get_row_immediate().is_none());
    }

    #[test]
    fn full_pool_refuses_further_rows() {
        let schema = Arc::new(RowSchema::default());
        let rows = BlockingBatchingRowSet::new(2).expect("容量为正");
        // 批次大小为 1：两个排队槽位 + 生产者手中的一个满批次。
        assert!(rows.put_row_wait(&schema, row(0), Duration::ZERO));
        assert!(rows.put_row_wait(&schema, row(1), Duration::ZERO));
        assert!(rows.put_row_wait(&schema, row(2), Duration::ZERO));
        assert!(
            !rows.put_row_wait(&schema, row(3), Duration::from_millis(10)),
            "满批次交接失败时新行必须被拒绝"
        );

        assert_eq!(rows.get_row_immediate(), Some(row(0)));
        assert!(rows.put_row_wait(&schema, row(3), Duration::ZERO));
        rows.set_done();
        assert_eq!(drain(&rows), vec![row(1), row(2), row(3)]);
    }

    #[test]
    fn final_batch_is_parked_when_pool_is_full() {
        let schema = Arc::new(RowSchema::default());
        let rows = BlockingBatchingRowSet::new(4).expect("容量为正");
        for n in 0..5 {
            assert!(rows.put_row_wait(&schema, row(n), Duration::ZERO));
        }
        // 两个满批次已排队，第五行留在生产者手中。
        rows.set_done();
        assert_eq!(rows.size(), 6, "尾批按完整批次容量计入");
        assert_eq!(drain(&rows), (0..5).map(row).collect::<Vec<_>>());
        assert_eq!(rows.size(), 0);
    }

    #[test]
    fn clear_empties_and_reopens() {
        let schema = Arc::new(RowSchema::default());
        let rows = BlockingBatchingRowSet::new(4).expect("容量为正");
        for n in 0..5 {
            assert!(rows.put_row_wait(&schema, row(n), Duration::ZERO));
        }
        assert_eq!(rows.get_row_immediate(), Some(row(0)));
        rows.set_done();
        rows.clear();
        assert!(!rows.is_done());
        assert_eq!(rows.size(), 0);
        assert!(rows.get_row_immediate().is_none());

        assert!(rows.put_row(&schema, row(10)));
        rows.set_done();
        assert_eq!(drain(&rows), vec![row(10)]);
    }
}
