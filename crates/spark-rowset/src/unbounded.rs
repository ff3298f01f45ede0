//! 无界非阻塞行集，供单线程协作式执行使用：生产与消费在同一线程交替发生，任何等待都会造成自锁。
//!
//! `put_*` 总是成功，`get_*` 总是立即返回；给定的等待时长一律被忽略。
//! 内存占用没有上限，由调度方保证消费及时。

use std::{collections::VecDeque, time::Duration};

use parking_lot::Mutex;

use crate::{
    base::BaseRowSet,
    contract::{RowSet, impl_row_set_display},
    row::{Row, SchemaRef},
};

#[derive(Default)]
pub struct QueueRowSet {
    base: BaseRowSet,
    buffer: Mutex<VecDeque<Row>>,
}

impl QueueRowSet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowSet for QueueRowSet {
    fn base(&self) -> &BaseRowSet {
        &self.base
    }

    fn put_row(&self, schema: &SchemaRef, row: Row) -> bool {
        self.base.attach_schema(schema);
        self.buffer.lock().push_back(row);
        true
    }

    fn put_row_wait(&self, schema: &SchemaRef, row: Row, _wait: Duration) -> bool {
        self.put_row(schema, row)
    }

    fn get_row(&self) -> Option<Row> {
        self.buffer.lock().pop_front()
    }

    fn get_row_immediate(&self) -> Option<Row> {
        self.get_row()
    }

    fn get_row_wait(&self, _wait: Duration) -> Option<Row> {
        self.get_row()
    }

    fn size(&self) -> usize {
        self.buffer.lock().len()
    }

    fn clear(&self) {
        let drained = std::mem::take(&mut *self.buffer.lock());
        drop(drained);
        self.base.reopen();
    }
}

impl_row_set_display!(QueueRowSet);
