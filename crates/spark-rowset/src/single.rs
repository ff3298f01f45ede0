//! 单槽位行集。
//!
//! # 契约说明（What）
//! - 只有一个槽位，`put_*` 从不等待：槽位已占用时**覆盖**旧行并返回 `true`；
//! - `get_*` 从不等待：槽位有值则取出，否则立即返回 `None`；
//! - 调用方必须保证同一时刻至多一行在途（典型场景是串行单线程执行模式，生产与消费交替进行），
//!   否则被覆盖的行将静默丢失。

use std::time::Duration;

use parking_lot::Mutex;

use crate::{
    base::BaseRowSet,
    contract::{RowSet, impl_row_set_display},
    row::{Row, SchemaRef},
};

#[derive(Default)]
pub struct SingleRowRowSet {
    base: BaseRowSet,
    slot: Mutex<Option<Row>>,
}

impl SingleRowRowSet {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RowSet for SingleRowRowSet {
    fn base(&self) -> &BaseRowSet {
        &self.base
    }

    fn put_row(&self, schema: &SchemaRef, row: Row) -> bool {
        self.base.attach_schema(schema);
        *self.slot.lock() = Some(row);
        true
    }

    fn put_row_wait(&self, schema: &SchemaRef, row: Row, _wait: Duration) -> bool {
        self.put_row(schema, row)
    }

    fn get_row(&self) -> Option<Row> {
        self.slot.lock().take()
    }

    fn get_row_immediate(&self) -> Option<Row> {
        self.get_row()
    }

    fn get_row_wait(&self, _wait: Duration) -> Option<Row> {
        self.get_row()
    }

    fn size(&self) -> usize {
        usize::from(self.slot.lock().is_some())
    }

    fn clear(&self) {
        self.slot.lock().take();
        self.base.reopen();
    }
}

impl_row_set_display!(SingleRowRowSet);
