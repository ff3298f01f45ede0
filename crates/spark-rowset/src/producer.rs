//! 从执行图外部向某个步骤注入行的句柄。
//!
//! 嵌入方（测试夹具、上层服务）把自己当作一个额外的上游步骤：
//! 编排层为目标步骤多建一条输入行集，并把生产端交给 [`RowProducer`]。

use std::{sync::Arc, time::Duration};

use crate::{
    contract::RowSet,
    row::{Row, SchemaRef},
};

pub struct RowProducer {
    row_set: Arc<dyn RowSet>,
}

impl RowProducer {
    pub fn new(row_set: Arc<dyn RowSet>) -> Self {
        Self { row_set }
    }

    pub fn row_set(&self) -> &Arc<dyn RowSet> {
        &self.row_set
    }

    /// 反复以默认等待写入，直到被接受。
    ///
    /// 下游停止消费时本方法不会返回；需要退出路径的调用方应使用 [`RowProducer::put_row_wait`] 自行循环。
    pub fn put_row(&self, schema: &SchemaRef, row: Row) {
        while !self.row_set.put_row(schema, row.clone()) {}
    }

    /// 只尝试一次（使用变体的默认等待）。
    pub fn put_row_non_blocking(&self, schema: &SchemaRef, row: Row) -> bool {
        self.row_set.put_row(schema, row)
    }

    pub fn put_row_wait(&self, schema: &SchemaRef, row: Row, wait: Duration) -> bool {
        self.row_set.put_row_wait(schema, row, wait)
    }

    /// 声明不再注入。
    pub fn finished(&self) {
        self.row_set.set_done();
    }
}
