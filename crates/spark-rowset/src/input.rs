//! 多输入读取：一个步骤副本同时消费多条上游行集。
//!
//! # 设计背景（Why）
//! - 多个上游副本（或多个上游步骤）汇入同一步骤时，输入之间没有顺序约定；
//!   重分区后甚至可能一条输入承载全部数据、其余输入长期为空；
//! - 因此读取方按“块”轮转：在当前输入上连续读满一块，再转向下一条有数据的输入，
//!   当前输入暂时为空时立即换道，避免在一条空输入上空等。
//!
//! # 逻辑解析（How）
//! 1. 当前块读满（默认 500 行）时，以 `get_row_immediate` 依次窥视其余输入，第一条有数据的输入成为新的当前输入；
//! 2. 否则在当前输入上短暂等待（默认 1 毫秒），超时后换到下一条输入；
//! 3. 输入返回 `None` 且已结束时再取一次，仍为 `None` 则将其移出；
//! 4. 全部输入移出后读取结束。
//!
//! # 契约说明（What）
//! - 单条输入内部保持写入顺序，不同输入之间的交错顺序不做保证；
//! - [`InputRowSets::row_schema`] 返回最近一行来源输入的行结构。

use std::{sync::Arc, time::Duration};

use tracing::debug;

use crate::{
    contract::RowSet,
    row::{Row, SchemaRef},
};

/// 每条输入连续读取的默认行数。
pub const DEFAULT_BLOCK_SIZE: usize = 500;
/// 在当前输入上的默认等待。
pub const DEFAULT_INPUT_WAIT: Duration = Duration::from_millis(1);

/// 单次轮询的结果。
#[derive(Debug, PartialEq)]
pub enum InputPoll {
    Row(Row),
    /// 所有剩余输入暂时都没有数据。
    Pending,
    /// 全部输入已排空。
    Finished,
}

pub struct InputRowSets {
    inputs: Vec<Arc<dyn RowSet>>,
    current: usize,
    block_pointer: usize,
    block_size: usize,
    wait: Duration,
    rows_read: u64,
    last_schema: Option<SchemaRef>,
}

impl InputRowSets {
    pub fn new(inputs: Vec<Arc<dyn RowSet>>) -> Self {
        Self {
            inputs,
            current: 0,
            block_pointer: 0,
            block_size: DEFAULT_BLOCK_SIZE,
            wait: DEFAULT_INPUT_WAIT,
            rows_read: 0,
            last_schema: None,
        }
    }

    /// 设置块大小；0 按 1 处理。
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    pub fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    pub fn remaining_inputs(&self) -> usize {
        self.inputs.len()
    }

    pub fn row_schema(&self) -> Option<SchemaRef> {
        self.last_schema.clone()
    }

    /// 读取下一行；所有输入排空后返回 `None`。
    pub fn next_row(&mut self) -> Option<Row> {
        loop {
            match self.poll_row() {
                InputPoll::Row(row) => return Some(row),
                InputPoll::Finished => return None,
                InputPoll::Pending => {}
            }
        }
    }

    /// 对剩余输入做至多一轮尝试。
    pub fn poll_row(&mut self) -> InputPoll {
        if self.inputs.is_empty() {
            return InputPoll::Finished;
        }
        if self.block_pointer >= self.block_size {
            if let Some(row) = self.rotate() {
                return InputPoll::Row(row);
            }
        }

        let mut attempts = self.inputs.len();
        while attempts > 0 {
            let input = Arc::clone(&self.inputs[self.current]);
            if let Some(row) = input.get_row_wait(self.wait) {
                return InputPoll::Row(self.accept(&input, row));
            }
            if input.is_done() {
                if let Some(row) = input.get_row_wait(self.wait) {
                    return InputPoll::Row(self.accept(&input, row));
                }
                self.remove_current();
                if self.inputs.is_empty() {
                    return InputPoll::Finished;
                }
            } else {
                self.advance();
            }
            attempts -= 1;
        }
        InputPoll::Pending
    }

    fn accept(&mut self, input: &Arc<dyn RowSet>, row: Row) -> Row {
        self.rows_read += 1;
        self.block_pointer += 1;
        if let Some(schema) = input.row_schema() {
            self.last_schema = Some(schema);
        }
        row
    }

    /// 块读满：窥视其余输入，第一条有数据的输入成为当前输入。
    fn rotate(&mut self) -> Option<Row> {
        self.block_pointer = 0;
        let len = self.inputs.len();
        for offset in 1..len {
            let index = (self.current + offset) % len;
            let input = Arc::clone(&self.inputs[index]);
            if let Some(row) = input.get_row_immediate() {
                self.current = index;
                return Some(self.accept(&input, row));
            }
        }
        None
    }

    fn advance(&mut self) {
        self.block_pointer = 0;
        self.current = (self.current + 1) % self.inputs.len();
    }

    fn remove_current(&mut self) {
        let drained = self.inputs.remove(self.current);
        debug!(rowset = %drained, remaining = self.inputs.len(), "input row set drained");
        self.block_pointer = 0;
        if self.current >= self.inputs.len() {
            self.current = 0;
        }
    }
}

impl Iterator for InputRowSets {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.next_row()
    }
}
