//! 多输出写入：一个步骤副本把行分发或复制到多条下游行集。
//!
//! # 设计背景（Why）
//! - 步骤的输出可能连向多个下游副本（分发）或多个下游步骤（复制），写入方需要统一的扇出逻辑；
//! - 下游写满时写入方只能等待，但执行图被停止时必须能够退出等待，否则生产线程永远无法结束。
//!
//! # 逻辑解析（How）
//! - [`OutputMode::Distribute`]：轮转写入，每行只进入一条输出；只有在输出多于一条时才推进轮转位置；
//! - [`OutputMode::Copy`]：每行写入全部输出，先写第 1..n 条，最后写第 0 条；
//! - 每次写入都以目标行集已挂接的行结构为准，尚未挂接时才使用调用方给出的结构；
//! - 写入被拒绝（超时）时重试，直到被接受或停止标志置位。
//!
//! # 契约说明（What）
//! - [`OutputRowSets::put_row`] 返回 `false` 表示因停止而放弃，此时该行可能只进入了部分输出；
//! - 没有任何输出时行被丢弃并视为写入成功。

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tracing::{debug, trace};

use crate::{
    contract::RowSet,
    row::{Row, SchemaRef},
};

/// 扇出方式。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutputMode {
    /// 轮转分发：每行只写入一条输出。
    #[default]
    Distribute,
    /// 复制：每行写入全部输出。
    Copy,
}

pub struct OutputRowSets {
    outputs: Vec<Arc<dyn RowSet>>,
    mode: OutputMode,
    current: usize,
    rows_written: u64,
    stopped: Arc<AtomicBool>,
}

impl OutputRowSets {
    pub fn new(outputs: Vec<Arc<dyn RowSet>>, mode: OutputMode) -> Self {
        Self {
            outputs,
            mode,
            current: 0,
            rows_written: 0,
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 与外部共享停止标志（例如整个执行图共用一个）。
    pub fn with_stop_signal(mut self, stopped: Arc<AtomicBool>) -> Self {
        self.stopped = stopped;
        self
    }

    pub fn stop_signal(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stopped)
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outputs.is_empty()
    }

    /// 成功写入的次数；复制模式下每条输出各计一次。
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// 按扇出方式写入一行。
    pub fn put_row(&mut self, schema: &SchemaRef, row: Row) -> bool {
        if self.outputs.is_empty() {
            trace!("no output row sets, row discarded");
            return true;
        }
        match self.mode {
            OutputMode::Distribute => {
                let target = Arc::clone(&self.outputs[self.current]);
                if !self.deliver(&target, schema, row) {
                    return false;
                }
                if self.outputs.len() > 1 {
                    self.current = (self.current + 1) % self.outputs.len();
                }
                true
            }
            OutputMode::Copy => {
                for index in 1..self.outputs.len() {
                    let target = Arc::clone(&self.outputs[index]);
                    if !self.deliver(&target, schema, row.clone()) {
                        return false;
                    }
                }
                let first = Arc::clone(&self.outputs[0]);
                self.deliver(&first, schema, row)
            }
        }
    }

    /// 对全部输出声明结束。
    pub fn finished(&self) {
        for output in &self.outputs {
            output.set_done();
        }
    }

    fn deliver(&mut self, target: &Arc<dyn RowSet>, schema: &SchemaRef, row: Row) -> bool {
        let to_send = target.row_schema().unwrap_or_else(|| Arc::clone(schema));
        while !target.put_row(&to_send, row.clone()) {
            if self.is_stopped() {
                debug!(rowset = %target, "stopped while waiting for room in output row set");
                return false;
            }
        }
        self.rows_written += 1;
        true
    }
}
