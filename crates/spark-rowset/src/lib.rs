#![deny(unsafe_code)]
#![doc = "spark-rowset: 流式 ETL 执行引擎中步骤（Step）之间搬运行（Row）的通道族。"]
#![doc = ""]
#![doc = "== 定位 =="]
#![doc = "执行图中的每个步骤副本独占一个线程，相邻步骤副本之间通过一个行集（RowSet）交换数据。"]
#![doc = "行集负责有界缓冲、带超时的背压、流结束信号与若干可观测性取舍，且必须在单生产者/单消费者并发访问下保持安全。"]
#![doc = ""]
#![doc = "== 变体一览 =="]
#![doc = "1. [`BlockingRowSet`]：定长 FIFO + 超时阻塞，多线程执行的默认通道；"]
#![doc = "2. [`BlockingBatchingRowSet`]：以整批搬运换取吞吐，适合高行速管线；"]
#![doc = "3. [`BlockingListeningRowSet`]：在每次等待前后维护活性标志，供外部检测卡顿；"]
#![doc = "4. [`SingleRowRowSet`]：单槽位，供编排层确定“同一时刻至多一行”的场景；"]
#![doc = "5. [`QueueRowSet`]：无界非阻塞队列，供单线程协作式执行。"]

//! # 使用约定
//!
//! - 编排层为每条（生产者副本, 消费者副本）边创建一个行集，经 [`RowSet::set_thread_name_from_to_copy`]
//!   赋予身份后，将同一个 `Arc<dyn RowSet>` 交给两端线程；
//! - 生产者只调用 `put_*` 与 [`RowSet::set_done`]，消费者只调用 `get_*`；
//! - 所有数据面操作都不会因背压返回错误：`false`/`None` 一律意味着“稍后重试或检查 `is_done()`”。
//!
//! ```
//! use std::sync::Arc;
//! use spark_rowset::{BlockingRowSet, Row, RowSchema, RowSet, Value};
//!
//! let schema = Arc::new(RowSchema::default());
//! let rows = BlockingRowSet::new(4).expect("容量必须为正");
//! assert!(rows.put_row(&schema, Row::new(vec![Value::Integer(1)])));
//! rows.set_done();
//! assert_eq!(rows.get_row_immediate().and_then(|r| r.get(0).cloned()), Some(Value::Integer(1)));
//! assert!(rows.get_row_immediate().is_none() && rows.is_done());
//! ```

pub mod base;
pub mod batching;
pub mod blocking;
pub mod config;
pub mod contract;
pub mod error;
pub mod factory;
pub mod input;
pub mod listening;
pub mod output;
pub mod producer;
pub mod registry;
pub mod row;
pub mod single;
pub mod unbounded;

mod queue;

pub use base::{BaseRowSet, DestinationKey, RowSetIdentity};
pub use batching::BlockingBatchingRowSet;
pub use blocking::BlockingRowSet;
pub use config::{RowSetConfig, RowSetConfigBuilder};
pub use contract::RowSet;
pub use error::{Result, RowSetError};
pub use factory::{RowSetFactory, RowSetKind, TransformationType};
pub use input::{InputPoll, InputRowSets};
pub use listening::BlockingListeningRowSet;
pub use output::{OutputMode, OutputRowSets};
pub use producer::RowProducer;
pub use registry::RowSetRegistry;
pub use row::{ColumnMeta, Row, RowSchema, SchemaRef, Value, ValueKind};
pub use single::SingleRowRowSet;
pub use unbounded::QueueRowSet;
