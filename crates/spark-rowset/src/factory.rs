//! 行集工厂：按执行模式挑选变体。
//!
//! # 设计背景（Why）
//! - 编排层只关心“这个执行图以什么模式运行”，不应该散落各处地判断该用哪种通道；
//! - 工厂持有一份 [`RowSetConfig`] 快照，所有通道都从同一份配置构造，运行期不再读取环境。
//!
//! # 选择规则（What）
//! | 执行模式 | 变体 |
//! | --- | --- |
//! | [`TransformationType::Normal`] | 配置开启批量时为 [`BlockingBatchingRowSet`]，否则为 [`BlockingRowSet`] |
//! | [`TransformationType::SerialSingleThreaded`] | [`SingleRowRowSet`] |
//! | [`TransformationType::SingleThreaded`] | [`QueueRowSet`] |
//!
//! [`BlockingListeningRowSet`] 不参与自动选择，只能通过 [`RowSetFactory::create`] 显式创建。

use std::{fmt, sync::Arc};

use tracing::debug;

use crate::{
    batching::BlockingBatchingRowSet, blocking::BlockingRowSet, config::RowSetConfig,
    contract::RowSet, error::Result, listening::BlockingListeningRowSet,
    single::SingleRowRowSet, unbounded::QueueRowSet,
};

/// 执行图的运行模式。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TransformationType {
    /// 每个步骤副本独占一个线程。
    #[default]
    Normal,
    /// 单线程、逐行串行推进：同一时刻至多一行在途。
    SerialSingleThreaded,
    /// 单线程协作式调度：步骤轮流运行，通道不得阻塞。
    SingleThreaded,
}

/// 行集变体。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RowSetKind {
    Blocking,
    Batching,
    Listening,
    SingleRow,
    Queue,
}

impl fmt::Display for RowSetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RowSetKind::Blocking => "BlockingRowSet",
            RowSetKind::Batching => "BlockingBatchingRowSet",
            RowSetKind::Listening => "BlockingListeningRowSet",
            RowSetKind::SingleRow => "SingleRowRowSet",
            RowSetKind::Queue => "QueueRowSet",
        })
    }
}

#[derive(Clone, Debug, Default)]
pub struct RowSetFactory {
    config: RowSetConfig,
}

impl RowSetFactory {
    pub fn new(config: RowSetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RowSetConfig {
        &self.config
    }

    /// 执行模式到变体的映射。
    pub fn kind_for(&self, transformation: TransformationType) -> RowSetKind {
        match transformation {
            TransformationType::Normal if self.config.batching() => RowSetKind::Batching,
            TransformationType::Normal => RowSetKind::Blocking,
            TransformationType::SerialSingleThreaded => RowSetKind::SingleRow,
            TransformationType::SingleThreaded => RowSetKind::Queue,
        }
    }

    /// 创建指定变体；有界变体的容量与默认等待取自配置。
    ///
    /// # 错误
    /// 配置中的容量为 0 时返回 [`RowSetError::InvalidCapacity`](crate::RowSetError::InvalidCapacity)。
    pub fn create(&self, kind: RowSetKind) -> Result<Arc<dyn RowSet>> {
        let row_set: Arc<dyn RowSet> = match kind {
            RowSetKind::Blocking => Arc::new(BlockingRowSet::with_config(&self.config)?),
            RowSetKind::Batching => Arc::new(BlockingBatchingRowSet::with_config(&self.config)?),
            RowSetKind::Listening => {
                Arc::new(BlockingListeningRowSet::new(self.config.capacity())?)
            }
            RowSetKind::SingleRow => Arc::new(SingleRowRowSet::new()),
            RowSetKind::Queue => Arc::new(QueueRowSet::new()),
        };
        Ok(row_set)
    }

    pub fn for_transformation(
        &self,
        transformation: TransformationType,
    ) -> Result<Arc<dyn RowSet>> {
        self.create(self.kind_for(transformation))
    }

    /// 创建并接线：一步完成选择、构造与身份赋值。
    pub fn create_between(
        &self,
        transformation: TransformationType,
        from: &str,
        from_copy: u32,
        to: &str,
        to_copy: u32,
    ) -> Result<Arc<dyn RowSet>> {
        let kind = self.kind_for(transformation);
        let row_set = self.create(kind)?;
        row_set.set_thread_name_from_to_copy(from, from_copy, to, to_copy);
        debug!(rowset = %row_set, %kind, "allocated new row set");
        Ok(row_set)
    }
}
