//! 执行图级别的行集登记表。
//!
//! # 设计背景（Why）
//! - 编排层在接线阶段创建全部行集，之后需要按名称或按端点查回某条通道（例如把远端输入挂接到本地步骤）；
//! - 监控线程周期性汇总缓冲量、找出正阻塞的通道，用于判断执行图是否卡住。
//!
//! # 契约说明（What）
//! - 登记表只持有 `Arc` 句柄，不参与数据面；
//! - 名称与步骤名匹配均不区分大小写（ASCII）；
//! - 登记发生在启动期，查询可以来自任意线程，因此以读写锁保护。

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::contract::RowSet;

#[derive(Default)]
pub struct RowSetRegistry {
    row_sets: RwLock<Vec<Arc<dyn RowSet>>>,
}

impl RowSetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, row_set: Arc<dyn RowSet>) {
        debug!(rowset = %row_set, "registered row set");
        self.row_sets.write().push(row_set);
    }

    pub fn len(&self) -> usize {
        self.row_sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_sets.read().is_empty()
    }

    /// 按展示名称查找（`来源.副本 - 目标.副本`）。
    pub fn find_by_name(&self, name: &str) -> Option<Arc<dyn RowSet>> {
        self.row_sets
            .read()
            .iter()
            .find(|row_set| row_set.name().eq_ignore_ascii_case(name))
            .cloned()
    }

    /// 按两端步骤名与副本号查找。
    pub fn find(
        &self,
        from: &str,
        from_copy: u32,
        to: &str,
        to_copy: u32,
    ) -> Option<Arc<dyn RowSet>> {
        let matches = |name: Option<Arc<str>>, expected: &str| {
            name.is_some_and(|name| name.eq_ignore_ascii_case(expected))
        };
        self.row_sets
            .read()
            .iter()
            .find(|row_set| {
                let identity = row_set.identity();
                matches(identity.origin_step, from)
                    && matches(identity.destination_step, to)
                    && identity.origin_copy == from_copy
                    && identity.destination_copy == to_copy
            })
            .cloned()
    }

    /// 按目标三元组排序后的快照。
    pub fn sorted(&self) -> Vec<Arc<dyn RowSet>> {
        let mut snapshot = self.row_sets.read().clone();
        snapshot.sort_by_cached_key(|row_set| row_set.destination_key());
        snapshot
    }

    /// 全部行集当前缓冲量之和（批量变体按近似值计入）。
    pub fn total_buffered(&self) -> usize {
        self.row_sets.read().iter().map(|row_set| row_set.size()).sum()
    }

    /// 当前正处于阻塞等待中的行集。
    pub fn blocked(&self) -> Vec<Arc<dyn RowSet>> {
        self.row_sets
            .read()
            .iter()
            .filter(|row_set| row_set.is_blocking())
            .cloned()
            .collect()
    }
}
