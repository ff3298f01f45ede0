//! 契约测试共用夹具。

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use spark_rowset::{Row, RowSchema, RowSet, RowSetConfig, RowSetFactory, RowSetKind, Value};

/// 全部五种变体。
pub const ALL_KINDS: [RowSetKind; 5] = [
    RowSetKind::Blocking,
    RowSetKind::Batching,
    RowSetKind::Listening,
    RowSetKind::SingleRow,
    RowSetKind::Queue,
];

/// 容量 10、默认等待 50 毫秒的工厂。
pub fn factory() -> RowSetFactory {
    RowSetFactory::new(
        RowSetConfig::builder()
            .capacity(10)
            .put_timeout(Duration::from_millis(50))
            .get_timeout(Duration::from_millis(50))
            .build()
            .expect("测试配置必须合法"),
    )
}

pub fn create(kind: RowSetKind) -> Arc<dyn RowSet> {
    factory().create(kind).expect("测试配置下所有变体都必须可构造")
}

pub fn schema() -> Arc<RowSchema> {
    Arc::new(RowSchema::default())
}

pub fn row(n: i64) -> Row {
    Row::new(vec![Value::Integer(n)])
}

pub fn value_of(row: &Row) -> i64 {
    match row.get(0) {
        Some(Value::Integer(n)) => *n,
        other => panic!("unexpected row payload: {other:?}"),
    }
}

/// 生产者侧：写入直到被接受。单槽位变体要求同一时刻至多一行在途，因此先等槽位被取走。
pub fn put_until_accepted(row_set: &dyn RowSet, schema: &Arc<RowSchema>, row: Row, single_slot: bool) {
    if single_slot {
        let deadline = Instant::now() + Duration::from_secs(10);
        while row_set.size() > 0 {
            assert!(Instant::now() < deadline, "消费者长时间未取走单槽位中的行");
            std::thread::yield_now();
        }
    }
    let deadline = Instant::now() + Duration::from_secs(10);
    while !row_set.put_row_wait(schema, row.clone(), Duration::from_millis(10)) {
        assert!(Instant::now() < deadline, "写入长时间未被接受");
    }
}

/// 消费者侧：按约定排空：拿到 `None` 时检查结束标志，已结束则再取一次，仍为 `None` 才算排空。
pub fn drain(row_set: &dyn RowSet) -> Vec<i64> {
    let deadline = Instant::now() + Duration::from_secs(20);
    let mut seen = Vec::new();
    loop {
        assert!(Instant::now() < deadline, "排空超时");
        if let Some(row) = row_set.get_row_wait(Duration::from_millis(5)) {
            seen.push(value_of(&row));
            continue;
        }
        if row_set.is_done() {
            match row_set.get_row_wait(Duration::from_millis(5)) {
                Some(row) => seen.push(value_of(&row)),
                None => return seen,
            }
        }
    }
}

/// 生产者侧：以变体默认等待（工厂配置的 50 毫秒）写入，直到被接受。
pub fn put_with_default_wait(row_set: &dyn RowSet, schema: &Arc<RowSchema>, row: Row) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !row_set.put_row(schema, row.clone()) {
        assert!(Instant::now() < deadline, "写入长时间未被接受");
    }
}

/// 消费者侧：以变体默认等待（工厂配置的 50 毫秒）按约定排空。
pub fn drain_with_default_wait(row_set: &dyn RowSet) -> Vec<i64> {
    let deadline = Instant::now() + Duration::from_secs(20);
    let mut seen = Vec::new();
    loop {
        assert!(Instant::now() < deadline, "排空超时");
        if let Some(row) = row_set.get_row() {
            seen.push(value_of(&row));
            continue;
        }
        if row_set.is_done() {
            match row_set.get_row() {
                Some(row) => seen.push(value_of(&row)),
                None => return seen,
            }
        }
    }
}
