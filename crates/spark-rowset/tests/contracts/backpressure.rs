//! 有界变体的背压契约。

use std::{
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use spark_rowset::{BlockingRowSet, RowSet, RowSetKind};

use super::support::{create, drain_with_default_wait, put_with_default_wait, row, schema};

const TOLERANCE: Duration = Duration::from_millis(500);

/// 写满后有限等待：失败的写入至少等待给定时长，且不会无限挂起。
#[test]
fn full_channel_waits_for_the_given_duration() {
    let row_set = BlockingRowSet::new(2).expect("容量为正");
    let schema = schema();
    assert!(row_set.put_row(&schema, row(0)));
    assert!(row_set.put_row(&schema, row(1)));

    let wait = Duration::from_millis(40);
    let started = Instant::now();
    assert!(!row_set.put_row_wait(&schema, row(2), wait));
    let elapsed = started.elapsed();
    assert!(elapsed >= wait, "提前返回: {elapsed:?}");
    assert!(elapsed < wait + TOLERANCE, "等待过久: {elapsed:?}");
}

#[test]
fn empty_channel_waits_for_the_given_duration() {
    for kind in [RowSetKind::Blocking, RowSetKind::Batching, RowSetKind::Listening] {
        let row_set = create(kind);
        let wait = Duration::from_millis(30);
        let started = Instant::now();
        assert!(row_set.get_row_wait(wait).is_none(), "{kind}");
        let elapsed = started.elapsed();
        assert!(elapsed >= wait, "{kind}: 提前返回 {elapsed:?}");
        assert!(elapsed < wait + TOLERANCE, "{kind}: 等待过久 {elapsed:?}");
    }
}

/// 非阻塞变体无视等待时长。
#[test]
fn non_blocking_variants_never_wait() {
    for kind in [RowSetKind::SingleRow, RowSetKind::Queue] {
        let row_set = create(kind);
        let started = Instant::now();
        assert!(row_set.get_row_wait(Duration::from_secs(2)).is_none(), "{kind}");
        assert!(row_set.put_row_wait(&schema(), row(0), Duration::from_secs(2)), "{kind}");
        assert!(started.elapsed() < Duration::from_secs(1), "{kind}");
    }
}

/// 容量 10、生产 25 行、读写都使用默认等待 50 毫秒：缓冲从不超过容量，消费者恰好收到 25 行，
/// 之后的 `get_row` 在通道已结束且为空时返回 `None`。
#[test]
fn bounded_channel_never_exceeds_capacity() {
    let row_set = create(RowSetKind::Blocking);
    let producer = {
        let row_set = Arc::clone(&row_set);
        thread::spawn(move || {
            let schema = schema();
            for n in 0..25 {
                put_with_default_wait(row_set.as_ref(), &schema, row(n));
                assert!(row_set.size() <= 10);
            }
            row_set.set_done();
        })
    };

    thread::sleep(Duration::from_millis(20));
    assert!(row_set.size() <= 10);
    let seen = drain_with_default_wait(row_set.as_ref());
    producer.join().expect("生产线程不应 panic");

    assert_eq!(seen, (0..25).collect::<Vec<_>>());
    assert!(row_set.get_row().is_none());
}
