//! 单生产者/单消费者并发交接：顺序与不丢行。

use std::{sync::Arc, thread};

use spark_rowset::{RowSet, RowSetKind};

use super::support::{ALL_KINDS, create, drain, put_until_accepted, row, schema};

const ROWS: i64 = 2_000;

#[test]
fn spsc_preserves_order_without_loss() {
    for kind in ALL_KINDS {
        let row_set = create(kind);
        let single_slot = kind == RowSetKind::SingleRow;
        let producer = {
            let row_set = Arc::clone(&row_set);
            thread::spawn(move || {
                let schema = schema();
                for n in 0..ROWS {
                    put_until_accepted(row_set.as_ref(), &schema, row(n), single_slot);
                }
                row_set.set_done();
            })
        };

        let seen = drain(row_set.as_ref());
        producer.join().expect("生产线程不应 panic");
        assert_eq!(seen, (0..ROWS).collect::<Vec<_>>(), "{kind}: 顺序或数量不符");
        assert_eq!(row_set.size(), 0, "{kind}");
    }
}

/// 批量变体：行数不是批次大小整数倍时，最后一个不满的批次在 `set_done` 后仍可完整读出。
#[test]
fn batching_flushes_partial_tail_under_concurrency() {
    let row_set = create(RowSetKind::Batching);
    let producer = {
        let row_set = Arc::clone(&row_set);
        thread::spawn(move || {
            let schema = schema();
            for n in 0..23 {
                put_until_accepted(row_set.as_ref(), &schema, row(n), false);
            }
            row_set.set_done();
        })
    };
    let seen = drain(row_set.as_ref());
    producer.join().expect("生产线程不应 panic");
    assert_eq!(seen, (0..23).collect::<Vec<_>>());
}
