//! 结束标志与 `clear` 的生命周期契约。

use spark_rowset::{RowSet, RowSetKind};

use super::support::{ALL_KINDS, create, drain, row, schema};

/// `set_done` 不丢弃已缓冲的行，且排空后消费者能可靠识别结束。
#[test]
fn done_keeps_buffered_rows() {
    for kind in ALL_KINDS {
        let row_set = create(kind);
        let schema = schema();
        let count = if kind == RowSetKind::SingleRow { 1 } else { 7 };
        for n in 0..count {
            assert!(row_set.put_row(&schema, row(n)), "{kind}: 写入不应被拒绝");
        }
        assert!(!row_set.is_done());
        row_set.set_done();
        assert!(row_set.is_done());
        assert_eq!(drain(row_set.as_ref()), (0..count).collect::<Vec<_>>(), "{kind}");
        assert!(row_set.get_row_immediate().is_none());
    }
}

/// `clear` 清空缓冲、复位结束标志，且连续调用两次与调用一次等价。
#[test]
fn clear_is_idempotent_for_every_variant() {
    for kind in ALL_KINDS {
        let row_set = create(kind);
        let schema = schema();
        for n in 0..4 {
            assert!(row_set.put_row(&schema, row(n)), "{kind}");
        }
        row_set.set_done();

        row_set.clear();
        row_set.clear();
        assert_eq!(row_set.size(), 0, "{kind}: clear 后缓冲必须为空");
        assert!(!row_set.is_done(), "{kind}: clear 后必须重新开放");
        assert!(row_set.get_row_immediate().is_none(), "{kind}");

        assert!(row_set.put_row(&schema, row(42)), "{kind}: clear 后可继续使用");
        row_set.set_done();
        assert_eq!(drain(row_set.as_ref()), vec![42], "{kind}");
    }
}

/// 第一次写入把行结构挂接到行集上，且只有活性上报变体会报告阻塞。
#[test]
fn schema_attaches_and_only_listening_reports_blocking() {
    for kind in ALL_KINDS {
        let row_set = create(kind);
        let schema = schema();
        assert!(row_set.row_schema().is_none(), "{kind}");
        assert!(row_set.put_row(&schema, row(0)), "{kind}");
        assert!(
            row_set
                .row_schema()
                .is_some_and(|attached| std::sync::Arc::ptr_eq(&attached, &schema)),
            "{kind}"
        );
        assert!(!row_set.is_blocking(), "{kind}: 空闲时不应报告阻塞");
    }
}

/// 单槽位变体在同一时刻存在两行时按覆盖处理。
#[test]
fn single_slot_overwrites() {
    let row_set = create(RowSetKind::SingleRow);
    let schema = schema();
    assert!(row_set.put_row(&schema, row(1)));
    assert!(row_set.put_row(&schema, row(2)));
    assert_eq!(row_set.size(), 1);
    row_set.set_done();
    assert_eq!(drain(row_set.as_ref()), vec![2]);
}
