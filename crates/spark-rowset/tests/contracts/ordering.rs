//! 身份展示与目标三元组排序。

use std::sync::Arc;

use spark_rowset::{RowSet, RowSetKind};

use super::support::{ALL_KINDS, create};

fn wired(kind: RowSetKind, from: &str, from_copy: u32, to: &str, to_copy: u32) -> Arc<dyn RowSet> {
    let row_set = create(kind);
    row_set.set_thread_name_from_to_copy(from, from_copy, to, to_copy);
    row_set
}

#[test]
fn rendering_is_uniform_across_variants() {
    for kind in ALL_KINDS {
        let row_set = wired(kind, "Input", 0, "Filter", 3);
        assert_eq!(row_set.to_string(), "Input.0 - Filter.3", "{kind}");
        row_set.set_remote_peer(Some("node-b"));
        assert_eq!(row_set.to_string(), "Input.0 - Filter.3 (node-b)", "{kind}");
    }
    assert_eq!(create(RowSetKind::Queue).to_string(), "?.0 - ?.0");
}

#[test]
fn sorting_ignores_origin_and_mixes_variants() {
    let mut row_sets = vec![
        wired(RowSetKind::Blocking, "Z", 9, "Sink", 10),
        wired(RowSetKind::Queue, "A", 0, "Sink", 2),
        wired(RowSetKind::Batching, "M", 1, "Merge", 0),
        wired(RowSetKind::SingleRow, "B", 4, "Sink", 2),
    ];
    row_sets.sort_by(|a, b| a.as_ref().cmp(b.as_ref()));
    let names: Vec<String> = row_sets.iter().map(|r| r.to_string()).collect();
    assert_eq!(
        names,
        ["M.1 - Merge.0", "A.0 - Sink.2", "B.4 - Sink.2", "Z.9 - Sink.10"]
    );
    assert!(
        row_sets[1].as_ref() == row_sets[2].as_ref(),
        "来源不同但目标相同的行集视为相等"
    );
}

#[test]
fn remote_peer_sorts_before_step_name() {
    let local = wired(RowSetKind::Queue, "A", 0, "A", 0);
    let remote = wired(RowSetKind::Queue, "A", 0, "A", 0);
    remote.set_remote_peer(Some("alpha"));
    assert!(local.as_ref() < remote.as_ref(), "未设置远端节点的行集排在前面");
}
