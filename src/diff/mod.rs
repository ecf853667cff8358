//! Structural diff engine: compares two snapshots and emits change records.
//!
//! Walk order at every mapping level is: keys of `before` in their order,
//! then keys that only exist in `after`, in `after`'s order. Sequences are
//! compared by position only. A key present on one side only is reported
//! as a single `added`/`removed` record carrying the whole subtree, at any
//! depth (components included).

use indexmap::IndexMap;

use crate::models::{Change, Node, Path, Snapshot};

/// Compute every difference between two snapshots.
pub fn diff(before: &Snapshot, after: &Snapshot) -> Vec<Change> {
    let mut changes = Vec::new();
    diff_mappings(before.as_map(), after.as_map(), &Path::root(), &mut changes);
    tracing::debug!(changes = changes.len(), "snapshots compared");
    changes
}

/// Compute every difference between two arbitrary nodes.
///
/// Two unequal scalars at the root produce a single `changed` record with
/// an empty path.
pub fn diff_nodes(before: &Node, after: &Node) -> Vec<Change> {
    let mut changes = Vec::new();
    diff_node(before, after, &Path::root(), &mut changes);
    changes
}

fn diff_node(before: &Node, after: &Node, path: &Path, out: &mut Vec<Change>) {
    match (before, after) {
        (Node::Mapping(old), Node::Mapping(new)) => diff_mappings(old, new, path, out),
        (Node::Sequence(old), Node::Sequence(new)) => diff_sequences(old, new, path, out),
        // scalars, or a type mismatch: compare as opaque wholes
        _ => {
            if before != after {
                out.push(Change::changed(path.clone(), before.clone(), after.clone()));
            }
        }
    }
}

fn diff_mappings(
    before: &IndexMap<String, Node>,
    after: &IndexMap<String, Node>,
    path: &Path,
    out: &mut Vec<Change>,
) {
    for (key, old) in before {
        let child = path.key(key);
        match after.get(key) {
            Some(new) => diff_node(old, new, &child, out),
            None => out.push(Change::removed(child, old.clone())),
        }
    }

    for (key, new) in after {
        if !before.contains_key(key) {
            out.push(Change::added(path.key(key), new.clone()));
        }
    }
}

fn diff_sequences(before: &[Node], after: &[Node], path: &Path, out: &mut Vec<Change>) {
    let shared = before.len().min(after.len());

    for (i, (old, new)) in before.iter().zip(after).enumerate() {
        diff_node(old, new, &path.index(i), out);
    }

    for (i, old) in before.iter().enumerate().skip(shared) {
        out.push(Change::removed(path.index(i), old.clone()));
    }
    for (i, new) in after.iter().enumerate().skip(shared) {
        out.push(Change::added(path.index(i), new.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChangeKind;
    use pretty_assertions::assert_eq;

    fn path(keys: &[&str]) -> Path {
        keys.iter().copied().collect()
    }

    fn sample() -> Snapshot {
        Snapshot::new()
            .with_component(
                "app_a",
                [
                    ("timeout", Node::from(30)),
                    ("mode", Node::from("fast")),
                    ("hosts", Node::sequence(["a", "b"])),
                    ("db", Node::mapping([("port", Node::from(5432)), ("ssl", Node::Null)])),
                ],
            )
            .with_component("app_b", [("enabled", true)])
    }

    #[test]
    fn identical_snapshots_have_no_changes() {
        let s = sample();
        assert!(diff(&s, &s).is_empty());
        assert!(diff(&Snapshot::new(), &Snapshot::new()).is_empty());
    }

    #[test]
    fn scalar_change_and_added_component() {
        let before = Snapshot::new().with_component(
            "app_a",
            [("timeout", Node::from(30)), ("mode", Node::from("fast"))],
        );
        let after = Snapshot::new()
            .with_component(
                "app_a",
                [("timeout", Node::from(60)), ("mode", Node::from("fast"))],
            )
            .with_component("app_b", [("enabled", true)]);

        let changes = diff(&before, &after);
        assert_eq!(
            changes,
            vec![
                Change::changed(path(&["app_a", "timeout"]), 30.into(), 60.into()),
                Change::added(path(&["app_b"]), Node::mapping([("enabled", true)])),
            ]
        );
    }

    #[test]
    fn removed_component_is_one_subtree_record() {
        let before = sample();
        let after = Snapshot::new().with_component("app_b", [("enabled", true)]);

        let changes = diff(&before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, path(&["app_a"]));
        assert!(matches!(changes[0].kind, ChangeKind::Removed { old: Node::Mapping(_) }));
    }

    #[test]
    fn nested_mappings_recurse_to_leaves() {
        let before = Snapshot::new().with_component(
            "repo",
            [("db", Node::mapping([("port", 5432), ("pool", 10)]))],
        );
        let after = Snapshot::new().with_component(
            "repo",
            [("db", Node::mapping([("port", 5433), ("pool", 10)]))],
        );
        assert_eq!(
            diff(&before, &after),
            vec![Change::changed(path(&["repo", "db", "port"]), 5432.into(), 5433.into())]
        );
    }

    #[test]
    fn sequences_compare_positionally() {
        let before = Node::sequence(["a", "b", "c"]);
        let after = Node::sequence(["a", "x"]);
        assert_eq!(
            diff_nodes(&before, &after),
            vec![
                Change::changed(Path::root().index(1), "b".into(), "x".into()),
                Change::removed(Path::root().index(2), "c".into()),
            ]
        );
    }

    #[test]
    fn longer_after_sequence_reports_trailing_additions() {
        let before = Node::sequence([1]);
        let after = Node::sequence([1, 2, 3]);
        assert_eq!(
            diff_nodes(&before, &after),
            vec![
                Change::added(Path::root().index(1), 2.into()),
                Change::added(Path::root().index(2), 3.into()),
            ]
        );
    }

    #[test]
    fn sequence_is_not_content_aligned() {
        // an insertion at the front shifts every position
        let before = Node::sequence(["b", "c"]);
        let after = Node::sequence(["a", "b", "c"]);
        let changes = diff_nodes(&before, &after);
        assert_eq!(changes.len(), 3);
        assert_eq!(changes[2], Change::added(Path::root().index(2), "c".into()));
    }

    #[test]
    fn nested_mapping_inside_sequence() {
        let before = Node::sequence([Node::mapping([("name", "a"), ("weight", "1")])]);
        let after = Node::sequence([Node::mapping([("name", "a"), ("weight", "2")])]);
        assert_eq!(
            diff_nodes(&before, &after),
            vec![Change::changed(
                Path::root().index(0).key("weight"),
                "1".into(),
                "2".into()
            )]
        );
    }

    #[test]
    fn type_mismatch_is_single_opaque_change() {
        let before = Node::mapping([("url", Node::mapping([("host", "x")]))]);
        let after = Node::mapping([("url", "postgres://x")]);
        let changes = diff_nodes(&before, &after);
        assert_eq!(
            changes,
            vec![Change::changed(
                Path::root().key("url"),
                Node::mapping([("host", "x")]),
                "postgres://x".into()
            )]
        );
    }

    #[test]
    fn integer_versus_float_is_a_change() {
        let changes = diff_nodes(&Node::Integer(1), &Node::Float(1.0));
        assert_eq!(changes.len(), 1);
        assert!(changes[0].path.is_root());
    }

    #[test]
    fn null_to_value_is_a_change_not_an_addition() {
        let before = Node::mapping([("ssl", Node::Null)]);
        let after = Node::mapping([("ssl", true)]);
        assert_eq!(
            diff_nodes(&before, &after),
            vec![Change::changed(Path::root().key("ssl"), Node::Null, true.into())]
        );
    }

    #[test]
    fn ordering_follows_before_then_after_only_keys() {
        let before = Node::mapping([("b", 1), ("a", 1), ("gone", 1)]);
        let after = Node::mapping([("new2", 1), ("a", 2), ("b", 2), ("new1", 1)]);
        let paths: Vec<String> = diff_nodes(&before, &after)
            .iter()
            .map(|c| c.path.to_string())
            .collect();
        assert_eq!(paths, vec!["b", "a", "gone", "new2", "new1"]);
    }

    #[test]
    fn diff_is_antisymmetric() {
        let before = sample();
        let mut after = sample();
        after.insert_component(
            "app_a",
            [
                ("timeout".to_string(), Node::from(45)),
                ("hosts".to_string(), Node::sequence(["a", "b", "c"])),
                ("extra".to_string(), Node::from("x")),
            ]
            .into_iter()
            .collect(),
        );

        let forward = diff(&before, &after);
        let backward = diff(&after, &before);
        assert_eq!(forward.len(), backward.len());

        for change in &forward {
            let mirrored = match &change.kind {
                ChangeKind::Added { new } => Change::removed(change.path.clone(), new.clone()),
                ChangeKind::Removed { old } => Change::added(change.path.clone(), old.clone()),
                ChangeKind::Changed { old, new } => {
                    Change::changed(change.path.clone(), new.clone(), old.clone())
                }
            };
            assert!(backward.contains(&mirrored), "missing mirror of {change:?}");
        }
    }
}
