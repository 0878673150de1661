//! Merge engine: reconciling two branch tips
//!
//! Given `target` (the current branch) and `source` (the branch being
//! merged in), the merge base classifies the topology:
//!
//! 1. base == source: nothing to do, source is already contained.
//! 2. base == target: fast-forward, the pointer moves with no new commit.
//! 3. Otherwise a three-way merge over `diff(base, target)` and
//!    `diff(base, source)`: paths touched by one side take that side,
//!    paths both sides changed to the same blob identity auto-resolve,
//!    anything else (including remove-vs-modify, and a file on one side
//!    colliding with a directory of the same name on the other) is a
//!    conflict.
//!
//! Conflicts refuse the merge: no conflict markers are written, no
//! commit is created and the target branch is left untouched. All four
//! outcomes are first-class values; only structural problems (unknown
//! branch, missing object) surface as errors. A merge commit's writes
//! are ordered objects-first, pointer-last, so a failure never leaves a
//! half-applied merge behind.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use crate::commit::CommitGraph;
use crate::error::Result;
use crate::object::ObjectId;
use crate::refs::RefStore;
use crate::store::ObjectStore;
use crate::tree;

/// Result of a merge, reported as a value the caller must branch on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Source is already fully contained in target
    NoOp,
    /// Target pointer moved to the source tip; no new commit created
    FastForward(ObjectId),
    /// A new merge commit was created and the target pointer moved to it
    Merged(ObjectId),
    /// Colliding paths; the merge was refused and nothing was changed
    Conflicts(Vec<String>),
}

/// Merge `source_branch` into `target_branch`
///
/// `author`, `message` and `timestamp` are used only when a merge
/// commit is actually created. The first parent of that commit is the
/// target tip (the branch that received the merge).
pub fn merge(
    store: &ObjectStore,
    refs: &RefStore,
    target_branch: &str,
    source_branch: &str,
    author: &str,
    message: &str,
    timestamp: DateTime<Utc>,
) -> Result<MergeOutcome> {
    let target = refs.resolve(store, target_branch)?;
    let source = refs.resolve(store, source_branch)?;
    let graph = CommitGraph::new(store);

    let base = graph.merge_base(&target, &source)?;

    if base.as_ref() == Some(&source) {
        debug!("'{}' already contains '{}'", target_branch, source_branch);
        return Ok(MergeOutcome::NoOp);
    }
    if base.as_ref() == Some(&target) {
        refs.set_branch(store, target_branch, &source)?;
        info!(
            "Fast-forwarded '{}' to {}",
            target_branch,
            source.short()
        );
        return Ok(MergeOutcome::FastForward(source));
    }

    // True divergence. Disjoint histories (no base at all) merge against
    // the empty tree: every path counts as touched on both sides it
    // appears on.
    let base_tree = match &base {
        Some(id) => graph.load(id)?.tree,
        None => tree::build(store, &BTreeMap::new())?,
    };
    let target_tree = graph.load(&target)?.tree;
    let source_tree = graph.load(&source)?.tree;

    let target_changes = tree::diff(store, &base_tree, &target_tree)?;
    let source_changes = tree::diff(store, &base_tree, &source_tree)?;

    let base_files = tree::flatten(store, &base_tree)?;
    let target_files = tree::flatten(store, &target_tree)?;
    let source_files = tree::flatten(store, &source_tree)?;

    let mut merged = base_files;
    let mut conflicts = Vec::new();

    let touched: BTreeSet<&String> = target_changes.keys().chain(source_changes.keys()).collect();
    for path in touched {
        let by_target = target_changes.contains_key(path);
        let by_source = source_changes.contains_key(path);

        let resolution = match (by_target, by_source) {
            (true, false) => target_files.get(path),
            (false, true) => source_files.get(path),
            (true, true) => {
                // Both sides touched the path: identical results (same
                // blob, or both removed) auto-resolve, anything else
                // conflicts.
                if target_files.get(path) == source_files.get(path) {
                    target_files.get(path)
                } else {
                    conflicts.push(path.clone());
                    continue;
                }
            }
            (false, false) => unreachable!(),
        };

        match resolution {
            Some(blob) => {
                merged.insert(path.clone(), blob.clone());
            }
            None => {
                merged.remove(path);
            }
        }
    }

    // A tree cannot hold a blob and a subtree under the same name, so a
    // merged path that is a directory prefix of another merged path is a
    // conflict even though the two sides never touched the same path.
    for path in merged.keys() {
        let dir = format!("{}/", path);
        if merged
            .range(dir.clone()..)
            .next()
            .is_some_and(|(next, _)| next.starts_with(&dir))
        {
            conflicts.push(path.clone());
        }
    }
    conflicts.sort();
    conflicts.dedup();

    if !conflicts.is_empty() {
        info!(
            "Merge of '{}' into '{}' refused: {} conflicting path(s)",
            source_branch,
            target_branch,
            conflicts.len()
        );
        return Ok(MergeOutcome::Conflicts(conflicts));
    }

    let merged_tree = tree::build(store, &merged)?;
    let merge_commit = graph.commit(
        merged_tree,
        &[target.clone(), source.clone()],
        author,
        message,
        timestamp,
    )?;
    refs.set_branch(store, target_branch, &merge_commit)?;

    info!(
        "Merged '{}' into '{}' as {}",
        source_branch,
        target_branch,
        merge_commit.short()
    );
    Ok(MergeOutcome::Merged(merge_commit))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;
    use crate::store::tests::create_test_store;
    use walkdir::WalkDir;

    struct Fixture {
        store: ObjectStore,
        refs: RefStore,
        _tmp: tempfile::TempDir,
    }

    fn setup() -> Fixture {
        let (store, tmp) = create_test_store();
        let refs = RefStore::init(store.root()).unwrap();
        Fixture {
            store,
            refs,
            _tmp: tmp,
        }
    }

    impl Fixture {
        /// Commit a flat path -> content mapping onto a branch
        fn commit_on(
            &self,
            branch: &str,
            files: &[(&str, &str)],
            parents: &[ObjectId],
            msg: &str,
        ) -> ObjectId {
            let entries: BTreeMap<String, ObjectId> = files
                .iter()
                .map(|(p, c)| {
                    (
                        p.to_string(),
                        self.store.put(ObjectKind::Blob, c.as_bytes()).unwrap(),
                    )
                })
                .collect();
            let tree_id = tree::build(&self.store, &entries).unwrap();
            let graph = CommitGraph::new(&self.store);
            let id = graph
                .commit(tree_id, parents, "tester", msg, Utc::now())
                .unwrap();
            self.refs.set_branch(&self.store, branch, &id).unwrap();
            id
        }

        fn merge(&self, target: &str, source: &str) -> MergeOutcome {
            merge(
                &self.store,
                &self.refs,
                target,
                source,
                "tester",
                &format!("Merge branch '{}'", source),
                Utc::now(),
            )
            .unwrap()
        }

        fn object_count(&self) -> usize {
            WalkDir::new(self.store.root().join("objects"))
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .count()
        }

        fn tip_files(&self, branch: &str) -> BTreeMap<String, ObjectId> {
            let tip = self.refs.resolve(&self.store, branch).unwrap();
            let commit = CommitGraph::new(&self.store).load(&tip).unwrap();
            tree::flatten(&self.store, &commit.tree).unwrap()
        }
    }

    #[test]
    fn test_noop_when_source_contained() {
        let f = setup();
        let root = f.commit_on("main", &[("f", "A")], &[], "root");
        f.commit_on("main", &[("f", "B")], &[root.clone()], "ahead");
        f.refs.set_branch(&f.store, "feature", &root).unwrap();

        assert_eq!(f.merge("main", "feature"), MergeOutcome::NoOp);
    }

    #[test]
    fn test_fast_forward_moves_pointer_without_new_objects() {
        let f = setup();
        let root = f.commit_on("main", &[("f", "A")], &[], "root");
        let ahead = f.commit_on("feature", &[("f", "B")], &[root], "ahead");

        let before = f.object_count();
        let outcome = f.merge("main", "feature");

        assert_eq!(outcome, MergeOutcome::FastForward(ahead.clone()));
        assert_eq!(f.refs.resolve(&f.store, "main").unwrap(), ahead);
        assert_eq!(f.object_count(), before);
    }

    #[test]
    fn test_clean_three_way_merge() {
        let f = setup();
        let base = f.commit_on("main", &[("f", "A"), ("g", "X")], &[], "base");
        let target = f.commit_on(
            "main",
            &[("f", "B"), ("g", "X")],
            &[base.clone()],
            "change f",
        );
        let source = f.commit_on(
            "feature",
            &[("f", "A"), ("g", "Y")],
            &[base],
            "change g",
        );

        let outcome = f.merge("main", "feature");
        let merged = match outcome {
            MergeOutcome::Merged(id) => id,
            other => panic!("expected merge commit, got {:?}", other),
        };

        let commit = CommitGraph::new(&f.store).load(&merged).unwrap();
        assert_eq!(commit.parents, vec![target, source]);

        let files = f.tip_files("main");
        assert_eq!(files["f"], ObjectId::for_content(ObjectKind::Blob, b"B"));
        assert_eq!(files["g"], ObjectId::for_content(ObjectKind::Blob, b"Y"));
    }

    #[test]
    fn test_conflict_leaves_target_untouched() {
        let f = setup();
        let base = f.commit_on("main", &[("f", "A")], &[], "base");
        let target = f.commit_on("main", &[("f", "B")], &[base.clone()], "target");
        f.commit_on("feature", &[("f", "C")], &[base], "source");

        let outcome = f.merge("main", "feature");
        assert_eq!(outcome, MergeOutcome::Conflicts(vec!["f".to_string()]));
        assert_eq!(f.refs.resolve(&f.store, "main").unwrap(), target);
    }

    #[test]
    fn test_remove_vs_modify_conflicts() {
        let f = setup();
        let base = f.commit_on("main", &[("f", "A"), ("keep", "K")], &[], "base");
        f.commit_on("main", &[("keep", "K")], &[base.clone()], "remove f");
        f.commit_on("feature", &[("f", "A2"), ("keep", "K")], &[base], "modify f");

        assert_eq!(
            f.merge("main", "feature"),
            MergeOutcome::Conflicts(vec!["f".to_string()])
        );
    }

    #[test]
    fn test_both_sides_same_change_auto_resolves() {
        let f = setup();
        let base = f.commit_on("main", &[("f", "A"), ("g", "X")], &[], "base");
        f.commit_on("main", &[("f", "SAME"), ("g", "X")], &[base.clone()], "t");
        f.commit_on("feature", &[("f", "SAME"), ("g", "X")], &[base], "s");

        let outcome = f.merge("main", "feature");
        assert!(matches!(outcome, MergeOutcome::Merged(_)));
        assert_eq!(
            f.tip_files("main")["f"],
            ObjectId::for_content(ObjectKind::Blob, b"SAME")
        );
    }

    #[test]
    fn test_both_sides_remove_auto_resolves() {
        let f = setup();
        let base = f.commit_on("main", &[("f", "A"), ("g", "X")], &[], "base");
        f.commit_on("main", &[("g", "X2")], &[base.clone()], "t");
        f.commit_on("feature", &[("g", "X")], &[base], "s");

        let outcome = f.merge("main", "feature");
        assert!(matches!(outcome, MergeOutcome::Merged(_)));
        assert!(!f.tip_files("main").contains_key("f"));
    }

    #[test]
    fn test_file_vs_directory_addition_conflicts() {
        let f = setup();
        let base = f.commit_on("main", &[("keep", "K")], &[], "base");
        let target = f.commit_on(
            "main",
            &[("keep", "K"), ("x", "file")],
            &[base.clone()],
            "add file x",
        );
        f.commit_on(
            "feature",
            &[("keep", "K"), ("x/y", "nested")],
            &[base],
            "add nested x/y",
        );

        // Distinct paths, but they cannot coexist in one tree.
        assert_eq!(
            f.merge("main", "feature"),
            MergeOutcome::Conflicts(vec!["x".to_string()])
        );
        assert_eq!(f.refs.resolve(&f.store, "main").unwrap(), target);
    }

    #[test]
    fn test_disjoint_histories_merge_against_empty_base() {
        let f = setup();
        f.commit_on("main", &[("a", "1")], &[], "island one");
        f.commit_on("feature", &[("b", "2")], &[], "island two");

        let outcome = f.merge("main", "feature");
        assert!(matches!(outcome, MergeOutcome::Merged(_)));

        let files = f.tip_files("main");
        assert!(files.contains_key("a"));
        assert!(files.contains_key("b"));
    }

    #[test]
    fn test_disjoint_histories_conflict_on_same_path() {
        let f = setup();
        f.commit_on("main", &[("shared", "mine")], &[], "island one");
        f.commit_on("feature", &[("shared", "theirs")], &[], "island two");

        assert_eq!(
            f.merge("main", "feature"),
            MergeOutcome::Conflicts(vec!["shared".to_string()])
        );
    }
}
