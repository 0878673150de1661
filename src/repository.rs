//! Repository facade
//!
//! `Repository` wires the object store, staged index, references,
//! commit graph and merge engine into the operations a user-facing
//! layer consumes: init/open, add, commit, status, log, branch,
//! checkout and merge. Working-tree I/O (scanning for untracked and
//! modified files, materializing a snapshot after checkout or merge)
//! lives here as well; the core modules below never touch the working
//! tree.

use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::commit::{Commit, CommitGraph};
use crate::error::{LedgeError, Result};
use crate::index::StagedIndex;
use crate::merge::{self, MergeOutcome};
use crate::object::{ObjectId, ObjectKind};
use crate::refs::RefStore;
use crate::store::ObjectStore;
use crate::tree::{self, ChangeKind};

/// Name of the repository data directory inside the working tree
pub const DATA_DIR: &str = ".ledge";

/// Working-tree status: staged, unstaged and untracked paths
#[derive(Debug, Clone)]
pub struct StatusReport {
    /// Branch HEAD points at
    pub branch: String,
    /// Differences between the branch tip's tree and the staged index
    pub staged: BTreeMap<String, ChangeKind>,
    /// Differences between the staged snapshot and the working tree
    pub unstaged: BTreeMap<String, ChangeKind>,
    /// Working-tree files not present in the staged snapshot
    pub untracked: Vec<String>,
}

impl StatusReport {
    /// Whether the working tree matches the branch tip exactly
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }
}

/// A Ledge repository rooted at a working-tree directory
#[derive(Debug)]
pub struct Repository {
    work_root: PathBuf,
    store: ObjectStore,
    refs: RefStore,
}

impl Repository {
    /// Create an empty repository inside `work_root`
    ///
    /// Creates the `.ledge` data directory, an empty object store, an
    /// empty staged index and a HEAD pointing at the default branch.
    /// There is no initial commit.
    ///
    /// # Errors
    ///
    /// - [`LedgeError::RepositoryExists`] if `work_root` already holds one
    pub fn init(work_root: impl Into<PathBuf>) -> Result<Self> {
        let work_root = work_root.into().canonicalize()?;
        let store = ObjectStore::init(work_root.join(DATA_DIR))?;
        let refs = RefStore::init(store.root())?;
        StagedIndex::load(store.root())?.save()?;

        info!("Initialized empty repository in {:?}", work_root);
        Ok(Self {
            work_root,
            store,
            refs,
        })
    }

    /// Open an existing repository inside `work_root`
    pub fn open(work_root: impl Into<PathBuf>) -> Result<Self> {
        let work_root = work_root.into().canonicalize()?;
        let store = ObjectStore::open(work_root.join(DATA_DIR))?;
        let refs = RefStore::open(store.root());
        Ok(Self {
            work_root,
            store,
            refs,
        })
    }

    /// Working-tree root
    pub fn work_root(&self) -> &Path {
        &self.work_root
    }

    /// Branch HEAD points at
    pub fn current_branch(&self) -> Result<String> {
        self.refs.current_branch()
    }

    /// Stage files for the next commit
    ///
    /// Reads each path, stores its content as a blob and records the
    /// path -> blob mapping in the staged index. Staging an unchanged
    /// file is a no-op on the index. Every path is validated before any
    /// index mutation, so a bad path aborts the whole add cleanly.
    ///
    /// # Errors
    ///
    /// - [`LedgeError::CannotStage`] for a missing path, a directory, a
    ///   path outside the repository or inside the data directory
    pub fn add(&self, paths: &[PathBuf]) -> Result<Vec<(String, ObjectId)>> {
        let mut contents = Vec::with_capacity(paths.len());
        for path in paths {
            let rel = self.rel_path(path)?;
            let full = self.work_root.join(&rel);
            if full.is_dir() {
                return Err(LedgeError::cannot_stage(path.clone(), "is a directory"));
            }
            let bytes = fs::read(&full)
                .map_err(|e| LedgeError::cannot_stage(path.clone(), e.to_string()))?;
            contents.push((rel, bytes));
        }

        let mut index = StagedIndex::load(self.store.root())?;
        let mut staged = Vec::with_capacity(contents.len());
        for (rel, bytes) in contents {
            let blob = self.store.put(ObjectKind::Blob, &bytes)?;
            index.insert(rel.clone(), blob.clone());
            staged.push((rel, blob));
        }
        index.save()?;

        debug!("Staged {} path(s)", staged.len());
        Ok(staged)
    }

    /// Create a commit from the staged index
    ///
    /// The committed tree is the branch tip's snapshot overlaid with the
    /// staged entries, built via the tree builder. The branch pointer is
    /// updated first and the index cleared after, so a failure never
    /// loses staged work.
    ///
    /// # Errors
    ///
    /// - [`LedgeError::EmptyCommit`] if nothing is staged on a root
    ///   commit, or the resulting tree equals the tip's tree
    pub fn commit(&self, message: &str, author: &str) -> Result<ObjectId> {
        let mut index = StagedIndex::load(self.store.root())?;
        let tip = self.refs.current_tip(&self.store)?;
        let graph = CommitGraph::new(&self.store);

        let mut entries = match &tip {
            Some(tip_id) => tree::flatten(&self.store, &graph.load(tip_id)?.tree)?,
            None => BTreeMap::new(),
        };
        if tip.is_none() && index.is_empty() {
            return Err(LedgeError::EmptyCommit);
        }
        entries.extend(
            index
                .entries()
                .iter()
                .map(|(p, b)| (p.clone(), b.clone())),
        );

        let tree_id = tree::build(&self.store, &entries)?;
        if let Some(tip_id) = &tip {
            if graph.load(tip_id)?.tree == tree_id {
                return Err(LedgeError::EmptyCommit);
            }
        }

        let parents: Vec<ObjectId> = tip.into_iter().collect();
        let commit_id = graph.commit(tree_id, &parents, author, message, Utc::now())?;

        let branch = self.refs.current_branch()?;
        self.refs.set_branch(&self.store, &branch, &commit_id)?;
        index.clear()?;

        info!("Committed {} on '{}'", commit_id.short(), branch);
        Ok(commit_id)
    }

    /// Compute staged, unstaged and untracked changes
    pub fn status(&self) -> Result<StatusReport> {
        let branch = self.refs.current_branch()?;
        let index = StagedIndex::load(self.store.root())?;
        let graph = CommitGraph::new(&self.store);

        let head_files = match self.refs.current_tip(&self.store)? {
            Some(tip) => tree::flatten(&self.store, &graph.load(&tip)?.tree)?,
            None => BTreeMap::new(),
        };

        // Staged: index entries that differ from the branch tip.
        let mut staged = BTreeMap::new();
        for (path, blob) in index.entries() {
            match head_files.get(path) {
                None => {
                    staged.insert(path.clone(), ChangeKind::Added);
                }
                Some(head_blob) if head_blob != blob => {
                    staged.insert(path.clone(), ChangeKind::Modified);
                }
                Some(_) => {}
            }
        }

        // The snapshot the next commit would record.
        let mut snapshot = head_files;
        snapshot.extend(
            index
                .entries()
                .iter()
                .map(|(p, b)| (p.clone(), b.clone())),
        );

        // Unstaged: snapshot paths whose working-tree content differs.
        let mut unstaged = BTreeMap::new();
        for (path, blob) in &snapshot {
            let full = self.work_root.join(path);
            match fs::read(&full) {
                Ok(bytes) => {
                    if &ObjectId::for_content(ObjectKind::Blob, &bytes) != blob {
                        unstaged.insert(path.clone(), ChangeKind::Modified);
                    }
                }
                Err(_) => {
                    unstaged.insert(path.clone(), ChangeKind::Removed);
                }
            }
        }

        // Untracked: working-tree files outside the snapshot.
        let mut untracked = Vec::new();
        for path in self.working_files()? {
            if !snapshot.contains_key(&path) {
                untracked.push(path);
            }
        }
        untracked.sort();

        Ok(StatusReport {
            branch,
            staged,
            unstaged,
            untracked,
        })
    }

    /// Walk history from a branch tip backward along first parents
    ///
    /// The iterator is lazy and restartable: each call re-walks from the
    /// current tip. `branch` defaults to the current branch.
    pub fn log(&self, branch: Option<&str>) -> Result<History<'_>> {
        let current = self.refs.current_branch()?;
        let name = match branch {
            Some(name) => name.to_string(),
            None => current.clone(),
        };
        let tip = match self.refs.resolve(&self.store, &name) {
            Ok(tip) => Some(tip),
            Err(LedgeError::UnknownBranch(_)) if name == current => None,
            Err(e) => return Err(e),
        };
        Ok(History {
            graph: CommitGraph::new(&self.store),
            next: tip,
        })
    }

    /// Create a branch at the current tip
    ///
    /// # Errors
    ///
    /// - [`LedgeError::NoCommitsYet`] before the first commit
    /// - [`LedgeError::BranchExists`] if the name is taken
    pub fn branch(&self, name: &str) -> Result<()> {
        let tip = self
            .refs
            .current_tip(&self.store)?
            .ok_or(LedgeError::NoCommitsYet)?;
        if self.refs.branch_exists(name) {
            return Err(LedgeError::BranchExists(name.to_string()));
        }
        self.refs.set_branch(&self.store, name, &tip)?;
        info!("Created branch '{}' at {}", name, tip.short());
        Ok(())
    }

    /// All branch names, sorted
    pub fn branches(&self) -> Result<Vec<String>> {
        self.refs.list()
    }

    /// Switch HEAD to another branch and materialize its snapshot
    ///
    /// Refuses when staged changes exist, since they would be silently
    /// carried over to an unrelated tip. Files tracked by the old tip
    /// but absent from the new one are removed from the working tree;
    /// untracked files are left alone.
    ///
    /// # Errors
    ///
    /// - [`LedgeError::StagedChangesPresent`] if the index is non-empty
    /// - [`LedgeError::UnknownBranch`] if the branch does not exist
    pub fn checkout(&self, name: &str) -> Result<()> {
        let index = StagedIndex::load(self.store.root())?;
        if !index.is_empty() {
            return Err(LedgeError::StagedChangesPresent);
        }

        let target = self.refs.resolve(&self.store, name)?;
        let previous = self.refs.current_tip(&self.store)?;

        // HEAD moves only after the working tree is fully rewritten, so
        // a failed materialization leaves the previous branch current.
        self.materialize(previous.as_ref(), &target)?;
        self.refs.set_head(name)?;

        info!("Switched to branch '{}'", name);
        Ok(())
    }

    /// Merge a branch into the current branch
    ///
    /// On fast-forward or merge commit the working tree is materialized
    /// at the new tip. Conflicts refuse the merge and change nothing.
    pub fn merge(&self, source: &str, author: &str) -> Result<MergeOutcome> {
        let target = self.refs.current_branch()?;
        let previous = self.refs.current_tip(&self.store)?;

        let outcome = merge::merge(
            &self.store,
            &self.refs,
            &target,
            source,
            author,
            &format!("Merge branch '{}'", source),
            Utc::now(),
        )?;

        match &outcome {
            MergeOutcome::FastForward(tip) | MergeOutcome::Merged(tip) => {
                self.materialize(previous.as_ref(), tip)?;
            }
            MergeOutcome::NoOp | MergeOutcome::Conflicts(_) => {}
        }
        Ok(outcome)
    }

    /// Rewrite the working tree to match `target`'s snapshot
    fn materialize(&self, previous: Option<&ObjectId>, target: &ObjectId) -> Result<()> {
        let graph = CommitGraph::new(&self.store);
        let new_files = tree::flatten(&self.store, &graph.load(target)?.tree)?;
        let old_files = match previous {
            Some(id) => tree::flatten(&self.store, &graph.load(id)?.tree)?,
            None => BTreeMap::new(),
        };

        for path in old_files.keys() {
            if !new_files.contains_key(path) {
                let full = self.work_root.join(path);
                if full.is_file() {
                    fs::remove_file(&full)?;
                }
                self.remove_empty_parents(&full);
            }
        }

        for (path, blob) in &new_files {
            let (_, bytes) = self.store.get(blob)?;
            let full = self.work_root.join(path);
            // A directory left over from another snapshot may occupy
            // the target path.
            if full.is_dir() {
                fs::remove_dir_all(&full)?;
            }
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full, bytes)?;
        }

        debug!(
            "Materialized {} file(s) at {}",
            new_files.len(),
            target.short()
        );
        Ok(())
    }

    /// Prune directories emptied by a removal, stopping at the work root
    fn remove_empty_parents(&self, path: &Path) {
        let mut dir = path.parent();
        while let Some(d) = dir {
            if d == self.work_root || fs::remove_dir(d).is_err() {
                break;
            }
            dir = d.parent();
        }
    }

    /// Repository-relative path string for a user-supplied path
    fn rel_path(&self, path: &Path) -> Result<String> {
        let full = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_root.join(path)
        };
        let full = full
            .canonicalize()
            .map_err(|_| LedgeError::cannot_stage(path.to_path_buf(), "file not found"))?;
        let rel = full
            .strip_prefix(&self.work_root)
            .map_err(|_| LedgeError::cannot_stage(path.to_path_buf(), "outside the repository"))?;

        let mut segments = Vec::new();
        for component in rel.components() {
            match component.as_os_str().to_str() {
                // Tree payloads are line oriented, so a line break in a
                // name could never be read back.
                Some(s) if s.contains('\n') => {
                    return Err(LedgeError::cannot_stage(
                        path.to_path_buf(),
                        "name contains a line break",
                    ))
                }
                Some(s) => segments.push(s),
                None => {
                    return Err(LedgeError::cannot_stage(
                        path.to_path_buf(),
                        "path is not valid UTF-8",
                    ))
                }
            }
        }
        if segments.first() == Some(&DATA_DIR) {
            return Err(LedgeError::cannot_stage(
                path.to_path_buf(),
                "inside the repository data directory",
            ));
        }
        Ok(segments.join("/"))
    }

    /// All regular files in the working tree, excluding the data directory
    fn working_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.work_root)
            .into_iter()
            .filter_entry(|e| e.file_name() != DATA_DIR);
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if let Ok(rel) = entry.path().strip_prefix(&self.work_root) {
                if let Some(s) = rel.to_str() {
                    files.push(s.replace(std::path::MAIN_SEPARATOR, "/"));
                }
            }
        }
        Ok(files)
    }
}

/// Lazy first-parent walk from a branch tip back to the root
#[derive(Debug)]
pub struct History<'a> {
    graph: CommitGraph<'a>,
    next: Option<ObjectId>,
}

impl Iterator for History<'_> {
    type Item = Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next.take()?;
        match self.graph.load(&id) {
            Ok(commit) => {
                self.next = commit.first_parent().cloned();
                Some(Ok((id, commit)))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn init_repo() -> (Repository, TempDir) {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::init(tmp.path()).unwrap();
        (repo, tmp)
    }

    fn write_file(repo: &Repository, rel: &str, content: &str) {
        let full = repo.work_root().join(rel);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    fn add_and_commit(repo: &Repository, files: &[(&str, &str)], msg: &str) -> ObjectId {
        for (rel, content) in files {
            write_file(repo, rel, content);
        }
        let paths: Vec<PathBuf> = files.iter().map(|(rel, _)| PathBuf::from(rel)).collect();
        repo.add(&paths).unwrap();
        repo.commit(msg, "tester").unwrap()
    }

    #[test]
    fn test_init_creates_empty_repository() {
        let (repo, _tmp) = init_repo();
        assert_eq!(repo.current_branch().unwrap(), "main");
        assert!(repo.branches().unwrap().is_empty());
        assert_eq!(repo.log(None).unwrap().count(), 0);
    }

    #[test]
    fn test_init_twice_fails() {
        let (repo, tmp) = init_repo();
        drop(repo);
        assert!(matches!(
            Repository::init(tmp.path()),
            Err(LedgeError::RepositoryExists(_))
        ));
    }

    #[test]
    fn test_add_rejects_bad_paths() {
        let (repo, _tmp) = init_repo();

        assert!(matches!(
            repo.add(&[PathBuf::from("missing.txt")]),
            Err(LedgeError::CannotStage { .. })
        ));

        fs::create_dir(repo.work_root().join("subdir")).unwrap();
        assert!(matches!(
            repo.add(&[PathBuf::from("subdir")]),
            Err(LedgeError::CannotStage { .. })
        ));

        // A bad path in a batch leaves the index untouched.
        write_file(&repo, "good.txt", "ok");
        let result = repo.add(&[PathBuf::from("good.txt"), PathBuf::from("missing.txt")]);
        assert!(result.is_err());
        assert!(repo.status().unwrap().staged.is_empty());
    }

    #[test]
    fn test_commit_and_log() {
        let (repo, _tmp) = init_repo();
        let first = add_and_commit(&repo, &[("a.txt", "one")], "first");
        let second = add_and_commit(&repo, &[("b.txt", "two")], "second");

        let entries: Vec<_> = repo
            .log(None)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0, second);
        assert_eq!(entries[0].1.message, "second");
        assert_eq!(entries[1].0, first);

        // Restartable: a fresh call walks again from the tip.
        assert_eq!(repo.log(None).unwrap().count(), 2);
    }

    #[test]
    fn test_commit_preserves_previous_files() {
        let (repo, _tmp) = init_repo();
        add_and_commit(&repo, &[("keep.txt", "kept")], "first");
        let second = add_and_commit(&repo, &[("new.txt", "fresh")], "second");

        let graph = CommitGraph::new(&repo.store);
        let files = tree::flatten(&repo.store, &graph.load(&second).unwrap().tree).unwrap();
        assert!(files.contains_key("keep.txt"));
        assert!(files.contains_key("new.txt"));
    }

    #[test]
    fn test_empty_commit_rejected() {
        let (repo, _tmp) = init_repo();
        assert!(matches!(
            repo.commit("nothing", "tester"),
            Err(LedgeError::EmptyCommit)
        ));

        add_and_commit(&repo, &[("a.txt", "one")], "first");

        // Re-staging the identical file gives the tip's tree again.
        repo.add(&[PathBuf::from("a.txt")]).unwrap();
        assert!(matches!(
            repo.commit("no net change", "tester"),
            Err(LedgeError::EmptyCommit)
        ));
    }

    #[test]
    fn test_status_reports_all_three_buckets() {
        let (repo, _tmp) = init_repo();
        add_and_commit(&repo, &[("committed.txt", "v1"), ("edited.txt", "v1")], "base");

        write_file(&repo, "staged.txt", "new");
        repo.add(&[PathBuf::from("staged.txt")]).unwrap();
        write_file(&repo, "edited.txt", "v2");
        write_file(&repo, "loose.txt", "untracked");

        let status = repo.status().unwrap();
        assert_eq!(status.branch, "main");
        assert_eq!(status.staged["staged.txt"], ChangeKind::Added);
        assert_eq!(status.unstaged["edited.txt"], ChangeKind::Modified);
        assert_eq!(status.untracked, vec!["loose.txt".to_string()]);
    }

    #[test]
    fn test_status_reports_deleted_tracked_file() {
        let (repo, _tmp) = init_repo();
        add_and_commit(&repo, &[("doomed.txt", "v1")], "base");
        fs::remove_file(repo.work_root().join("doomed.txt")).unwrap();

        let status = repo.status().unwrap();
        assert_eq!(status.unstaged["doomed.txt"], ChangeKind::Removed);
    }

    #[test]
    fn test_branch_requires_commits_and_unique_name() {
        let (repo, _tmp) = init_repo();
        assert!(matches!(
            repo.branch("feature"),
            Err(LedgeError::NoCommitsYet)
        ));

        add_and_commit(&repo, &[("a.txt", "one")], "first");
        repo.branch("feature").unwrap();
        assert!(matches!(
            repo.branch("feature"),
            Err(LedgeError::BranchExists(_))
        ));
        assert_eq!(repo.branches().unwrap(), vec!["feature", "main"]);
    }

    #[test]
    fn test_checkout_switches_and_materializes() {
        let (repo, _tmp) = init_repo();
        add_and_commit(&repo, &[("shared.txt", "base")], "base");
        repo.branch("feature").unwrap();
        add_and_commit(&repo, &[("main-only.txt", "m")], "on main");

        repo.checkout("feature").unwrap();
        assert_eq!(repo.current_branch().unwrap(), "feature");
        assert!(repo.work_root().join("shared.txt").exists());
        assert!(!repo.work_root().join("main-only.txt").exists());

        repo.checkout("main").unwrap();
        assert!(repo.work_root().join("main-only.txt").exists());
    }

    #[test]
    fn test_checkout_refuses_staged_changes() {
        let (repo, _tmp) = init_repo();
        add_and_commit(&repo, &[("a.txt", "one")], "first");
        repo.branch("feature").unwrap();

        write_file(&repo, "pending.txt", "staged");
        repo.add(&[PathBuf::from("pending.txt")]).unwrap();
        assert!(matches!(
            repo.checkout("feature"),
            Err(LedgeError::StagedChangesPresent)
        ));
    }

    #[test]
    fn test_checkout_swaps_file_and_directory() {
        let (repo, _tmp) = init_repo();
        add_and_commit(&repo, &[("keep.txt", "k")], "base");
        repo.branch("feature").unwrap();
        add_and_commit(&repo, &[("x", "plain file")], "file x on main");

        repo.checkout("feature").unwrap();
        add_and_commit(&repo, &[("x/y", "nested")], "nested x/y on feature");

        // Directory x must give way to the file x, including the
        // emptied directory itself.
        repo.checkout("main").unwrap();
        assert_eq!(repo.current_branch().unwrap(), "main");
        assert!(repo.work_root().join("x").is_file());
        assert_eq!(
            fs::read_to_string(repo.work_root().join("x")).unwrap(),
            "plain file"
        );

        // And back: the file x gives way to the directory.
        repo.checkout("feature").unwrap();
        assert!(repo.work_root().join("x").is_dir());
        assert_eq!(
            fs::read_to_string(repo.work_root().join("x/y")).unwrap(),
            "nested"
        );
    }

    #[test]
    fn test_add_rejects_line_break_in_name() {
        let (repo, _tmp) = init_repo();
        write_file(&repo, "evil\nname", "contents");
        assert!(matches!(
            repo.add(&[PathBuf::from("evil\nname")]),
            Err(LedgeError::CannotStage { .. })
        ));
        assert!(repo.status().unwrap().staged.is_empty());
    }

    #[test]
    fn test_checkout_unknown_branch() {
        let (repo, _tmp) = init_repo();
        add_and_commit(&repo, &[("a.txt", "one")], "first");
        assert!(matches!(
            repo.checkout("ghost"),
            Err(LedgeError::UnknownBranch(_))
        ));
    }

    #[test]
    fn test_merge_updates_working_tree() {
        let (repo, _tmp) = init_repo();
        add_and_commit(&repo, &[("f.txt", "A"), ("g.txt", "X")], "base");
        repo.branch("feature").unwrap();

        add_and_commit(&repo, &[("f.txt", "B")], "change f on main");
        repo.checkout("feature").unwrap();
        add_and_commit(&repo, &[("g.txt", "Y")], "change g on feature");
        repo.checkout("main").unwrap();

        let outcome = repo.merge("feature", "tester").unwrap();
        assert!(matches!(outcome, MergeOutcome::Merged(_)));
        assert_eq!(
            fs::read_to_string(repo.work_root().join("f.txt")).unwrap(),
            "B"
        );
        assert_eq!(
            fs::read_to_string(repo.work_root().join("g.txt")).unwrap(),
            "Y"
        );
    }

    #[test]
    fn test_merge_into_itself_is_noop() {
        let (repo, _tmp) = init_repo();
        add_and_commit(&repo, &[("a.txt", "one")], "first");
        assert_eq!(
            repo.merge("main", "tester").unwrap(),
            MergeOutcome::NoOp
        );
    }
}
