//! Commit objects and the commit graph
//!
//! A commit links one tree snapshot to zero, one or two parent commits
//! plus author, timestamp and message. Parent order is meaningful: the
//! first parent is the branch that received a merge. Commits form a DAG
//! whose edges always point at earlier-created, already-persisted
//! objects, so ancestry queries are plain breadth-first traversals with
//! a visited set (merge commits make multiple paths to one ancestor
//! possible).
//!
//! Payload format, header lines then a blank line then the message:
//!
//! ```text
//! tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904
//! parent 7448d8798a4380162d4b56f9b452e2f6f9e24e7a
//! author alice
//! timestamp 2026-08-28T12:00:00+00:00
//!
//! Fix the frobnicator
//! ```

use chrono::{DateTime, Utc};
use std::collections::{HashSet, VecDeque};
use tracing::{debug, trace};

use crate::error::{LedgeError, Result};
use crate::object::{ObjectId, ObjectKind};
use crate::store::ObjectStore;

/// Maximum number of parents a commit may have
pub const MAX_PARENTS: usize = 2;

/// A commit object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Tree snapshot this commit records
    pub tree: ObjectId,
    /// Parent commits in order; 0 = root, 1 = normal, 2 = merge
    pub parents: Vec<ObjectId>,
    /// Author string
    pub author: String,
    /// Creation time
    pub timestamp: DateTime<Utc>,
    /// Commit message
    pub message: String,
}

impl Commit {
    /// Whether this commit has two parents
    pub fn is_merge(&self) -> bool {
        self.parents.len() == 2
    }

    /// First parent, the branch being merged into
    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// Canonical payload encoding
    pub fn encode(&self) -> Vec<u8> {
        let mut payload = format!("tree {}\n", self.tree);
        for parent in &self.parents {
            payload.push_str(&format!("parent {}\n", parent));
        }
        payload.push_str(&format!("author {}\n", self.author.replace('\n', " ")));
        payload.push_str(&format!("timestamp {}\n", self.timestamp.to_rfc3339()));
        payload.push('\n');
        payload.push_str(&self.message);
        payload.into_bytes()
    }

    /// Parse a commit payload loaded under `id`
    pub fn parse(id: &ObjectId, payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| LedgeError::corrupt(id.clone(), "commit payload is not UTF-8"))?;

        let (header, message) = text
            .split_once("\n\n")
            .ok_or_else(|| LedgeError::corrupt(id.clone(), "missing header/message separator"))?;

        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut timestamp = None;

        for line in header.lines() {
            let (key, value) = line
                .split_once(' ')
                .ok_or_else(|| LedgeError::corrupt(id.clone(), format!("bad header line '{}'", line)))?;
            match key {
                "tree" => {
                    tree = Some(ObjectId::from_hex(value).ok_or_else(|| {
                        LedgeError::corrupt(id.clone(), format!("invalid tree id '{}'", value))
                    })?)
                }
                "parent" => parents.push(ObjectId::from_hex(value).ok_or_else(|| {
                    LedgeError::corrupt(id.clone(), format!("invalid parent id '{}'", value))
                })?),
                "author" => author = Some(value.to_string()),
                "timestamp" => {
                    timestamp = Some(
                        DateTime::parse_from_rfc3339(value)
                            .map_err(|e| {
                                LedgeError::corrupt(id.clone(), format!("invalid timestamp: {}", e))
                            })?
                            .with_timezone(&Utc),
                    )
                }
                _ => {
                    return Err(LedgeError::corrupt(
                        id.clone(),
                        format!("unknown header key '{}'", key),
                    ))
                }
            }
        }

        if parents.len() > MAX_PARENTS {
            return Err(LedgeError::corrupt(
                id.clone(),
                format!("{} parents exceeds maximum of {}", parents.len(), MAX_PARENTS),
            ));
        }

        Ok(Commit {
            tree: tree.ok_or_else(|| LedgeError::corrupt(id.clone(), "missing tree header"))?,
            parents,
            author: author
                .ok_or_else(|| LedgeError::corrupt(id.clone(), "missing author header"))?,
            timestamp: timestamp
                .ok_or_else(|| LedgeError::corrupt(id.clone(), "missing timestamp header"))?,
            message: message.to_string(),
        })
    }
}

/// Ancestry queries and commit creation over an [`ObjectStore`]
///
/// The graph never mutates references itself; it only creates commit
/// objects and returns their identities to the caller.
#[derive(Debug)]
pub struct CommitGraph<'a> {
    store: &'a ObjectStore,
}

impl<'a> CommitGraph<'a> {
    /// Create a graph view over a store
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    /// Create a new commit object
    ///
    /// Every parent must resolve to an existing commit object. Unlike
    /// blobs and trees, commits are never skipped for already existing
    /// content; the store's idempotent `put` makes the distinction moot
    /// on disk, and the timestamp makes commits content-unique in
    /// practice anyway.
    ///
    /// # Errors
    ///
    /// - [`LedgeError::InvalidParent`] if a parent is absent or not a commit
    pub fn commit(
        &self,
        tree: ObjectId,
        parents: &[ObjectId],
        author: &str,
        message: &str,
        timestamp: DateTime<Utc>,
    ) -> Result<ObjectId> {
        debug_assert!(parents.len() <= MAX_PARENTS);

        for parent in parents {
            if !self.is_commit(parent) {
                return Err(LedgeError::InvalidParent(parent.clone()));
            }
        }

        let commit = Commit {
            tree,
            parents: parents.to_vec(),
            author: author.to_string(),
            timestamp,
            message: message.to_string(),
        };
        let id = self.store.put(ObjectKind::Commit, &commit.encode())?;

        debug!(
            "Created commit {} ({} parent(s))",
            id.short(),
            parents.len()
        );
        Ok(id)
    }

    /// Load and parse a commit
    pub fn load(&self, id: &ObjectId) -> Result<Commit> {
        let payload = self.store.get_kind(id, ObjectKind::Commit)?;
        Commit::parse(id, &payload)
    }

    /// Whether `candidate` is reachable from `of` via parent links
    ///
    /// Reflexive: every commit is an ancestor of itself.
    pub fn is_ancestor(&self, candidate: &ObjectId, of: &ObjectId) -> Result<bool> {
        let mut queue = VecDeque::from([of.clone()]);
        let mut visited: HashSet<ObjectId> = HashSet::new();

        while let Some(current) = queue.pop_front() {
            if &current == candidate {
                return Ok(true);
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            for parent in self.load(&current)?.parents {
                if !visited.contains(&parent) {
                    queue.push_back(parent);
                }
            }
        }
        Ok(false)
    }

    /// Nearest common ancestor of `a` and `b`
    ///
    /// Computes the full ancestor set of `a`, then walks breadth-first
    /// from `b` and returns the first commit found in that set. When a
    /// criss-cross topology has several equally-near common ancestors,
    /// whichever `b`'s breadth-first order reaches first wins; ties are
    /// not resolved further. Returns `None` when the two tips share no
    /// history at all.
    pub fn merge_base(&self, a: &ObjectId, b: &ObjectId) -> Result<Option<ObjectId>> {
        let ancestors_of_a = self.ancestor_set(a)?;

        let mut queue = VecDeque::from([b.clone()]);
        let mut visited: HashSet<ObjectId> = HashSet::new();

        while let Some(current) = queue.pop_front() {
            if ancestors_of_a.contains(&current) {
                trace!("merge base of {} and {} is {}", a.short(), b.short(), current.short());
                return Ok(Some(current));
            }
            if !visited.insert(current.clone()) {
                continue;
            }
            for parent in self.load(&current)?.parents {
                if !visited.contains(&parent) {
                    queue.push_back(parent);
                }
            }
        }
        Ok(None)
    }

    /// All commits reachable from `tip`, including `tip` itself
    fn ancestor_set(&self, tip: &ObjectId) -> Result<HashSet<ObjectId>> {
        let mut queue = VecDeque::from([tip.clone()]);
        let mut visited: HashSet<ObjectId> = HashSet::new();

        while let Some(current) = queue.pop_front() {
            if !visited.insert(current.clone()) {
                continue;
            }
            for parent in self.load(&current)?.parents {
                if !visited.contains(&parent) {
                    queue.push_back(parent);
                }
            }
        }
        Ok(visited)
    }

    fn is_commit(&self, id: &ObjectId) -> bool {
        matches!(self.store.get(id), Ok((ObjectKind::Commit, _)))
    }
}
