//! Tree objects: building, reading, flattening and diffing
//!
//! A tree is a directory snapshot: an ordered sequence of
//! `(name, kind, target)` entries, hashed as one object. Building from a
//! flat path -> blob mapping proceeds bottom-up so a parent tree only
//! ever references already-persisted children, and entries are sorted by
//! name at every level, which makes the resulting identity a pure
//! function of the mapping itself. A tree's identity never depends on
//! modification times or absolute paths.
//!
//! The payload format is one line per entry, sorted by name:
//!
//! ```text
//! blob 2aae6c35c94fcfb415dbe95f408b9ce91ee846ed hello.txt
//! tree 4b825dc642cb6eb9a060e54bf8d69288fbee4904 src
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{LedgeError, Result};
use crate::object::{ObjectId, ObjectKind};
use crate::store::ObjectStore;

/// Kind of a tree entry target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// Entry references a blob (file content)
    Blob,
    /// Entry references a nested tree (subdirectory)
    Tree,
}

impl EntryKind {
    fn tag(&self) -> &'static str {
        match self {
            EntryKind::Blob => "blob",
            EntryKind::Tree => "tree",
        }
    }

    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "blob" => Some(EntryKind::Blob),
            "tree" => Some(EntryKind::Tree),
            _ => None,
        }
    }
}

/// Single entry of a tree object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Path segment (no separators)
    pub name: String,
    /// Whether the target is a blob or a nested tree
    pub kind: EntryKind,
    /// Identity of the referenced object
    pub target: ObjectId,
}

/// How a path changed between two trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeKind {
    /// Path exists only in the newer tree
    Added,
    /// Path exists only in the older tree
    Removed,
    /// Path exists in both with different blob identities
    Modified,
}

/// Build a tree object graph from a flat path -> blob mapping
///
/// Paths use `/` as separator. Entries are grouped by their top-level
/// segment; nested segments become sub-trees, persisted bottom-up via
/// [`ObjectStore::put`]. An empty mapping yields the well-defined empty
/// tree, distinct from any non-empty tree.
///
/// # Errors
///
/// - [`LedgeError::InvalidPath`] if one path is a directory prefix of
///   another (a tree cannot hold a blob and a subtree under one name)
///   or a name contains a line break
pub fn build(store: &ObjectStore, entries: &BTreeMap<String, ObjectId>) -> Result<ObjectId> {
    build_at(store, entries, "")
}

fn build_at(
    store: &ObjectStore,
    entries: &BTreeMap<String, ObjectId>,
    prefix: &str,
) -> Result<ObjectId> {
    let mut files: BTreeMap<String, ObjectId> = BTreeMap::new();
    let mut dirs: BTreeMap<String, BTreeMap<String, ObjectId>> = BTreeMap::new();

    for (path, blob) in entries {
        match path.split_once('/') {
            None => {
                files.insert(path.clone(), blob.clone());
            }
            Some((dir, rest)) => {
                dirs.entry(dir.to_string())
                    .or_default()
                    .insert(rest.to_string(), blob.clone());
            }
        }
    }

    for name in files.keys() {
        if dirs.contains_key(name) {
            return Err(LedgeError::invalid_path(
                join(prefix, name),
                "path is both a file and a directory",
            ));
        }
    }
    for name in files.keys().chain(dirs.keys()) {
        if name.is_empty() || name.contains('\n') {
            return Err(LedgeError::invalid_path(
                join(prefix, name),
                "name is empty or contains a line break",
            ));
        }
    }

    let mut tree: BTreeMap<String, TreeEntry> = BTreeMap::new();
    for (name, blob) in files {
        tree.insert(
            name.clone(),
            TreeEntry {
                name,
                kind: EntryKind::Blob,
                target: blob,
            },
        );
    }
    for (name, sub_entries) in dirs {
        let sub_id = build_at(store, &sub_entries, &join(prefix, &name))?;
        tree.insert(
            name.clone(),
            TreeEntry {
                name,
                kind: EntryKind::Tree,
                target: sub_id,
            },
        );
    }

    store.put(ObjectKind::Tree, &encode(tree.values()))
}

/// Read and parse a tree object
pub fn read(store: &ObjectStore, id: &ObjectId) -> Result<Vec<TreeEntry>> {
    let payload = store.get_kind(id, ObjectKind::Tree)?;
    parse(id, &payload)
}

/// Flatten a tree into a path -> blob mapping
pub fn flatten(store: &ObjectStore, id: &ObjectId) -> Result<BTreeMap<String, ObjectId>> {
    let mut out = BTreeMap::new();
    collect(store, id, "", &mut out)?;
    Ok(out)
}

/// Structural diff between two trees
///
/// Returns the set of changed paths with their change kind. Descent
/// stops as soon as a subtree's identity matches on both sides, which
/// bounds the comparison by the size of the changed region rather than
/// the whole snapshot.
pub fn diff(
    store: &ObjectStore,
    old: &ObjectId,
    new: &ObjectId,
) -> Result<BTreeMap<String, ChangeKind>> {
    let mut changes = BTreeMap::new();
    diff_trees(store, Some(old), Some(new), "", &mut changes)?;
    Ok(changes)
}

fn encode<'a>(entries: impl Iterator<Item = &'a TreeEntry>) -> Vec<u8> {
    let mut payload = String::new();
    for entry in entries {
        payload.push_str(entry.kind.tag());
        payload.push(' ');
        payload.push_str(entry.target.as_str());
        payload.push(' ');
        payload.push_str(&entry.name);
        payload.push('\n');
    }
    payload.into_bytes()
}

fn parse(id: &ObjectId, payload: &[u8]) -> Result<Vec<TreeEntry>> {
    let text = std::str::from_utf8(payload)
        .map_err(|_| LedgeError::corrupt(id.clone(), "tree payload is not UTF-8"))?;

    let mut entries = Vec::new();
    for line in text.lines() {
        let mut parts = line.splitn(3, ' ');
        let (tag, target, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(t), Some(h), Some(n)) if !n.is_empty() => (t, h, n),
            _ => {
                return Err(LedgeError::corrupt(
                    id.clone(),
                    format!("malformed tree entry '{}'", line),
                ))
            }
        };

        let kind = EntryKind::from_tag(tag).ok_or_else(|| {
            LedgeError::corrupt(id.clone(), format!("unknown entry kind '{}'", tag))
        })?;
        let target = ObjectId::from_hex(target).ok_or_else(|| {
            LedgeError::corrupt(id.clone(), format!("invalid entry target '{}'", target))
        })?;

        entries.push(TreeEntry {
            name: name.to_string(),
            kind,
            target,
        });
    }
    Ok(entries)
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

fn collect(
    store: &ObjectStore,
    id: &ObjectId,
    prefix: &str,
    out: &mut BTreeMap<String, ObjectId>,
) -> Result<()> {
    for entry in read(store, id)? {
        let path = join(prefix, &entry.name);
        match entry.kind {
            EntryKind::Blob => {
                out.insert(path, entry.target);
            }
            EntryKind::Tree => collect(store, &entry.target, &path, out)?,
        }
    }
    Ok(())
}

/// Record every leaf path under an entry as `change`
fn record_subtree(
    store: &ObjectStore,
    entry: &TreeEntry,
    prefix: &str,
    change: ChangeKind,
    out: &mut BTreeMap<String, ChangeKind>,
) -> Result<()> {
    let path = join(prefix, &entry.name);
    match entry.kind {
        EntryKind::Blob => {
            out.insert(path, change);
        }
        EntryKind::Tree => {
            let mut leaves = BTreeMap::new();
            collect(store, &entry.target, &path, &mut leaves)?;
            for leaf in leaves.into_keys() {
                out.insert(leaf, change);
            }
        }
    }
    Ok(())
}

fn diff_trees(
    store: &ObjectStore,
    old: Option<&ObjectId>,
    new: Option<&ObjectId>,
    prefix: &str,
    out: &mut BTreeMap<String, ChangeKind>,
) -> Result<()> {
    // Identical identities imply identical subtrees: stop descending.
    if old == new {
        return Ok(());
    }

    let old_entries: BTreeMap<String, TreeEntry> = match old {
        Some(id) => read(store, id)?.into_iter().map(|e| (e.name.clone(), e)).collect(),
        None => BTreeMap::new(),
    };
    let new_entries: BTreeMap<String, TreeEntry> = match new {
        Some(id) => read(store, id)?.into_iter().map(|e| (e.name.clone(), e)).collect(),
        None => BTreeMap::new(),
    };

    let names: std::collections::BTreeSet<&String> =
        old_entries.keys().chain(new_entries.keys()).collect();

    for name in names {
        match (old_entries.get(name), new_entries.get(name)) {
            (Some(o), None) => record_subtree(store, o, prefix, ChangeKind::Removed, out)?,
            (None, Some(n)) => record_subtree(store, n, prefix, ChangeKind::Added, out)?,
            (Some(o), Some(n)) => match (o.kind, n.kind) {
                (EntryKind::Blob, EntryKind::Blob) => {
                    if o.target != n.target {
                        out.insert(join(prefix, name), ChangeKind::Modified);
                    }
                }
                (EntryKind::Tree, EntryKind::Tree) => {
                    let path = join(prefix, name);
                    diff_trees(store, Some(&o.target), Some(&n.target), &path, out)?;
                }
                // File replaced by directory (or vice versa): the old
                // paths disappear and the new ones appear.
                _ => {
                    record_subtree(store, o, prefix, ChangeKind::Removed, out)?;
                    record_subtree(store, n, prefix, ChangeKind::Added, out)?;
                }
            },
            (None, None) => unreachable!(),
        }
    }
    Ok(())
}
