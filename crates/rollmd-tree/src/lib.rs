//! # rollmd-tree
//!
//! **Tier 1 (Tree Resolution)**
//!
//! Builds the validated directory hierarchy for one layout run and serves
//! ancestry queries against it. Directories live in a flat arena with
//! parent/child edges as integer indexes, so deep trees cost no ownership
//! gymnastics and the whole structure is freely shared read-only once
//! resolved.
//!
//! ## What belongs here
//! * Structural validation (single root, acyclic, parents exist)
//! * The arena + id index + depth buckets
//! * Ancestry strategies (parent chain, path prefix)
//! * File-to-directory attachment
//!
//! ## What does NOT belong here
//! * Metric values or aggregation
//! * Run correlation

use std::collections::BTreeMap;

use rollmd_types::{DirectoryRecord, FileRecord};
use thiserror::Error;

/// Structural failures. All of them are fatal: a run with a malformed tree
/// publishes nothing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("duplicate directory id {dir_id}")]
    DuplicateDirectory { dir_id: String },
    #[error("directory {dir_id} declares unknown parent {parent_id}")]
    UnknownParent { dir_id: String, parent_id: String },
    #[error("no root directory in layout run")]
    MissingRoot,
    #[error("multiple root directories: {first} and {second}")]
    MultipleRoots { first: String, second: String },
    #[error("parent cycle detected at directory {dir_id}")]
    Cycle { dir_id: String },
    #[error("file {file_id} references unknown directory {dir_id}")]
    UnknownFileDirectory { file_id: String, dir_id: String },
}

/// How ancestry is decided for a producer's rows.
///
/// Parent chains are preferred (O(depth) per query over explicit edges).
/// Path prefixes exist for producers that only emit paths: `B` is an
/// ancestor of `A` iff `A.path == B.path` or `A.path` starts with
/// `B.path` followed by the separator. Both strategies are reflexive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AncestryMode {
    #[default]
    ParentChain,
    PathPrefix,
}

/// The validated tree for one layout run.
///
/// Immutable after [`DirTree::resolve`]; safe to share across workers
/// without locking.
#[derive(Debug, Clone)]
pub struct DirTree {
    records: Vec<DirectoryRecord>,
    by_id: BTreeMap<String, usize>,
    parent: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    depth: Vec<u32>,
    /// Arena indexes bucketed by depth, deepest bucket first.
    levels: Vec<Vec<usize>>,
    root: usize,
}

impl DirTree {
    /// Validate the directory set and build the arena.
    pub fn resolve(records: &[DirectoryRecord]) -> Result<Self, TreeError> {
        let n = records.len();

        let mut by_id: BTreeMap<String, usize> = BTreeMap::new();
        for (idx, rec) in records.iter().enumerate() {
            if by_id.insert(rec.dir_id.clone(), idx).is_some() {
                return Err(TreeError::DuplicateDirectory {
                    dir_id: rec.dir_id.clone(),
                });
            }
        }

        let mut parent: Vec<Option<usize>> = Vec::with_capacity(n);
        let mut root: Option<usize> = None;
        for (idx, rec) in records.iter().enumerate() {
            match &rec.parent_id {
                Some(pid) => {
                    let p = *by_id
                        .get(pid)
                        .ok_or_else(|| TreeError::UnknownParent {
                            dir_id: rec.dir_id.clone(),
                            parent_id: pid.clone(),
                        })?;
                    parent.push(Some(p));
                }
                None => {
                    if let Some(first) = root {
                        return Err(TreeError::MultipleRoots {
                            first: records[first].dir_id.clone(),
                            second: rec.dir_id.clone(),
                        });
                    }
                    root = Some(idx);
                    parent.push(None);
                }
            }
        }
        let root = root.ok_or(TreeError::MissingRoot)?;

        detect_cycles(records, &parent)?;
        let depth = compute_depths(&parent);

        let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
        for (idx, p) in parent.iter().enumerate() {
            if let Some(p) = p {
                children[*p].push(idx);
            }
        }

        let max_depth = depth.iter().copied().max().unwrap_or(0);
        let mut levels: Vec<Vec<usize>> = vec![Vec::new(); max_depth as usize + 1];
        for (idx, d) in depth.iter().enumerate() {
            // Bucket 0 holds the deepest level so the bottom-up pass can
            // iterate levels in order.
            levels[(max_depth - d) as usize].push(idx);
        }

        Ok(Self {
            records: records.to_vec(),
            by_id,
            parent,
            children,
            depth,
            levels,
            root,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn root(&self) -> usize {
        self.root
    }

    pub fn get(&self, idx: usize) -> &DirectoryRecord {
        &self.records[idx]
    }

    pub fn index_of(&self, dir_id: &str) -> Option<usize> {
        self.by_id.get(dir_id).copied()
    }

    pub fn parent_of(&self, idx: usize) -> Option<usize> {
        self.parent[idx]
    }

    pub fn children_of(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    /// Depth computed from parent chains (root = 0), independent of the
    /// depth the producer declared.
    pub fn depth_of(&self, idx: usize) -> u32 {
        self.depth[idx]
    }

    /// Depth buckets, deepest first. Every arena index appears in exactly
    /// one bucket.
    pub fn levels(&self) -> &[Vec<usize>] {
        &self.levels
    }

    /// Reflexive ancestry query under the given strategy.
    pub fn is_ancestor(&self, ancestor: usize, node: usize, mode: AncestryMode) -> bool {
        match mode {
            AncestryMode::ParentChain => {
                let mut cur = Some(node);
                while let Some(idx) = cur {
                    if idx == ancestor {
                        return true;
                    }
                    cur = self.parent[idx];
                }
                false
            }
            AncestryMode::PathPrefix => {
                let a = &self.records[node].path;
                let b = &self.records[ancestor].path;
                a == b || (a.starts_with(b) && a.as_bytes().get(b.len()) == Some(&b'/'))
            }
        }
    }

    /// Map every file to its containing directory's arena index.
    pub fn attach_files(
        &self,
        files: &[FileRecord],
    ) -> Result<BTreeMap<String, usize>, TreeError> {
        let mut map = BTreeMap::new();
        for file in files {
            let idx = self.index_of(&file.dir_id).ok_or_else(|| {
                TreeError::UnknownFileDirectory {
                    file_id: file.file_id.clone(),
                    dir_id: file.dir_id.clone(),
                }
            })?;
            map.insert(file.file_id.clone(), idx);
        }
        Ok(map)
    }
}

/// Depth-first walk over parent edges with a visiting-set, expressed as a
/// per-node state machine (0 = unvisited, 1 = visiting, 2 = done).
fn detect_cycles(records: &[DirectoryRecord], parent: &[Option<usize>]) -> Result<(), TreeError> {
    let mut state = vec![0u8; records.len()];
    for start in 0..records.len() {
        if state[start] != 0 {
            continue;
        }
        let mut path = Vec::new();
        let mut cur = start;
        loop {
            match state[cur] {
                2 => break,
                1 => {
                    return Err(TreeError::Cycle {
                        dir_id: records[cur].dir_id.clone(),
                    });
                }
                _ => {}
            }
            state[cur] = 1;
            path.push(cur);
            match parent[cur] {
                Some(p) => cur = p,
                None => break,
            }
        }
        for idx in path {
            state[idx] = 2;
        }
    }
    Ok(())
}

/// Iterative depth assignment; never recurses, so arbitrarily deep trees
/// stay within constant stack.
fn compute_depths(parent: &[Option<usize>]) -> Vec<u32> {
    let n = parent.len();
    let mut depth = vec![0u32; n];
    let mut known = vec![false; n];
    for i in 0..n {
        if known[i] {
            continue;
        }
        let mut chain = Vec::new();
        let mut cur = i;
        loop {
            if known[cur] {
                break;
            }
            chain.push(cur);
            match parent[cur] {
                Some(p) => cur = p,
                None => break,
            }
        }
        let mut iter = chain.iter().rev();
        let mut base = if known[cur] {
            depth[cur]
        } else {
            // The chain ended at an unvisited root; it is the last pushed
            // element and gets depth zero.
            let root_idx = *iter.next().expect("chain holds at least the root");
            depth[root_idx] = 0;
            known[root_idx] = true;
            0
        };
        for &idx in iter {
            base += 1;
            depth[idx] = base;
            known[idx] = true;
        }
    }
    depth
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dir(id: &str, path: &str, parent: Option<&str>, depth: u32) -> DirectoryRecord {
        DirectoryRecord {
            dir_id: id.to_string(),
            path: path.to_string(),
            parent_id: parent.map(str::to_string),
            depth,
        }
    }

    fn sample_records() -> Vec<DirectoryRecord> {
        vec![
            dir("root", ".", None, 0),
            dir("a", "a", Some("root"), 1),
            dir("ab", "a/b", Some("a"), 2),
            dir("c", "c", Some("root"), 1),
        ]
    }

    #[test]
    fn resolve_builds_arena_with_expected_shape() {
        let tree = DirTree::resolve(&sample_records()).unwrap();
        assert_eq!(tree.len(), 4);
        assert!(!tree.is_empty());
        let root = tree.root();
        assert_eq!(tree.get(root).dir_id, "root");
        assert_eq!(tree.children_of(root).len(), 2);
        let ab = tree.index_of("ab").unwrap();
        assert_eq!(tree.depth_of(ab), 2);
        assert_eq!(tree.parent_of(ab), tree.index_of("a"));
    }

    #[test]
    fn levels_run_deepest_first_and_cover_every_directory() {
        let tree = DirTree::resolve(&sample_records()).unwrap();
        let levels = tree.levels();
        assert_eq!(levels.len(), 3);
        let covered: usize = levels.iter().map(Vec::len).sum();
        assert_eq!(covered, tree.len());
        // First bucket is the deepest directory.
        assert_eq!(levels[0], vec![tree.index_of("ab").unwrap()]);
        // Last bucket is the root.
        assert_eq!(levels[2], vec![tree.root()]);
    }

    #[test]
    fn unknown_parent_is_structural() {
        let records = vec![dir("root", ".", None, 0), dir("a", "a", Some("ghost"), 1)];
        let err = DirTree::resolve(&records).unwrap_err();
        assert_eq!(
            err,
            TreeError::UnknownParent {
                dir_id: "a".into(),
                parent_id: "ghost".into()
            }
        );
    }

    #[test]
    fn duplicate_directory_id_is_structural() {
        let records = vec![dir("root", ".", None, 0), dir("root", "other", None, 0)];
        let err = DirTree::resolve(&records).unwrap_err();
        assert_eq!(err, TreeError::DuplicateDirectory { dir_id: "root".into() });
    }

    #[test]
    fn zero_and_two_roots_are_structural() {
        let two = vec![dir("r1", ".", None, 0), dir("r2", "x", None, 0)];
        assert_eq!(
            DirTree::resolve(&two).unwrap_err(),
            TreeError::MultipleRoots {
                first: "r1".into(),
                second: "r2".into()
            }
        );

        let none = vec![dir("a", "a", Some("b"), 1), dir("b", "b", Some("a"), 1)];
        // Both declare parents, so no root exists at all.
        assert_eq!(DirTree::resolve(&none).unwrap_err(), TreeError::MissingRoot);
    }

    #[test]
    fn cycle_off_the_root_is_detected() {
        let records = vec![
            dir("root", ".", None, 0),
            dir("a", "a", Some("b"), 1),
            dir("b", "b", Some("a"), 1),
        ];
        let err = DirTree::resolve(&records).unwrap_err();
        assert!(matches!(err, TreeError::Cycle { .. }));
    }

    #[test]
    fn parent_chain_ancestry_is_reflexive_and_transitive() {
        let tree = DirTree::resolve(&sample_records()).unwrap();
        let root = tree.root();
        let a = tree.index_of("a").unwrap();
        let ab = tree.index_of("ab").unwrap();
        let c = tree.index_of("c").unwrap();

        assert!(tree.is_ancestor(a, a, AncestryMode::ParentChain));
        assert!(tree.is_ancestor(root, ab, AncestryMode::ParentChain));
        assert!(tree.is_ancestor(a, ab, AncestryMode::ParentChain));
        assert!(!tree.is_ancestor(c, ab, AncestryMode::ParentChain));
        assert!(!tree.is_ancestor(ab, a, AncestryMode::ParentChain));
    }

    #[test]
    fn path_prefix_ancestry_requires_a_separator_boundary() {
        let records = vec![
            dir("root", ".", None, 0),
            dir("a", "a", Some("root"), 1),
            dir("ab", "a/b", Some("a"), 2),
            dir("abc", "abc", Some("root"), 1),
        ];
        let tree = DirTree::resolve(&records).unwrap();
        let a = tree.index_of("a").unwrap();
        let ab = tree.index_of("ab").unwrap();
        let abc = tree.index_of("abc").unwrap();

        assert!(tree.is_ancestor(a, ab, AncestryMode::PathPrefix));
        // "abc" merely shares a leading byte with "a"; not a child.
        assert!(!tree.is_ancestor(a, abc, AncestryMode::PathPrefix));
    }

    #[test]
    fn both_ancestry_modes_agree_on_a_well_formed_tree() {
        let tree = DirTree::resolve(&sample_records()).unwrap();
        for anc in 0..tree.len() {
            for node in 0..tree.len() {
                // The root path is "." here, which path-prefix matching
                // cannot see through; skip it, parent chains cover it.
                if tree.get(anc).path == "." || tree.get(node).path == "." {
                    continue;
                }
                assert_eq!(
                    tree.is_ancestor(anc, node, AncestryMode::ParentChain),
                    tree.is_ancestor(anc, node, AncestryMode::PathPrefix),
                    "modes disagree for {} -> {}",
                    tree.get(anc).path,
                    tree.get(node).path
                );
            }
        }
    }

    #[test]
    fn attach_files_maps_to_arena_and_rejects_orphans() {
        let tree = DirTree::resolve(&sample_records()).unwrap();
        let files = vec![
            FileRecord {
                file_id: "f1".into(),
                dir_id: "a".into(),
                path: "a/main.rs".into(),
            },
            FileRecord {
                file_id: "f2".into(),
                dir_id: "ab".into(),
                path: "a/b/lib.rs".into(),
            },
        ];
        let map = tree.attach_files(&files).unwrap();
        assert_eq!(map.get("f1"), tree.index_of("a").as_ref());
        assert_eq!(map.get("f2"), tree.index_of("ab").as_ref());

        let orphan = vec![FileRecord {
            file_id: "f9".into(),
            dir_id: "ghost".into(),
            path: "ghost/x".into(),
        }];
        assert_eq!(
            tree.attach_files(&orphan).unwrap_err(),
            TreeError::UnknownFileDirectory {
                file_id: "f9".into(),
                dir_id: "ghost".into()
            }
        );
    }

    #[test]
    fn deep_chain_resolves_without_recursion() {
        let mut records = vec![dir("d0", "d0", None, 0)];
        for i in 1..5000 {
            records.push(DirectoryRecord {
                dir_id: format!("d{i}"),
                path: format!("{}/d{i}", records[i - 1].path),
                parent_id: Some(format!("d{}", i - 1)),
                depth: i as u32,
            });
        }
        let tree = DirTree::resolve(&records).unwrap();
        assert_eq!(tree.depth_of(tree.index_of("d4999").unwrap()), 4999);
        assert_eq!(tree.levels().len(), 5000);
    }
}
