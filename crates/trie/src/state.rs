//! The state façade: `root`, `load`, `store` over a backing [`KvStore`].
//!
//! Writes never mutate a persisted node. Every store computes new nodes
//! along the root-to-leaf path and leaves the old versions in the backing
//! store, so a root hash captured at any point keeps addressing a
//! consistent snapshot of the whole mapping. Superseded versions are not
//! collected; the backing store grows as an append-only content-addressed
//! log.
//!
//! Callers must serialize `store` calls against one `State` instance
//! (single-writer discipline). `load` is read-only and safe to run
//! concurrently.

use crate::error::{Result, TrieError};
use crate::node::{Child, TrieNode};
use crate::path;
use nanoledger_core::{hash, Hash};
use nanoledger_kvstore::KvStore;
use tracing::{debug, trace};

/// Trie-backed state store.
pub struct State<'a, D: KvStore> {
    db: &'a D,
    root: TrieNode,
}

impl<'a, D: KvStore> State<'a, D> {
    /// A fresh state over an empty trie.
    pub fn empty(db: &'a D) -> Self {
        Self {
            db,
            root: TrieNode::new(),
        }
    }

    /// Open a state handle at a previously committed root.
    ///
    /// `Hash::ZERO` opens the empty trie. Any other root must resolve to
    /// a stored node; a missing or undecodable root node fails
    /// construction rather than silently starting from scratch.
    pub fn open(db: &'a D, root: Hash) -> Result<Self> {
        if root.is_zero() {
            return Ok(Self::empty(db));
        }
        let node = load_node(db, &root)?;
        Ok(Self { db, root: node })
    }

    /// The current root commitment. The empty trie reports `Hash::ZERO`.
    pub fn root(&self) -> Hash {
        if self.root.children.is_empty() {
            Hash::ZERO
        } else {
            self.root.hash()
        }
    }

    /// Fetch the value stored under `key`.
    ///
    /// Partial path matches and matches ending on an interior branch both
    /// report [`TrieError::NotFound`]; there are no prefix lookups.
    pub fn load(&self, key: &[u8]) -> Result<Vec<u8>> {
        if key.is_empty() {
            return Err(TrieError::EmptyKey);
        }
        let target = path::to_path(key);
        let (paths, hashes) = self.resolve(&target)?;
        trace!(%target, ?paths, "resolved ancestors");

        if paths.concat() != target {
            return Err(TrieError::NotFound);
        }
        let last = hashes.last().expect("resolver returns at least the root");
        let node = load_node(self.db, last)?;
        // the walk must end on a leaf with its whole segment consumed;
        // stopping on a branch or inside a longer key's segment is absence
        let consumed = paths.last().expect("paths and hashes stay parallel");
        if !node.leaf || node.path != *consumed {
            return Err(TrieError::NotFound);
        }
        match self.db.get(node.value.as_ref())? {
            Some(value) => Ok(value),
            None => Err(TrieError::NotFound),
        }
    }

    /// Insert or update the mapping for `key`.
    ///
    /// The value is written under its own hash first (idempotent), then
    /// the path is resolved and the divergence point rewritten: a new
    /// leaf version on an exact match, a plain insertion when the last
    /// ancestor's segment is fully consumed, or a fork splitting an
    /// existing node's segment. New (segment, hash) pairs propagate to
    /// the root. Not crash-atomic: a failure mid-propagation leaves
    /// freshly written nodes unreferenced by any committed root.
    pub fn store(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(TrieError::EmptyKey);
        }
        let value_hash = hash(value);
        self.db.put(value_hash.as_ref(), value)?;

        let target = path::to_path(key);
        let (paths, hashes) = self.resolve(&target)?;
        let matched = paths.concat();
        let depth = hashes.len();
        trace!(%target, %matched, depth, "resolved ancestors");

        // Rewrite the node at the divergence point; `child_path` and
        // `child_hash` carry its replacement entry up the ancestor chain.
        let mut child_path: String;
        let mut child_hash: Hash;
        let mut replacement: TrieNode;

        if matched == target {
            // a true exact match must land on a leaf with its whole
            // segment consumed; ending on a branch or inside another
            // key's segment is a prefix collision, not an update
            let mut leaf = load_node(self.db, &hashes[depth - 1])?;
            if !leaf.leaf || leaf.path != paths[depth - 1] {
                return Err(TrieError::PrefixCollision);
            }
            leaf.value = value_hash;
            child_hash = save_node(self.db, &leaf)?;
            child_path = leaf.path.clone();
            replacement = leaf;
        } else {
            let leaf = TrieNode::leaf(target[matched.len()..].to_string(), value_hash);
            let leaf_hash = save_node(self.db, &leaf)?;

            let node = if depth == 1 {
                self.root.clone()
            } else {
                load_node(self.db, &hashes[depth - 1])?
            };

            if node.path == paths[depth - 1] {
                // segment fully consumed: divergence is among the children
                if node.leaf {
                    return Err(TrieError::PrefixCollision);
                }
                let mut node = node;
                node.children.push(Child::new(leaf.path, leaf_hash));
                node.sort_children();
                child_hash = save_node(self.db, &node)?;
                child_path = node.path.clone();
                replacement = node;
            } else {
                // divergence inside the node's own segment: fork it
                let stem = paths[depth - 1].clone();
                let mut shortened = node;
                shortened.path = shortened.path[stem.len()..].to_string();
                let shortened_hash = save_node(self.db, &shortened)?;

                let mut branch = TrieNode::branch(stem);
                branch
                    .children
                    .push(Child::new(leaf.path, leaf_hash));
                branch
                    .children
                    .push(Child::new(shortened.path, shortened_hash));
                branch.sort_children();
                child_hash = save_node(self.db, &branch)?;
                child_path = branch.path.clone();
                replacement = branch;
            }
        }

        // Propagate the replacement entry through the remaining ancestors
        // up to the root, re-addressing each along the way.
        for i in (0..depth - 1).rev() {
            let mut node = if i == 0 {
                self.root.clone()
            } else {
                load_node(self.db, &hashes[i])?
            };
            let entry = node
                .children
                .iter_mut()
                .find(|c| c.path.starts_with(child_path.as_str()))
                .expect("resolved ancestor keeps an entry for the rewritten child");
            entry.path = child_path;
            entry.hash = child_hash;
            node.sort_children();

            child_hash = save_node(self.db, &node)?;
            child_path = node.path.clone();
            replacement = node;
        }

        self.root = replacement;
        debug!(%target, root = %self.root(), "stored entry");
        Ok(())
    }

    /// Walk from the root, matching `target` against stored segments.
    ///
    /// Returns parallel sequences: `paths` (segments consumed, starting
    /// with the root's empty segment) and `hashes` (`hashes[i]` addresses
    /// the node reached after consuming `paths[0..=i]`). Joined, `paths`
    /// is the longest prefix of `target` resolvable against the current
    /// structure; a final partial segment marks an in-segment fork point.
    fn resolve(&self, target: &str) -> Result<(Vec<String>, Vec<Hash>)> {
        let mut paths = vec![String::new()];
        let mut hashes = vec![self.root()];
        let mut current = self.root.clone();
        let mut prefix = String::new();

        loop {
            let mut descend: Option<(String, Hash)> = None;
            for child in &current.children {
                let candidate = format!("{prefix}{}", child.path);
                let matched = path::common_prefix_len(target, &candidate);
                if matched == candidate.len() {
                    // segment fully consumed: descend
                    descend = Some((child.path.clone(), child.hash));
                    break;
                } else if matched > prefix.len() {
                    // divergence inside this segment: record the matched
                    // remainder and stop
                    paths.push(child.path[..matched - prefix.len()].to_string());
                    hashes.push(child.hash);
                    return Ok((paths, hashes));
                }
            }
            let Some((segment, child_hash)) = descend else {
                return Ok((paths, hashes));
            };
            prefix.push_str(&segment);
            paths.push(segment);
            hashes.push(child_hash);
            current = load_node(self.db, &child_hash)?;
        }
    }
}

fn load_node<D: KvStore>(db: &D, hash: &Hash) -> Result<TrieNode> {
    let data = db
        .get(hash.as_ref())?
        .ok_or(TrieError::MissingNode(*hash))?;
    TrieNode::decode(&data).map_err(|e| TrieError::Decode(*hash, e))
}

fn save_node<D: KvStore>(db: &D, node: &TrieNode) -> Result<Hash> {
    let encoded = node.encode();
    let h = hash(&encoded);
    db.put(h.as_ref(), &encoded)?;
    Ok(h)
}
