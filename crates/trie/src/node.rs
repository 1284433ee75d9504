//! Trie nodes, their canonical encoding and content addresses.

use nanoledger_core::{hash, Hash};
use serde::{Deserialize, Serialize};

/// A child entry: the path segment leading to the child and the child's
/// content address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Child {
    pub path: String,
    pub hash: Hash,
}

impl Child {
    pub fn new(path: String, hash: Hash) -> Self {
        Self { path, hash }
    }
}

/// A node in the state trie.
///
/// A leaf has no children and a meaningful `value` (the content address of
/// the stored bytes); a branch has children and its `value` is ignored.
/// Concatenating `path` along any root-to-leaf walk reproduces the full
/// path of that leaf's key.
///
/// Nodes are immutable once persisted: a logical update produces a new
/// node under a new address and leaves the old version in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrieNode {
    /// Path segment owned by this node.
    pub path: String,
    /// Child entries, kept in canonical order.
    pub children: Vec<Child>,
    /// Leaf marker.
    pub leaf: bool,
    /// Content address of the stored value; meaningful only for leaves.
    pub value: Hash,
}

impl TrieNode {
    /// The empty branch node (also the root of an empty trie).
    pub fn new() -> Self {
        Self::default()
    }

    /// A leaf holding `value` at the end of `path`.
    pub fn leaf(path: String, value: Hash) -> Self {
        Self {
            path,
            children: Vec::new(),
            leaf: true,
            value,
        }
    }

    /// An interior branch owning `path`.
    pub fn branch(path: String) -> Self {
        Self {
            path,
            children: Vec::new(),
            leaf: false,
            value: Hash::ZERO,
        }
    }

    /// Canonical byte encoding: children are sorted under one fixed
    /// comparator before serializing, so the encoding is a pure function
    /// of logical content regardless of how the node was assembled.
    pub fn encode(&self) -> Vec<u8> {
        let mut node = self.clone();
        node.sort_children();
        bincode::serialize(&node).expect("serialization should not fail")
    }

    /// Decode a node previously produced by [`TrieNode::encode`].
    pub fn decode(data: &[u8]) -> Result<Self, bincode::Error> {
        bincode::deserialize(data)
    }

    /// The node's content address: the hash of its canonical encoding.
    pub fn hash(&self) -> Hash {
        hash(&self.encode())
    }

    /// Apply the canonical child order. Segments of siblings never share
    /// a first character, so ordering by segment is total.
    pub fn sort_children(&mut self) {
        self.children.sort_by(|a, b| a.path.cmp(&b.path));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_branch() -> TrieNode {
        let mut node = TrieNode::branch("6170".to_string());
        node.children.push(Child::new("70".into(), hash(b"a")));
        node.children.push(Child::new("62".into(), hash(b"b")));
        node.sort_children();
        node
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let node = sample_branch();
        let decoded = TrieNode::decode(&node.encode()).unwrap();
        assert_eq!(decoded, node);
        assert_eq!(decoded.hash(), node.hash());
    }

    #[test]
    fn test_leaf_roundtrip() {
        let node = TrieNode::leaf("6a6b".into(), hash(b"value"));
        let decoded = TrieNode::decode(&node.encode()).unwrap();
        assert_eq!(decoded, node);
        assert!(decoded.leaf);
        assert!(decoded.children.is_empty());
    }

    #[test]
    fn test_child_order_does_not_affect_hash() {
        let sorted = sample_branch();
        let mut reversed = sorted.clone();
        reversed.children.reverse();
        // encode applies the canonical order itself
        assert_eq!(reversed.encode(), sorted.encode());
        assert_eq!(reversed.hash(), sorted.hash());
    }

    #[test]
    fn test_content_determines_address() {
        let node = sample_branch();
        let mut other = node.clone();
        assert_eq!(node.hash(), other.hash());

        other.children[0].hash = hash(b"different");
        assert_ne!(node.hash(), other.hash());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(TrieNode::decode(&[0xde, 0xad, 0xbe, 0xef]).is_err());
    }
}
