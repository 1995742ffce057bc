// Copyright 2026 Loreline (https://github.com/loreline)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Commits
//!
//! A commit records one batch of entity diffs on a branch. Commits are
//! immutable once created and content-addressed: the id is a BLAKE3 hash
//! over the commit's fields, so equal content at the same chain position
//! hashes to the same id and ids from different repositories never
//! collide (the branch uuid is part of the hash).

use crate::clock::now_us;
use crate::entity::EntityDiff;
use crate::id::{BranchId, UserId};
use blake3::Hasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Commit id: BLAKE3 hash (32 bytes) of the commit content.
///
/// Serializes as a 64-char hex string, which is the wire form the
/// `commitId` request/response fields carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitId(pub [u8; 32]);

impl CommitId {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short hex form for logs and display (like a git short hash).
    pub fn short(&self) -> String {
        hex::encode(&self.0[..7])
    }

    /// Full hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse from a full 64-char hex string.
    pub fn from_hex(hex_str: &str) -> Result<Self, ParseIdError> {
        let bytes = hex::decode(hex_str).map_err(|_| ParseIdError::InvalidHex)?;
        if bytes.len() != 32 {
            return Err(ParseIdError::InvalidLength);
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.short())
    }
}

impl Serialize for CommitId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CommitId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex_str = String::deserialize(deserializer)?;
        Self::from_hex(&hex_str).map_err(serde::de::Error::custom)
    }
}

impl std::str::FromStr for CommitId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

/// Commit id parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseIdError {
    #[error("invalid hex string")]
    InvalidHex,
    #[error("invalid length (expected 32 bytes)")]
    InvalidLength,
}

/// One immutable point in a branch's history.
///
/// `generation` is the chain depth (root = 0); it drives checkpoint
/// spacing during replay and makes "every Nth commit" cheap to decide
/// without walking the chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub commit_id: CommitId,
    pub branch_id: BranchId,
    pub parent_commit_id: Option<CommitId>,
    pub generation: u64,
    pub diff_set: Vec<EntityDiff>,
    pub author_user_id: UserId,
    pub created_at_us: u64,
}

impl Commit {
    /// The synthetic empty commit every repository starts from.
    pub fn root(branch_id: BranchId, author_user_id: UserId) -> Self {
        Self::build(branch_id, None, 0, Vec::new(), author_user_id)
    }

    /// A commit extending `parent` on the given branch.
    pub fn child(
        parent: &Commit,
        branch_id: BranchId,
        diff_set: Vec<EntityDiff>,
        author_user_id: UserId,
    ) -> Self {
        Self::build(
            branch_id,
            Some(parent.commit_id),
            parent.generation + 1,
            diff_set,
            author_user_id,
        )
    }

    fn build(
        branch_id: BranchId,
        parent_commit_id: Option<CommitId>,
        generation: u64,
        diff_set: Vec<EntityDiff>,
        author_user_id: UserId,
    ) -> Self {
        let created_at_us = now_us();
        let commit_id = Self::compute_id(
            branch_id,
            parent_commit_id.as_ref(),
            generation,
            &diff_set,
            author_user_id,
            created_at_us,
        );
        Self {
            commit_id,
            branch_id,
            parent_commit_id,
            generation,
            diff_set,
            author_user_id,
            created_at_us,
        }
    }

    fn compute_id(
        branch_id: BranchId,
        parent_commit_id: Option<&CommitId>,
        generation: u64,
        diff_set: &[EntityDiff],
        author_user_id: UserId,
        created_at_us: u64,
    ) -> CommitId {
        let mut hasher = Hasher::new();
        hasher.update(branch_id.as_uuid().as_bytes());
        match parent_commit_id {
            Some(parent) => {
                hasher.update(&[1]);
                hasher.update(parent.as_bytes());
            }
            None => {
                hasher.update(&[0]);
            }
        }
        hasher.update(&generation.to_le_bytes());
        hasher.update(&author_user_id.0.to_le_bytes());
        hasher.update(&created_at_us.to_le_bytes());
        // serde_json::Map keeps keys sorted, so this encoding is canonical.
        let payload = serde_json::to_vec(diff_set).unwrap();
        hasher.update(&payload);
        CommitId(hasher.finalize().into())
    }

    pub fn is_root(&self) -> bool {
        self.parent_commit_id.is_none()
    }

    pub fn diff_count(&self) -> usize {
        self.diff_set.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityDiff, EntityType};
    use crate::id::EntityId;
    use serde_json::json;

    fn sample_diff() -> EntityDiff {
        let mut fields = serde_json::Map::new();
        fields.insert("name".to_string(), json!("Lantern"));
        EntityDiff::create(EntityId(1), EntityType::Item, fields)
    }

    #[test]
    fn hex_round_trip() {
        let root = Commit::root(BranchId::new(), UserId(1));
        let id = root.commit_id;
        let parsed = CommitId::from_hex(&id.to_hex()).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn short_is_fourteen_chars() {
        let root = Commit::root(BranchId::new(), UserId(1));
        assert_eq!(root.commit_id.short().len(), 14);
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert_eq!(CommitId::from_hex("zz"), Err(ParseIdError::InvalidHex));
        assert_eq!(CommitId::from_hex("abcd"), Err(ParseIdError::InvalidLength));
    }

    #[test]
    fn serde_uses_hex_strings() {
        let root = Commit::root(BranchId::new(), UserId(1));
        let json = serde_json::to_string(&root.commit_id).unwrap();
        assert_eq!(json, format!("\"{}\"", root.commit_id.to_hex()));
        let back: CommitId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, root.commit_id);
    }

    #[test]
    fn child_extends_parent() {
        let branch = BranchId::new();
        let root = Commit::root(branch, UserId(1));
        let child = Commit::child(&root, branch, vec![sample_diff()], UserId(2));
        assert!(root.is_root());
        assert!(!child.is_root());
        assert_eq!(child.parent_commit_id, Some(root.commit_id));
        assert_eq!(child.generation, 1);
        assert_eq!(child.diff_count(), 1);
        assert!(child.created_at_us > root.created_at_us);
    }

    #[test]
    fn ids_differ_across_branches_and_content() {
        let a = Commit::root(BranchId::new(), UserId(1));
        let b = Commit::root(BranchId::new(), UserId(1));
        assert_ne!(a.commit_id, b.commit_id);

        let branch = BranchId::new();
        let root = Commit::root(branch, UserId(1));
        let with_diff = Commit::child(&root, branch, vec![sample_diff()], UserId(1));
        let empty = Commit::child(&root, branch, Vec::new(), UserId(1));
        assert_ne!(with_diff.commit_id, empty.commit_id);
    }
}
