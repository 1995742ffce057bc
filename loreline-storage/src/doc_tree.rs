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

//! Versioned document trees
//!
//! One row per (space, user): an opaque JSON blob plus a version counter.
//! The engine never parses the blob; clients merge structure, the store
//! only arbitrates lost updates. Writes are compare-and-set on the
//! version, and the map's entry guard serializes writers on the same row,
//! so concurrent editors get a conflict instead of a silent overwrite.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use loreline_core::doc_tree::DocFolderTree;
use loreline_core::error::{ConflictError, Result};
use loreline_core::id::{SpaceId, UserId};
use tracing::warn;

/// Folder-tree rows for all (space, user) pairs.
#[derive(Default)]
pub struct DocTreeStore {
    trees: DashMap<(SpaceId, UserId), DocFolderTree>,
}

impl DocTreeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current row for the pair. Reads never fail: an unknown pair yields
    /// the version-0 uninitialized record.
    pub fn read(&self, space_id: SpaceId, user_id: UserId) -> DocFolderTree {
        self.trees
            .get(&(space_id, user_id))
            .map(|entry| entry.value().clone())
            .unwrap_or_else(|| DocFolderTree::uninitialized(space_id, user_id))
    }

    /// Replace the tree if `expected_version` is still current.
    ///
    /// The stored version bumps by exactly 1 (the first accepted write
    /// produces version 1). On a stale expectation nothing changes and the
    /// error carries the live version for a re-read-and-retry.
    pub fn write(
        &self,
        space_id: SpaceId,
        user_id: UserId,
        expected_version: u64,
        tree_json: String,
    ) -> Result<DocFolderTree> {
        match self.trees.entry((space_id, user_id)) {
            Entry::Occupied(mut occupied) => {
                let tree = occupied.get_mut();
                if tree.version != expected_version {
                    warn!(
                        space = %space_id,
                        user = %user_id,
                        expected = expected_version,
                        current = tree.version,
                        "doc tree version conflict"
                    );
                    return Err(ConflictError::VersionMismatch {
                        expected: expected_version,
                        current: tree.version,
                    }
                    .into());
                }
                tree.version += 1;
                tree.tree_json = Some(tree_json);
                Ok(tree.clone())
            }
            Entry::Vacant(vacant) => {
                if expected_version != 0 {
                    warn!(
                        space = %space_id,
                        user = %user_id,
                        expected = expected_version,
                        current = 0u64,
                        "doc tree version conflict"
                    );
                    return Err(ConflictError::VersionMismatch {
                        expected: expected_version,
                        current: 0,
                    }
                    .into());
                }
                let tree = DocFolderTree {
                    space_id,
                    user_id,
                    version: 1,
                    tree_json: Some(tree_json),
                };
                vacant.insert(tree.clone());
                Ok(tree)
            }
        }
    }

    /// Rows written at least once.
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}
