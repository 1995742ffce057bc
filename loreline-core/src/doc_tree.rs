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

//! Document folder trees
//!
//! Each (space, user) pair owns one folder-tree layout, stored as an
//! opaque JSON blob with an optimistic version counter. The engine never
//! parses the blob; clients merge structure, the store only arbitrates
//! lost updates via the version.

use crate::id::{SpaceId, UserId};
use serde::{Deserialize, Serialize};

/// One user's folder tree in one space. Serializes directly to the
/// `{spaceId, userId, version, treeJson}` response shape (`treeJson` is
/// `null` until the first write).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocFolderTree {
    pub space_id: SpaceId,
    pub user_id: UserId,
    /// 0 until the first accepted write, then +1 per accepted write.
    pub version: u64,
    pub tree_json: Option<String>,
}

impl DocFolderTree {
    /// The distinct "no tree yet" state a read synthesizes for an unknown
    /// (space, user) pair.
    pub fn uninitialized(space_id: SpaceId, user_id: UserId) -> Self {
        Self {
            space_id,
            user_id,
            version: 0,
            tree_json: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.tree_json.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uninitialized_serializes_null_tree() {
        let tree = DocFolderTree::uninitialized(SpaceId(1), UserId(2));
        assert!(!tree.is_initialized());
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["spaceId"], 1);
        assert_eq!(json["userId"], 2);
        assert_eq!(json["version"], 0);
        assert!(json["treeJson"].is_null());
    }
}
