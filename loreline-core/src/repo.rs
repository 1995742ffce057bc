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

//! Repository record: one versioned module's identity and root.

use crate::clock::now_us;
use crate::commit::CommitId;
use crate::id::{RepoId, UserId};
use serde::{Deserialize, Serialize};

/// Identity of one module repository. The live container (branch table,
/// commit chain) lives in `loreline-storage`; this record is what gets
/// listed and referenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub repo_id: RepoId,
    pub owner_user_id: UserId,
    /// The synthetic empty commit every chain in this repository descends
    /// from.
    pub root_commit_id: CommitId,
    pub created_at_us: u64,
}

impl Repository {
    pub fn new(owner_user_id: UserId, root_commit_id: CommitId) -> Self {
        Self {
            repo_id: RepoId::new(),
            owner_user_id,
            root_commit_id,
            created_at_us: now_us(),
        }
    }
}
