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

//! Branch records
//!
//! A branch is a named, movable pointer to the head of one commit chain.
//! Exactly one branch per repository is the main branch at any moment;
//! that invariant is enforced by the branch table in `loreline-storage`,
//! not by this record.

use crate::clock::now_us;
use crate::commit::CommitId;
use crate::id::{BranchId, UserId};
use serde::{Deserialize, Serialize};

/// Name given to the branch created with a repository.
pub const MAIN_BRANCH_NAME: &str = "main";

/// A named head pointer into a repository's commit chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub branch_id: BranchId,
    pub name: String,
    pub is_main: bool,
    pub owner_user_id: UserId,
    pub created_at_us: u64,
    pub updated_at_us: u64,
    /// Never null: a branch always points at a commit, at minimum the
    /// repository's synthetic root.
    pub head_commit_id: CommitId,
}

impl Branch {
    /// New branch record stamped now. The caller supplies `branch_id` so a
    /// root commit can reference the branch before the record exists.
    pub fn new(
        branch_id: BranchId,
        name: impl Into<String>,
        owner_user_id: UserId,
        head_commit_id: CommitId,
        is_main: bool,
    ) -> Self {
        let now = now_us();
        Self {
            branch_id,
            name: name.into(),
            is_main,
            owner_user_id,
            created_at_us: now,
            updated_at_us: now,
            head_commit_id,
        }
    }
}

/// Wire shape of a branch for listings:
/// `{branchId, name, isMain, userId, createTime, updateTime}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchResponse {
    pub branch_id: BranchId,
    pub name: String,
    pub is_main: bool,
    pub user_id: UserId,
    pub create_time: u64,
    pub update_time: u64,
}

impl From<&Branch> for BranchResponse {
    fn from(branch: &Branch) -> Self {
        Self {
            branch_id: branch.branch_id,
            name: branch.name.clone(),
            is_main: branch.is_main,
            user_id: branch.owner_user_id,
            create_time: branch.created_at_us,
            update_time: branch.updated_at_us,
        }
    }
}
