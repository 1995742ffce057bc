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

//! Branch table
//!
//! All branches of one repository behind a single lock: a by-id map, a
//! unique name index, and the main pointer. Every mutation is one write
//! critical section, so readers can never observe zero or two main
//! branches, half a rename, or a freed name that is still indexed.

use loreline_core::branch::Branch;
use loreline_core::clock::now_us;
use loreline_core::commit::CommitId;
use loreline_core::error::{NotFoundError, Result, ValidationError};
use loreline_core::id::BranchId;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Longest accepted branch name, in characters.
pub const MAX_BRANCH_NAME_CHARS: usize = 255;

/// Branch names are user-facing labels, not git refs: any printable text
/// is fine, including spaces and non-ASCII. Rejected: empty, untrimmed,
/// control characters, longer than [`MAX_BRANCH_NAME_CHARS`].
pub fn validate_branch_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(ValidationError::InvalidBranchName("name is empty".to_string()).into());
    }
    if name.trim() != name {
        return Err(ValidationError::InvalidBranchName(
            "leading or trailing whitespace".to_string(),
        )
        .into());
    }
    if name.chars().count() > MAX_BRANCH_NAME_CHARS {
        return Err(ValidationError::InvalidBranchName(format!(
            "longer than {MAX_BRANCH_NAME_CHARS} characters"
        ))
        .into());
    }
    if name.chars().any(char::is_control) {
        return Err(
            ValidationError::InvalidBranchName("contains control characters".to_string()).into(),
        );
    }
    Ok(())
}

/// The branches of one repository. Cheap to read, serialized to write.
#[derive(Debug)]
pub struct BranchSet {
    inner: RwLock<BranchTable>,
}

#[derive(Debug)]
struct BranchTable {
    by_id: HashMap<BranchId, Branch>,
    by_name: HashMap<String, BranchId>,
    main_id: BranchId,
}

impl BranchSet {
    /// Table seeded with the repository's main branch.
    pub(crate) fn bootstrap(main: Branch) -> Self {
        debug_assert!(main.is_main);
        let main_id = main.branch_id;
        let mut by_id = HashMap::new();
        let mut by_name = HashMap::new();
        by_name.insert(main.name.clone(), main_id);
        by_id.insert(main_id, main);
        Self {
            inner: RwLock::new(BranchTable {
                by_id,
                by_name,
                main_id,
            }),
        }
    }

    pub fn get(&self, branch_id: BranchId) -> Option<Branch> {
        self.inner.read().by_id.get(&branch_id).cloned()
    }

    pub fn get_by_name(&self, name: &str) -> Option<Branch> {
        let table = self.inner.read();
        table
            .by_name
            .get(name)
            .and_then(|id| table.by_id.get(id))
            .cloned()
    }

    /// The current main branch. Infallible: exactly one always exists.
    pub fn main(&self) -> Branch {
        let table = self.inner.read();
        table.by_id[&table.main_id].clone()
    }

    /// All branches, oldest first (ties broken by name).
    pub fn list(&self) -> Vec<Branch> {
        let mut branches: Vec<Branch> = self.inner.read().by_id.values().cloned().collect();
        branches.sort_by(|a, b| {
            a.created_at_us
                .cmp(&b.created_at_us)
                .then_with(|| a.name.cmp(&b.name))
        });
        branches
    }

    pub fn len(&self) -> usize {
        self.inner.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        // a repository always keeps its main branch
        false
    }

    /// Add a non-main branch. Name validity and uniqueness are checked
    /// inside the critical section.
    pub(crate) fn insert(&self, branch: Branch) -> Result<()> {
        debug_assert!(!branch.is_main);
        validate_branch_name(&branch.name)?;
        let mut table = self.inner.write();
        if table.by_name.contains_key(&branch.name) {
            return Err(ValidationError::DuplicateBranchName(branch.name).into());
        }
        table.by_name.insert(branch.name.clone(), branch.branch_id);
        table.by_id.insert(branch.branch_id, branch);
        Ok(())
    }

    pub(crate) fn rename(&self, branch_id: BranchId, new_name: &str) -> Result<Branch> {
        validate_branch_name(new_name)?;
        let mut guard = self.inner.write();
        let table = &mut *guard;
        let Some(branch) = table.by_id.get_mut(&branch_id) else {
            return Err(NotFoundError::Branch(branch_id).into());
        };
        if branch.name == new_name {
            return Ok(branch.clone());
        }
        if table.by_name.contains_key(new_name) {
            return Err(ValidationError::DuplicateBranchName(new_name.to_string()).into());
        }
        table.by_name.remove(&branch.name);
        table.by_name.insert(new_name.to_string(), branch_id);
        branch.name = new_name.to_string();
        branch.updated_at_us = now_us();
        Ok(branch.clone())
    }

    /// Remove a branch. The main branch is not deletable; commits are
    /// untouched (shared ancestry outlives the pointer).
    pub(crate) fn remove(&self, branch_id: BranchId) -> Result<Branch> {
        let mut table = self.inner.write();
        if table.main_id == branch_id {
            return Err(ValidationError::DeleteMainBranch.into());
        }
        let branch = table
            .by_id
            .remove(&branch_id)
            .ok_or(NotFoundError::Branch(branch_id))?;
        table.by_name.remove(&branch.name);
        Ok(branch)
    }

    /// Make `branch_id` the main branch, demoting the previous one. Both
    /// flips happen inside one critical section; idempotent when the
    /// branch already is main.
    pub(crate) fn set_main(&self, branch_id: BranchId) -> Result<Branch> {
        let mut guard = self.inner.write();
        let table = &mut *guard;
        let Some(branch) = table.by_id.get_mut(&branch_id) else {
            return Err(NotFoundError::Branch(branch_id).into());
        };
        if table.main_id == branch_id {
            return Ok(branch.clone());
        }
        let now = now_us();
        branch.is_main = true;
        branch.updated_at_us = now;
        let promoted = branch.clone();
        let previous = table.main_id;
        table.main_id = branch_id;
        if let Some(old_main) = table.by_id.get_mut(&previous) {
            old_main.is_main = false;
            old_main.updated_at_us = now;
        }
        Ok(promoted)
    }

    /// Swing a branch head. The repository facade calls this under the
    /// branch's append lock, after the commit is in the arena.
    pub(crate) fn advance_head(&self, branch_id: BranchId, head: CommitId) -> Result<Branch> {
        let mut table = self.inner.write();
        let branch = table
            .by_id
            .get_mut(&branch_id)
            .ok_or(NotFoundError::Branch(branch_id))?;
        branch.head_commit_id = head;
        branch.updated_at_us = now_us();
        Ok(branch.clone())
    }
}
