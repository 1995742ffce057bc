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

//! Module repositories
//!
//! [`ModuleRepository`] wires one repository's branch table, commit chain
//! and per-branch append locks together; [`ModuleVcs`] is the process-wide
//! registry the application talks to.
//!
//! Appends serialize per branch: the append lock spans materializing the
//! parent state, validating the diff set, inserting the commit and swinging
//! the head. Two writers on one branch cannot fork it, a failed append
//! leaves no trace, and branch deletion takes the same lock so an in-flight
//! append never races the pointer away. Different branches append in
//! parallel; reads never take the append lock at all.

use crate::module_git::branches::BranchSet;
use crate::module_git::chain::{Ancestors, CommitChain};
use crate::module_git::diff;
use dashmap::DashMap;
use loreline_core::branch::{Branch, MAIN_BRANCH_NAME};
use loreline_core::commit::{Commit, CommitId};
use loreline_core::config::ChainConfig;
use loreline_core::entity::{EntityDiff, MaterializedState};
use loreline_core::error::{NotFoundError, Result};
use loreline_core::id::{BranchId, RepoId, UserId};
use loreline_core::repo::Repository;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// One module's live version history: record, branches, commits, locks.
#[derive(Debug)]
pub struct ModuleRepository {
    record: Repository,
    branches: BranchSet,
    chain: CommitChain,
    append_locks: DashMap<BranchId, Arc<Mutex<()>>>,
}

impl ModuleRepository {
    /// Fresh repository: a synthetic empty root commit and a main branch
    /// pointing at it. Heads are never null.
    fn bootstrap(owner: UserId, config: &ChainConfig) -> Self {
        let branch_id = BranchId::new();
        let root = Commit::root(branch_id, owner);
        let main = Branch::new(branch_id, MAIN_BRANCH_NAME, owner, root.commit_id, true);
        let record = Repository::new(owner, root.commit_id);
        Self {
            record,
            branches: BranchSet::bootstrap(main),
            chain: CommitChain::new(root, config),
            append_locks: DashMap::new(),
        }
    }

    pub fn record(&self) -> &Repository {
        &self.record
    }

    pub fn repo_id(&self) -> RepoId {
        self.record.repo_id
    }

    pub fn root_commit_id(&self) -> CommitId {
        self.record.root_commit_id
    }

    pub fn branch(&self, branch_id: BranchId) -> Result<Branch> {
        self.branches
            .get(branch_id)
            .ok_or_else(|| NotFoundError::Branch(branch_id).into())
    }

    pub fn branch_by_name(&self, name: &str) -> Option<Branch> {
        self.branches.get_by_name(name)
    }

    pub fn main_branch(&self) -> Branch {
        self.branches.main()
    }

    /// All branches, oldest first.
    pub fn list_branches(&self) -> Vec<Branch> {
        self.branches.list()
    }

    /// Fork a new (non-main) branch at `from_commit_id`. Copies no
    /// commits; both branches share ancestry structurally.
    pub fn create_branch(
        &self,
        name: &str,
        from_commit_id: CommitId,
        owner: UserId,
    ) -> Result<Branch> {
        if !self.chain.contains(from_commit_id) {
            return Err(NotFoundError::Commit(from_commit_id).into());
        }
        let branch = Branch::new(BranchId::new(), name, owner, from_commit_id, false);
        self.branches.insert(branch.clone())?;
        info!(
            repo = %self.record.repo_id,
            branch = %branch.branch_id,
            name = %branch.name,
            from = %from_commit_id,
            "created branch"
        );
        Ok(branch)
    }

    pub fn rename_branch(&self, branch_id: BranchId, new_name: &str) -> Result<Branch> {
        let branch = self.branches.rename(branch_id, new_name)?;
        info!(repo = %self.record.repo_id, branch = %branch_id, name = %branch.name, "renamed branch");
        Ok(branch)
    }

    /// Delete a branch pointer. Refuses the main branch; commits stay in
    /// the arena (shared ancestry outlives the pointer).
    pub fn delete_branch(&self, branch_id: BranchId) -> Result<Branch> {
        let lock = self.append_lock(branch_id);
        let _guard = lock.lock();
        let removed = self.branches.remove(branch_id)?;
        self.append_locks.remove(&branch_id);
        info!(repo = %self.record.repo_id, branch = %branch_id, name = %removed.name, "deleted branch");
        Ok(removed)
    }

    /// Promote a branch to main, demoting the previous main atomically.
    pub fn set_main(&self, branch_id: BranchId) -> Result<Branch> {
        let promoted = self.branches.set_main(branch_id)?;
        info!(repo = %self.record.repo_id, branch = %branch_id, name = %promoted.name, "set main branch");
        Ok(promoted)
    }

    /// Append one commit to a branch.
    ///
    /// Serialized per branch. The diff set validates against the branch's
    /// current head state; on conflict nothing is inserted and the head
    /// does not move.
    pub fn append(
        &self,
        branch_id: BranchId,
        author: UserId,
        diff_set: Vec<EntityDiff>,
    ) -> Result<Arc<Commit>> {
        let lock = self.append_lock(branch_id);
        let _guard = lock.lock();

        let branch = self.branch(branch_id)?;
        let parent = self
            .chain
            .commit(branch.head_commit_id)
            .ok_or(NotFoundError::Commit(branch.head_commit_id))?;
        let parent_state = self.chain.materialize_at(parent.commit_id)?;
        let next_state = diff::apply(&parent_state, &diff_set)?;

        let commit = self
            .chain
            .insert(Commit::child(&parent, branch_id, diff_set, author), Arc::new(next_state));
        self.branches.advance_head(branch_id, commit.commit_id)?;
        debug!(
            repo = %self.record.repo_id,
            branch = %branch_id,
            commit = %commit.commit_id,
            diffs = commit.diff_count(),
            "appended commit"
        );
        Ok(commit)
    }

    /// Undo `target` by appending its inverse diff set to `branch_id`.
    ///
    /// The inverse is computed against the target's parent state; if the
    /// branch head has since diverged in a way the inverse no longer fits,
    /// the append conflicts like any other.
    pub fn revert(
        &self,
        branch_id: BranchId,
        author: UserId,
        target: CommitId,
    ) -> Result<Arc<Commit>> {
        let target_commit = self
            .chain
            .commit(target)
            .ok_or(NotFoundError::Commit(target))?;
        let parent_state = match target_commit.parent_commit_id {
            Some(parent) => self.chain.materialize_at(parent)?,
            None => Arc::new(MaterializedState::new()),
        };
        let inverse = diff::invert(&parent_state, &target_commit.diff_set)?;
        debug!(repo = %self.record.repo_id, target = %target, "reverting commit");
        self.append(branch_id, author, inverse)
    }

    pub fn commit(&self, commit_id: CommitId) -> Option<Arc<Commit>> {
        self.chain.commit(commit_id)
    }

    pub fn contains_commit(&self, commit_id: CommitId) -> bool {
        self.chain.contains(commit_id)
    }

    /// Snapshot of the module at any commit in this repository.
    pub fn materialize_at(&self, commit_id: CommitId) -> Result<Arc<MaterializedState>> {
        self.chain.materialize_at(commit_id)
    }

    /// Snapshot at a branch's current head.
    pub fn materialize_head(&self, branch_id: BranchId) -> Result<Arc<MaterializedState>> {
        let branch = self.branch(branch_id)?;
        self.chain.materialize_at(branch.head_commit_id)
    }

    /// Ancestors of a commit, newest first, ending at the root.
    pub fn ancestors_of(&self, commit_id: CommitId) -> Result<Ancestors<'_>> {
        self.chain.ancestors_of(commit_id)
    }

    pub fn stats(&self) -> RepoStats {
        let chain = self.chain.stats();
        RepoStats {
            branch_count: self.branches.len() as u64,
            commit_count: chain.commit_count,
            cached_states: chain.cached_states,
        }
    }

    /// See [`CommitChain::run_cache_maintenance`].
    pub fn run_cache_maintenance(&self) {
        self.chain.run_cache_maintenance();
    }

    fn append_lock(&self, branch_id: BranchId) -> Arc<Mutex<()>> {
        self.append_locks.entry(branch_id).or_default().clone()
    }
}

/// Counters for one repository.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RepoStats {
    pub branch_count: u64,
    pub commit_count: u64,
    pub cached_states: u64,
}

/// Process-wide registry of module repositories.
///
/// Thread safe throughout; handles are `Arc`s, so a looked-up repository
/// stays usable however long the caller holds it.
pub struct ModuleVcs {
    repos: DashMap<RepoId, Arc<ModuleRepository>>,
    config: ChainConfig,
}

impl ModuleVcs {
    pub fn new() -> Self {
        Self::with_config(ChainConfig::default())
    }

    pub fn with_config(config: ChainConfig) -> Self {
        Self {
            repos: DashMap::new(),
            config,
        }
    }

    /// Create a repository owned by `owner`: synthetic root commit, main
    /// branch pointing at it.
    pub fn create_repository(&self, owner: UserId) -> (Repository, Branch) {
        let repo = ModuleRepository::bootstrap(owner, &self.config);
        let record = repo.record().clone();
        let main = repo.main_branch();
        self.repos.insert(record.repo_id, Arc::new(repo));
        info!(repo = %record.repo_id, owner = %owner, "created module repository");
        (record, main)
    }

    pub fn repository(&self, repo_id: RepoId) -> Result<Arc<ModuleRepository>> {
        self.repos
            .get(&repo_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| NotFoundError::Repository(repo_id).into())
    }

    pub fn repository_count(&self) -> usize {
        self.repos.len()
    }

    pub fn create_branch(
        &self,
        repo_id: RepoId,
        name: &str,
        from_commit_id: CommitId,
        owner: UserId,
    ) -> Result<Branch> {
        self.repository(repo_id)?
            .create_branch(name, from_commit_id, owner)
    }

    pub fn rename_branch(
        &self,
        repo_id: RepoId,
        branch_id: BranchId,
        new_name: &str,
    ) -> Result<Branch> {
        self.repository(repo_id)?.rename_branch(branch_id, new_name)
    }

    pub fn delete_branch(&self, repo_id: RepoId, branch_id: BranchId) -> Result<Branch> {
        self.repository(repo_id)?.delete_branch(branch_id)
    }

    pub fn set_main(&self, repo_id: RepoId, branch_id: BranchId) -> Result<Branch> {
        self.repository(repo_id)?.set_main(branch_id)
    }

    pub fn list_branches(&self, repo_id: RepoId) -> Result<Vec<Branch>> {
        Ok(self.repository(repo_id)?.list_branches())
    }

    pub fn append(
        &self,
        repo_id: RepoId,
        branch_id: BranchId,
        author: UserId,
        diff_set: Vec<EntityDiff>,
    ) -> Result<Arc<Commit>> {
        self.repository(repo_id)?.append(branch_id, author, diff_set)
    }

    pub fn revert(
        &self,
        repo_id: RepoId,
        branch_id: BranchId,
        author: UserId,
        target: CommitId,
    ) -> Result<Arc<Commit>> {
        self.repository(repo_id)?.revert(branch_id, author, target)
    }

    pub fn materialize_at(
        &self,
        repo_id: RepoId,
        commit_id: CommitId,
    ) -> Result<Arc<MaterializedState>> {
        self.repository(repo_id)?.materialize_at(commit_id)
    }

    pub fn stats(&self, repo_id: RepoId) -> Result<RepoStats> {
        Ok(self.repository(repo_id)?.stats())
    }
}

impl Default for ModuleVcs {
    fn default() -> Self {
        Self::new()
    }
}
