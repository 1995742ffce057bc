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

//! Commit timeline
//!
//! Read-side views over a module repository for history browsing:
//! commit logs and branch listings in wire shape. This is the only
//! layer that converts microsecond stamps into `DateTime<Utc>`; the
//! stores below it deal in raw `u64` stamps.

use chrono::{DateTime, Utc};
use loreline_core::branch::BranchResponse;
use loreline_core::commit::{Commit, CommitId};
use loreline_core::error::Result;
use loreline_core::id::{BranchId, RepoId, UserId};
use loreline_storage::ModuleVcs;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One row of a commit log, shaped for the history panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitLogEntry {
    pub commit_id: CommitId,
    pub parent_commit_id: Option<CommitId>,
    pub branch_id: BranchId,
    pub author_user_id: UserId,
    pub diff_count: usize,
    pub created_at: DateTime<Utc>,
}

impl From<&Commit> for CommitLogEntry {
    fn from(commit: &Commit) -> Self {
        let secs = (commit.created_at_us / 1_000_000) as i64;
        let nsecs = ((commit.created_at_us % 1_000_000) * 1000) as u32;
        let created_at = DateTime::from_timestamp(secs, nsecs).unwrap_or_else(Utc::now);

        Self {
            commit_id: commit.commit_id,
            parent_commit_id: commit.parent_commit_id,
            branch_id: commit.branch_id,
            author_user_id: commit.author_user_id,
            diff_count: commit.diff_count(),
            created_at,
        }
    }
}

/// Log and branch views over the versioning registry.
pub struct Timeline {
    vcs: Arc<ModuleVcs>,
}

impl Timeline {
    pub fn new(vcs: Arc<ModuleVcs>) -> Self {
        Self { vcs }
    }

    /// Walk the log from `from` back toward the root, newest first,
    /// stopping after `max_count` entries when given.
    pub fn log(
        &self,
        repo_id: RepoId,
        from: CommitId,
        max_count: Option<usize>,
    ) -> Result<Vec<CommitLogEntry>> {
        let repo = self.vcs.repository(repo_id)?;
        let entries = repo
            .ancestors_of(from)?
            .take(max_count.unwrap_or(usize::MAX))
            .map(|commit| CommitLogEntry::from(commit.as_ref()))
            .collect();
        Ok(entries)
    }

    /// Log from a branch's current head.
    pub fn branch_log(
        &self,
        repo_id: RepoId,
        branch_id: BranchId,
        max_count: Option<usize>,
    ) -> Result<Vec<CommitLogEntry>> {
        let repo = self.vcs.repository(repo_id)?;
        let head = repo.branch(branch_id)?.head_commit_id;
        let entries = repo
            .ancestors_of(head)?
            .take(max_count.unwrap_or(usize::MAX))
            .map(|commit| CommitLogEntry::from(commit.as_ref()))
            .collect();
        Ok(entries)
    }

    /// Branch listing in wire shape, creation order.
    pub fn branches(&self, repo_id: RepoId) -> Result<Vec<BranchResponse>> {
        Ok(self
            .vcs
            .repository(repo_id)?
            .list_branches()
            .iter()
            .map(BranchResponse::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loreline_core::entity::{EntityDiff, EntityType};
    use loreline_core::id::EntityId;
    use serde_json::{json, Map, Value};

    fn fields(name: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("name".to_string(), json!(name));
        map
    }

    fn seeded_timeline(commits: usize) -> (Timeline, RepoId, Vec<CommitId>) {
        let vcs = Arc::new(ModuleVcs::new());
        let (record, main) = vcs.create_repository(UserId(7));
        let mut ids = vec![record.root_commit_id];
        for i in 0..commits {
            let diff = EntityDiff::create(
                EntityId(i as u64 + 1),
                EntityType::Item,
                fields(&format!("item {i}")),
            );
            let commit = vcs
                .append(record.repo_id, main.branch_id, UserId(7), vec![diff])
                .unwrap();
            ids.push(commit.commit_id);
        }
        (Timeline::new(vcs), record.repo_id, ids)
    }

    #[test]
    fn log_walks_newest_first_to_the_root() {
        let (timeline, repo_id, ids) = seeded_timeline(3);
        let log = timeline.log(repo_id, ids[3], None).unwrap();

        assert_eq!(log.len(), 4);
        assert_eq!(log[0].commit_id, ids[3]);
        assert_eq!(log[3].commit_id, ids[0]);
        assert!(log[3].parent_commit_id.is_none());
        assert_eq!(log[0].diff_count, 1);
        assert_eq!(log[3].diff_count, 0);
    }

    #[test]
    fn log_honors_max_count() {
        let (timeline, repo_id, ids) = seeded_timeline(5);
        let log = timeline.log(repo_id, ids[5], Some(2)).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].commit_id, ids[5]);
        assert_eq!(log[1].commit_id, ids[4]);
    }

    #[test]
    fn log_timestamps_descend_with_the_walk() {
        let (timeline, repo_id, ids) = seeded_timeline(3);
        let log = timeline.log(repo_id, ids[3], None).unwrap();
        for pair in log.windows(2) {
            assert!(pair[0].created_at > pair[1].created_at);
        }
        assert!(log[0].created_at.timestamp() > 1_600_000_000);
    }

    #[test]
    fn branch_log_starts_at_the_head() {
        let (timeline, repo_id, ids) = seeded_timeline(2);
        let main = timeline.branches(repo_id).unwrap()[0].branch_id;
        let log = timeline.branch_log(repo_id, main, Some(1)).unwrap();
        assert_eq!(log[0].commit_id, ids[2]);
    }

    #[test]
    fn branches_reports_the_wire_shape() {
        let (timeline, repo_id, ids) = seeded_timeline(1);
        timeline
            .vcs
            .create_branch(repo_id, "fork", ids[1], UserId(9))
            .unwrap();

        let listed = timeline.branches(repo_id).unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed[0].is_main);
        assert_eq!(listed[1].name, "fork");

        let value = serde_json::to_value(&listed[1]).unwrap();
        assert_eq!(value["userId"], json!(9));
        assert!(value.get("createTime").is_some());
    }

    #[test]
    fn log_entry_serializes_camel_case() {
        let (timeline, repo_id, ids) = seeded_timeline(1);
        let log = timeline.log(repo_id, ids[1], Some(1)).unwrap();
        let value = serde_json::to_value(&log[0]).unwrap();
        assert!(value.get("commitId").is_some());
        assert!(value.get("parentCommitId").is_some());
        assert!(value.get("diffCount").is_some());
        assert!(value.get("createdAt").is_some());
    }
}
