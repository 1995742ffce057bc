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

//! History synchronizer
//!
//! Serves the room history feed. A live fetch pages the transcript from
//! the client's sync cursor. A pinned fetch replays the transcript as it
//! stood when a commit was created, so an archived run can be re-read
//! next to the module state of that moment.

use loreline_core::commit::{Commit, CommitId};
use loreline_core::entity::MaterializedState;
use loreline_core::error::{NotFoundError, Result};
use loreline_core::id::RoomId;
use loreline_core::message::{HistoryMessageRequest, RoomMessage};
use loreline_storage::{MessageStore, ModuleVcs};
use std::sync::Arc;
use tracing::debug;

/// Read-side facade over the message store and the versioning registry.
///
/// Thread safe; fetches never block appends beyond the stores' own
/// short read locks.
pub struct HistorySynchronizer {
    messages: Arc<MessageStore>,
    vcs: Arc<ModuleVcs>,
}

impl HistorySynchronizer {
    pub fn new(messages: Arc<MessageStore>, vcs: Arc<ModuleVcs>) -> Self {
        Self { messages, vcs }
    }

    /// Serve one history fetch.
    ///
    /// Live requests (`commit_id` absent) return messages with id >=
    /// `sync_id`, ascending; an unknown room is an empty feed, the caller
    /// is simply caught up. Pinned requests additionally require the
    /// room's bound repository to contain the commit, then cut the feed
    /// at the commit's creation instant. Both forms are idempotent and
    /// safe to retry with the same cursor.
    pub fn fetch(&self, request: &HistoryMessageRequest) -> Result<Vec<RoomMessage>> {
        match request.commit_id {
            None => Ok(self.messages.read_from(request.room_id, request.sync_id)),
            Some(commit_id) => {
                let commit = self.pinned_commit(request.room_id, commit_id)?;
                debug!(room = %request.room_id, commit = %commit_id, "pinned history fetch");
                Ok(self.messages.read_from_until(
                    request.room_id,
                    request.sync_id,
                    commit.created_at_us,
                ))
            }
        }
    }

    /// Module snapshot backing a pinned feed: the materialized state at
    /// the pin commit, resolved through the room's binding.
    pub fn snapshot_at(
        &self,
        room_id: RoomId,
        commit_id: CommitId,
    ) -> Result<Arc<MaterializedState>> {
        let repo_id = self
            .messages
            .binding(room_id)
            .ok_or(NotFoundError::Room(room_id))?;
        self.vcs.repository(repo_id)?.materialize_at(commit_id)
    }

    fn pinned_commit(&self, room_id: RoomId, commit_id: CommitId) -> Result<Arc<Commit>> {
        let repo_id = self
            .messages
            .binding(room_id)
            .ok_or(NotFoundError::Room(room_id))?;
        let repo = self.vcs.repository(repo_id)?;
        repo.commit(commit_id)
            .ok_or_else(|| NotFoundError::Commit(commit_id).into())
    }
}
