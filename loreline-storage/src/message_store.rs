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

//! Room message log
//!
//! Append-only transcript per room. Message ids double as sync cursors:
//! they are assigned under the room's write lock, monotonically from 1,
//! and the log stays sorted by construction, so cursor reads are a binary
//! search plus a tail clone. Timestamps come from the process-monotonic
//! clock, which is what lets pinned history cut on "created at or before
//! the commit" without ties.
//!
//! The store also keeps the room -> module-repository binding that pinned
//! reads check commits against.

use dashmap::DashMap;
use loreline_core::clock::now_us;
use loreline_core::id::{MessageId, RepoId, RoomId, UserId};
use loreline_core::message::{MessageKind, RoomMessage};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Default)]
struct RoomLog {
    last_id: u64,
    messages: Vec<RoomMessage>,
}

/// Transcripts and module bindings for all rooms.
#[derive(Default)]
pub struct MessageStore {
    rooms: DashMap<RoomId, Arc<RwLock<RoomLog>>>,
    bindings: DashMap<RoomId, RepoId>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate a room with the module repository its pinned history is
    /// checked against. Rebinding replaces the association.
    pub fn bind_module(&self, room_id: RoomId, repo_id: RepoId) {
        self.bindings.insert(room_id, repo_id);
    }

    pub fn binding(&self, room_id: RoomId) -> Option<RepoId> {
        self.bindings.get(&room_id).map(|entry| *entry.value())
    }

    /// Append one line to a room's transcript and return it with its
    /// assigned id and stamp.
    pub fn append(
        &self,
        room_id: RoomId,
        author: UserId,
        kind: MessageKind,
        content: impl Into<String>,
    ) -> RoomMessage {
        let log = self.room_log_or_insert(room_id);
        let mut log = log.write();
        log.last_id += 1;
        let message = RoomMessage {
            message_id: MessageId(log.last_id),
            room_id,
            author_user_id: author,
            kind,
            content: content.into(),
            created_at_us: now_us(),
        };
        log.messages.push(message.clone());
        message
    }

    /// Messages with id >= `sync_id`, ascending. Unknown rooms yield an
    /// empty result, not an error: the caller is simply caught up.
    pub fn read_from(&self, room_id: RoomId, sync_id: MessageId) -> Vec<RoomMessage> {
        match self.room_log(room_id) {
            None => Vec::new(),
            Some(log) => {
                let log = log.read();
                let start = log.messages.partition_point(|m| m.message_id < sync_id);
                log.messages[start..].to_vec()
            }
        }
    }

    /// Like [`read_from`](Self::read_from), additionally stopping at
    /// messages created after `cutoff_us`. This is the pinned-history cut.
    pub fn read_from_until(
        &self,
        room_id: RoomId,
        sync_id: MessageId,
        cutoff_us: u64,
    ) -> Vec<RoomMessage> {
        match self.room_log(room_id) {
            None => Vec::new(),
            Some(log) => {
                let log = log.read();
                let start = log.messages.partition_point(|m| m.message_id < sync_id);
                // ids and stamps are both monotonic per room
                log.messages[start..]
                    .iter()
                    .take_while(|m| m.created_at_us <= cutoff_us)
                    .cloned()
                    .collect()
            }
        }
    }

    /// Highest assigned id, if the room has any messages.
    pub fn latest_sync_id(&self, room_id: RoomId) -> Option<MessageId> {
        let log = self.room_log(room_id)?;
        let log = log.read();
        (log.last_id > 0).then_some(MessageId(log.last_id))
    }

    pub fn message_count(&self, room_id: RoomId) -> usize {
        self.room_log(room_id)
            .map(|log| log.read().messages.len())
            .unwrap_or(0)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn room_log(&self, room_id: RoomId) -> Option<Arc<RwLock<RoomLog>>> {
        self.rooms.get(&room_id).map(|entry| entry.value().clone())
    }

    fn room_log_or_insert(&self, room_id: RoomId) -> Arc<RwLock<RoomLog>> {
        self.rooms.entry(room_id).or_default().clone()
    }
}
