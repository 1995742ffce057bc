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

//! Room messages and the history fetch request
//!
//! Messages are append-only per room, with ids that double as the sync
//! cursor: a client holding `syncId` has everything below it. A fetch may
//! optionally pin to a commit, turning the feed into the archived
//! transcript as it stood when that commit was created.

use crate::commit::CommitId;
use crate::id::{MessageId, RoomId, UserId};
use serde::{Deserialize, Serialize};

/// What kind of line a room message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Ordinary chat text.
    Text,
    /// A slash-command line (dice rolls and the like); execution is out of
    /// scope here, the transcript keeps the line.
    Command,
    /// Engine-generated notices.
    System,
}

/// One line of a room's transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMessage {
    pub message_id: MessageId,
    pub room_id: RoomId,
    pub author_user_id: UserId,
    pub kind: MessageKind,
    pub content: String,
    pub created_at_us: u64,
}

/// History fetch request: `{roomId, syncId, commitId?}`.
///
/// `sync_id` is the first message id the client is missing; `commit_id`
/// pins the feed to the transcript as archived at that commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryMessageRequest {
    pub room_id: RoomId,
    pub sync_id: MessageId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_id: Option<CommitId>,
}

impl HistoryMessageRequest {
    /// Fetch the live feed from `sync_id` onward.
    pub fn live(room_id: RoomId, sync_id: MessageId) -> Self {
        Self {
            room_id,
            sync_id,
            commit_id: None,
        }
    }

    /// Fetch the feed as archived at `commit_id`.
    pub fn pinned(room_id: RoomId, sync_id: MessageId, commit_id: CommitId) -> Self {
        Self {
            room_id,
            sync_id,
            commit_id: Some(commit_id),
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.commit_id.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::Commit;
    use crate::id::BranchId;

    #[test]
    fn request_constructors() {
        let live = HistoryMessageRequest::live(RoomId(5), MessageId(1));
        assert!(!live.is_pinned());

        let commit = Commit::root(BranchId::new(), UserId(1));
        let pinned = HistoryMessageRequest::pinned(RoomId(5), MessageId(1), commit.commit_id);
        assert!(pinned.is_pinned());
    }

    #[test]
    fn request_parses_wire_shape() {
        let commit = Commit::root(BranchId::new(), UserId(1));
        let raw = format!(
            r#"{{"roomId": 9, "syncId": 3, "commitId": "{}"}}"#,
            commit.commit_id.to_hex()
        );
        let request: HistoryMessageRequest = serde_json::from_str(&raw).unwrap();
        assert_eq!(request.room_id, RoomId(9));
        assert_eq!(request.sync_id, MessageId(3));
        assert_eq!(request.commit_id, Some(commit.commit_id));

        let live: HistoryMessageRequest =
            serde_json::from_str(r#"{"roomId": 9, "syncId": 3}"#).unwrap();
        assert_eq!(live.commit_id, None);
    }
}
