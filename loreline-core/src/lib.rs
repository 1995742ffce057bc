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

//! Loreline Core
//!
//! Fundamental records and identifiers for the content-versioning engine:
//! commits, branches, entity diffs, document trees, room messages, the
//! error taxonomy and chain configuration. No storage or locking lives
//! here; see `loreline-storage` for the engines.

pub mod branch;
pub mod clock;
pub mod commit;
pub mod config;
pub mod doc_tree;
pub mod entity;
pub mod error;
pub mod id;
pub mod message;
pub mod repo;

pub use branch::{Branch, BranchResponse, MAIN_BRANCH_NAME};
pub use clock::now_us;
pub use commit::{Commit, CommitId, ParseIdError};
pub use config::{
    ChainConfig, DEFAULT_CHECKPOINT_INTERVAL, DEFAULT_STATE_CACHE_CAPACITY,
    DEFAULT_STATE_CACHE_TTL_SECS,
};
pub use doc_tree::DocFolderTree;
pub use entity::{
    DiffType, EntityDiff, EntityFields, EntityRecord, EntityType, MaterializedState,
    StageEntityResponse,
};
pub use error::{ConflictError, LorelineError, NotFoundError, Result, ValidationError};
pub use id::{BranchId, EntityId, MessageId, RepoId, RoomId, SpaceId, UserId};
pub use message::{HistoryMessageRequest, MessageKind, RoomMessage};
pub use repo::Repository;
