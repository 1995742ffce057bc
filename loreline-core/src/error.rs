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

//! Error taxonomy
//!
//! Three families, matching how callers should react:
//! - [`ValidationError`]: the request is malformed or breaks a rule;
//!   rejected before any state changes. Fix the request.
//! - [`ConflictError`]: the request raced another writer or targets stale
//!   state. Re-read and retry.
//! - [`NotFoundError`]: the referenced object does not exist.
//!
//! Mutating operations either fully apply or leave no observable change;
//! there are no partial commits to clean up after an error.

use crate::commit::CommitId;
use crate::entity::EntityType;
use crate::id::{BranchId, EntityId, RepoId, RoomId};
use thiserror::Error;

/// Request was malformed or breaks a structural rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("branch name already exists: {0}")]
    DuplicateBranchName(String),
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),
    #[error("the main branch cannot be deleted")]
    DeleteMainBranch,
}

/// Request lost a race or targets stale state; retry after re-reading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    #[error("entity {0} already exists")]
    EntityAlreadyExists(EntityId),
    #[error("entity {0} does not exist")]
    EntityNotFound(EntityId),
    #[error("entity {entity_id} has type {actual}, expected {expected}")]
    EntityTypeMismatch {
        entity_id: EntityId,
        expected: EntityType,
        actual: EntityType,
    },
    #[error("version mismatch: expected {expected}, current {current}")]
    VersionMismatch { expected: u64, current: u64 },
}

/// Referenced object does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("repository not found: {0}")]
    Repository(RepoId),
    #[error("branch not found: {0}")]
    Branch(BranchId),
    #[error("commit not found: {0}")]
    Commit(CommitId),
    #[error("room has no bound module repository: {0}")]
    Room(RoomId),
}

/// Unified error for all engine operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LorelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Conflict(#[from] ConflictError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

impl LorelineError {
    /// Whether re-reading current state and retrying can succeed.
    /// Validation and not-found failures never will; conflicts can.
    pub fn is_retryable(&self) -> bool {
        matches!(self, LorelineError::Conflict(_))
    }
}

pub type Result<T> = std::result::Result<T, LorelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_conflicts_are_retryable() {
        let conflict = LorelineError::from(ConflictError::VersionMismatch {
            expected: 1,
            current: 3,
        });
        assert!(conflict.is_retryable());

        let validation = LorelineError::from(ValidationError::DeleteMainBranch);
        assert!(!validation.is_retryable());

        let not_found = LorelineError::from(NotFoundError::Branch(BranchId::new()));
        assert!(!not_found.is_retryable());
    }

    #[test]
    fn messages_name_the_offender() {
        let err = ConflictError::EntityTypeMismatch {
            entity_id: EntityId(3),
            expected: EntityType::Role,
            actual: EntityType::Item,
        };
        assert_eq!(err.to_string(), "entity 3 has type item, expected role");
    }
}
