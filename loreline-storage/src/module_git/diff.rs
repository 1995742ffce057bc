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

//! Entity Diff Engine
//!
//! Applies a commit's diff set to a materialized state, producing the next
//! state. Pure and deterministic: no locks, no caches, no clocks. Replaying
//! the same chain from the same base always yields the same snapshot, which
//! is what makes checkpoint caching safe.
//!
//! Diffs in one set apply in order and see the effects of earlier entries,
//! so deleting and recreating one entity inside a single set is legal (and
//! is how an entity changes type).

use loreline_core::entity::{DiffType, EntityDiff, EntityFields, EntityRecord, MaterializedState};
use loreline_core::error::ConflictError;
use serde_json::Value;

/// Apply `diff_set` to `state`, returning the next state.
///
/// The input state is untouched. On error nothing observable changes;
/// errors are conflicts: create of a live id, modify or delete of a
/// missing id, or a modify whose claimed type disagrees with the record.
pub fn apply(
    state: &MaterializedState,
    diff_set: &[EntityDiff],
) -> Result<MaterializedState, ConflictError> {
    let mut next = state.clone();
    for diff in diff_set {
        apply_one(&mut next, diff)?;
    }
    Ok(next)
}

fn apply_one(state: &mut MaterializedState, diff: &EntityDiff) -> Result<(), ConflictError> {
    match diff.diff_type {
        DiffType::Create => {
            if state.contains(diff.entity_id) {
                return Err(ConflictError::EntityAlreadyExists(diff.entity_id));
            }
            let fields = diff.entity_info.clone().unwrap_or_default();
            state.insert(diff.entity_id, EntityRecord::new(diff.entity_type, fields));
        }
        DiffType::Modify => {
            let record = state
                .get_mut(diff.entity_id)
                .ok_or(ConflictError::EntityNotFound(diff.entity_id))?;
            if record.entity_type != diff.entity_type {
                return Err(ConflictError::EntityTypeMismatch {
                    entity_id: diff.entity_id,
                    expected: record.entity_type,
                    actual: diff.entity_type,
                });
            }
            if let Some(patch) = &diff.entity_info {
                record.merge_fields(patch);
            }
        }
        DiffType::Delete => {
            // deletes go by id alone; the claimed type is not checked
            if state.remove(diff.entity_id).is_none() {
                return Err(ConflictError::EntityNotFound(diff.entity_id));
            }
        }
    }
    Ok(())
}

/// The inverse of `diff_set` relative to the state it applies to.
///
/// Appending the result undoes the set: `apply(apply(s, set), invert(s,
/// set))` equals `s` exactly. Creates invert to deletes, deletes to
/// creates carrying the removed record, and modifies to patches restoring
/// prior values (fields the patch introduced are removed again via
/// `null`). Output is reversed so later entries undo first.
pub fn invert(
    state: &MaterializedState,
    diff_set: &[EntityDiff],
) -> Result<Vec<EntityDiff>, ConflictError> {
    let mut working = state.clone();
    let mut inverses = Vec::with_capacity(diff_set.len());
    for diff in diff_set {
        let inverse = match diff.diff_type {
            DiffType::Create => EntityDiff::delete(diff.entity_id, diff.entity_type),
            DiffType::Modify => {
                let record = working
                    .get(diff.entity_id)
                    .ok_or(ConflictError::EntityNotFound(diff.entity_id))?;
                let mut restore = EntityFields::new();
                if let Some(patch) = &diff.entity_info {
                    for key in patch.keys() {
                        match record.fields.get(key) {
                            Some(prior) => restore.insert(key.clone(), prior.clone()),
                            None => restore.insert(key.clone(), Value::Null),
                        };
                    }
                }
                EntityDiff::modify(diff.entity_id, record.entity_type, restore)
            }
            DiffType::Delete => {
                let record = working
                    .get(diff.entity_id)
                    .ok_or(ConflictError::EntityNotFound(diff.entity_id))?;
                EntityDiff::create(diff.entity_id, record.entity_type, record.fields.clone())
            }
        };
        apply_one(&mut working, diff)?;
        inverses.push(inverse);
    }
    inverses.reverse();
    Ok(inverses)
}
