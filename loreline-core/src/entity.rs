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

//! Module entities and diffs
//!
//! A module's content is a flat set of typed entities (items, roles,
//! scenes), each carrying a free-form JSON payload. Commits never store
//! whole entities; they store `EntityDiff`s, and `MaterializedState` is the
//! snapshot reconstructed by replaying diffs along a commit chain.
//!
//! Modify payloads follow JSON-merge-patch shape: a present field
//! overwrites the stored value, a `null` removes the field, absent fields
//! are untouched.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Free-form entity payload. `serde_json::Map` keeps keys sorted, so the
/// JSON encoding (and therefore the commit-id hash over it) is canonical.
pub type EntityFields = serde_json::Map<String, Value>;

/// Kind of module entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Item,
    Role,
    Scene,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Item => "item",
            EntityType::Role => "role",
            EntityType::Scene => "scene",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of change carried by a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffType {
    Create,
    Modify,
    Delete,
}

impl DiffType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiffType::Create => "create",
            DiffType::Modify => "modify",
            DiffType::Delete => "delete",
        }
    }
}

impl std::fmt::Display for DiffType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entity-level change. The atomic unit of a commit's diff set.
///
/// `entity_info` is the full payload for `create`, a merge patch for
/// `modify`, and absent for `delete` (a delete carries no new content).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDiff {
    pub entity_id: EntityId,
    pub entity_type: EntityType,
    pub diff_type: DiffType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_info: Option<EntityFields>,
}

impl EntityDiff {
    pub fn create(entity_id: EntityId, entity_type: EntityType, fields: EntityFields) -> Self {
        Self {
            entity_id,
            entity_type,
            diff_type: DiffType::Create,
            entity_info: Some(fields),
        }
    }

    pub fn modify(entity_id: EntityId, entity_type: EntityType, patch: EntityFields) -> Self {
        Self {
            entity_id,
            entity_type,
            diff_type: DiffType::Modify,
            entity_info: Some(patch),
        }
    }

    pub fn delete(entity_id: EntityId, entity_type: EntityType) -> Self {
        Self {
            entity_id,
            entity_type,
            diff_type: DiffType::Delete,
            entity_info: None,
        }
    }
}

/// A live entity inside a materialized snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRecord {
    pub entity_type: EntityType,
    pub fields: EntityFields,
}

impl EntityRecord {
    pub fn new(entity_type: EntityType, fields: EntityFields) -> Self {
        Self {
            entity_type,
            fields,
        }
    }

    /// Display name, when the payload carries one.
    pub fn name(&self) -> Option<&str> {
        self.fields.get("name").and_then(Value::as_str)
    }

    /// Apply a merge patch: present fields overwrite, `null` removes.
    pub fn merge_fields(&mut self, patch: &EntityFields) {
        for (key, value) in patch {
            if value.is_null() {
                self.fields.remove(key);
            } else {
                self.fields.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Snapshot of all live entities at some commit.
///
/// Always derived, never ground truth: any instance can be rebuilt by
/// replaying the commit chain, which is what makes checkpoint caches safe
/// to drop at any time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterializedState {
    entities: HashMap<EntityId, EntityRecord>,
}

impl MaterializedState {
    /// Empty snapshot (the state of every root commit).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, entity_id: EntityId) -> Option<&EntityRecord> {
        self.entities.get(&entity_id)
    }

    pub fn get_mut(&mut self, entity_id: EntityId) -> Option<&mut EntityRecord> {
        self.entities.get_mut(&entity_id)
    }

    pub fn contains(&self, entity_id: EntityId) -> bool {
        self.entities.contains_key(&entity_id)
    }

    pub fn insert(&mut self, entity_id: EntityId, record: EntityRecord) -> Option<EntityRecord> {
        self.entities.insert(entity_id, record)
    }

    pub fn remove(&mut self, entity_id: EntityId) -> Option<EntityRecord> {
        self.entities.remove(&entity_id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &EntityRecord)> {
        self.entities.iter().map(|(id, record)| (*id, record))
    }

    /// All entities of one type, ordered by id for stable listings.
    pub fn of_type(&self, entity_type: EntityType) -> Vec<(EntityId, &EntityRecord)> {
        let mut matches: Vec<_> = self
            .entities
            .iter()
            .filter(|(_, record)| record.entity_type == entity_type)
            .map(|(id, record)| (*id, record))
            .collect();
        matches.sort_by_key(|(id, _)| *id);
        matches
    }
}

/// Wire shape for one staged entity change, as the module editor consumes
/// it: `{id, name, entityType, entityInfo, diffType}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEntityResponse {
    pub id: EntityId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub entity_type: EntityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_info: Option<EntityFields>,
    pub diff_type: DiffType,
}

impl StageEntityResponse {
    /// The diff this response describes, for submission back into a commit.
    pub fn into_diff(self) -> EntityDiff {
        EntityDiff {
            entity_id: self.id,
            entity_type: self.entity_type,
            diff_type: self.diff_type,
            entity_info: self.entity_info,
        }
    }
}

impl From<&EntityDiff> for StageEntityResponse {
    fn from(diff: &EntityDiff) -> Self {
        let name = diff
            .entity_info
            .as_ref()
            .and_then(|fields| fields.get("name"))
            .and_then(Value::as_str)
            .map(str::to_owned);
        Self {
            id: diff.entity_id,
            name,
            entity_type: diff.entity_type,
            entity_info: diff.entity_info.clone(),
            diff_type: diff.diff_type,
        }
    }
}
