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

//! Property tests for replay-based materialization: random diff programs
//! must materialize identically whether applied incrementally, replayed
//! through checkpoints, or replayed from scratch, and every diff set must
//! invert exactly.

use loreline_core::config::ChainConfig;
use loreline_core::entity::{EntityDiff, EntityFields, EntityType, MaterializedState};
use loreline_core::id::{EntityId, UserId};
use loreline_storage::module_git::diff;
use loreline_storage::ModuleVcs;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::HashSet;

/// Raw generator output: per commit, a list of (entity id, op selector,
/// payload value). The selectors are resolved into valid diffs against a
/// running model, so every generated program applies cleanly.
fn programs() -> impl Strategy<Value = Vec<Vec<(u64, u8, u32)>>> {
    prop::collection::vec(
        prop::collection::vec((0u64..6, 0u8..6, any::<u32>()), 1..5),
        1..12,
    )
}

fn fields(pairs: &[(&str, Value)]) -> EntityFields {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Turn one raw commit into a valid diff set, advancing the live-id model
/// in application order so later ops see earlier effects.
fn build_diff_set(live: &mut HashSet<u64>, raw: &[(u64, u8, u32)]) -> Vec<EntityDiff> {
    let mut set = Vec::with_capacity(raw.len());
    for &(id, kind, value) in raw {
        let diff = if live.contains(&id) {
            match kind % 3 {
                0 => EntityDiff::modify(
                    EntityId(id),
                    EntityType::Item,
                    fields(&[("hp", json!(value))]),
                ),
                1 => EntityDiff::modify(
                    EntityId(id),
                    EntityType::Item,
                    // removes one field, introduces another
                    fields(&[("hp", Value::Null), ("tag", json!(value))]),
                ),
                _ => {
                    live.remove(&id);
                    EntityDiff::delete(EntityId(id), EntityType::Item)
                }
            }
        } else {
            live.insert(id);
            EntityDiff::create(
                EntityId(id),
                EntityType::Item,
                fields(&[("name", json!(format!("e{id}"))), ("hp", json!(value))]),
            )
        };
        set.push(diff);
    }
    set
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// Chain materialization equals incremental diff application at every
    /// commit, with checkpoints in play.
    #[test]
    fn replay_equals_incremental_application(program in programs()) {
        let vcs = ModuleVcs::with_config(ChainConfig::custom(3, 1024, 3600));
        let (record, main) = vcs.create_repository(UserId(1));

        let mut live = HashSet::new();
        let mut expected = MaterializedState::new();
        let mut commits = Vec::new();
        for raw_set in &program {
            let diff_set = build_diff_set(&mut live, raw_set);
            expected = diff::apply(&expected, &diff_set).unwrap();
            let commit = vcs
                .append(record.repo_id, main.branch_id, UserId(1), diff_set)
                .unwrap();
            commits.push((commit.commit_id, expected.clone()));
        }

        for (commit_id, want) in &commits {
            let got = vcs.materialize_at(record.repo_id, *commit_id).unwrap();
            prop_assert_eq!(&*got, want);
        }
    }

    /// Repeated materialization is deterministic, and every non-root
    /// commit satisfies materialize(c) == apply(materialize(parent(c)),
    /// diff_set(c)). Run cache-free so each call is a full replay.
    #[test]
    fn materialization_is_deterministic(program in programs()) {
        let vcs = ModuleVcs::with_config(ChainConfig::replay_only());
        let (record, main) = vcs.create_repository(UserId(1));

        let mut live = HashSet::new();
        for raw_set in &program {
            let diff_set = build_diff_set(&mut live, raw_set);
            vcs.append(record.repo_id, main.branch_id, UserId(1), diff_set)
                .unwrap();
        }

        let repo = vcs.repository(record.repo_id).unwrap();
        let head = repo.branch(main.branch_id).unwrap().head_commit_id;
        for commit in repo.ancestors_of(head).unwrap() {
            let first = repo.materialize_at(commit.commit_id).unwrap();
            let second = repo.materialize_at(commit.commit_id).unwrap();
            prop_assert_eq!(&*first, &*second);

            if let Some(parent) = commit.parent_commit_id {
                let parent_state = repo.materialize_at(parent).unwrap();
                let recomputed = diff::apply(&parent_state, &commit.diff_set).unwrap();
                prop_assert_eq!(&*first, &recomputed);
            }
        }
    }

    /// Applying a set's inverse to the post state restores the pre state
    /// exactly, for any valid set.
    #[test]
    fn invert_restores_prior_state(program in programs()) {
        let mut live = HashSet::new();
        let mut state = MaterializedState::new();
        for raw_set in &program {
            let diff_set = build_diff_set(&mut live, raw_set);
            let next = diff::apply(&state, &diff_set).unwrap();
            let inverse = diff::invert(&state, &diff_set).unwrap();
            let restored = diff::apply(&next, &inverse).unwrap();
            prop_assert_eq!(&restored, &state);
            state = next;
        }
    }
}
