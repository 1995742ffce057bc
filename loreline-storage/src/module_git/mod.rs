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

//! Git-Like Module Versioning
//!
//! Branch/commit version control for story-module content, inspired by
//! Git's object model. History is linear per branch; forks share ancestry
//! structurally and never copy commits.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                       ModuleVcs                            │
//! │            RepoId -> Arc<ModuleRepository>                 │
//! ├────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐   ┌───────────────┐  │
//! │  │  BranchSet   │   │ CommitChain  │   │ append locks  │  │
//! │  │ name index + │──▶│ arena + state│   │  per branch   │  │
//! │  │ main pointer │   │  checkpoints │   │ (serialize    │  │
//! │  └──────────────┘   └──────┬───────┘   │  writers)     │  │
//! │                            │           └───────────────┘  │
//! │                            ▼                               │
//! │                  ┌──────────────────┐                      │
//! │                  │   Diff Engine    │                      │
//! │                  │ pure replay of   │                      │
//! │                  │ entity diff sets │                      │
//! │                  └──────────────────┘                      │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key properties
//!
//! - **Immutable commits**: append-only arena, parent links, BLAKE3 ids
//! - **Exactly one main branch** per repository, enforced in one lock
//! - **Derived snapshots**: materialized states are replayable caches,
//!   never ground truth
//! - **Per-branch append serialization**: no lost updates, no torn heads

pub mod branches;
pub mod chain;
pub mod diff;
pub mod repository;

pub use branches::{validate_branch_name, BranchSet, MAX_BRANCH_NAME_CHARS};
pub use chain::{Ancestors, ChainStats, CommitChain};
pub use repository::{ModuleRepository, ModuleVcs, RepoStats};
