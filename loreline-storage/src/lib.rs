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

//! Loreline Storage Layer
//!
//! In-memory engines behind the content-versioning core:
//!
//! - **`module_git`**: git-like branch/commit history over module
//!   entities, with pure diff replay and checkpointed materialization
//! - **`doc_tree`**: per-(space, user) folder trees with optimistic
//!   version counters
//! - **`message_store`**: append-only room transcripts with sync-cursor
//!   reads and room-to-repository bindings
//!
//! Everything is synchronous and lock-based; no engine here performs I/O.
//! Mutations either fully apply or leave no observable change.

pub mod doc_tree;
pub mod message_store;
pub mod module_git;

pub use doc_tree::DocTreeStore;
pub use message_store::MessageStore;
pub use module_git::{
    validate_branch_name, Ancestors, BranchSet, ChainStats, CommitChain, ModuleRepository,
    ModuleVcs, RepoStats, MAX_BRANCH_NAME_CHARS,
};
