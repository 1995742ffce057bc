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

//! Loreline Query Layer
//!
//! Read-side surfaces over the storage engines:
//!
//! - **`history`**: the room history feed, served live from a sync cursor
//!   or pinned to the transcript as archived at a commit
//! - **`timeline`**: commit logs and branch listings in the wire shapes
//!   the history-browsing UI consumes
//!
//! Nothing here mutates the stores; fetches are idempotent and safe to
//! retry with the same cursor.

pub mod history;
pub mod timeline;

pub use history::HistorySynchronizer;
pub use timeline::{CommitLogEntry, Timeline};
