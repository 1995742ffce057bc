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

//! Process-wide monotonic clock
//!
//! All records in this workspace are stamped with microseconds since the
//! Unix epoch. Commit stamps and message stamps share one ordering: a
//! history feed pinned to a commit cuts on "created at or before the
//! commit", so two stamps taken one after the other must never compare
//! equal or reversed, even when the wall clock is too coarse or steps
//! backwards. `now_us` enforces that with an atomic high-water mark.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static LAST_US: AtomicU64 = AtomicU64::new(0);

/// Current time in microseconds since the Unix epoch, strictly increasing
/// within this process.
pub fn now_us() -> u64 {
    let wall = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_micros() as u64;
    let mut last = LAST_US.load(Ordering::Relaxed);
    loop {
        let next = wall.max(last + 1);
        match LAST_US.compare_exchange_weak(last, next, Ordering::Relaxed, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(observed) => last = observed,
        }
    }
}
