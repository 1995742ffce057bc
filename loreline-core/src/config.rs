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

//! Commit chain configuration

use serde::{Deserialize, Serialize};

/// Default spacing between cached checkpoints along a chain, in commits.
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 32;

/// Default upper bound on cached materialized states per repository.
pub const DEFAULT_STATE_CACHE_CAPACITY: u64 = 4096;

/// Default time-to-live for cached states (one hour).
pub const DEFAULT_STATE_CACHE_TTL_SECS: u64 = 3600;

/// Tuning for a repository's commit chain: how often replays drop
/// checkpoints and how large the materialized-state cache may grow.
///
/// Every setting is a pure performance knob. Materialization results are
/// identical under any configuration; only replay cost changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Cache a checkpoint every this many commits during replay.
    /// Clamped to at least 1 when the chain is built.
    pub checkpoint_interval: u64,
    /// Max cached states per repository. 0 disables caching.
    pub state_cache_capacity: u64,
    /// Seconds before an untouched cached state expires.
    pub state_cache_ttl_secs: u64,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            state_cache_capacity: DEFAULT_STATE_CACHE_CAPACITY,
            state_cache_ttl_secs: DEFAULT_STATE_CACHE_TTL_SECS,
        }
    }
}

impl ChainConfig {
    /// No state caching at all: every materialization replays from the
    /// root. Mostly useful in tests that must observe pure replay.
    pub fn replay_only() -> Self {
        Self {
            checkpoint_interval: u64::MAX,
            state_cache_capacity: 0,
            state_cache_ttl_secs: 1,
        }
    }

    /// Explicit settings; `checkpoint_interval` is clamped to at least 1.
    pub fn custom(checkpoint_interval: u64, cache_capacity: u64, cache_ttl_secs: u64) -> Self {
        Self {
            checkpoint_interval: checkpoint_interval.max(1),
            state_cache_capacity: cache_capacity,
            state_cache_ttl_secs: cache_ttl_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_consts() {
        let config = ChainConfig::default();
        assert_eq!(config.checkpoint_interval, DEFAULT_CHECKPOINT_INTERVAL);
        assert_eq!(config.state_cache_capacity, DEFAULT_STATE_CACHE_CAPACITY);
        assert_eq!(config.state_cache_ttl_secs, DEFAULT_STATE_CACHE_TTL_SECS);
    }

    #[test]
    fn custom_clamps_zero_interval() {
        let config = ChainConfig::custom(0, 16, 60);
        assert_eq!(config.checkpoint_interval, 1);
    }

    #[test]
    fn replay_only_disables_the_cache() {
        let config = ChainConfig::replay_only();
        assert_eq!(config.state_cache_capacity, 0);
    }
}
