//! Cache configuration.

use std::num::NonZeroUsize;
use std::time::Duration;

use serde::Deserialize;

const DEFAULT_TTL_SECONDS: u64 = 20;
const DEFAULT_ENTRY_LIMIT: usize = 50;

/// When the feed cache is flushed ahead of its TTL.
///
/// The default mirrors the observed behavior: post creation flushes
/// eagerly while deletion rides out the TTL window. `TtlOnly` never
/// flushes; `Both` flushes on create and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InvalidationPolicy {
    ProactiveOnWrite,
    TtlOnly,
    Both,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Enable the feed response cache.
    pub enabled: bool,
    /// Seconds a populated entry stays fresh.
    pub ttl_seconds: u64,
    /// Flush policy applied to post writes.
    pub policy: InvalidationPolicy,
    /// Key cached responses by page number instead of one shared key.
    /// Off by default: all pages share a single TTL window.
    pub key_by_page: bool,
    /// Maximum cached entries (only above one when `key_by_page` is set).
    pub entry_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            policy: InvalidationPolicy::ProactiveOnWrite,
            key_by_page: false,
            entry_limit: DEFAULT_ENTRY_LIMIT,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    pub fn flush_on_create(&self) -> bool {
        matches!(
            self.policy,
            InvalidationPolicy::ProactiveOnWrite | InvalidationPolicy::Both
        )
    }

    pub fn flush_on_delete(&self) -> bool {
        matches!(self.policy, InvalidationPolicy::Both)
    }

    /// Returns the entry limit as NonZeroUsize, clamping to 1 if zero.
    pub fn entry_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.entry_limit).unwrap_or(NonZeroUsize::MIN)
    }
}
