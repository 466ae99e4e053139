// This file is part of the product Flashdeck.
// SPDX-FileCopyrightText: 2025-2026 Zivatar Limited
// SPDX-License-Identifier: AGPL-3.0-or-later
// The code and documentation in this repository is licensed under the GNU Affero General Public License v3.0 or later (AGPL-3.0-or-later). See LICENSE.

use crate::db::StoreError;
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct CachedCount {
    value: u64,
    computed_at: Instant,
}

/// Process-wide memoized total card count.
///
/// Card creation does not invalidate the entry; staleness is bounded by the
/// TTL alone. A count of zero is cached like any other value, since an empty
/// catalog gains nothing from recomputing on every request.
pub struct CardCountCache {
    slot: RwLock<Option<CachedCount>>,
    ttl: Duration,
}

impl CardCountCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
        }
    }

    pub fn get_or_compute<F>(&self, compute: F) -> Result<u64, StoreError>
    where
        F: FnOnce() -> Result<u64, StoreError>,
    {
        let now = Instant::now();
        if let Some(value) = self.read_fresh(now) {
            return Ok(value);
        }

        let value = compute()?;
        let mut slot = match self.slot.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Card count cache lock poisoned on write; recovering");
                poisoned.into_inner()
            }
        };
        *slot = Some(CachedCount {
            value,
            computed_at: now,
        });
        Ok(value)
    }

    pub fn invalidate(&self) {
        let mut slot = match self.slot.write() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Card count cache lock poisoned on invalidate; recovering");
                poisoned.into_inner()
            }
        };
        *slot = None;
    }

    fn read_fresh(&self, now: Instant) -> Option<u64> {
        let slot = match self.slot.read() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::error!("Card count cache lock poisoned on read; recovering");
                poisoned.into_inner()
            }
        };
        let cached = (*slot)?;
        if now.duration_since(cached.computed_at) < self.ttl {
            Some(cached.value)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn second_read_skips_recomputation() {
        let cache = CardCountCache::new(Duration::from_secs(60));
        let calls = AtomicU32::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(42)
        };

        assert_eq!(cache.get_or_compute(compute).unwrap(), 42);
        // Stale closure result would differ; the cached value wins.
        assert_eq!(cache.get_or_compute(|| Ok(99)).unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_count_is_cached_too() {
        let cache = CardCountCache::new(Duration::from_secs(60));
        assert_eq!(cache.get_or_compute(|| Ok(0)).unwrap(), 0);
        assert_eq!(cache.get_or_compute(|| Ok(7)).unwrap(), 0);
    }

    #[test]
    fn zero_ttl_always_recomputes() {
        let cache = CardCountCache::new(Duration::ZERO);
        assert_eq!(cache.get_or_compute(|| Ok(1)).unwrap(), 1);
        assert_eq!(cache.get_or_compute(|| Ok(2)).unwrap(), 2);
    }

    #[test]
    fn invalidate_forces_recomputation() {
        let cache = CardCountCache::new(Duration::from_secs(60));
        assert_eq!(cache.get_or_compute(|| Ok(5)).unwrap(), 5);
        cache.invalidate();
        assert_eq!(cache.get_or_compute(|| Ok(6)).unwrap(), 6);
    }

    #[test]
    fn compute_errors_leave_cache_empty() {
        let cache = CardCountCache::new(Duration::from_secs(60));
        let result = cache.get_or_compute(|| Err(StoreError::NotFound));
        assert!(result.is_err());
        assert_eq!(cache.get_or_compute(|| Ok(3)).unwrap(), 3);
    }
}
