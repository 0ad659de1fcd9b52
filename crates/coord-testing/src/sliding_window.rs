//! A pure, in-process model of the sliding-window counting performed by
//! `coord-ratelimit`'s `ACQUIRE` Lua script, for property-testing window
//! exactness and partition independence without a live Redis.
//!
//! The script evicts everything older than `now - window` via
//! `ZREMRANGEBYSCORE` before counting via `ZCOUNT`, then adds the new entry
//! via `ZADD` only if the post-eviction count is still under `max`. This
//! model reproduces exactly that order of operations.

use std::collections::HashMap;

/// One axis's sorted-set-backed window, modeled as a plain `Vec` of scores.
#[derive(Debug, Default, Clone)]
pub struct SlidingWindow {
    window_ns: u128,
    max: u64,
    entries: Vec<u128>,
}

impl SlidingWindow {
    pub fn new(window_ns: u128, max: u64) -> Self {
        Self {
            window_ns,
            max,
            entries: Vec::new(),
        }
    }

    fn evict(&mut self, now_ns: u128) {
        let cutoff = now_ns.saturating_sub(self.window_ns);
        self.entries.retain(|&score| score >= cutoff);
    }

    /// Attempt to record one event at `now_ns`. Evicts stale entries first,
    /// same as the script. Returns the count after insertion, or `Err(count)`
    /// with the pre-insertion count if the axis is already at its max.
    pub fn record(&mut self, now_ns: u128) -> Result<u64, u64> {
        self.evict(now_ns);
        let count = self.entries.len() as u64;
        if self.max > 0 && count >= self.max {
            return Err(count);
        }
        self.entries.push(now_ns);
        Ok(count + 1)
    }

    pub fn count(&mut self, now_ns: u128) -> u64 {
        self.evict(now_ns);
        self.entries.len() as u64
    }
}

/// Independent [`SlidingWindow`]s keyed by partition, mirroring the
/// `"<base>::<partition>::tps"`-style key derivation in `RateLimiter::keys`.
#[derive(Debug, Default)]
pub struct PartitionedWindow {
    window_ns: u128,
    max: u64,
    partitions: HashMap<String, SlidingWindow>,
}

impl PartitionedWindow {
    pub fn new(window_ns: u128, max: u64) -> Self {
        Self {
            window_ns,
            max,
            partitions: HashMap::new(),
        }
    }

    pub fn record(&mut self, partition: &str, now_ns: u128) -> Result<u64, u64> {
        self.partitions
            .entry(partition.to_string())
            .or_insert_with(|| SlidingWindow::new(self.window_ns, self.max))
            .record(now_ns)
    }

    pub fn count(&mut self, partition: &str, now_ns: u128) -> u64 {
        self.partitions
            .entry(partition.to_string())
            .or_insert_with(|| SlidingWindow::new(self.window_ns, self.max))
            .count(now_ns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_never_exceeds_max_within_window() {
        let mut window = SlidingWindow::new(1000, 3);
        assert_eq!(window.record(0), Ok(1));
        assert_eq!(window.record(100), Ok(2));
        assert_eq!(window.record(200), Ok(3));
        assert_eq!(window.record(300), Err(3));
    }

    #[test]
    fn test_eviction_frees_capacity() {
        let mut window = SlidingWindow::new(1000, 2);
        assert_eq!(window.record(0), Ok(1));
        assert_eq!(window.record(100), Ok(2));
        assert_eq!(window.record(200), Err(2));
        // past the window relative to entry at t=0 and t=100
        assert_eq!(window.record(1101), Ok(1));
    }

    #[test]
    fn test_zero_max_means_unbounded() {
        let mut window = SlidingWindow::new(1000, 0);
        for t in 0..50 {
            assert!(window.record(t * 10).is_ok());
        }
    }

    #[test]
    fn test_partition_independence() {
        let mut windows = PartitionedWindow::new(1000, 1);
        assert_eq!(windows.record("a", 0), Ok(1));
        assert_eq!(windows.record("a", 10), Err(1));
        assert_eq!(windows.record("b", 10), Ok(1));
    }

    proptest! {
        #[test]
        fn prop_count_never_exceeds_max(
            max in 1u64..20,
            window_ns in 100u128..10_000,
            timestamps in prop::collection::vec(0u128..100_000, 1..200),
        ) {
            let mut window = SlidingWindow::new(window_ns, max);
            for &t in &timestamps {
                let _ = window.record(t);
                let live = window.count(t);
                prop_assert!(live <= max);
            }
        }

        #[test]
        fn prop_entries_outside_window_are_not_counted(
            window_ns in 100u128..10_000,
            gap in 0u128..50_000,
        ) {
            let mut window = SlidingWindow::new(window_ns, 1_000_000);
            window.record(0).unwrap();
            let now = window_ns.saturating_add(gap).saturating_add(1);
            let count = window.count(now);
            if gap > 0 {
                prop_assert_eq!(count, 0);
            }
        }

        #[test]
        fn prop_partitions_do_not_share_capacity(
            max in 1u64..10,
            events_a in 1usize..30,
            events_b in 1usize..30,
        ) {
            let mut windows = PartitionedWindow::new(1_000_000_000, max);
            let mut accepted_a = 0u64;
            for i in 0..events_a {
                if windows.record("a", i as u128).is_ok() {
                    accepted_a += 1;
                }
            }
            let mut accepted_b = 0u64;
            for i in 0..events_b {
                if windows.record("b", i as u128).is_ok() {
                    accepted_b += 1;
                }
            }
            prop_assert!(accepted_a <= max);
            prop_assert!(accepted_b <= max);
        }
    }
}
