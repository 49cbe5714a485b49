//! Cache configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

pub const DEFAULT_DELIVERY_QUEUE_CAPACITY: usize = 1024;
pub const DEFAULT_LOG_DROPPED_PAYLOADS: bool = true;

/// Tuning knobs for the cache and its delivery queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Bounded capacity of the inbound delivery queue.
    pub delivery_queue_capacity: usize,
    /// Log dropped malformed payloads at warn level (debug otherwise).
    pub log_dropped_payloads: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            delivery_queue_capacity: DEFAULT_DELIVERY_QUEUE_CAPACITY,
            log_dropped_payloads: DEFAULT_LOG_DROPPED_PAYLOADS,
        }
    }
}

impl CacheConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `WHITEBOARD_DELIVERY_QUEUE_CAPACITY`: default 1024
    /// - `WHITEBOARD_LOG_DROPPED_PAYLOADS`: `true` (default) or `false`
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary key lookup. Unparseable values fall
    /// back to their defaults.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            delivery_queue_capacity: parse_or(
                lookup("WHITEBOARD_DELIVERY_QUEUE_CAPACITY"),
                DEFAULT_DELIVERY_QUEUE_CAPACITY,
            ),
            log_dropped_payloads: parse_or(
                lookup("WHITEBOARD_LOG_DROPPED_PAYLOADS"),
                DEFAULT_LOG_DROPPED_PAYLOADS,
            ),
        }
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    raw.and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
