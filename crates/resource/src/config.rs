//! Keeper configuration loaded from environment variables.

use std::num::NonZeroUsize;
use std::time::Duration;

pub const CACHE_SIZE_ENV: &str = "TXCORE_BRANCH_STATUS_CACHE_SIZE";
pub const CACHE_IDLE_SECS_ENV: &str = "TXCORE_BRANCH_STATUS_CACHE_IDLE_SECS";

const DEFAULT_CACHE_SIZE: NonZeroUsize = NonZeroUsize::new(1024).unwrap();
const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Branch status cache configuration.
///
/// Reads from environment variables:
/// - `TXCORE_BRANCH_STATUS_CACHE_SIZE`: maximum entries (default: `1024`)
/// - `TXCORE_BRANCH_STATUS_CACHE_IDLE_SECS`: idle expiry in seconds (default: `600`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeeperConfig {
    pub cache_size: NonZeroUsize,
    pub idle_timeout: Duration,
}

impl KeeperConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let cache_size = std::env::var(CACHE_SIZE_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<NonZeroUsize>().ok())
            .unwrap_or(DEFAULT_CACHE_SIZE);
        let idle_timeout = std::env::var(CACHE_IDLE_SECS_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_IDLE_TIMEOUT);
        Self {
            cache_size,
            idle_timeout,
        }
    }
}

impl Default for KeeperConfig {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
        }
    }
}
