//! Router configuration loaded from environment variables.

/// Environment variable holding the virtual node count.
pub const VIRTUAL_NODES_ENV: &str = "TXCORE_LOAD_BALANCE_VIRTUAL_NODES";

/// Ring positions per node when nothing is configured.
pub const VIRTUAL_NODES_DEFAULT: usize = 10;

/// Consistent-hash router configuration.
///
/// Reads from environment variables:
/// - `TXCORE_LOAD_BALANCE_VIRTUAL_NODES`: ring positions per node (default: `10`)
///
/// The value is read once, when the router is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    pub virtual_nodes: usize,
}

impl RouterConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    ///
    /// Zero or unparsable values fall back to the default.
    pub fn from_env() -> Self {
        let virtual_nodes = std::env::var(VIRTUAL_NODES_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(VIRTUAL_NODES_DEFAULT);
        Self { virtual_nodes }
    }

    pub fn with_virtual_nodes(virtual_nodes: usize) -> Self {
        Self {
            virtual_nodes: virtual_nodes.max(1),
        }
    }
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            virtual_nodes: VIRTUAL_NODES_DEFAULT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_values() {
        assert_eq!(RouterConfig::default().virtual_nodes, 10);
    }

    #[test]
    #[serial]
    fn test_from_env_reads_value() {
        // SAFETY: serialized with every other test touching this variable.
        unsafe { std::env::set_var(VIRTUAL_NODES_ENV, "64") };
        assert_eq!(RouterConfig::from_env().virtual_nodes, 64);
        unsafe { std::env::remove_var(VIRTUAL_NODES_ENV) };
    }

    #[test]
    #[serial]
    fn test_from_env_falls_back_on_garbage() {
        unsafe { std::env::set_var(VIRTUAL_NODES_ENV, "lots") };
        assert_eq!(RouterConfig::from_env(), RouterConfig::default());

        unsafe { std::env::set_var(VIRTUAL_NODES_ENV, "0") };
        assert_eq!(RouterConfig::from_env(), RouterConfig::default());

        unsafe { std::env::remove_var(VIRTUAL_NODES_ENV) };
        assert_eq!(RouterConfig::from_env(), RouterConfig::default());
    }

    #[test]
    fn test_with_virtual_nodes_clamps_zero() {
        assert_eq!(RouterConfig::with_virtual_nodes(0).virtual_nodes, 1);
    }
}
