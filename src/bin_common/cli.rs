//! CLI utilities for binaries
//!
//! Handles the configuration path and arguments for the binary executables.

use std::path::PathBuf;

/// Environment variable overriding the configuration path
pub const CONFIG_PATH_ENV_VAR: &str = "GREMLIN_CONFIG_PATH";

/// Configuration path used when the variable is unset
pub const DEFAULT_CONFIG_PATH: &str = "config/gremlin.yaml";

/// Load configuration path from environment or use default
///
/// # Examples
/// ```
/// use gremlin_client::bin_common::load_config_from_env;
///
/// let path = load_config_from_env();
/// ```
pub fn load_config_from_env() -> PathBuf {
    std::env::var(CONFIG_PATH_ENV_VAR)
        .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
        .into()
}

/// Parse command line arguments for a binary
///
/// Returns a vector of arguments (excluding the program name)
pub fn parse_args() -> Vec<String> {
    std::env::args().skip(1).collect()
}
