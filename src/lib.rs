//! Gremlin client - main library
//!
//! ## Architecture
//!
//! - **gremsocket**: WebSocket session layer (re-exported from workspace)
//! - **gremlin_api**: graph types, query builder and request envelopes
//! - **bin_common**: shared utilities for binaries (CLI, config, logging)
//!
//! ## Usage in Binaries
//!
//! ```rust,ignore
//! use gremlin_client::bin_common::{load_config_from_env, GremlinConfig};
//! use gremlin_client::gremsocket::WebSocketSession;
//! ```

// Re-export workspace libraries for convenience
pub use gremlin_api;
pub use gremsocket;

// Binary common utilities
pub mod bin_common {
    //! Common utilities for binary executables

    pub mod cli;
    pub mod config;
    pub mod logging;

    pub use cli::{load_config_from_env, parse_args, CONFIG_PATH_ENV_VAR, DEFAULT_CONFIG_PATH};
    pub use config::{ConfigError, GremlinConfig, HeartbeatSettings, SessionSettings};
    pub use logging::{init_tracing, init_tracing_with_level};
}
