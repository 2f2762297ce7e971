//! Infrastructure layer - filesystem adapters.
//!
//! This layer handles all I/O against the state file, the config file
//! and path resolution.

pub mod config;
pub mod cursor_store;
pub mod paths;

pub use config::{ensure_config_exists, load_config, load_config_from_file, render_config};
pub use cursor_store::CursorStore;
pub use paths::resolve_tracked_path;
