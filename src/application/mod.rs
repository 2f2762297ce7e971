//! Application layer - sessions, read handles and use cases.
//!
//! This layer binds tracked files to the cursor store and drives
//! line-oriented tailing on top of it.

pub mod cursor_log;
pub mod formatter;
pub mod tail_service;
pub mod tailer;

pub use cursor_log::CursorLog;
pub use formatter::{format_cursors_json, format_cursors_table, format_tail_summary, OutputFormat};
pub use tail_service::{tail_files, TailOptions};
pub use tailer::Tailer;
