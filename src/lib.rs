//! cursorlog - resumable log tailing with durable per-file read cursors.
//!
//! A [`CursorLog`] session loads a JSON state file mapping absolute paths to
//! byte offsets. [`CursorLog::open`] returns a [`Tailer`] positioned where the
//! previous run stopped; closing the tailer commits its position and closing
//! the session writes every committed position back to disk atomically.
//!
//! ```no_run
//! use std::io::Read;
//!
//! # fn main() -> cursorlog::Result<()> {
//! let log = cursorlog::CursorLog::new(".cursorlog.json")?;
//! let mut tailer = log.open("/var/log/app.log")?;
//! let mut new_data = String::new();
//! tailer
//!     .read_to_string(&mut new_data)
//!     .map_err(|e| cursorlog::AppError::io("read failed", e))?;
//! tailer.close()?;
//! log.close()?;
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::{CursorLog, Tailer};
pub use domain::{AppError, Result};
pub use infrastructure::CursorStore;
