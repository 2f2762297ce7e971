//! Line-oriented tailing over a cursor log session.
//!
//! Each file is read on its own scoped thread. Lines are written whole to a
//! shared output so lines from different files never interleave mid-line.

use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::domain::{AppError, Result, TailOutcome, TailSummary};

use super::cursor_log::CursorLog;

/// Options for a tail run.
#[derive(Debug, Clone, Copy, Default)]
pub struct TailOptions {
    /// Prefix each line with the path it came from.
    pub with_filename: bool,
}

/// Prints new lines from every file, committing each file's cursor as it finishes.
///
/// Failures are recorded per file and never stop the other files. The
/// session itself is left open; the caller decides when to persist it.
pub fn tail_files<W: Write + Send>(
    log: &CursorLog,
    files: &[PathBuf],
    options: TailOptions,
    out: &Mutex<W>,
) -> TailSummary {
    let outcomes = std::thread::scope(|s| {
        let handles: Vec<_> = files
            .iter()
            .map(|path| s.spawn(move || tail_one(log, path, options, out)))
            .collect();

        handles
            .into_iter()
            .zip(files)
            .map(|(handle, path)| {
                handle.join().unwrap_or_else(|_| {
                    TailOutcome::failed(
                        path.clone(),
                        AppError::Io {
                            message: format!("Tail thread for {} panicked", path.display()),
                            source: None,
                        },
                    )
                })
            })
            .collect()
    });

    TailSummary { outcomes }
}

fn tail_one<W: Write>(
    log: &CursorLog,
    path: &Path,
    options: TailOptions,
    out: &Mutex<W>,
) -> TailOutcome {
    let mut tailer = match log.open(path) {
        Ok(tailer) => tailer,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping file");
            return TailOutcome::failed(path.to_path_buf(), e);
        }
    };

    let prefix = options
        .with_filename
        .then(|| format!("{}: ", path.display()));

    let mut outcome = TailOutcome {
        path: path.to_path_buf(),
        start_offset: tailer.start_offset(),
        end_offset: tailer.start_offset(),
        lines: 0,
        bytes: 0,
        error: None,
    };

    if let Err(e) = copy_lines(&mut tailer, prefix.as_deref(), out, &mut outcome) {
        tracing::warn!(path = %path.display(), error = %e, "Tailing stopped early");
        outcome.error = Some(e);
    }

    if let Err(e) = tailer.close() {
        outcome.error.get_or_insert(e);
    }
    outcome.end_offset = tailer.offset();

    tracing::debug!(
        path = %path.display(),
        from = outcome.start_offset,
        to = outcome.end_offset,
        lines = outcome.lines,
        "Finished file"
    );

    outcome
}

/// Copies lines from `source` to `out`.
///
/// On error, bytes read from `source` but never emitted are given back with a
/// relative seek, so `source` ends up just past the last printed line.
fn copy_lines<R: Read + Seek, W: Write>(
    source: &mut R,
    prefix: Option<&str>,
    out: &Mutex<W>,
    outcome: &mut TailOutcome,
) -> Result<()> {
    let mut reader = BufReader::new(&mut *source);
    let mut line = Vec::new();

    let result = loop {
        line.clear();
        match reader.read_until(b'\n', &mut line) {
            Ok(0) => break Ok(()),
            Ok(n) => {
                if let Err(e) = emit_line(out, prefix, &line) {
                    // The line is lost to the consumer; hand it back too.
                    let pending = reader.buffer().len() + n;
                    break Err((e, pending));
                }
                outcome.lines += 1;
                outcome.bytes += n as u64;
            }
            Err(e) => {
                // `read_until` may have moved part of a line into `line` already.
                let pending = reader.buffer().len() + line.len();
                break Err((AppError::io("Failed to read line", e), pending));
            }
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err((err, pending)) => {
            drop(reader);
            if pending > 0 {
                let back = i64::try_from(pending).unwrap_or(i64::MAX);
                if let Err(e) = source.seek(SeekFrom::Current(-back)) {
                    tracing::warn!(error = %e, "Could not rewind unread bytes");
                }
            }
            Err(err)
        }
    }
}

fn emit_line<W: Write>(out: &Mutex<W>, prefix: Option<&str>, line: &[u8]) -> Result<()> {
    let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
    write_line(&mut *out, prefix, line).map_err(|e| AppError::io("Failed to write output", e))
}

fn write_line<W: Write>(out: &mut W, prefix: Option<&str>, line: &[u8]) -> std::io::Result<()> {
    if let Some(prefix) = prefix {
        out.write_all(prefix.as_bytes())?;
    }
    out.write_all(line)?;
    if !line.ends_with(b"\n") {
        out.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io;
    use tempfile::tempdir;

    fn output(out: Mutex<Vec<u8>>) -> String {
        String::from_utf8(out.into_inner().unwrap()).unwrap()
    }

    #[test]
    fn test_tails_new_lines_across_runs() {
        let dir = tempdir().unwrap();
        let state = dir.path().join("state.json");
        let file = dir.path().join("app.log");
        fs::write(&file, "one\ntwo\n").unwrap();

        let log = CursorLog::new(&state).unwrap();
        let out = Mutex::new(Vec::new());
        let summary = tail_files(&log, &[file.clone()], TailOptions::default(), &out);
        log.close().unwrap();

        assert_eq!(output(out), "one\ntwo\n");
        assert_eq!(summary.total_lines(), 2);
        assert_eq!(summary.outcomes[0].end_offset, 8);

        fs::write(&file, "one\ntwo\nthree\n").unwrap();
        let log = CursorLog::new(&state).unwrap();
        let out = Mutex::new(Vec::new());
        let summary = tail_files(&log, &[file], TailOptions::default(), &out);

        assert_eq!(output(out), "three\n");
        assert_eq!(summary.outcomes[0].start_offset, 8);
        assert_eq!(summary.outcomes[0].bytes, 6);
    }

    #[test]
    fn test_final_line_without_newline() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("app.log");
        fs::write(&file, "a\npartial").unwrap();

        let log = CursorLog::new(dir.path().join("state.json")).unwrap();
        let out = Mutex::new(Vec::new());
        let summary = tail_files(&log, &[file], TailOptions::default(), &out);

        assert_eq!(output(out), "a\npartial\n");
        assert_eq!(summary.outcomes[0].end_offset, 9);
        assert_eq!(summary.outcomes[0].bytes, 9);
    }

    #[test]
    fn test_missing_file_does_not_stop_others() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.log");
        let missing = dir.path().join("missing.log");
        fs::write(&good, "ok\n").unwrap();

        let log = CursorLog::new(dir.path().join("state.json")).unwrap();
        let out = Mutex::new(Vec::new());
        let summary = tail_files(
            &log,
            &[missing.clone(), good],
            TailOptions::default(),
            &out,
        );

        assert_eq!(output(out), "ok\n");
        assert!(summary.has_failures());
        let failed: Vec<_> = summary.failures().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].path, missing);
        assert!(matches!(failed[0].error, Some(AppError::Open { .. })));
    }

    #[test]
    fn test_with_filename_prefix() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("app.log");
        fs::write(&file, "hello\n").unwrap();

        let log = CursorLog::new(dir.path().join("state.json")).unwrap();
        let out = Mutex::new(Vec::new());
        tail_files(
            &log,
            &[file.clone()],
            TailOptions {
                with_filename: true,
            },
            &out,
        );

        assert_eq!(output(out), format!("{}: hello\n", file.display()));
    }

    #[test]
    fn test_many_files_in_parallel() {
        let dir = tempdir().unwrap();
        let files: Vec<_> = (0..6)
            .map(|i| {
                let path = dir.path().join(format!("{i}.log"));
                fs::write(&path, format!("{i}-a\n{i}-b\n")).unwrap();
                path
            })
            .collect();

        let log = CursorLog::new(dir.path().join("state.json")).unwrap();
        let out = Mutex::new(Vec::new());
        let summary = tail_files(&log, &files, TailOptions::default(), &out);

        let text = output(out);
        assert_eq!(text.lines().count(), 12);
        for i in 0..6 {
            assert!(text.contains(&format!("{i}-a\n")));
        }
        assert_eq!(summary.total_lines(), 12);
        assert!(log.cursors().iter().all(|c| c.offset == 8));
    }

    struct FailingWriter {
        accepted: usize,
        limit: usize,
    }

    impl Write for FailingWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.accepted >= self.limit {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
            }
            self.accepted += 1;
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Serves `data` but fails every read at or past `fail_at`.
    struct FailingReader {
        inner: io::Cursor<Vec<u8>>,
        fail_at: u64,
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let pos = self.inner.position();
            if pos >= self.fail_at {
                return Err(io::Error::other("device error"));
            }
            let allowed = usize::try_from(self.fail_at - pos).unwrap().min(buf.len());
            self.inner.read(&mut buf[..allowed])
        }
    }

    impl Seek for FailingReader {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    fn empty_outcome() -> TailOutcome {
        TailOutcome {
            path: PathBuf::from("app.log"),
            start_offset: 0,
            end_offset: 0,
            lines: 0,
            bytes: 0,
            error: None,
        }
    }

    #[test]
    fn test_read_failure_mid_line_rewinds_partial_line() {
        let mut source = FailingReader {
            inner: io::Cursor::new(b"one\npartial-line\n".to_vec()),
            fail_at: 8,
        };
        let out = Mutex::new(Vec::new());
        let mut outcome = empty_outcome();

        let result = copy_lines(&mut source, None, &out, &mut outcome);

        assert!(matches!(result, Err(AppError::Io { .. })));
        assert_eq!(outcome.lines, 1);
        assert_eq!(output(out), "one\n");
        assert_eq!(source.inner.position(), 4);
    }

    #[test]
    fn test_write_failure_commits_only_printed_lines() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("app.log");
        fs::write(&file, "one\ntwo\nthree\n").unwrap();

        let log = CursorLog::new(dir.path().join("state.json")).unwrap();
        // One write call per complete line; the second line fails.
        let out = Mutex::new(FailingWriter {
            accepted: 0,
            limit: 1,
        });
        let summary = tail_files(&log, &[file], TailOptions::default(), &out);

        let outcome = &summary.outcomes[0];
        assert!(outcome.error.is_some());
        assert_eq!(outcome.lines, 1);
        assert_eq!(outcome.end_offset, 4);
        assert_eq!(log.cursors()[0].offset, 4);
    }
}
