//! Purpose: Execute a free-form SQL script line by line with fault isolation.
//! Exports: `RunnerOptions`, `RunReport`, `CancelFlag`, `spawn_stdin_cancel`, `run_script`.
//! Role: The resumable replay loop: per-statement commit, append-only OK/KO
//! logs, and a residual script of failed statements for the next run.
//! Invariants: Cancellation is checked between statements only; in-flight
//! statements are never interrupted.
//! Invariants: No line is silently dropped: every input line ends up in the
//! OK log, the KO log + residual, or (after cancellation) the residual.

use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{info, warn};

use crate::config::RunnerConfig;
use crate::core::error::{Error, ErrorKind};
use crate::core::script::{LineKind, classify_line, strip_trailing_semicolon};
use crate::core::text::TextEncoding;
use crate::db::Database;

#[derive(Clone, Debug)]
pub struct RunnerOptions {
    pub strip_semicolon: bool,
    pub encoding: TextEncoding,
    pub ok_log: PathBuf,
    pub ko_log: PathBuf,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            strip_semicolon: true,
            encoding: TextEncoding::Utf8,
            ok_log: PathBuf::from("OK.SQL"),
            ko_log: PathBuf::from("KO.SQL"),
        }
    }
}

impl RunnerOptions {
    pub fn from_config(config: &RunnerConfig) -> Self {
        Self {
            strip_semicolon: config.strip_semicolon,
            encoding: config.encoding,
            ..Self::default()
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RunReport {
    pub comments: u64,
    pub executed: u64,
    pub failed: u64,
    pub cancelled: bool,
}

/// Cooperative cancellation: written once by a listener, read between
/// statements by the replay loop.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Listener task: one read on stdin (ENTER) requests termination.
pub fn spawn_stdin_cancel(flag: CancelFlag) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut byte = [0u8; 1];
        let _ = std::io::stdin().read(&mut byte);
        flag.cancel();
    })
}

/// Run `script` one statement at a time. Successes land in the OK log,
/// failures in the KO log; afterwards the script file is rewritten to hold
/// only the residual lines (failed statements plus, after cancellation,
/// everything not yet attempted), so repeated runs converge.
pub fn run_script<D: Database + ?Sized>(
    db: &mut D,
    script: &Path,
    options: &RunnerOptions,
    cancel: &CancelFlag,
) -> Result<RunReport, Error> {
    let bytes = fs::read(script).map_err(|err| {
        let kind = if err.kind() == std::io::ErrorKind::NotFound {
            ErrorKind::NotFound
        } else {
            ErrorKind::Io
        };
        Error::new(kind)
            .with_message("script file is not readable")
            .with_path(script)
            .with_source(err)
    })?;
    let lines: Vec<String> = options
        .encoding
        .decode(&bytes)?
        .lines()
        .map(str::to_string)
        .collect();

    // Stale KO content belongs to the previous run.
    if let Err(err) = fs::remove_file(&options.ko_log) {
        if err.kind() != std::io::ErrorKind::NotFound {
            return Err(Error::new(ErrorKind::Io)
                .with_path(&options.ko_log)
                .with_source(err));
        }
    }

    let mut report = RunReport::default();
    let mut residual: Vec<String> = Vec::new();
    let stamp = run_stamp();
    append_log(&options.ok_log, &format!("-- run {stamp}"), options.encoding)?;

    let mut attempted = 0usize;
    for line in &lines {
        if cancel.is_cancelled() {
            report.cancelled = true;
            break;
        }
        attempted += 1;

        let (kind, text) = classify_line(line);
        match kind {
            LineKind::Comment | LineKind::Empty => {
                append_log(&options.ok_log, line.trim(), options.encoding)?;
                report.comments += 1;
            }
            LineKind::Statement => {
                let statement = if options.strip_semicolon {
                    strip_trailing_semicolon(&text).to_string()
                } else {
                    text
                };
                if statement.is_empty() {
                    append_log(&options.ok_log, line.trim(), options.encoding)?;
                    report.comments += 1;
                    continue;
                }
                match execute_one(db, &statement) {
                    Ok(()) => {
                        append_log(&options.ok_log, line.trim(), options.encoding)?;
                        report.executed += 1;
                    }
                    Err(err) => {
                        warn!(%err, statement, "statement failed");
                        if !has_ko_header(&report) {
                            append_log(
                                &options.ko_log,
                                &format!("-- run {stamp}"),
                                options.encoding,
                            )?;
                        }
                        append_log(&options.ko_log, line.trim(), options.encoding)?;
                        report.failed += 1;
                        residual.push(line.clone());
                    }
                }
            }
        }
    }

    // Unattempted lines survive a cancelled run.
    residual.extend(lines.iter().skip(attempted).cloned());
    write_residual(script, &residual, options.encoding)?;

    info!(
        executed = report.executed,
        failed = report.failed,
        comments = report.comments,
        cancelled = report.cancelled,
        "script run finished"
    );
    Ok(report)
}

fn execute_one<D: Database + ?Sized>(db: &mut D, statement: &str) -> Result<(), Error> {
    db.execute(statement)?;
    db.commit()
}

fn has_ko_header(report: &RunReport) -> bool {
    report.failed > 0
}

fn run_stamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

fn append_log(path: &Path, line: &str, encoding: TextEncoding) -> Result<(), Error> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))?;
    let mut bytes = encoding.encode(line)?;
    bytes.push(b'\n');
    file.write_all(&bytes)
        .map_err(|err| Error::new(ErrorKind::Io).with_path(path).with_source(err))
}

fn write_residual(script: &Path, residual: &[String], encoding: TextEncoding) -> Result<(), Error> {
    let mut body = String::new();
    for line in residual {
        body.push_str(line);
        body.push('\n');
    }
    let bytes = encoding.encode(&body)?;
    fs::write(script, bytes)
        .map_err(|err| Error::new(ErrorKind::Io).with_path(script).with_source(err))
}
