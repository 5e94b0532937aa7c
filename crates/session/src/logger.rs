// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session-owned log channel.
//!
//! Distinct from the `tracing` diagnostics: this is the user-facing log the
//! session writes bring-up, channel, and error messages to, with a
//! severity filter and optional size-based rotation. A logger is either
//! created from [`LoggerConfig`] (owned by the session) or injected by the
//! user (shared, not owned).

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use chrono::Utc;
use parking_lot::Mutex;

use tl_config::{LoggerConfig, LoggerType};
use tl_core::{SessionError, Severity};

enum SinkKind {
    Stdout,
    File {
        base: PathBuf,
        file: File,
        written: u64,
        max_size: u64,
        max_files: u32,
        next_index: u32,
    },
}

struct Sink {
    kind: SinkKind,
}

/// Severity-filtered log sink.
pub struct SessionLogger {
    min_severity: Severity,
    include_date: bool,
    sink: Mutex<Sink>,
}

impl SessionLogger {
    /// Logger writing to standard output.
    pub fn stdout(min_severity: Severity) -> Self {
        Self {
            min_severity,
            include_date: false,
            sink: Mutex::new(Sink {
                kind: SinkKind::Stdout,
            }),
        }
    }

    /// Build the logger described by `config`. File loggers append to
    /// `<file_name>.log`; failure to open it is an inaccessible-log-file
    /// error.
    pub fn from_config(config: &LoggerConfig) -> Result<Self, SessionError> {
        let kind = match config.logger_type {
            LoggerType::Stdout => SinkKind::Stdout,
            LoggerType::File => {
                let base = PathBuf::from(format!("{}.log", config.file_name));
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&base)
                    .map_err(|e| SessionError::InaccessibleLogFile {
                        filename: base.clone(),
                        text: e.to_string(),
                    })?;
                let written = file.metadata().map(|m| m.len()).unwrap_or(0);
                SinkKind::File {
                    base,
                    file,
                    written,
                    max_size: u64::from(config.max_file_size),
                    max_files: config.max_file_number,
                    next_index: 1,
                }
            }
        };
        Ok(Self {
            min_severity: config.min_severity,
            include_date: config.include_date,
            sink: Mutex::new(Sink { kind }),
        })
    }

    /// Whether a message at `severity` would be written.
    pub fn enabled(&self, severity: Severity) -> bool {
        severity != Severity::NoLogMsg
            && self.min_severity != Severity::NoLogMsg
            && severity >= self.min_severity
    }

    /// Write one message attributed to `instance`.
    pub fn log(&self, instance: &str, severity: Severity, text: &str) {
        if !self.enabled(severity) {
            return;
        }
        let now = Utc::now();
        let stamp = if self.include_date {
            now.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
        } else {
            now.format("%H:%M:%S%.3f").to_string()
        };
        let line = format!("{stamp} [{severity}] {instance}: {text}\n");

        let mut sink = self.sink.lock();
        match &mut sink.kind {
            SinkKind::Stdout => {
                print!("{line}");
            }
            SinkKind::File {
                base,
                file,
                written,
                max_size,
                max_files,
                next_index,
            } => {
                if *max_size > 0 && *written + line.len() as u64 > *max_size {
                    let index = *next_index;
                    let keep = (*max_files).max(1);
                    let rotated = base.with_extension(format!("{index}.log"));
                    let _ = file.flush();
                    let _ = std::fs::rename(&*base, &rotated);
                    *next_index = if index >= keep { 1 } else { index + 1 };
                    if let Ok(fresh) = OpenOptions::new().create(true).append(true).open(&*base) {
                        *file = fresh;
                        *written = 0;
                    }
                }
                if file.write_all(line.as_bytes()).is_ok() {
                    *written += line.len() as u64;
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "logger_tests.rs"]
mod tests;
