// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error families surfaced to users of the session runtime.
//!
//! Every error reaches the user exactly once: either returned from the
//! entry point that observed it, or delivered through one typed method of
//! a registered error client. The session's error router picks the path.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Discriminating code attached to invalid-usage errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    None,
    InternalError,
    InvalidArgument,
    InvalidOperation,
    LoginRequestTimeout,
    LoginRequestRejected,
    DirectoryRequestTimeout,
    DictionaryRequestTimeout,
    UnsupportedChannelType,
    /// Failure code reported by the reactor library, passed through.
    ReactorFailure(i32),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::InternalError => f.write_str("InternalError"),
            Self::InvalidArgument => f.write_str("InvalidArgument"),
            Self::InvalidOperation => f.write_str("InvalidOperation"),
            Self::LoginRequestTimeout => f.write_str("LoginRequestTimeout"),
            Self::LoginRequestRejected => f.write_str("LoginRequestRejected"),
            Self::DirectoryRequestTimeout => f.write_str("DirectoryRequestTimeout"),
            Self::DictionaryRequestTimeout => f.write_str("DictionaryRequestTimeout"),
            Self::UnsupportedChannelType => f.write_str("UnsupportedChannelType"),
            Self::ReactorFailure(code) => write!(f, "ReactorFailure({code})"),
        }
    }
}

/// Errors produced by the session runtime.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("{text}")]
    InvalidUsage { text: String, code: ErrorCode },

    #[error("invalid handle {handle}: {text}")]
    InvalidHandle { handle: u64, text: String },

    #[error("memory exhaustion: {0}")]
    MemoryExhaustion(String),

    #[error("json converter error (code {code}): {text}")]
    JsonConverter {
        text: String,
        code: i32,
        /// Reactor channel the conversion failed on, when known.
        channel: Option<u64>,
        /// Set when the error was observed on a provider-side session.
        provider: bool,
    },

    #[error("system error {code} in {origin}: {text}")]
    System {
        code: i64,
        /// Name of the failing call, in place of the raw address the
        /// underlying library would report.
        origin: String,
        text: String,
    },

    #[error("inaccessible log file {}: {text}", filename.display())]
    InaccessibleLogFile { filename: PathBuf, text: String },
}

impl SessionError {
    pub fn invalid_usage(text: impl Into<String>, code: ErrorCode) -> Self {
        Self::InvalidUsage {
            text: text.into(),
            code,
        }
    }

    pub fn invalid_handle(handle: u64, text: impl Into<String>) -> Self {
        Self::InvalidHandle {
            handle,
            text: text.into(),
        }
    }

    /// The invalid-usage code, when this error carries one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::InvalidUsage { code, .. } => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
