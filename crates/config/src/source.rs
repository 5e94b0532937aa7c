// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Layered configuration store.
//!
//! Values live in TOML trees and are addressed by `|`-separated node paths,
//! e.g. `ChannelGroup|ChannelList|A|Host`. The programmatic layer shadows
//! the file layer; per-call overrides are applied above both by the
//! resolver.

use thiserror::Error;
use toml::Value;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// File + programmatic configuration layers.
#[derive(Debug, Default, Clone)]
pub struct ConfigStore {
    file: Option<Value>,
    programmatic: Option<Value>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the file layer from TOML text.
    pub fn with_file_text(text: &str) -> Result<Self, SourceError> {
        Ok(Self {
            file: Some(text.parse::<Value>()?),
            programmatic: None,
        })
    }

    /// Install or replace the programmatic layer.
    pub fn set_programmatic(&mut self, value: Value) {
        self.programmatic = Some(value);
    }

    /// Install or replace the programmatic layer from TOML text.
    pub fn set_programmatic_text(&mut self, text: &str) -> Result<(), SourceError> {
        self.programmatic = Some(text.parse::<Value>()?);
        Ok(())
    }

    fn lookup<'a>(root: Option<&'a Value>, path: &str) -> Option<&'a Value> {
        let mut node = root?;
        for segment in path.split('|') {
            node = node.as_table()?.get(segment)?;
        }
        Some(node)
    }

    /// Raw value at `path`, programmatic layer first.
    pub fn get(&self, path: &str) -> Option<&Value> {
        Self::lookup(self.programmatic.as_ref(), path)
            .or_else(|| Self::lookup(self.file.as_ref(), path))
    }

    /// True when a node (of any type) exists at `path` in either layer.
    pub fn node_exists(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    pub fn get_str(&self, path: &str) -> Option<String> {
        self.get(path)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    /// Unsigned integer; negative values are treated as absent.
    pub fn get_u64(&self, path: &str) -> Option<u64> {
        self.get(path)
            .and_then(Value::as_integer)
            .and_then(|v| u64::try_from(v).ok())
    }

    pub fn get_i64(&self, path: &str) -> Option<i64> {
        self.get(path).and_then(Value::as_integer)
    }

    pub fn get_f64(&self, path: &str) -> Option<f64> {
        self.get(path).and_then(|v| match v {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        })
    }

    /// Boolean; integers are accepted with the zero/non-zero convention.
    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get(path).and_then(|v| match v {
            Value::Boolean(b) => Some(*b),
            Value::Integer(i) => Some(*i != 0),
            _ => None,
        })
    }
}

#[cfg(test)]
#[path = "source_tests.rs"]
mod tests;
