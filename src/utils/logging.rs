//! Structured log entries with redaction
//!
//! Entries collect key/value fields and are emitted as `tracing` events.
//! How a field is rendered depends on its key:
//! - key material is replaced by its length
//! - addresses keep their prefix and last four digits
//! - hashes are shortened
//!
//! Debug entries are only emitted when the caller's [`CodecConfig`] has
//! `trace` set.

use std::fmt;

pub use tracing::Level;

use crate::config::CodecConfig;

/// How a field value is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redaction {
    /// Printed as-is
    None,
    /// Never printed, only its length
    Secret,
    /// Prefix and last four digits
    Address,
    /// First five and last three bytes of hex
    Hash,
}

const SECRET_KEYS: &[&str] = &["private_key", "privatekey", "secret", "seed", "password", "signing_key", "key_hex"];
const ADDRESS_KEYS: &[&str] = &["address", "signer", "sender", "from", "recipient"];
const HASH_KEYS: &[&str] = &["hash", "digest"];

impl Redaction {
    /// Classify a field by its key
    pub fn for_key(key: &str) -> Self {
        let key = key.to_ascii_lowercase();
        let matches = |names: &[&str]| names.iter().any(|n| key.contains(n));

        if matches(SECRET_KEYS) {
            Redaction::Secret
        } else if matches(ADDRESS_KEYS) || key == "to" {
            Redaction::Address
        } else if matches(HASH_KEYS) {
            Redaction::Hash
        } else {
            Redaction::None
        }
    }

    pub fn apply(self, value: &str) -> String {
        let value = value.trim();
        match self {
            Redaction::None => value.to_string(),
            Redaction::Secret => secret(value),
            Redaction::Address => shorten(value, 6, 4).unwrap_or_else(|| secret(value)),
            Redaction::Hash => shorten(value, 10, 6).unwrap_or_else(|| value.to_string()),
        }
    }
}

fn secret(value: &str) -> String {
    match value.len() {
        0 => "[EMPTY]".to_string(),
        1..=4 => "[REDACTED]".to_string(),
        len => format!("[REDACTED:{len}chars]"),
    }
}

/// Keep `head` digits after an optional `0x` and the last `tail` characters.
/// `None` when the value is too short to shorten.
fn shorten(value: &str, head: usize, tail: usize) -> Option<String> {
    let prefix = if value.starts_with("0x") { 2 } else { 0 };
    let keep = prefix + head;
    if !value.is_ascii() || value.len() <= keep + tail + 3 {
        return None;
    }
    Some(format!("{}...{}", &value[..keep], &value[value.len() - tail..]))
}

/// A log record built field by field
#[derive(Debug)]
pub struct LogEntry {
    pub level: Level,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: Level, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field, redacted according to its key
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let rendered = Redaction::for_key(key).apply(&value.to_string());
        self.fields.push((key, rendered));
        self
    }

    /// `key=value` pairs separated by spaces
    pub fn render_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Emit the entry. Debug entries are dropped unless `config.trace` is set.
    pub fn log(self, config: &CodecConfig) {
        if self.level == Level::DEBUG && !config.trace {
            return;
        }

        let fields = self.render_fields();
        let (module, message) = (self.module, self.message.as_str());
        if self.level == Level::ERROR {
            tracing::error!(module, fields = %fields, "{message}");
        } else if self.level == Level::WARN {
            tracing::warn!(module, fields = %fields, "{message}");
        } else if self.level == Level::INFO {
            tracing::info!(module, fields = %fields, "{message}");
        } else {
            tracing::debug!(module, fields = %fields, "{message}");
        }
    }
}

/// Debug-level entry, emitted only when the config enables tracing
#[macro_export]
macro_rules! log_debug {
    ($config:expr, $module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        if $config.trace {
            $crate::utils::logging::LogEntry::new($crate::utils::logging::Level::DEBUG, $module, $msg)
                $(.field(stringify!($key), &$value))*
                .log($config)
        }
    };
}

/// Warning-level entry
#[macro_export]
macro_rules! log_warn {
    ($config:expr, $module:expr, $msg:expr $(, $key:ident = $value:expr)* $(,)?) => {
        $crate::utils::logging::LogEntry::new($crate::utils::logging::Level::WARN, $module, $msg)
            $(.field(stringify!($key), &$value))*
            .log($config)
    };
}
