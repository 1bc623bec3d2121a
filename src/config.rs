//! Codec configuration
//!
//! Passed explicitly to encoders, decoders and signers instead of living
//! in process-wide state.

use serde::{Deserialize, Serialize};

/// Environment variable that enables trace logging in `CodecConfig::from_env`
pub const TRACE_ENV_VAR: &str = "EVM_CODEC_TRACE";

/// Settings shared by the encoder, decoder and signer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Emit debug-level log entries for every decoded parameter and signature
    #[serde(default)]
    pub trace: bool,
}

impl CodecConfig {
    /// Configuration with trace logging switched on
    pub fn traced() -> Self {
        Self { trace: true }
    }

    /// Read settings from the environment
    pub fn from_env() -> Self {
        let trace = std::env::var(TRACE_ENV_VAR)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        Self { trace }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_quiet() {
        assert!(!CodecConfig::default().trace);
        assert!(CodecConfig::traced().trace);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("1"));
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" yes "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("nope"));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: CodecConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CodecConfig::default());

        let config: CodecConfig = serde_json::from_str(r#"{"trace":true}"#).unwrap();
        assert!(config.trace);
    }
}
