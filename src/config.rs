//! Session configuration

use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Credential used for sessions this side opens itself
pub const LOCAL_USER: &str = "LOCAL_USER";

/// Tunables shared by inbound and outbound sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    /// Capacity of each direction of the buffered stream (default: 4096)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Metering key for outbound sessions (default: `LOCAL_USER`)
    #[serde(default = "default_local_user")]
    pub local_user: String,
}

fn default_buffer_size() -> usize {
    4096
}

fn default_local_user() -> String {
    LOCAL_USER.to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            local_user: default_local_user(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(json)
            .map_err(|e| SessionError::Config(format!("Invalid session config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(SessionError::Config(
                "bufferSize must be greater than zero".to_string(),
            ));
        }
        if self.local_user.is_empty() {
            return Err(SessionError::Config(
                "localUser must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.buffer_size, 4096);
        assert_eq!(config.local_user, "LOCAL_USER");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let config = SessionConfig::from_json(r#"{"bufferSize": 16384}"#).unwrap();
        assert_eq!(config.buffer_size, 16384);
        assert_eq!(config.local_user, LOCAL_USER);

        let config = SessionConfig::from_json(r#"{"localUser": "edge-node"}"#).unwrap();
        assert_eq!(config.buffer_size, 4096);
        assert_eq!(config.local_user, "edge-node");
    }

    #[test]
    fn test_config_rejects_invalid_values() {
        assert!(matches!(
            SessionConfig::from_json(r#"{"bufferSize": 0}"#),
            Err(SessionError::Config(_))
        ));
        assert!(matches!(
            SessionConfig::from_json(r#"{"localUser": ""}"#),
            Err(SessionError::Config(_))
        ));
        assert!(matches!(
            SessionConfig::from_json("not json"),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let config = SessionConfig {
            buffer_size: 1024,
            local_user: "relay".to_string(),
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"bufferSize\":1024"));
        let parsed: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
