use std::time::Duration;

pub use meetcode_core::{DEFAULT_MAX_CREATE_ATTEMPTS, DEFAULT_SEND_QUEUE};
use meetcode_server::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_WRITE_TIMEOUT, ServerConfig};
use serde::{Deserialize, Serialize};

/// Default log filter
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration as stored in TOML files (with optional fields for merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawMeetConfig {
    #[serde(default)]
    pub server: RawServerConfig,

    #[serde(default)]
    pub signaling: RawSignalingConfig,

    #[serde(default)]
    pub logging: RawLoggingConfig,
}

/// Server config as stored in TOML (optional fields for proper merging)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawServerConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_origins: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawSignalingConfig {
    pub send_queue: Option<usize>,
    pub write_timeout_ms: Option<u64>,
    pub max_create_attempts: Option<usize>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawLoggingConfig {
    pub level: Option<String>,
}

/// Final configuration with defaults applied
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct MeetConfig {
    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub signaling: SignalingSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerSection {
    /// Address to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SignalingSection {
    /// Outbound frames buffered per connection before sends fail
    pub send_queue: usize,

    /// Deadline for writing one frame to a peer, in milliseconds
    pub write_timeout_ms: u64,

    /// Fresh ids tried before room creation reports a conflict
    pub max_create_attempts: usize,
}

impl Default for SignalingSection {
    fn default() -> Self {
        Self {
            send_queue: DEFAULT_SEND_QUEUE,
            write_timeout_ms: DEFAULT_WRITE_TIMEOUT.as_millis() as u64,
            max_create_attempts: DEFAULT_MAX_CREATE_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingSection {
    /// tracing filter directive, e.g. "info" or "meetcode_core=debug"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl MeetConfig {
    /// Settings for the server crate
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            host: self.server.host.clone(),
            port: self.server.port,
            cors_origins: self.server.cors_origins.clone(),
            send_queue: self.signaling.send_queue,
            write_timeout: Duration::from_millis(self.signaling.write_timeout_ms),
            max_create_attempts: self.signaling.max_create_attempts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = MeetConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert!(config.server.cors_origins.is_empty());
        assert_eq!(config.signaling.write_timeout_ms, 5000);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_defaults_match_server_defaults() {
        assert_eq!(MeetConfig::default().server_config(), ServerConfig::default());
    }

    #[test]
    fn test_partial_section_fills_defaults() {
        let config: MeetConfig = toml::from_str(
            r#"
[signaling]
send_queue = 8
"#,
        )
        .unwrap();

        assert_eq!(config.signaling.send_queue, 8);
        assert_eq!(config.signaling.max_create_attempts, DEFAULT_MAX_CREATE_ATTEMPTS);
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_raw_config_partial_parsing() {
        let toml_str = r#"
[server]
port = 9000
"#;
        let raw: RawMeetConfig = toml::from_str(toml_str).unwrap();

        // Only port was set, everything else stays unset
        assert_eq!(raw.server.port, Some(9000));
        assert!(raw.server.host.is_none());
        assert!(raw.signaling.send_queue.is_none());
        assert!(raw.logging.level.is_none());
    }

    #[test]
    fn test_server_config_conversion() {
        let config = MeetConfig {
            server: ServerSection {
                host: "127.0.0.1".to_string(),
                port: 9100,
                cors_origins: vec!["https://meet.example.com".to_string()],
            },
            signaling: SignalingSection {
                send_queue: 16,
                write_timeout_ms: 250,
                max_create_attempts: 5,
            },
            logging: LoggingSection::default(),
        };

        let server = config.server_config();

        assert_eq!(server.addr(), "127.0.0.1:9100");
        assert_eq!(server.cors_origins, vec!["https://meet.example.com"]);
        assert_eq!(server.send_queue, 16);
        assert_eq!(server.write_timeout, Duration::from_millis(250));
        assert_eq!(server.max_create_attempts, 5);
    }
}
