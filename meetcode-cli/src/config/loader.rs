use super::types::{
    DEFAULT_LOG_LEVEL, DEFAULT_MAX_CREATE_ATTEMPTS, DEFAULT_SEND_QUEUE, LoggingSection,
    MeetConfig, RawLoggingConfig, RawMeetConfig, RawServerConfig, RawSignalingConfig,
    ServerSection, SignalingSection,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use meetcode_server::{DEFAULT_HOST, DEFAULT_PORT, DEFAULT_WRITE_TIMEOUT};
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load merged configuration (user + project)
    pub fn load() -> Result<MeetConfig> {
        Self::load_layers(
            Self::user_config_path().as_deref(),
            &Self::project_config_path(),
        )
    }

    /// Get user config path (platform-specific)
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "meetcode").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get project config path
    /// Can be overridden with MEETCODE_PROJECT_CONFIG_DIR env var
    pub fn project_config_path() -> PathBuf {
        if let Ok(dir) = std::env::var("MEETCODE_PROJECT_CONFIG_DIR") {
            PathBuf::from(dir).join("config.toml")
        } else {
            PathBuf::from(".meetcode/config.toml")
        }
    }

    /// Layer the given files over the defaults; missing files are skipped
    fn load_layers(user: Option<&Path>, project: &Path) -> Result<MeetConfig> {
        let mut raw = RawMeetConfig::default();

        // Layer 1: User config
        if let Some(user_path) = user
            && let Some(user_config) = Self::read_raw(user_path)?
        {
            raw = Self::merge_raw(raw, user_config);
        }

        // Layer 2: Project config
        if let Some(project_config) = Self::read_raw(project)? {
            raw = Self::merge_raw(raw, project_config);
        }

        Ok(Self::finalize(raw))
    }

    fn read_raw(path: &Path) -> Result<Option<RawMeetConfig>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let raw = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(Some(raw))
    }

    /// Merge two raw configs (overlay values override base only if explicitly set)
    fn merge_raw(base: RawMeetConfig, overlay: RawMeetConfig) -> RawMeetConfig {
        RawMeetConfig {
            server: RawServerConfig {
                host: overlay.server.host.or(base.server.host),
                port: overlay.server.port.or(base.server.port),
                cors_origins: overlay.server.cors_origins.or(base.server.cors_origins),
            },
            signaling: RawSignalingConfig {
                send_queue: overlay.signaling.send_queue.or(base.signaling.send_queue),
                write_timeout_ms: overlay
                    .signaling
                    .write_timeout_ms
                    .or(base.signaling.write_timeout_ms),
                max_create_attempts: overlay
                    .signaling
                    .max_create_attempts
                    .or(base.signaling.max_create_attempts),
            },
            logging: RawLoggingConfig {
                level: overlay.logging.level.or(base.logging.level),
            },
        }
    }

    /// Convert raw config to final config with defaults applied
    fn finalize(raw: RawMeetConfig) -> MeetConfig {
        MeetConfig {
            server: ServerSection {
                host: raw.server.host.unwrap_or_else(|| DEFAULT_HOST.to_string()),
                port: raw.server.port.unwrap_or(DEFAULT_PORT),
                cors_origins: raw.server.cors_origins.unwrap_or_default(),
            },
            signaling: SignalingSection {
                // A zero-capacity queue cannot be built
                send_queue: raw
                    .signaling
                    .send_queue
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_SEND_QUEUE),
                write_timeout_ms: raw
                    .signaling
                    .write_timeout_ms
                    .unwrap_or(DEFAULT_WRITE_TIMEOUT.as_millis() as u64),
                max_create_attempts: raw
                    .signaling
                    .max_create_attempts
                    .filter(|n| *n > 0)
                    .unwrap_or(DEFAULT_MAX_CREATE_ATTEMPTS),
            },
            logging: LoggingSection {
                level: raw
                    .logging
                    .level
                    .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            },
        }
    }

    /// Load config from a specific path (for testing)
    #[cfg(test)]
    pub fn load_from_path(path: &Path) -> Result<MeetConfig> {
        match Self::read_raw(path)? {
            Some(raw) => Ok(Self::finalize(raw)),
            None => Ok(MeetConfig::default()),
        }
    }
}
