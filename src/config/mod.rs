mod file;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::rib::AddressFamily;
use crate::utils::system_hostname;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io { path: String, source: io::Error },
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
    #[error("No hostname provided and can't be determined")]
    NoHostname,
}

/// Values supplied on the command line, taking precedence over the file
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub hostname: Option<String>,
    pub router_id: Option<String>,
    pub topology_url: Option<String>,
    pub poll_interval: Option<u16>,
    pub speaker_endpoint: Option<String>,
    pub publish_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub hostname: String,
    pub router_id: String,
    pub topology_url: String,
    pub poll_interval: Duration,
    /// None when reconciliation with a speaker is turned off
    pub speaker: Option<SpeakerConfig>,
    pub publish_path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct SpeakerConfig {
    pub endpoint: String,
    pub reconcile_interval: Duration,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub families: Vec<AddressFamily>,
}

impl Config {
    /// Read the TOML file (if any) and apply command line overrides
    pub fn load(path: Option<&str>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let spec = match path {
            Some(path) => file::ConfigSpec::from_file(path).map_err(|source| ConfigError::Io {
                path: path.to_string(),
                source,
            })??,
            None => file::ConfigSpec::from_toml("")?,
        };
        Self::from_spec(spec, overrides)
    }

    fn from_spec(spec: file::ConfigSpec, overrides: &Overrides) -> Result<Self, ConfigError> {
        let hostname = match overrides.hostname.clone().or(spec.hostname) {
            Some(hostname) => hostname,
            None => system_hostname().ok_or(ConfigError::NoHostname)?,
        };
        let router_id = overrides
            .router_id
            .clone()
            .or(spec.router_id)
            .unwrap_or_else(|| hostname.clone());
        let poll_interval = overrides.poll_interval.unwrap_or(spec.poll_interval);
        if poll_interval == 0 {
            return Err(ConfigError::Invalid("poll_interval must be non-zero".into()));
        }

        let speaker_spec = spec.speaker.unwrap_or_default();
        let endpoint = overrides
            .speaker_endpoint
            .clone()
            .or(speaker_spec.endpoint)
            .filter(|e| !e.trim().is_empty());
        let speaker = match endpoint {
            Some(endpoint) if speaker_spec.enabled => {
                if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
                    return Err(ConfigError::Invalid(format!(
                        "speaker endpoint must be a ws:// or wss:// URL, got '{}'",
                        endpoint
                    )));
                }
                let reconcile_interval = speaker_spec.reconcile_interval.unwrap_or(poll_interval);
                if reconcile_interval == 0 {
                    return Err(ConfigError::Invalid(
                        "reconcile_interval must be non-zero".into(),
                    ));
                }
                if speaker_spec.families.is_empty() {
                    return Err(ConfigError::Invalid(
                        "speaker needs at least one family".into(),
                    ));
                }
                Some(SpeakerConfig {
                    endpoint,
                    reconcile_interval: Duration::from_secs(reconcile_interval.into()),
                    connect_timeout: Duration::from_millis(speaker_spec.connect_timeout_ms),
                    request_timeout: Duration::from_millis(speaker_spec.request_timeout_ms),
                    families: speaker_spec.families,
                })
            }
            _ => None,
        };

        let publish_path = match &overrides.publish_path {
            Some(path) => Some(path.clone()),
            None => spec.publish.and_then(|p| p.path),
        };
        Ok(Self {
            hostname,
            router_id,
            topology_url: overrides.topology_url.clone().unwrap_or(spec.topology_url),
            poll_interval: Duration::from_secs(poll_interval.into()),
            speaker,
            publish_path,
        })
    }
}
