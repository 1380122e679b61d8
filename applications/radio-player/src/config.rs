/// Player configuration
use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File read when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "radio.toml";

/// Default log filter when neither `RUST_LOG` nor `logging.filter` is set
pub const DEFAULT_LOG_FILTER: &str =
    "radio_player=info,radio_playback=info,radio_connectivity=info,radio_audio_desktop=info";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    #[serde(default = "default_player")]
    pub player: PlayerSettings,

    #[serde(default = "default_connectivity")]
    pub connectivity: ConnectivitySettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerSettings {
    #[serde(default = "default_initial_volume")]
    pub initial_volume: f32,

    /// Start the stream once the launch delay has passed
    #[serde(default = "default_autoplay")]
    pub autoplay: bool,

    #[serde(default = "default_launch_delay_ms")]
    pub launch_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ConnectivitySettings {
    /// `host:port` the reachability probe connects to
    #[serde(default = "default_probe_address")]
    pub probe_address: String,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives; `RUST_LOG` wins when set
    pub filter: Option<String>,
}

impl PlayerSettings {
    pub fn launch_delay(&self) -> Duration {
        Duration::from_millis(self.launch_delay_ms)
    }
}

impl ConnectivitySettings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

impl LoggingSettings {
    pub fn filter_or_default(&self) -> &str {
        self.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }
}

impl PlayerConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default `radio.toml` is optional.
    /// Variables prefixed with `RADIO_` override file values, with `__`
    /// between nested keys (`RADIO_PLAYER__AUTOPLAY=false`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, environment())
    }

    fn load_with(path: Option<&Path>, env: config::Environment) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        let config: Self = settings.add_source(env).build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let volume = self.player.initial_volume;
        if !(0.0..=1.0).contains(&volume) {
            return Err(ConfigError::Invalid(format!(
                "player.initial_volume must be between 0.0 and 1.0, got {}",
                volume
            )));
        }

        if self.connectivity.probe_address.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "connectivity.probe_address is required".to_string(),
            ));
        }

        Ok(())
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("RADIO")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

// Default values
fn default_player() -> PlayerSettings {
    PlayerSettings {
        initial_volume: default_initial_volume(),
        autoplay: default_autoplay(),
        launch_delay_ms: default_launch_delay_ms(),
    }
}

fn default_initial_volume() -> f32 {
    1.0
}

fn default_autoplay() -> bool {
    true
}

fn default_launch_delay_ms() -> u64 {
    2500
}

fn default_connectivity() -> ConnectivitySettings {
    ConnectivitySettings {
        probe_address: default_probe_address(),
        probe_timeout_ms: default_probe_timeout_ms(),
    }
}

fn default_probe_address() -> String {
    "radioserver.krushiradio.lk:443".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    3000
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            player: default_player(),
            connectivity: default_connectivity(),
            logging: LoggingSettings::default(),
        }
    }
}
