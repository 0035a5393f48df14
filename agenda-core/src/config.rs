//! Global agenda configuration.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{AgendaError, AgendaResult};

static DEFAULT_DATA_PATH: &str = "~/.local/share/agenda";
static DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 4096;

/// Slots offered by the barbershop booking screen.
pub const DEFAULT_TIME_SLOTS: [&str; 6] = ["09:00", "10:00", "11:00", "14:00", "15:00", "16:00"];

fn default_data_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_PATH)
}

fn default_time_slots() -> Vec<String> {
    DEFAULT_TIME_SLOTS.iter().map(|s| s.to_string()).collect()
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

/// Global configuration at ~/.config/agenda/config.toml
///
/// Every key can be overridden from the environment with an `AGENDA_`
/// prefix, using `__` between sections (e.g. `AGENDA_SERVER__PORT=8080`).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AgendaConfig {
    #[serde(default = "default_data_path")]
    pub data_dir: PathBuf,

    #[serde(default)]
    pub booking: BookingConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BookingConfig {
    /// Time slots suggested by the booking form.
    #[serde(default = "default_time_slots")]
    pub time_slots: Vec<String>,

    /// Reject appointment times outside `time_slots`.
    #[serde(default)]
    pub enforce_time_slots: bool,
}

impl Default for BookingConfig {
    fn default() -> Self {
        BookingConfig {
            time_slots: default_time_slots(),
            enforce_time_slots: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for AgendaConfig {
    fn default() -> Self {
        AgendaConfig {
            data_dir: default_data_path(),
            booking: BookingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AgendaConfig {
    /// Load the global config, writing a commented default file on first run.
    pub fn load() -> AgendaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load from an explicit file; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> AgendaResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("AGENDA").separator("__"))
            .build()
            .map_err(|e| AgendaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| AgendaError::Config(e.to_string()))
    }

    pub fn config_path() -> AgendaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgendaError::Config("Could not determine config directory".into()))?
            .join("agenda");

        Ok(config_dir.join("config.toml"))
    }

    /// Data directory with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();

        PathBuf::from(full_path_str)
    }

    /// Location of the record store document.
    pub fn store_path(&self) -> PathBuf {
        self.data_path().join("store.json")
    }

    /// Location of the persisted CLI session.
    pub fn session_path(&self) -> PathBuf {
        self.data_path().join("session.json")
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> AgendaResult<()> {
        let contents = format!(
            "\
# agenda configuration

# Where appointments and the session are stored:
# data_dir = \"{}\"

[booking]
# Slots offered when booking:
# time_slots = [{}]

# Only accept times from the list above:
# enforce_time_slots = false

[server]
# host = \"{}\"
# port = {}
",
            DEFAULT_DATA_PATH,
            DEFAULT_TIME_SLOTS
                .iter()
                .map(|s| format!("\"{s}\""))
                .collect::<Vec<_>>()
                .join(", "),
            DEFAULT_HOST,
            DEFAULT_PORT
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AgendaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| AgendaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
