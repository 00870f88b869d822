use crate::error::{AgriWeatherError, Result};
use dialoguer::{Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sessions: SessionConfig,
    #[serde(default)]
    pub crops: CropDataConfig,
    pub openweathermap: OpenWeatherMapConfig,
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_bind() -> String {
    "0.0.0.0:5000".into()
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default = "default_idle_timeout_minutes")]
    pub idle_timeout_minutes: u64,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

fn default_idle_timeout_minutes() -> u64 {
    60
}

fn default_sweep_interval_secs() -> u64 {
    300
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout_minutes(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CropDataConfig {
    #[serde(default = "default_crop_data_file")]
    pub data_file: PathBuf,
}

fn default_crop_data_file() -> PathBuf {
    PathBuf::from("data/crop_data.json")
}

impl Default for CropDataConfig {
    fn default() -> Self {
        Self {
            data_file: default_crop_data_file(),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct OpenWeatherMapConfig {
    pub api_key: String,
    /// Number of 3-hour forecast slots to aggregate (8 = next 24 hours).
    #[serde(default = "default_forecast_slots")]
    pub forecast_slots: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_forecast_slots() -> u32 {
    8
}

fn default_timeout_secs() -> u64 {
    5
}

impl std::fmt::Debug for OpenWeatherMapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenWeatherMapConfig")
            .field("api_key", &"[REDACTED]")
            .field("forecast_slots", &self.forecast_slots)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct GeocodingConfig {
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for GeocodingConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocodingConfig")
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(AgriWeatherError::Config(format!(
                "Config file not found at {:?}. Run `agriweather init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| AgriWeatherError::Config(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&config_str)
    }

    /// Parse a YAML document after `${VAR}` substitution.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let content = Self::substitute_env_vars(content)?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| AgriWeatherError::Config(format!("Failed to parse config: {}", e)))?;

        if config.openweathermap.api_key.is_empty() {
            tracing::warn!("OpenWeatherMap API key not configured - forecasts will fail");
        }
        if config.geocoding.api_key.is_empty() {
            tracing::warn!("Geocoding API key not configured - location lookups will fail");
        }

        Ok(config)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("agriweather").join("config.yaml");
            if xdg_config.exists() {
                return Ok(xdg_config);
            }
        }

        Self::default_config_path()
    }

    /// Default path for writing new config files (~/.config/agriweather/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| AgriWeatherError::Config("Cannot determine config directory".into()))?
            .join("agriweather");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up AgriWeather!");
        println!();

        println!("Webhook server");
        let bind: String = Input::new()
            .with_prompt("  Bind address")
            .default(default_bind())
            .interact_text()
            .map_err(|e| AgriWeatherError::Config(format!("Input error: {}", e)))?;

        let data_file: String = Input::new()
            .with_prompt("  Crop data file")
            .default("data/crop_data.json".into())
            .interact_text()
            .map_err(|e| AgriWeatherError::Config(format!("Input error: {}", e)))?;

        println!();

        // Blank keys fall back to env placeholders so secrets stay out of the file
        println!("OpenWeatherMap (leave blank to read WEATHER_API_KEY from the environment)");
        let owm_api_key: String = Password::new()
            .with_prompt("  API key")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| AgriWeatherError::Config(format!("Input error: {}", e)))?;

        println!();

        println!("Google Geocoding (leave blank to read GOOGLE_API_KEY from the environment)");
        let geocoding_api_key: String = Password::new()
            .with_prompt("  API key")
            .allow_empty_password(true)
            .interact()
            .map_err(|e| AgriWeatherError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            server: ServerConfig {
                bind,
                ..ServerConfig::default()
            },
            sessions: SessionConfig::default(),
            crops: CropDataConfig {
                data_file: PathBuf::from(data_file),
            },
            openweathermap: OpenWeatherMapConfig {
                api_key: if owm_api_key.is_empty() {
                    "${WEATHER_API_KEY}".into()
                } else {
                    owm_api_key
                },
                forecast_slots: default_forecast_slots(),
                timeout_secs: default_timeout_secs(),
            },
            geocoding: GeocodingConfig {
                api_key: if geocoding_api_key.is_empty() {
                    "${GOOGLE_API_KEY}".into()
                } else {
                    geocoding_api_key
                },
                timeout_secs: default_timeout_secs(),
            },
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)?;

        let content = format!(
            "# AgriWeather Configuration\n# Generated by `agriweather init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        let loaded = Self::load(Some(config_path.clone()))?;
        Ok((loaded, config_path))
    }

    /// Replace `${VAR}` placeholders with environment values. Unset variables
    /// become empty strings so missing secrets surface as "not configured".
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| AgriWeatherError::Config(format!("Invalid placeholder pattern: {}", e)))?;

        let result = re.replace_all(content, |cap: &regex_lite::Captures<'_>| {
            std::env::var(&cap[1]).unwrap_or_default()
        });

        Ok(result.into_owned())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            sessions: SessionConfig::default(),
            crops: CropDataConfig::default(),
            openweathermap: OpenWeatherMapConfig {
                api_key: String::new(),
                forecast_slots: default_forecast_slots(),
                timeout_secs: default_timeout_secs(),
            },
            geocoding: GeocodingConfig {
                api_key: String::new(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}
