//! Configuration file support.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/tally/config.toml`. It
//! supplies global-parameter defaults and the dataset location; the engine
//! itself never reads it — callers resolve a config into a
//! [`GlobalParameters`] value and pass that in explicitly.

use crate::types::GlobalParameters;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub parameters: ParameterConfig,
}

/// Data location configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct DataConfig {
    /// Explicit dataset location; resolved against the local data
    /// directory when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_path: Option<PathBuf>,
}

impl DataConfig {
    /// The dataset location: the configured path if one is set, otherwise
    /// `tally/dataset.json` under the platform's local data directory.
    pub fn dataset_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.dataset_path {
            return Ok(path.clone());
        }
        let base = dirs::data_local_dir()
            .or_else(|| home_relative(".local/share"))
            .ok_or_else(|| {
                Error::Config(
                    "no data directory available: set data.dataset_path, HOME, or XDG_DATA_HOME"
                        .into(),
                )
            })?;
        Ok(base.join("tally").join("dataset.json"))
    }
}

/// Global-parameter defaults, overridable field by field in the config
/// file. Field defaults mirror [`GlobalParameters::default`] so a partial
/// `[parameters]` table only changes what it names.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterConfig {
    #[serde(default = "default_discount_rate")]
    pub discount_rate: f64,

    #[serde(default = "default_population_growth_rate")]
    pub population_growth_rate: f64,

    #[serde(default = "default_time_horizon_years")]
    pub time_horizon_years: f64,

    #[serde(default = "default_current_population")]
    pub current_population: f64,

    #[serde(default = "default_population_limit")]
    pub population_limit: Option<f64>,

    #[serde(default = "default_years_per_life")]
    pub years_per_life: f64,

    #[serde(default = "default_simple_animal_weight")]
    pub simple_animal_weight: f64,

    #[serde(default = "default_medium_animal_weight")]
    pub medium_animal_weight: f64,

    #[serde(default = "default_complex_animal_weight")]
    pub complex_animal_weight: f64,
}

impl Default for ParameterConfig {
    fn default() -> Self {
        Self {
            discount_rate: default_discount_rate(),
            population_growth_rate: default_population_growth_rate(),
            time_horizon_years: default_time_horizon_years(),
            current_population: default_current_population(),
            population_limit: default_population_limit(),
            years_per_life: default_years_per_life(),
            simple_animal_weight: default_simple_animal_weight(),
            medium_animal_weight: default_medium_animal_weight(),
            complex_animal_weight: default_complex_animal_weight(),
        }
    }
}

impl ParameterConfig {
    /// Resolve this config into the parameter snapshot calculations use.
    pub fn to_parameters(&self) -> GlobalParameters {
        GlobalParameters {
            discount_rate: self.discount_rate,
            population_growth_rate: self.population_growth_rate,
            time_horizon_years: self.time_horizon_years,
            current_population: self.current_population,
            population_limit: self.population_limit,
            years_per_life: self.years_per_life,
            simple_animal_weight: self.simple_animal_weight,
            medium_animal_weight: self.medium_animal_weight,
            complex_animal_weight: self.complex_animal_weight,
        }
    }
}

/// A path under `$HOME`, when `HOME` is set at all.
fn home_relative(suffix: &str) -> Option<PathBuf> {
    std::env::var_os("HOME").map(|home| PathBuf::from(home).join(suffix))
}

// Default value functions
fn default_discount_rate() -> f64 {
    GlobalParameters::default().discount_rate
}

fn default_population_growth_rate() -> f64 {
    GlobalParameters::default().population_growth_rate
}

fn default_time_horizon_years() -> f64 {
    GlobalParameters::default().time_horizon_years
}

fn default_current_population() -> f64 {
    GlobalParameters::default().current_population
}

fn default_population_limit() -> Option<f64> {
    GlobalParameters::default().population_limit
}

fn default_years_per_life() -> f64 {
    GlobalParameters::default().years_per_life
}

fn default_simple_animal_weight() -> f64 {
    GlobalParameters::default().simple_animal_weight
}

fn default_medium_animal_weight() -> f64 {
    GlobalParameters::default().medium_animal_weight
}

fn default_complex_animal_weight() -> f64 {
    GlobalParameters::default().complex_animal_weight
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .or_else(|| home_relative(".config"))
            .ok_or_else(|| {
                Error::Config("no config directory available: set HOME or XDG_CONFIG_HOME".into())
            })?;
        Ok(base.join("tally").join("config.toml"))
    }

    /// Save the current configuration to the default path
    pub fn save(&self) -> Result<()> {
        let config_path = Self::default_config_path()?;
        self.save_to(&config_path)
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}
