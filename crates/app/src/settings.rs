//! Settings for the operator binary.
//!
//! Sources, lowest priority first: the TOML file (`config/coopbook.toml` by
//! default), `COOPBOOK__*` environment variables (e.g.
//! `COOPBOOK__APP__LEVEL=debug`), then command line overrides.
use config::{Config, ConfigError, Environment, File};
use rust_decimal::Decimal;
use serde::Deserialize;

pub const DEFAULT_CONFIG_PATH: &str = "config/coopbook.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

impl Default for Database {
    fn default() -> Self {
        Self::Sqlite("coopbook.db".to_string())
    }
}

impl Database {
    /// `memory` selects an in-memory database, anything else is a file path.
    pub fn from_arg(raw: &str) -> Self {
        match raw {
            "memory" => Self::Memory,
            path => Self::Sqlite(path.to_string()),
        }
    }

    pub fn url(&self) -> String {
        match self {
            Self::Memory => String::from("sqlite::memory:"),
            Self::Sqlite(path) => format!("sqlite:{path}?mode=rwc"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    pub default_bag_size_kg: Decimal,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            default_bag_size_kg: engine::DEFAULT_BAG_SIZE_KG,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub engine: EngineSettings,
}

/// Values given on the command line; they win over file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub config: Option<String>,
    pub level: Option<String>,
    pub database: Option<String>,
    pub bag_size_kg: Option<Decimal>,
}

impl Settings {
    pub fn load(overrides: &Overrides) -> Result<Self, ConfigError> {
        let path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut settings: Settings = Config::builder()
            .add_source(File::with_name(path).required(overrides.config.is_some()))
            .add_source(Environment::with_prefix("COOPBOOK").separator("__"))
            .build()?
            .try_deserialize()?;

        if let Some(level) = &overrides.level {
            settings.app.level = level.clone();
        }
        if let Some(database) = &overrides.database {
            settings.database = Database::from_arg(database);
        }
        if let Some(bag_size_kg) = overrides.bag_size_kg {
            settings.engine.default_bag_size_kg = bag_size_kg;
        }
        Ok(settings)
    }
}
