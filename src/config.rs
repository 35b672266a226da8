//! Runtime configuration read from the environment.

use std::{env, path::PathBuf};

use anyhow::{bail, Result};

pub const ENV_DATA_DIR: &str = "KUMMERKASTEN_DATA_DIR";
pub const ENV_ENVIRONMENT: &str = "KUMMERKASTEN_ENV";

const DEFAULT_DATA_DIR: &str = "./data";
const DATABASE_FILE: &str = "kummerkasten.sqlite3";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "DEV" => Ok(Environment::Dev),
            "PROD" => Ok(Environment::Prod),
            other => bail!("{ENV_ENVIRONMENT} must be DEV or PROD, got '{other}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = lookup(ENV_DATA_DIR)
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());
        let environment = match lookup(ENV_ENVIRONMENT) {
            Some(value) => Environment::parse(&value)?,
            None => Environment::Prod,
        };

        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            environment,
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.data_dir.join(SETTINGS_FILE)
    }

    pub fn is_dev(&self) -> bool {
        self.environment == Environment::Dev
    }
}
