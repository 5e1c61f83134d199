//! Runtime configuration for the command-line tool.
//!
//! Read from the environment, after loading a `.env` file if one is present:
//! - `RENTAL_CART_DIR`: directory of the file-backed storage (default `.rental-cart`)
//! - `RENTAL_CART_KEY`: storage key of the cart (default `rental_cart`)

use std::env;
use std::path::PathBuf;

use dotenvy::dotenv;
use thiserror::Error;
use tracing::debug;

use crate::cart::DEFAULT_STORAGE_KEY;

pub const DEFAULT_DATA_DIR: &str = ".rental-cart";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("environment variable '{0}' must not be empty")]
    Empty(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub storage_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_owned(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok(); // Load .env file if present
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &'static str| match lookup(name) {
            Some(value) if value.trim().is_empty() => Err(ConfigError::Empty(name)),
            Some(value) => Ok(Some(value.trim().to_owned())),
            None => Ok(None),
        };

        let defaults = Self::default();
        let config = Self {
            data_dir: get("RENTAL_CART_DIR")?
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            storage_key: get("RENTAL_CART_KEY")?.unwrap_or(defaults.storage_key),
        };
        debug!(?config, "configuration loaded");
        Ok(config)
    }
}
