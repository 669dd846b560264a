use crate::error::{Error, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, built once in `main` and handed to every store and
/// service at construction. Nothing reads the environment after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_address: String,
    pub data_dir: PathBuf,
    pub public_rps: u32,
    pub admin_rps: u32,
    pub focus_debounce: Duration,
    pub departments: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Ok(Self {
            server_address: get_env("SERVER_ADDRESS")?,
            data_dir: PathBuf::from(get_env("DATA_DIR")?),
            public_rps: get_env_parse_or("PUBLIC_RPS", 50)?,
            admin_rps: get_env_parse_or("ADMIN_RPS", 10)?,
            focus_debounce: Duration::from_millis(get_env_parse_or("FOCUS_DEBOUNCE_MS", 100)?),
            departments: match env::var("DEPARTMENTS") {
                Ok(raw) => raw
                    .split(',')
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty())
                    .collect(),
                Err(_) => default_departments(),
            },
        })
    }
}

pub fn default_departments() -> Vec<String> {
    [
        "Python Developer",
        "R&D",
        "Sales",
        "Marketing",
        "Project Coordinators",
        "QA",
        "Delivery Manager",
        "IT",
        "General",
    ]
    .iter()
    .map(|d| d.to_string())
    .collect()
}

fn get_env(name: &str) -> Result<String> {
    env::var(name).map_err(|_| Error::Config(format!("Missing environment variable: {}", name)))
}

fn get_env_parse_or<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::Config(format!("Invalid value for {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}
