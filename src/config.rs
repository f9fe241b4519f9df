use crate::error::{AppError, Result};
use crate::soundcloud::{Consumer, Token};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_NAME: &str = "soundcloud-api";
const ORGANIZATION: &str = "damaredayo";

#[derive(Debug, Default, Deserialize, Serialize)]
struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    consumer_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    consumer_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    access_token_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout_secs: Option<u64>,
}

pub struct Config {
    config_path: PathBuf,
    config: ConfigFile,
}

impl Config {
    pub fn new() -> Result<Self> {
        let proj_dirs = ProjectDirs::from("com", ORGANIZATION, APP_NAME).ok_or_else(|| {
            AppError::Configuration("Could not determine config directory".into())
        })?;

        // Ensure config directory exists
        fs::create_dir_all(proj_dirs.config_dir())?;

        Self::load_from(proj_dirs.config_dir().join("config.toml"))
    }

    pub fn load_from(config_path: impl Into<PathBuf>) -> Result<Self> {
        let config_path = config_path.into();
        let config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)?;
            toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring unreadable config {}: {}", config_path.display(), e);
                ConfigFile::default()
            })
        } else {
            ConfigFile::default()
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn consumer(&self) -> Option<Consumer> {
        match (&self.config.consumer_key, &self.config.consumer_secret) {
            (Some(key), Some(secret)) => Some(Consumer::new(key, secret)),
            _ => None,
        }
    }

    pub fn access_token(&self) -> Option<Token> {
        match (&self.config.access_token, &self.config.access_token_secret) {
            (Some(token), Some(secret)) => Some(Token::new(token, secret)),
            _ => None,
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.config.base_url.as_deref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.config.timeout_secs.map(Duration::from_secs)
    }

    pub fn save_consumer(&mut self, consumer: &Consumer) -> Result<()> {
        self.config.consumer_key = Some(consumer.key.clone());
        self.config.consumer_secret = Some(consumer.secret.clone());
        self.save()
    }

    pub fn save_access_token(&mut self, token: &Token) -> Result<()> {
        self.config.access_token = Some(token.token.clone());
        self.config.access_token_secret = Some(token.secret.clone());
        self.save()
    }

    pub fn clear_access_token(&mut self) -> Result<()> {
        self.config.access_token = None;
        self.config.access_token_secret = None;
        self.save()
    }

    fn save(&self) -> Result<()> {
        let toml = toml::to_string_pretty(&self.config)
            .map_err(|e| AppError::Configuration(format!("Failed to serialize config: {}", e)))?;

        fs::write(&self.config_path, toml)?;

        // Set appropriate permissions on Unix systems
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.config_path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }
}
