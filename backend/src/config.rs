use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_CONFIG_PATH: &str = "config/app.yaml";
pub const DEFAULT_MODEL_URL: &str =
    "https://drive.usercontent.google.com/download?id={id}&export=download&confirm=t";
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub gallery: GalleryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub frontend_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Identifier substituted for `{id}` in `url`. There is no default; it must be
    /// configured unless the artifact is already at `path`.
    pub id: Option<String>,
    pub url: String,
    pub path: PathBuf,
    pub sha256: Option<String>,
    pub download_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            frontend_dir: PathBuf::from("frontend/dist"),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            id: None,
            url: DEFAULT_MODEL_URL.to_string(),
            path: PathBuf::from("model_fix.pt"),
            sha256: None,
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("gallery"),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("APP_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let mut config = Self::from_file(&path)?;
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Missing files fall back to the defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let config_str = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig =
            serde_yaml::from_str(&config_str).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a valid port: {}", port)))?;
        }
        if let Some(dir) = lookup("FRONTEND_DIR") {
            self.server.frontend_dir = PathBuf::from(dir);
        }
        if let Some(limit) = lookup("MAX_UPLOAD_BYTES") {
            self.server.max_upload_bytes = limit.parse().map_err(|_| {
                ConfigError::Invalid(format!("MAX_UPLOAD_BYTES is not a number: {}", limit))
            })?;
        }
        if let Some(id) = lookup("MODEL_ID") {
            self.model.id = Some(id);
        }
        if let Some(url) = lookup("MODEL_URL") {
            self.model.url = url;
        }
        if let Some(path) = lookup("MODEL_PATH") {
            self.model.path = PathBuf::from(path);
        }
        if let Some(sha256) = lookup("MODEL_SHA256") {
            self.model.sha256 = Some(sha256);
        }
        if let Some(secs) = lookup("MODEL_DOWNLOAD_TIMEOUT_SECS") {
            self.model.download_timeout_secs = secs.parse().map_err(|_| {
                ConfigError::Invalid(format!("MODEL_DOWNLOAD_TIMEOUT_SECS is not a number: {}", secs))
            })?;
        }
        if let Some(dir) = lookup("GALLERY_DIR") {
            self.gallery.dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid(
                "server.max_upload_bytes must be greater than zero".into(),
            ));
        }

        if self.model.download_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "model.download_timeout_secs must be greater than zero".into(),
            ));
        }

        let sample = self.model.url.replace("{id}", "sample");
        Url::parse(&sample).map_err(|e| {
            ConfigError::Invalid(format!("model.url is not a valid URL ({}): {}", e, self.model.url))
        })?;

        if let Some(sha256) = &self.model.sha256 {
            let valid = sha256.len() == 64 && sha256.chars().all(|c| c.is_ascii_hexdigit());
            if !valid {
                return Err(ConfigError::Invalid(
                    "model.sha256 must be 64 hexadecimal characters".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl ModelConfig {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }
}
