use reqwest::header::CONTENT_TYPE;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::config::ModelConfig;

#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("No model identifier configured to download {0}; set model.id or MODEL_ID")]
    MissingIdentifier(String),
    #[error("Invalid artifact URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Download failed: {0}")]
    Download(String),
    #[error("Download of {url} failed with HTTP status {status}")]
    Http { status: u16, url: String },
    #[error("Expected a model file from {0} but received an HTML page")]
    Interstitial(String),
    #[error("Model artifact {path} is corrupt: {reason}. Delete it and restart to fetch a fresh copy")]
    Corrupt { path: PathBuf, reason: String },
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Somewhere a model artifact can be fetched from.
pub(crate) trait ArtifactSource {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, ArtifactError>;
}

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    /// `timeout` bounds the whole download, body included.
    pub fn new(timeout: Duration) -> Result<Self, ArtifactError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .timeout(timeout)
            .build()
            .map_err(|e| ArtifactError::Download(e.to_string()))?;
        Ok(Self { client })
    }
}

impl ArtifactSource for HttpSource {
    async fn fetch(&self, url: &Url) -> Result<Vec<u8>, ArtifactError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ArtifactError::Download(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ArtifactError::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        // File hosts answer with a confirmation page instead of the file when the link is wrong.
        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("text/html"));
        if is_html {
            return Err(ArtifactError::Interstitial(url.to_string()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ArtifactError::Download(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// Local cache slot for the model artifact.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    path: PathBuf,
    url_template: String,
    identifier: Option<String>,
    sha256: Option<String>,
}

impl ArtifactStore {
    pub fn new(
        path: impl Into<PathBuf>,
        url_template: impl Into<String>,
        identifier: Option<String>,
        sha256: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            url_template: url_template.into(),
            identifier,
            sha256,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            config.path.clone(),
            config.url.clone(),
            config.id.clone(),
            config.sha256.clone(),
        )
    }

    #[cfg(test)]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The configured identifier, or the artifact file name when none is set.
    pub fn identifier(&self) -> String {
        match &self.identifier {
            Some(id) => id.clone(),
            None => self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| self.path.display().to_string()),
        }
    }

    pub fn is_present(&self) -> bool {
        self.path.is_file()
    }

    pub fn source_url(&self) -> Result<Url, ArtifactError> {
        if !self.url_template.contains("{id}") {
            return Ok(Url::parse(&self.url_template)?);
        }
        let id = self
            .identifier
            .as_deref()
            .ok_or_else(|| ArtifactError::MissingIdentifier(self.path.display().to_string()))?;
        Ok(Url::parse(
            &self.url_template.replace("{id}", &urlencoding::encode(id)),
        )?)
    }

    /// Fetches the artifact unless it is already on disk. Safe to call repeatedly.
    pub(crate) async fn ensure<S: ArtifactSource>(&self, source: &S) -> Result<&Path, ArtifactError> {
        if self.is_present() {
            log::info!("Model artifact already present at {}", self.path.display());
            return Ok(&self.path);
        }

        let url = self.source_url()?;
        log::info!(
            "Model artifact missing, downloading {} from {}",
            self.identifier(),
            url
        );

        let bytes = source.fetch(&url).await?;
        if bytes.is_empty() {
            return Err(self.corrupt("downloaded file is empty".into()));
        }
        self.verify_checksum(&bytes)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }

        // Written aside first so an interrupted download never looks like a complete artifact.
        let partial = self.partial_path();
        tokio::fs::write(&partial, &bytes)
            .await
            .map_err(|source| io_error(&partial, source))?;
        tokio::fs::rename(&partial, &self.path)
            .await
            .map_err(|source| io_error(&self.path, source))?;

        log::info!(
            "Downloaded model artifact to {} ({} bytes)",
            self.path.display(),
            bytes.len()
        );
        Ok(&self.path)
    }

    fn verify_checksum(&self, bytes: &[u8]) -> Result<(), ArtifactError> {
        let Some(expected) = &self.sha256 else {
            log::debug!("No checksum configured for {}", self.identifier());
            return Ok(());
        };

        let mut hasher = Sha256::new();
        hasher.update(bytes);
        let actual = hex::encode(hasher.finalize());

        if !actual.eq_ignore_ascii_case(expected) {
            return Err(self.corrupt(format!(
                "checksum mismatch, expected {} got {}",
                expected, actual
            )));
        }
        Ok(())
    }

    fn partial_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".part");
        self.path.with_file_name(name)
    }

    fn corrupt(&self, reason: String) -> ArtifactError {
        ArtifactError::Corrupt {
            path: self.path.clone(),
            reason,
        }
    }
}

fn io_error(path: &Path, source: std::io::Error) -> ArtifactError {
    ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    }
}
