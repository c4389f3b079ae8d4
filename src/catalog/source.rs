use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use tracing::{debug, info};

use crate::catalog::sample::sample_data;
use crate::catalog::InsuranceData;
use crate::config::{Config, SourceKind};

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 12;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 6;

static HTTP_CLIENT: Lazy<Client> = Lazy::new(|| {
    Client::builder()
        .user_agent(concat!("insurance-compare/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|_| Client::new())
});

#[async_trait]
pub trait DataSource: Send + Sync {
    fn name(&self) -> String;
    async fn fetch(&self) -> Result<InsuranceData>;
}

pub struct EmbeddedSource;

#[async_trait]
impl DataSource for EmbeddedSource {
    fn name(&self) -> String {
        "embedded sample".to_string()
    }

    async fn fetch(&self) -> Result<InsuranceData> {
        sample_data()
    }
}

pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DataSource for FileSource {
    fn name(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch(&self) -> Result<InsuranceData> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed reading dataset: {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("invalid dataset JSON: {}", self.path.display()))
    }
}

pub struct HttpSource {
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

#[async_trait]
impl DataSource for HttpSource {
    fn name(&self) -> String {
        format!("http {}", self.url)
    }

    async fn fetch(&self) -> Result<InsuranceData> {
        let url = self.url.as_str();
        let response = HTTP_CLIENT
            .get(url)
            .send()
            .await
            .with_context(|| format!("failed GET request: {url}"))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .with_context(|| format!("failed reading response body: {url}"))?;
        if !status.is_success() {
            let preview: String = body.chars().take(180).collect();
            return Err(anyhow!("GET {url} returned {status}: {preview}"));
        }
        serde_json::from_str(&body).with_context(|| format!("invalid dataset JSON: {url}"))
    }
}

pub fn source_from_config(config: &Config) -> Result<Box<dyn DataSource>> {
    let source: Box<dyn DataSource> = match config.data.source {
        SourceKind::Embedded => Box::new(EmbeddedSource),
        SourceKind::File => {
            if config.data.path.trim().is_empty() {
                bail!("data.source is \"file\" but data.path is empty");
            }
            Box::new(FileSource::new(config.resolved_data_path()))
        }
        SourceKind::Http => {
            if config.data.url.trim().is_empty() {
                bail!("data.source is \"http\" but data.url is empty");
            }
            Box::new(HttpSource::new(config.data.url.clone()))
        }
    };
    Ok(source)
}

/// Fetches from `source` and validates before the dataset reaches the comparison core.
pub async fn fetch_validated(source: &dyn DataSource) -> Result<InsuranceData> {
    let data = source.fetch().await?;
    data.validate()
        .with_context(|| format!("dataset from {} failed validation", source.name()))?;
    for (offer, missing) in data.missing_entries() {
        debug!(
            "offer {offer} has no entry for {} catalog coverages; treating them as not covered",
            missing.len()
        );
    }
    info!(
        "loaded {} offers and {} categories from {}",
        data.offers.len(),
        data.categories.len(),
        source.name()
    );
    Ok(data)
}

pub async fn load_dataset(config: &Config) -> Result<InsuranceData> {
    let source = source_from_config(config)?;
    fetch_validated(source.as_ref()).await
}
