//! Configuration loading.
//!
//! Settings come from three places, highest precedence first: command-line
//! flags (or their environment variables), `memory.toml`, built-in defaults.

use std::path::Path;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use memory_api::{ClientConfig, DEFAULT_BASE_URL};
use memory_core::views::memory::DEFAULT_PAGE_SIZE;
use memory_core::RouterConfig;
use serde::Deserialize;

/// Looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE: &str = "memory.toml";

/// Contents of `memory.toml`. Every section and key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub memory: MemorySection,
}

#[derive(Debug, Default, Deserialize)]
pub struct BackendSection {
    pub url: Option<String>,
    /// Whole-request timeout. Zero disables it.
    pub timeout_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct MemorySection {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for MemorySection {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

impl FileConfig {
    /// Load `path` if given (it must exist), otherwise `./memory.toml` if
    /// present, otherwise defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let default_path = Path::new(CONFIG_FILE);
        if default_path.exists() {
            tracing::debug!("Loading config from: {}", default_path.display());
            return Self::load_from_path(default_path);
        }

        tracing::debug!("No {CONFIG_FILE} found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: FileConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }
}

/// Values taken from the command line or its environment variables.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client: ClientConfig,
    pub router: RouterConfig,
}

impl Settings {
    pub fn resolve(file: FileConfig, overrides: &Overrides) -> Result<Self> {
        ensure!(file.memory.page_size > 0, "[memory] page_size must be at least 1");

        let url = overrides
            .backend_url
            .clone()
            .or(file.backend.url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut client = ClientConfig::new(url);
        if let Some(secs) = overrides.timeout_secs.or(file.backend.timeout_secs) {
            if secs > 0 {
                client = client.with_timeout(Duration::from_secs(secs));
            }
        }
        if let Some(secs) = file.backend.connect_timeout_secs {
            if secs > 0 {
                client = client.with_connect_timeout(Duration::from_secs(secs));
            }
        }

        Ok(Self {
            client,
            router: RouterConfig {
                facts_page_size: file.memory.page_size,
            },
        })
    }
}
