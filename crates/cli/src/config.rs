//! Configuration with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Config file: `--config <FILE>`, or `./eccairs-taxonomy.toml` if present
//! 3. Environment variables: `ECCAIRS_*` prefix (e.g. `ECCAIRS_BASE_URL`)
//! 4. Command-line flags (`--base-url`)

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat, Source};
use resolver::RetrySettings;
use serde::Deserialize;
use transport::HttpTransportConfig;

pub const DEFAULT_CONFIG_FILE: &str = "eccairs-taxonomy.toml";
pub const ENV_PREFIX: &str = "ECCAIRS";
pub const DEFAULT_BASE_URL: &str = "https://api.aviationreporting.eu/taxonomy-service";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines on stderr
    #[default]
    Pretty,
    /// One JSON object per event on stderr
    Json,
}

/// Settings for the `eccairs-taxonomy` binary.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Taxonomy service base URL
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    /// Retries after a refused connection; total attempts are one more
    pub max_retries: u32,
    pub retry_delay_secs: u64,
    /// `EnvFilter` directives, used when `RUST_LOG` is unset
    pub log_filter: String,
    pub log_format: LogFormat,
    /// OTLP/gRPC collector endpoint; spans are only exported when set
    pub otlp_endpoint: Option<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        let transport = HttpTransportConfig::default();
        let retry = RetrySettings::default();
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            connect_timeout_secs: transport.connect_timeout.as_secs(),
            request_timeout_secs: transport.request_timeout.as_secs(),
            max_retries: retry.max_retries,
            retry_delay_secs: retry.delay.as_secs(),
            log_filter: "info".into(),
            log_format: LogFormat::default(),
            otlp_endpoint: None,
        }
    }
}

impl CliConfig {
    /// Load settings from the file, the process environment and the flag.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(path: Option<&Path>, base_url: Option<String>) -> Result<Self> {
        let file = match path {
            Some(path) => File::new(&path.to_string_lossy(), FileFormat::Toml).required(true),
            None => File::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false),
        };
        Self::from_sources(file, environment(), base_url)
            .with_context(|| match path {
                Some(path) => format!("failed to load configuration from {}", path.display()),
                None => "failed to load configuration".to_string(),
            })
    }

    fn from_sources<F>(file: F, env: Environment, base_url: Option<String>) -> Result<Self>
    where
        F: Source + Send + Sync + 'static,
    {
        let config = Config::builder()
            .add_source(file)
            .add_source(env)
            .set_override_option("base_url", base_url)?
            .build()?;
        let settings: Self = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            bail!("base_url must not be empty");
        }
        if self.connect_timeout_secs == 0 || self.request_timeout_secs == 0 {
            bail!("timeouts must be at least one second");
        }
        Ok(())
    }

    pub fn transport_config(&self) -> HttpTransportConfig {
        HttpTransportConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        }
    }

    pub fn retry_settings(&self) -> RetrySettings {
        RetrySettings {
            max_retries: self.max_retries,
            delay: Duration::from_secs(self.retry_delay_secs),
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}
