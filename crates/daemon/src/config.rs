//! Daemon configuration
//!
//! Sources, later overrides earlier:
//! 1. Built-in defaults
//! 2. `recruit.yaml` in the working directory (if present)
//! 3. File named by `RECRUIT_CONFIG` (must exist when set)
//! 4. `RECRUIT__SECTION__KEY` environment variables

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, FileFormat};
use recruit_core::application::{FreePlanDefaults, PublishingPolicy};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "recruit.yaml";
pub const CONFIG_ENV_VAR: &str = "RECRUIT_CONFIG";
pub const CONFIG_ENV_PREFIX: &str = "RECRUIT";

const DEFAULT_DB_URL: &str = "~/.recruit/recruit.db";
const DEFAULT_LOG_FILTER: &str = "recruit=info";
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    pub database: DatabaseConfig,
    pub rpc: RpcConfig,
    pub logging: LoggingConfig,
    pub sweep: SweepConfig,
    pub free_plan: FreePlanDefaults,
    pub jobs: PublishingPolicy,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite path or URL; `~` is expanded
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DB_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RpcConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit_burst: u32,
    pub rate_limit_per_sec: u32,
}

impl Default for RpcConfig {
    fn default() -> Self {
        let defaults = recruit_api_rpc::RpcServerConfig::default();
        Self {
            host: defaults.host,
            port: defaults.port,
            rate_limit_burst: defaults.rate_limit_burst,
            rate_limit_per_sec: defaults.rate_limit_per_sec,
        }
    }
}

impl From<&RpcConfig> for recruit_api_rpc::RpcServerConfig {
    fn from(rpc: &RpcConfig) -> Self {
        Self {
            host: rpc.host.clone(),
            port: rpc.port,
            rate_limit_burst: rpc.rate_limit_burst,
            rate_limit_per_sec: rpc.rate_limit_per_sec,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// EnvFilter directive; `RUST_LOG` wins when set
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    pub interval_secs: u64,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_SWEEP_INTERVAL_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// OTLP gRPC endpoint, e.g. `http://localhost:4317`. Export is off when unset.
    pub otlp_endpoint: Option<String>,
    pub service_name: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            otlp_endpoint: None,
            service_name: "recruit-daemon".to_string(),
        }
    }
}

impl DaemonConfig {
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration")?;

        let loaded: DaemonConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;
        loaded.finish()
    }

    /// Parse a YAML document layered over the defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .context("Failed to read configuration")?;

        let loaded: DaemonConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;
        loaded.finish()
    }

    fn finish(mut self) -> Result<Self> {
        self.database.url = shellexpand::tilde(&self.database.url).into_owned();

        if self.rpc.rate_limit_burst == 0 || self.rpc.rate_limit_per_sec == 0 {
            bail!("rpc.rate_limit_burst and rpc.rate_limit_per_sec must be positive");
        }
        if self.sweep.interval_secs == 0 {
            bail!("sweep.interval_secs must be positive");
        }
        if self.free_plan.max_jobs < 0 || self.free_plan.max_applications < 0 {
            bail!("free_plan limits must not be negative");
        }
        if self.jobs.default_job_ttl_days <= 0 {
            bail!("jobs.default_job_ttl_days must be positive");
        }

        Ok(self)
    }

    pub fn is_in_memory_db(&self) -> bool {
        self.database.url.contains(":memory:")
    }
}
