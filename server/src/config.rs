use anyhow::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Secret store switch shared with the rest of the platform
pub const ENV_SECRET_STORE: &str = "EDGEX_SECURITY_SECRET_STORE";

/// Prefix for configuration overrides, e.g. `EDGEX_UI__SERVER__PORT=4100`
pub const ENV_PREFIX: &str = "EDGEX_UI";

#[derive(Parser, Debug, Default)]
#[command(name = "device-console")]
#[command(about = "Web console for managing edge devices")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind, overrides the configuration file
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on, overrides the configuration file
    #[arg(short, long)]
    pub port: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: HttpServerConfig,
    pub metadata: MetadataConfig,
    pub registry: RegistryConfig,
    pub kong: KongConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub host: String,
    pub port: u16,
}

/// API gateway that hands out the registry ACL token in secure mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KongConfig {
    pub server: String,
    pub application_port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub json_format: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: HttpServerConfig {
                host: "0.0.0.0".to_string(),
                port: 4000,
                static_dir: PathBuf::from("./static"),
            },
            metadata: MetadataConfig {
                base_url: "http://localhost:59881".to_string(),
                timeout_secs: 30,
            },
            registry: RegistryConfig {
                host: "localhost".to_string(),
                port: 8500,
            },
            kong: KongConfig {
                server: "localhost".to_string(),
                application_port: 8000,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                json_format: false,
            },
        }
    }
}

impl AppConfig {
    /// Defaults, then the configuration file, then `EDGEX_UI__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path.to_path_buf()).required(true),
            None => config::File::with_name("configuration").required(false),
        };

        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config = settings.try_deserialize()?;
        Ok(config)
    }

    /// Command line flags win over every other source
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(host) = &cli.host {
            self.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            self.server.port = port;
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Secure mode is on unless the secret store is explicitly disabled
pub fn is_security_enabled() -> bool {
    env::var(ENV_SECRET_STORE).map(|value| value != "false").unwrap_or(true)
}
