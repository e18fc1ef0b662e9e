//! Configuration loading
//!
//! Resolution priority for overridable values:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Clap handles 1 and 2 per flag; the TOML file fills in everything else.

use crate::{Error, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Command-line arguments shared by deployment scripts.
#[derive(Debug, Parser, Default)]
#[command(name = "meshmap-nt", about = "MeshMap live node tracker")]
pub struct Args {
    /// Path to a TOML configuration file
    #[arg(long, env = "MESHMAP_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP port to listen on
    #[arg(long, env = "MESHMAP_PORT")]
    pub port: Option<u16>,

    /// MQTT topic filter to subscribe to
    #[arg(long, env = "MESHMAP_TOPIC")]
    pub topic: Option<String>,
}

/// Full service configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub http: HttpConfig,
    pub mqtt: MqttConfig,
    pub inventory: InventoryConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
    /// Directory of static frontend files, served with an index.html fallback.
    pub public_dir: PathBuf,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0".to_string(),
            port: 3000,
            public_dir: PathBuf::from("public"),
        }
    }
}

/// Broker connection settings for the transport subscriber.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    /// The process id is appended to keep concurrent deployments distinct.
    pub client_id_prefix: String,
    pub topic: String,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: "mqtt.meshtastic.org".to_string(),
            port: 1883,
            username: "meshdev".to_string(),
            password: "large4cats".to_string(),
            client_id_prefix: "meshmap_live".to_string(),
            topic: "msh/US/#".to_string(),
        }
    }
}

/// External inventory sources, tried in order.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    pub sources: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                "https://meshmap.net/nodes.json".to_string(),
                "https://meshtastic.liamcottle.net/api/nodes".to_string(),
                "https://api.meshtastic.org/nodes".to_string(),
            ],
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Load configuration, applying the resolution priority above.
    pub fn load(args: &Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Config::default(),
        };

        if let Some(port) = args.port {
            config.http.port = port;
        }
        if let Some(topic) = &args.topic {
            config.mqtt.topic = topic.clone();
        }

        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}
