//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default, rename = "static")]
    pub static_files: StaticConfig,
    /// TLS configuration (optional - enables HTTPS when present)
    #[serde(default)]
    pub tls: Option<TlsConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to listen on
    #[serde(default = "default_host")]
    pub host: String,
    /// Listening port (overridden by the PORT environment variable)
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticConfig {
    /// Build output directory of the single-page app
    #[serde(default = "default_static_dir")]
    pub dir: PathBuf,
    /// Entry document served for unmatched routes
    #[serde(default = "default_index")]
    pub index: String,
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            dir: default_static_dir(),
            index: default_index(),
        }
    }
}

impl StaticConfig {
    pub fn index_path(&self) -> PathBuf {
        self.dir.join(&self.index)
    }
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("build")
}

fn default_index() -> String {
    "index.html".to_string()
}

/// TLS/HTTPS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TlsConfig {
    /// Path to private key file (PEM format)
    #[serde(default = "default_key_path")]
    pub key: PathBuf,
    /// Path to certificate file (PEM format)
    #[serde(default = "default_cert_path")]
    pub cert: PathBuf,
}

impl Default for TlsConfig {
    fn default() -> Self {
        Self {
            key: default_key_path(),
            cert: default_cert_path(),
        }
    }
}

fn default_key_path() -> PathBuf {
    PathBuf::from("server.key")
}

fn default_cert_path() -> PathBuf {
    PathBuf::from("server.crt")
}

impl Config {
    /// Apply the value of the PORT environment variable, if set
    pub fn apply_port_env(&mut self, value: Option<&str>) -> Result<()> {
        if let Some(raw) = value {
            let raw = raw.trim();
            if !raw.is_empty() {
                self.server.port = raw
                    .parse()
                    .with_context(|| format!("Invalid PORT value '{raw}'"))?;
            }
        }
        Ok(())
    }

    /// Listen address as host:port
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Load configuration from file
pub fn load_config(path: &Path) -> Result<Config> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse configuration {}", path.display()))?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_config(&temp_dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
        assert_eq!(config.static_files.index_path(), PathBuf::from("build/index.html"));
        assert!(config.tls.is_none());
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cubexr.toml");
        std::fs::write(
            &path,
            r#"
[server]
host = "127.0.0.1"
port = 8443

[static]
dir = "dist"

[tls]
cert = "certs/dev.crt"
"#,
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.bind_address(), "127.0.0.1:8443");
        assert_eq!(config.static_files.dir, PathBuf::from("dist"));
        assert_eq!(config.static_files.index, "index.html");

        let tls = config.tls.unwrap();
        assert_eq!(tls.cert, PathBuf::from("certs/dev.crt"));
        assert_eq!(tls.key, PathBuf::from("server.key"));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cubexr.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn test_port_env() {
        let mut config = Config::default();

        config.apply_port_env(None).unwrap();
        assert_eq!(config.server.port, 3000);

        config.apply_port_env(Some("")).unwrap();
        assert_eq!(config.server.port, 3000);

        config.apply_port_env(Some("8080")).unwrap();
        assert_eq!(config.server.port, 8080);

        assert!(config.apply_port_env(Some("eighty")).is_err());
        assert!(config.apply_port_env(Some("70000")).is_err());
        assert_eq!(config.server.port, 8080);
    }
}
