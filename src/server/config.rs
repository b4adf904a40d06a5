//! Server configuration
//!
//! Loads static settings from config.toml with environment overrides.
//! Every value has a built-in default; all values are fixed at startup.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Server configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// IP address to bind the listening socket
    pub bind_address: String,

    /// Port for the listening socket
    pub port: u16,

    /// Maximum concurrent chat clients
    pub max_clients: usize,

    /// Display names longer than this many bytes are truncated at admission
    pub max_name_length: usize,

    /// Messages longer than this many bytes are truncated before broadcast
    pub max_message_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 8080,
            max_clients: 10,
            max_name_length: 49,
            max_message_length: 1024,
        }
    }
}

impl ServerConfig {
    /// Load configuration from config.toml with environment overrides.
    ///
    /// Both sources are optional; defaults cover every value.
    /// Environment variables use the RAX_CHAT prefix, e.g. RAX_CHAT_PORT.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();

        let settings = Config::builder()
            .set_default("bind_address", defaults.bind_address)?
            .set_default("port", defaults.port as i64)?
            .set_default("max_clients", defaults.max_clients as i64)?
            .set_default("max_name_length", defaults.max_name_length as i64)?
            .set_default("max_message_length", defaults.max_message_length as i64)?
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("RAX_CHAT").try_parsing(true))
            .build()?;

        let config: ServerConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Bind address and port as a socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::Message("port cannot be 0".into()));
        }

        if self.max_clients == 0 {
            return Err(ConfigError::Message(
                "max_clients must be greater than 0".into(),
            ));
        }

        if self.max_name_length == 0 {
            return Err(ConfigError::Message(
                "max_name_length must be greater than 0".into(),
            ));
        }

        if self.max_message_length == 0 {
            return Err(ConfigError::Message(
                "max_message_length must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}
