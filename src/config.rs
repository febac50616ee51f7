//! Typed configuration: TLS material and TOML scenario files.
//!
//! A scenario file carries everything a scheduler needs to prepare one
//! dispatcher:
//!
//! ```toml
//! descriptor = "capability=pubsub,target=dapr,method=publish,store=memstore,topic=mytopic"
//! payload = "hello world"
//! iterations = 100
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tonic::transport::{Certificate, Channel, Identity, ServerTlsConfig};

use crate::dispatch::CapabilityDispatcher;
use crate::error::{ConfigError, Result};

/// Server-side TLS material, loaded from PEM files.
///
/// Presence of a client CA turns on mutual TLS. These are configuration
/// knobs with no further protocol semantics.
#[derive(Debug, Clone, Default)]
pub struct TlsOptions {
    /// Server certificate chain (PEM).
    pub cert_path: Option<PathBuf>,
    /// Server private key (PEM).
    pub key_path: Option<PathBuf>,
    /// CA bundle used to verify client certificates (PEM); enables mTLS.
    pub client_ca_path: Option<PathBuf>,
}

impl TlsOptions {
    /// Returns `true` when both a certificate and a key are configured.
    pub fn enabled(&self) -> bool {
        self.cert_path.is_some() && self.key_path.is_some()
    }

    /// Returns `true` when client certificates will be required.
    pub fn mutual(&self) -> bool {
        self.client_ca_path.is_some()
    }

    pub(crate) fn server_config(&self) -> Result<ServerTlsConfig, ConfigError> {
        let (Some(cert_path), Some(key_path)) = (&self.cert_path, &self.key_path) else {
            return Err(ConfigError::Tls {
                message: "both cert and key are required".to_string(),
            });
        };
        let cert = read_pem(cert_path)?;
        let key = read_pem(key_path)?;
        let mut tls = ServerTlsConfig::new().identity(Identity::from_pem(cert, key));
        if let Some(ca_path) = &self.client_ca_path {
            let ca = read_pem(ca_path)?;
            tls = tls.client_ca_root(Certificate::from_pem(ca));
        }
        Ok(tls)
    }
}

fn read_pem(path: &Path) -> Result<Vec<u8>, ConfigError> {
    std::fs::read(path).map_err(|e| ConfigError::Tls {
        message: format!("failed to read '{}': {e}", path.display()),
    })
}

/// One test scenario loaded from a TOML file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioConfig {
    /// The capability descriptor string.
    pub descriptor: String,
    /// Payload sent with each request; empty by default.
    #[serde(default)]
    pub payload: String,
    /// How many times the scheduler should run the prepared request.
    #[serde(default = "default_iterations")]
    pub iterations: u64,
}

fn default_iterations() -> u64 {
    1
}

impl ScenarioConfig {
    /// Loads and validates a scenario file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::ScenarioIo {
            source,
            path: path.display().to_string(),
        })?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Semantic validation beyond TOML well-formedness.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.descriptor.trim().is_empty() {
            return Err(ConfigError::ScenarioValidation {
                message: "descriptor must not be empty".to_string(),
            });
        }
        if self.iterations == 0 {
            return Err(ConfigError::ScenarioValidation {
                message: "iterations must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Prepares a dispatcher for this scenario over an established channel.
    pub async fn into_dispatcher(self, channel: Channel) -> Result<CapabilityDispatcher> {
        CapabilityDispatcher::prepare(&self.descriptor, channel, self.payload.as_bytes()).await
    }
}
