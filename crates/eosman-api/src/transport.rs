// HTTP client settings shared by every eAPI client.
//
// Switches in one inventory are reached with the same TLS policy and
// request timeout, so one `TransportConfig` builds all their clients.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Error;

/// How switch certificates are checked.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    System,
    /// Trust the CA certificate in the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate. EOS ships with a self-signed one.
    #[default]
    DangerAcceptInvalid,
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    /// Whole-request timeout, including the switch's command execution.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("eosman/", env!("CARGO_PKG_VERSION")));

        let builder = match self.tls {
            TlsMode::System => builder,
            TlsMode::CustomCa(ref path) => builder.add_root_certificate(load_ca(path)?),
            TlsMode::DangerAcceptInvalid => builder.danger_accept_invalid_certs(true),
        };

        builder.build().map_err(Error::Transport)
    }
}

fn load_ca(path: &Path) -> Result<reqwest::Certificate, Error> {
    let pem = std::fs::read(path)
        .map_err(|e| Error::Tls(format!("failed to read CA cert {}: {e}", path.display())))?;
    reqwest::Certificate::from_pem(&pem).map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))
}
