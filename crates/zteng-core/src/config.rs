// ── Runtime connection configuration ──
//
// These types describe *how* to reach one router. They carry credential
// data and connection tuning, but never touch disk. The CLI builds a
// `RouterConfig` (usually via zteng-config) and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use zteng_api::transport::{TlsMode, TransportConfig};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Default: routers ship self-signed certificates.
    #[default]
    DangerAcceptInvalid,
}

impl TlsVerification {
    /// Map a plain on/off flag (as stored in profiles) onto a strategy.
    pub fn from_flag(verify: bool) -> Self {
        if verify {
            Self::SystemDefaults
        } else {
            Self::DangerAcceptInvalid
        }
    }
}

/// Configuration for talking to a single router.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Router base URL (e.g., `http://192.168.0.1`).
    pub url: Url,
    /// Web UI password.
    pub password: SecretString,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl RouterConfig {
    pub fn new(url: Url, password: SecretString) -> Self {
        Self {
            url,
            password,
            tls: TlsVerification::default(),
            timeout: zteng_api::DEFAULT_TIMEOUT,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        let tls = match &self.tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        };
        TransportConfig {
            tls,
            timeout: self.timeout,
            cookie_jar: None,
        }
    }
}
