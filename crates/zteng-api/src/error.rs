use thiserror::Error;

use crate::rpc::ACCESS_DENIED;

/// Top-level error type for the `zteng-api` crate.
///
/// Covers every failure mode of a ubus exchange: authentication, HTTP
/// transport, the JSON-RPC envelope, and router-reported faults.
/// `zteng-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed (no salt, no session in the login response, wrong password).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// The router answered with a non-2xx HTTP status.
    #[error("Router returned HTTP {status}")]
    HttpStatus { status: u16 },

    // ── ubus ────────────────────────────────────────────────────────
    /// JSON-RPC error object (`{"error": {"code": N, "message": "..."}}`).
    #[error("ubus error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// The call went through but the ubus status code was non-zero.
    #[error("ubus call returned status {code}")]
    Status { code: i64 },

    /// The response parsed as JSON but not as a ubus batch reply.
    #[error("Malformed ubus response: {0}")]
    MalformedEnvelope(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the router rejected the session (`-32002`),
    /// i.e. a fresh login might resolve it.
    pub fn is_session_invalid(&self) -> bool {
        matches!(self, Self::Rpc { code, .. } if *code == ACCESS_DENIED)
    }

    /// The JSON-RPC or ubus status code, if the router reported one.
    pub fn rpc_code(&self) -> Option<i64> {
        match self {
            Self::Rpc { code, .. } | Self::Status { code } => Some(*code),
            _ => None,
        }
    }
}
