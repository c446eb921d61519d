// ── Core error types ──
//
// User-facing errors from zteng-core. Consumers never match on HTTP
// status codes or envelope details; the `From<zteng_api::Error>` impl
// folds transport-layer errors into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to router at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Router connection timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Router errors ────────────────────────────────────────────────
    #[error("Router error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Unexpected router response: {message}")]
    Protocol { message: String },
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<zteng_api::Error> for CoreError {
    fn from(err: zteng_api::Error) -> Self {
        match err {
            zteng_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            zteng_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(ToString::to_string)
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                }
            }
            zteng_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            zteng_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            zteng_api::Error::HttpStatus { status } => CoreError::Protocol {
                message: format!("HTTP {status} from ubus endpoint"),
            },
            zteng_api::Error::Rpc { code, message } => CoreError::Rpc { code, message },
            zteng_api::Error::Status { code } => CoreError::Rpc {
                code,
                message: "non-zero ubus status".into(),
            },
            zteng_api::Error::MalformedEnvelope(message) => CoreError::Protocol { message },
            zteng_api::Error::Deserialization { message, body: _ } => {
                CoreError::Protocol { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_maps_to_authentication_failed() {
        let err = CoreError::from(zteng_api::Error::Authentication {
            message: "no salt".into(),
        });
        assert!(
            matches!(err, CoreError::AuthenticationFailed { ref message } if message == "no salt")
        );
    }

    #[test]
    fn rpc_code_is_preserved() {
        let err = CoreError::from(zteng_api::Error::Rpc {
            code: -32601,
            message: "Method not found".into(),
        });
        assert!(matches!(err, CoreError::Rpc { code: -32601, .. }));
    }

    #[test]
    fn api_timeout_keeps_duration() {
        let err = CoreError::from(zteng_api::Error::Timeout { timeout_secs: 10 });
        assert!(matches!(err, CoreError::Timeout { timeout_secs: 10 }));
    }
}
