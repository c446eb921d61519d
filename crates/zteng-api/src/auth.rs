// ubus web login
//
// Salted challenge-response: fetch a one-time salt, send
// SHA256(SHA256(password) + salt), receive a ubus session id.
// Both digests are uppercase hex; the router rejects anything else.

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use url::Url;

use crate::error::Error;
use crate::rpc::{ANONYMOUS_SESSION, RpcCall, UbusClient};

const LOGIN_SERVICE: &str = "zwrt_web";
const SALT_FIELD: &str = "zte_web_sault";
const SESSION_FIELD: &str = "ubus_rpc_session";

/// Credentials for one router.
///
/// Immutable for the lifetime of a session manager; TLS handling lives
/// in [`TransportConfig`](crate::transport::TransportConfig).
#[derive(Debug, Clone)]
pub struct Credentials {
    pub base_url: Url,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(base_url: Url, password: SecretString) -> Self {
        Self { base_url, password }
    }
}

/// Uppercase hex SHA-256 of `text`.
fn sha256_upper(text: &str) -> String {
    hex::encode_upper(Sha256::digest(text.as_bytes()))
}

/// The password digest the router expects for a given salt.
pub fn login_digest(password: &str, salt: &str) -> String {
    let inner = sha256_upper(password);
    sha256_upper(&format!("{inner}{salt}"))
}

impl UbusClient {
    /// Log in with the router password and return the new session id.
    ///
    /// Both steps run under the anonymous session and are never retried;
    /// any failure along the way is reported as [`Error::Authentication`].
    pub async fn login(&self, password: &SecretString) -> Result<SecretString, Error> {
        debug!("requesting login salt");
        let info = self
            .call(ANONYMOUS_SESSION, &RpcCall::new(LOGIN_SERVICE, "web_login_info"))
            .await
            .map_err(|e| auth_failed(format!("could not retrieve login salt: {e}")))?;

        let salt = non_empty_str(&info, SALT_FIELD)
            .ok_or_else(|| auth_failed("router did not return a login salt".into()))?;

        let digest = login_digest(password.expose_secret(), salt);
        let reply = self
            .call(
                ANONYMOUS_SESSION,
                &RpcCall::new(LOGIN_SERVICE, "web_login").param("password", digest),
            )
            .await
            .map_err(|e| auth_failed(format!("login failed: {e}")))?;

        let session = non_empty_str(&reply, SESSION_FIELD)
            .ok_or_else(|| auth_failed("login failed: no session in router response".into()))?;

        info!("router login successful");
        Ok(SecretString::from(session.to_owned()))
    }
}

fn non_empty_str<'a>(data: &'a Value, field: &str) -> Option<&'a str> {
    data.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

fn auth_failed(message: String) -> Error {
    Error::Authentication { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_reference_vector() {
        assert_eq!(
            login_digest("secret", "ABCDEF"),
            "D82D6A33533518422522438D1974122B7FD0D53A54BBF46FB4D8D68D0FEC7C14"
        );
    }

    #[test]
    fn inner_hash_is_uppercase_hex() {
        assert_eq!(
            sha256_upper("secret"),
            "2BB80D537B1DA3E38BD30361AA855686BDE0EACD7162FEF6A25FE97BF527A25B"
        );
    }

    #[test]
    fn digest_is_not_a_single_salted_hash() {
        assert_ne!(login_digest("secret", "ABCDEF"), sha256_upper("secretABCDEF"));
    }

    #[test]
    fn empty_fields_are_treated_as_missing() {
        let data = serde_json::json!({ "zte_web_sault": "", "other": 5 });
        assert_eq!(non_empty_str(&data, SALT_FIELD), None);
        assert_eq!(non_empty_str(&data, "other"), None);
        assert_eq!(non_empty_str(&Value::Null, SALT_FIELD), None);
    }
}
