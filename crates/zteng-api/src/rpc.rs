// ubus JSON-RPC transport
//
// Wraps `reqwest::Client` with the router's batch-of-one envelope, the
// fixed `/ubus/` endpoint, and the browser-style headers the firmware
// expects. Session handling lives in `session`; this module only carries
// whatever session id the caller hands it.

use reqwest::header::{ACCEPT, CONTENT_TYPE, ORIGIN, REFERER};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Session id used for calls made before login.
pub const ANONYMOUS_SESSION: &str = "00000000000000000000000000000000";

/// JSON-RPC error code the router uses for "access denied / session invalid".
pub const ACCESS_DENIED: i64 = -32002;

const CONTENT_TYPE_JSON: &str = "application/json;charset=UTF-8";
const ACCEPT_JSON: &str = "application/json, text/javascript, */*; q=0.01";

/// One ubus method invocation: `service.method(params)`.
///
/// Built once per request and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcCall {
    service: String,
    method: String,
    params: Map<String, Value>,
}

impl RpcCall {
    pub fn new(service: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            method: method.into(),
            params: Map::new(),
        }
    }

    /// Add a single parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }
}

impl std::fmt::Display for RpcCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.service, self.method)
    }
}

// ── Wire envelope ────────────────────────────────────────────────────

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u32,
    method: &'static str,
    params: (&'a str, &'a str, &'a str, &'a Map<String, Value>),
}

impl<'a> RpcRequest<'a> {
    fn new(session_id: &'a str, call: &'a RpcCall) -> Self {
        Self {
            jsonrpc: "2.0",
            id: 0,
            method: "call",
            params: (session_id, &call.service, &call.method, &call.params),
        }
    }
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    error: Option<RpcFault>,
    #[serde(default)]
    result: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct RpcFault {
    code: i64,
    #[serde(default)]
    message: Option<String>,
}

/// Decode a batch reply body into the call's `data` payload.
///
/// `[{"error": {...}}]` becomes [`Error::Rpc`]; `[{"result": [0, data]}]`
/// yields `data` (or `null` when the router omits it); any other status
/// becomes [`Error::Status`].
pub(crate) fn parse_response(body: &str) -> Result<Value, Error> {
    let batch: Vec<RpcResponse> = serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.to_owned(),
        }
    })?;

    let reply = batch
        .into_iter()
        .next()
        .ok_or_else(|| Error::MalformedEnvelope("empty response batch".into()))?;

    if let Some(fault) = reply.error {
        return Err(Error::Rpc {
            code: fault.code,
            message: fault.message.unwrap_or_default(),
        });
    }

    let mut result = reply.result.unwrap_or_default().into_iter();
    match result.next().as_ref().and_then(Value::as_i64) {
        Some(0) => Ok(result.next().unwrap_or(Value::Null)),
        Some(code) => Err(Error::Status { code }),
        None => Err(Error::MalformedEnvelope("missing ubus status code".into())),
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Raw HTTP client for the router's ubus endpoint.
///
/// Holds the cookie-carrying `reqwest::Client` and the router base URL.
/// It has no notion of login state -- every call takes the session id
/// explicitly.
pub struct UbusClient {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
}

impl UbusClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (the router hands out cookies on the start page).
    pub fn new(base_url: &Url, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url: normalize_base(base_url),
            timeout_secs: config.timeout_secs(),
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: &Url) -> Self {
        Self {
            http,
            base_url: normalize_base(base_url),
            timeout_secs: crate::transport::DEFAULT_TIMEOUT.as_secs(),
        }
    }

    /// The router base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The ubus endpoint. The duplicated `t` marker mirrors what the
    /// router's own web UI sends.
    pub fn endpoint(&self) -> String {
        format!("{}/ubus/?t=1&t=2", self.base_url)
    }

    /// Load the start page so the router can set its cookies.
    ///
    /// Failure here is not fatal: login is attempted regardless.
    pub async fn prime(&self) {
        let url = format!("{}/", self.base_url);
        match self.http.get(&url).send().await {
            Ok(resp) => debug!(status = %resp.status(), "primed router session"),
            Err(e) => warn!(error = %e, "GET {url} failed"),
        }
    }

    /// Perform one ubus call with the given session id.
    ///
    /// Never retries; the caller decides what a failure means.
    pub async fn call(&self, session_id: &str, call: &RpcCall) -> Result<Value, Error> {
        debug!(%call, "ubus call");

        let request = [RpcRequest::new(session_id, call)];
        let resp = self
            .http
            .post(self.endpoint())
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON)
            .header(ACCEPT, ACCEPT_JSON)
            .header("Z-Mode", "1")
            .header(ORIGIN, self.base_url.as_str())
            .header(REFERER, format!("{}/", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%call, %status, "ubus HTTP error");
            return Err(Error::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body = resp.text().await.map_err(|e| self.transport_error(e))?;

        let result = parse_response(&body);
        match &result {
            Ok(_) => debug!(%call, "ubus call succeeded"),
            Err(Error::Rpc { code, message }) => {
                debug!(%call, code = *code, %message, "ubus error");
            }
            Err(e) => warn!(%call, error = %e, "ubus call failed"),
        }
        result
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            warn!(timeout_secs = self.timeout_secs, "ubus request timed out");
            Error::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            warn!(error = %err, "HTTP error while calling ubus");
            Error::Transport(err)
        }
    }
}

fn normalize_base(url: &Url) -> String {
    url.as_str().trim_end_matches('/').to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn request_envelope_is_a_batch_of_one() {
        let call = RpcCall::new("zwrt_web", "web_login").param("password", "ABC");
        let body = serde_json::to_value([RpcRequest::new(ANONYMOUS_SESSION, &call)]).unwrap();
        assert_eq!(
            body,
            json!([{
                "jsonrpc": "2.0",
                "id": 0,
                "method": "call",
                "params": [
                    "00000000000000000000000000000000",
                    "zwrt_web",
                    "web_login",
                    { "password": "ABC" }
                ]
            }])
        );
    }

    #[test]
    fn call_without_params_sends_empty_object() {
        let call = RpcCall::new("zwrt_bsp.thermal", "get_cpu_temp");
        let body = serde_json::to_value([RpcRequest::new("tok", &call)]).unwrap();
        assert_eq!(body[0]["params"][3], json!({}));
        assert_eq!(call.to_string(), "zwrt_bsp.thermal.get_cpu_temp");
    }

    #[test]
    fn anonymous_session_is_32_zeros() {
        assert_eq!(ANONYMOUS_SESSION.len(), 32);
        assert!(ANONYMOUS_SESSION.chars().all(|c| c == '0'));
    }

    #[test]
    fn parse_success_returns_data() {
        let data = parse_response(r#"[{"jsonrpc":"2.0","id":0,"result":[0,{"a":1}]}]"#).unwrap();
        assert_eq!(data, json!({ "a": 1 }));
    }

    #[test]
    fn parse_success_without_data_is_null() {
        assert_eq!(parse_response(r#"[{"result":[0]}]"#).unwrap(), Value::Null);
    }

    #[test]
    fn parse_nonzero_status_is_status_error() {
        let err = parse_response(r#"[{"result":[6]}]"#).unwrap_err();
        assert!(matches!(err, Error::Status { code: 6 }), "got: {err:?}");
    }

    #[test]
    fn parse_error_object_keeps_code_and_message() {
        let err =
            parse_response(r#"[{"error":{"code":-32002,"message":"Access denied"}}]"#).unwrap_err();
        assert!(err.is_session_invalid());
        match err {
            Error::Rpc { code, message } => {
                assert_eq!(code, -32002);
                assert_eq!(message, "Access denied");
            }
            other => panic!("expected Rpc error, got: {other:?}"),
        }
    }

    #[test]
    fn parse_empty_batch_is_malformed() {
        let err = parse_response("[]").unwrap_err();
        assert!(matches!(err, Error::MalformedEnvelope(_)), "got: {err:?}");
    }

    #[test]
    fn parse_missing_result_is_malformed() {
        let err = parse_response(r#"[{"jsonrpc":"2.0","id":0}]"#).unwrap_err();
        assert!(matches!(err, Error::MalformedEnvelope(_)), "got: {err:?}");
    }

    #[test]
    fn parse_garbage_is_deserialization_error() {
        let err = parse_response("<html>login</html>").unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }), "got: {err:?}");
    }

    #[test]
    fn endpoint_has_duplicate_markers_and_no_double_slash() {
        let base = Url::parse("http://192.168.0.1/").unwrap();
        let client = UbusClient::with_client(reqwest::Client::new(), &base);
        assert_eq!(client.base_url(), "http://192.168.0.1");
        assert_eq!(client.endpoint(), "http://192.168.0.1/ubus/?t=1&t=2");
    }
}
