// zteng-api: Async Rust client for the ZTE 5G router ubus JSON-RPC API

pub mod auth;
pub mod error;
pub mod rpc;
pub mod session;
pub mod transport;

pub use auth::{Credentials, login_digest};
pub use error::Error;
pub use rpc::{ACCESS_DENIED, ANONYMOUS_SESSION, RpcCall, UbusClient};
pub use session::{SessionManager, SessionPhase, with_reauth};
pub use transport::{DEFAULT_TIMEOUT, TlsMode, TransportConfig};
