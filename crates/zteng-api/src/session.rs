// Session manager
//
// Owns the router login state and repairs it reactively: the firmware
// expires sessions on its own schedule and reports it as `-32002`, so
// every call is wrapped in a single re-login-and-retry.

use std::future::Future;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tokio::sync::{Mutex, watch};
use tracing::{debug, error, warn};

use crate::auth::Credentials;
use crate::error::Error;
use crate::rpc::{RpcCall, UbusClient};
use crate::transport::TransportConfig;

/// Login state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

#[derive(Default)]
struct SessionState {
    client: Option<Arc<UbusClient>>,
    token: Option<SecretString>,
    /// Bumped on every successful login. An access-denied reply only
    /// clears the session it was issued against.
    generation: u64,
}

/// Everything one call needs from the current session.
struct Ticket {
    client: Arc<UbusClient>,
    token: SecretString,
    generation: u64,
}

/// Run `attempt`; if the router rejected the session, run `recover` once
/// and `attempt` once more with what `recover` produced.
///
/// The first attempt gets `None`. A second rejection, or a failing
/// `recover`, is returned as-is. Any other error is returned without
/// retrying.
pub async fn with_reauth<T, K, A, AFut, R, RFut>(mut attempt: A, recover: R) -> Result<T, Error>
where
    A: FnMut(Option<K>) -> AFut,
    AFut: Future<Output = Result<T, Error>>,
    R: FnOnce() -> RFut,
    RFut: Future<Output = Result<K, Error>>,
{
    match attempt(None).await {
        Err(e) if e.is_session_invalid() => {
            warn!("access denied, attempting re-login");
            match recover().await {
                Ok(fresh) => attempt(Some(fresh)).await,
                Err(err) => {
                    error!(error = %err, "re-login failed");
                    Err(err)
                }
            }
        }
        other => other,
    }
}

/// Marks the session as `Authenticating` for the length of one login.
///
/// Dropped without [`succeed`](Self::succeed), e.g. when the caller's
/// future is cancelled mid-login, it resets the phase to `Unauthenticated`.
struct LoginAttempt<'a> {
    phase: &'a watch::Sender<SessionPhase>,
    settled: bool,
}

impl<'a> LoginAttempt<'a> {
    fn begin(phase: &'a watch::Sender<SessionPhase>) -> Self {
        phase.send_replace(SessionPhase::Authenticating);
        Self {
            phase,
            settled: false,
        }
    }

    fn succeed(mut self) {
        self.settled = true;
        self.phase.send_replace(SessionPhase::Authenticated);
    }
}

impl Drop for LoginAttempt<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.phase.send_replace(SessionPhase::Unauthenticated);
        }
    }
}

/// Single login session against one router.
///
/// Session state sits behind an async mutex that is held for the whole
/// login exchange, so concurrent callers that all see an expired session
/// wait for one login and share its token.
pub struct SessionManager {
    credentials: Credentials,
    transport: TransportConfig,
    state: Mutex<SessionState>,
    phase: watch::Sender<SessionPhase>,
}

impl SessionManager {
    /// Create an unauthenticated session manager. Does NOT contact the
    /// router -- the first call (or [`ensure_authenticated`](Self::ensure_authenticated))
    /// logs in.
    pub fn new(credentials: Credentials, transport: TransportConfig) -> Self {
        let (phase, _) = watch::channel(SessionPhase::Unauthenticated);
        Self {
            credentials,
            transport,
            state: Mutex::new(SessionState::default()),
            phase,
        }
    }

    /// The router base URL.
    pub fn base_url(&self) -> &url::Url {
        &self.credentials.base_url
    }

    /// Current login state.
    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    /// Subscribe to login state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.phase.subscribe()
    }

    /// Log in unless a session is already established.
    pub async fn ensure_authenticated(&self) -> Result<(), Error> {
        self.ticket().await.map(|_| ())
    }

    /// Drop the current session; the next call logs in from scratch.
    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        Self::clear(&mut state, &self.phase);
    }

    /// Call a ubus method with the current session, logging in first if
    /// needed and recovering once from an expired session.
    ///
    /// The retry runs on the session the recovery produced, so one call
    /// never logs in more than twice.
    pub async fn call(&self, rpc: &RpcCall) -> Result<Value, Error> {
        let this = self;
        with_reauth(
            move |fresh| this.call_once(rpc, fresh),
            move || this.ticket(),
        )
        .await
    }

    async fn call_once(&self, rpc: &RpcCall, fresh: Option<Ticket>) -> Result<Value, Error> {
        let ticket = match fresh {
            Some(ticket) => ticket,
            None => self.ticket().await?,
        };
        let result = ticket
            .client
            .call(ticket.token.expose_secret(), rpc)
            .await;

        if matches!(&result, Err(e) if e.is_session_invalid()) {
            self.invalidate_generation(ticket.generation).await;
        }
        result
    }

    /// Return the live session, logging in if there is none.
    async fn ticket(&self) -> Result<Ticket, Error> {
        let mut state = self.state.lock().await;

        if let (Some(client), Some(token)) = (&state.client, &state.token) {
            return Ok(Ticket {
                client: Arc::clone(client),
                token: token.clone(),
                generation: state.generation,
            });
        }

        let attempt = LoginAttempt::begin(&self.phase);
        match self.establish().await {
            Ok((client, token)) => {
                state.generation += 1;
                state.client = Some(Arc::clone(&client));
                state.token = Some(token.clone());
                attempt.succeed();
                debug!(generation = state.generation, "session established");
                Ok(Ticket {
                    client,
                    token,
                    generation: state.generation,
                })
            }
            Err(e) => {
                Self::clear(&mut state, &self.phase);
                Err(e)
            }
        }
    }

    /// Fresh cookie jar, start page, login.
    async fn establish(&self) -> Result<(Arc<UbusClient>, SecretString), Error> {
        let client = Arc::new(UbusClient::new(
            &self.credentials.base_url,
            &self.transport,
        )?);
        client.prime().await;
        let token = client.login(&self.credentials.password).await?;
        Ok((client, token))
    }

    async fn invalidate_generation(&self, generation: u64) {
        let mut state = self.state.lock().await;
        if state.generation == generation && state.token.is_some() {
            debug!(generation, "session rejected by router");
            Self::clear(&mut state, &self.phase);
        }
    }

    fn clear(state: &mut SessionState, phase: &watch::Sender<SessionPhase>) {
        state.client = None;
        state.token = None;
        phase.send_replace(SessionPhase::Unauthenticated);
    }
}
