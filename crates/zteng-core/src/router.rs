// ── Router facade ──
//
// Entry point for consumers: owns one login session and turns it into
// telemetry snapshots. Cheaply cloneable; clones share the session.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, warn};

use zteng_api::auth::Credentials;
use zteng_api::{RpcCall, SessionManager, SessionPhase};

use crate::config::RouterConfig;
use crate::error::CoreError;
use crate::telemetry::{Section, TelemetrySnapshot};

/// Handle to one router.
#[derive(Clone)]
pub struct Router {
    inner: Arc<RouterInner>,
}

struct RouterInner {
    config: RouterConfig,
    session: SessionManager,
}

impl Router {
    /// Create a router handle. Does not contact the router; the first
    /// fetch logs in.
    pub fn new(config: RouterConfig) -> Self {
        let credentials = Credentials::new(config.url.clone(), config.password.clone());
        let session = SessionManager::new(credentials, config.transport());
        Self {
            inner: Arc::new(RouterInner { config, session }),
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    /// Current login state.
    pub fn session_phase(&self) -> SessionPhase {
        self.inner.session.phase()
    }

    /// Subscribe to login state changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionPhase> {
        self.inner.session.subscribe()
    }

    /// Fetch one full telemetry snapshot.
    ///
    /// Only a failed login is fatal. The four data calls run concurrently;
    /// a call that fails leaves its section empty.
    pub async fn fetch_snapshot(&self) -> Result<TelemetrySnapshot, CoreError> {
        self.inner
            .session
            .ensure_authenticated()
            .await
            .map_err(CoreError::from)?;

        let (netinfo, thermal, device, wan) = tokio::join!(
            self.fetch_section(Section::Netinfo),
            self.fetch_section(Section::Thermal),
            self.fetch_section(Section::Device),
            self.fetch_section(Section::Wan),
        );

        let snapshot = TelemetrySnapshot::new(netinfo, thermal, device, wan);
        debug!(
            bands = %snapshot.bands_summary,
            total_bandwidth_mhz = snapshot.total_bandwidth_mhz,
            "snapshot assembled"
        );
        Ok(snapshot)
    }

    async fn fetch_section(&self, section: Section) -> Option<Value> {
        let (service, method) = section.ubus_method();
        match self.inner.session.call(&RpcCall::new(service, method)).await {
            Ok(Value::Null) => {
                debug!(%section, "section returned no data");
                None
            }
            Ok(data) => Some(data),
            Err(e) => {
                warn!(%section, error = %e, "section unavailable");
                None
            }
        }
    }
}
