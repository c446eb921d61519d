//! Telemetry layer between `zteng-api` and consumers (CLI, dashboards).
//!
//! - **[`Router`]** fetches a [`TelemetrySnapshot`] in one call: it logs
//!   in if needed, issues the four data calls concurrently, and degrades
//!   any failing call to an empty section.
//!
//! - **[`band`]** resolves LTE/NR channel numbers to bands and summarizes
//!   the primary carriers.
//!
//! - **[`metrics`]** is the declarative table that turns a snapshot into
//!   named, unit-tagged values.

pub mod band;
pub mod coerce;
pub mod config;
pub mod error;
pub mod metrics;
pub mod router;
pub mod telemetry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use band::{Band, BandSummary, Technology, lte_band, nr_band, summarize};
pub use config::{RouterConfig, TlsVerification};
pub use error::CoreError;
pub use metrics::{METRICS, Metric, MetricDef, MetricValue};
pub use router::Router;
pub use telemetry::{Section, TelemetrySnapshot};
pub use zteng_api::SessionPhase;
