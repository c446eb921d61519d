// ── Telemetry snapshot ──
//
// One poll's worth of router data: the four raw sections exactly as the
// router returned them, plus the derived band summary.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::band::{Band, BandSummary};

/// Raw data sections of a snapshot, one per ubus call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display, strum::EnumIter)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Section {
    Netinfo,
    Thermal,
    Device,
    Wan,
}

impl Section {
    /// The `(service, method)` pair that fills this section.
    pub fn ubus_method(self) -> (&'static str, &'static str) {
        match self {
            Self::Netinfo => ("zte_nwinfo_api", "nwinfo_get_netinfo"),
            Self::Thermal => ("zwrt_bsp.thermal", "get_cpu_temp"),
            Self::Device => ("zwrt_mc.device.manager", "get_device_info"),
            Self::Wan => ("zwrt_router.api", "router_get_status"),
        }
    }
}

/// Everything fetched in one poll.
///
/// A section is `None` when its call failed; the rest of the snapshot is
/// still valid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetrySnapshot {
    pub netinfo: Option<Value>,
    pub thermal: Option<Value>,
    pub device: Option<Value>,
    pub wan: Option<Value>,
    pub bands_summary: String,
    pub total_bandwidth_mhz: f64,
    pub bands: Vec<Band>,
    pub fetched_at: DateTime<Utc>,
}

impl TelemetrySnapshot {
    /// Assemble a snapshot, deriving the band summary from `netinfo`.
    pub fn new(
        netinfo: Option<Value>,
        thermal: Option<Value>,
        device: Option<Value>,
        wan: Option<Value>,
    ) -> Self {
        let BandSummary {
            summary,
            total_bandwidth_mhz,
            bands,
        } = crate::band::summarize(netinfo.as_ref().unwrap_or(&Value::Null));

        Self {
            netinfo,
            thermal,
            device,
            wan,
            bands_summary: summary,
            total_bandwidth_mhz,
            bands,
            fetched_at: Utc::now(),
        }
    }

    /// Raw data for one section, if that call succeeded.
    pub fn section(&self, section: Section) -> Option<&Value> {
        match section {
            Section::Netinfo => self.netinfo.as_ref(),
            Section::Thermal => self.thermal.as_ref(),
            Section::Device => self.device.as_ref(),
            Section::Wan => self.wan.as_ref(),
        }
    }

    /// Sections whose call failed.
    pub fn missing_sections(&self) -> Vec<Section> {
        use strum::IntoEnumIterator;
        Section::iter()
            .filter(|s| self.section(*s).is_none())
            .collect()
    }
}
