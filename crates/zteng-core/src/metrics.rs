// ── Metric table ──
//
// Declarative mapping from snapshot fields to named, unit-tagged values.
// Hosts iterate `METRICS` (or call `TelemetrySnapshot::metrics`) instead
// of hand-writing a lookup per value.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::coerce;
use crate::telemetry::{Section, TelemetrySnapshot};

/// Where a metric's raw value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// A field of one raw section.
    Field(Section, &'static str),
    /// The derived band summary string.
    BandsSummary,
    /// The derived total bandwidth.
    TotalBandwidth,
}

/// How a raw value is turned into a metric value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Number,
    Text,
    /// Text, with the router's radio mode codes spelled out.
    ConnectionType,
}

/// One metric definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricDef {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub source: Source,
    pub coercion: Coercion,
}

const fn netinfo_number(
    key: &'static str,
    name: &'static str,
    unit: Option<&'static str>,
    field: &'static str,
) -> MetricDef {
    MetricDef {
        key,
        name,
        unit,
        source: Source::Field(Section::Netinfo, field),
        coercion: Coercion::Number,
    }
}

const DBM: Option<&str> = Some("dBm");
const DB: Option<&str> = Some("dB");

/// Every metric a snapshot exposes, in display order.
pub const METRICS: &[MetricDef] = &[
    MetricDef {
        key: "network_provider",
        name: "Network Provider",
        unit: None,
        source: Source::Field(Section::Netinfo, "network_provider_fullname"),
        coercion: Coercion::Text,
    },
    MetricDef {
        key: "connection_type",
        name: "Connection Type",
        unit: None,
        source: Source::Field(Section::Netinfo, "network_type"),
        coercion: Coercion::ConnectionType,
    },
    MetricDef {
        key: "bands_summary",
        name: "Bands",
        unit: None,
        source: Source::BandsSummary,
        coercion: Coercion::Text,
    },
    MetricDef {
        key: "total_bandwidth",
        name: "Total Bandwidth",
        unit: Some("MHz"),
        source: Source::TotalBandwidth,
        coercion: Coercion::Number,
    },
    netinfo_number("lte_pci", "LTE PCI", None, "lte_pci"),
    netinfo_number("lte_earfcn", "LTE EARFCN", None, "lte_action_channel"),
    netinfo_number("lte_rsrp", "LTE RSRP", DBM, "lte_rsrp"),
    netinfo_number("lte_rsrq", "LTE RSRQ", DB, "lte_rsrq"),
    netinfo_number("lte_sinr", "LTE SINR", DB, "lte_snr"),
    netinfo_number("lte_rssi", "LTE RSSI", DBM, "lte_rssi"),
    netinfo_number("nr_pci", "NR PCI", None, "nr5g_pci"),
    netinfo_number("nr_arfcn", "NR ARFCN", None, "nr5g_action_channel"),
    netinfo_number("nr_rsrp", "NR RSRP", DBM, "nr5g_rsrp"),
    netinfo_number("nr_rsrq", "NR RSRQ", DB, "nr5g_rsrq"),
    netinfo_number("nr_sinr", "NR SINR", DB, "nr5g_snr"),
    netinfo_number("nr_rssi", "NR RSSI", DBM, "nr5g_rssi"),
    MetricDef {
        key: "wan_ipv4",
        name: "WAN IPv4",
        unit: None,
        source: Source::Field(Section::Wan, "mwan_wanlan1_wan_ipaddr"),
        coercion: Coercion::Text,
    },
    MetricDef {
        key: "cpu_temp",
        name: "CPU Temperature",
        unit: Some("°C"),
        source: Source::Field(Section::Thermal, "cpuss_temp"),
        coercion: Coercion::Number,
    },
    MetricDef {
        key: "uptime",
        name: "Device Uptime",
        unit: Some("s"),
        source: Source::Field(Section::Device, "device_uptime"),
        coercion: Coercion::Number,
    },
];

/// Look up a metric definition by key.
pub fn find(key: &str) -> Option<&'static MetricDef> {
    METRICS.iter().find(|def| def.key == key)
}

// ── Values ───────────────────────────────────────────────────────────

/// A coerced metric value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// A metric definition paired with its value in one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
    pub value: Option<MetricValue>,
}

fn connection_type(raw: &str) -> String {
    match raw {
        "SA" => "5G SA".to_owned(),
        "ENDC" => "5G NSA".to_owned(),
        other => other.to_owned(),
    }
}

impl MetricDef {
    /// Evaluate this metric against a snapshot.
    pub fn evaluate(&self, snapshot: &TelemetrySnapshot) -> Option<MetricValue> {
        match self.source {
            Source::BandsSummary => Some(MetricValue::Text(snapshot.bands_summary.clone())),
            Source::TotalBandwidth => Some(MetricValue::Number(snapshot.total_bandwidth_mhz)),
            Source::Field(section, field) => {
                let raw = coerce::field(snapshot.section(section), field);
                self.coerce(raw)
            }
        }
    }

    fn coerce(&self, raw: Option<&Value>) -> Option<MetricValue> {
        match self.coercion {
            Coercion::Number => coerce::as_number(raw).map(MetricValue::Number),
            Coercion::Text => coerce::as_text(raw).map(MetricValue::Text),
            Coercion::ConnectionType => coerce::as_text(raw)
                .map(|t| connection_type(&t))
                .map(MetricValue::Text),
        }
    }
}

impl TelemetrySnapshot {
    /// Value of one metric by key; `None` for unknown keys or missing data.
    pub fn metric(&self, key: &str) -> Option<MetricValue> {
        find(key)?.evaluate(self)
    }

    /// Every metric in table order, with missing values as `None`.
    pub fn metrics(&self) -> Vec<Metric> {
        METRICS
            .iter()
            .map(|def| Metric {
                key: def.key,
                name: def.name,
                unit: def.unit,
                value: def.evaluate(self),
            })
            .collect()
    }
}
