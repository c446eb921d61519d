// ── Band resolution ──
//
// Static channel-number tables for LTE (EARFCN) and NR (NR-ARFCN).
// Ranges are inclusive and checked in order; the first match wins.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::coerce;

/// One band and its inclusive channel range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BandEntry {
    pub band: u16,
    pub min: i64,
    pub max: i64,
}

const fn entry(band: u16, min: i64, max: i64) -> BandEntry {
    BandEntry { band, min, max }
}

/// LTE downlink EARFCN ranges.
pub const LTE_BANDS: &[BandEntry] = &[
    entry(1, 0, 599),
    entry(3, 1200, 1949),
    entry(4, 1950, 2399),
    entry(5, 2400, 2649),
    entry(7, 2750, 3449),
    entry(8, 3450, 3799),
    entry(20, 6150, 6449),
    entry(28, 9210, 9659),
    entry(32, 9920, 10359),
    entry(38, 37750, 38249),
    entry(40, 38650, 39649),
    entry(42, 41590, 43589),
    entry(43, 43590, 45589),
];

/// NR ARFCN ranges. n7 and n41 overlap; n7 comes first.
pub const NR_BANDS: &[BandEntry] = &[
    entry(1, 422_000, 434_000),
    entry(3, 361_000, 376_000),
    entry(5, 173_800, 178_800),
    entry(7, 524_000, 538_000),
    entry(8, 185_000, 192_000),
    entry(28, 151_600, 160_600),
    entry(40, 460_000, 480_000),
    entry(41, 499_200, 537_999),
    entry(75, 286_400, 303_400),
    entry(78, 620_000, 653_333),
    entry(79, 693_334, 733_333),
];

fn lookup(table: &[BandEntry], channel: Option<i64>) -> Option<u16> {
    let channel = channel?;
    table
        .iter()
        .find(|e| (e.min..=e.max).contains(&channel))
        .map(|e| e.band)
}

/// LTE band for an EARFCN, if it falls in a known range.
pub fn lte_band(earfcn: Option<i64>) -> Option<u16> {
    lookup(LTE_BANDS, earfcn)
}

/// NR band for an NR-ARFCN, if it falls in a known range.
pub fn nr_band(arfcn: Option<i64>) -> Option<u16> {
    lookup(NR_BANDS, arfcn)
}

// ── Band labels ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum::Display)]
#[serde(rename_all = "UPPERCASE")]
pub enum Technology {
    #[strum(to_string = "LTE")]
    Lte,
    #[strum(to_string = "NR")]
    Nr,
}

/// A resolved band, rendered as `B3` (LTE) or `N78` (NR).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Band {
    pub technology: Technology,
    pub number: u16,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.technology {
            Technology::Lte => 'B',
            Technology::Nr => 'N',
        };
        write!(f, "{prefix}{}", self.number)
    }
}

/// Primary-carrier band labels and their combined bandwidth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandSummary {
    /// Labels joined with `" + "`, or `"-"` when nothing resolved.
    pub summary: String,
    pub total_bandwidth_mhz: f64,
    pub bands: Vec<Band>,
}

struct Carrier {
    technology: Technology,
    channel_field: &'static str,
    bandwidth_field: &'static str,
    table: &'static [BandEntry],
}

const CARRIERS: [Carrier; 2] = [
    Carrier {
        technology: Technology::Lte,
        channel_field: "lte_action_channel",
        bandwidth_field: "lte_bandwidth",
        table: LTE_BANDS,
    },
    Carrier {
        technology: Technology::Nr,
        channel_field: "nr5g_action_channel",
        bandwidth_field: "nr5g_bandwidth",
        table: NR_BANDS,
    },
];

/// Summarize the primary LTE and NR carriers of a netinfo object.
///
/// A carrier counts when its channel is numeric and its bandwidth a
/// positive number. Its bandwidth is added even if the channel matches no
/// known band; only resolved bands get a label.
pub fn summarize(netinfo: &Value) -> BandSummary {
    let mut bands = Vec::new();
    let mut total = 0.0;

    for carrier in &CARRIERS {
        let channel = coerce::as_int(netinfo.get(carrier.channel_field));
        let bandwidth = coerce::as_number(netinfo.get(carrier.bandwidth_field));

        let (Some(channel), Some(bandwidth)) = (channel, bandwidth) else {
            continue;
        };
        if bandwidth <= 0.0 {
            continue;
        }

        total += bandwidth;
        if let Some(number) = lookup(carrier.table, Some(channel)) {
            bands.push(Band {
                technology: carrier.technology,
                number,
            });
        }
    }

    let summary = if bands.is_empty() {
        "-".to_owned()
    } else {
        bands
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" + ")
    };

    BandSummary {
        summary,
        total_bandwidth_mhz: total,
        bands,
    }
}
