//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits `key<TAB>value` lines.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use zteng_core::Metric;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Shown for a metric the router did not report.
const MISSING: &str = "-";

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, plain rendering uses `plain_fn`.
pub fn render_single<T>(
    format: &OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    plain_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(plain_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Metric rendering ─────────────────────────────────────────────────

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    name: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn metric_value(metric: &Metric) -> Option<String> {
    metric.value.as_ref().map(|v| match metric.unit {
        Some(unit) => format!("{v} {unit}"),
        None => v.to_string(),
    })
}

/// Metric table with units; missing values dimmed when colored.
pub fn render_metric_table(metrics: &[Metric], color: bool) -> String {
    let rows: Vec<MetricRow> = metrics
        .iter()
        .map(|m| {
            let value = match metric_value(m) {
                Some(v) if color => v.bold().to_string(),
                Some(v) => v,
                None if color => MISSING.dimmed().to_string(),
                None => MISSING.to_owned(),
            };
            MetricRow {
                name: m.name.to_owned(),
                value,
            }
        })
        .collect();
    render_table(&rows)
}

/// `key<TAB>value` lines, one per metric.
pub fn render_metric_plain(metrics: &[Metric]) -> String {
    metrics
        .iter()
        .map(|m| {
            let value = m
                .value
                .as_ref()
                .map_or_else(|| MISSING.to_owned(), ToString::to_string);
            format!("{}\t{value}", m.key)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use zteng_core::MetricValue;

    use super::*;

    fn metrics() -> Vec<Metric> {
        vec![
            Metric {
                key: "lte_rsrp",
                name: "LTE RSRP",
                unit: Some("dBm"),
                value: Some(MetricValue::Number(-95.0)),
            },
            Metric {
                key: "wan_ipv4",
                name: "WAN IPv4",
                unit: None,
                value: None,
            },
        ]
    }

    #[test]
    fn plain_uses_keys_and_placeholder() {
        assert_eq!(render_metric_plain(&metrics()), "lte_rsrp\t-95\nwan_ipv4\t-");
    }

    #[test]
    fn table_includes_units() {
        let table = render_metric_table(&metrics(), false);
        assert!(table.contains("LTE RSRP"));
        assert!(table.contains("-95 dBm"));
    }

    #[test]
    fn json_is_compact_on_request() {
        let out = render_single(
            &OutputFormat::JsonCompact,
            &metrics(),
            |_| String::new(),
            |_| String::new(),
        )
        .unwrap();
        assert!(!out.contains('\n'));
        assert!(out.starts_with("[{\"key\":\"lte_rsrp\""));
    }
}
