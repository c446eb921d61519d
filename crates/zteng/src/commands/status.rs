//! `zteng status`: fetch and render one snapshot.

use std::collections::BTreeMap;

use serde::Serialize;

use zteng_core::{MetricValue, Router, TelemetrySnapshot};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Structured output: the coerced metrics next to the raw snapshot.
#[derive(Serialize)]
struct StatusReport<'a> {
    metrics: BTreeMap<&'static str, Option<MetricValue>>,
    #[serde(flatten)]
    snapshot: &'a TelemetrySnapshot,
}

/// Render one snapshot in the selected output format.
pub fn render(snapshot: &TelemetrySnapshot, global: &GlobalOpts) -> Result<String, CliError> {
    let metrics = snapshot.metrics();
    let report = StatusReport {
        metrics: metrics.iter().map(|m| (m.key, m.value.clone())).collect(),
        snapshot,
    };
    let color = output::should_color(&global.color);

    output::render_single(
        &global.output,
        &report,
        |_| output::render_metric_table(&metrics, color),
        |_| output::render_metric_plain(&metrics),
    )
}

pub async fn handle(router: &Router, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = router.fetch_snapshot().await?;

    for section in snapshot.missing_sections() {
        tracing::info!(%section, "section missing from snapshot");
    }

    let out = render(&snapshot, global)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
