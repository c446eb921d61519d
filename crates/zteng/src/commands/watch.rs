//! `zteng watch`: poll the router until interrupted.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use zteng_core::Router;

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

use super::status;

pub async fn handle(
    router: &Router,
    args: &WatchArgs,
    profile_interval: u64,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let secs = args.interval.unwrap_or(profile_interval);
    let period: Duration = zteng_config::validate_scan_interval(secs)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    poll(router, period, args.count, global, &cancel).await
}

/// Poll every `period` until cancelled or `count` polls have run.
///
/// A failed poll is logged and the loop carries on. With a poll limit,
/// a failure on the final poll becomes the command's result.
async fn poll(
    router: &Router,
    period: Duration,
    count: Option<u64>,
    global: &GlobalOpts,
    cancel: &CancellationToken,
) -> Result<(), CliError> {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut polls: u64 = 0;
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                debug!(polls, "watch cancelled");
                return Ok(());
            }
            _ = interval.tick() => {}
        }

        polls += 1;
        let result = router.fetch_snapshot().await;
        let last = count.is_some_and(|n| polls >= n);

        match result {
            Ok(snapshot) => {
                if matches!(global.output, OutputFormat::Table) && !global.quiet {
                    println!("── {} ──", snapshot.fetched_at.format("%Y-%m-%d %H:%M:%S UTC"));
                }
                let out = status::render(&snapshot, global)?;
                output::print_output(&out, global.quiet);
            }
            Err(e) if last => return Err(e.into()),
            Err(e) => warn!(error = %e, "poll failed"),
        }

        if last {
            return Ok(());
        }
    }
}
