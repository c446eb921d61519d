//! `zteng band`: offline channel → band lookup.

use serde::Serialize;

use zteng_core::{Band, Technology, lte_band, nr_band};

use crate::cli::{BandArgs, GlobalOpts, RadioTechnology};
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct BandLookup {
    technology: Technology,
    channel: i64,
    band: Option<String>,
}

fn lookup(technology: RadioTechnology, channel: i64) -> BandLookup {
    let (technology, number) = match technology {
        RadioTechnology::Lte => (Technology::Lte, lte_band(Some(channel))),
        RadioTechnology::Nr => (Technology::Nr, nr_band(Some(channel))),
    };
    BandLookup {
        technology,
        channel,
        band: number.map(|number| Band { technology, number }.to_string()),
    }
}

pub fn handle(args: &BandArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let result = lookup(args.technology, args.channel);
    if result.band.is_none() {
        tracing::info!(channel = args.channel, "channel outside every known band");
    }

    let out = output::render_single(
        &global.output,
        &result,
        |r| {
            format!(
                "{} channel {} → {}",
                r.technology,
                r.channel,
                r.band.as_deref().unwrap_or("unknown band")
            )
        },
        |r| r.band.clone().unwrap_or_else(|| "-".into()),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
