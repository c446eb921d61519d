//! Command handlers, one module per top-level subcommand.

pub mod band;
pub mod config_cmd;
pub mod status;
pub mod watch;
