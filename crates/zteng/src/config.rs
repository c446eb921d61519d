//! CLI configuration: thin wrapper around `zteng_config`.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--router, --password, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use zteng_core::{RouterConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use zteng_config::{Config, Profile, config_path, load_config_or_default, save_config};

/// A router connection plus the polling interval that goes with it.
#[derive(Debug)]
pub struct Resolved {
    pub profile_name: String,
    pub router: RouterConfig,
    pub scan_interval: u64,
}

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Comma-separated profile names, for error help text.
pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<_> = config.profiles.keys().cloned().collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort();
    names.join(", ")
}

/// Build the router connection from config, profile and CLI overrides.
///
/// Without a matching profile, `--router` and a password (flag or
/// `ZTENG_PASSWORD`) are enough.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<Resolved, CliError> {
    let profile_name = active_profile_name(global, cfg);
    let defaults = &cfg.defaults;

    let Some(profile) = cfg.profiles.get(&profile_name) else {
        if global.profile.is_some() {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(cfg),
            });
        }
        return resolve_without_profile(global, cfg, profile_name);
    };

    // 1. Start from the profile, then apply flag overrides
    let mut router = if global.router.is_some() || global.password.is_some() {
        let mut overridden = profile.clone();
        if let Some(ref url) = global.router {
            overridden.router.clone_from(url);
        }
        if let Some(ref pw) = global.password {
            overridden.password = Some(pw.clone());
            overridden.password_env = None;
        }
        zteng_config::profile_to_router_config(&overridden, &profile_name, defaults)?
    } else {
        zteng_config::profile_to_router_config(profile, &profile_name, defaults)?
    };

    // 2. TLS: --insecure wins over everything
    if global.insecure {
        router.tls = TlsVerification::DangerAcceptInvalid;
    }

    // 3. Timeout (flag > profile > defaults)
    if let Some(secs) = global.timeout {
        router.timeout = Duration::from_secs(secs);
    }

    Ok(Resolved {
        profile_name,
        router,
        scan_interval: profile.scan_interval.unwrap_or(defaults.scan_interval),
    })
}

fn resolve_without_profile(
    global: &GlobalOpts,
    cfg: &Config,
    profile_name: String,
) -> Result<Resolved, CliError> {
    let url_str = global.router.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url = zteng_config::parse_router_url(url_str)?;

    let password = match global.password {
        Some(ref pw) => SecretString::from(pw.clone()),
        None => zteng_config::resolve_password(&Profile::new(url_str), &profile_name)?,
    };

    let mut router = RouterConfig::new(url, password);
    router.tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::from_flag(cfg.defaults.verify_tls)
    };
    router.timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout));

    Ok(Resolved {
        profile_name,
        router,
        scan_interval: cfg.defaults.scan_interval,
    })
}
