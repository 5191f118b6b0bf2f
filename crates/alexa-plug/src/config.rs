//! CLI configuration -- flag overrides layered on `alexa_plug_config`.

use secrecy::SecretString;

use alexa_plug_api::SessionConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use alexa_plug_config::{
    Config, Profile, config_path, load_config_or_default, save_config,
};

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `SessionConfig` from the config file, profile, and CLI overrides.
///
/// Flags win over profile values. Without a stored profile the flags alone
/// must supply the cookie and domain, unless `--profile` named one that
/// doesn't exist.
pub fn build_session_config(global: &GlobalOpts) -> Result<SessionConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.profile.is_some() => {
            let mut available: Vec<&str> = cfg.profiles.keys().map(String::as_str).collect();
            available.sort_unstable();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => Profile::default(),
    };

    let merged = apply_overrides(profile, global, cfg.defaults.timeout);
    let cookie = global.cookie.clone().map(SecretString::from);
    Ok(alexa_plug_config::profile_to_session_config(
        &merged,
        &profile_name,
        cookie,
    )?)
}

fn apply_overrides(mut profile: Profile, global: &GlobalOpts, default_timeout: u64) -> Profile {
    if let Some(ref domain) = global.domain {
        profile.amazon_domain = Some(domain.clone());
    }
    if let Some(ip) = global.alexa_ip {
        profile.alexa_ip = Some(ip);
    }
    if let Some(ref base) = global.api_base {
        profile.api_base = Some(base.clone());
    }
    profile.timeout = global.timeout.or(profile.timeout).or(Some(default_timeout));
    profile
}
