//! Config subcommand handlers.

use std::fmt::Write as _;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

const REDACTED: &str = "****";

fn format_config_redacted(cfg: &Config) -> String {
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        if let Some(ref domain) = p.amazon_domain {
            let _ = writeln!(out, "amazon_domain = \"{domain}\"");
        }
        if p.cookie.is_some() {
            let _ = writeln!(out, "cookie = \"{REDACTED}\"");
        }
        if let Some(ref env) = p.cookie_env {
            let _ = writeln!(out, "cookie_env = \"{env}\"");
        }
        if let Some(ip) = p.alexa_ip {
            let _ = writeln!(out, "alexa_ip = \"{ip}\"");
        }
        if let Some(ref base) = p.api_base {
            let _ = writeln!(out, "api_base = \"{base}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
    }

    out.trim_end().to_owned()
}

/// Mask plaintext cookies before handing the config to a serde renderer.
fn redact(mut cfg: Config) -> Config {
    for profile in cfg.profiles.values_mut() {
        if profile.cookie.is_some() {
            profile.cookie = Some(REDACTED.into());
        }
    }
    cfg
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(&config::config_path().display().to_string(), global.quiet);
            Ok(())
        }

        ConfigCommand::Show => {
            let cfg = redact(config::load_config_or_default());
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::SetDomain { domain } => {
            let domain = domain.trim().trim_start_matches("alexa.").to_owned();
            if domain.is_empty() || domain.contains('/') {
                return Err(CliError::Validation {
                    field: "domain".into(),
                    reason: "expected a bare domain such as amazon.com".into(),
                });
            }

            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            cfg.profiles
                .entry(profile_name.clone())
                .or_insert_with(Profile::default)
                .amazon_domain = Some(domain.clone());
            config::save_config(&cfg)?;

            if !global.quiet {
                eprintln!("Set amazon_domain = \"{domain}\" for profile '{profile_name}'");
            }
            Ok(())
        }

        ConfigCommand::SetCookie { plaintext } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let cookie = rpassword::prompt_password("Cookie: ").map_err(prompt_err)?;
            let cookie = cookie.trim();
            if cookie.is_empty() {
                return Err(CliError::Validation {
                    field: "cookie".into(),
                    reason: "value cannot be empty".into(),
                });
            }

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            if plaintext {
                profile.cookie = Some(cookie.to_owned());
                config::save_config(&cfg)?;
                if !global.quiet {
                    eprintln!("Cookie saved to {}", config::config_path().display());
                }
            } else {
                alexa_plug_config::store_cookie(&profile_name, cookie)?;
                // Keyring wins over plaintext, but drop the stale copy anyway.
                if profile.cookie.take().is_some() {
                    config::save_config(&cfg)?;
                }
                if !global.quiet {
                    eprintln!("Cookie stored in system keyring for profile '{profile_name}'");
                }
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacted_view_masks_cookie() {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "home".into(),
            Profile {
                amazon_domain: Some("amazon.co.jp".into()),
                cookie: Some("session-id=secret".into()),
                ..Profile::default()
            },
        );

        let text = format_config_redacted(&cfg);
        assert!(text.contains("[profiles.home]"));
        assert!(text.contains("amazon_domain = \"amazon.co.jp\""));
        assert!(text.contains("cookie = \"****\""));
        assert!(!text.contains("secret"));

        let masked = redact(cfg);
        assert_eq!(masked.profiles["home"].cookie.as_deref(), Some(REDACTED));
    }
}
