//! The ceremony controller.
//!
//! Sequences the full run: confirm start, gather service settings, build
//! every role, review (with per-role reconfiguration), confirm finalize,
//! then either submit + poll or save the payload for later submission.
//!
//! All operator-facing output goes through an injected writer, so tests
//! can assert on the full dialogue of a run.

pub mod builder;
pub mod payload;
pub mod types;

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Utc;
use clap::Args;
use tracing::info;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::keys::KeyLoader;
use crate::prompt::Prompt;
use self::payload::ServiceSettings;
use self::types::{render_summary, CeremonySession, Role};

/// Largest accepted number of delegated hashed bins.
const MAX_DELEGATED_BINS: u32 = 16_384;

/// Arguments for the `tufctl ceremony` command.
#[derive(Args, Debug)]
pub struct CeremonyArgs {
    /// Submit the bootstrap payload and wait for the server task,
    /// instead of saving the payload for later submission.
    #[arg(long)]
    pub bootstrap: bool,

    /// Repository service URL. Required with --bootstrap.
    #[arg(long, env = "TUFCTL_SERVER")]
    pub server: Option<String>,

    /// API bearer token.
    #[arg(long, env = "TUFCTL_TOKEN")]
    pub token: Option<String>,

    /// Where to save the payload when not bootstrapping.
    #[arg(long, default_value = "ceremony-payload.json")]
    pub save: PathBuf,

    /// Seconds to sleep between task polls.
    #[arg(long, default_value_t = 3)]
    pub poll_interval: u64,

    /// Give up after this many task polls without a terminal state.
    #[arg(long, default_value_t = 60)]
    pub poll_attempts: u32,
}

/// Run the ceremony end to end, writing the dialogue to `out`.
///
/// # Errors
///
/// Fails with [`Error::Aborted`] when the operator declines a start or
/// finalize confirmation, and with the transport/protocol errors of
/// [`ApiClient`] in bootstrap mode. Input and validation problems during
/// role building are recovered by re-prompting and do not surface here.
pub async fn run(
    args: &CeremonyArgs,
    prompt: &mut dyn Prompt,
    loader: &dyn KeyLoader,
    out: &mut dyn Write,
) -> Result<()> {
    // Fail on a bad server/token before the operator types anything.
    let client = if args.bootstrap {
        let server = args
            .server
            .as_deref()
            .ok_or_else(|| Error::Config("--server is required with --bootstrap".to_string()))?;
        Some(ApiClient::new(server, args.token.as_deref())?)
    } else {
        None
    };

    writeln!(
        out,
        "Metadata and settings ceremony for the repository's root of trust."
    )?;
    writeln!(
        out,
        "You will configure keys and thresholds for the roles: root, targets, \
         snapshot, timestamp, and the delegated bins."
    )?;
    if !prompt.confirm("Do you want to start the ceremony?", false)? {
        return Err(Error::Aborted);
    }

    let service = configure_service_settings(prompt, out)?;

    let mut session = CeremonySession::new();
    for role in Role::ALL {
        writeln!(out)?;
        writeln!(
            out,
            "Configuring the {role} role ({} keys).",
            role.key_type()
        )?;
        let settings = builder::configure_role(prompt, loader, &session, role, out)?;
        session.put(role, settings);
    }

    // Review pass: declining a role's summary reconfigures just that role.
    for role in Role::ALL {
        loop {
            if let Some(settings) = session.get(role) {
                writeln!(out)?;
                write!(out, "{}", render_summary(role, settings))?;
            }
            if prompt.confirm(&format!("Is the {role} configuration correct?"), true)? {
                break;
            }
            let redone = builder::configure_role(prompt, loader, &session, role, out)?;
            session.put(role, redone);
        }
    }

    if !prompt.confirm("Finish the ceremony with this configuration?", false)? {
        return Err(Error::Aborted);
    }

    let payload = payload::build(&session, &service, Utc::now());
    if let Some(client) = client {
        let task_id = client.bootstrap(&payload).await?;
        info!(%task_id, "bootstrap submitted");
        writeln!(out, "Bootstrap submitted; waiting for task {task_id}.")?;
        client
            .wait_for_bootstrap(
                &task_id,
                Duration::from_secs(args.poll_interval),
                args.poll_attempts,
            )
            .await?;
        writeln!(out, "Ceremony done.")?;
    } else {
        let json = serde_json::to_string_pretty(&payload)?;
        fs::write(&args.save, json)?;
        writeln!(out, "Payload saved to {}.", args.save.display())?;
        writeln!(out, "Ceremony done.")?;
    }
    Ok(())
}

/// First ceremony step: service settings, all prompted with defaults.
fn configure_service_settings(
    prompt: &mut dyn Prompt,
    out: &mut dyn Write,
) -> Result<ServiceSettings> {
    writeln!(out)?;
    writeln!(out, "Step 1: service settings.")?;
    let targets_base_url = prompt.input(
        "Base URL for the target files repository",
        Some("https://example.com/targets"),
    )?;

    let number_of_delegated_bins = loop {
        let raw = prompt.input("Number of delegated hashed bins", Some("256"))?;
        match raw.trim().parse::<u32>() {
            Ok(n) if n.is_power_of_two() && n <= MAX_DELEGATED_BINS => break n,
            _ => writeln!(out, "Bins must be a power of two up to {MAX_DELEGATED_BINS}.")?,
        }
    };

    let mut expiration_days = std::collections::BTreeMap::new();
    for role in Role::ALL {
        let default = role.default_expiration_days();
        let days = loop {
            let raw = prompt.input(
                &format!("Expiration in days for the {role} metadata"),
                Some(&default.to_string()),
            )?;
            match raw.trim().parse::<u32>() {
                Ok(n) if n >= 1 => break n,
                _ => writeln!(out, "Please enter a positive number of days.")?,
            }
        };
        expiration_days.insert(role.name().to_string(), days);
    }

    Ok(ServiceSettings {
        targets_base_url,
        number_of_delegated_bins,
        expiration_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;

    #[test]
    fn service_settings_accept_defaults() {
        // URL, bins, and five expirations - all blank.
        let mut prompt = ScriptedPrompt::new(["", "", "", "", "", "", ""]);
        let settings = configure_service_settings(&mut prompt, &mut std::io::sink()).unwrap();
        assert_eq!(settings.number_of_delegated_bins, 256);
        assert_eq!(settings.expiration_days["root"], 365);
        assert_eq!(settings.expiration_days["timestamp"], 1);
    }

    #[test]
    fn non_power_of_two_bins_are_reprompted() {
        let mut prompt = ScriptedPrompt::new(["", "100", "32768", "4", "", "", "", "", ""]);
        let mut out = Vec::new();
        let settings = configure_service_settings(&mut prompt, &mut out).unwrap();
        assert_eq!(settings.number_of_delegated_bins, 4);
        assert!(String::from_utf8(out)
            .unwrap()
            .contains("power of two"));
    }
}
