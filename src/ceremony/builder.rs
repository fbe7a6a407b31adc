//! Interactive accumulation of per-role key settings.
//!
//! Input and validation errors (bad password, duplicate key, threshold
//! above key count) are recovered by re-prompting and never propagate;
//! only prompt-transport failures escape.

use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::ceremony::types::{CeremonySession, KeyInput, Role, RoleSettingsInput};
use crate::error::Result;
use crate::keys::{key_is_duplicated, KeyLoader, Password};
use crate::prompt::Prompt;

/// Configure (or reconfigure) one role against the rest of the session.
///
/// Prompts for the key count and threshold, then fills each key slot:
/// filepath + password, load via `loader`, duplicate check against every
/// other role plus the slots already accepted for this role. A failed load
/// or a duplicate re-prompts the same slot without consuming it.
///
/// # Errors
///
/// Only prompt failures (EOF, terminal errors) are returned.
pub fn configure_role(
    prompt: &mut dyn Prompt,
    loader: &dyn KeyLoader,
    session: &CeremonySession,
    role: Role,
    out: &mut dyn Write,
) -> Result<RoleSettingsInput> {
    let num_keys = ask_count(
        prompt,
        &format!("Number of keys for the {role} role"),
        1,
        out,
    )?;
    let threshold = loop {
        let threshold = ask_count(
            prompt,
            &format!("Signature threshold for the {role} role"),
            1,
            out,
        )?;
        if threshold <= num_keys {
            break threshold;
        }
        writeln!(
            out,
            "Threshold cannot exceed the number of keys ({num_keys})."
        )?;
    };

    let mut settings = RoleSettingsInput {
        keys: Vec::with_capacity(num_keys as usize),
        threshold,
        key_type: role.key_type(),
    };

    while settings.keys.len() < num_keys as usize {
        let slot = settings.keys.len() + 1;
        let filepath = prompt.input(
            &format!("Enter the {role} key path [{slot}/{num_keys}]"),
            None,
        )?;
        let password = prompt.password(&format!("Enter the password for {filepath}"))?;

        let key = match loader.load(Path::new(&filepath), &password) {
            Ok(key) => key,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };

        let pool = session
            .settings_excluding(role)
            .chain(std::iter::once(&settings));
        if key_is_duplicated(pool, key.key_id(), &filepath) {
            writeln!(
                out,
                "Key or file already in use by another role. Choose a different key."
            )?;
            continue;
        }

        debug!(role = %role, slot, key_id = key.key_id(), "key accepted");
        settings.keys.push(KeyInput {
            filepath,
            password: Password::new(password),
            key,
        });
    }

    Ok(settings)
}

/// Prompt for a positive integer, re-asking until one is given.
fn ask_count(
    prompt: &mut dyn Prompt,
    message: &str,
    default: u32,
    out: &mut dyn Write,
) -> Result<u32> {
    loop {
        let raw = prompt.input(message, Some(&default.to_string()))?;
        match raw.trim().parse::<u32>() {
            Ok(n) if n >= 1 => return Ok(n),
            _ => writeln!(out, "Please enter a positive number.")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ceremony::types::KeyType;
    use crate::keys::{KeyLoadError, LoadedKey};
    use crate::prompt::ScriptedPrompt;
    use ed25519_dalek::SigningKey;
    use sha2::{Digest, Sha256};

    /// Deterministic loader: key material derived from the filepath, so the
    /// same path always yields the same key and distinct paths differ.
    struct PathSeededLoader {
        /// Passwords that simulate a decryption failure.
        reject_password: Option<String>,
    }

    impl KeyLoader for PathSeededLoader {
        fn load(&self, filepath: &Path, password: &str) -> Result<LoadedKey, KeyLoadError> {
            if self.reject_password.as_deref() == Some(password) {
                return Err(KeyLoadError("decryption failed".to_string()));
            }
            let seed: [u8; 32] = Sha256::digest(filepath.to_string_lossy().as_bytes()).into();
            Ok(LoadedKey::new(SigningKey::from_bytes(&seed)))
        }
    }

    fn loader() -> PathSeededLoader {
        PathSeededLoader {
            reject_password: None,
        }
    }

    fn run_role(
        prompt: &mut ScriptedPrompt,
        loader: &dyn KeyLoader,
        session: &CeremonySession,
        role: Role,
    ) -> RoleSettingsInput {
        configure_role(prompt, loader, session, role, &mut std::io::sink()).unwrap()
    }

    #[test]
    fn accepts_defaults_for_count_and_threshold() {
        let mut prompt = ScriptedPrompt::new(["", "", "root1.key", "strongPass"]);
        let session = CeremonySession::new();

        let settings = run_role(&mut prompt, &loader(), &session, Role::Root);
        assert_eq!(settings.keys.len(), 1);
        assert_eq!(settings.threshold, 1);
        assert_eq!(settings.key_type, KeyType::Offline);
        assert_eq!(settings.keys[0].filepath, "root1.key");
    }

    #[test]
    fn threshold_above_count_is_reprompted() {
        let mut prompt = ScriptedPrompt::new(["2", "3", "2", "a.key", "pw", "b.key", "pw"]);
        let session = CeremonySession::new();

        let settings = run_role(&mut prompt, &loader(), &session, Role::Targets);
        assert_eq!(settings.threshold, 2);
        assert_eq!(settings.keys.len(), 2);
    }

    #[test]
    fn zero_or_garbage_counts_are_reprompted() {
        let mut prompt = ScriptedPrompt::new(["0", "abc", "1", "", "a.key", "pw"]);
        let session = CeremonySession::new();

        let settings = run_role(&mut prompt, &loader(), &session, Role::Root);
        assert_eq!(settings.keys.len(), 1);
    }

    #[test]
    fn failed_decryption_reprompts_the_same_slot() {
        let loader = PathSeededLoader {
            reject_password: Some("wrong".to_string()),
        };
        let mut prompt =
            ScriptedPrompt::new(["", "", "a.key", "wrong", "a.key", "right"]);
        let session = CeremonySession::new();

        let settings = run_role(&mut prompt, &loader, &session, Role::Root);
        assert_eq!(settings.keys.len(), 1);
        assert_eq!(settings.keys[0].filepath, "a.key");
    }

    #[test]
    fn duplicate_within_the_same_role_is_rejected() {
        let mut prompt =
            ScriptedPrompt::new(["2", "1", "a.key", "pw", "a.key", "pw", "b.key", "pw"]);
        let session = CeremonySession::new();

        let settings = run_role(&mut prompt, &loader(), &session, Role::Root);
        let paths: Vec<_> = settings.keys.iter().map(|k| k.filepath.as_str()).collect();
        assert_eq!(paths, ["a.key", "b.key"]);
    }

    #[test]
    fn duplicate_across_roles_is_rejected() {
        let mut session = CeremonySession::new();
        let mut prompt = ScriptedPrompt::new(["", "", "shared.key", "pw"]);
        let root = run_role(&mut prompt, &loader(), &session, Role::Root);
        session.put(Role::Root, root);

        // The same file for targets is refused; a fresh one is accepted.
        let mut prompt = ScriptedPrompt::new(["", "", "shared.key", "pw", "targets.key", "pw"]);
        let targets = run_role(&mut prompt, &loader(), &session, Role::Targets);
        assert_eq!(targets.keys[0].filepath, "targets.key");
    }

    #[test]
    fn reconfigure_may_reuse_the_roles_own_previous_key() {
        let mut session = CeremonySession::new();
        let mut prompt = ScriptedPrompt::new(["", "", "snapshot1.key", "pw"]);
        let snapshot = run_role(&mut prompt, &loader(), &session, Role::Snapshot);
        session.put(Role::Snapshot, snapshot);

        // Redoing the snapshot role with the same file must succeed: the
        // settings being replaced are excluded from the duplicate pool.
        let mut prompt = ScriptedPrompt::new(["", "", "snapshot1.key", "pw"]);
        let redo = run_role(&mut prompt, &loader(), &session, Role::Snapshot);
        assert_eq!(redo.keys[0].filepath, "snapshot1.key");
    }
}
