//! Core data model for the ceremony session.

use std::fmt;

use serde::Serialize;

use crate::keys::{LoadedKey, Password};

/// A named responsibility in the metadata trust hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Role {
    /// Root of trust; signs the role/key policy itself.
    Root,
    /// Signs the target-file index.
    Targets,
    /// Signs the snapshot of all metadata versions.
    Snapshot,
    /// Signs the freshness proof.
    Timestamp,
    /// Delegated hashed-bin targets roles.
    Bins,
}

impl Role {
    /// The fixed role set, in ceremony order.
    pub const ALL: [Role; 5] = [
        Role::Root,
        Role::Targets,
        Role::Snapshot,
        Role::Timestamp,
        Role::Bins,
    ];

    /// Lowercase role name as used by the server.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Role::Root => "root",
            Role::Targets => "targets",
            Role::Snapshot => "snapshot",
            Role::Timestamp => "timestamp",
            Role::Bins => "bins",
        }
    }

    /// Whether this role's keys are held offline by operators or online by
    /// the running service. Display/policy only; load and validation logic
    /// is identical for both.
    #[must_use]
    pub fn key_type(self) -> KeyType {
        match self {
            Role::Root | Role::Targets => KeyType::Offline,
            Role::Snapshot | Role::Timestamp | Role::Bins => KeyType::Online,
        }
    }

    /// Default metadata expiration in days.
    #[must_use]
    pub fn default_expiration_days(self) -> u32 {
        match self {
            Role::Root | Role::Targets => 365,
            Role::Snapshot | Role::Timestamp | Role::Bins => 1,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Custody model of a role's keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyType {
    /// Held by operators outside the service.
    Offline,
    /// Held by the running service for automated signing.
    Online,
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyType::Offline => f.write_str("offline"),
            KeyType::Online => f.write_str("online"),
        }
    }
}

/// One accepted key slot: where it came from, how to decrypt it again,
/// and the decrypted material.
#[derive(Debug)]
pub struct KeyInput {
    /// Path the operator entered; also part of the dedup identity.
    pub filepath: String,
    /// Key-file password. Never echoed, logged, or serialized.
    pub password: Password,
    /// Decrypted signing key and derived identity.
    pub key: LoadedKey,
}

/// Finalized settings for one role.
#[derive(Debug)]
pub struct RoleSettingsInput {
    /// Accepted key slots, in entry order.
    pub keys: Vec<KeyInput>,
    /// Minimum number of signatures required; `<= keys.len()`.
    pub threshold: u32,
    /// Custody model tag.
    pub key_type: KeyType,
}

/// The ordered, growing collection of per-role settings for one ceremony
/// run. Created at start, mutated as each role is configured, consumed once
/// into the bootstrap payload.
#[derive(Debug, Default)]
pub struct CeremonySession {
    roles: Vec<(Role, RoleSettingsInput)>,
}

impl CeremonySession {
    /// Start an empty session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a finalized role. Replaces the previous settings if the role
    /// was already configured (the reconfigure pass), leaving every other
    /// role untouched.
    pub fn put(&mut self, role: Role, settings: RoleSettingsInput) {
        if let Some(slot) = self.roles.iter_mut().find(|(r, _)| *r == role) {
            slot.1 = settings;
        } else {
            self.roles.push((role, settings));
        }
    }

    /// Settings for one role, if configured.
    #[must_use]
    pub fn get(&self, role: Role) -> Option<&RoleSettingsInput> {
        self.roles
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, s)| s)
    }

    /// All configured roles, in configuration order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &RoleSettingsInput)> {
        self.roles.iter().map(|(r, s)| (*r, s))
    }

    /// The flat pool of settings the duplicate detector scans when the
    /// given role is being (re)configured: every role except that one.
    pub fn settings_excluding(&self, role: Role) -> impl Iterator<Item = &RoleSettingsInput> {
        self.roles
            .iter()
            .filter(move |(r, _)| *r != role)
            .map(|(_, s)| s)
    }
}

/// Render the operator-facing summary of one configured role.
///
/// Shows the role name, key count, threshold, key type, and file names.
/// Passwords are structurally absent.
#[must_use]
pub fn render_summary(role: Role, settings: &RoleSettingsInput) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out, "Role: {role}");
    let _ = writeln!(out, "Number of Keys: {}", settings.keys.len());
    let _ = writeln!(out, "Threshold: {}", settings.threshold);
    let _ = writeln!(out, "Keys Type: {}", settings.key_type);
    let _ = writeln!(out, "Key files:");
    for entry in &settings.keys {
        let _ = writeln!(out, "  - {} ({})", entry.filepath, entry.key.key_id());
    }
    out
}
