//! Bootstrap payload assembly.
//!
//! The payload is an immutable snapshot of the ceremony session (role
//! policy plus public key material) and a computed root-metadata summary.
//! Private keys and passwords never enter it.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::ceremony::types::{CeremonySession, KeyType, Role};

/// Service-level settings gathered in the first ceremony step.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceSettings {
    /// Base URL the service serves target files from.
    pub targets_base_url: String,
    /// Number of delegated hashed bins; a power of two.
    pub number_of_delegated_bins: u32,
    /// Per-role metadata expiration, in days.
    pub expiration_days: BTreeMap<String, u32>,
}

/// Public half of one configured key, in the service's wire shape.
#[derive(Debug, Clone, Serialize)]
pub struct PayloadKey {
    /// Key algorithm.
    pub keytype: &'static str,
    /// Signature scheme.
    pub scheme: &'static str,
    /// Hex SHA-256 of the public key.
    pub keyid: String,
    /// Key value container.
    pub keyval: KeyVal,
    /// Operator-side file name, for audit trails.
    pub filename: String,
}

/// Public key value.
#[derive(Debug, Clone, Serialize)]
pub struct KeyVal {
    /// Hex-encoded public key bytes.
    pub public: String,
}

/// One role's policy in the payload.
#[derive(Debug, Clone, Serialize)]
pub struct RolePayload {
    /// Signature threshold.
    pub threshold: u32,
    /// Number of configured keys.
    pub num_of_keys: u32,
    /// Custody model.
    pub keys_type: KeyType,
    /// Configured keys, addressed by key id.
    pub keys: BTreeMap<String, PayloadKey>,
}

/// Role policy plus service settings.
#[derive(Debug, Clone, Serialize)]
pub struct PayloadSettings {
    /// Service-level settings.
    pub service: ServiceSettings,
    /// Per-role policy, addressed by role name.
    pub roles: BTreeMap<String, RolePayload>,
}

/// Key ids and threshold for one role inside the root summary.
#[derive(Debug, Clone, Serialize)]
pub struct RoleKeys {
    /// Ids of the keys trusted for this role.
    pub keyids: Vec<String>,
    /// Signature threshold.
    pub threshold: u32,
}

/// Computed root-of-trust summary submitted alongside the settings.
#[derive(Debug, Clone, Serialize)]
pub struct RootMetadata {
    /// Metadata version; the ceremony always produces version 1.
    pub version: u32,
    /// Expiration timestamp derived from the root expiration days.
    pub expires: DateTime<Utc>,
    /// Trusted key ids and thresholds per role.
    pub roles: BTreeMap<String, RoleKeys>,
    /// Public keys for every key id referenced in `roles`.
    pub keys: BTreeMap<String, PayloadKey>,
}

/// The bootstrap request body. Built once per ceremony run.
#[derive(Debug, Clone, Serialize)]
pub struct BootstrapPayload {
    /// Role policy and service settings.
    pub settings: PayloadSettings,
    /// Computed root metadata.
    pub metadata: RootMetadata,
}

/// Snapshot the session into the request body.
#[must_use]
pub fn build(
    session: &CeremonySession,
    service: &ServiceSettings,
    now: DateTime<Utc>,
) -> BootstrapPayload {
    let mut roles = BTreeMap::new();
    let mut metadata_roles = BTreeMap::new();
    let mut metadata_keys = BTreeMap::new();

    for (role, settings) in session.iter() {
        let mut keys = BTreeMap::new();
        let mut keyids = Vec::with_capacity(settings.keys.len());
        for entry in &settings.keys {
            let key = PayloadKey {
                keytype: "ed25519",
                scheme: "ed25519",
                keyid: entry.key.key_id().to_string(),
                keyval: KeyVal {
                    public: entry.key.public_key_hex().to_string(),
                },
                filename: entry.filepath.clone(),
            };
            keyids.push(key.keyid.clone());
            metadata_keys.insert(key.keyid.clone(), key.clone());
            keys.insert(key.keyid.clone(), key);
        }

        roles.insert(
            role.name().to_string(),
            RolePayload {
                threshold: settings.threshold,
                num_of_keys: settings.keys.len() as u32,
                keys_type: settings.key_type,
                keys,
            },
        );
        metadata_roles.insert(
            role.name().to_string(),
            RoleKeys {
                keyids,
                threshold: settings.threshold,
            },
        );
    }

    let root_days = service
        .expiration_days
        .get(Role::Root.name())
        .copied()
        .unwrap_or_else(|| Role::Root.default_expiration_days());

    BootstrapPayload {
        settings: PayloadSettings {
            service: service.clone(),
            roles,
        },
        metadata: RootMetadata {
            version: 1,
            expires: now + Duration::days(i64::from(root_days)),
            roles: metadata_roles,
            keys: metadata_keys,
        },
    }
}
