//! Shared fixtures for the integration tests.
#![allow(dead_code)] // not every test binary uses every fixture

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use ed25519_dalek::SigningKey;
use sha2::{Digest, Sha256};
use wiremock::{Request, Respond, ResponseTemplate};

use tufctl::ceremony::payload::{self, BootstrapPayload, ServiceSettings};
use tufctl::ceremony::types::{CeremonySession, KeyInput, Role, RoleSettingsInput};
use tufctl::keys::{KeyLoadError, KeyLoader, LoadedKey, Password};

/// Deterministic key loader: material is derived from the filepath, so the
/// same path always yields the same key and distinct paths never collide.
pub struct PathSeededLoader;

impl KeyLoader for PathSeededLoader {
    fn load(&self, filepath: &Path, _password: &str) -> Result<LoadedKey, KeyLoadError> {
        let seed: [u8; 32] = Sha256::digest(filepath.to_string_lossy().as_bytes()).into();
        Ok(LoadedKey::new(SigningKey::from_bytes(&seed)))
    }
}

/// A session with one key per fixed role, as the happy-path ceremony builds.
pub fn sample_session() -> CeremonySession {
    let loader = PathSeededLoader;
    let mut session = CeremonySession::new();
    for role in Role::ALL {
        let filepath = format!("{role}1.key");
        let key = loader.load(Path::new(&filepath), "strongPass").unwrap();
        session.put(
            role,
            RoleSettingsInput {
                keys: vec![KeyInput {
                    filepath,
                    password: Password::new("strongPass".to_string()),
                    key,
                }],
                threshold: 1,
                key_type: role.key_type(),
            },
        );
    }
    session
}

/// A complete payload for submitter tests.
pub fn sample_payload() -> BootstrapPayload {
    let mut expiration_days = std::collections::BTreeMap::new();
    for role in Role::ALL {
        expiration_days.insert(role.name().to_string(), role.default_expiration_days());
    }
    let service = ServiceSettings {
        targets_base_url: "https://example.com/targets".to_string(),
        number_of_delegated_bins: 256,
        expiration_days,
    };
    payload::build(&sample_session(), &service, chrono::Utc::now())
}

/// Responds with each template in turn, repeating the last one.
pub struct SequenceResponder {
    responses: Vec<ResponseTemplate>,
    hits: AtomicUsize,
}

impl SequenceResponder {
    pub fn new(responses: Vec<ResponseTemplate>) -> Self {
        Self {
            responses,
            hits: AtomicUsize::new(0),
        }
    }
}

impl Respond for SequenceResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let index = self.hits.fetch_add(1, Ordering::SeqCst);
        self.responses[index.min(self.responses.len() - 1)].clone()
    }
}

/// Script for one full happy-path ceremony: start, service-settings
/// defaults, one key per role, approve every summary, finalize.
pub fn happy_path_script() -> Vec<String> {
    let mut lines: Vec<String> = vec!["y".into()];
    // Service settings: base URL, bins, five expirations - all defaults.
    lines.extend(std::iter::repeat(String::new()).take(7));
    // One key per role, default count and threshold.
    for role in Role::ALL {
        lines.push(String::new());
        lines.push(String::new());
        lines.push(format!("{role}1.key"));
        lines.push("strongPass".into());
    }
    // Approve each role's summary, then finalize.
    lines.extend(std::iter::repeat("y".to_string()).take(5));
    lines.push("y".into());
    lines
}
