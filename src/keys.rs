//! Signing-key material: loading, identity, and duplicate detection.
//!
//! Key files are PKCS#8-encrypted PEM holding an Ed25519 private key. The
//! loader is injected into the role builder as a trait so the interactive
//! flow can be exercised without real key files.

use std::fmt;
use std::fs;
use std::path::Path;

use ed25519_dalek::pkcs8::DecodePrivateKey;
use ed25519_dalek::SigningKey;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::ceremony::types::RoleSettingsInput;

/// A decrypted signing key together with its derived identity.
///
/// The key id is the lowercase hex SHA-256 of the public key bytes, which
/// is also what the repository service uses to address keys in metadata.
pub struct LoadedKey {
    signing: SigningKey,
    key_id: String,
    public_hex: String,
}

impl LoadedKey {
    /// Wrap a signing key and derive its identity.
    #[must_use]
    pub fn new(signing: SigningKey) -> Self {
        let public = signing.verifying_key();
        let key_id = hex::encode(Sha256::digest(public.as_bytes()));
        let public_hex = hex::encode(public.as_bytes());
        Self {
            signing,
            key_id,
            public_hex,
        }
    }

    /// Cryptographic identity of the key (hex SHA-256 of the public key).
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Hex-encoded public key bytes.
    #[must_use]
    pub fn public_key_hex(&self) -> &str {
        &self.public_hex
    }

    /// Access the underlying signing key.
    #[must_use]
    pub fn signing_key(&self) -> &SigningKey {
        &self.signing
    }
}

impl fmt::Debug for LoadedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedKey")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

/// A key-file password. Write-only: redacted `Debug`, zeroized on drop,
/// never serialized or printed.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Password(String);

impl Password {
    /// Wrap a password string.
    #[must_use]
    pub fn new(secret: String) -> Self {
        Self(secret)
    }

    /// Expose the secret for passing to the key loader.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Failure to decrypt or parse a key file.
///
/// Recovered locally by the role builder (the operator is re-prompted for
/// the same key slot); it never propagates out of the ceremony.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Failed: {0} Check the password.")]
pub struct KeyLoadError(pub String);

/// Loads a decrypted private key from a (filepath, password) pair.
pub trait KeyLoader {
    /// Load and decrypt the key at `filepath`.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyLoadError`] carrying a user-facing hint for any read,
    /// parse, or decryption failure.
    fn load(&self, filepath: &Path, password: &str) -> Result<LoadedKey, KeyLoadError>;
}

/// Production loader reading PKCS#8-encrypted PEM files.
///
/// The file is opened, read, and closed per attempt; nothing is cached.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileKeyLoader;

impl KeyLoader for FileKeyLoader {
    fn load(&self, filepath: &Path, password: &str) -> Result<LoadedKey, KeyLoadError> {
        let pem = fs::read_to_string(filepath).map_err(|e| KeyLoadError(e.to_string()))?;
        let signing = SigningKey::from_pkcs8_encrypted_pem(&pem, password)
            .map_err(|e| KeyLoadError(e.to_string()))?;
        Ok(LoadedKey::new(signing))
    }
}

/// Decide whether a candidate key (or its file) is already configured.
///
/// Scans every key entry across every role in `roles` as one flat pool and
/// returns true on the first entry whose key id equals `candidate_key_id`
/// or whose filepath equals `candidate_filepath` exactly (no path
/// normalization). Pure and total; the caller re-prompts on `true`.
pub fn key_is_duplicated<'a, I>(roles: I, candidate_key_id: &str, candidate_filepath: &str) -> bool
where
    I: IntoIterator<Item = &'a RoleSettingsInput>,
{
    roles
        .into_iter()
        .flat_map(|role| role.keys.iter())
        .any(|entry| entry.key.key_id() == candidate_key_id || entry.filepath == candidate_filepath)
}
