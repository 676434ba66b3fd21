//! Key management for identity and renewal tokens.
//!
//! Identity tokens are signed with an asymmetric key so that services holding
//! only the public key can verify them. Renewal tokens are signed with a shared
//! secret (HS256) that never leaves the issuing service.
//!
//! PEM formats accepted for identity keys:
//! - RS256: PKCS#1 (`RSA PRIVATE KEY`) private key, SPKI or PKCS#1 public key
//! - ES256: PKCS#8 private key on P-256, SPKI public key
//! - EdDSA: PKCS#8 Ed25519 private key, SPKI public key

use crate::error::TokenError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};
use pem::{EncodeConfig, Pem};
use rand::RngCore;
use ring::rand::SystemRandom;
use ring::signature::{Ed25519KeyPair, KeyPair as _};
use sigil_core::{IdentityAlgorithm, IdentityConfig, RenewalConfig};
use std::fmt;
use std::path::Path;

/// SPKI header for an Ed25519 public key, followed by the 32-byte key.
const ED25519_SPKI_PREFIX: [u8; 12] = [
    0x30, 0x2a, 0x30, 0x05, 0x06, 0x03, 0x2b, 0x65, 0x70, 0x03, 0x21, 0x00,
];

/// Length in bytes of generated renewal secrets.
pub const RENEWAL_SECRET_LEN: usize = 32;

/// Map a configured algorithm to its JWT algorithm.
pub fn jwt_algorithm(algorithm: IdentityAlgorithm) -> Algorithm {
    match algorithm {
        IdentityAlgorithm::RS256 => Algorithm::RS256,
        IdentityAlgorithm::ES256 => Algorithm::ES256,
        IdentityAlgorithm::EdDSA => Algorithm::EdDSA,
    }
}

/// Private half of the identity key, used only by the issuer.
#[derive(Clone)]
pub struct IdentitySigningKey {
    algorithm: Algorithm,
    key: EncodingKey,
}

impl IdentitySigningKey {
    /// Load a signing key from PEM.
    pub fn from_pem(algorithm: IdentityAlgorithm, pem: &[u8]) -> Result<Self, TokenError> {
        let key = match algorithm {
            IdentityAlgorithm::RS256 => EncodingKey::from_rsa_pem(pem),
            IdentityAlgorithm::ES256 => EncodingKey::from_ec_pem(pem),
            IdentityAlgorithm::EdDSA => EncodingKey::from_ed_pem(pem),
        }
        .map_err(|e| TokenError::InvalidPrivateKey(e.to_string()))?;

        Ok(Self {
            algorithm: jwt_algorithm(algorithm),
            key,
        })
    }

    /// Get the JWT algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Get the inner encoding key.
    pub fn inner(&self) -> &EncodingKey {
        &self.key
    }
}

impl fmt::Debug for IdentitySigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentitySigningKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Public half of the identity key. Safe to hand to any verifying service.
#[derive(Clone)]
pub struct IdentityVerifyingKey {
    algorithm: Algorithm,
    key: DecodingKey,
}

impl IdentityVerifyingKey {
    /// Load a verifying key from PEM.
    pub fn from_pem(algorithm: IdentityAlgorithm, pem: &[u8]) -> Result<Self, TokenError> {
        let key = match algorithm {
            IdentityAlgorithm::RS256 => DecodingKey::from_rsa_pem(pem),
            IdentityAlgorithm::ES256 => DecodingKey::from_ec_pem(pem),
            IdentityAlgorithm::EdDSA => DecodingKey::from_ed_pem(pem),
        }
        .map_err(|e| TokenError::InvalidPublicKey(e.to_string()))?;

        Ok(Self {
            algorithm: jwt_algorithm(algorithm),
            key,
        })
    }

    /// Load the verifying key named by the configuration.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, TokenError> {
        let pem = config
            .resolve_public_key()
            .map_err(sigil_core::ConfigError::from)?
            .ok_or_else(|| TokenError::MissingKey("identity public key".to_string()))?;
        Self::from_pem(config.algorithm, pem.as_bytes())
    }

    /// Get the JWT algorithm.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Get the inner decoding key.
    pub fn inner(&self) -> &DecodingKey {
        &self.key
    }
}

impl fmt::Debug for IdentityVerifyingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityVerifyingKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Signing and verifying halves of the identity key.
#[derive(Debug, Clone)]
pub struct IdentityKeyPair {
    signing: IdentitySigningKey,
    verifying: IdentityVerifyingKey,
}

impl IdentityKeyPair {
    /// Build a key pair from its halves.
    pub fn new(
        signing: IdentitySigningKey,
        verifying: IdentityVerifyingKey,
    ) -> Result<Self, TokenError> {
        if signing.algorithm != verifying.algorithm {
            return Err(TokenError::InvalidPublicKey(format!(
                "algorithm mismatch: private key is {:?}, public key is {:?}",
                signing.algorithm, verifying.algorithm
            )));
        }
        Ok(Self { signing, verifying })
    }

    /// Load a key pair from PEM-encoded private and public keys.
    pub fn from_pem(
        algorithm: IdentityAlgorithm,
        private_pem: &[u8],
        public_pem: &[u8],
    ) -> Result<Self, TokenError> {
        Self::new(
            IdentitySigningKey::from_pem(algorithm, private_pem)?,
            IdentityVerifyingKey::from_pem(algorithm, public_pem)?,
        )
    }

    /// Load the key pair named by the configuration.
    pub fn from_config(config: &IdentityConfig) -> Result<Self, TokenError> {
        let private_pem = config
            .resolve_private_key()
            .map_err(sigil_core::ConfigError::from)?
            .ok_or_else(|| TokenError::MissingKey("identity private key".to_string()))?;
        let signing = IdentitySigningKey::from_pem(config.algorithm, private_pem.as_bytes())?;
        let verifying = IdentityVerifyingKey::from_config(config)?;
        Self::new(signing, verifying)
    }

    /// Get the signing half.
    pub fn signing_key(&self) -> &IdentitySigningKey {
        &self.signing
    }

    /// Get the verifying half.
    pub fn verifying_key(&self) -> &IdentityVerifyingKey {
        &self.verifying
    }
}

fn encode_pem(doc: Pem) -> String {
    pem::encode_config(&doc, EncodeConfig::new().set_line_ending(pem::LineEnding::LF))
}

/// A freshly generated Ed25519 identity key pair.
pub struct GeneratedKeyPair {
    pkcs8: Vec<u8>,
    public_key: Vec<u8>,
}

impl GeneratedKeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn ed25519() -> Result<Self, TokenError> {
        let rng = SystemRandom::new();
        let document = Ed25519KeyPair::generate_pkcs8(&rng)
            .map_err(|e| TokenError::KeyGenerationFailed(e.to_string()))?;
        let pkcs8 = document.as_ref().to_vec();

        let pair = Ed25519KeyPair::from_pkcs8(&pkcs8)
            .map_err(|e| TokenError::KeyGenerationFailed(e.to_string()))?;
        let public_key = pair.public_key().as_ref().to_vec();

        Ok(Self { pkcs8, public_key })
    }

    /// Signing and verifying keys for this pair.
    pub fn key_pair(&self) -> IdentityKeyPair {
        IdentityKeyPair {
            signing: IdentitySigningKey {
                algorithm: Algorithm::EdDSA,
                key: EncodingKey::from_ed_der(&self.pkcs8),
            },
            verifying: IdentityVerifyingKey {
                algorithm: Algorithm::EdDSA,
                key: DecodingKey::from_ed_der(&self.public_key),
            },
        }
    }

    /// Private key as a PKCS#8 PEM document.
    pub fn private_key_pem(&self) -> String {
        encode_pem(Pem::new("PRIVATE KEY", self.pkcs8.clone()))
    }

    /// Public key as an SPKI PEM document.
    pub fn public_key_pem(&self) -> String {
        let mut spki = Vec::with_capacity(ED25519_SPKI_PREFIX.len() + self.public_key.len());
        spki.extend_from_slice(&ED25519_SPKI_PREFIX);
        spki.extend_from_slice(&self.public_key);
        encode_pem(Pem::new("PUBLIC KEY", spki))
    }

    /// Save the key pair to PEM files.
    pub fn save_to_files(
        &self,
        private_key_path: &Path,
        public_key_path: &Path,
    ) -> Result<(), std::io::Error> {
        std::fs::write(private_key_path, self.private_key_pem())?;
        std::fs::write(public_key_path, self.public_key_pem())?;
        Ok(())
    }
}

/// Shared secret for renewal tokens.
#[derive(Clone)]
pub struct RenewalSecret {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl RenewalSecret {
    /// Create a secret from raw bytes.
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingKey("renewal secret is empty".to_string()));
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        })
    }

    /// Load the secret named by the configuration.
    pub fn from_config(config: &RenewalConfig) -> Result<Self, TokenError> {
        let secret = config
            .resolve_secret()?
            .ok_or_else(|| TokenError::MissingKey("renewal secret".to_string()))?;
        Self::new(&secret)
    }

    /// Generate a random secret, base64 encoded.
    pub fn generate() -> String {
        let mut rng = rand::rng();
        let mut bytes = [0u8; RENEWAL_SECRET_LEN];
        rng.fill_bytes(&mut bytes);
        STANDARD.encode(bytes)
    }

    /// Get the JWT algorithm.
    pub fn algorithm(&self) -> Algorithm {
        Algorithm::HS256
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl fmt::Debug for RenewalSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RenewalSecret(..)")
    }
}
