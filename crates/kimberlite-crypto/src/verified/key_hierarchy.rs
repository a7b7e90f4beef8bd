//! Verified Key Hierarchy Implementation
//!
//! This module provides a 3-level key hierarchy (Master → KEK → DEK) with
//! embedded proof certificates from Coq formal verification. The implementation
//! wraps the encryption module with proofs of:
//! - Tenant isolation (different tenants → different keys)
//! - Key wrapping soundness (wrap/unwrap roundtrip)
//! - Forward secrecy (lower-level compromise doesn't reveal upper levels)
//! - Key derivation injectivity (unique keys)
//!
//! Proven properties are documented in `specs/coq/KeyHierarchy.v`

use super::aes_gcm::VerifiedAesGcm;
use super::proof_certificate::{ProofCertificate, Verified};
use hkdf::Hkdf;
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

// -----------------------------------------------------------------------------
// Proof Certificates (extracted from Coq)
// -----------------------------------------------------------------------------

/// Tenant isolation: different tenants have different KEKs
///
/// **Theorem:** `tenant_isolation` in `specs/coq/KeyHierarchy.v:100`
///
/// **Proven:** tenant1 ≠ tenant2 → derive_kek(master, tenant1) ≠ derive_kek(master, tenant2)
pub const TENANT_ISOLATION_CERT: ProofCertificate = ProofCertificate::new(
    500,      // theorem_id
    1,        // proof_system_id (Coq 8.18)
    20260205, // verified_at
    1,        // assumption_count (HKDF injectivity)
);

/// Key wrapping soundness: unwrap(wrap(dek)) = dek
///
/// **Theorem:** `key_wrapping_sound` in `specs/coq/KeyHierarchy.v:141`
///
/// **Proven:** Key wrapping and unwrapping preserve the original key
pub const KEY_WRAPPING_SOUNDNESS_CERT: ProofCertificate = ProofCertificate::new(
    501,      // theorem_id
    1,        // proof_system_id
    20260205, // verified_at
    1,        // assumption_count (AES-GCM roundtrip)
);

/// Forward secrecy: DEK compromise doesn't reveal KEK or Master
///
/// **Theorem:** `forward_secrecy` in `specs/coq/KeyHierarchy.v:197`
///
/// **Proven:** Lower-level key compromise doesn't reveal upper-level keys
pub const FORWARD_SECRECY_CERT: ProofCertificate = ProofCertificate::new(
    502,      // theorem_id
    1,        // proof_system_id
    20260205, // verified_at
    2,        // assumption_count (one-way functions)
);

/// Key derivation injectivity
///
/// **Theorem:** `key_derivation_injective` in `specs/coq/KeyHierarchy.v:244`
///
/// **Proven:** Different inputs produce different derived keys
pub const KEY_DERIVATION_INJECTIVE_CERT: ProofCertificate = ProofCertificate::new(
    503,      // theorem_id
    1,        // proof_system_id
    20260205, // verified_at
    2,        // assumption_count (HKDF injectivity, tenant/stream uniqueness)
);

// -----------------------------------------------------------------------------
// Key Hierarchy Types
// -----------------------------------------------------------------------------

/// Master key (top level) - 32 bytes
///
/// This is the root of the key hierarchy. Should be stored in HSM/KMS.
/// Key material is securely zeroed from memory when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct VerifiedMasterKey {
    key: [u8; 32],
}

/// Key Encryption Key (KEK) - derived per tenant
///
/// **Proven:** Different tenants have different KEKs (tenant isolation)
/// Key material is securely zeroed from memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct VerifiedKEK {
    key: [u8; 32],
}

/// Data Encryption Key (DEK) - derived per stream
///
/// **Proven:** Different streams have different DEKs
/// Key material is securely zeroed from memory when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct VerifiedDEK {
    key: [u8; 32],
}

// -----------------------------------------------------------------------------
// Master Key
// -----------------------------------------------------------------------------

impl VerifiedMasterKey {
    /// Generate a new master key from system randomness
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut key = [0u8; 32];
        rand::rngs::OsRng.fill_bytes(&mut key);

        // Assert key is not all zeros
        assert_ne!(key, [0u8; 32], "Master key is all zeros (degenerate)");

        Self { key }
    }

    /// Create master key from bytes
    ///
    /// # Safety
    /// Key material must be cryptographically random
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        assert_ne!(bytes, [0u8; 32], "Master key is all zeros");
        Self { key: bytes }
    }

    /// Get key bytes (sensitive operation)
    pub fn to_bytes(&self) -> [u8; 32] {
        self.key
    }

    /// Derive KEK for a tenant with isolation proof
    ///
    /// **Proven:** `tenant_isolation` - different tenants → different KEKs
    ///
    /// # Example
    /// ```
    /// use kimberlite_crypto::verified::VerifiedMasterKey;
    ///
    /// let master = VerifiedMasterKey::generate();
    /// let kek_tenant1 = master.derive_kek(1);
    /// let kek_tenant2 = master.derive_kek(2);
    /// // Proven: kek_tenant1 ≠ kek_tenant2
    /// ```
    pub fn derive_kek(&self, tenant_id: u64) -> VerifiedKEK {
        // HKDF-SHA256(master_key, salt="kek", info=tenant_id)
        let key = Self::hkdf_derive(&self.key, b"kek", &tenant_id.to_le_bytes());
        VerifiedKEK { key }
    }

    /// RFC 5869 HKDF Extract+Expand key derivation.
    fn hkdf_derive(ikm: &[u8; 32], salt: &[u8], info: &[u8]) -> [u8; 32] {
        let hk = Hkdf::<Sha256>::new(Some(salt), ikm);
        let mut okm = [0u8; 32];
        hk.expand(info, &mut okm)
            .expect("32-byte output within HKDF maximum");
        okm
    }
}

// -----------------------------------------------------------------------------
// KEK (Key Encryption Key)
// -----------------------------------------------------------------------------

impl VerifiedKEK {
    /// Derive DEK for a stream with uniqueness proof
    ///
    /// **Proven:** `key_derivation_injective` - different streams → different DEKs
    ///
    /// # Example
    /// ```
    /// use kimberlite_crypto::verified::VerifiedMasterKey;
    ///
    /// let master = VerifiedMasterKey::generate();
    /// let kek = master.derive_kek(1);
    /// let dek_stream1 = kek.derive_dek(100);
    /// let dek_stream2 = kek.derive_dek(200);
    /// // Proven: dek_stream1 ≠ dek_stream2
    /// ```
    pub fn derive_dek(&self, stream_id: u64) -> VerifiedDEK {
        // HKDF-SHA256(kek, salt="dek", info=stream_id)
        let key = VerifiedMasterKey::hkdf_derive(&self.key, b"dek", &stream_id.to_le_bytes());
        VerifiedDEK { key }
    }

    /// Wrap (encrypt) a DEK for storage with soundness proof
    ///
    /// **Proven:** `key_wrapping_sound` - unwrap(wrap(dek)) = dek
    ///
    /// # Example
    /// ```
    /// use kimberlite_crypto::verified::{VerifiedMasterKey, VerifiedWrappedDEK};
    ///
    /// let master = VerifiedMasterKey::generate();
    /// let kek = master.derive_kek(1);
    /// let dek = kek.derive_dek(100);
    ///
    /// let wrapped = kek.wrap_dek(&dek).expect("wrap failed");
    /// let unwrapped = kek.unwrap_dek(&wrapped).expect("unwrap failed");
    /// // Proven: unwrapped = dek
    /// ```
    pub fn wrap_dek(&self, dek: &VerifiedDEK) -> Result<VerifiedWrappedDEK, String> {
        // Derive synthetic nonce from KEK and DEK: SHA-256(KEK || DEK)[0..12]
        let nonce = Self::derive_wrap_nonce(&self.key, &dek.key);

        let ciphertext = VerifiedAesGcm::encrypt(&self.key, &nonce, &dek.key, b"")?;

        // Prepend nonce to ciphertext so unwrap can extract it
        let mut output = Vec::with_capacity(12 + ciphertext.len());
        output.extend_from_slice(&nonce);
        output.extend_from_slice(&ciphertext);

        Ok(VerifiedWrappedDEK {
            ciphertext: output,
        })
    }

    /// Unwrap (decrypt) a DEK from storage
    ///
    /// **Proven:** Returns original DEK if not tampered
    pub fn unwrap_dek(&self, wrapped: &VerifiedWrappedDEK) -> Result<VerifiedDEK, String> {
        if wrapped.ciphertext.len() < 12 {
            return Err("Wrapped DEK too short to contain nonce".to_string());
        }

        // Extract nonce (first 12 bytes) and ciphertext (remainder)
        let nonce: [u8; 12] = wrapped.ciphertext[..12]
            .try_into()
            .map_err(|_| "Failed to extract nonce from wrapped DEK")?;
        let ciphertext = &wrapped.ciphertext[12..];

        let plaintext = VerifiedAesGcm::decrypt(&self.key, &nonce, ciphertext, b"")?;

        if plaintext.len() != 32 {
            return Err("Unwrapped DEK has wrong length".to_string());
        }

        let mut key = [0u8; 32];
        key.copy_from_slice(&plaintext);

        Ok(VerifiedDEK { key })
    }

    /// Get key bytes (sensitive operation)
    pub fn to_bytes(&self) -> [u8; 32] {
        self.key
    }

    /// Derive a synthetic nonce for key wrapping from KEK and DEK material.
    ///
    /// Uses `SHA-256(KEK || DEK)[0..12]` to produce a unique, deterministic
    /// nonce per KEK-DEK pair, avoiding fixed-nonce reuse.
    fn derive_wrap_nonce(kek: &[u8; 32], dek: &[u8; 32]) -> [u8; 12] {
        let mut hasher = Sha256::new();
        hasher.update(kek);
        hasher.update(dek);
        let hash = hasher.finalize();
        let mut nonce = [0u8; 12];
        nonce.copy_from_slice(&hash[..12]);
        nonce
    }
}

// -----------------------------------------------------------------------------
// DEK (Data Encryption Key)
// -----------------------------------------------------------------------------

impl VerifiedDEK {
    /// Encrypt data with this DEK
    pub fn encrypt(&self, position: u64, plaintext: &[u8]) -> Result<Vec<u8>, String> {
        let nonce = VerifiedAesGcm::nonce_from_position(position);
        VerifiedAesGcm::encrypt(&self.key, &nonce, plaintext, b"")
    }

    /// Decrypt data with this DEK
    pub fn decrypt(&self, position: u64, ciphertext: &[u8]) -> Result<Vec<u8>, String> {
        let nonce = VerifiedAesGcm::nonce_from_position(position);
        VerifiedAesGcm::decrypt(&self.key, &nonce, ciphertext, b"")
    }

    /// Get key bytes (sensitive operation)
    pub fn to_bytes(&self) -> [u8; 32] {
        self.key
    }
}

// -----------------------------------------------------------------------------
// Wrapped DEK
// -----------------------------------------------------------------------------

/// Wrapped (encrypted) DEK for storage
#[derive(Clone)]
pub struct VerifiedWrappedDEK {
    ciphertext: Vec<u8>,
}

impl VerifiedWrappedDEK {
    /// Get wrapped bytes for serialization
    pub fn to_bytes(&self) -> Vec<u8> {
        self.ciphertext.clone()
    }

    /// Create from wrapped bytes
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { ciphertext: bytes }
    }
}

// Verified trait implementation
impl Verified for VerifiedMasterKey {
    fn proof_certificate() -> ProofCertificate {
        TENANT_ISOLATION_CERT
    }

    fn theorem_name() -> &'static str {
        "tenant_isolation"
    }

    fn theorem_description() -> &'static str {
        "Tenant isolation: different tenants have cryptographically different KEKs"
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------
