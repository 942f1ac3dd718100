//! PKCE S256 challenge generation for the Momentum login flow
//!
//! This module implements the Proof Key for Code Exchange (PKCE) challenge
//! generation defined in RFC 7636, restricted to the `S256` method that the
//! Momentum identity endpoint accepts.
//!
//! Note on the observed wire contract: Momentum's `/auth` endpoint receives
//! the `codeChallenge` in the initial login POST and there is no subsequent
//! code-exchange call presenting the verifier. The verifier is therefore
//! generated, used to derive the challenge, and discarded. This module keeps
//! the verifier in the returned pair anyway so the derivation is testable.
//!
//! # References
//!
//! - RFC 7636 <https://www.rfc-editor.org/rfc/rfc7636>

use base64::Engine as _;
use sha2::{Digest, Sha256};

use crate::error::Result;

// ---------------------------------------------------------------------------
// PkceChallenge
// ---------------------------------------------------------------------------

/// A PKCE S256 challenge pair consisting of a verifier and its derived
/// challenge value.
///
/// Created fresh by [`generate`] for every login attempt; never reused or
/// cached across attempts.
///
/// # Examples
///
/// ```
/// use queuepilot::momentum::pkce::generate;
///
/// let challenge = generate().expect("PKCE generation must not fail");
/// assert_eq!(challenge.method, "S256");
/// assert_eq!(challenge.verifier.len(), 43);
/// ```
#[derive(Debug, Clone)]
pub struct PkceChallenge {
    /// The code verifier: a base64url-encoded (no padding) random string of
    /// exactly 43 characters derived from 32 random bytes.
    pub verifier: String,

    /// The code challenge: the base64url-encoded (no padding) SHA-256 digest
    /// of the UTF-8 representation of [`Self::verifier`].
    ///
    /// This value is sent to `{base_url}/auth` in the `codeChallenge` field.
    pub challenge: String,

    /// The challenge method. Always `"S256"` for challenges produced by this
    /// module.
    pub method: String,
}

// ---------------------------------------------------------------------------
// Public functions
// ---------------------------------------------------------------------------

/// Generates a fresh PKCE S256 challenge from 32 cryptographically random
/// bytes.
///
/// The verifier is the base64url (no padding) encoding of the random bytes
/// (43 characters). The challenge is the base64url-encoded SHA-256 digest of
/// the verifier string's UTF-8 bytes, per RFC 7636 section 4.2.
///
/// # Errors
///
/// This function is infallible in practice; it returns a `Result` so that
/// callers can use `?` uniformly.
pub fn generate() -> Result<PkceChallenge> {
    use rand::RngCore as _;

    let mut random_bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut random_bytes);

    Ok(from_bytes(random_bytes))
}

/// Derives a PKCE challenge pair from a fixed 32-byte verifier source.
///
/// This is the deterministic core of [`generate`]: given the same bytes it
/// always produces the same verifier and challenge, which lets tests
/// substitute a fixed byte source for reproducible challenges.
///
/// # Examples
///
/// ```
/// use queuepilot::momentum::pkce::from_bytes;
///
/// let a = from_bytes([7u8; 32]);
/// let b = from_bytes([7u8; 32]);
/// assert_eq!(a.challenge, b.challenge);
/// ```
pub fn from_bytes(bytes: [u8; 32]) -> PkceChallenge {
    // base64url-encode (no padding) to produce the verifier.
    let verifier = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes);

    // SHA-256 of the UTF-8 bytes of the verifier string
    // (RFC 7636 section 4.2: ASCII(BASE64URL(SHA256(ASCII(code_verifier)))))
    let digest = Sha256::digest(verifier.as_bytes());
    let challenge = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest.as_slice());

    PkceChallenge {
        verifier,
        challenge,
        method: "S256".to_string(),
    }
}

/// Generates a random URL-safe token with 16 bytes of entropy.
///
/// Used for the `nonce` and `state` fields of the login payload; each call
/// draws independent randomness, so two tokens generated for the same login
/// are unrelated.
pub fn urlsafe_token() -> String {
    use rand::RngCore as _;

    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
