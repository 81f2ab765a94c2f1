//! HMAC-SHA256 request signing with replay protection.
//!
//! Signatures cover the byte string `v0:<timestamp>:<raw body>` and are
//! rendered as `v0=<hex digest>`. Verification rejects timestamps outside the
//! replay window before doing any MAC work, then compares digests in constant
//! time through [`hmac::Mac::verify_slice`].
//!
//! ```rust
//! use orion_core::signature::{SignatureCodec, VerificationError};
//!
//! let codec = SignatureCodec::new("s3cret")?;
//! let body = br#"{"type":"message"}"#;
//! let signature = codec.sign(1_700_000_000, body);
//!
//! assert!(codec.verify(1_700_000_000, body, &signature, 1_700_000_100).is_ok());
//! assert_eq!(
//!     codec.verify(1_700_000_000, body, &signature, 1_700_000_301),
//!     Err(VerificationError::StaleRequest)
//! );
//! # Ok::<(), orion_core::OrionError>(())
//! ```

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

use crate::error::{OrionError, Result};

pub mod inbound;

pub use inbound::{InboundPayload, SIGNATURE_HEADER, TIMESTAMP_HEADER};

type HmacSha256 = Hmac<Sha256>;

/// Version tag prefixed to both the signed base string and the signature.
pub const SIGNATURE_VERSION: &str = "v0";

/// Maximum accepted distance between a request timestamp and now.
pub const DEFAULT_REPLAY_WINDOW_SECS: u64 = 300;

/// Why a signed request was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerificationError {
    /// Timestamp or signature header absent
    #[error("Missing signature headers")]
    MissingHeaders,
    /// Timestamp header is not an integer number of seconds
    #[error("Malformed request timestamp")]
    MalformedTimestamp,
    /// Timestamp falls outside the replay window
    #[error("Stale request")]
    StaleRequest,
    /// Signature does not match the payload
    #[error("Invalid signature")]
    SignatureInvalid,
    /// Verified body could not be decoded
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
}

impl VerificationError {
    /// HTTP status a receiving endpoint should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            VerificationError::SignatureInvalid => 401,
            VerificationError::MissingHeaders
            | VerificationError::MalformedTimestamp
            | VerificationError::StaleRequest
            | VerificationError::MalformedBody(_) => 400,
        }
    }
}

/// Signs and verifies payloads with one shared secret.
#[derive(Clone)]
pub struct SignatureCodec {
    keyed: HmacSha256,
    replay_window: u64,
}

impl fmt::Debug for SignatureCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignatureCodec")
            .field("replay_window", &self.replay_window)
            .finish_non_exhaustive()
    }
}

impl SignatureCodec {
    /// Creates a codec for the given secret.
    ///
    /// # Errors
    ///
    /// Returns `OrionError::InvalidInput` if the secret is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self> {
        let secret = secret.as_ref();
        if secret.is_empty() {
            return Err(OrionError::invalid_input("signing_secret").with_reason("must not be empty"));
        }
        let keyed = HmacSha256::new_from_slice(secret)
            .map_err(|e| OrionError::invalid_input("signing_secret").with_reason(e.to_string()))?;
        Ok(Self {
            keyed,
            replay_window: DEFAULT_REPLAY_WINDOW_SECS,
        })
    }

    /// Overrides the replay window (seconds).
    pub fn with_replay_window(mut self, seconds: u64) -> Self {
        self.replay_window = seconds;
        self
    }

    /// Replay window in seconds.
    pub fn replay_window(&self) -> u64 {
        self.replay_window
    }

    /// Computes `v0=<hex>` over `v0:<timestamp>:<raw>`.
    pub fn sign(&self, timestamp: i64, raw: &[u8]) -> String {
        self.sign_base(&timestamp.to_string(), raw)
    }

    /// Checks freshness, then the signature.
    ///
    /// # Errors
    ///
    /// `StaleRequest` when `|now - timestamp|` exceeds the replay window,
    /// regardless of the signature; `SignatureInvalid` on any mismatch or
    /// malformed signature.
    pub fn verify(
        &self,
        timestamp: i64,
        raw: &[u8],
        signature: &str,
        now: i64,
    ) -> std::result::Result<(), VerificationError> {
        self.check_freshness(timestamp, now)?;
        self.verify_base(&timestamp.to_string(), raw, signature)
    }

    /// Boolean form of [`SignatureCodec::verify`].
    pub fn is_valid(&self, timestamp: i64, raw: &[u8], signature: &str, now: i64) -> bool {
        self.verify(timestamp, raw, signature, now).is_ok()
    }

    fn check_freshness(&self, timestamp: i64, now: i64) -> std::result::Result<(), VerificationError> {
        if now.abs_diff(timestamp) > self.replay_window {
            return Err(VerificationError::StaleRequest);
        }
        Ok(())
    }

    fn mac_for(&self, timestamp: &str, raw: &[u8]) -> HmacSha256 {
        let mut mac = self.keyed.clone();
        mac.update(SIGNATURE_VERSION.as_bytes());
        mac.update(b":");
        mac.update(timestamp.as_bytes());
        mac.update(b":");
        mac.update(raw);
        mac
    }

    pub(crate) fn sign_base(&self, timestamp: &str, raw: &[u8]) -> String {
        let digest = self.mac_for(timestamp, raw).finalize().into_bytes();
        format!("{SIGNATURE_VERSION}={}", hex::encode(digest))
    }

    pub(crate) fn verify_base(
        &self,
        timestamp: &str,
        raw: &[u8],
        signature: &str,
    ) -> std::result::Result<(), VerificationError> {
        let provided = signature
            .strip_prefix(SIGNATURE_VERSION)
            .and_then(|rest| rest.strip_prefix('='))
            .and_then(|digest| hex::decode(digest).ok())
            .ok_or(VerificationError::SignatureInvalid)?;

        self.mac_for(timestamp, raw)
            .verify_slice(&provided)
            .map_err(|_| VerificationError::SignatureInvalid)
    }
}

#[cfg(test)]
mod tests;
