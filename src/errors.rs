//! Errors arising when decoding keys, signatures, or authentications.
//!
//! Verification never errors in this crate.  Any malformed or mismatched
//! verification input yields a plain `false`, so the only fallible surface
//! is decoding byte strings back into curve points and scalars.

use ark_serialize::SerializationError;
use thiserror::Error;

/// Failure to decode a key, signature, or authentication from bytes.
#[derive(Debug, Error)]
pub enum KoskError {
    /// The byte string was not a canonical encoding of a point in the
    /// prime-order group, or of a scalar.
    #[error("malformed point or scalar encoding")]
    Encoding(#[from] SerializationError),
}
