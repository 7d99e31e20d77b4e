use alloy_primitives::{hex, Address, SignatureError};

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Everything that can go wrong while encoding, hashing, or verifying
/// typed data. Encoding errors stem from malformed caller input and are
/// not retryable; signature errors are a separate domain and never overlap
/// with the encoder's own failures.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A struct type referenced by the data is not declared in the schema.
    #[error("type {0:?} is not declared in the schema")]
    MissingType(String),

    /// A field type is neither a recognized primitive nor a declared
    /// struct type. Guessing an encoding width here would mis-encode, so
    /// this fails instead.
    #[error("unrecognized field type {0:?}")]
    UnknownType(String),

    /// Array-typed fields are recognized but not encodable.
    #[error("array field type {0:?} is not supported")]
    UnsupportedArray(String),

    /// The record does not carry a field its type's schema requires.
    #[error("record for {type_name:?} is missing field {field:?}")]
    MissingField { type_name: String, field: String },

    /// A record value does not have the shape its declared type requires.
    #[error("field {field:?} expects {expected}, got {got}")]
    ValueMismatch {
        field: String,
        expected: String,
        got: String,
    },

    /// An integer value does not fit the declared bit width.
    #[error("field {field:?} value does not fit {type_name}")]
    OutOfRange { field: String, type_name: String },

    /// A hex-encoded value failed to decode.
    #[error("field {field:?} holds invalid hex")]
    InvalidHex {
        field: String,
        #[source]
        source: hex::FromHexError,
    },

    /// A typed-data document could not be parsed.
    #[error("invalid typed data JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A stream of concatenated JSON payloads is malformed.
    #[error("malformed payload stream: {0}")]
    Framing(String),

    /// ECDSA public-key recovery failed.
    #[error(transparent)]
    Recovery(#[from] SignatureError),

    /// The recovered signer does not match the claimed address.
    #[error("recovered signer {recovered} does not match expected {expected}")]
    SignerMismatch { expected: Address, recovered: Address },
}
