pub mod error;
pub mod schema;
mod encode;
pub mod signing;
pub mod typed_data;

pub use error::{Error, Result};
pub use schema::{FieldDef, FieldKind, TypeRegistry};
pub use typed_data::{compose_digest, signing_digest, TypedData, DOMAIN_TYPE};

use alloy_primitives::{Address, Signature, B256};
use serde::{Deserialize, Serialize};

/// One signed typed-data payload, as handed to a relayer for submission
/// on the signer's behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayRequest {
    pub signer: Address,
    pub signature: Signature,
    pub typed_data: TypedData,
}

/// Outcome of verifying a [`RelayRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiedRequest {
    pub signer: Address,
    pub digest: B256,
}

impl RelayRequest {
    /// Recompute the digest from the embedded typed data, recover the
    /// signer from the signature, and compare against the claimed address.
    pub fn verify(&self) -> Result<VerifiedRequest> {
        let digest = self.typed_data.signing_hash()?;
        signing::verify_signature(digest, self.signature, self.signer)?;
        Ok(VerifiedRequest {
            signer: self.signer,
            digest,
        })
    }
}

/// Byte range of one JSON document within a concatenated stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonSpan {
    pub start: usize,
    pub end: usize,
}

/// Find the byte ranges of concatenated top-level JSON objects in a batch
/// stream by matching braces.
/// - Handles nested objects
/// - Ignores braces inside JSON strings (with escape handling)
/// Returns ranges as [start, end) byte offsets into the original input.
pub fn split_concatenated_json(input: &str) -> Result<Vec<JsonSpan>> {
    let mut spans: Vec<JsonSpan> = Vec::new();
    let mut depth: u32 = 0;
    let mut in_string = false;
    let mut escape = false;
    let mut current_start: Option<usize> = None;

    for (idx, ch) in input.char_indices() {
        if in_string {
            if escape {
                // Current character is escaped; do not interpret it
                escape = false;
                continue;
            }
            match ch {
                '\\' => escape = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => {
                if depth == 0 {
                    current_start = Some(idx);
                }
                depth += 1;
            }
            '}' => {
                if depth == 0 {
                    return Err(Error::Framing(format!(
                        "unmatched closing brace at byte {idx}"
                    )));
                }
                depth -= 1;
                if depth == 0 {
                    let start = current_start.take().ok_or_else(|| {
                        Error::Framing(format!("missing start for document ending at byte {idx}"))
                    })?;
                    // end is exclusive; include this '}'
                    spans.push(JsonSpan {
                        start,
                        end: idx + ch.len_utf8(),
                    });
                }
            }
            _ => {}
        }
    }

    if depth != 0 {
        return Err(Error::Framing(format!(
            "unclosed document; brace depth at end is {depth}"
        )));
    }

    Ok(spans)
}
