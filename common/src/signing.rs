use alloy_primitives::{Address, Signature, B256};

use crate::error::{Error, Result};

/// Recover the address that produced `signature` over a 32-byte digest.
///
/// The digest is used as the ECDSA prehash directly; callers hand in the
/// EIP-712 signing hash, never raw message bytes.
pub fn recover_signer(digest: B256, signature: Signature) -> Result<Address> {
    signature
        .recover_address_from_prehash(&digest)
        .map_err(Error::from)
}

/// Check that `signature` over `digest` recovers to `expected`.
///
/// A mismatch is the off-chain analogue of an on-chain verifier rejecting
/// the submission with a signature error.
pub fn verify_signature(digest: B256, signature: Signature, expected: Address) -> Result<()> {
    let recovered = recover_signer(digest, signature)?;
    if recovered != expected {
        return Err(Error::SignerMismatch {
            expected,
            recovered,
        });
    }
    Ok(())
}
