use std::fs;
use std::path::PathBuf;

use alloy_primitives::{hex, Address, Signature, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use anyhow::{Context, Result};
use clap::Parser;

use common::{RelayRequest, TypedData};

/// CLI to sign a typed-data document and print digest, signature, and signer.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the EIP-712 typed-data JSON document to sign.
    #[clap(long, value_name = "FILE")]
    file_path: PathBuf,

    /// Optional private key to use for signing; if omitted, a random key is generated.
    #[clap(long, env = "USER_PRIVATE_KEY")]
    private_key: Option<PrivateKeySigner>,

    /// Optional path to write the signed relay request as JSON.
    #[clap(long, value_name = "FILE")]
    out_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    // Parse the typed-data document and compute its signing digest
    let json = fs::read_to_string(&args.file_path)?;
    let typed_data: TypedData = serde_json::from_str(&json)
        .with_context(|| format!("invalid typed data in {}", args.file_path.display()))?;
    let digest: B256 = typed_data.signing_hash()?;

    // Obtain signer (existing or random)
    let signer = match args.private_key {
        Some(pk) => pk,
        None => PrivateKeySigner::random(),
    };
    let signer_address: Address = signer.address();

    // Sign the digest directly; this is the value the verifier recomputes
    let signature: Signature = signer.sign_hash_sync(&digest)?;

    println!("File: {}", args.file_path.display());
    println!("Digest (EIP-712): 0x{}", hex::encode(digest));
    println!("Signature: 0x{}", hex::encode(signature.as_bytes()));
    println!("Signer: {:#x}", signer_address);

    if let Some(out_path) = args.out_path {
        let request = RelayRequest {
            signer: signer_address,
            signature,
            typed_data,
        };
        fs::write(&out_path, serde_json::to_string_pretty(&request)?)?;
        println!("Relay request written to {}", out_path.display());
    }

    Ok(())
}
