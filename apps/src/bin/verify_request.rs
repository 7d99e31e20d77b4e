use std::fs;
use std::path::PathBuf;

use alloy_primitives::hex;
use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{debug, info};

use common::{split_concatenated_json, RelayRequest};

/// CLI to verify a batch of signed typed-data relay requests.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to a file of concatenated relay-request JSON documents.
    #[clap(long, value_name = "FILE")]
    file_path: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    // Load environment variables if present
    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded environment variables from {:?}", path),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => bail!("failed to load .env file: {}", e),
    }

    let args = Args::parse();

    let input = fs::read_to_string(&args.file_path)?;
    let spans = split_concatenated_json(&input)?;
    info!(
        "Found {} relay request(s) in {}",
        spans.len(),
        args.file_path.display()
    );
    if spans.is_empty() {
        bail!("no relay requests found in {}", args.file_path.display());
    }

    for (i, span) in spans.iter().enumerate() {
        let document = &input[span.start..span.end];
        let request: RelayRequest = serde_json::from_str(document)
            .with_context(|| format!("request #{i} is not a valid relay request"))?;
        debug!("request #{i}: claimed signer {:#x}", request.signer);

        let verified = request
            .verify()
            .with_context(|| format!("request #{i} failed verification"))?;
        println!(
            "#{i} signer {:#x} digest 0x{}",
            verified.signer,
            hex::encode(verified.digest)
        );
    }

    Ok(())
}
