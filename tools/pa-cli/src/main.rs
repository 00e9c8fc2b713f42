//! PA-CLI: operator tool for the phone attestation client.
//!
//! ## Usage
//!
//! ```bash
//! pa-cli checksum 0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359
//! pa-cli metadata https://issuer.example/metadata.json
//! pa-cli status https://attestation.issuer.example
//! pa-cli pepper --phone +15555550123 --private-key 0x... \
//!     --odis-url https://odis.example --odis-public-key <base64 G2 key>
//! ```
//!
//! `pepper` talks to a BLS12-381 oracle. The hosted deployments sign over
//! BLS12-377 and are not offered here.

mod offline;

use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use pa_01_signature_verification::{checksum, LocalKeySigner, SignatureVerificationService};
use pa_02_issuer_discovery::{check_status, ClaimMetadataApi, MetadataFetcher, DEFAULT_METADATA_ATTEMPTS};
use pa_03_salt_derivation::{
    derive_identifier, BlindingScheme, BlsBlindingScheme, OdisConfig, OdisHttpClient, PhoneNumber,
    SaltDerivationApi, SaltDerivationService,
};
use pa_telemetry::{init_logging, TelemetryConfig};
use serde_json::json;
use shared_types::{ReqwestTransport, TransportConfig};
use tracing::{debug, info};

use offline::OfflineDirectory;

/// Phone attestation operator CLI
#[derive(Parser, Debug)]
#[command(name = "pa-cli")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Log filter (overrides PA_LOG_LEVEL)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the checksummed form of an address
    Checksum {
        address: String,
    },

    /// Fetch and verify an issuer metadata document (direct signer only)
    Metadata {
        url: String,

        /// Download attempts
        #[arg(long, default_value_t = DEFAULT_METADATA_ATTEMPTS)]
        attempts: u32,
    },

    /// Query an attestation service's /status endpoint
    Status {
        service_url: String,
    },

    /// Derive the pepper and identifier for a phone number
    Pepper {
        /// Phone number in E.164 form
        #[arg(long)]
        phone: String,

        /// Account private key (hex)
        #[arg(long, env = "PA_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,

        /// Oracle base URL
        #[arg(long, env = "PA_ODIS_URL")]
        odis_url: String,

        /// Oracle BLS12-381 public key, base64
        #[arg(long, env = "PA_ODIS_PUBLIC_KEY")]
        odis_public_key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut telemetry = TelemetryConfig::for_component("cli");
    if let Some(level) = &args.log_level {
        telemetry = telemetry.with_log_level(level.clone());
    }
    init_logging(&telemetry)?;

    match args.command {
        Command::Checksum { address } => {
            println!("{}", checksum(&address)?);
        }
        Command::Metadata { url, attempts } => metadata(&url, attempts).await?,
        Command::Status { service_url } => {
            let transport = transport()?;
            let status = check_status(transport.as_ref(), &service_url)
                .await
                .with_context(|| format!("status check of {service_url} failed"))?;
            println!("{}", json!({"status": status.status, "version": status.version}));
        }
        Command::Pepper {
            phone,
            private_key,
            odis_url,
            odis_public_key,
        } => pepper(&phone, &private_key, odis_url, odis_public_key).await?,
    }

    Ok(())
}

fn transport() -> Result<Arc<ReqwestTransport>> {
    Ok(Arc::new(ReqwestTransport::new(&TransportConfig::default())?))
}

async fn metadata(url: &str, attempts: u32) -> Result<()> {
    debug!(url, attempts, "fetching issuer metadata");
    let fetcher = MetadataFetcher::new(
        transport()?,
        SignatureVerificationService::new(Arc::new(OfflineDirectory)),
    );
    let document = fetcher
        .fetch(url, attempts)
        .await
        .with_context(|| format!("metadata at {url} rejected"))?;

    let claims: Vec<&str> = document.claims.iter().map(|c| c.claim_type.as_str()).collect();
    let summary = json!({
        "signer": document.meta.address.as_str(),
        "claims": claims,
        "name": document.name(),
        "attestationServiceUrl": document.attestation_service_url(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn pepper(
    phone: &str,
    private_key: &str,
    odis_url: String,
    odis_public_key: String,
) -> Result<()> {
    let phone = PhoneNumber::parse(phone)?;
    let config = OdisConfig::custom(odis_url, odis_public_key, BlsBlindingScheme.curve());
    info!(oracle = %config.url, curve = %config.curve, %phone, "deriving pepper");

    let signer = Arc::new(LocalKeySigner::from_hex(private_key)?);
    let service = SaltDerivationService::from_config(
        BlsBlindingScheme,
        OdisHttpClient::new(transport()?, config.clone()),
        signer,
        &config,
    )?;

    let pepper = service
        .derive_pepper(&phone)
        .await
        .map_err(|e| anyhow!("{e}: {}", e.main_cause()))?;
    let identifier = derive_identifier(&phone, &pepper);

    println!(
        "{}",
        json!({
            "pepper": pepper.as_str(),
            "identifier": format!("0x{}", hex::encode(identifier.as_bytes())),
        })
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_pepper_arguments() {
        let args = Args::try_parse_from([
            "pa-cli",
            "pepper",
            "--phone",
            "+15555550123",
            "--private-key",
            "0x01",
            "--odis-url",
            "https://odis.example",
            "--odis-public-key",
            "a2V5",
        ])
        .unwrap();
        match args.command {
            Command::Pepper { phone, odis_url, odis_public_key, .. } => {
                assert_eq!(phone, "+15555550123");
                assert_eq!(odis_url, "https://odis.example");
                assert_eq!(odis_public_key, "a2V5");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_pepper_has_no_network_presets() {
        let result = Args::try_parse_from([
            "pa-cli",
            "pepper",
            "--phone",
            "+15555550123",
            "--private-key",
            "0x01",
            "--odis-url",
            "https://odis.example",
            "--odis-public-key",
            "a2V5",
            "--network",
            "alfajores",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_metadata_default_attempts() {
        let args = Args::try_parse_from(["pa-cli", "metadata", "https://meta.example"]).unwrap();
        assert!(matches!(args.command, Command::Metadata { attempts: 3, .. }));
    }
}
