//! # Claim Metadata Documents
//!
//! A metadata document is `{"claims": [...], "meta": {"address", "signature"}}`.
//! The signature covers keccak256 over the concatenated keccak256 digests
//! of each claim's serialized bytes, exactly as they appear in the document.
//! Key order and whitespace therefore matter, and claims are never
//! re-serialized before hashing.

use pa_01_signature_verification::{checksum, keccak256, ChecksumAddress};
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::{Map, Value};
use shared_types::Hash;
use std::collections::HashSet;

use super::errors::MetadataError;

/// Known claim types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClaimType {
    AttestationServiceUrl,
    Account,
    Domain,
    Keybase,
    Name,
    ProfilePicture,
    Storage,
    Twitter,
}

impl ClaimType {
    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AttestationServiceUrl => "ATTESTATION_SERVICE_URL",
            Self::Account => "ACCOUNT",
            Self::Domain => "DOMAIN",
            Self::Keybase => "KEYBASE",
            Self::Name => "NAME",
            Self::ProfilePicture => "PROFILE_PICTURE",
            Self::Storage => "STORAGE",
            Self::Twitter => "TWITTER",
        }
    }

    /// Parse a wire name.
    pub fn from_wire(name: &str) -> Option<Self> {
        Some(match name {
            "ATTESTATION_SERVICE_URL" => Self::AttestationServiceUrl,
            "ACCOUNT" => Self::Account,
            "DOMAIN" => Self::Domain,
            "KEYBASE" => Self::Keybase,
            "NAME" => Self::Name,
            "PROFILE_PICTURE" => Self::ProfilePicture,
            "STORAGE" => Self::Storage,
            "TWITTER" => Self::Twitter,
            _ => return None,
        })
    }
}

/// Typed content of a claim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimBody {
    /// Where the issuer's attestation service is reachable.
    AttestationServiceUrl { url: String },
    /// Another account controlled by the same party.
    Account {
        address: ChecksumAddress,
        public_key: Option<String>,
    },
    Domain { domain: String },
    Keybase { username: String },
    /// Display name.
    Name { name: String },
    Storage {
        address: String,
        filtered_data_paths: String,
    },
    /// Types whose content is carried but not interpreted.
    Opaque,
}

/// One claim, with the bytes it was signed over.
#[derive(Debug, Clone)]
pub struct Claim {
    /// Wire type name (`"NAME"`, `"ATTESTATION_SERVICE_URL"`, ...).
    pub claim_type: String,
    /// Claim creation time, seconds.
    pub timestamp: u64,
    /// Parsed content.
    pub body: ClaimBody,
    serialized: Box<RawValue>,
}

impl Claim {
    /// The claim exactly as it appeared in the document.
    pub fn serialized(&self) -> &str {
        self.serialized.get()
    }

    /// keccak256 of the serialized claim.
    pub fn hash(&self) -> Hash {
        keccak256(self.serialized.get().as_bytes())
    }

    fn parse(raw: Box<RawValue>) -> Result<Self, MetadataError> {
        let fields: Map<String, Value> = serde_json::from_str(raw.get())
            .map_err(|e| MetadataError::Malformed(format!("claim is not an object: {e}")))?;

        let claim_type = fields
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| MetadataError::Malformed("claim without type".to_string()))?
            .to_string();

        let timestamp = fields
            .get("timestamp")
            .and_then(Value::as_u64)
            .ok_or_else(|| MetadataError::MissingField {
                claim_type: claim_type.clone(),
                field: "timestamp",
            })?;

        let text = |field: &'static str| -> Result<String, MetadataError> {
            fields
                .get(field)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| MetadataError::MissingField {
                    claim_type: claim_type.clone(),
                    field,
                })
        };

        let body = match ClaimType::from_wire(&claim_type) {
            Some(ClaimType::AttestationServiceUrl) => {
                let url = text("url")?;
                if !is_valid_url(&url) {
                    return Err(MetadataError::InvalidUrl(url));
                }
                ClaimBody::AttestationServiceUrl { url }
            }
            Some(ClaimType::Account) => ClaimBody::Account {
                address: checksum(&text("address")?).map_err(MetadataError::InvalidAddress)?,
                public_key: fields
                    .get("publicKey")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            Some(ClaimType::Domain) => ClaimBody::Domain {
                domain: text("domain")?,
            },
            Some(ClaimType::Keybase) => ClaimBody::Keybase {
                username: text("username")?,
            },
            Some(ClaimType::Name) => ClaimBody::Name { name: text("name")? },
            Some(ClaimType::Storage) => ClaimBody::Storage {
                address: text("address")?,
                filtered_data_paths: text("filteredDataPaths")?,
            },
            Some(ClaimType::ProfilePicture) | Some(ClaimType::Twitter) | None => ClaimBody::Opaque,
        };

        Ok(Self {
            claim_type,
            timestamp,
            body,
            serialized: raw,
        })
    }
}

/// Signer block of a metadata document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimMeta {
    /// Account that claims authorship.
    pub address: ChecksumAddress,
    /// 65-byte signature, layout unknown.
    pub signature: Vec<u8>,
}

/// A parsed, not yet verified, metadata document.
#[derive(Debug, Clone)]
pub struct ClaimDocument {
    /// Claims in document order.
    pub claims: Vec<Claim>,
    /// Signer block.
    pub meta: ClaimMeta,
}

#[derive(Deserialize)]
struct RawDocument<'a> {
    #[serde(borrow)]
    claims: Vec<&'a RawValue>,
    meta: RawMeta,
}

#[derive(Deserialize)]
struct RawMeta {
    address: String,
    signature: String,
}

impl ClaimDocument {
    /// Parse a document and check its structure.
    ///
    /// Rejects empty claim lists, duplicate claim types, claims missing
    /// required fields, malformed service URLs and malformed addresses.
    /// The signature is NOT checked here.
    pub fn parse(body: &str) -> Result<Self, MetadataError> {
        let raw: RawDocument<'_> =
            serde_json::from_str(body).map_err(|e| MetadataError::Malformed(e.to_string()))?;

        if raw.claims.is_empty() {
            return Err(MetadataError::EmptyClaims);
        }

        let claims = raw
            .claims
            .into_iter()
            .map(|c| Claim::parse(c.to_owned()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut seen = HashSet::with_capacity(claims.len());
        for claim in &claims {
            if !seen.insert(claim.claim_type.as_str()) {
                return Err(MetadataError::DuplicateClaim(claim.claim_type.clone()));
            }
        }

        let address = checksum(&raw.meta.address).map_err(MetadataError::InvalidAddress)?;
        let signature_hex = raw
            .meta
            .signature
            .strip_prefix("0x")
            .unwrap_or(&raw.meta.signature);
        let signature =
            hex::decode(signature_hex).map_err(|_| MetadataError::InvalidSignatureEncoding)?;

        Ok(Self {
            claims,
            meta: ClaimMeta { address, signature },
        })
    }

    /// Aggregate claim hash that `meta.signature` signs (as a personal message).
    pub fn claims_hash(&self) -> Hash {
        aggregate_claims_hash(self.claims.iter().map(Claim::hash))
    }

    /// First claim of the given type.
    pub fn find(&self, claim_type: ClaimType) -> Option<&Claim> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_type.as_str())
    }

    /// URL of the attestation service claim, if any.
    pub fn attestation_service_url(&self) -> Option<&str> {
        match self.find(ClaimType::AttestationServiceUrl).map(|c| &c.body) {
            Some(ClaimBody::AttestationServiceUrl { url }) => Some(url),
            _ => None,
        }
    }

    /// Display name claim, if any.
    pub fn name(&self) -> Option<&str> {
        match self.find(ClaimType::Name).map(|c| &c.body) {
            Some(ClaimBody::Name { name }) => Some(name),
            _ => None,
        }
    }
}

/// keccak256 over the concatenation of per-claim digests.
pub fn aggregate_claims_hash(digests: impl IntoIterator<Item = Hash>) -> Hash {
    let mut buffer = Vec::new();
    for digest in digests {
        buffer.extend_from_slice(&digest);
    }
    keccak256(&buffer)
}

/// Permissive URL shape check: absolute, with a host.
pub fn is_valid_url(candidate: &str) -> bool {
    match reqwest::Url::parse(candidate) {
        Ok(url) => url.host_str().map_or(false, |h| !h.is_empty()),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNER: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

    fn document(claims: &str) -> String {
        format!(
            r#"{{"claims":{claims},"meta":{{"address":"{SIGNER}","signature":"0x{}"}}}}"#,
            "00".repeat(65)
        )
    }

    #[test]
    fn test_parses_known_claims() {
        let body = document(
            r#"[{"timestamp":1,"type":"ATTESTATION_SERVICE_URL","url":"https://att.example.org"},
                {"timestamp":2,"type":"NAME","name":"Issuer One"},
                {"timestamp":3,"type":"TWITTER","username":"issuer"}]"#,
        );
        let doc = ClaimDocument::parse(&body).unwrap();

        assert_eq!(doc.claims.len(), 3);
        assert_eq!(doc.attestation_service_url(), Some("https://att.example.org"));
        assert_eq!(doc.name(), Some("Issuer One"));
        assert_eq!(doc.claims[2].body, ClaimBody::Opaque);
        assert_eq!(doc.meta.address.as_str(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
        assert_eq!(doc.meta.signature.len(), 65);
    }

    #[test]
    fn test_empty_claims_rejected() {
        let result = ClaimDocument::parse(&document("[]"));
        assert!(matches!(result, Err(MetadataError::EmptyClaims)));
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let body = document(
            r#"[{"timestamp":1,"type":"NAME","name":"a"},{"timestamp":2,"type":"NAME","name":"b"}]"#,
        );
        let result = ClaimDocument::parse(&body);
        assert_eq!(result.err(), Some(MetadataError::DuplicateClaim("NAME".to_string())));
    }

    #[test]
    fn test_bad_service_url_rejected() {
        let body = document(r#"[{"timestamp":1,"type":"ATTESTATION_SERVICE_URL","url":"not a url"}]"#);
        assert!(matches!(
            ClaimDocument::parse(&body),
            Err(MetadataError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_missing_timestamp_rejected() {
        let body = document(r#"[{"type":"NAME","name":"a"}]"#);
        assert!(matches!(
            ClaimDocument::parse(&body),
            Err(MetadataError::MissingField { field: "timestamp", .. })
        ));
    }

    #[test]
    fn test_bad_meta_address_rejected() {
        let body = r#"{"claims":[{"timestamp":1,"type":"NAME","name":"a"}],"meta":{"address":"0x1234","signature":"0x00"}}"#;
        assert!(matches!(
            ClaimDocument::parse(body),
            Err(MetadataError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_hash_uses_original_bytes() {
        let compact = document(r#"[{"timestamp":1,"type":"NAME","name":"a"}]"#);
        let spaced = document(r#"[{"timestamp": 1, "type": "NAME", "name": "a"}]"#);

        let a = ClaimDocument::parse(&compact).unwrap();
        let b = ClaimDocument::parse(&spaced).unwrap();

        assert_eq!(a.claims[0].serialized(), r#"{"timestamp":1,"type":"NAME","name":"a"}"#);
        assert_ne!(a.claims_hash(), b.claims_hash());
        assert_eq!(
            a.claims_hash(),
            aggregate_claims_hash([keccak256(br#"{"timestamp":1,"type":"NAME","name":"a"}"#)])
        );
    }

    #[test]
    fn test_claim_order_changes_hash() {
        let one = document(
            r#"[{"timestamp":1,"type":"NAME","name":"a"},{"timestamp":1,"type":"DOMAIN","domain":"d"}]"#,
        );
        let two = document(
            r#"[{"timestamp":1,"type":"DOMAIN","domain":"d"},{"timestamp":1,"type":"NAME","name":"a"}]"#,
        );
        assert_ne!(
            ClaimDocument::parse(&one).unwrap().claims_hash(),
            ClaimDocument::parse(&two).unwrap().claims_hash()
        );
    }

    #[test]
    fn test_url_shapes() {
        assert!(is_valid_url("https://issuer.example"));
        assert!(is_valid_url("http://10.0.0.1:3000/"));
        assert!(!is_valid_url("issuer.example"));
        assert!(!is_valid_url(""));
    }
}
