//! The two-part EIP-712 digest: a domain separator and a message struct
//! hash folded under the literal `0x19 0x01` version prefix. The result is
//! what a user signs off-chain and what a verifier recomputes from the
//! same schema and records.

use alloy_primitives::{Keccak256, B256};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

use crate::error::Result;
use crate::schema::TypeRegistry;

/// Struct type name of the signing domain, fixed by the standard.
pub const DOMAIN_TYPE: &str = "EIP712Domain";

/// A complete typed-data document in the `eth_signTypedData` interchange
/// form: the schema, the name of the message's type, and the two records
/// the digest is computed over.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TypedData {
    pub types: TypeRegistry,
    #[serde(rename = "primaryType")]
    pub primary_type: String,
    pub domain: Json,
    pub message: Json,
}

impl TypedData {
    /// Hash of the domain record. Binds every signature under this domain
    /// to one application, contract, and chain, so the same message signed
    /// for another context never verifies here.
    pub fn domain_separator(&self) -> Result<B256> {
        self.types.struct_hash(DOMAIN_TYPE, &self.domain)
    }

    /// Struct hash of the message record under `primary_type`.
    pub fn message_hash(&self) -> Result<B256> {
        self.types.struct_hash(&self.primary_type, &self.message)
    }

    /// The digest handed to the signer:
    /// `keccak256(0x19 0x01 || domainSeparator || hashStruct(message))`.
    pub fn signing_hash(&self) -> Result<B256> {
        Ok(compose_digest(self.domain_separator()?, self.message_hash()?))
    }
}

/// Fold a domain separator and a message struct hash into the final
/// digest. The two prefix bytes are emitted literally; they are the
/// standard's tag separating typed-data signatures from every other
/// signed-data scheme.
///
/// The struct hashes may come from two unrelated schemas; nothing requires
/// the domain and the message to be declared in the same registry.
pub fn compose_digest(domain_separator: B256, message_hash: B256) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update([0x19, 0x01]);
    hasher.update(domain_separator);
    hasher.update(message_hash);
    hasher.finalize()
}

/// Compute the EIP-712 signing digest of a typed-data JSON document.
pub fn signing_digest(typed_data_json: &str) -> Result<B256> {
    let typed: TypedData = serde_json::from_str(typed_data_json)?;
    typed.signing_hash()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldDef;
    use alloy_primitives::b256;
    use serde_json::json;

    fn domain_fields() -> Vec<FieldDef> {
        vec![
            FieldDef::new("name", "string"),
            FieldDef::new("version", "string"),
            FieldDef::new("chainId", "uint256"),
            FieldDef::new("verifyingContract", "address"),
        ]
    }

    /// The reference document from the standard itself, with published
    /// intermediate and final hashes.
    fn ether_mail() -> TypedData {
        serde_json::from_str(
            r#"{
                "types": {
                    "EIP712Domain": [
                        {"name": "name", "type": "string"},
                        {"name": "version", "type": "string"},
                        {"name": "chainId", "type": "uint256"},
                        {"name": "verifyingContract", "type": "address"}
                    ],
                    "Person": [
                        {"name": "name", "type": "string"},
                        {"name": "wallet", "type": "address"}
                    ],
                    "Mail": [
                        {"name": "from", "type": "Person"},
                        {"name": "to", "type": "Person"},
                        {"name": "contents", "type": "string"}
                    ]
                },
                "primaryType": "Mail",
                "domain": {
                    "name": "Ether Mail",
                    "version": "1",
                    "chainId": 1,
                    "verifyingContract": "0xCcCCccccCCCCcCCCCCCcCcCccCcCCCcCcccccccC"
                },
                "message": {
                    "from": {"name": "Cow", "wallet": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826"},
                    "to": {"name": "Bob", "wallet": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB"},
                    "contents": "Hello, Bob!"
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn ether_mail_reference_vectors() {
        let typed = ether_mail();
        assert_eq!(
            typed.types.type_hash("Mail").unwrap(),
            b256!("a0cedeb2dc280ba39b857546d74f5549c3a1d7bdc2dd96bf881f76108e23dac2")
        );
        assert_eq!(
            typed.domain_separator().unwrap(),
            b256!("f2cee375fa42b42143804025fc449deafd50cc031ca257e0b194a650a912090f")
        );
        assert_eq!(
            typed.message_hash().unwrap(),
            b256!("c52c0ee5d84264471806290a3f2c4cecfc5490626bf912d01f240d7a274b371e")
        );
        assert_eq!(
            typed.signing_hash().unwrap(),
            b256!("be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2")
        );
    }

    #[test]
    fn digest_is_deterministic() {
        let typed = ether_mail();
        assert_eq!(typed.signing_hash().unwrap(), typed.signing_hash().unwrap());
    }

    fn anchor_document(chain_id: u64) -> TypedData {
        let mut types = TypeRegistry::new();
        types.declare(DOMAIN_TYPE, domain_fields());
        types.declare("Message", vec![FieldDef::new("value", "uint256")]);
        TypedData {
            types,
            primary_type: "Message".to_owned(),
            domain: json!({
                "name": "Test",
                "version": "1",
                "chainId": chain_id,
                "verifyingContract": "0x0000000000000000000000000000000000000001"
            }),
            message: json!({"value": 1}),
        }
    }

    #[test]
    fn regression_anchor_digest() {
        assert_eq!(
            anchor_document(1).signing_hash().unwrap(),
            b256!("c7a8fc9a9961a2cefa1fd719970610c8f72450a49dff8d70404f62987f5ac0f9")
        );
    }

    #[test]
    fn chain_id_separates_otherwise_identical_messages() {
        let mainnet = anchor_document(1).signing_hash().unwrap();
        let testnet = anchor_document(42).signing_hash().unwrap();
        assert_eq!(
            testnet,
            b256!("3ca698897b12473836f29cdc66f3bdbbf84699336f9608847cdf5ad38ea01bd3")
        );
        assert_ne!(mainnet, testnet);
    }

    #[test]
    fn meta_transaction_shape_digest() {
        let mut types = TypeRegistry::new();
        types.declare(DOMAIN_TYPE, domain_fields());
        types.declare(
            "MetaTransaction",
            vec![
                FieldDef::new("nonce", "uint256"),
                FieldDef::new("from", "address"),
                FieldDef::new("functionSignature", "bytes"),
            ],
        );
        let typed = TypedData {
            types,
            primary_type: "MetaTransaction".to_owned(),
            domain: json!({
                "name": "ExchangeProxy",
                "version": "1",
                "chainId": 42,
                "verifyingContract": "0x9008D19f58AAbD9eD0D60971565AA8510560ab41"
            }),
            message: json!({
                "nonce": 0,
                "from": "0xCD2a3d9F938E13CD947Ec05AbC7FE734Df8DD826",
                "functionSignature": "0x8f111f3c"
            }),
        };

        assert_eq!(
            typed.types.type_hash("MetaTransaction").unwrap(),
            b256!("23d10def3caacba2e4042e0c75d44a42d2558aabcf5ce951d0642a8032e1e653")
        );
        assert_eq!(
            typed.message_hash().unwrap(),
            b256!("373f659b42ccb611211463669d059cc3c1300dde5125e3d76aad170823e6acb7")
        );
        assert_eq!(
            typed.signing_hash().unwrap(),
            b256!("c8497c6731085206e890fcf3ee9e6f79d45f720dcdc1d9810e025c8a18b70a5e")
        );
    }

    #[test]
    fn composing_from_separate_registries_matches_the_shared_form() {
        let typed = ether_mail();

        let mut domain_only = TypeRegistry::new();
        domain_only.declare(DOMAIN_TYPE, domain_fields());
        let mut message_only = TypeRegistry::new();
        message_only.declare(
            "Person",
            vec![
                FieldDef::new("name", "string"),
                FieldDef::new("wallet", "address"),
            ],
        );
        message_only.declare(
            "Mail",
            vec![
                FieldDef::new("from", "Person"),
                FieldDef::new("to", "Person"),
                FieldDef::new("contents", "string"),
            ],
        );

        let digest = compose_digest(
            domain_only.struct_hash(DOMAIN_TYPE, &typed.domain).unwrap(),
            message_only.struct_hash("Mail", &typed.message).unwrap(),
        );
        assert_eq!(digest, typed.signing_hash().unwrap());
    }

    #[test]
    fn signing_digest_parses_and_hashes() {
        let json = serde_json::to_string(&ether_mail()).unwrap();
        assert_eq!(
            signing_digest(&json).unwrap(),
            b256!("be609aee343fb3c4b28e1df9e632fca64fcfaede20f02e86244efddf30957bd2")
        );
        assert!(signing_digest("not json").is_err());
    }

    #[test]
    fn missing_domain_declaration_is_a_schema_error() {
        let mut typed = ether_mail();
        typed.types = {
            let mut types = TypeRegistry::new();
            types.declare("Mail", vec![FieldDef::new("contents", "string")]);
            types
        };
        assert!(matches!(
            typed.domain_separator(),
            Err(crate::Error::MissingType(ref name)) if name == DOMAIN_TYPE
        ));
    }
}
