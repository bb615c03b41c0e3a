use picky_asn1::wrapper::{IntegerAsn1, ObjectIdentifierAsn1, OctetStringAsn1, Optional};
use picky_asn1_der::Asn1RawDer;
use serde::{Deserialize, Serialize};

use crate::oids;

/// [AlgorithmIdentifier](https://www.rfc-editor.org/rfc/rfc5652#section-10.1)
///
/// ```not_rust
/// AlgorithmIdentifier ::= SEQUENCE {
///   algorithm OBJECT IDENTIFIER,
///   parameters ANY DEFINED BY algorithm OPTIONAL }
/// ```
///
/// Parameters are carried as opaque DER. The only parameter shape this
/// schema interprets is [`GcmParameters`]; everything else is matched on
/// the algorithm OID alone.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct AlgorithmIdentifier {
    pub algorithm: ObjectIdentifierAsn1,
    #[serde(default)]
    pub parameters: Optional<Option<Asn1RawDer>>,
}

impl AlgorithmIdentifier {
    pub fn new(algorithm: oid::ObjectIdentifier) -> Self {
        Self {
            algorithm: algorithm.into(),
            parameters: Optional::from(None),
        }
    }

    pub fn new_ml_kem_512() -> Self {
        Self::new(oids::id_alg_ml_kem_512())
    }

    pub fn new_ml_kem_768() -> Self {
        Self::new(oids::id_alg_ml_kem_768())
    }

    pub fn new_ml_kem_1024() -> Self {
        Self::new(oids::id_alg_ml_kem_1024())
    }

    pub fn new_hkdf_with_sha256() -> Self {
        Self::new(oids::id_alg_hkdf_with_sha256())
    }

    pub fn new_aes128_wrap() -> Self {
        Self::new(oids::aes128_wrap())
    }

    pub fn new_aes256_wrap() -> Self {
        Self::new(oids::aes256_wrap())
    }

    pub fn new_aes128_gcm(parameters: &GcmParameters) -> picky_asn1_der::Result<Self> {
        Ok(Self {
            algorithm: oids::aes128_gcm().into(),
            parameters: Optional::from(Some(Asn1RawDer(picky_asn1_der::to_vec(parameters)?))),
        })
    }

    pub fn new_aes256_gcm(parameters: &GcmParameters) -> picky_asn1_der::Result<Self> {
        Ok(Self {
            algorithm: oids::aes256_gcm().into(),
            parameters: Optional::from(Some(Asn1RawDer(picky_asn1_der::to_vec(parameters)?))),
        })
    }

    /// Parses the parameters field as RFC 5084 GCM parameters.
    pub fn gcm_parameters(&self) -> picky_asn1_der::Result<GcmParameters> {
        match &self.parameters.0 {
            Some(raw) => picky_asn1_der::from_bytes(&raw.0),
            None => Err(picky_asn1_der::Asn1DerError::TruncatedData),
        }
    }
}

/// [GCMParameters](https://www.rfc-editor.org/rfc/rfc5084#section-3.2)
///
/// ```not_rust
/// GCMParameters ::= SEQUENCE {
///   aes-nonce OCTET STRING,
///   aes-ICVlen AES-GCM-ICVlen DEFAULT 12 }
/// ```
///
/// The ICV length is always written explicitly, matching what OpenSSL
/// and the interop peers emit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GcmParameters {
    pub nonce: OctetStringAsn1,
    pub icv_len: IntegerAsn1,
}
