//! Algorithm negotiation for the envelope profile.
//!
//! Each enum lists the algorithms this profile accepts and maps them to and
//! from `AlgorithmIdentifier` OIDs. Conversions from wire identifiers are
//! fallible; anything outside the registry is an [`CmsError::UnknownAlgorithm`].

use kemri_asn1::{oids, AlgorithmIdentifier, GcmParameters};
use picky_asn1::wrapper::{IntegerAsn1, OctetStringAsn1};

use crate::error::CmsError;

fn oid_string(identifier: &AlgorithmIdentifier) -> String {
    Into::<String>::into(&identifier.algorithm.0)
}

/// ML-KEM parameter sets (FIPS 203).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KemAlgorithm {
    MlKem512,
    MlKem768,
    MlKem1024,
}

impl KemAlgorithm {
    pub fn encapsulation_key_size(self) -> usize {
        match self {
            KemAlgorithm::MlKem512 => 800,
            KemAlgorithm::MlKem768 => 1184,
            KemAlgorithm::MlKem1024 => 1568,
        }
    }

    pub fn decapsulation_key_size(self) -> usize {
        match self {
            KemAlgorithm::MlKem512 => 1632,
            KemAlgorithm::MlKem768 => 2400,
            KemAlgorithm::MlKem1024 => 3168,
        }
    }

    pub fn ciphertext_size(self) -> usize {
        match self {
            KemAlgorithm::MlKem512 => 768,
            KemAlgorithm::MlKem768 => 1088,
            KemAlgorithm::MlKem1024 => 1568,
        }
    }

    /// All parameter sets produce a 32-byte shared secret.
    pub const SHARED_SECRET_SIZE: usize = 32;

    pub fn to_algorithm_identifier(self) -> AlgorithmIdentifier {
        match self {
            KemAlgorithm::MlKem512 => AlgorithmIdentifier::new_ml_kem_512(),
            KemAlgorithm::MlKem768 => AlgorithmIdentifier::new_ml_kem_768(),
            KemAlgorithm::MlKem1024 => AlgorithmIdentifier::new_ml_kem_1024(),
        }
    }
}

impl TryFrom<&AlgorithmIdentifier> for KemAlgorithm {
    type Error = CmsError;

    fn try_from(identifier: &AlgorithmIdentifier) -> Result<Self, Self::Error> {
        match oid_string(identifier).as_str() {
            oids::ID_ALG_ML_KEM_512 => Ok(KemAlgorithm::MlKem512),
            oids::ID_ALG_ML_KEM_768 => Ok(KemAlgorithm::MlKem768),
            oids::ID_ALG_ML_KEM_1024 => Ok(KemAlgorithm::MlKem1024),
            oid => Err(CmsError::UnknownAlgorithm {
                context: "kem",
                oid: oid.to_owned(),
            }),
        }
    }
}

/// Key derivation functions accepted for the KEK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfAlgorithm {
    HkdfSha256,
}

impl KdfAlgorithm {
    pub fn to_algorithm_identifier(self) -> AlgorithmIdentifier {
        match self {
            KdfAlgorithm::HkdfSha256 => AlgorithmIdentifier::new_hkdf_with_sha256(),
        }
    }
}

impl TryFrom<&AlgorithmIdentifier> for KdfAlgorithm {
    type Error = CmsError;

    fn try_from(identifier: &AlgorithmIdentifier) -> Result<Self, Self::Error> {
        match oid_string(identifier).as_str() {
            oids::ID_ALG_HKDF_WITH_SHA256 => Ok(KdfAlgorithm::HkdfSha256),
            oid => Err(CmsError::UnknownAlgorithm {
                context: "kdf",
                oid: oid.to_owned(),
            }),
        }
    }
}

/// AES Key Wrap variants (RFC 3394).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyWrapAlgorithm {
    Aes128,
    Aes256,
}

impl KeyWrapAlgorithm {
    pub fn key_size(self) -> usize {
        match self {
            KeyWrapAlgorithm::Aes128 => 16,
            KeyWrapAlgorithm::Aes256 => 32,
        }
    }

    /// Wrapping adds one 8-byte semiblock of integrity data.
    pub fn wrapped_key_size(self, key_size: usize) -> usize {
        key_size + 8
    }

    pub fn kek_length(self) -> IntegerAsn1 {
        IntegerAsn1::from_bytes_be_unsigned(vec![self.key_size() as u8])
    }

    pub fn to_algorithm_identifier(self) -> AlgorithmIdentifier {
        match self {
            KeyWrapAlgorithm::Aes128 => AlgorithmIdentifier::new_aes128_wrap(),
            KeyWrapAlgorithm::Aes256 => AlgorithmIdentifier::new_aes256_wrap(),
        }
    }
}

impl TryFrom<&AlgorithmIdentifier> for KeyWrapAlgorithm {
    type Error = CmsError;

    fn try_from(identifier: &AlgorithmIdentifier) -> Result<Self, Self::Error> {
        match oid_string(identifier).as_str() {
            oids::AES128_WRAP => Ok(KeyWrapAlgorithm::Aes128),
            oids::AES256_WRAP => Ok(KeyWrapAlgorithm::Aes256),
            oid => Err(CmsError::UnknownAlgorithm {
                context: "key wrap",
                oid: oid.to_owned(),
            }),
        }
    }
}

/// AEAD ciphers accepted for the content (RFC 5084).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentEncryptionAlgorithm {
    Aes128Gcm,
    Aes256Gcm,
}

impl ContentEncryptionAlgorithm {
    pub const NONCE_SIZE: usize = 12;
    pub const TAG_SIZE: usize = 16;

    pub fn key_size(self) -> usize {
        match self {
            ContentEncryptionAlgorithm::Aes128Gcm => 16,
            ContentEncryptionAlgorithm::Aes256Gcm => 32,
        }
    }

    pub fn to_algorithm_identifier(self, nonce: &[u8]) -> Result<AlgorithmIdentifier, CmsError> {
        let parameters = GcmParameters {
            nonce: OctetStringAsn1::from(nonce.to_vec()),
            icv_len: IntegerAsn1::from_bytes_be_unsigned(vec![Self::TAG_SIZE as u8]),
        };
        let identifier = match self {
            ContentEncryptionAlgorithm::Aes128Gcm => AlgorithmIdentifier::new_aes128_gcm(&parameters)?,
            ContentEncryptionAlgorithm::Aes256Gcm => AlgorithmIdentifier::new_aes256_gcm(&parameters)?,
        };
        Ok(identifier)
    }
}

impl TryFrom<&AlgorithmIdentifier> for ContentEncryptionAlgorithm {
    type Error = CmsError;

    fn try_from(identifier: &AlgorithmIdentifier) -> Result<Self, Self::Error> {
        match oid_string(identifier).as_str() {
            oids::AES128_GCM => Ok(ContentEncryptionAlgorithm::Aes128Gcm),
            oids::AES256_GCM => Ok(ContentEncryptionAlgorithm::Aes256Gcm),
            oid => Err(CmsError::UnknownAlgorithm {
                context: "content encryption",
                oid: oid.to_owned(),
            }),
        }
    }
}
