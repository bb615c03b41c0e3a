use kemri_asn1::ExactDecodeError;
use picky_asn1_der::Asn1DerError;
use thiserror::Error;

use crate::pem::PemError;

#[derive(Debug, Error)]
pub enum CmsError {
    /// couldn't deserialize or serialize a DER structure
    #[error("ASN.1 error: {0}")]
    Asn1(#[from] Asn1DerError),

    #[error("{trailing} trailing byte(s) after the envelope")]
    TrailingData { trailing: usize },

    #[error("PEM error: {0}")]
    Pem(#[from] PemError),

    #[error("unknown {context} algorithm: {oid}")]
    UnknownAlgorithm { context: &'static str, oid: String },

    #[error("unexpected content type: {found}")]
    UnexpectedContentType { found: String },

    /// No recipient entry in the envelope matches the provided identity.
    #[error("no matching recipient")]
    NoMatchingRecipient,

    /// Key material has a size the negotiated algorithm cannot accept.
    #[error("invalid {context} size: expected {expected} bytes, found {found}")]
    InvalidKeySize {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// The kekLength field disagrees with the key-wrap algorithm.
    #[error("invalid kek length: {requested}")]
    InvalidKekLength { requested: usize },

    #[error("KEM encapsulation failed")]
    EncapsulationFailed,

    #[error("KEM decapsulation failed")]
    DecapsulationFailed,

    /// Key unwrap integrity check failed.
    #[error("integrity check failed")]
    IntegrityCheckFailed,

    /// AEAD tag verification failed; no plaintext was released.
    #[error("content authentication failed")]
    AuthenticationFailed,

    /// A certificate's declared key identifier does not match its key.
    #[error("certificate binding mismatch")]
    CertificateBindingMismatch,

    #[error("invalid envelope structure: {context}")]
    InvalidStructure { context: &'static str },
}

impl From<ExactDecodeError> for CmsError {
    fn from(err: ExactDecodeError) -> Self {
        match err {
            ExactDecodeError::Asn1(asn1) => CmsError::Asn1(asn1),
            ExactDecodeError::TrailingData { trailing } => CmsError::TrailingData { trailing },
        }
    }
}
