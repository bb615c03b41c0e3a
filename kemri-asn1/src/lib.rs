//! ASN.1 schemas for CMS envelopes carrying KEM recipients.
//!
//! Provides serde-annotated types for EnvelopedData, AuthEnvelopedData and
//! KEMRecipientInfo (RFC 5652, RFC 5083, RFC 9629) encoded with
//! `picky_asn1_der`. Schemas keep unparsed corners of the grammar (names,
//! certificates, attribute values) as opaque DER so they round-trip
//! byte-exactly.

#[macro_use]
mod macros;

pub mod algorithm_identifier;
pub mod attribute;
pub mod auth_enveloped_data;
pub mod cmsversion;
pub mod content_info;
pub mod enveloped_data;
pub mod kem_recipient_info;
pub mod oids;

pub use algorithm_identifier::{AlgorithmIdentifier, GcmParameters};
pub use attribute::Attribute;
pub use auth_enveloped_data::{AuthAttributes, AuthEnvelopedData, MessageAuthenticationCode, UnauthAttributes};
pub use cmsversion::CmsVersion;
pub use content_info::ContentInfo;
pub use enveloped_data::{
    ContentEncryptionAlgorithmIdentifier, ContentType, EncryptedContent, EncryptedContentInfo, EnvelopedData,
    OriginatorInfo, RecipientInfo, RecipientInfos, UnprotectedAttributes,
};
pub use kem_recipient_info::{
    CertificateSerialNumber, CmsKemOtherInfo, IssuerAndSerialNumber, KemRecipientInfo, OtherRecipientInfo,
    OtherRecipientInfoValue, RecipientIdentifier, SubjectKeyIdentifier, UserKeyingMaterial,
};

use picky_asn1_der::Asn1DerError;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExactDecodeError {
    #[error("couldn't deserialize DER: {0}")]
    Asn1(#[from] Asn1DerError),
    #[error("{trailing} trailing byte(s) after the top-level value")]
    TrailingData { trailing: usize },
}

/// Deserializes `data` and requires that the top-level value spans the
/// whole input. Plain `from_bytes` silently ignores trailing garbage,
/// which is unacceptable for envelope parsing.
pub fn from_bytes_exact<T: DeserializeOwned>(data: &[u8]) -> Result<T, ExactDecodeError> {
    let span = top_level_span(data)?;
    if span < data.len() {
        return Err(ExactDecodeError::TrailingData {
            trailing: data.len() - span,
        });
    }
    Ok(picky_asn1_der::from_bytes(data)?)
}

/// Computes the byte length of the first DER TLV in `data`.
fn top_level_span(data: &[u8]) -> Result<usize, Asn1DerError> {
    let first_len_byte = *data.get(1).ok_or(Asn1DerError::TruncatedData)?;
    if first_len_byte < 0x80 {
        return Ok(2 + usize::from(first_len_byte));
    }
    let len_bytes = usize::from(first_len_byte & 0x7F);
    if len_bytes == 0 || len_bytes > core::mem::size_of::<usize>() {
        return Err(Asn1DerError::InvalidData);
    }
    let mut len = 0usize;
    for offset in 0..len_bytes {
        let byte = *data.get(2 + offset).ok_or(Asn1DerError::TruncatedData)?;
        len = len.checked_mul(256).ok_or(Asn1DerError::InvalidData)? + usize::from(byte);
    }
    2usize
        .checked_add(len_bytes)
        .and_then(|header| header.checked_add(len))
        .ok_or(Asn1DerError::InvalidData)
}
