//! Binding between recipients and envelope identifiers.
//!
//! A recipient is addressed either by the SHA-1 key identifier of its
//! encapsulation key or by the issuer and serial number of its certificate.
//! Certificate parsing and chain building live outside this crate; callers
//! hand over the few fields an envelope needs and may hook their own chain
//! validation through [`ChainVerifier`].

use kemri_asn1::{CertificateSerialNumber, IssuerAndSerialNumber, RecipientIdentifier};
use picky_asn1::wrapper::IntegerAsn1;
use picky_asn1_der::Asn1RawDer;
use sha1::{Digest, Sha1};
use zeroize::Zeroizing;

use crate::algorithm::KemAlgorithm;
use crate::error::CmsError;

/// Computes the key identifier of an encapsulation key: the SHA-1 digest
/// of the raw key bytes (RFC 5280 section 4.2.1.2 method 1).
pub fn subject_key_identifier(public_key: &[u8]) -> Vec<u8> {
    Sha1::digest(public_key).to_vec()
}

/// The recipient-side view of a certificate: just the fields an envelope
/// needs to address and encrypt to its subject.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipientCertificate {
    pub kem: KemAlgorithm,
    pub public_key: Vec<u8>,
    pub subject_key_identifier: Vec<u8>,
    /// DER-encoded issuer Name, kept opaque.
    pub issuer: Vec<u8>,
    /// Unsigned big-endian serial number.
    pub serial_number: Vec<u8>,
}

impl RecipientCertificate {
    /// Binds an encapsulation key to its certificate naming fields. The key
    /// identifier is derived from the key itself.
    pub fn bind(kem: KemAlgorithm, public_key: Vec<u8>, issuer: Vec<u8>, serial_number: Vec<u8>) -> Result<Self, CmsError> {
        if public_key.len() != kem.encapsulation_key_size() {
            return Err(CmsError::InvalidKeySize {
                context: "encapsulation key",
                expected: kem.encapsulation_key_size(),
                found: public_key.len(),
            });
        }
        let subject_key_identifier = subject_key_identifier(&public_key);
        Ok(Self {
            kem,
            public_key,
            subject_key_identifier,
            issuer,
            serial_number,
        })
    }

    /// Like [`RecipientCertificate::bind`] but checks the key identifier
    /// declared in the certificate against the one derived from the key.
    pub fn bind_with_declared_key_id(
        kem: KemAlgorithm,
        public_key: Vec<u8>,
        declared_key_id: Vec<u8>,
        issuer: Vec<u8>,
        serial_number: Vec<u8>,
    ) -> Result<Self, CmsError> {
        let certificate = Self::bind(kem, public_key, issuer, serial_number)?;
        if certificate.subject_key_identifier != declared_key_id {
            return Err(CmsError::CertificateBindingMismatch);
        }
        Ok(certificate)
    }

    pub fn issuer_and_serial_number(&self) -> IssuerAndSerialNumber {
        IssuerAndSerialNumber {
            issuer: Asn1RawDer(self.issuer.clone()),
            serial_number: CertificateSerialNumber(IntegerAsn1::from_bytes_be_unsigned(self.serial_number.clone())),
        }
    }
}

/// Hook for validating a recipient certificate before encrypting to it.
pub trait ChainVerifier {
    fn verify(&self, certificate: &RecipientCertificate) -> Result<(), CmsError>;
}

impl<F> ChainVerifier for F
where
    F: Fn(&RecipientCertificate) -> Result<(), CmsError>,
{
    fn verify(&self, certificate: &RecipientCertificate) -> Result<(), CmsError> {
        self(certificate)
    }
}

/// The decrypting side: a decapsulation key plus the identifiers under
/// which envelopes may address it.
pub struct RecipientIdentity {
    pub kem: KemAlgorithm,
    pub decapsulation_key: Zeroizing<Vec<u8>>,
    pub subject_key_identifier: Option<Vec<u8>>,
    pub issuer_and_serial: Option<(Vec<u8>, Vec<u8>)>,
}

impl RecipientIdentity {
    pub fn new(kem: KemAlgorithm, decapsulation_key: Zeroizing<Vec<u8>>) -> Self {
        Self {
            kem,
            decapsulation_key,
            subject_key_identifier: None,
            issuer_and_serial: None,
        }
    }

    /// Takes over every identifier the certificate carries.
    pub fn for_certificate(certificate: &RecipientCertificate, decapsulation_key: Zeroizing<Vec<u8>>) -> Self {
        Self {
            kem: certificate.kem,
            decapsulation_key,
            subject_key_identifier: Some(certificate.subject_key_identifier.clone()),
            issuer_and_serial: Some((certificate.issuer.clone(), certificate.serial_number.clone())),
        }
    }

    pub fn with_subject_key_identifier(mut self, key_id: Vec<u8>) -> Self {
        self.subject_key_identifier = Some(key_id);
        self
    }

    pub fn with_issuer_and_serial(mut self, issuer: Vec<u8>, serial_number: Vec<u8>) -> Self {
        self.issuer_and_serial = Some((issuer, serial_number));
        self
    }

    /// Whether an envelope recipient entry addresses this identity.
    pub fn matches(&self, rid: &RecipientIdentifier) -> bool {
        match rid {
            RecipientIdentifier::SubjectKeyIdentifier(key_id) => self
                .subject_key_identifier
                .as_deref()
                .map(|known| known == key_id.0 .0 .0.as_slice())
                .unwrap_or(false),
            RecipientIdentifier::IssuerAndSerialNumber(issuer_and_serial) => self
                .issuer_and_serial
                .as_ref()
                .map(|(issuer, serial)| {
                    issuer.as_slice() == issuer_and_serial.issuer.0.as_slice()
                        && serial.as_slice() == issuer_and_serial.serial_number.0.as_unsigned_bytes_be()
                })
                .unwrap_or(false),
        }
    }
}
