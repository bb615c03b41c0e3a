//! Building and opening CMS envelopes with KEM recipients.
//!
//! One parameterized builder covers both layouts: `EnvelopedData` joins the
//! AEAD tag to the ciphertext, `AuthEnvelopedData` detaches it into the
//! `mac` field and may carry authenticated attributes. The AAD is supplied
//! by the caller and must match on both sides; attributes travel with the
//! message but are not fed to the cipher.

use kemri_asn1::enveloped_data::{EncryptedContentInfo, EnvelopedData, RecipientInfo, RecipientInfos};
use kemri_asn1::kem_recipient_info::{KemRecipientInfo, OtherRecipientInfo, RecipientIdentifier, UserKeyingMaterial};
use kemri_asn1::{
    oids, Attribute, AuthAttributes, AuthEnvelopedData, CmsKemOtherInfo, CmsVersion, ContentInfo, GcmParameters,
};
use picky_asn1::wrapper::{ExplicitContextTag0, ImplicitContextTag1, OctetStringAsn1, Optional};
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::aead;
use crate::algorithm::{ContentEncryptionAlgorithm, KdfAlgorithm, KemAlgorithm, KeyWrapAlgorithm};
use crate::binder::{RecipientCertificate, RecipientIdentity};
use crate::error::CmsError;
use crate::kek::{derive_kek, unwrap_key, wrap_key};
use crate::kem;
use crate::pem::{parse_pem, to_pem, ENVELOPE_PEM_LABEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeKind {
    /// RFC 5652 EnvelopedData, tag joined to the ciphertext.
    Enveloped,
    /// RFC 5083 AuthEnvelopedData, detached tag in `mac`.
    AuthEnveloped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientIdentifierMode {
    SubjectKeyIdentifier,
    IssuerAndSerialNumber,
}

/// Everything that shapes an envelope apart from the recipient and the
/// content. The KEM itself is taken from the recipient certificate.
#[derive(Debug, Clone, PartialEq)]
pub struct EnvelopeProfile {
    pub kind: EnvelopeKind,
    pub kdf: KdfAlgorithm,
    pub key_wrap: KeyWrapAlgorithm,
    pub content_encryption: ContentEncryptionAlgorithm,
    pub identifier: RecipientIdentifierMode,
    pub ukm: Option<Vec<u8>>,
    pub auth_attributes: Vec<Attribute>,
}

impl EnvelopeProfile {
    pub fn enveloped(key_wrap: KeyWrapAlgorithm, content_encryption: ContentEncryptionAlgorithm) -> Self {
        Self {
            kind: EnvelopeKind::Enveloped,
            kdf: KdfAlgorithm::HkdfSha256,
            key_wrap,
            content_encryption,
            identifier: RecipientIdentifierMode::SubjectKeyIdentifier,
            ukm: None,
            auth_attributes: Vec::new(),
        }
    }

    pub fn auth_enveloped(key_wrap: KeyWrapAlgorithm, content_encryption: ContentEncryptionAlgorithm) -> Self {
        Self {
            kind: EnvelopeKind::AuthEnveloped,
            ..Self::enveloped(key_wrap, content_encryption)
        }
    }

    pub fn with_identifier(mut self, identifier: RecipientIdentifierMode) -> Self {
        self.identifier = identifier;
        self
    }

    pub fn with_ukm(mut self, ukm: Vec<u8>) -> Self {
        self.ukm = Some(ukm);
        self
    }

    pub fn with_auth_attribute(mut self, attribute: Attribute) -> Self {
        self.auth_attributes.push(attribute);
        self
    }
}

pub struct EnvelopeBuilder {
    profile: EnvelopeProfile,
}

impl EnvelopeBuilder {
    pub fn new(profile: EnvelopeProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &EnvelopeProfile {
        &self.profile
    }

    /// Encrypts `plaintext` to `recipient` and returns the enclosing
    /// ContentInfo.
    pub fn seal(
        &self,
        recipient: &RecipientCertificate,
        plaintext: &[u8],
        aad: &[u8],
        rng: &mut impl CryptoRngCore,
    ) -> Result<ContentInfo, CmsError> {
        let profile = &self.profile;

        let (kem_ct, shared_secret) = kem::encapsulate(recipient.kem, &recipient.public_key, rng)?;

        let other_info = CmsKemOtherInfo {
            wrap: profile.key_wrap.to_algorithm_identifier(),
            kek_length: profile.key_wrap.kek_length(),
            ukm: ukm_field(profile.ukm.as_deref()),
        };
        let kek = derive_kek(&shared_secret, profile.kdf, &other_info)?;

        let mut cek = Zeroizing::new(vec![0u8; profile.content_encryption.key_size()]);
        rng.fill_bytes(&mut cek);
        let mut nonce = [0u8; ContentEncryptionAlgorithm::NONCE_SIZE];
        rng.fill_bytes(&mut nonce);

        let encrypted_key = wrap_key(profile.key_wrap, &kek, &cek)?;
        let (ciphertext, tag) = aead::seal(profile.content_encryption, &cek, &nonce, aad, plaintext)?;

        let rid = match profile.identifier {
            RecipientIdentifierMode::SubjectKeyIdentifier => {
                RecipientIdentifier::new_subject_key_identifier(recipient.subject_key_identifier.clone())
            }
            RecipientIdentifierMode::IssuerAndSerialNumber => {
                RecipientIdentifier::IssuerAndSerialNumber(recipient.issuer_and_serial_number())
            }
        };

        let kem_recipient_info = KemRecipientInfo {
            version: CmsVersion::V0,
            rid,
            kem: recipient.kem.to_algorithm_identifier(),
            kem_ct: OctetStringAsn1::from(kem_ct),
            kdf: profile.kdf.to_algorithm_identifier(),
            kek_length: other_info.kek_length.clone(),
            ukm: other_info.ukm.clone(),
            wrap: other_info.wrap.clone(),
            encrypted_key: OctetStringAsn1::from(encrypted_key),
        };
        let recipient_infos =
            RecipientInfos::from(vec![RecipientInfo::Ori(OtherRecipientInfo::new_kem(kem_recipient_info))]);

        let content_encryption_algorithm = profile.content_encryption.to_algorithm_identifier(&nonce)?;

        match profile.kind {
            EnvelopeKind::Enveloped => {
                let mut joined = ciphertext;
                joined.extend_from_slice(&tag);
                let enveloped = EnvelopedData {
                    version: CmsVersion::V3,
                    originator_info: Optional::from(None),
                    recipient_infos,
                    encrypted_content_info: EncryptedContentInfo::new_data(content_encryption_algorithm, joined),
                    unprotected_attrs: Optional::from(None),
                };
                Ok(ContentInfo::new(
                    oids::id_enveloped_data(),
                    picky_asn1_der::to_vec(&enveloped)?,
                ))
            }
            EnvelopeKind::AuthEnveloped => {
                let auth_attrs = if profile.auth_attributes.is_empty() {
                    Optional::from(None)
                } else {
                    Optional::from(Some(ImplicitContextTag1::from(AuthAttributes::from(
                        profile.auth_attributes.clone(),
                    ))))
                };
                let auth_enveloped = AuthEnvelopedData {
                    version: CmsVersion::V0,
                    originator_info: Optional::from(None),
                    recipient_infos,
                    auth_encrypted_content_info: EncryptedContentInfo::new_data(
                        content_encryption_algorithm,
                        ciphertext,
                    ),
                    auth_attrs,
                    mac: OctetStringAsn1::from(tag),
                    unauth_attrs: Optional::from(None),
                };
                Ok(ContentInfo::new(
                    oids::id_ct_auth_enveloped_data(),
                    picky_asn1_der::to_vec(&auth_enveloped)?,
                ))
            }
        }
    }

    /// Like [`EnvelopeBuilder::seal`] but returns the DER-encoded
    /// ContentInfo.
    pub fn seal_to_der(
        &self,
        recipient: &RecipientCertificate,
        plaintext: &[u8],
        aad: &[u8],
        rng: &mut impl CryptoRngCore,
    ) -> Result<Vec<u8>, CmsError> {
        let content_info = self.seal(recipient, plaintext, aad, rng)?;
        Ok(picky_asn1_der::to_vec(&content_info)?)
    }

    /// Like [`EnvelopeBuilder::seal`] but returns a PEM string with the
    /// `CMS` label.
    pub fn seal_to_pem(
        &self,
        recipient: &RecipientCertificate,
        plaintext: &[u8],
        aad: &[u8],
        rng: &mut impl CryptoRngCore,
    ) -> Result<String, CmsError> {
        let der = self.seal_to_der(recipient, plaintext, aad, rng)?;
        Ok(to_pem(ENVELOPE_PEM_LABEL, &der))
    }
}

fn ukm_field(ukm: Option<&[u8]>) -> Optional<Option<ExplicitContextTag0<UserKeyingMaterial>>> {
    Optional::from(ukm.map(|ukm| ExplicitContextTag0::from(UserKeyingMaterial::from(ukm.to_vec()))))
}

/// Opens a DER-encoded envelope ContentInfo addressed to `identity`.
pub fn open_envelope(der: &[u8], identity: &RecipientIdentity, aad: &[u8]) -> Result<Vec<u8>, CmsError> {
    let content_info: ContentInfo = kemri_asn1::from_bytes_exact(der)?;
    let content_type = Into::<String>::into(&content_info.content_type.0);
    match content_type.as_str() {
        oids::ID_ENVELOPED_DATA => open_enveloped(content_info.content(), identity, aad),
        oids::ID_CT_AUTH_ENVELOPED_DATA => open_auth_enveloped(content_info.content(), identity, aad),
        _ => Err(CmsError::UnexpectedContentType { found: content_type }),
    }
}

/// Opens a PEM-encoded envelope.
pub fn open_envelope_pem(pem: &str, identity: &RecipientIdentity, aad: &[u8]) -> Result<Vec<u8>, CmsError> {
    let pem = parse_pem(pem)?;
    open_envelope(pem.data(), identity, aad)
}

fn open_enveloped(content: &[u8], identity: &RecipientIdentity, aad: &[u8]) -> Result<Vec<u8>, CmsError> {
    let enveloped: EnvelopedData = kemri_asn1::from_bytes_exact(content)?;
    if enveloped.version != CmsVersion::V3 {
        return Err(CmsError::InvalidStructure {
            context: "EnvelopedData version",
        });
    }

    let (content_encryption, nonce) = content_encryption_setup(&enveloped.encrypted_content_info)?;
    let joined = enveloped
        .encrypted_content_info
        .encrypted_content()
        .ok_or(CmsError::InvalidStructure {
            context: "missing encrypted content",
        })?;
    if joined.len() < ContentEncryptionAlgorithm::TAG_SIZE {
        return Err(CmsError::InvalidStructure {
            context: "encrypted content shorter than the tag",
        });
    }
    let (ciphertext, tag) = joined.split_at(joined.len() - ContentEncryptionAlgorithm::TAG_SIZE);

    let cek = recover_cek(&enveloped.recipient_infos, identity)?;
    aead::open(content_encryption, &cek, &nonce, aad, ciphertext, tag)
}

fn open_auth_enveloped(content: &[u8], identity: &RecipientIdentity, aad: &[u8]) -> Result<Vec<u8>, CmsError> {
    let auth_enveloped: AuthEnvelopedData = kemri_asn1::from_bytes_exact(content)?;
    if auth_enveloped.version != CmsVersion::V0 {
        return Err(CmsError::InvalidStructure {
            context: "AuthEnvelopedData version",
        });
    }

    let (content_encryption, nonce) = content_encryption_setup(&auth_enveloped.auth_encrypted_content_info)?;
    let ciphertext = auth_enveloped
        .auth_encrypted_content_info
        .encrypted_content()
        .ok_or(CmsError::InvalidStructure {
            context: "missing encrypted content",
        })?;

    let cek = recover_cek(&auth_enveloped.recipient_infos, identity)?;
    aead::open(
        content_encryption,
        &cek,
        &nonce,
        aad,
        ciphertext,
        &auth_enveloped.mac.0,
    )
}

fn content_encryption_setup(
    encrypted_content_info: &EncryptedContentInfo,
) -> Result<(ContentEncryptionAlgorithm, Vec<u8>), CmsError> {
    let content_type = Into::<String>::into(&encrypted_content_info.content_type.0);
    if content_type != oids::ID_DATA {
        return Err(CmsError::UnexpectedContentType { found: content_type });
    }
    let content_encryption = ContentEncryptionAlgorithm::try_from(&encrypted_content_info.content_encryption_algorithm)?;
    let parameters: GcmParameters = encrypted_content_info.content_encryption_algorithm.gcm_parameters()?;
    if parameters.icv_len.as_unsigned_bytes_be() != [ContentEncryptionAlgorithm::TAG_SIZE as u8] {
        return Err(CmsError::InvalidStructure { context: "icv length" });
    }
    Ok((content_encryption, parameters.nonce.0))
}

/// Finds the recipient entry addressed to `identity`, validates every
/// algorithm identifier it names, then runs decapsulation, KEK derivation
/// and key unwrap. Unknown algorithms are rejected before any key material
/// is touched.
fn recover_cek(recipient_infos: &RecipientInfos, identity: &RecipientIdentity) -> Result<Zeroizing<Vec<u8>>, CmsError> {
    let kem_recipient_info = recipient_infos
        .0
        .iter()
        .map(|recipient_info| recipient_info.ori().kem())
        .find(|kem_recipient_info| identity.matches(&kem_recipient_info.rid))
        .ok_or(CmsError::NoMatchingRecipient)?;

    let kem_algorithm = KemAlgorithm::try_from(&kem_recipient_info.kem)?;
    let kdf = KdfAlgorithm::try_from(&kem_recipient_info.kdf)?;
    let key_wrap = KeyWrapAlgorithm::try_from(&kem_recipient_info.wrap)?;
    if kem_algorithm != identity.kem {
        return Err(CmsError::InvalidStructure {
            context: "kem algorithm mismatch",
        });
    }

    let shared_secret = kem::decapsulate(
        kem_algorithm,
        &identity.decapsulation_key,
        &kem_recipient_info.kem_ct.0,
    )?;

    let other_info = CmsKemOtherInfo {
        wrap: kem_recipient_info.wrap.clone(),
        kek_length: kem_recipient_info.kek_length.clone(),
        ukm: kem_recipient_info.ukm.clone(),
    };
    let kek = derive_kek(&shared_secret, kdf, &other_info)?;

    unwrap_key(key_wrap, &kek, &kem_recipient_info.encrypted_key.0)
}
