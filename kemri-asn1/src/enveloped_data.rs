use core::fmt;

use picky_asn1::tag::{TagClass, TagPeeker};
use picky_asn1::wrapper::{
    Asn1SetOf, ExplicitContextTag4, ImplicitContextTag0, ImplicitContextTag1, ObjectIdentifierAsn1, OctetStringAsn1,
    Optional,
};
use picky_asn1_der::Asn1RawDer;
use serde::{de, ser, Deserialize, Serialize};

use crate::cmsversion::CmsVersion;
use crate::kem_recipient_info::{OtherRecipientInfo, OtherRecipientInfoValue};
use crate::{oids, AlgorithmIdentifier, Attribute};

/// [EnvelopedData Type](https://www.rfc-editor.org/rfc/rfc5652#section-6.1)
///
/// ```not_rust
/// EnvelopedData ::= SEQUENCE {
///   version CMSVersion,
///   originatorInfo [0] IMPLICIT OriginatorInfo OPTIONAL,
///   recipientInfos RecipientInfos,
///   encryptedContentInfo EncryptedContentInfo,
///   unprotectedAttrs [1] IMPLICIT UnprotectedAttributes OPTIONAL }
/// ```
///
/// The implicitly tagged constructed fields are (de)serialized by hand:
/// implicit tagging of a SET or SEQUENCE keeps the constructed bit, which
/// the generic context-tag wrappers lose.
#[derive(Debug, PartialEq)]
pub struct EnvelopedData {
    pub version: CmsVersion,
    pub originator_info: Optional<Option<ImplicitContextTag0<OriginatorInfo>>>,
    pub recipient_infos: RecipientInfos,
    pub encrypted_content_info: EncryptedContentInfo,
    pub unprotected_attrs: Optional<Option<ImplicitContextTag1<UnprotectedAttributes>>>,
}

/// Implicit tagging replaces the outer identifier octet of a complete DER
/// element; length and content are untouched. Works for single-byte tags
/// only, which covers every context number this schema uses.
pub(crate) fn retag(mut der: Vec<u8>, tag: u8) -> Vec<u8> {
    if let Some(first) = der.first_mut() {
        *first = tag;
    }
    der
}

impl Serialize for EnvelopedData {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        use ser::{Error, SerializeSeq};

        let mut element_count = 3;
        if self.originator_info.0.is_some() {
            element_count += 1;
        }
        if self.unprotected_attrs.0.is_some() {
            element_count += 1;
        }

        let mut seq = serializer.serialize_seq(Some(element_count))?;
        seq.serialize_element(&self.version)?;
        if let Some(originator_info) = &self.originator_info.0 {
            let der = picky_asn1_der::to_vec(&originator_info.0)
                .map_err(|err| S::Error::custom(format!("Cannot serialize OriginatorInfo: {:?}", err)))?;
            seq.serialize_element(&Asn1RawDer(retag(der, 0xA0)))?;
        }
        seq.serialize_element(&self.recipient_infos)?;
        seq.serialize_element(&self.encrypted_content_info)?;
        if let Some(unprotected_attrs) = &self.unprotected_attrs.0 {
            let der = picky_asn1_der::to_vec(&unprotected_attrs.0)
                .map_err(|err| S::Error::custom(format!("Cannot serialize UnprotectedAttributes: {:?}", err)))?;
            seq.serialize_element(&Asn1RawDer(retag(der, 0xA1)))?;
        }
        seq.end()
    }
}

impl<'de> de::Deserialize<'de> for EnvelopedData {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = EnvelopedData;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid DER-encoded EnvelopedData")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let version: CmsVersion = seq_next_element!(seq, EnvelopedData, "version");

                let tag_peeker: TagPeeker = seq_next_element!(seq, EnvelopedData, "a tag");
                let originator_info = if tag_peeker.next_tag.class_and_number() == (TagClass::ContextSpecific, 0) {
                    let raw: Asn1RawDer = seq_next_element!(seq, EnvelopedData, "originatorInfo");
                    let originator_info: OriginatorInfo = picky_asn1_der::from_bytes(&retag(raw.0, 0x30)).map_err(
                        |_| serde_invalid_value!(EnvelopedData, "invalid originatorInfo", "a valid OriginatorInfo"),
                    )?;
                    Optional::from(Some(ImplicitContextTag0::from(originator_info)))
                } else {
                    Optional::from(None)
                };

                let recipient_infos: RecipientInfos = seq_next_element!(seq, EnvelopedData, "recipientInfos");
                let encrypted_content_info: EncryptedContentInfo =
                    seq_next_element!(seq, EnvelopedData, "encryptedContentInfo");

                let unprotected_attrs = match seq.next_element::<TagPeeker>()? {
                    Some(tag_peeker) if tag_peeker.next_tag.class_and_number() == (TagClass::ContextSpecific, 1) => {
                        let raw: Asn1RawDer = seq_next_element!(seq, EnvelopedData, "unprotectedAttrs");
                        let attrs: UnprotectedAttributes =
                            picky_asn1_der::from_bytes(&retag(raw.0, 0x31)).map_err(|_| {
                                serde_invalid_value!(EnvelopedData, "invalid unprotectedAttrs", "a valid attribute set")
                            })?;
                        Optional::from(Some(ImplicitContextTag1::from(attrs)))
                    }
                    _ => Optional::from(None),
                };

                Ok(EnvelopedData {
                    version,
                    originator_info,
                    recipient_infos,
                    encrypted_content_info,
                    unprotected_attrs,
                })
            }
        }

        deserializer.deserialize_seq(Visitor)
    }
}

/// [OriginatorInfo](https://www.rfc-editor.org/rfc/rfc5652#section-6.1)
///
/// ```not_rust
/// OriginatorInfo ::= SEQUENCE {
///   certs [0] IMPLICIT CertificateSet OPTIONAL,
///   crls [1] IMPLICIT RevocationInfoChoices OPTIONAL }
/// ```
///
/// Certificates and CRLs are carried as opaque DER; this crate never
/// originates or inspects them. Both fields are implicitly tagged SETs,
/// so they go through the same re-tagging path as the attribute fields.
#[derive(Debug, PartialEq)]
pub struct OriginatorInfo {
    pub certs: Optional<Option<ImplicitContextTag0<Asn1SetOf<Asn1RawDer>>>>,
    pub crls: Optional<Option<ImplicitContextTag1<Asn1SetOf<Asn1RawDer>>>>,
}

impl Serialize for OriginatorInfo {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        use ser::{Error, SerializeSeq};

        let element_count = usize::from(self.certs.0.is_some()) + usize::from(self.crls.0.is_some());

        let mut seq = serializer.serialize_seq(Some(element_count))?;
        if let Some(certs) = &self.certs.0 {
            let der = picky_asn1_der::to_vec(&certs.0)
                .map_err(|err| S::Error::custom(format!("Cannot serialize certs: {:?}", err)))?;
            seq.serialize_element(&Asn1RawDer(retag(der, 0xA0)))?;
        }
        if let Some(crls) = &self.crls.0 {
            let der = picky_asn1_der::to_vec(&crls.0)
                .map_err(|err| S::Error::custom(format!("Cannot serialize crls: {:?}", err)))?;
            seq.serialize_element(&Asn1RawDer(retag(der, 0xA1)))?;
        }
        seq.end()
    }
}

impl<'de> de::Deserialize<'de> for OriginatorInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = OriginatorInfo;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid DER-encoded OriginatorInfo")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let certs = match seq.next_element::<TagPeeker>()? {
                    Some(tag_peeker) if tag_peeker.next_tag.class_and_number() == (TagClass::ContextSpecific, 0) => {
                        let raw: Asn1RawDer = seq_next_element!(seq, OriginatorInfo, "certs");
                        let certs: Asn1SetOf<Asn1RawDer> =
                            picky_asn1_der::from_bytes(&retag(raw.0, 0x31)).map_err(|_| {
                                serde_invalid_value!(OriginatorInfo, "invalid certs", "a valid certificate set")
                            })?;
                        Optional::from(Some(ImplicitContextTag0::from(certs)))
                    }
                    _ => Optional::from(None),
                };

                let crls = match seq.next_element::<TagPeeker>()? {
                    Some(tag_peeker) if tag_peeker.next_tag.class_and_number() == (TagClass::ContextSpecific, 1) => {
                        let raw: Asn1RawDer = seq_next_element!(seq, OriginatorInfo, "crls");
                        let crls: Asn1SetOf<Asn1RawDer> = picky_asn1_der::from_bytes(&retag(raw.0, 0x31))
                            .map_err(|_| serde_invalid_value!(OriginatorInfo, "invalid crls", "a valid crl set"))?;
                        Optional::from(Some(ImplicitContextTag1::from(crls)))
                    }
                    _ => Optional::from(None),
                };

                Ok(OriginatorInfo { certs, crls })
            }
        }

        deserializer.deserialize_seq(Visitor)
    }
}

/// [Content Type](https://www.rfc-editor.org/rfc/rfc5652#section-11.1)
///
/// ```not_rust
/// ContentType ::= OBJECT IDENTIFIER
/// ```
pub type ContentType = ObjectIdentifierAsn1;

/// [ContentEncryptionAlgorithmIdentifier](https://www.rfc-editor.org/rfc/rfc5652#section-10.1.4)
///
/// ```not_rust
/// ContentEncryptionAlgorithmIdentifier ::= AlgorithmIdentifier
/// ```
pub type ContentEncryptionAlgorithmIdentifier = AlgorithmIdentifier;

/// [EncryptedContent](https://www.rfc-editor.org/rfc/rfc5652#section-6.1)
///
/// ```not_rust
/// EncryptedContent ::= OCTET STRING
/// ```
pub type EncryptedContent = OctetStringAsn1;

/// [EncryptedContentInfo](https://www.rfc-editor.org/rfc/rfc5652#section-6.1)
///
/// ```not_rust
/// EncryptedContentInfo ::= SEQUENCE {
///   contentType ContentType,
///   contentEncryptionAlgorithm ContentEncryptionAlgorithmIdentifier,
///   encryptedContent [0] IMPLICIT EncryptedContent OPTIONAL }
/// ```
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct EncryptedContentInfo {
    pub content_type: ContentType,
    pub content_encryption_algorithm: ContentEncryptionAlgorithmIdentifier,
    #[serde(default)]
    pub encrypted_content: Optional<Option<ImplicitContextTag0<EncryptedContent>>>,
}

impl EncryptedContentInfo {
    pub fn new_data(content_encryption_algorithm: AlgorithmIdentifier, encrypted_content: Vec<u8>) -> Self {
        Self {
            content_type: ContentType::from(oids::id_data()),
            content_encryption_algorithm,
            encrypted_content: Optional::from(Some(ImplicitContextTag0::from(EncryptedContent::from(
                encrypted_content,
            )))),
        }
    }

    /// Returns the encrypted content bytes when present.
    pub fn encrypted_content(&self) -> Option<&[u8]> {
        self.encrypted_content
            .0
            .as_ref()
            .map(|content| content.0 .0.as_slice())
    }
}

/// [UnprotectedAttributes](https://www.rfc-editor.org/rfc/rfc5652#section-6.1)
///
/// ```not_rust
/// UnprotectedAttributes ::= SET SIZE (1..MAX) OF Attribute
/// ```
pub type UnprotectedAttributes = Asn1SetOf<Attribute>;

/// [RecipientInfos](https://www.rfc-editor.org/rfc/rfc5652#section-6.1)
///
/// ```not_rust
/// RecipientInfos ::= SET SIZE (1..MAX) OF RecipientInfo
/// ```
pub type RecipientInfos = Asn1SetOf<RecipientInfo>;

/// [RecipientInfo Type](https://www.rfc-editor.org/rfc/rfc5652#section-6.2)
///
/// ```not_rust
/// RecipientInfo ::= CHOICE {
///   ktri KeyTransRecipientInfo,
///   kari [1] KeyAgreeRecipientInfo,
///   kekri [2] KEKRecipientInfo,
///   pwri [3] PasswordRecipientinfo,
///   ori [4] OtherRecipientInfo }
/// ```
///
/// Only the ori arm is part of this profile; every other choice is a
/// decode error.
#[derive(Debug, Clone, PartialEq)]
pub enum RecipientInfo {
    Ori(OtherRecipientInfo),
}

impl RecipientInfo {
    pub fn ori(&self) -> &OtherRecipientInfo {
        match self {
            RecipientInfo::Ori(other_recipient_info) => other_recipient_info,
        }
    }
}

impl<'de> Deserialize<'de> for RecipientInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = RecipientInfo;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid DER-encoded RecipientInfo")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let tag_peeker: TagPeeker = seq_next_element!(seq, RecipientInfo, "a choice tag");

                match tag_peeker.next_tag.class_and_number() {
                    (TagClass::ContextSpecific, 4) => {
                        let ori_type: ExplicitContextTag4<ObjectIdentifierAsn1> =
                            seq_next_element!(seq, RecipientInfo, "oriType oid");

                        let ori_value = match Into::<String>::into(&ori_type.0 .0).as_str() {
                            oids::ID_ORI_KEM => OtherRecipientInfoValue::Kem(seq_next_element!(
                                seq,
                                RecipientInfo,
                                "a KEMRecipientInfo"
                            )),
                            _ => {
                                return Err(serde_invalid_value!(
                                    RecipientInfo,
                                    "unknown oriType",
                                    "a registered oriType"
                                ))
                            }
                        };

                        Ok(RecipientInfo::Ori(OtherRecipientInfo {
                            ori_type: ori_type.0,
                            ori_value,
                        }))
                    }
                    _ => Err(serde_invalid_value!(
                        RecipientInfo,
                        "unknown choice value",
                        "a supported RecipientInfo choice"
                    )),
                }
            }
        }

        deserializer.deserialize_enum("RecipientInfo", &["OtherRecipientInfo"], Visitor)
    }
}

impl Serialize for RecipientInfo {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        use serde::ser::Error;

        let buf = match self {
            RecipientInfo::Ori(other_recipient_info) => {
                let mut buf = picky_asn1_der::to_vec(&other_recipient_info.ori_type)
                    .map_err(|err| S::Error::custom(format!("Cannot serialize ori_type: {:?}", err)))?;
                match &other_recipient_info.ori_value {
                    OtherRecipientInfoValue::Kem(kem_recipient_info) => {
                        buf.extend_from_slice(
                            &picky_asn1_der::to_vec(kem_recipient_info).map_err(|err| {
                                S::Error::custom(format!("Cannot serialize KEMRecipientInfo: {:?}", err))
                            })?,
                        );
                    }
                }
                buf
            }
        };

        ExplicitContextTag4::from(Asn1RawDer(buf)).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use picky_asn1::wrapper::IntegerAsn1;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::kem_recipient_info::{KemRecipientInfo, RecipientIdentifier};
    use crate::GcmParameters;

    fn sample_recipient_infos() -> RecipientInfos {
        RecipientInfos::from(vec![RecipientInfo::Ori(OtherRecipientInfo::new_kem(
            KemRecipientInfo {
                version: CmsVersion::V0,
                rid: RecipientIdentifier::new_subject_key_identifier((0..20).collect()),
                kem: AlgorithmIdentifier::new_ml_kem_768(),
                kem_ct: OctetStringAsn1::from((0xA0..0xB0u8).collect::<Vec<u8>>()),
                kdf: AlgorithmIdentifier::new_hkdf_with_sha256(),
                kek_length: IntegerAsn1::from(vec![16]),
                ukm: Optional::from(None),
                wrap: AlgorithmIdentifier::new_aes128_wrap(),
                encrypted_key: OctetStringAsn1::from(vec![0x55; 24]),
            },
        ))])
    }

    fn sample_gcm_algorithm() -> AlgorithmIdentifier {
        AlgorithmIdentifier::new_aes128_gcm(&GcmParameters {
            nonce: OctetStringAsn1::from(vec![158, 91, 46, 23, 194, 63, 4, 252, 53, 37, 225, 24]),
            icv_len: IntegerAsn1::from(vec![16]),
        })
        .unwrap()
    }

    #[test]
    fn recipient_infos_encoding_decoding() {
        let data = [
            49, 129, 131, 164, 129, 128, 6, 11, 42, 134, 72, 134, 247, 13, 1, 9, 16, 13, 3, 48, 113, 2, 1, 0, 128, 20,
            0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 48, 11, 6, 9, 96, 134, 72, 1, 101,
            3, 4, 4, 2, 4, 16, 160, 161, 162, 163, 164, 165, 166, 167, 168, 169, 170, 171, 172, 173, 174, 175, 48, 13,
            6, 11, 42, 134, 72, 134, 247, 13, 1, 9, 16, 3, 28, 2, 1, 16, 48, 11, 6, 9, 96, 134, 72, 1, 101, 3, 4, 1,
            5, 4, 24, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85,
        ];
        let expected = sample_recipient_infos();

        let parsed: RecipientInfos = picky_asn1_der::from_bytes(&data).unwrap();
        let encoded = picky_asn1_der::to_vec(&parsed).unwrap();

        assert_eq!(expected, parsed);
        assert_eq!(data.as_ref(), &encoded);
    }

    #[test]
    fn unknown_recipient_choice_is_rejected() {
        // kekri [2] choice tag in place of ori [4]
        let data = [49, 5, 162, 3, 2, 1, 4];
        let parsed: Result<RecipientInfos, _> = picky_asn1_der::from_bytes(&data);
        assert!(parsed.is_err());
    }

    #[test]
    fn encrypted_content_info_without_content() {
        let data = [
            48, 43, 6, 9, 42, 134, 72, 134, 247, 13, 1, 7, 1, 48, 30, 6, 9, 96, 134, 72, 1, 101, 3, 4, 1, 6, 48, 17,
            4, 12, 158, 91, 46, 23, 194, 63, 4, 252, 53, 37, 225, 24, 2, 1, 16,
        ];
        let expected = EncryptedContentInfo {
            content_type: ContentType::from(oids::id_data()),
            content_encryption_algorithm: sample_gcm_algorithm(),
            encrypted_content: Optional::from(None),
        };

        let parsed: EncryptedContentInfo = picky_asn1_der::from_bytes(&data).unwrap();
        let encoded = picky_asn1_der::to_vec(&parsed).unwrap();

        assert_eq!(expected, parsed);
        assert_eq!(data.as_ref(), &encoded);
        assert_eq!(parsed.encrypted_content(), None);
    }

    #[test]
    fn enveloped_data_encoding_decoding() {
        let data = [
            48, 129, 213, 2, 1, 3, 49, 129, 131, 164, 129, 128, 6, 11, 42, 134, 72, 134, 247, 13, 1, 9, 16, 13, 3, 48,
            113, 2, 1, 0, 128, 20, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 48, 11, 6, 9,
            96, 134, 72, 1, 101, 3, 4, 4, 2, 4, 16, 160, 161, 162, 163, 164, 165, 166, 167, 168, 169, 170, 171, 172,
            173, 174, 175, 48, 13, 6, 11, 42, 134, 72, 134, 247, 13, 1, 9, 16, 3, 28, 2, 1, 16, 48, 11, 6, 9, 96, 134,
            72, 1, 101, 3, 4, 1, 5, 4, 24, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85,
            85, 85, 85, 85, 85, 48, 74, 6, 9, 42, 134, 72, 134, 247, 13, 1, 7, 1, 48, 30, 6, 9, 96, 134, 72, 1, 101,
            3, 4, 1, 6, 48, 17, 4, 12, 158, 91, 46, 23, 194, 63, 4, 252, 53, 37, 225, 24, 2, 1, 16, 128, 29, 199, 199,
            199, 199, 199, 199, 199, 199, 199, 199, 199, 199, 199, 217, 217, 217, 217, 217, 217, 217, 217, 217, 217,
            217, 217, 217, 217, 217, 217,
        ];
        let mut joined = vec![0xC7; 13];
        joined.extend_from_slice(&[0xD9; 16]);
        let expected = EnvelopedData {
            version: CmsVersion::V3,
            originator_info: Optional::from(None),
            recipient_infos: sample_recipient_infos(),
            encrypted_content_info: EncryptedContentInfo::new_data(sample_gcm_algorithm(), joined),
            unprotected_attrs: Optional::from(None),
        };

        let parsed: EnvelopedData = picky_asn1_der::from_bytes(&data).unwrap();
        let encoded = picky_asn1_der::to_vec(&parsed).unwrap();

        assert_eq!(expected, parsed);
        assert_eq!(data.as_ref(), &encoded);
    }

    #[test]
    fn enveloped_data_with_unprotected_attrs_encoding_decoding() {
        let data = [
            48, 129, 237, 2, 1, 3, 49, 129, 131, 164, 129, 128, 6, 11, 42, 134, 72, 134, 247, 13, 1, 9, 16, 13, 3, 48,
            113, 2, 1, 0, 128, 20, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 48, 11, 6, 9,
            96, 134, 72, 1, 101, 3, 4, 4, 2, 4, 16, 160, 161, 162, 163, 164, 165, 166, 167, 168, 169, 170, 171, 172,
            173, 174, 175, 48, 13, 6, 11, 42, 134, 72, 134, 247, 13, 1, 9, 16, 3, 28, 2, 1, 16, 48, 11, 6, 9, 96, 134,
            72, 1, 101, 3, 4, 1, 5, 4, 24, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85,
            85, 85, 85, 85, 85, 48, 74, 6, 9, 42, 134, 72, 134, 247, 13, 1, 7, 1, 48, 30, 6, 9, 96, 134, 72, 1, 101,
            3, 4, 1, 6, 48, 17, 4, 12, 158, 91, 46, 23, 194, 63, 4, 252, 53, 37, 225, 24, 2, 1, 16, 128, 29, 199, 199,
            199, 199, 199, 199, 199, 199, 199, 199, 199, 199, 199, 217, 217, 217, 217, 217, 217, 217, 217, 217, 217,
            217, 217, 217, 217, 217, 217, 161, 22, 48, 20, 6, 11, 42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 33, 49, 5,
            4, 3, 102, 111, 111,
        ];
        let mut joined = vec![0xC7; 13];
        joined.extend_from_slice(&[0xD9; 16]);
        let expected = EnvelopedData {
            version: CmsVersion::V3,
            originator_info: Optional::from(None),
            recipient_infos: sample_recipient_infos(),
            encrypted_content_info: EncryptedContentInfo::new_data(sample_gcm_algorithm(), joined),
            unprotected_attrs: Optional::from(Some(ImplicitContextTag1::from(UnprotectedAttributes::from(vec![
                Attribute::new_intended_recipients(b"foo").unwrap(),
            ])))),
        };

        let parsed: EnvelopedData = picky_asn1_der::from_bytes(&data).unwrap();
        let encoded = picky_asn1_der::to_vec(&parsed).unwrap();

        assert_eq!(expected, parsed);
        assert_eq!(data.as_ref(), &encoded);
        // constructed context tag on the attrs, not the primitive form
        assert_eq!(encoded[encoded.len() - 24], 0xA1);
    }

    #[test]
    fn originator_info_encoding_decoding() {
        let data = [48, 8, 160, 2, 48, 0, 161, 2, 48, 0];
        let expected = OriginatorInfo {
            certs: Optional::from(Some(ImplicitContextTag0::from(Asn1SetOf::from(vec![Asn1RawDer(
                vec![48, 0],
            )])))),
            crls: Optional::from(Some(ImplicitContextTag1::from(Asn1SetOf::from(vec![Asn1RawDer(
                vec![48, 0],
            )])))),
        };

        let parsed: OriginatorInfo = picky_asn1_der::from_bytes(&data).unwrap();
        let encoded = picky_asn1_der::to_vec(&parsed).unwrap();

        assert_eq!(expected, parsed);
        assert_eq!(data.as_ref(), &encoded);
    }

    #[test]
    fn originator_info_crls_only() {
        let data = [48, 4, 161, 2, 48, 0];
        let expected = OriginatorInfo {
            certs: Optional::from(None),
            crls: Optional::from(Some(ImplicitContextTag1::from(Asn1SetOf::from(vec![Asn1RawDer(
                vec![48, 0],
            )])))),
        };

        let parsed: OriginatorInfo = picky_asn1_der::from_bytes(&data).unwrap();
        let encoded = picky_asn1_der::to_vec(&parsed).unwrap();

        assert_eq!(expected, parsed);
        assert_eq!(data.as_ref(), &encoded);
    }
}
