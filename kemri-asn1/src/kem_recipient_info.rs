use core::fmt;

use picky_asn1::tag::{TagClass, TagPeeker};
use picky_asn1::wrapper::{ExplicitContextTag0, ImplicitContextTag0, IntegerAsn1, ObjectIdentifierAsn1, OctetStringAsn1, Optional};
use picky_asn1_der::Asn1RawDer;
use serde::{de, ser, Deserialize, Serialize};

use crate::cmsversion::CmsVersion;
use crate::oids;
use crate::AlgorithmIdentifier;

/// [SubjectKeyIdentifier](https://www.rfc-editor.org/rfc/rfc5652#section-6.2.1)
///
/// ```not_rust
/// SubjectKeyIdentifier ::= OCTET STRING
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SubjectKeyIdentifier(pub OctetStringAsn1);

/// [UserKeyingMaterial](https://www.rfc-editor.org/rfc/rfc5652#section-10.2.6)
///
/// ```not_rust
/// UserKeyingMaterial ::= OCTET STRING
/// ```
pub type UserKeyingMaterial = OctetStringAsn1;

/// [CertificateSerialNumber](https://www.rfc-editor.org/rfc/rfc5652#section-10.2.4)
///
/// ```not_rust
/// CertificateSerialNumber ::= INTEGER
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CertificateSerialNumber(pub IntegerAsn1);

/// [IssuerAndSerialNumber](https://www.rfc-editor.org/rfc/rfc5652#section-10.2.4)
///
/// ```not_rust
/// IssuerAndSerialNumber ::= SEQUENCE {
///   issuer Name,
///   serialNumber CertificateSerialNumber }
/// ```
///
/// The issuer Name (an RDNSequence) is carried as opaque DER; matching a
/// recipient only requires byte equality, never Name semantics.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct IssuerAndSerialNumber {
    pub issuer: Asn1RawDer,
    pub serial_number: CertificateSerialNumber,
}

/// [RecipientIdentifier](https://www.rfc-editor.org/rfc/rfc9629#section-3)
///
/// ```not_rust
/// RecipientIdentifier ::= CHOICE {
///   issuerAndSerialNumber IssuerAndSerialNumber,
///   subjectKeyIdentifier [0] SubjectKeyIdentifier }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum RecipientIdentifier {
    IssuerAndSerialNumber(IssuerAndSerialNumber),
    SubjectKeyIdentifier(ImplicitContextTag0<SubjectKeyIdentifier>),
}

impl RecipientIdentifier {
    pub fn new_subject_key_identifier(key_id: Vec<u8>) -> Self {
        RecipientIdentifier::SubjectKeyIdentifier(ImplicitContextTag0::from(SubjectKeyIdentifier(
            OctetStringAsn1::from(key_id),
        )))
    }
}

impl Serialize for RecipientIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        match &self {
            RecipientIdentifier::IssuerAndSerialNumber(issuer_and_serial_number) => {
                issuer_and_serial_number.serialize(serializer)
            }
            RecipientIdentifier::SubjectKeyIdentifier(subject_key_identifier) => {
                subject_key_identifier.serialize(serializer)
            }
        }
    }
}

impl<'de> Deserialize<'de> for RecipientIdentifier {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = RecipientIdentifier;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid DER-encoded RecipientIdentifier")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let tag_peeker: TagPeeker = seq_next_element!(seq, RecipientIdentifier, "a choice tag");

                let identifier =
                    if tag_peeker.next_tag.class() == TagClass::ContextSpecific && tag_peeker.next_tag.number() == 0 {
                        RecipientIdentifier::SubjectKeyIdentifier(seq_next_element!(
                            seq,
                            ImplicitContextTag0<SubjectKeyIdentifier>,
                            RecipientIdentifier,
                            "SubjectKeyIdentifier"
                        ))
                    } else {
                        RecipientIdentifier::IssuerAndSerialNumber(seq_next_element!(
                            seq,
                            IssuerAndSerialNumber,
                            "IssuerAndSerialNumber"
                        ))
                    };

                Ok(identifier)
            }
        }

        deserializer.deserialize_enum(
            "RecipientIdentifier",
            &["IssuerAndSerialNumber", "SubjectKeyIdentifier"],
            Visitor,
        )
    }
}

/// [KEMRecipientInfo](https://www.rfc-editor.org/rfc/rfc9629#section-3)
///
/// ```not_rust
/// KEMRecipientInfo ::= SEQUENCE {
///   version CMSVersion,  -- always set to 0
///   rid RecipientIdentifier,
///   kem KEMAlgorithmIdentifier,
///   kemct OCTET STRING,
///   kdf KeyDerivationAlgorithmIdentifier,
///   kekLength INTEGER (1..65535),
///   ukm [0] EXPLICIT UserKeyingMaterial OPTIONAL,
///   wrap KeyEncryptionAlgorithmIdentifier,
///   encryptedKey EncryptedKey }
/// ```
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct KemRecipientInfo {
    pub version: CmsVersion,
    pub rid: RecipientIdentifier,
    pub kem: AlgorithmIdentifier,
    pub kem_ct: OctetStringAsn1,
    pub kdf: AlgorithmIdentifier,
    pub kek_length: IntegerAsn1,
    pub ukm: Optional<Option<ExplicitContextTag0<UserKeyingMaterial>>>,
    pub wrap: AlgorithmIdentifier,
    pub encrypted_key: OctetStringAsn1,
}

impl<'de> de::Deserialize<'de> for KemRecipientInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = KemRecipientInfo;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid DER-encoded KEMRecipientInfo")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let version: CmsVersion = seq_next_element!(seq, KemRecipientInfo, "version");
                if version != CmsVersion::V0 {
                    return Err(serde_invalid_value!(
                        KemRecipientInfo,
                        "wrong version field",
                        "Version equal to 0"
                    ));
                }

                Ok(KemRecipientInfo {
                    version,
                    rid: seq_next_element!(seq, KemRecipientInfo, "rid"),
                    kem: seq_next_element!(seq, KemRecipientInfo, "kem algorithm"),
                    kem_ct: seq_next_element!(seq, KemRecipientInfo, "kem ciphertext"),
                    kdf: seq_next_element!(seq, KemRecipientInfo, "kdf algorithm"),
                    kek_length: seq_next_element!(seq, KemRecipientInfo, "kek length"),
                    ukm: seq_next_element!(seq, KemRecipientInfo, "ukm"),
                    wrap: seq_next_element!(seq, KemRecipientInfo, "wrap algorithm"),
                    encrypted_key: seq_next_element!(seq, KemRecipientInfo, "encrypted key"),
                })
            }
        }

        deserializer.deserialize_seq(Visitor)
    }
}

/// [OtherRecipientInfo](https://www.rfc-editor.org/rfc/rfc5652#section-6.2.5)
///
/// ```not_rust
/// OtherRecipientInfo ::= SEQUENCE {
///   oriType OBJECT IDENTIFIER,
///   oriValue ANY DEFINED BY oriType }
/// ```
///
/// The value is dispatched on `oriType` at decode time; the only
/// registered type is id-ori-kem. Unknown types are a decode error.
#[derive(Debug, Clone, PartialEq)]
pub struct OtherRecipientInfo {
    pub ori_type: ObjectIdentifierAsn1,
    pub ori_value: OtherRecipientInfoValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OtherRecipientInfoValue {
    Kem(KemRecipientInfo),
}

impl OtherRecipientInfo {
    pub fn new_kem(kem_recipient_info: KemRecipientInfo) -> Self {
        Self {
            ori_type: oids::id_ori_kem().into(),
            ori_value: OtherRecipientInfoValue::Kem(kem_recipient_info),
        }
    }

    pub fn kem(&self) -> &KemRecipientInfo {
        match &self.ori_value {
            OtherRecipientInfoValue::Kem(kem_recipient_info) => kem_recipient_info,
        }
    }
}

impl Serialize for OtherRecipientInfo {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        use ser::SerializeSeq;

        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(&self.ori_type)?;
        match &self.ori_value {
            OtherRecipientInfoValue::Kem(kem_recipient_info) => seq.serialize_element(kem_recipient_info)?,
        }
        seq.end()
    }
}

impl<'de> de::Deserialize<'de> for OtherRecipientInfo {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = OtherRecipientInfo;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid DER-encoded OtherRecipientInfo")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let ori_type: ObjectIdentifierAsn1 = seq_next_element!(seq, OtherRecipientInfo, "type oid");

                let ori_value = match Into::<String>::into(&ori_type.0).as_str() {
                    oids::ID_ORI_KEM => OtherRecipientInfoValue::Kem(seq_next_element!(
                        seq,
                        OtherRecipientInfo,
                        "a KEMRecipientInfo"
                    )),
                    _ => {
                        return Err(serde_invalid_value!(
                            OtherRecipientInfo,
                            "unknown oriType",
                            "a registered oriType"
                        ))
                    }
                };

                Ok(OtherRecipientInfo { ori_type, ori_value })
            }
        }

        deserializer.deserialize_seq(Visitor)
    }
}

/// [CMSORIforKEMOtherInfo](https://www.rfc-editor.org/rfc/rfc9629#section-5)
///
/// ```not_rust
/// CMSORIforKEMOtherInfo ::= SEQUENCE {
///   wrap KeyEncryptionAlgorithmIdentifier,
///   kekLength INTEGER (1..65535),
///   ukm [0] EXPLICIT UserKeyingMaterial OPTIONAL }
/// ```
///
/// Never transmitted. The DER encoding of this structure is the KDF
/// info input; both sides must produce it byte for byte from the
/// KEMRecipientInfo fields.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CmsKemOtherInfo {
    pub wrap: AlgorithmIdentifier,
    pub kek_length: IntegerAsn1,
    #[serde(default)]
    pub ukm: Optional<Option<ExplicitContextTag0<UserKeyingMaterial>>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn kem_recipient_info_with_skid() -> KemRecipientInfo {
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
        }
    }

    #[test]
    fn kem_recipient_info_with_skid_encoding_decoding() {
        let data = [
            48, 113, 2, 1, 0, 128, 20, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 48, 11,
            6, 9, 96, 134, 72, 1, 101, 3, 4, 4, 2, 4, 16, 160, 161, 162, 163, 164, 165, 166, 167, 168, 169, 170, 171,
            172, 173, 174, 175, 48, 13, 6, 11, 42, 134, 72, 134, 247, 13, 1, 9, 16, 3, 28, 2, 1, 16, 48, 11, 6, 9, 96,
            134, 72, 1, 101, 3, 4, 1, 5, 4, 24, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85,
            85, 85, 85, 85, 85, 85, 85,
        ];
        let expected = kem_recipient_info_with_skid();

        let parsed: KemRecipientInfo = picky_asn1_der::from_bytes(&data).unwrap();
        let encoded = picky_asn1_der::to_vec(&parsed).unwrap();

        assert_eq!(expected, parsed);
        assert_eq!(data.as_ref(), &encoded);
    }

    #[test]
    fn kem_recipient_info_with_issuer_and_ukm_encoding_decoding() {
        let data = [
            48, 120, 2, 1, 0, 48, 19, 48, 13, 49, 11, 48, 9, 6, 3, 85, 4, 3, 12, 2, 67, 65, 2, 2, 1, 200, 48, 11, 6,
            9, 96, 134, 72, 1, 101, 3, 4, 4, 2, 4, 16, 160, 161, 162, 163, 164, 165, 166, 167, 168, 169, 170, 171,
            172, 173, 174, 175, 48, 13, 6, 11, 42, 134, 72, 134, 247, 13, 1, 9, 16, 3, 28, 2, 1, 16, 160, 6, 4, 4, 1,
            2, 3, 4, 48, 11, 6, 9, 96, 134, 72, 1, 101, 3, 4, 1, 5, 4, 24, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85,
            85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85, 85,
        ];
        let expected = KemRecipientInfo {
            rid: RecipientIdentifier::IssuerAndSerialNumber(IssuerAndSerialNumber {
                issuer: Asn1RawDer(vec![48, 13, 49, 11, 48, 9, 6, 3, 85, 4, 3, 12, 2, 67, 65]),
                serial_number: CertificateSerialNumber(IntegerAsn1::from(vec![1, 200])),
            }),
            ukm: Optional::from(Some(ExplicitContextTag0::from(UserKeyingMaterial::from(vec![
                1, 2, 3, 4,
            ])))),
            ..kem_recipient_info_with_skid()
        };

        let parsed: KemRecipientInfo = picky_asn1_der::from_bytes(&data).unwrap();
        let encoded = picky_asn1_der::to_vec(&parsed).unwrap();

        assert_eq!(expected, parsed);
        assert_eq!(data.as_ref(), &encoded);
    }

    #[test]
    fn nonzero_version_is_rejected() {
        let mut data = picky_asn1_der::to_vec(&kem_recipient_info_with_skid()).unwrap();
        data[4] = 1; // version integer value

        let parsed: Result<KemRecipientInfo, _> = picky_asn1_der::from_bytes(&data);
        assert!(parsed.is_err());
    }

    #[test]
    fn kem_other_info_is_deterministic() {
        let other_info = CmsKemOtherInfo {
            wrap: AlgorithmIdentifier::new_aes128_wrap(),
            kek_length: IntegerAsn1::from(vec![16]),
            ukm: Optional::from(None),
        };
        let expected = [48, 16, 48, 11, 6, 9, 96, 134, 72, 1, 101, 3, 4, 1, 5, 2, 1, 16];

        let encoded = picky_asn1_der::to_vec(&other_info).unwrap();
        let reencoded = picky_asn1_der::to_vec(&other_info).unwrap();

        assert_eq!(expected.as_ref(), &encoded);
        assert_eq!(encoded, reencoded);
    }

    #[test]
    fn kem_other_info_with_ukm_encoding_decoding() {
        let data = [
            48, 24, 48, 11, 6, 9, 96, 134, 72, 1, 101, 3, 4, 1, 5, 2, 1, 16, 160, 6, 4, 4, 1, 2, 3, 4,
        ];
        let expected = CmsKemOtherInfo {
            wrap: AlgorithmIdentifier::new_aes128_wrap(),
            kek_length: IntegerAsn1::from(vec![16]),
            ukm: Optional::from(Some(ExplicitContextTag0::from(UserKeyingMaterial::from(vec![
                1, 2, 3, 4,
            ])))),
        };

        let parsed: CmsKemOtherInfo = picky_asn1_der::from_bytes(&data).unwrap();
        let encoded = picky_asn1_der::to_vec(&parsed).unwrap();

        assert_eq!(expected, parsed);
        assert_eq!(data.as_ref(), &encoded);
    }
}
