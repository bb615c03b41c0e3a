use core::fmt;

use picky_asn1::tag::{TagClass, TagPeeker};
use picky_asn1::wrapper::{
    Asn1SetOf, ImplicitContextTag0, ImplicitContextTag1, ImplicitContextTag2, OctetStringAsn1, Optional,
};
use picky_asn1_der::Asn1RawDer;
use serde::{de, ser, Serialize};

use crate::cmsversion::CmsVersion;
use crate::enveloped_data::{retag, EncryptedContentInfo, OriginatorInfo, RecipientInfos};
use crate::Attribute;

/// [AuthAttributes](https://www.rfc-editor.org/rfc/rfc5083#section-2.1)
///
/// ```not_rust
/// AuthAttributes ::= SET SIZE (1..MAX) OF Attribute
/// ```
pub type AuthAttributes = Asn1SetOf<Attribute>;

/// [UnauthAttributes](https://www.rfc-editor.org/rfc/rfc5083#section-2.1)
///
/// ```not_rust
/// UnauthAttributes ::= SET SIZE (1..MAX) OF Attribute
/// ```
pub type UnauthAttributes = Asn1SetOf<Attribute>;

/// MessageAuthenticationCode, the detached AEAD tag.
pub type MessageAuthenticationCode = OctetStringAsn1;

/// [AuthEnvelopedData Type](https://www.rfc-editor.org/rfc/rfc5083#section-2.1)
///
/// ```not_rust
/// AuthEnvelopedData ::= SEQUENCE {
///   version CMSVersion,
///   originatorInfo [0] IMPLICIT OriginatorInfo OPTIONAL,
///   recipientInfos RecipientInfos,
///   authEncryptedContentInfo EncryptedContentInfo,
///   authAttrs [1] IMPLICIT AuthAttributes OPTIONAL,
///   mac MessageAuthenticationCode,
///   unauthAttrs [2] IMPLICIT UnauthAttributes OPTIONAL }
/// ```
///
/// Context tags [1] and [2] follow RFC 5083 as written. Some stacks emit
/// [2]/[3] here; those encodings are rejected.
///
/// The implicitly tagged constructed fields are (de)serialized by hand,
/// re-tagging the underlying SET or SEQUENCE to keep the constructed bit.
#[derive(Debug, PartialEq)]
pub struct AuthEnvelopedData {
    pub version: CmsVersion,
    pub originator_info: Optional<Option<ImplicitContextTag0<OriginatorInfo>>>,
    pub recipient_infos: RecipientInfos,
    pub auth_encrypted_content_info: EncryptedContentInfo,
    pub auth_attrs: Optional<Option<ImplicitContextTag1<AuthAttributes>>>,
    pub mac: MessageAuthenticationCode,
    pub unauth_attrs: Optional<Option<ImplicitContextTag2<UnauthAttributes>>>,
}

impl Serialize for AuthEnvelopedData {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        use ser::{Error, SerializeSeq};

        let mut element_count = 4;
        if self.originator_info.0.is_some() {
            element_count += 1;
        }
        if self.auth_attrs.0.is_some() {
            element_count += 1;
        }
        if self.unauth_attrs.0.is_some() {
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
        seq.serialize_element(&self.auth_encrypted_content_info)?;
        if let Some(auth_attrs) = &self.auth_attrs.0 {
            let der = picky_asn1_der::to_vec(&auth_attrs.0)
                .map_err(|err| S::Error::custom(format!("Cannot serialize AuthAttributes: {:?}", err)))?;
            seq.serialize_element(&Asn1RawDer(retag(der, 0xA1)))?;
        }
        seq.serialize_element(&self.mac)?;
        if let Some(unauth_attrs) = &self.unauth_attrs.0 {
            let der = picky_asn1_der::to_vec(&unauth_attrs.0)
                .map_err(|err| S::Error::custom(format!("Cannot serialize UnauthAttributes: {:?}", err)))?;
            seq.serialize_element(&Asn1RawDer(retag(der, 0xA2)))?;
        }
        seq.end()
    }
}

impl<'de> de::Deserialize<'de> for AuthEnvelopedData {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = AuthEnvelopedData;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a valid DER-encoded AuthEnvelopedData")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let version: CmsVersion = seq_next_element!(seq, AuthEnvelopedData, "version");

                let tag_peeker: TagPeeker = seq_next_element!(seq, AuthEnvelopedData, "a tag");
                let originator_info = if tag_peeker.next_tag.class_and_number() == (TagClass::ContextSpecific, 0) {
                    let raw: Asn1RawDer = seq_next_element!(seq, AuthEnvelopedData, "originatorInfo");
                    let originator_info: OriginatorInfo =
                        picky_asn1_der::from_bytes(&retag(raw.0, 0x30)).map_err(|_| {
                            serde_invalid_value!(AuthEnvelopedData, "invalid originatorInfo", "a valid OriginatorInfo")
                        })?;
                    Optional::from(Some(ImplicitContextTag0::from(originator_info)))
                } else {
                    Optional::from(None)
                };

                let recipient_infos: RecipientInfos = seq_next_element!(seq, AuthEnvelopedData, "recipientInfos");
                let auth_encrypted_content_info: EncryptedContentInfo =
                    seq_next_element!(seq, AuthEnvelopedData, "authEncryptedContentInfo");

                let auth_attrs = match seq.next_element::<TagPeeker>()? {
                    Some(tag_peeker) if tag_peeker.next_tag.class_and_number() == (TagClass::ContextSpecific, 1) => {
                        let raw: Asn1RawDer = seq_next_element!(seq, AuthEnvelopedData, "authAttrs");
                        let attrs: AuthAttributes = picky_asn1_der::from_bytes(&retag(raw.0, 0x31)).map_err(|_| {
                            serde_invalid_value!(AuthEnvelopedData, "invalid authAttrs", "a valid attribute set")
                        })?;
                        Optional::from(Some(ImplicitContextTag1::from(attrs)))
                    }
                    _ => Optional::from(None),
                };

                let mac: MessageAuthenticationCode = seq_next_element!(seq, AuthEnvelopedData, "mac");

                let unauth_attrs = match seq.next_element::<TagPeeker>()? {
                    Some(tag_peeker) if tag_peeker.next_tag.class_and_number() == (TagClass::ContextSpecific, 2) => {
                        let raw: Asn1RawDer = seq_next_element!(seq, AuthEnvelopedData, "unauthAttrs");
                        let attrs: UnauthAttributes = picky_asn1_der::from_bytes(&retag(raw.0, 0x31)).map_err(|_| {
                            serde_invalid_value!(AuthEnvelopedData, "invalid unauthAttrs", "a valid attribute set")
                        })?;
                        Optional::from(Some(ImplicitContextTag2::from(attrs)))
                    }
                    _ => Optional::from(None),
                };

                Ok(AuthEnvelopedData {
                    version,
                    originator_info,
                    recipient_infos,
                    auth_encrypted_content_info,
                    auth_attrs,
                    mac,
                    unauth_attrs,
                })
            }
        }

        deserializer.deserialize_seq(Visitor)
    }
}

impl AuthEnvelopedData {
    /// Returns the authenticated attributes, empty when the field is absent.
    pub fn auth_attrs(&self) -> &[Attribute] {
        self.auth_attrs
            .0
            .as_ref()
            .map(|attrs| attrs.0 .0.as_slice())
            .unwrap_or_default()
    }
}
