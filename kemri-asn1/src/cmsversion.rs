use picky_asn1::wrapper::IntegerAsn1;
use serde::{de, ser};

/// [CMSVersion](https://www.rfc-editor.org/rfc/rfc5652#section-10.2.5)
///
/// ```not_rust
/// CMSVersion ::= INTEGER { v0(0), v1(1), v2(2), v3(3), v4(4), v5(5) }
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum CmsVersion {
    V0 = 0x00,
    V1 = 0x01,
    V2 = 0x02,
    V3 = 0x03,
    V4 = 0x04,
    V5 = 0x05,
}

impl CmsVersion {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(CmsVersion::V0),
            0x01 => Some(CmsVersion::V1),
            0x02 => Some(CmsVersion::V2),
            0x03 => Some(CmsVersion::V3),
            0x04 => Some(CmsVersion::V4),
            0x05 => Some(CmsVersion::V5),
            _ => None,
        }
    }
}

impl ser::Serialize for CmsVersion {
    fn serialize<S>(&self, serializer: S) -> Result<<S as ser::Serializer>::Ok, <S as ser::Serializer>::Error>
    where
        S: ser::Serializer,
    {
        IntegerAsn1::from(vec![*self as u8]).serialize(serializer)
    }
}

impl<'de> de::Deserialize<'de> for CmsVersion {
    fn deserialize<D>(deserializer: D) -> Result<Self, <D as de::Deserializer<'de>>::Error>
    where
        D: de::Deserializer<'de>,
    {
        let integer = IntegerAsn1::deserialize(deserializer)?;
        let bytes = integer.as_unsigned_bytes_be();
        if bytes.len() != 1 {
            return Err(serde_invalid_value!(
                CmsVersion,
                "integer out of the version range",
                "a CMSVersion between 0 and 5"
            ));
        }

        CmsVersion::from_u8(bytes[0]).ok_or_else(|| {
            serde_invalid_value!(
                CmsVersion,
                "integer out of the version range",
                "a CMSVersion between 0 and 5"
            )
        })
    }
}
