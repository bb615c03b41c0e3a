use picky_asn1::wrapper::{ExplicitContextTag0, ObjectIdentifierAsn1};
use picky_asn1_der::Asn1RawDer;
use serde::{Deserialize, Serialize};

/// [ContentInfo](https://www.rfc-editor.org/rfc/rfc5652#section-3)
///
/// ```not_rust
/// ContentInfo ::= SEQUENCE {
///   contentType ContentType,
///   content [0] EXPLICIT ANY DEFINED BY contentType }
///
/// ContentType ::= OBJECT IDENTIFIER
/// ```
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct ContentInfo {
    pub content_type: ObjectIdentifierAsn1,
    pub content: ExplicitContextTag0<Asn1RawDer>,
}

impl ContentInfo {
    pub fn new(content_type: oid::ObjectIdentifier, content: Vec<u8>) -> Self {
        Self {
            content_type: content_type.into(),
            content: ExplicitContextTag0::from(Asn1RawDer(content)),
        }
    }

    /// Returns raw content bytes.
    pub fn content(&self) -> &[u8] {
        &self.content.0 .0
    }

    /// Tries to parse the content value and returns parsed object.
    pub fn content_typed<'a, T: Deserialize<'a>>(&'a self) -> picky_asn1_der::Result<T> {
        picky_asn1_der::from_bytes(&self.content.0 .0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oids;
    use pretty_assertions::assert_eq;

    #[test]
    fn content_info_encoding_decoding() {
        // contentType id-data, content = OCTET STRING "abc"
        let data = [
            48, 18, 6, 9, 42, 134, 72, 134, 247, 13, 1, 7, 1, 160, 5, 4, 3, 97, 98, 99,
        ];
        let expected = ContentInfo::new(oids::id_data(), vec![4, 3, 97, 98, 99]);

        let parsed: ContentInfo = picky_asn1_der::from_bytes(&data).unwrap();
        let encoded = picky_asn1_der::to_vec(&parsed).unwrap();

        assert_eq!(expected, parsed);
        assert_eq!(data.as_ref(), &encoded);
        assert_eq!(parsed.content(), &[4, 3, 97, 98, 99]);
    }
}
