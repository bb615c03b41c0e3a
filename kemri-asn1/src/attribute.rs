use picky_asn1::wrapper::{Asn1SetOf, ObjectIdentifierAsn1, OctetStringAsn1};
use picky_asn1_der::Asn1RawDer;
use serde::{Deserialize, Serialize};

use crate::oids;

/// [Attribute](https://www.rfc-editor.org/rfc/rfc5652#section-5.3)
///
/// ```not_rust
/// Attribute ::= SEQUENCE {
///   attrType OBJECT IDENTIFIER,
///   attrValues SET OF AttributeValue }
///
/// AttributeValue ::= ANY
/// ```
///
/// Values are carried as opaque DER. Attributes embedded in an envelope
/// travel with the message but are never interpreted by this crate.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Attribute {
    pub attr_type: ObjectIdentifierAsn1,
    pub attr_values: Asn1SetOf<Asn1RawDer>,
}

impl Attribute {
    /// Builds an id-aa-intendedRecipients attribute holding `data` as a
    /// single OCTET STRING value.
    pub fn new_intended_recipients(data: &[u8]) -> picky_asn1_der::Result<Self> {
        let value = picky_asn1_der::to_vec(&OctetStringAsn1::from(data.to_vec()))?;
        Ok(Self {
            attr_type: oids::id_aa_intended_recipients().into(),
            attr_values: Asn1SetOf::from(vec![Asn1RawDer(value)]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn intended_recipients_encoding_decoding() {
        let data = [
            48, 20, 6, 11, 42, 134, 72, 134, 247, 13, 1, 9, 16, 2, 33, 49, 5, 4, 3, 102, 111, 111,
        ];
        let expected = Attribute::new_intended_recipients(b"foo").unwrap();

        let parsed: Attribute = picky_asn1_der::from_bytes(&data).unwrap();
        let encoded = picky_asn1_der::to_vec(&parsed).unwrap();

        assert_eq!(expected, parsed);
        assert_eq!(data.as_ref(), &encoded);
    }
}
