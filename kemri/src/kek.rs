//! KEK derivation and content-key wrapping (RFC 9629 section 5, RFC 3394).

use hkdf::Hkdf;
use kemri_asn1::CmsKemOtherInfo;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::algorithm::{KdfAlgorithm, KeyWrapAlgorithm};
use crate::error::CmsError;

/// Derives the key-encryption key from the KEM shared secret.
///
/// The info input is the DER encoding of `CMSORIforKEMOtherInfo`; both
/// sides rebuild it from the KEMRecipientInfo fields, so the encoding must
/// be deterministic. The salt is absent. The kekLength carried inside
/// `other_info` must agree with the wrap algorithm key size.
pub fn derive_kek(
    shared_secret: &[u8],
    kdf: KdfAlgorithm,
    other_info: &CmsKemOtherInfo,
) -> Result<Zeroizing<Vec<u8>>, CmsError> {
    let kek_length = kek_length_value(other_info)?;
    let wrap = KeyWrapAlgorithm::try_from(&other_info.wrap)?;
    if kek_length != wrap.key_size() {
        return Err(CmsError::InvalidKekLength { requested: kek_length });
    }

    let info = picky_asn1_der::to_vec(other_info)?;
    let mut kek = Zeroizing::new(vec![0u8; kek_length]);
    match kdf {
        KdfAlgorithm::HkdfSha256 => {
            Hkdf::<Sha256>::new(None, shared_secret)
                .expand(&info, &mut kek)
                .map_err(|_| CmsError::InvalidKekLength { requested: kek_length })?;
        }
    }
    Ok(kek)
}

fn kek_length_value(other_info: &CmsKemOtherInfo) -> Result<usize, CmsError> {
    let bytes = other_info.kek_length.as_unsigned_bytes_be();
    if bytes.is_empty() || bytes.len() > 2 {
        return Err(CmsError::InvalidStructure {
            context: "kekLength out of range",
        });
    }
    Ok(bytes.iter().fold(0usize, |acc, byte| acc * 256 + usize::from(*byte)))
}

/// Wraps the content-encryption key under the KEK (RFC 3394).
pub fn wrap_key(wrap: KeyWrapAlgorithm, kek: &[u8], key: &[u8]) -> Result<Vec<u8>, CmsError> {
    if kek.len() != wrap.key_size() {
        return Err(CmsError::InvalidKeySize {
            context: "key-encryption key",
            expected: wrap.key_size(),
            found: kek.len(),
        });
    }
    match wrap {
        KeyWrapAlgorithm::Aes128 => aes_kw::Kek::<aes::Aes128>::try_from(kek)
            .map_err(|_| CmsError::InvalidStructure { context: "key wrap" })?
            .wrap_vec(key),
        KeyWrapAlgorithm::Aes256 => aes_kw::Kek::<aes::Aes256>::try_from(kek)
            .map_err(|_| CmsError::InvalidStructure { context: "key wrap" })?
            .wrap_vec(key),
    }
    .map_err(|_| CmsError::InvalidStructure { context: "key wrap input" })
}

/// Unwraps the content-encryption key. Any corruption of the KEK or the
/// wrapped key surfaces here as [`CmsError::IntegrityCheckFailed`].
pub fn unwrap_key(wrap: KeyWrapAlgorithm, kek: &[u8], wrapped: &[u8]) -> Result<Zeroizing<Vec<u8>>, CmsError> {
    if kek.len() != wrap.key_size() {
        return Err(CmsError::InvalidKeySize {
            context: "key-encryption key",
            expected: wrap.key_size(),
            found: kek.len(),
        });
    }
    let unwrapped = match wrap {
        KeyWrapAlgorithm::Aes128 => aes_kw::Kek::<aes::Aes128>::try_from(kek)
            .map_err(|_| CmsError::InvalidStructure { context: "key unwrap" })?
            .unwrap_vec(wrapped),
        KeyWrapAlgorithm::Aes256 => aes_kw::Kek::<aes::Aes256>::try_from(kek)
            .map_err(|_| CmsError::InvalidStructure { context: "key unwrap" })?
            .unwrap_vec(wrapped),
    }
    .map_err(|_| CmsError::IntegrityCheckFailed)?;
    Ok(Zeroizing::new(unwrapped))
}

#[cfg(test)]
mod tests {
    use kemri_asn1::AlgorithmIdentifier;
    use picky_asn1::wrapper::{IntegerAsn1, Optional};
    use pretty_assertions::assert_eq;

    use super::*;

    fn other_info_aes128() -> CmsKemOtherInfo {
        CmsKemOtherInfo {
            wrap: AlgorithmIdentifier::new_aes128_wrap(),
            kek_length: IntegerAsn1::from_bytes_be_unsigned(vec![16]),
            ukm: Optional::from(None),
        }
    }

    #[test]
    fn kek_derivation_matches_reference_vector() {
        let shared_secret: Vec<u8> = (0..32).collect();
        let kek = derive_kek(&shared_secret, KdfAlgorithm::HkdfSha256, &other_info_aes128()).unwrap();
        assert_eq!(hex::encode(&*kek), "fcad36b947c339cd4f4ebd4b8322d573");
    }

    #[test]
    fn kek_length_must_match_wrap_algorithm() {
        let mut other_info = other_info_aes128();
        other_info.kek_length = IntegerAsn1::from_bytes_be_unsigned(vec![24]);
        let err = derive_kek(&[0u8; 32], KdfAlgorithm::HkdfSha256, &other_info).unwrap_err();
        assert!(matches!(err, CmsError::InvalidKekLength { requested: 24 }));
    }

    #[test]
    fn wrap_matches_rfc_3394_vector() {
        // RFC 3394 section 4.1
        let kek = hex::decode("000102030405060708090a0b0c0d0e0f").unwrap();
        let key = hex::decode("00112233445566778899aabbccddeeff").unwrap();
        let wrapped = wrap_key(KeyWrapAlgorithm::Aes128, &kek, &key).unwrap();
        assert_eq!(hex::encode(&wrapped), "1fa68b0a8112b447aef34bd8fb5a7b829d3e862371d2cfe5");

        let unwrapped = unwrap_key(KeyWrapAlgorithm::Aes128, &kek, &wrapped).unwrap();
        assert_eq!(&*unwrapped, &key[..]);
    }

    #[test]
    fn wrap_matches_rfc_3394_aes256_vector() {
        // RFC 3394 section 4.3
        let kek = hex::decode("000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f").unwrap();
        let key = hex::decode("00112233445566778899aabbccddeeff").unwrap();
        let wrapped = wrap_key(KeyWrapAlgorithm::Aes256, &kek, &key).unwrap();
        assert_eq!(hex::encode(&wrapped), "64e8c3f9ce0f5ba263e9777905818a2a93c8191e7d6e8ae7");
    }

    #[test]
    fn tampered_wrapped_key_is_rejected() {
        let kek = [0x0Fu8; 16];
        let key = [0x55u8; 16];
        let mut wrapped = wrap_key(KeyWrapAlgorithm::Aes128, &kek, &key).unwrap();
        wrapped[3] ^= 1;
        let err = unwrap_key(KeyWrapAlgorithm::Aes128, &kek, &wrapped).unwrap_err();
        assert!(matches!(err, CmsError::IntegrityCheckFailed));
    }
}
