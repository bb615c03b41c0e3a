//! Content encryption with AES-GCM, detached tag.
//!
//! EnvelopedData stores ciphertext and tag joined, AuthEnvelopedData stores
//! the tag in its own `mac` field, so the primitive keeps them separate and
//! the envelope layer joins or splits as the layout requires.

use aes_gcm::aead::{AeadInPlace, KeyInit, Nonce, Tag};
use aes_gcm::{Aes128Gcm, Aes256Gcm};

use crate::algorithm::ContentEncryptionAlgorithm;
use crate::error::CmsError;

/// Encrypts `plaintext`, returning `(ciphertext, tag)`.
pub fn seal(
    algorithm: ContentEncryptionAlgorithm,
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), CmsError> {
    check_key_and_nonce(algorithm, key, nonce)?;
    match algorithm {
        ContentEncryptionAlgorithm::Aes128Gcm => seal_typed::<Aes128Gcm>(key, nonce, aad, plaintext),
        ContentEncryptionAlgorithm::Aes256Gcm => seal_typed::<Aes256Gcm>(key, nonce, aad, plaintext),
    }
}

/// Decrypts `ciphertext` and verifies the detached `tag`.
pub fn open(
    algorithm: ContentEncryptionAlgorithm,
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, CmsError> {
    check_key_and_nonce(algorithm, key, nonce)?;
    if tag.len() != ContentEncryptionAlgorithm::TAG_SIZE {
        return Err(CmsError::InvalidStructure {
            context: "authentication tag size",
        });
    }
    match algorithm {
        ContentEncryptionAlgorithm::Aes128Gcm => open_typed::<Aes128Gcm>(key, nonce, aad, ciphertext, tag),
        ContentEncryptionAlgorithm::Aes256Gcm => open_typed::<Aes256Gcm>(key, nonce, aad, ciphertext, tag),
    }
}

fn check_key_and_nonce(algorithm: ContentEncryptionAlgorithm, key: &[u8], nonce: &[u8]) -> Result<(), CmsError> {
    if key.len() != algorithm.key_size() {
        return Err(CmsError::InvalidKeySize {
            context: "content-encryption key",
            expected: algorithm.key_size(),
            found: key.len(),
        });
    }
    if nonce.len() != ContentEncryptionAlgorithm::NONCE_SIZE {
        return Err(CmsError::InvalidStructure { context: "nonce size" });
    }
    Ok(())
}

fn seal_typed<C: AeadInPlace + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    plaintext: &[u8],
) -> Result<(Vec<u8>, Vec<u8>), CmsError> {
    let cipher = C::new_from_slice(key).map_err(|_| CmsError::InvalidStructure {
        context: "content-encryption key",
    })?;
    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<C>::from_slice(nonce), aad, &mut buffer)
        .map_err(|_| CmsError::InvalidStructure { context: "aead seal" })?;
    Ok((buffer, tag.to_vec()))
}

fn open_typed<C: AeadInPlace + KeyInit>(
    key: &[u8],
    nonce: &[u8],
    aad: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
) -> Result<Vec<u8>, CmsError> {
    let cipher = C::new_from_slice(key).map_err(|_| CmsError::InvalidStructure {
        context: "content-encryption key",
    })?;
    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(Nonce::<C>::from_slice(nonce), aad, &mut buffer, Tag::<C>::from_slice(tag))
        .map_err(|_| CmsError::AuthenticationFailed)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(ContentEncryptionAlgorithm::Aes128Gcm)]
    #[case(ContentEncryptionAlgorithm::Aes256Gcm)]
    fn seal_open_round_trip(#[case] algorithm: ContentEncryptionAlgorithm) {
        let key = vec![0x42u8; algorithm.key_size()];
        let nonce = [7u8; 12];
        let (ciphertext, tag) = seal(algorithm, &key, &nonce, b"aad", b"some content").unwrap();
        assert_eq!(tag.len(), 16);

        let plaintext = open(algorithm, &key, &nonce, b"aad", &ciphertext, &tag).unwrap();
        assert_eq!(plaintext, b"some content");
    }

    #[test]
    fn empty_plaintext_matches_nist_vector() {
        let (ciphertext, tag) = seal(ContentEncryptionAlgorithm::Aes128Gcm, &[0u8; 16], &[0u8; 12], b"", b"").unwrap();
        assert!(ciphertext.is_empty());
        assert_eq!(hex::encode(&tag), "58e2fccefa7e3061367f1d57a4e7455a");
    }

    #[test]
    fn flipped_tag_bit_is_rejected() {
        let key = [0x42u8; 16];
        let nonce = [7u8; 12];
        let (ciphertext, mut tag) = seal(ContentEncryptionAlgorithm::Aes128Gcm, &key, &nonce, b"", b"data").unwrap();
        tag[0] ^= 1;
        let err = open(ContentEncryptionAlgorithm::Aes128Gcm, &key, &nonce, b"", &ciphertext, &tag).unwrap_err();
        assert!(matches!(err, CmsError::AuthenticationFailed));
    }

    #[test]
    fn aad_mismatch_is_rejected() {
        let key = [0x42u8; 16];
        let nonce = [7u8; 12];
        let (ciphertext, tag) = seal(ContentEncryptionAlgorithm::Aes128Gcm, &key, &nonce, b"aad", b"data").unwrap();
        let err = open(ContentEncryptionAlgorithm::Aes128Gcm, &key, &nonce, b"other", &ciphertext, &tag).unwrap_err();
        assert!(matches!(err, CmsError::AuthenticationFailed));
    }
}
