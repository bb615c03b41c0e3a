//! ML-KEM key encapsulation over byte slices.
//!
//! The `ml_kem` crate exposes one type per parameter set; this module
//! dispatches on [`KemAlgorithm`] and keeps key material in plain byte
//! buffers so the envelope layer never deals with typed keys.

use ml_kem::kem::{Decapsulate, Encapsulate};
use ml_kem::{Encoded, EncodedSizeUser, KemCore, MlKem1024, MlKem512, MlKem768};
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use crate::algorithm::KemAlgorithm;
use crate::error::CmsError;

/// Freshly generated ML-KEM key material.
///
/// The decapsulation key is the long-term secret and is zeroized on drop.
pub struct KemKeyPair {
    pub encapsulation_key: Vec<u8>,
    pub decapsulation_key: Zeroizing<Vec<u8>>,
}

pub fn generate_keypair(algorithm: KemAlgorithm, rng: &mut impl CryptoRngCore) -> KemKeyPair {
    match algorithm {
        KemAlgorithm::MlKem512 => generate_typed::<MlKem512>(rng),
        KemAlgorithm::MlKem768 => generate_typed::<MlKem768>(rng),
        KemAlgorithm::MlKem1024 => generate_typed::<MlKem1024>(rng),
    }
}

/// Encapsulates to `encapsulation_key`, returning the KEM ciphertext and
/// the shared secret.
pub fn encapsulate(
    algorithm: KemAlgorithm,
    encapsulation_key: &[u8],
    rng: &mut impl CryptoRngCore,
) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>), CmsError> {
    if encapsulation_key.len() != algorithm.encapsulation_key_size() {
        return Err(CmsError::InvalidKeySize {
            context: "encapsulation key",
            expected: algorithm.encapsulation_key_size(),
            found: encapsulation_key.len(),
        });
    }
    match algorithm {
        KemAlgorithm::MlKem512 => encapsulate_typed::<MlKem512>(encapsulation_key, rng),
        KemAlgorithm::MlKem768 => encapsulate_typed::<MlKem768>(encapsulation_key, rng),
        KemAlgorithm::MlKem1024 => encapsulate_typed::<MlKem1024>(encapsulation_key, rng),
    }
}

/// Recovers the shared secret from a KEM ciphertext.
///
/// A tampered ciphertext of the right length is implicitly rejected: ML-KEM
/// returns a pseudorandom secret instead of failing, and the mismatch
/// surfaces later when the KEK fails to unwrap the content key.
pub fn decapsulate(
    algorithm: KemAlgorithm,
    decapsulation_key: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CmsError> {
    if decapsulation_key.len() != algorithm.decapsulation_key_size() {
        return Err(CmsError::InvalidKeySize {
            context: "decapsulation key",
            expected: algorithm.decapsulation_key_size(),
            found: decapsulation_key.len(),
        });
    }
    if ciphertext.len() != algorithm.ciphertext_size() {
        return Err(CmsError::DecapsulationFailed);
    }
    match algorithm {
        KemAlgorithm::MlKem512 => decapsulate_typed::<MlKem512>(decapsulation_key, ciphertext),
        KemAlgorithm::MlKem768 => decapsulate_typed::<MlKem768>(decapsulation_key, ciphertext),
        KemAlgorithm::MlKem1024 => decapsulate_typed::<MlKem1024>(decapsulation_key, ciphertext),
    }
}

fn generate_typed<K: KemCore>(rng: &mut impl CryptoRngCore) -> KemKeyPair {
    let (dk, ek) = K::generate(rng);
    KemKeyPair {
        encapsulation_key: ek.as_bytes().to_vec(),
        decapsulation_key: Zeroizing::new(dk.as_bytes().to_vec()),
    }
}

fn encapsulate_typed<K: KemCore>(
    encapsulation_key: &[u8],
    rng: &mut impl CryptoRngCore,
) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>), CmsError> {
    let encoded = Encoded::<K::EncapsulationKey>::try_from(encapsulation_key)
        .map_err(|_| CmsError::InvalidStructure {
            context: "encapsulation key encoding",
        })?;
    let ek = K::EncapsulationKey::from_bytes(&encoded);
    let (ciphertext, shared_secret) = ek.encapsulate(rng).map_err(|_| CmsError::EncapsulationFailed)?;
    Ok((
        ciphertext.as_slice().to_vec(),
        Zeroizing::new(shared_secret.as_slice().to_vec()),
    ))
}

fn decapsulate_typed<K: KemCore>(
    decapsulation_key: &[u8],
    ciphertext: &[u8],
) -> Result<Zeroizing<Vec<u8>>, CmsError> {
    let encoded = Encoded::<K::DecapsulationKey>::try_from(decapsulation_key)
        .map_err(|_| CmsError::InvalidStructure {
            context: "decapsulation key encoding",
        })?;
    let dk = K::DecapsulationKey::from_bytes(&encoded);
    let ct = ml_kem::Ciphertext::<K>::try_from(ciphertext).map_err(|_| CmsError::DecapsulationFailed)?;
    let shared_secret = dk.decapsulate(&ct).map_err(|_| CmsError::DecapsulationFailed)?;
    Ok(Zeroizing::new(shared_secret.as_slice().to_vec()))
}
