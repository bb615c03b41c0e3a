//! Hybrid post-quantum CMS envelopes.
//!
//! Encrypts content to ML-KEM recipients using KEMRecipientInfo (RFC 9629)
//! inside EnvelopedData (RFC 5652) or AuthEnvelopedData (RFC 5083). The
//! content key is wrapped under a KEK derived from the KEM shared secret
//! with HKDF-SHA256, and the content itself is sealed with AES-GCM.
//!
//! ```
//! use kemri::{
//!     generate_keypair, open_envelope, ContentEncryptionAlgorithm, EnvelopeBuilder, EnvelopeProfile,
//!     KemAlgorithm, KeyWrapAlgorithm, RecipientCertificate, RecipientIdentity,
//! };
//!
//! let mut rng = rand::rngs::OsRng;
//! let keypair = generate_keypair(KemAlgorithm::MlKem768, &mut rng);
//! let recipient = RecipientCertificate::bind(
//!     KemAlgorithm::MlKem768,
//!     keypair.encapsulation_key,
//!     vec![0x30, 0x00],
//!     vec![0x01],
//! )?;
//!
//! let builder = EnvelopeBuilder::new(EnvelopeProfile::enveloped(
//!     KeyWrapAlgorithm::Aes128,
//!     ContentEncryptionAlgorithm::Aes128Gcm,
//! ));
//! let envelope = builder.seal_to_der(&recipient, b"Hello, world!", b"", &mut rng)?;
//!
//! let identity = RecipientIdentity::for_certificate(&recipient, keypair.decapsulation_key);
//! let plaintext = open_envelope(&envelope, &identity, b"")?;
//! assert_eq!(plaintext, b"Hello, world!");
//! # Ok::<(), kemri::CmsError>(())
//! ```

pub mod aead;
pub mod algorithm;
pub mod binder;
pub mod envelope;
pub mod error;
pub mod kek;
pub mod kem;
pub mod pem;

pub use algorithm::{ContentEncryptionAlgorithm, KdfAlgorithm, KemAlgorithm, KeyWrapAlgorithm};
pub use binder::{subject_key_identifier, ChainVerifier, RecipientCertificate, RecipientIdentity};
pub use envelope::{
    open_envelope, open_envelope_pem, EnvelopeBuilder, EnvelopeKind, EnvelopeProfile, RecipientIdentifierMode,
};
pub use error::CmsError;
pub use kem::{generate_keypair, KemKeyPair};
pub use pem::{
    parse_pem, to_pem, Pem, PemError, CERTIFICATE_PEM_LABEL, ENVELOPE_PEM_LABEL, PRIVATE_KEY_PEM_LABEL,
    PUBLIC_KEY_PEM_LABEL,
};
