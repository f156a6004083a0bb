//! The `CryptoProvider` trait boundary and its default implementation.
//!
//! Every primitive this core needs — a CSPRNG, SHA-1, and AES-128-CBC — is
//! reached only through this trait, so a caller embedding this crate inside
//! an existing agent can swap in its own FIPS-validated or HSM-backed
//! primitives without touching the parsing or splicing logic.

use crate::error::Error;
use crate::secure::{secure, SecureBytes};

#[cfg(feature = "default-rng")]
use rand_core::{OsRng, RngCore};

/// The cryptographic primitives this core is built from.
///
/// Implementations are expected to be thread-safe if used from more than
/// one thread at once; this core itself takes no locks and holds no
/// process-wide state (see `spec.md` §5).
pub trait CryptoProvider {
    /// Cryptographically strong random bytes, returned pre-wrapped in
    /// secure memory.
    fn random_bytes(&self, n: usize) -> SecureBytes;

    /// SHA-1 over `data`, in its entirety, in one call.
    fn sha1(&self, data: &[u8]) -> [u8; 20];

    /// AES-128-CBC encrypt. `plaintext.len()` must be a positive multiple
    /// of 16; implementations should treat violation as a [`Error::Bug`]
    /// since callers in this crate never violate it.
    fn aes128_cbc_encrypt(
        &self, key: &[u8; 16], iv: &[u8; 16], plaintext: &[u8],
    ) -> Result<Vec<u8>, Error>;

    /// AES-128-CBC decrypt. `ciphertext.len()` must be a positive multiple
    /// of 16.
    fn aes128_cbc_decrypt(
        &self, key: &[u8; 16], iv: &[u8; 16], ciphertext: &[u8],
    ) -> Result<SecureBytes, Error>;
}

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;

/// The bundled [`CryptoProvider`], built on the RustCrypto `aes`/`cbc`/
/// `sha1` crates and, when the `default-rng` feature is enabled,
/// `rand_core::OsRng`.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultProvider;

impl CryptoProvider for DefaultProvider {
    #[cfg(feature = "default-rng")]
    fn random_bytes(&self, n: usize) -> SecureBytes {
        let mut buf = vec![0u8; n];
        OsRng.fill_bytes(&mut buf);
        secure(buf)
    }

    #[cfg(not(feature = "default-rng"))]
    fn random_bytes(&self, _n: usize) -> SecureBytes {
        unimplemented!("DefaultProvider::random_bytes requires the `default-rng` feature")
    }

    fn sha1(&self, data: &[u8]) -> [u8; 20] {
        use sha1::{Digest, Sha1};
        let mut hasher = Sha1::new();
        hasher.update(data);
        hasher.finalize().into()
    }

    fn aes128_cbc_encrypt(
        &self, key: &[u8; 16], iv: &[u8; 16], plaintext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        use cbc::cipher::block_padding::NoPadding;
        use cbc::cipher::{BlockEncryptMut, KeyIvInit};

        if plaintext.is_empty() || plaintext.len() % 16 != 0 {
            return Err(Error::Bug("plaintext not a positive multiple of the block size"));
        }
        let mut buf = plaintext.to_vec();
        let enc = Aes128CbcEnc::new_from_slices(key, iv)
            .map_err(|_| Error::CryptoFailure("bad key/iv length"))?;
        let n = buf.len();
        enc.encrypt_padded_mut::<NoPadding>(&mut buf, n)
            .map_err(|_| Error::CryptoFailure("aes-cbc encrypt"))?;
        Ok(buf)
    }

    fn aes128_cbc_decrypt(
        &self, key: &[u8; 16], iv: &[u8; 16], ciphertext: &[u8],
    ) -> Result<SecureBytes, Error> {
        use cbc::cipher::block_padding::NoPadding;
        use cbc::cipher::{BlockDecryptMut, KeyIvInit};

        if ciphertext.is_empty() || ciphertext.len() % 16 != 0 {
            return Err(Error::CorruptedProtection("ciphertext length not a multiple of 16"));
        }
        let mut buf = ciphertext.to_vec();
        let dec = Aes128CbcDec::new_from_slices(key, iv)
            .map_err(|_| Error::CryptoFailure("bad key/iv length"))?;
        let len = dec
            .decrypt_padded_mut::<NoPadding>(&mut buf)
            .map_err(|_| Error::CryptoFailure("aes-cbc decrypt"))?
            .len();
        buf.truncate(len);
        Ok(secure(buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha1_matches_known_vector() {
        let p = DefaultProvider;
        // SHA-1("abc")
        let digest = p.sha1(b"abc");
        assert_eq!(
            hex::encode(digest),
            "a9993e364706816aba3e25717850c26c9cd0d89"
        );
    }

    #[test]
    fn aes_cbc_round_trips() {
        let p = DefaultProvider;
        let key = [0x11u8; 16];
        let iv = [0x22u8; 16];
        let plain = [0x33u8; 32];
        let ct = p.aes128_cbc_encrypt(&key, &iv, &plain).unwrap();
        assert_eq!(ct.len(), 32);
        let pt = p.aes128_cbc_decrypt(&key, &iv, &ct).unwrap();
        assert_eq!(&pt[..], &plain[..]);
    }

    #[cfg(feature = "default-rng")]
    #[test]
    fn random_bytes_has_requested_length() {
        let p = DefaultProvider;
        assert_eq!(p.random_bytes(40).len(), 40);
    }
}
