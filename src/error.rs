//! The exhaustive error type shared by every operation in this crate.

use thiserror::Error;

/// Every way an operation in this crate can fail.
///
/// Variants map one-to-one onto the error kinds named in the originating
/// specification; nothing here is retried internally, and every fallible
/// path zeroes whatever secure-memory intermediates it was holding before
/// returning (see [`crate::secure`]).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// The canonical structured expression is malformed: a bad length
    /// prefix, unbalanced parentheses, or an unexpected byte where a
    /// length or token was expected.
    #[error("invalid canonical s-expression: {0}")]
    InvalidSexp(&'static str),

    /// The expression is well formed but its outer tag is not one the
    /// calling operation accepts.
    #[error("unexpected outer tag: {0}")]
    UnknownSexp(&'static str),

    /// The algorithm token inside the expression is not `rsa`.
    #[error("unsupported algorithm")]
    UnsupportedAlgorithm,

    /// The protection mode string, or the hash named inside it, is not
    /// recognized (only `openpgp-s2k3-sha1-aes-cbc` with `sha1` is).
    #[error("unsupported protection mode")]
    UnsupportedProtection,

    /// The shadow protocol tag is not `t1-v1`.
    #[error("unsupported shadow protocol")]
    UnsupportedProtocol,

    /// A structural field of the protected form violates a length
    /// invariant (salt/IV/ciphertext length, non-positive count), or the
    /// recomputed MIC does not match the one carried inside the
    /// ciphertext.
    #[error("corrupted protection: {0}")]
    CorruptedProtection(&'static str),

    /// The post-decrypt plausibility gate failed: the decrypted plaintext
    /// does not begin with a well-formed, size-consistent s-expression.
    /// Indistinguishable, by design, from a wrong passphrase.
    #[error("bad passphrase")]
    BadPassphrase,

    /// A buffer could not be allocated.
    #[error("out of core")]
    OutOfCore,

    /// An argument to the S2K derivation was out of its valid domain
    /// (unsupported mode, zero key length, missing salt, ...).
    #[error("invalid value: {0}")]
    InvalidValue(&'static str),

    /// The injected [`crate::provider::CryptoProvider`] reported a
    /// primitive failure.
    #[error("crypto primitive failure: {0}")]
    CryptoFailure(&'static str),

    /// An internal invariant was violated. Reaching this indicates a
    /// defect in this crate, not in caller input.
    #[error("internal bug: {0}")]
    Bug(&'static str),
}
