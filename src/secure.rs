//! Secure-memory buffer discipline.
//!
//! Every buffer that transiently holds key bytes, passphrase-derived key
//! bytes, MIC input/output, or the plaintext wrapped block is represented
//! as [`SecureBytes`] so it is zeroed on every exit path — including early
//! returns on error and unwinding panics — without hand-written cleanup
//! code at each `return`. The sole exception is the final output buffer
//! handed back to the caller of `protect`/`unprotect`, which is a plain
//! `Vec<u8>`; zeroizing it is the caller's responsibility.

use zeroize::Zeroizing;

/// An owned, zero-on-drop byte buffer.
pub type SecureBytes = Zeroizing<Vec<u8>>;

/// Wrap an owned `Vec<u8>` as [`SecureBytes`].
pub(crate) fn secure(v: Vec<u8>) -> SecureBytes { Zeroizing::new(v) }
