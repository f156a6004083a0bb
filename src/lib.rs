#![deny(clippy::pedantic)]
#![deny(warnings)]
#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

///
/// Transforms RSA private-key canonical s-expressions between clear,
/// passphrase-protected, and hardware-shadowed form.
//
// Functionality map:
//
// CSE grammar, byte-span cursor        --> sexp.rs
// SHA-1 integrity tag over (rsa ...)   --> mic.rs
// OpenPGP S2K mode 3 KDF               --> s2k.rs
// clear -> protected                   --> protect.rs
// protected -> clear                   --> unprotect.rs
// public key + opaque ref -> shadowed  --> shadow.rs
// outer-tag classification             --> classify.rs
// injected RNG/SHA-1/AES-CBC           --> provider.rs
// zero-on-drop buffers                 --> secure.rs
mod mic;
mod s2k;
mod sexp;

pub mod classify;
pub mod error;
pub mod protect;
pub mod provider;
pub mod secure;
pub mod shadow;
pub mod unprotect;

pub use classify::{classify, KeyForm};
pub use error::Error;
pub use protect::protect;
pub use secure::SecureBytes;
pub use shadow::{build_shadow, read_shadow_info};
pub use unprotect::unprotect;
