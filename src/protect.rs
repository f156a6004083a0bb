//! The Protector: clear private key + passphrase -> protected private key.

use std::ops::RangeInclusive;

use crate::error::Error;
use crate::mic;
use crate::provider::CryptoProvider;
use crate::s2k;
use crate::secure::secure;
use crate::sexp::{canon_len, Cursor};

/// One entry per supported algorithm: its name, the fixed order its
/// parameter letters appear in, and which of those parameters (by index
/// into `params`) form the protected range. Mirrors the source's
/// data-driven `protect_info[]` table; only one entry exists since this
/// core implements RSA alone, but a second algorithm is a one-line
/// addition here rather than a rewrite of the parsing logic.
pub(crate) struct ProtectInfo {
    pub(crate) name: &'static str,
    pub(crate) params: &'static str,
    pub(crate) range: RangeInclusive<usize>,
}

pub(crate) const PROTECT_INFO: [ProtectInfo; 1] =
    [ProtectInfo { name: "rsa", params: "nedpqu", range: 2..=5 }];

/// The OpenPGP S2K iteration count this core always uses. Per the source
/// this core is modeled on, the call site passes this literal integer
/// straight through as the already-decoded iteration count — it is never
/// run through the one-byte `(16+(c&15))<<((c>>4)+6)` OpenPGP encoding —
/// and the same literal value is what ends up stored, as ASCII, in the
/// protected expression's count slot. `Unprotect` must use exactly the
/// stored value, so `Protect` and `Unprotect` agree on it by construction.
const S2K_COUNT: u32 = 96;

const MODE_STR: &str = "openpgp-s2k3-sha1-aes-cbc";

/// `(algo_open, algo_close, prot_begin, prot_end)`: the algorithm
/// sub-list's span and the span of the secret parameter lists `d p q u`
/// within a clear `(private-key (rsa ...))` expression.
fn locate_clear_spans(buf: &[u8]) -> Result<(usize, usize, usize, usize), Error> {
    let mut c = Cursor::new(buf);
    c.expect(b'(')?;
    let n = c.next_len()?;
    if !c.match_token(n, "private-key") {
        return Err(Error::UnknownSexp("outer tag is not private-key"));
    }
    if !c.peek_is(b'(') {
        return Err(Error::InvalidSexp("missing algorithm sub-list"));
    }
    let algo_open = c.pos();
    c.expect(b'(')?;
    let n = c.next_len()?;
    let info = PROTECT_INFO
        .iter()
        .find(|info| c.match_token(n, info.name))
        .ok_or(Error::UnsupportedAlgorithm)?;

    let mut prot_begin = 0usize;
    let mut prot_end = 0usize;
    for (i, letter) in info.params.chars().enumerate() {
        if !c.peek_is(b'(') {
            return Err(Error::InvalidSexp("missing rsa parameter list"));
        }
        let list_open = c.pos();
        c.expect(b'(')?;
        let n = c.next_len()?;
        let mut letter_buf = [0u8; 4];
        if !c.match_token(n, letter.encode_utf8(&mut letter_buf)) {
            return Err(Error::InvalidSexp("rsa parameters out of expected order"));
        }
        let n = c.next_len()?;
        c.take(n)?;
        c.expect(b')')?;
        if i == *info.range.start() {
            prot_begin = list_open;
        }
        if i == *info.range.end() {
            prot_end = c.pos() - 1;
        }
    }

    // optional extension lists
    while c.peek_is(b'(') {
        c.expect(b'(')?;
        c.skip(1)?;
    }
    c.expect(b')')?;
    let algo_close = c.pos() - 1;

    Ok((algo_open, algo_close, prot_begin, prot_end))
}

/// Protect `clear`, a `(private-key (rsa (n e d p q u) ...))` expression,
/// under `passphrase`, producing an owned `(protected-private-key ...)`
/// buffer.
///
/// # Errors
/// [`Error::InvalidSexp`], [`Error::UnknownSexp`] (outer tag is not
/// `private-key`), [`Error::UnsupportedAlgorithm`] (algorithm is not
/// `rsa`), [`Error::CryptoFailure`] (the provider reported a primitive
/// failure), [`Error::InvalidValue`] (propagated from the S2K step,
/// unreachable in practice since `keylen` here is always 16).
pub fn protect<P: CryptoProvider + ?Sized>(
    clear: &[u8], passphrase: &[u8], provider: &P,
) -> Result<Vec<u8>, Error> {
    let clear_len = canon_len(clear);
    if clear_len == 0 {
        return Err(Error::InvalidSexp("not a well-formed canonical expression"));
    }
    let clear = &clear[..clear_len];

    let (algo_open, algo_close, prot_begin, prot_end) = locate_clear_spans(clear)?;
    let mic = provider.sha1(&clear[algo_open..=algo_close]);

    let random = provider.random_bytes(2 * 16 + 8);
    let iv: [u8; 16] = random[0..16].try_into().expect("16-byte slice");
    let pad = &random[16..32];
    let salt: [u8; 8] = random[32..40].try_into().expect("8-byte slice");

    let derived = s2k::derive(provider, passphrase, &salt, S2K_COUNT, 16)?;
    let key: [u8; 16] = derived[..16].try_into().expect("16-byte slice");

    // the plaintext wrapped block: "((<d><p><q><u>)(hash sha1 <mic>))" plus
    // as much random padding as it takes to reach the next block boundary.
    let mut core = secure(Vec::new());
    core.extend_from_slice(b"((");
    core.extend_from_slice(&clear[prot_begin..=prot_end]);
    core.extend_from_slice(b")(4:hash4:sha120:");
    core.extend_from_slice(&mic);
    core.extend_from_slice(b"))");
    core.extend_from_slice(pad);

    let encrypt_len = (core.len() / 16) * 16;
    let ciphertext = provider.aes128_cbc_encrypt(&key, &iv, &core[..encrypt_len])?;

    let mut out = Vec::with_capacity(
        26 + (prot_begin - algo_open) + 12 + 3 + MODE_STR.len() + 11 + 8 + 4 + 16
            + 1 + 8 + ciphertext.len() + 1 + (clear_len - (prot_end + 1)),
    );
    out.extend_from_slice(b"(21:protected-private-key");
    out.extend_from_slice(&clear[algo_open..prot_begin]);
    out.extend_from_slice(b"(9:protected");
    out.extend_from_slice(format!("{}:{}", MODE_STR.len(), MODE_STR).as_bytes());
    out.extend_from_slice(b"((4:sha18:");
    out.extend_from_slice(&salt);
    out.extend_from_slice(b"2:96)16:");
    out.extend_from_slice(&iv);
    out.push(b')');
    out.extend_from_slice(format!("{}:", ciphertext.len()).as_bytes());
    out.extend_from_slice(&ciphertext);
    out.push(b')');
    out.extend_from_slice(&clear[prot_end + 1..]);

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, KeyForm};
    use crate::provider::DefaultProvider;

    const CLEAR: &[u8] =
        b"(11:private-key(3:rsa(1:n3:\x01\x00\x01)(1:e1:\x03)(1:d1:\x07)(1:p1:\x05)(1:q1:\x0b)(1:u1:\x02)))";

    #[test]
    fn protect_produces_classifiable_output() {
        let p = DefaultProvider;
        let protected = protect(CLEAR, b"abc", &p).unwrap();
        assert_eq!(classify(&protected), KeyForm::Protected);
    }

    #[test]
    fn protect_ciphertext_length_is_block_aligned_and_nonzero() {
        let p = DefaultProvider;
        let protected = protect(CLEAR, b"abc", &p).unwrap();
        // locate the ciphertext span via the same reader the unprotector uses
        let info = crate::unprotect::parse_protected(&protected).unwrap();
        assert!(!info.ciphertext.is_empty());
        assert_eq!(info.ciphertext.len() % 16, 0);
    }

    #[test]
    fn protect_rejects_non_private_key_tag() {
        let p = DefaultProvider;
        let not_clear = b"(10:public-key(3:rsa(1:n1:x)(1:e1:y)))";
        assert!(protect(not_clear, b"abc", &p).is_err());
    }

    #[test]
    fn protect_rejects_non_rsa_algorithm() {
        let p = DefaultProvider;
        let weird = b"(11:private-key(3:dsa(1:n1:x)))";
        assert_eq!(protect(weird, b"abc", &p), Err(Error::UnsupportedAlgorithm));
    }
}
