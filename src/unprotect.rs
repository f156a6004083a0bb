//! The Unprotector: protected private key + passphrase -> clear private key.

use crate::error::Error;
use crate::mic;
use crate::protect::PROTECT_INFO;
use crate::provider::CryptoProvider;
use crate::s2k;
use crate::sexp::{canon_len, Cursor};

const MODE_STR: &str = "openpgp-s2k3-sha1-aes-cbc";

/// Everything pulled out of a `(protected-private-key ...)` expression by
/// [`parse_protected`], borrowed from the input buffer.
pub(crate) struct ProtectedInfo<'a> {
    /// Offset of the `(` opening `(rsa ...)`.
    pub(crate) algo_open: usize,
    /// Offset of the `(` opening the `(protected ...)` sub-list.
    pub(crate) prot_list_start: usize,
    /// Offset of the `)` closing the `(protected ...)` sub-list (inclusive).
    pub(crate) prot_list_end: usize,
    pub(crate) salt: [u8; 8],
    pub(crate) count: u32,
    pub(crate) iv: [u8; 16],
    pub(crate) ciphertext: &'a [u8],
}

/// Skip one generic value: a nested sub-expression or a length-prefixed
/// byte string, without interpreting its contents.
fn skip_value(c: &mut Cursor) -> Result<(), Error> {
    if c.peek_is(b'(') {
        c.expect(b'(')?;
        c.skip(1)
    } else {
        let n = c.next_len()?;
        c.take(n)?;
        Ok(())
    }
}

/// Parse a `(protected-private-key (rsa ...))` expression, locating the
/// `(protected ...)` sub-list and decoding its fields.
///
/// # Errors
/// [`Error::InvalidSexp`] (malformed shape, including a missing algorithm
/// sub-list), [`Error::UnknownSexp`] (outer tag is not
/// `protected-private-key`), [`Error::UnsupportedAlgorithm`],
/// [`Error::CorruptedProtection`] (no `protected` sub-list present — a
/// well-formed protected key must carry one — or salt/IV/ciphertext
/// length invariants, bad count), [`Error::UnsupportedProtection`] (mode
/// string or hash name unrecognized), [`Error::Bug`] (the splice point is
/// below the 26-byte floor a well-formed header guarantees).
pub(crate) fn parse_protected(buf: &[u8]) -> Result<ProtectedInfo<'_>, Error> {
    let buf_len = canon_len(buf);
    if buf_len == 0 {
        return Err(Error::InvalidSexp("not a well-formed canonical expression"));
    }
    let buf = &buf[..buf_len];

    let mut c = Cursor::new(buf);
    c.expect(b'(')?;
    let n = c.next_len()?;
    if !c.match_token(n, "protected-private-key") {
        return Err(Error::UnknownSexp("outer tag is not protected-private-key"));
    }
    if !c.peek_is(b'(') {
        return Err(Error::InvalidSexp("missing algorithm sub-list"));
    }
    let algo_open = c.pos();
    c.expect(b'(')?;
    let n = c.next_len()?;
    PROTECT_INFO
        .iter()
        .find(|info| c.match_token(n, info.name))
        .ok_or(Error::UnsupportedAlgorithm)?;

    let mut prot_list_start = None;
    loop {
        if c.peek_is(b')') {
            break;
        }
        let list_start = c.pos();
        c.expect(b'(')?;
        let n = c.next_len()?;
        if c.match_token(n, "protected") {
            prot_list_start = Some(list_start);
            break;
        }
        skip_value(&mut c)?;
        c.expect(b')')?;
    }
    let prot_list_start =
        prot_list_start.ok_or(Error::CorruptedProtection("no protected sub-list present"))?;
    if prot_list_start < 26 {
        return Err(Error::Bug("replace position impossibly small for a well-formed header"));
    }

    let n = c.next_len()?;
    if !c.match_token(n, MODE_STR) {
        return Err(Error::UnsupportedProtection);
    }

    c.expect(b'(')?;
    c.expect(b'(')?;
    let n = c.next_len()?;
    if !c.match_token(n, "sha1") {
        return Err(Error::UnsupportedProtection);
    }
    let n = c.next_len()?;
    if n != 8 {
        return Err(Error::CorruptedProtection("salt must be 8 bytes"));
    }
    let (s, e) = c.take(n)?;
    let mut salt = [0u8; 8];
    salt.copy_from_slice(&buf[s..e]);

    let n = c.next_len()?;
    let (s, e) = c.take(n)?;
    let count_str =
        core::str::from_utf8(&buf[s..e]).map_err(|_| Error::CorruptedProtection("count is not ascii"))?;
    let count: u32 = count_str
        .parse()
        .map_err(|_| Error::CorruptedProtection("count is not a positive integer"))?;
    if count == 0 {
        return Err(Error::CorruptedProtection("count must be positive"));
    }
    c.expect(b')')?; // closes (sha1 salt count)

    let n = c.next_len()?;
    if n != 16 {
        return Err(Error::CorruptedProtection("iv must be 16 bytes"));
    }
    let (s, e) = c.take(n)?;
    let mut iv = [0u8; 16];
    iv.copy_from_slice(&buf[s..e]);
    c.expect(b')')?; // closes ((sha1 ...) iv)

    let n = c.next_len()?;
    if n % 16 != 0 {
        return Err(Error::CorruptedProtection("ciphertext length must be a multiple of 16"));
    }
    let (s, e) = c.take(n)?;
    let ciphertext = &buf[s..e];
    c.expect(b')')?; // closes (protected ...)
    let prot_list_end = c.pos() - 1;

    Ok(ProtectedInfo { algo_open, prot_list_start, prot_list_end, salt, count, iv, ciphertext })
}

/// Extract, from the decrypted plaintext wrapped block, the verbatim
/// `<d><p><q><u>` span and the embedded 20-byte MIC.
fn parse_plaintext(plain: &[u8]) -> Result<(&[u8], [u8; 20]), Error> {
    let mut c = Cursor::new(plain);
    c.expect(b'(')?;
    c.expect(b'(')?;
    let group_start = c.pos();
    loop {
        if c.peek_is(b')') {
            break;
        }
        if c.peek_is(b'(') {
            c.expect(b'(')?;
            c.skip(1)?;
        } else {
            let n = c.next_len()?;
            c.take(n)?;
        }
    }
    let group_end = c.pos();
    c.expect(b')')?;

    c.expect(b'(')?;
    let n = c.next_len()?;
    if !c.match_token(n, "hash") {
        return Err(Error::CorruptedProtection("missing hash tag in decrypted plaintext"));
    }
    let n = c.next_len()?;
    if !c.match_token(n, "sha1") {
        return Err(Error::CorruptedProtection("unsupported hash tag in decrypted plaintext"));
    }
    let n = c.next_len()?;
    if n != 20 {
        return Err(Error::CorruptedProtection("mic must be 20 bytes"));
    }
    let (s, e) = c.take(n)?;
    let mut stored_mic = [0u8; 20];
    stored_mic.copy_from_slice(&plain[s..e]);
    c.expect(b')')?;
    c.expect(b')')?;

    Ok((&plain[group_start..group_end], stored_mic))
}

/// Unprotect `protected` under `passphrase`, verifying integrity and
/// returning an owned `(private-key ...)` buffer.
///
/// # Errors
/// See [`parse_protected`] for structural failures. Additionally:
/// [`Error::BadPassphrase`] if the post-decrypt plausibility gate fails
/// (indistinguishable, by design, from a wrong passphrase);
/// [`Error::CorruptedProtection`] if the recomputed MIC does not match the
/// one embedded in the plaintext.
pub fn unprotect<P: CryptoProvider + ?Sized>(
    protected: &[u8], passphrase: &[u8], provider: &P,
) -> Result<Vec<u8>, Error> {
    let info = parse_protected(protected)?;

    let derived = s2k::derive(provider, passphrase, &info.salt, info.count, 16)?;
    let key: [u8; 16] = derived[..16].try_into().expect("16-byte slice");
    let plain = provider.aes128_cbc_decrypt(&key, &info.iv, info.ciphertext)?;

    // Fast plausibility gate (corrected: the source's `!= '(' && != '('`
    // is a typo'd AND where an OR was intended; this requires both leading
    // bytes to be '(').
    if plain.first() != Some(&b'(') || plain.get(1) != Some(&b'(') {
        return Err(Error::BadPassphrase);
    }

    let reallen = canon_len(&plain);
    if reallen == 0 || reallen + 16 < info.ciphertext.len() {
        return Err(Error::BadPassphrase);
    }

    let (dpqu_span, stored_mic) = parse_plaintext(&plain[..reallen])?;

    let mut clear = Vec::with_capacity(
        16 + (info.prot_list_start - info.algo_open)
            + dpqu_span.len()
            + (protected.len() - info.prot_list_end - 1),
    );
    clear.extend_from_slice(b"(11:private-key");
    clear.extend_from_slice(&protected[info.algo_open..info.prot_list_start]);
    clear.extend_from_slice(dpqu_span);
    clear.extend_from_slice(&protected[info.prot_list_end + 1..]);

    let recomputed = mic::compute(&clear, provider)?;
    if recomputed != stored_mic {
        return Err(Error::CorruptedProtection("mic mismatch"));
    }

    Ok(clear)
}
