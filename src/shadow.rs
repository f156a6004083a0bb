//! Shadow builder and reader.
//!
//! A shadowed private key carries no secret material at all: just the
//! public key plus an opaque reference ("shadow info") to where the real
//! private key lives, e.g. a smartcard serial and on-card key id. This
//! module only ever touches the `n`/`e` public parameters and the opaque
//! shadow info blob; it never sees `d`/`p`/`q`/`u`.

use crate::error::Error;
use crate::sexp::{canon_len, Cursor};

/// Build `(shadowed-private-key (rsa (n ...)(e ...) (shadowed t1-v1
/// <shadow_info>)))` from a `(public-key (rsa (n ...)(e ...)))` expression
/// and an opaque `shadow_info` expression, by copying the public-key body
/// verbatim and splicing the `shadowed` list in just before the algorithm
/// sub-list's closing paren.
///
/// Only the `t1-v1` shadow protocol is produced; only its tag is defined
/// by this protocol.
///
/// # Errors
/// [`Error::InvalidValue`] if either input is not a well-formed canonical
/// expression; [`Error::UnknownSexp`] if `pubkey`'s outer tag is not
/// `public-key`; [`Error::InvalidSexp`] if `pubkey` is missing its
/// algorithm sub-list.
pub fn build_shadow(pubkey: &[u8], shadow_info: &[u8]) -> Result<Vec<u8>, Error> {
    let pubkey_len = canon_len(pubkey);
    let shadow_info_len = canon_len(shadow_info);
    if pubkey_len == 0 || shadow_info_len == 0 {
        return Err(Error::InvalidValue("pubkey or shadow_info is not a valid canonical expression"));
    }

    let mut c = Cursor::new(pubkey);
    c.expect(b'(')?;
    let n = c.next_len()?;
    if !c.match_token(n, "public-key") {
        return Err(Error::UnknownSexp("outer tag is not public-key"));
    }
    if !c.peek_is(b'(') {
        return Err(Error::InvalidSexp("missing algorithm sub-list"));
    }
    let algo_open = c.pos();
    c.expect(b'(')?;
    let n = c.next_len()?;
    c.take(n)?; // algorithm name

    while !c.peek_is(b')') {
        c.expect(b'(')?;
        let n = c.next_len()?;
        c.take(n)?; // key
        let n = c.next_len()?;
        c.take(n)?; // value
        c.expect(b')')?;
    }
    let splice_point = c.pos(); // the ')' closing the algorithm sub-list

    let mut out = Vec::with_capacity(
        24 + (splice_point - algo_open) + 19 + shadow_info_len + 1 + (pubkey_len - splice_point),
    );
    out.extend_from_slice(b"(20:shadowed-private-key");
    out.extend_from_slice(&pubkey[algo_open..splice_point]);
    out.extend_from_slice(b"(8:shadowed5:t1-v1");
    out.extend_from_slice(&shadow_info[..shadow_info_len]);
    out.push(b')');
    out.extend_from_slice(&pubkey[splice_point..pubkey_len]);
    Ok(out)
}

/// Return a span into `shadowed` pointing at its `<shadow_info>`
/// sub-expression, starting at its opening `(`.
///
/// # Errors
/// [`Error::UnknownSexp`] if the outer tag is not `shadowed-private-key`;
/// [`Error::InvalidSexp`] if the algorithm sub-list or the `shadowed` list
/// is missing; [`Error::UnsupportedProtocol`] if the shadow protocol tag
/// is not `t1-v1`.
pub fn read_shadow_info(shadowed: &[u8]) -> Result<&[u8], Error> {
    let mut c = Cursor::new(shadowed);
    c.expect(b'(')?;
    let n = c.next_len()?;
    if !c.match_token(n, "shadowed-private-key") {
        return Err(Error::UnknownSexp("outer tag is not shadowed-private-key"));
    }
    if !c.peek_is(b'(') {
        return Err(Error::InvalidSexp("missing algorithm sub-list"));
    }
    c.expect(b'(')?;
    let n = c.next_len()?;
    c.take(n)?; // algorithm name

    loop {
        if c.peek_is(b')') {
            return Err(Error::InvalidSexp("no shadowed list present"));
        }
        c.expect(b'(')?;
        let n = c.next_len()?;
        if c.match_token(n, "shadowed") {
            break;
        }
        c.take(n)?; // key (not "shadowed")
        let n = c.next_len()?;
        c.take(n)?; // value
        c.expect(b')')?;
    }

    let n = c.next_len()?;
    if !c.match_token(n, "t1-v1") {
        return Err(Error::UnsupportedProtocol);
    }
    if !c.peek_is(b'(') {
        return Err(Error::InvalidSexp("shadow_info is not an s-expression"));
    }
    let start = c.pos();
    let len = canon_len(&shadowed[start..]);
    if len == 0 {
        return Err(Error::InvalidSexp("malformed shadow_info"));
    }
    Ok(&shadowed[start..start + len])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_then_read_round_trips() {
        let pubkey = b"(10:public-key(3:rsa(1:n1:x)(1:e1:y)))";
        let shadow_info = b"(7:card-no5:12345)";
        let shadowed = build_shadow(pubkey, shadow_info).unwrap();
        let info = read_shadow_info(&shadowed).unwrap();
        assert_eq!(info, &shadow_info[..]);
    }

    #[test]
    fn build_rejects_non_public_key_tag() {
        let not_pubkey = b"(11:private-key(3:rsa(1:n1:x)))";
        let shadow_info = b"(1:a1:b)";
        assert!(build_shadow(not_pubkey, shadow_info).is_err());
    }

    #[test]
    fn read_rejects_unknown_protocol_tag() {
        let shadowed = b"(20:shadowed-private-key(3:rsa(1:n1:x)(1:e1:y)(8:shadowed5:t2-v2(1:a1:b))))";
        assert_eq!(read_shadow_info(shadowed), Err(Error::UnsupportedProtocol));
    }

    #[test]
    fn read_rejects_missing_shadowed_list() {
        let shadowed = b"(20:shadowed-private-key(3:rsa(1:n1:x)(1:e1:y)))";
        assert!(read_shadow_info(shadowed).is_err());
    }
}
