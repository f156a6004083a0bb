//! Message integrity code (MIC) computation over a clear private-key
//! expression.
//!
//! The MIC is SHA-1 over the byte range `[algo_open, algo_close]` — the
//! `(rsa ...)` sub-list including its opening and closing parentheses —
//! of a `(private-key ...)` expression. This range must be recomputed
//! identically by the Unprotector after it reassembles a clear expression
//! from spliced spans, so this module walks the generic `(key value)`
//! shape of the algorithm sub-list rather than assuming the protector's
//! specific parameter ordering.

use crate::error::Error;
use crate::provider::CryptoProvider;
use crate::sexp::Cursor;

/// Locate the `[algo_open, algo_close]` byte span (both endpoints
/// inclusive) of the `(rsa ...)` sub-list inside a `(private-key ...)`
/// expression, without validating the individual parameter lists beyond
/// their generic `(key value)` shape.
pub(crate) fn locate_rsa_span(buf: &[u8]) -> Result<(usize, usize), Error> {
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
    c.take(n)?; // skip the algorithm name itself

    while c.peek_is(b'(') {
        c.expect(b'(')?;
        let n = c.next_len()?;
        c.take(n)?; // key
        let n = c.next_len()?;
        c.take(n)?; // value
        c.expect(b')')?;
    }
    c.expect(b')')?;
    let algo_close = c.pos() - 1;
    Ok((algo_open, algo_close))
}

/// Compute the 20-byte MIC for a clear `(private-key ...)` expression.
pub(crate) fn compute<P: CryptoProvider + ?Sized>(
    buf: &[u8], provider: &P,
) -> Result<[u8; 20], Error> {
    let (start, end) = locate_rsa_span(buf)?;
    Ok(provider.sha1(&buf[start..=end]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DefaultProvider;

    #[test]
    fn locates_algo_span_exactly() {
        let buf = b"(11:private-key(3:rsa(1:n1:A)(1:e1:B)))";
        let (start, end) = locate_rsa_span(buf).unwrap();
        assert_eq!(&buf[start..=end], b"(3:rsa(1:n1:A)(1:e1:B))");
    }

    #[test]
    fn compute_is_deterministic() {
        let buf = b"(11:private-key(3:rsa(1:n1:A)(1:e1:B)))";
        let p = DefaultProvider;
        let mic1 = compute(buf, &p).unwrap();
        let mic2 = compute(buf, &p).unwrap();
        assert_eq!(mic1, mic2);
    }

    #[test]
    fn rejects_non_private_key_outer_tag() {
        let buf = b"(13:protected-foo(3:rsa))";
        assert!(locate_rsa_span(buf).is_err());
    }
}
