//! The classifier: a total function from "some bytes" to what kind of
//! private-key expression they look like.

use crate::sexp::Cursor;

/// The outer shape of a private-key expression, as determined by its
/// header alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyForm {
    /// The outer tag is not one of the three recognized forms, or the
    /// header itself does not parse.
    Unknown,
    /// `(private-key ...)`.
    Clear,
    /// `(protected-private-key ...)`.
    Protected,
    /// `(shadowed-private-key ...)`.
    Shadowed,
}

/// Classify `buf` by its outer tag. Never fails: any parse failure at the
/// header yields [`KeyForm::Unknown`].
#[must_use]
pub fn classify(buf: &[u8]) -> KeyForm {
    let mut c = Cursor::new(buf);
    if c.expect(b'(').is_err() {
        return KeyForm::Unknown;
    }
    let n = match c.next_len() {
        Ok(n) => n,
        Err(_) => return KeyForm::Unknown,
    };
    if c.match_token(n, "private-key") {
        KeyForm::Clear
    } else if c.match_token(n, "protected-private-key") {
        KeyForm::Protected
    } else if c.match_token(n, "shadowed-private-key") {
        KeyForm::Shadowed
    } else {
        KeyForm::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_clear() {
        assert_eq!(classify(b"(11:private-key(3:rsa))"), KeyForm::Clear);
    }

    #[test]
    fn classifies_protected() {
        assert_eq!(classify(b"(21:protected-private-key(3:rsa))"), KeyForm::Protected);
    }

    #[test]
    fn classifies_shadowed() {
        assert_eq!(classify(b"(20:shadowed-private-key(3:rsa))"), KeyForm::Shadowed);
    }

    #[test]
    fn classifies_unknown_token() {
        assert_eq!(classify(b"(3:foo)"), KeyForm::Unknown);
    }

    #[test]
    fn classifies_garbage_as_unknown() {
        assert_eq!(classify(b"not a sexp at all"), KeyForm::Unknown);
        assert_eq!(classify(b""), KeyForm::Unknown);
        assert_eq!(classify(b"()"), KeyForm::Unknown);
    }
}
