//! Encoded-array codec for passing variable-length arrays through single string values.
//!
//! The flattened buffers exchanged with the engine carry exactly one scalar per key, so
//! array-valued attributes travel as one string per entry. Every element is written in
//! its canonical text form and terminated by [`DELIMITER`]; delimiter and [`ESCAPE`]
//! characters inside string elements are escaped, which keeps free-form text lossless
//! and distinguishes `[""]` (`";"`) from `[]` (`""`).
//!
//! Decoding also accepts a final element without terminator, the plain joined form
//! (`"1;2;3"`) produced by older writers.
use std::borrow::Cow;

use crate::error::{Error, Result};

/// Element terminator inside an encoded array.
pub const DELIMITER: char = ';';
/// Escapes a following [`DELIMITER`] or [`ESCAPE`] inside an element.
pub const ESCAPE: char = '\\';

/// A value that can be stored inside an encoded array.
pub trait ArrayElement: Sized {
    /// Name used in parse errors.
    const KIND: &'static str;

    /// Canonical text form of the element.
    fn to_token(&self) -> Cow<'_, str>;

    /// Parses one unescaped token.
    fn parse_token(token: &str) -> Result<Self>;
}

impl ArrayElement for bool {
    const KIND: &'static str = "bool";

    fn to_token(&self) -> Cow<'_, str> {
        Cow::Borrowed(if *self { "true" } else { "false" })
    }

    fn parse_token(token: &str) -> Result<Self> {
        let t = token.trim();
        if t.eq_ignore_ascii_case("true") || t == "1" {
            Ok(true)
        } else if t.eq_ignore_ascii_case("false") || t == "0" {
            Ok(false)
        } else {
            Err(Error::parse(Self::KIND, token))
        }
    }
}

impl ArrayElement for f64 {
    const KIND: &'static str = "double";

    fn to_token(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn parse_token(token: &str) -> Result<Self> {
        token
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::parse(Self::KIND, token))
    }
}

impl ArrayElement for i32 {
    const KIND: &'static str = "integer";

    fn to_token(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn parse_token(token: &str) -> Result<Self> {
        token
            .trim()
            .parse::<i32>()
            .map_err(|_| Error::parse(Self::KIND, token))
    }
}

impl ArrayElement for String {
    const KIND: &'static str = "string";

    fn to_token(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }

    fn parse_token(token: &str) -> Result<Self> {
        Ok(token.to_owned())
    }
}

/// Encodes a sequence into a single string.
pub fn encode_array<T: ArrayElement>(values: &[T]) -> String {
    let mut out = String::new();
    for value in values {
        for c in value.to_token().chars() {
            if c == DELIMITER || c == ESCAPE {
                out.push(ESCAPE);
            }
            out.push(c);
        }
        out.push(DELIMITER);
    }
    out
}

/// Decodes a string produced by [`encode_array`] (or the plain joined form).
///
/// Tokens that do not parse as `T` and dangling or unknown escapes are errors; nothing is
/// coerced to a default.
pub fn decode_array<T: ArrayElement>(encoded: &str) -> Result<Vec<T>> {
    let mut values = Vec::new();
    let mut token = String::new();
    let mut chars = encoded.chars();

    while let Some(c) = chars.next() {
        match c {
            ESCAPE => match chars.next() {
                Some(next @ (DELIMITER | ESCAPE)) => token.push(next),
                _ => return Err(Error::parse("encoded array", encoded)),
            },
            DELIMITER => {
                values.push(T::parse_token(&token)?);
                token.clear();
            }
            _ => token.push(c),
        }
    }

    if !token.is_empty() {
        values.push(T::parse_token(&token)?);
    }

    Ok(values)
}
