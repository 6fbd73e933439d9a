//! Sample identifiers printed by shape applications.
//!
//! A data line looks like `Square     BLUE       012 034 [20]`; the
//! `"012 034"` pair identifies the sample.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Length of a sample token: three digits, a space, three digits.
pub const SAMPLE_TOKEN_LEN: usize = 7;

/// Opaque identifier of one unit of published data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sample(String);

impl Sample {
    /// Wrap a token without validating it.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Parse a string that must be exactly one sample token.
    pub fn parse(token: &str) -> Option<Self> {
        if is_token(token.as_bytes()) {
            Some(Self(token.to_string()))
        } else {
            None
        }
    }

    /// Find the last sample token in `text`.
    ///
    /// The last token is the one printed immediately before a data marker,
    /// so it is the one that identifies the sample the marker belongs to.
    pub fn find_last(text: &str) -> Option<Self> {
        let bytes = text.as_bytes();
        if bytes.len() < SAMPLE_TOKEN_LEN {
            return None;
        }
        (0..=bytes.len() - SAMPLE_TOKEN_LEN)
            .rev()
            .find(|&i| is_token(&bytes[i..i + SAMPLE_TOKEN_LEN]))
            .map(|i| Self(text[i..i + SAMPLE_TOKEN_LEN].to_string()))
    }

    /// The token text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn is_token(bytes: &[u8]) -> bool {
    bytes.len() == SAMPLE_TOKEN_LEN
        && bytes[..3].iter().all(u8::is_ascii_digit)
        && bytes[3] == b' '
        && bytes[4..].iter().all(u8::is_ascii_digit)
}
