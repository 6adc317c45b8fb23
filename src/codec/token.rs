//! Reversible, path-safe token encoding.
//!
//! The token is standard base64 of the UTF-8 bytes with `+` → `-`,
//! `/` → `_` and the padding stripped. Decoding reverses the substitution
//! and rebuilds the padding from `len % 4`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

/// Failure to turn a token back into a URL.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("encoded origin is empty")]
    Empty,

    #[error("encoded origin is not valid base64: {0}")]
    Base64(String),

    #[error("encoded origin is not valid UTF-8")]
    Utf8,
}

/// Encode a URL (or any string) as a token.
pub fn encode(url: &str) -> String {
    STANDARD
        .encode(url.as_bytes())
        .chars()
        .filter_map(|c| match c {
            '+' => Some('-'),
            '/' => Some('_'),
            '=' => None,
            other => Some(other),
        })
        .collect()
}

/// Decode a token produced by [`encode`].
pub fn decode(token: &str) -> Result<String, DecodeError> {
    if token.is_empty() {
        return Err(DecodeError::Empty);
    }

    let mut padded: String = token
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();

    match padded.len() % 4 {
        0 => {}
        1 => {
            return Err(DecodeError::Base64(format!(
                "invalid token length {}",
                token.len()
            )))
        }
        rem => padded.push_str(&"=".repeat(4 - rem)),
    }

    let bytes = STANDARD
        .decode(padded.as_bytes())
        .map_err(|e| DecodeError::Base64(e.to_string()))?;

    String::from_utf8(bytes).map_err(|_| DecodeError::Utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_known_value() {
        assert_eq!(encode("https://example.com/path"), "aHR0cHM6Ly9leGFtcGxlLmNvbS9wYXRo");
    }

    #[test]
    fn test_round_trip_preserves_input() {
        let inputs = [
            "https://example.com",
            "https://example.com/a?b=c&d=e#frag",
            "http://sub.example.co.uk:8080/über/страница",
            "a",
            "ab",
            "abc",
            "~~~???>>>",
        ];
        for input in inputs {
            let token = encode(input);
            assert!(!token.contains('/'), "token for {input} contains '/'");
            assert!(!token.contains('+'), "token for {input} contains '+'");
            assert!(!token.contains('='), "token for {input} contains '='");
            assert_eq!(decode(&token).unwrap(), input);
        }
    }

    #[test]
    fn test_substituted_characters_are_produced() {
        // 0xfb 0xff encodes to "+/8=" in standard base64
        let token = encode("\u{00fb}\u{00ff}?>");
        assert!(token.contains('-') || token.contains('_'));
        assert_eq!(decode(&token).unwrap(), "\u{00fb}\u{00ff}?>");
    }

    #[test]
    fn test_decode_is_deterministic_across_calls() {
        assert_eq!(encode("https://example.com"), encode("https://example.com"));
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert_eq!(decode(""), Err(DecodeError::Empty));
        assert!(matches!(decode("a"), Err(DecodeError::Base64(_))));
        assert!(matches!(decode("!!!!"), Err(DecodeError::Base64(_))));
        // "/w" decodes to the single byte 0xff, which is not UTF-8
        assert_eq!(decode("_w"), Err(DecodeError::Utf8));
    }
}
