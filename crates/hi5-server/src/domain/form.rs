use thiserror::Error;
use url::form_urlencoded;

/// A `%` that does not start a two-digit hex escape.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid URL escape {escape:?}")]
pub struct InvalidEscape {
    pub offset: usize,
    /// The `%` and up to two bytes after it.
    pub escape: String,
}

/// Decoded `application/x-www-form-urlencoded` pairs in their original order.
#[derive(Debug, Default)]
pub struct FormFields(Vec<(String, String)>);

impl FormFields {
    /// Rejects malformed escapes; bytes that are not valid UTF-8 after
    /// decoding are replaced with U+FFFD.
    pub fn parse(input: &[u8]) -> Result<Self, InvalidEscape> {
        if let Some(err) = find_invalid_escape(input) {
            return Err(err);
        }
        Ok(Self(form_urlencoded::parse(input).into_owned().collect()))
    }

    /// Returns the first value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like [`FormFields::get`], treating an empty value as absent.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

fn find_invalid_escape(input: &[u8]) -> Option<InvalidEscape> {
    input.iter().enumerate().find_map(|(i, &b)| {
        let valid = input.get(i + 1).is_some_and(|c| c.is_ascii_hexdigit())
            && input.get(i + 2).is_some_and(|c| c.is_ascii_hexdigit());
        (b == b'%' && !valid).then(|| InvalidEscape {
            offset: i,
            escape: String::from_utf8_lossy(&input[i..(i + 3).min(input.len())]).into_owned(),
        })
    })
}
