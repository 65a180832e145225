use thiserror::Error;

use super::form::{FormFields, InvalidEscape};

/// The webhook body could not be decoded. Bytes that are not valid UTF-8 are
/// not an error; they decode to U+FFFD.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed form body: {0}")]
    Form(#[from] InvalidEscape),
}

/// A slash-command invocation as delivered in the webhook body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlashCommand {
    pub token: String,
    pub response_url: String,
    pub user_name: String,
    pub text: String,
}

impl SlashCommand {
    /// Decodes a form-encoded webhook body. Fields the platform left out come
    /// back as empty strings.
    pub fn decode(body: &[u8]) -> Result<Self, DecodeError> {
        let fields = FormFields::parse(body)?;
        let field = |key: &str| fields.get(key).unwrap_or_default().to_string();

        Ok(Self {
            token: field("token"),
            response_url: field("response_url"),
            user_name: field("user_name"),
            text: field("text"),
        })
    }
}
