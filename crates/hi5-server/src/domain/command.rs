use thiserror::Error;

use super::form::{FormFields, InvalidEscape};

pub const DEFAULT_RADIUS_MILES: f64 = 5.0;
pub const MAX_RADIUS_MILES: f64 = 24.0;

const MILES_PER_METER: f64 = 0.00062137;

/// User-facing parse failures. The display text is shown verbatim in chat.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Maximum radius is 24 miles.")]
    RadiusTooLarge,

    #[error("You must specify a location.")]
    MissingLocation,

    #[error("You must specify a category.")]
    MissingCategory,

    #[error("{0}")]
    Malformed(#[from] InvalidEscape),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Search(SearchQuery),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Lower-cased; internal whitespace is kept as typed.
    pub category: String,
    pub location: String,
    pub term: Option<String>,
    /// Search radius in meters. Negative input is passed through as typed.
    pub radius: i32,
}

impl Command {
    /// Parses the text typed after the slash command:
    ///
    /// ```text
    /// category=<value>&location=<city,state|zip>[&term=<value>][&radius=<miles>]
    /// ```
    ///
    /// or the single word `help`.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let text = text.trim();
        if text.eq_ignore_ascii_case("help") {
            return Ok(Self::Help);
        }

        let fields = FormFields::parse(text.as_bytes())?;

        let miles = fields
            .get("radius")
            .and_then(|r| r.parse::<f64>().ok())
            .filter(|m| !m.is_nan())
            .unwrap_or(DEFAULT_RADIUS_MILES);
        if miles > MAX_RADIUS_MILES {
            return Err(ParseError::RadiusTooLarge);
        }

        let location = fields
            .non_empty("location")
            .ok_or(ParseError::MissingLocation)?;
        let category = fields
            .non_empty("category")
            .ok_or(ParseError::MissingCategory)?;

        Ok(Self::Search(SearchQuery {
            category: category.to_lowercase(),
            location: location.to_string(),
            term: fields.non_empty("term").map(str::to_string),
            radius: miles_to_meters(miles),
        }))
    }
}

/// Truncates toward zero.
pub fn miles_to_meters(miles: f64) -> i32 {
    (miles / MILES_PER_METER) as i32
}
