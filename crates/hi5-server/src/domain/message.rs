use serde::Serialize;

use super::{Business, SearchQuery};

pub const COMMAND_NAME: &str = "/hi5";

const CATEGORY_LIST_URL: &str =
    "https://www.yelp.com/developers/documentation/v3/all_category_list";
const IMAGE_ALT_TEXT: &str = "alt text";

/// A Block Kit message posted to a slash command's `response_url`.
#[derive(Debug, Clone, Serialize)]
pub struct MessagePayload {
    pub response_type: ResponseType,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    InChannel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Section {
        text: TextObject,
        #[serde(skip_serializing_if = "Option::is_none")]
        accessory: Option<Accessory>,
    },
    Divider,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TextObject {
    Mrkdwn { text: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Accessory {
    Image { image_url: String, alt_text: String },
}

impl Block {
    pub fn section(text: impl Into<String>) -> Self {
        Self::Section {
            text: TextObject::Mrkdwn { text: text.into() },
            accessory: None,
        }
    }

    pub fn section_with_image(text: impl Into<String>, image_url: impl Into<String>) -> Self {
        Self::Section {
            text: TextObject::Mrkdwn { text: text.into() },
            accessory: Some(Accessory::Image {
                image_url: image_url.into(),
                alt_text: IMAGE_ALT_TEXT.into(),
            }),
        }
    }
}

impl MessagePayload {
    pub fn in_channel(blocks: Vec<Block>) -> Self {
        Self {
            response_type: ResponseType::InChannel,
            blocks,
        }
    }

    pub fn not_found(query: &SearchQuery) -> Self {
        Self::in_channel(vec![Block::section(format!(
            "*Sorry we couldn't find any results for {} in {}. Try increasing your search radius*",
            query.category, query.location
        ))])
    }

    /// Header addressed to `user_name`, a divider, then one section per
    /// business in the order given.
    pub fn results(user_name: &str, query: &SearchQuery, businesses: &[Business]) -> Self {
        let mut header = format!("*Ok @{user_name} here's a Hi-5 for {}", query.category);
        if let Some(term) = &query.term {
            header.push_str(&format!(" and {term}"));
        }
        header.push_str(&format!(" near {}*", query.location));

        let mut blocks = Vec::with_capacity(businesses.len() + 2);
        blocks.push(Block::section(header));
        blocks.push(Block::Divider);
        blocks.extend(
            businesses
                .iter()
                .map(|b| Block::section_with_image(business_text(b), b.image_url.clone())),
        );

        Self::in_channel(blocks)
    }
}

fn business_text(b: &Business) -> String {
    format!(
        "*{} {}:* {:.1} ⭐ ({} reviews)\n{}\n\n{}",
        b.name,
        b.price.as_deref().unwrap_or_default(),
        b.rating,
        b.review_count,
        b.address(),
        b.url,
    )
}

pub fn help_text() -> String {
    let heading = format!(
        "*Hi5 helps you find the top 5 rated businesses in a specified category and location.*\n\
         You can find the list of supported categories here: {CATEGORY_LIST_URL}"
    );
    let usage = format!(
        "Usage: {COMMAND_NAME} category=<category>&location=<city,state|zip>&[options]

Options: key=value
term:   additional search term to narrow your category results
radius: radius in miles for the search area (maximum is 24)

Example: Find top 5 rated pizza places in Los Angeles that serve beer
{COMMAND_NAME} category=pizza&location=los angeles,ca&term=beer&radius=10
"
    );
    format!("{heading}\n\n```\n{usage}\n```")
}
