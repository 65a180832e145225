use anyhow::{anyhow, Context, Result};
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use hi5_server::clients::SearchClient;
use hi5_server::domain::{help_text, Business, Command, SearchQuery};

use crate::config::Config;
use crate::output::{self, Format};

#[derive(Args)]
pub struct SearchArgs {
    /// Command text, e.g. "category=pizza&location=los angeles,ca&radius=10"
    pub text: String,
}

#[derive(Debug, Serialize, Tabled)]
pub struct BusinessRow {
    #[tabled(rename = "#")]
    pub rank: usize,
    pub name: String,
    #[tabled(display_with = "display_option")]
    pub price: Option<String>,
    #[tabled(display_with = "display_rating")]
    pub rating: f32,
    pub reviews: u32,
    pub address: String,
    pub url: String,
}

fn display_option(o: &Option<String>) -> String {
    o.clone().unwrap_or_else(|| "-".into())
}

fn display_rating(r: &f32) -> String {
    format!("{:.1}", r)
}

impl BusinessRow {
    fn new(rank: usize, b: Business) -> Self {
        Self {
            rank,
            address: b.address(),
            name: b.name,
            price: b.price,
            rating: b.rating,
            reviews: b.review_count,
            url: b.url,
        }
    }
}

/// `None` means the text asked for help, which has already been printed.
fn parse_query(text: &str) -> Result<Option<SearchQuery>> {
    match Command::parse(text) {
        Ok(Command::Help) => {
            println!("{}", help_text());
            Ok(None)
        }
        Ok(Command::Search(query)) => Ok(Some(query)),
        Err(e) => Err(anyhow!(e)),
    }
}

pub async fn run(args: SearchArgs, config: &Config, format: Format) -> Result<()> {
    let Some(query) = parse_query(&args.text)? else {
        return Ok(());
    };

    let api_key = config
        .api_key
        .as_deref()
        .context("search api key not set; run `hi5 config set --api-key <key>`")?;
    let client = SearchClient::new(reqwest::Client::new(), &config.search_api_base, api_key);

    let businesses = client.search(&query).await?;
    let rows = businesses
        .into_iter()
        .enumerate()
        .map(|(i, b)| BusinessRow::new(i + 1, b))
        .collect();

    output::print_items(rows, format);
    Ok(())
}
