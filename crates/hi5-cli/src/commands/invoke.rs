use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::client::WebhookClient;
use crate::config::Config;
use crate::output::{self, Format};

#[derive(Args)]
pub struct InvokeArgs {
    /// Command text, exactly as typed after /hi5
    pub text: String,
    #[arg(long, default_value = "hi5-cli")]
    pub user_name: String,
    #[arg(long, default_value = "", help = "Callback URL the server publishes results to")]
    pub response_url: String,
}

#[derive(Serialize)]
struct InvokeOutput {
    status: u16,
    body: String,
}

pub async fn run(args: InvokeArgs, config: &Config, format: Format) -> Result<()> {
    let client = WebhookClient::new(config);
    let reply = client
        .invoke(&args.text, &args.user_name, &args.response_url)
        .await?;

    match format {
        Format::Json => output::print_json(&InvokeOutput {
            status: reply.status.as_u16(),
            body: reply.body,
        }),
        Format::Table => {
            if reply.status.is_success() {
                output::print_success(&format!("{}", reply.status));
            } else {
                output::print_error(&format!("{}", reply.status));
            }
            if reply.body.is_empty() {
                println!("(no inline reply; results go to the response url)");
            } else {
                println!("{}", reply.body);
            }
        }
    }

    Ok(())
}
