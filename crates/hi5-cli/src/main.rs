mod client;
mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{invoke, search};

#[derive(Parser)]
#[command(name = "hi5")]
#[command(about = "hi5 CLI - Find top rated businesses and exercise the hi5 slash command")]
#[command(version)]
struct Cli {
    #[arg(long, global = true, help = "hi5 server URL")]
    server: Option<String>,

    #[arg(long, global = true, help = "Slash command token")]
    token: Option<String>,

    #[arg(long, global = true, help = "Search API key")]
    api_key: Option<String>,

    #[arg(long, global = true, help = "Output format", default_value = "table")]
    format: output::Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure CLI settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Query the search API directly with slash command text
    #[command(alias = "s")]
    Search(search::SearchArgs),
    /// Send a slash command to a running server
    Invoke(invoke::InvokeArgs),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Set configuration values
    Set {
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        token: Option<String>,
        #[arg(long)]
        api_key: Option<String>,
        #[arg(long)]
        search_api_base: Option<String>,
    },
    /// Show current configuration
    Show,
    /// Get config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut cfg = config::Config::load()?;

    if let Some(server) = &cli.server {
        cfg.server = server.clone();
    }
    if let Some(token) = &cli.token {
        cfg.token = Some(token.clone());
    }
    if let Some(api_key) = &cli.api_key {
        cfg.api_key = Some(api_key.clone());
    }

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Set {
                server,
                token,
                api_key,
                search_api_base,
            } => {
                if let Some(s) = server {
                    cfg.server = s;
                }
                if let Some(t) = token {
                    cfg.token = Some(t);
                }
                if let Some(k) = api_key {
                    cfg.api_key = Some(k);
                }
                if let Some(b) = search_api_base {
                    cfg.search_api_base = b;
                }
                cfg.save()?;
                output::print_success("Configuration saved");
            }
            ConfigCommands::Show => {
                println!("Server:      {}", cfg.server);
                println!("Search API:  {}", cfg.search_api_base);
                println!("Token:       {}", config::mask(&cfg.token));
                println!("API Key:     {}", config::mask(&cfg.api_key));
            }
            ConfigCommands::Path => {
                println!("{}", config::config_path()?.display());
            }
        },
        Commands::Search(args) => {
            search::run(args, &cfg, cli.format).await?;
        }
        Commands::Invoke(args) => {
            invoke::run(args, &cfg, cli.format).await?;
        }
    }

    Ok(())
}
