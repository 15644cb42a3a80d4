mod config;
mod error;

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use client::{
    BrowserType, CrawlWebsiteArgs, GetGoogleAiSummaryArgs, GoogleSearchArgs, McpClient,
    RequestOptions, ScrapeLawPageArgs, ServerInformation,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "mcpc.toml";

#[derive(Parser)]
#[command(name = "mcpc")]
#[command(about = "Command-line client for MCP tool servers", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./mcpc.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Server endpoint, overrides the config file
    #[arg(long, global = true)]
    url: Option<String>,

    /// Per-call timeout in milliseconds
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what the server reported during the handshake
    Info,
    /// List the tools the server offers
    Tools,
    /// Call any tool with raw JSON arguments
    Call {
        name: String,
        /// Arguments as a JSON object
        #[arg(long)]
        args: Option<String>,
    },
    /// Run a Google search and scrape the hits
    Search {
        query: String,
        #[arg(long)]
        pages: Option<u32>,
        #[arg(long)]
        parallel: Option<u32>,
        /// Show the browser window
        #[arg(long)]
        headful: bool,
    },
    /// Fetch Google's AI summary for a query
    AiSummary {
        query: String,
        #[arg(long)]
        wait_seconds: Option<u32>,
    },
    /// Crawl a website following links that match a selector
    Crawl {
        url: String,
        #[arg(long, default_value = "a[href]")]
        selector: String,
        #[arg(long)]
        max_depth: Option<u32>,
        #[arg(long)]
        ignore_robots_txt: bool,
    },
    /// Find a keyword on a statute page
    Law {
        url: String,
        keyword: String,
        #[arg(long, value_enum)]
        browser: Option<Browser>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Browser {
    Chromium,
    Firefox,
    Webkit,
}

impl From<Browser> for BrowserType {
    fn from(browser: Browser) -> Self {
        match browser {
            Browser::Chromium => BrowserType::Chromium,
            Browser::Firefox => BrowserType::Firefox,
            Browser::Webkit => BrowserType::Webkit,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        let mut source = std::error::Error::source(&e);
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    let mut client = config.into_builder(cli.url, cli.timeout_ms).build()?;

    let outcome = match client.connect().await {
        Ok(info) => execute(&client, &info, cli.command).await,
        Err(e) => Err(e.into()),
    };
    client.close().await;
    outcome
}

async fn execute(client: &McpClient, info: &ServerInformation, command: Commands) -> Result<()> {
    let options = RequestOptions::default();

    match command {
        Commands::Info => print_info(info),
        Commands::Tools => {
            let tools = client.list_tools(options).await?;
            if tools.is_empty() {
                println!("No tools offered.");
            }
            for tool in tools {
                match tool.description {
                    Some(description) => println!("{:<24}  {description}", tool.name),
                    None => println!("{}", tool.name),
                }
            }
            Ok(())
        }
        Commands::Call { name, args } => {
            let arguments = parse_args(args.as_deref())?;
            let outcome = client.call_tool_raw(&name, &arguments, None, options).await?;
            for item in &outcome.content {
                match item.as_text() {
                    Some(text) => println!("{text}"),
                    None => print_json(item)?,
                }
            }
            Ok(())
        }
        Commands::Search {
            query,
            pages,
            parallel,
            headful,
        } => {
            let args = GoogleSearchArgs {
                search_pages: pages,
                parallel,
                headless_mode: headful.then_some(false),
                ..GoogleSearchArgs::new(query)
            };
            print_json(&client.google_search(&args, options).await?)
        }
        Commands::AiSummary {
            query,
            wait_seconds,
        } => {
            let args = GetGoogleAiSummaryArgs {
                wait_seconds,
                ..GetGoogleAiSummaryArgs::new(query)
            };
            print_json(&client.get_google_ai_summary(&args, options).await?)
        }
        Commands::Crawl {
            url,
            selector,
            max_depth,
            ignore_robots_txt,
        } => {
            let args = CrawlWebsiteArgs {
                max_depth,
                ignore_robots_txt: ignore_robots_txt.then_some(true),
                ..CrawlWebsiteArgs::new(url, selector)
            };
            print_json(&client.crawl_website(&args, options).await?)
        }
        Commands::Law {
            url,
            keyword,
            browser,
        } => {
            let args = ScrapeLawPageArgs {
                browser_type: browser.map(BrowserType::from),
                ..ScrapeLawPageArgs::new(url, keyword)
            };
            print_json(&client.scrape_law_page(&args, options).await?)
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None if Path::new(CONFIG_FILE).exists() => Ok(Config::load(CONFIG_FILE)?),
        None => Ok(Config::default()),
    }
}

fn parse_args(raw: Option<&str>) -> Result<Map<String, Value>> {
    let Some(raw) = raw else {
        return Ok(Map::new());
    };
    match serde_json::from_str(raw)? {
        Value::Object(map) => Ok(map),
        other => Err(Error::InvalidArgs(format!("expected a JSON object, got {other}"))),
    }
}

fn print_info(info: &ServerInformation) -> Result<()> {
    let server = &info.server_info;
    println!("Server:   {} {}", server.name, server.version);
    if let Some(version) = &info.protocol_version {
        println!("Protocol: {version}");
    }
    if let Some(instructions) = &info.instructions {
        println!("Instructions: {instructions}");
    }
    println!("Capabilities:");
    print_json(&info.capabilities)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)?;
    Ok(())
}
