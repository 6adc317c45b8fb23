use clap::{Parser, Subcommand};
use reqwest::{header::LOCATION, redirect};
use serde_json::{json, Value};

use editor_proxy::codec;

#[derive(Parser)]
#[command(name = "editor-proxy-cli")]
#[command(about = "Command-line client for the editor proxy", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[arg(short, long, default_value = "/proxy")]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show service status and effective configuration
    Status,
    /// Mint a fresh session
    Session,
    /// Start an editing session for a site and print its proxy URL
    Launch { target: String },
    /// Encode a URL into a path-safe token
    Encode { target: String },
    /// Decode a path-safe token back into a URL
    Decode { token: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let base = format!("{}{}", cli.url.trim_end_matches('/'), cli.prefix.trim_end_matches('/'));

    match cli.command {
        Commands::Status => {
            let res = reqwest::get(format!("{base}/status")).await?;
            print_response(res).await?;
        }
        Commands::Session => {
            let res = reqwest::get(format!("{base}/session")).await?;
            print_response(res).await?;
        }
        Commands::Launch { target } => {
            let client = reqwest::Client::builder().redirect(redirect::Policy::none()).build()?;
            let res = client
                .post(format!("{base}/launch"))
                .json(&json!({ "url": target }))
                .send()
                .await?;
            match res.headers().get(LOCATION).and_then(|v| v.to_str().ok()) {
                Some(location) if res.status().is_redirection() => {
                    println!("{}{}", cli.url.trim_end_matches('/'), location);
                }
                _ => print_response(res).await?,
            }
        }
        Commands::Encode { target } => println!("{}", codec::encode(&target)),
        Commands::Decode { token } => println!("{}", codec::decode(&token)?),
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: editor proxy returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
