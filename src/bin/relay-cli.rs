use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Command-line client for the disposable-email relay", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Bearer token for message operations.
    #[arg(short, long, env = "RELAY_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check relay status
    Health,
    /// List domains offered by the provider
    Domains,
    /// Create a mailbox on a domain
    CreateAccount { domain: String },
    /// Exchange address and password for a token
    Authenticate { address: String, password: String },
    /// List messages in the mailbox
    Messages {
        /// Mailbox identifier, for providers that address mailboxes by hash
        #[arg(long)]
        mailbox: Option<String>,
    },
    /// Show one message
    Message { id: String },
    /// Delete one message
    Delete { id: String },
    /// List attachments of a message
    Attachments { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    let res = match cli.command {
        Commands::Health => client.get(format!("{}/health", base)).send().await?,
        Commands::Domains => client.get(format!("{}/domains", base)).send().await?,
        Commands::CreateAccount { domain } => {
            client
                .post(format!("{}/create-account", base))
                .json(&json!({ "domain": domain }))
                .send()
                .await?
        }
        Commands::Authenticate { address, password } => {
            client
                .post(format!("{}/authenticate", base))
                .json(&json!({ "address": address, "password": password }))
                .send()
                .await?
        }
        Commands::Messages { mailbox } => {
            client
                .post(format!("{}/fetch-messages", base))
                .headers(headers)
                .json(&json!({ "mailbox": mailbox }))
                .send()
                .await?
        }
        Commands::Message { id } => {
            client
                .get(format!("{}/messages/{}", base, id))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Delete { id } => {
            client
                .delete(format!("{}/messages/{}", base, id))
                .headers(headers)
                .send()
                .await?
        }
        Commands::Attachments { id } => {
            client
                .get(format!("{}/messages/{}/attachments", base, id))
                .headers(headers)
                .send()
                .await?
        }
    };

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    let rendered = match serde_json::from_str::<Value>(&text) {
        Ok(json) => serde_json::to_string_pretty(&json)?,
        Err(_) => text,
    };

    if status.is_success() {
        println!("{}", rendered);
    } else {
        eprintln!("Error: relay returned status {}", status);
        eprintln!("{}", rendered);
    }
    Ok(())
}
