use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use thordata_node::app::App;
use thordata_node::config::{timeout_from_millis, NodeConfig};
use thordata_node::credentials::ThordataCredentials;
use thordata_node::errors::NodeError;
use thordata_node::host::catalog::{credential_descriptor, node_descriptor};
use thordata_node::host::server::{self, ExecuteRequest};

#[derive(Debug, Parser)]
#[command(name = "thordata-node", version, about = "Thordata search and scraping node")]
struct Cli {
    /// Emit `{error}` records for failed items instead of aborting.
    #[arg(long, global = true)]
    continue_on_fail: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the JSON-RPC host protocol on stdin/stdout (default).
    Serve,
    /// Print the node and credential descriptors.
    Describe,
    /// Execute one batch read from a JSON file ("-" for stdin).
    Run {
        #[arg(long)]
        input: PathBuf,
    },
}

fn build_config(cli: &Cli) -> Result<NodeConfig, NodeError> {
    let mut config = NodeConfig::from_env()?;
    if cli.continue_on_fail {
        config = config.with_continue_on_fail(true);
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(timeout_from_millis("--timeout-ms", ms)?);
    }
    Ok(config)
}

async fn read_input(path: &Path) -> Result<String, NodeError> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut raw).await?;
        return Ok(raw);
    }
    Ok(tokio::fs::read_to_string(path).await?)
}

async fn run_batch(config: NodeConfig, input: &Path) -> Result<serde_json::Value, NodeError> {
    let raw = read_input(input).await?;
    let request = ExecuteRequest::from_value(serde_json::from_str(&raw)?)?;
    let credentials = ThordataCredentials::resolve(request.credentials.as_ref())?;
    let app = App::initialize(config)?;
    let records = app
        .execute(&request.items, &credentials, request.continue_on_fail)
        .await?;
    Ok(serde_json::json!({ "items": records }))
}

async fn run(cli: Cli) -> Result<(), NodeError> {
    let config = build_config(&cli)?;
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => server::run_stdio(config).await,
        Command::Describe => {
            let descriptor = serde_json::json!({
                "node": node_descriptor(),
                "credentials": credential_descriptor(),
            });
            println!("{}", serde_json::to_string_pretty(&descriptor)?);
            Ok(())
        }
        Command::Run { input } => {
            let output = run_batch(config, &input).await?;
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        let rendered = serde_json::to_string(&err).unwrap_or_else(|_| err.message.clone());
        eprintln!("thordata-node: {}", rendered);
        std::process::exit(1);
    }
}
