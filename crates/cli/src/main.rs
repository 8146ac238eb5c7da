//! jerminal - control-channel client for the `jermd` daemon.

mod client;

use clap::{Parser, Subcommand};
use client::DaemonClient;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "jerminal", version, about = "Control client for the jermd pipeline daemon")]
struct Cli {
    /// Override the control socket path (defaults to $JERMINAL_SOCKET_PATH or
    /// /tmp/pipeline-control.sock)
    #[arg(long, global = true)]
    socket: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch a named pipeline template
    Launch {
        name: String,
    },
    /// Cancel an in-flight pipeline run
    Cancel {
        id: String,
        #[arg(long)]
        secret: String,
    },
    /// List known pipeline templates and/or active runs
    List {
        #[arg(long)]
        active: bool,
        #[arg(long)]
        all: bool,
        #[arg(long)]
        id: Option<String>,
    },
    /// Fetch saved reports for a pipeline
    Reports {
        name: String,
        #[arg(long)]
        id: Option<String>,
        #[arg(long, value_delimiter = ',')]
        fields: Vec<String>,
        #[arg(long, value_delimiter = ',')]
        omit: Vec<String>,
    },
}

fn socket_path(cli: &Cli) -> PathBuf {
    cli.socket.clone().unwrap_or_else(jm_daemon_socket_default)
}

fn jm_daemon_socket_default() -> PathBuf {
    std::env::var("JERMINAL_SOCKET_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp/pipeline-control.sock"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = DaemonClient::new(socket_path(&cli));

    let result = match &cli.command {
        Commands::Launch { name } => client.call("launch-pipeline", serde_json::json!({ "name": name })).await?,
        Commands::Cancel { id, secret } => {
            client
                .call("cancel-pipeline", serde_json::json!({ "pipeline_id": id, "secret": secret }))
                .await?
        }
        Commands::List { active, all, id } => {
            let mut value = client.call("list-pipelines", serde_json::json!({ "active_only": *active && !all })).await?;
            if let Some(wanted) = id {
                if let Some(active_list) = value.get_mut("active").and_then(|v| v.as_array_mut()) {
                    active_list.retain(|entry| entry.get("id").and_then(|v| v.as_str()) == Some(wanted.as_str()));
                }
            }
            value
        }
        Commands::Reports { name, id, fields, omit } => {
            client
                .call(
                    "get-reports",
                    serde_json::json!({
                        "pipeline_name": name,
                        "pipeline_id": id,
                        "fields": fields,
                        "omitted_fields": omit,
                    }),
                )
                .await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
