//! Odd Jobs' daemon pattern, retargeted: `jermd` owns the control socket and
//! dispatches decoded RPC requests onto a [`jm_engine::PipelineStore`].

use jm_core::{AgentPool, ConfigStore};
use jm_daemon::{base_dir, socket_path, Listener};
use jm_engine::PipelineStore;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("jermd {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" => {
                println!("jermd {}", env!("CARGO_PKG_VERSION"));
                println!("Control-socket daemon for jerminal. Launched by the `jerminal` CLI.");
                return Ok(());
            }
            other => {
                eprintln!("error: unexpected argument '{other}'");
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let base = base_dir();
    let secret = std::env::var("JERMINAL_SECRET").unwrap_or_default();
    let config_path = ConfigStore::bootstrap(&base, &secret)?;
    let config_store = ConfigStore::load(&config_path)?;
    let config = config_store.snapshot();

    info!(base = %base.display(), "jermd starting up");

    let pool = Arc::new(AgentPool::new(config.agent_dir.clone()));
    let store = PipelineStore::new(pool, config);

    let path = socket_path();
    if path.exists() {
        std::fs::remove_file(&path)?;
    }
    let listener = UnixListener::bind(&path)?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o666))?;

    info!(socket = %path.display(), "listening");
    println!("READY");

    let server = Listener::new(listener, store);
    let serve = tokio::spawn(server.run());

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;
    tokio::select! {
        _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
        _ = sigint.recv() => info!("received SIGINT, shutting down"),
    }

    serve.abort();
    let _ = std::fs::remove_file(&path);
    Ok(())
}
