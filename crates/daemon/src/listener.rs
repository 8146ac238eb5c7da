//! Accept loop for the control socket: one spawned task per connection,
//! each decoding a single framed request, dispatching it, and writing back
//! the framed response.

use crate::dispatch::dispatch;
use jm_engine::PipelineStore;
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info, warn};

pub struct Listener {
    socket: UnixListener,
    store: PipelineStore,
}

impl Listener {
    pub fn new(socket: UnixListener, store: PipelineStore) -> Self {
        Self { socket, store }
    }

    /// Runs until the socket itself errors out (the process is shutting
    /// down and the listener is about to be dropped).
    pub async fn run(self) {
        loop {
            match self.socket.accept().await {
                Ok((stream, _addr)) => {
                    let store = self.store.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &store).await {
                            match e {
                                ConnectionError::Framing(jm_wire::FramingError::ConnectionClosed) => {
                                    debug!("client disconnected");
                                }
                                other => warn!("connection error: {other}"),
                            }
                        }
                    });
                }
                Err(e) => {
                    error!("accept error: {e}");
                }
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ConnectionError {
    #[error(transparent)]
    Framing(#[from] jm_wire::FramingError),
    #[error("malformed request: {0}")]
    Decode(#[from] serde_json::Error),
}

async fn handle_connection(stream: UnixStream, store: &PipelineStore) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();
    let payload = jm_wire::read_message(&mut reader).await?;
    let request: jm_wire::Request = serde_json::from_slice(&payload)?;
    info!(method = %request.method, id = request.id, "dispatching request");

    let response = dispatch(request, store).await;
    let encoded = serde_json::to_vec(&response)?;
    jm_wire::write_message(&mut writer, &encoded).await?;
    Ok(())
}

#[cfg(test)]
#[path = "listener_tests.rs"]
mod tests;
