//! Administrative control listener
//!
//! A line-oriented TCP protocol for driving a running crawl: adding seeds,
//! querying the index, reading snippets and requesting shutdown. Each
//! connection is served on its own tokio task; index and storage work runs on
//! the blocking pool.

mod command;

pub use command::{execute, Command, END_MARKER};

use crate::crawler::Coordinator;
use crate::CrawldexError;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::time::Duration;

/// Pause after a failed accept, so a persistent error does not spin
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Control protocol errors
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("empty command")]
    EmptyCommand,

    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("{0} requires an argument")]
    MissingArgument(&'static str),

    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("command task failed: {0}")]
    Join(String),
}

/// Control listener bound to its address
pub struct ControlServer {
    listener: TcpListener,
    coordinator: Coordinator,
}

impl ControlServer {
    /// Binds the control listener
    ///
    /// Failing to bind is a startup error.
    pub async fn bind(addr: &str, coordinator: Coordinator) -> Result<Self, CrawldexError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| CrawldexError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        tracing::info!("Control listener on {}", addr);
        Ok(Self {
            listener,
            coordinator,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves connections until a client sends `SHUTDOWN`
    pub async fn run(self) -> Result<(), CrawldexError> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(e) => {
                            tracing::warn!("Failed to accept control connection: {}", e);
                            tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                            continue;
                        }
                    };
                    tracing::debug!("Control connection from {}", peer);

                    let coordinator = self.coordinator.clone();
                    let shutdown_tx = shutdown_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(stream, coordinator, shutdown_tx).await {
                            tracing::warn!("Control connection from {} failed: {}", peer, e);
                        }
                    });
                }
                changed = shutdown_rx.changed() => {
                    if changed.is_err() || *shutdown_rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Control listener shutting down");
        Ok(())
    }
}

/// Serves one connection until the client leaves or shutdown is requested
///
/// Shutdown requested on any connection ends every open one, so no command
/// runs against a crawl that is draining.
async fn serve_connection(
    stream: TcpStream,
    coordinator: Coordinator,
    shutdown: watch::Sender<bool>,
) -> Result<(), ControlError> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();
    let mut shutdown_rx = shutdown.subscribe();

    loop {
        if *shutdown_rx.borrow_and_update() {
            break;
        }
        let line = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => line,
                None => break,
            },
            _ = shutdown_rx.changed() => continue,
        };

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(ControlError::EmptyCommand) => continue,
            Err(e) => {
                writer.write_all(format!("ERR {}\n", e).as_bytes()).await?;
                continue;
            }
        };
        tracing::debug!("Control command: {:?}", command);

        let response = {
            let coordinator = coordinator.clone();
            let command = command.clone();
            tokio::task::spawn_blocking(move || execute(&coordinator, &command))
                .await
                .map_err(|e| ControlError::Join(e.to_string()))?
        };

        for line in response {
            writer.write_all(line.as_bytes()).await?;
            writer.write_all(b"\n").await?;
        }
        writer.flush().await?;

        if command == Command::Shutdown {
            let _ = shutdown.send(true);
            break;
        }
    }

    Ok(())
}
