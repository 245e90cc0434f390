//! Daemon module for the Pomodoro session timer.
//!
//! This module contains the core daemon functionality:
//! - `timer`: Timer engine owning the session and its countdown
//! - `ipc`: Unix socket server and request dispatch

pub mod ipc;
pub mod timer;

pub use ipc::{IpcError, IpcServer, RequestHandler};
pub use timer::{SessionHandle, TimerEngine, TimerEvent};

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::UnixStream;
use tokio::sync::mpsc;

use crate::auth::{AuthProvider, LocalAuth};
use crate::config::AppConfig;
use crate::store::{JsonSessionStore, SessionStore};
use crate::types::IpcResponse;

/// Runs the daemon until Ctrl-C.
pub async fn run(config: AppConfig) -> Result<()> {
    let store = Arc::new(JsonSessionStore::new(config.sessions_path()));
    let auth = Arc::new(
        LocalAuth::open(&config.home)
            .await
            .context("Failed to load account data")?,
    );

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (handle, engine_task) = TimerEngine::spawn(event_tx);
    let logger_task = tokio::spawn(log_events(event_rx));

    let handler = RequestHandler::new(handle, store, auth, config.defaults);
    let server = IpcServer::new(&config.socket_path)?;
    tracing::info!(socket = ?server.socket_path(), "daemon listening");

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            result = &mut shutdown => {
                if let Err(e) = result {
                    tracing::error!("failed to listen for shutdown signal: {}", e);
                }
                tracing::info!("shutting down");
                break;
            }
            accepted = server.accept() => match accepted {
                Ok(mut stream) => serve_connection(&handler, &mut stream).await,
                Err(e) => tracing::warn!("{:#}", e),
            },
        }
    }

    // Dropping the last handle stops the engine, which closes the event stream.
    drop(handler);
    engine_task.await.context("Timer engine panicked")?;
    logger_task.await.context("Event logger panicked")?;
    Ok(())
}

/// Answers one request on `stream`.
pub async fn serve_connection<S, A>(handler: &RequestHandler<S, A>, stream: &mut UnixStream)
where
    S: SessionStore,
    A: AuthProvider,
{
    let response = match IpcServer::receive_request(stream).await {
        Ok(request) => handler.handle(request).await,
        Err(e) => {
            tracing::warn!("rejected request: {:#}", e);
            IpcResponse::error(format!("Invalid request: {e}"))
        }
    };

    if let Err(e) = IpcServer::send_response(stream, &response).await {
        tracing::warn!("failed to send response: {:#}", e);
    }
}

async fn log_events(mut events: mpsc::UnboundedReceiver<TimerEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            TimerEvent::Tick { remaining_seconds } => {
                tracing::debug!(remaining_seconds, "tick");
            }
            TimerEvent::ActivityCompleted(completion) => {
                tracing::info!(
                    activity = %completion.activity,
                    counted = completion.counted,
                    "activity finished"
                );
            }
            other => tracing::info!(event = ?other, "timer event"),
        }
    }
}
