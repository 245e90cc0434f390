//! IPC Client for communicating with the Pomodoro session daemon.
//!
//! This module provides:
//! - Unix Domain Socket client
//! - Request/response handling
//! - Connection retry logic
//! - Timeout handling

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::timeout;

use crate::cli::commands::InitArgs;
use crate::config::AppConfig;
use crate::types::{InitParams, IpcRequest, IpcResponse};

// ============================================================================
// Constants
// ============================================================================

/// Connection timeout in seconds
const CONNECTION_TIMEOUT_SECS: u64 = 5;

/// Read/write timeout in seconds
const IO_TIMEOUT_SECS: u64 = 5;

/// Maximum response size in bytes (1MB, session lists can be long)
const MAX_RESPONSE_SIZE: usize = 1024 * 1024;

/// Maximum retry attempts
const MAX_RETRIES: u32 = 3;

/// Retry delay in milliseconds (base delay, multiplied by attempt number)
const RETRY_DELAY_MS: u64 = 500;

// ============================================================================
// IpcClient
// ============================================================================

/// IPC client for daemon communication.
pub struct IpcClient {
    /// Socket path
    socket_path: PathBuf,
    /// Connection timeout
    timeout: Duration,
}

impl IpcClient {
    /// Creates a new IPC client for the configured socket path.
    pub fn new() -> Result<Self> {
        let config = AppConfig::load().context("Failed to load configuration")?;
        Ok(Self::with_socket_path(config.socket_path))
    }

    /// Creates a new IPC client with a custom socket path.
    pub fn with_socket_path(socket_path: PathBuf) -> Self {
        Self {
            socket_path,
            timeout: Duration::from_secs(CONNECTION_TIMEOUT_SECS),
        }
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &PathBuf {
        &self.socket_path
    }

    /// Sends an init command to the daemon.
    pub async fn init(&self, args: &InitArgs) -> Result<IpcResponse> {
        let params = InitParams {
            name: args.name.clone(),
            pomodoro_minutes: args.pomodoro,
            short_break_minutes: args.short_break,
            long_break_minutes: args.long_break,
        };

        self.send_request_with_retry(&IpcRequest::Init { params })
            .await
    }

    pub async fn start(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Start).await
    }

    pub async fn pause(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Pause).await
    }

    pub async fn resume(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Resume).await
    }

    pub async fn skip(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Skip).await
    }

    pub async fn cycle(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Cycle).await
    }

    pub async fn status(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Status).await
    }

    pub async fn save(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Save).await
    }

    pub async fn discard(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Discard).await
    }

    pub async fn sessions(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Sessions).await
    }

    pub async fn show(&self, id: &str) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Show { id: id.to_string() })
            .await
    }

    pub async fn dashboard(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Dashboard).await
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<IpcResponse> {
        let request = IpcRequest::Register {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send_request_with_retry(&request).await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<IpcResponse> {
        let request = IpcRequest::Login {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.send_request_with_retry(&request).await
    }

    pub async fn logout(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Logout).await
    }

    pub async fn whoami(&self) -> Result<IpcResponse> {
        self.send_request_with_retry(&IpcRequest::Whoami).await
    }

    /// Sends a request to the daemon with retry logic.
    ///
    /// Only the connect step is retried. Once a connection is open the
    /// request is written exactly once, so a command the daemon may already
    /// have applied is never sent again. An error response from the daemon
    /// is returned as `Err`.
    async fn send_request_with_retry(&self, request: &IpcRequest) -> Result<IpcResponse> {
        let mut stream = self.connect_with_retry().await?;
        let response = self.send_request(&mut stream, request).await?;

        if !response.is_success() {
            anyhow::bail!("{}", response.message);
        }

        Ok(response)
    }

    /// Connects to the daemon socket, retrying with a growing delay.
    async fn connect_with_retry(&self) -> Result<UnixStream> {
        let mut attempt = 1;

        loop {
            match self.connect().await {
                Ok(stream) => return Ok(stream),
                Err(e) if attempt < MAX_RETRIES => {
                    tracing::warn!("Connect failed (attempt {}/{}): {:#}", attempt, MAX_RETRIES, e);
                    let delay = Duration::from_millis(RETRY_DELAY_MS * u64::from(attempt));
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!("Connect failed (attempt {}/{}): {:#}", attempt, MAX_RETRIES, e);
                    return Err(e);
                }
            }
        }
    }

    async fn connect(&self) -> Result<UnixStream> {
        timeout(self.timeout, UnixStream::connect(&self.socket_path))
            .await
            .context("Connection timed out")?
            .context("Cannot connect to the daemon. Start it with 'pomodoro daemon'")
    }

    /// Writes one request on an open connection and reads the response.
    async fn send_request(
        &self,
        stream: &mut UnixStream,
        request: &IpcRequest,
    ) -> Result<IpcResponse> {
        let request_json =
            serde_json::to_vec(request).context("Failed to serialize request")?;

        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            stream.write_all(&request_json),
        )
        .await
        .context("Write timed out")?
        .context("Failed to send request")?;

        timeout(Duration::from_secs(IO_TIMEOUT_SECS), stream.flush())
            .await
            .context("Flush timed out")?
            .context("Failed to flush request")?;

        // Shutdown write side to signal end of request
        stream
            .shutdown()
            .await
            .context("Failed to close request stream")?;

        let mut buffer = Vec::new();
        let mut limited = stream.take(MAX_RESPONSE_SIZE as u64 + 1);
        timeout(
            Duration::from_secs(IO_TIMEOUT_SECS),
            limited.read_to_end(&mut buffer),
        )
        .await
        .context("Read timed out")?
        .context("Failed to receive response")?;

        if buffer.is_empty() {
            anyhow::bail!("The daemon closed the connection without responding");
        }
        if buffer.len() > MAX_RESPONSE_SIZE {
            anyhow::bail!("Response too large (max {} bytes)", MAX_RESPONSE_SIZE);
        }

        let response: IpcResponse =
            serde_json::from_slice(&buffer).context("Failed to parse response")?;

        Ok(response)
    }
}

// ============================================================================
// Tests
// ============================================================================
