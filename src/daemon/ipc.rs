//! IPC Server for the Pomodoro session daemon.
//!
//! This module provides Unix Domain Socket IPC functionality:
//! - Server that listens on a Unix socket
//! - Request/response handling for session, history and account commands
//! - Dispatch to the `TimerEngine`, the session store and the auth provider

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::time::{timeout, Duration};

use crate::auth::{AuthError, AuthProvider};
use crate::session::{Session, SessionError};
use crate::stats::{sort_newest_first, DashboardStats};
use crate::store::SessionStore;
use crate::types::{InitParams, IpcRequest, IpcResponse, ResponseData, SessionConfig};

use super::timer::SessionHandle;

// ============================================================================
// Constants
// ============================================================================

/// Maximum request size in bytes (4KB)
const MAX_REQUEST_SIZE: usize = 4096;

/// Read timeout in seconds
const READ_TIMEOUT_SECS: u64 = 5;

/// Maximum length of a session name
const MAX_SESSION_NAME_LEN: usize = 100;

// ============================================================================
// IpcError
// ============================================================================

/// IPC-specific error types.
#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    /// Read error
    #[error("Failed to read request: {0}")]
    ReadError(String),

    /// Timeout error
    #[error("Operation timed out")]
    Timeout,

    /// Request too large
    #[error("Request too large (max {} bytes)", MAX_REQUEST_SIZE)]
    RequestTooLarge,

    /// The client closed the connection without sending anything
    #[error("Connection closed by client")]
    ConnectionClosed,
}

// ============================================================================
// IpcServer
// ============================================================================

/// Unix Domain Socket IPC server.
pub struct IpcServer {
    /// Unix socket listener
    listener: UnixListener,
    /// Socket path (for cleanup)
    socket_path: PathBuf,
}

impl IpcServer {
    /// Creates a new IPC server bound to the specified socket path.
    ///
    /// If the socket file already exists, it will be removed before binding.
    pub fn new(socket_path: &Path) -> Result<Self> {
        if socket_path.exists() {
            std::fs::remove_file(socket_path)
                .with_context(|| format!("Failed to remove existing socket: {:?}", socket_path))?;
        }

        if let Some(parent) = socket_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create socket directory: {:?}", parent))?;
        }

        let listener = UnixListener::bind(socket_path)
            .with_context(|| format!("Failed to bind Unix socket: {:?}", socket_path))?;

        Ok(Self {
            listener,
            socket_path: socket_path.to_path_buf(),
        })
    }

    /// Accepts an incoming client connection.
    pub async fn accept(&self) -> Result<UnixStream> {
        let (stream, _addr) = self
            .listener
            .accept()
            .await
            .context("Failed to accept connection")?;
        Ok(stream)
    }

    /// Reads one request (until the client half-closes) and deserializes it.
    ///
    /// Applies a read timeout to prevent blocking indefinitely.
    pub async fn receive_request(stream: &mut UnixStream) -> Result<IpcRequest> {
        let mut buffer = Vec::new();
        let mut limited = stream.take(MAX_REQUEST_SIZE as u64 + 1);

        match timeout(
            Duration::from_secs(READ_TIMEOUT_SECS),
            limited.read_to_end(&mut buffer),
        )
        .await
        {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => return Err(IpcError::ReadError(e.to_string()).into()),
            Err(_) => return Err(IpcError::Timeout.into()),
        }

        if buffer.is_empty() {
            return Err(IpcError::ConnectionClosed.into());
        }
        if buffer.len() > MAX_REQUEST_SIZE {
            return Err(IpcError::RequestTooLarge.into());
        }

        let request: IpcRequest =
            serde_json::from_slice(&buffer).context("Failed to deserialize IPC request")?;

        Ok(request)
    }

    /// Serializes and sends an IPC response to the stream.
    pub async fn send_response(stream: &mut UnixStream, response: &IpcResponse) -> Result<()> {
        let json = serde_json::to_vec(response).context("Failed to serialize IPC response")?;

        stream
            .write_all(&json)
            .await
            .context("Failed to write response")?;
        stream.flush().await.context("Failed to flush response")?;
        stream
            .shutdown()
            .await
            .context("Failed to close response stream")?;

        Ok(())
    }

    /// Returns the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

// ============================================================================
// RequestHandler
// ============================================================================

/// Handles IPC requests by dispatching to the engine, store and auth provider.
pub struct RequestHandler<S, A> {
    session: SessionHandle,
    store: Arc<S>,
    auth: Arc<A>,
    /// Lengths used when `init` omits them
    defaults: SessionConfig,
}

impl<S: SessionStore, A: AuthProvider> RequestHandler<S, A> {
    /// Creates a new request handler.
    pub fn new(session: SessionHandle, store: Arc<S>, auth: Arc<A>, defaults: SessionConfig) -> Self {
        Self {
            session,
            store,
            auth,
            defaults,
        }
    }

    /// Handles an IPC request and returns the appropriate response.
    pub async fn handle(&self, request: IpcRequest) -> IpcResponse {
        tracing::debug!(command = request.name(), "handling request");

        match request {
            IpcRequest::Init { params } => self.handle_init(params).await,
            IpcRequest::Start => {
                session_response(self.session.start().await, "Countdown started")
            }
            IpcRequest::Pause => session_response(self.session.pause().await, "Countdown paused"),
            IpcRequest::Resume => {
                session_response(self.session.resume().await, "Countdown resumed")
            }
            IpcRequest::Skip => self.handle_skip().await,
            IpcRequest::Cycle => session_response(self.session.cycle().await, "Activity changed"),
            IpcRequest::Status => self.handle_status().await,
            IpcRequest::Save => self.handle_save().await,
            IpcRequest::Discard => {
                session_response(self.session.discard().await, "Session discarded")
            }
            IpcRequest::Sessions => self.handle_sessions().await,
            IpcRequest::Show { id } => self.handle_show(&id).await,
            IpcRequest::Dashboard => self.handle_dashboard().await,
            IpcRequest::Register {
                username,
                email,
                password,
            } => self.handle_register(&username, &email, &password).await,
            IpcRequest::Login { email, password } => self.handle_login(&email, &password).await,
            IpcRequest::Logout => match self.auth.logout().await {
                Ok(()) => IpcResponse::success("Logged out", None),
                Err(e) => auth_error(e),
            },
            IpcRequest::Whoami => self.handle_whoami(),
        }
    }

    fn require_user(&self) -> Result<String, IpcResponse> {
        self.auth
            .user_id()
            .ok_or_else(|| auth_error(AuthError::NotLoggedIn))
    }

    /// Handles the init command.
    async fn handle_init(&self, params: InitParams) -> IpcResponse {
        let user_id = match self.require_user() {
            Ok(user_id) => user_id,
            Err(response) => return response,
        };

        let name = params.name.trim();
        if name.is_empty() {
            return IpcResponse::error("Session name must not be empty");
        }
        if name.chars().count() > MAX_SESSION_NAME_LEN {
            return IpcResponse::error(format!(
                "Session name must be at most {MAX_SESSION_NAME_LEN} characters"
            ));
        }

        let config = params.resolve(self.defaults);
        if let Err(e) = config.validate() {
            return session_error(e);
        }

        let id = uuid::Uuid::new_v4().simple().to_string();
        let session = Session::new(id, name, user_id, config);
        session_response(self.session.init(session).await, "Session created")
    }

    /// Handles the skip command.
    async fn handle_skip(&self) -> IpcResponse {
        match self.session.skip().await {
            Ok((session, completion)) => IpcResponse::success(
                format!("{} skipped", completion.activity.label()),
                Some(ResponseData::from_session(&session)),
            ),
            Err(e) => session_error(e),
        }
    }

    /// Handles the status command, consuming any pending completion signal.
    async fn handle_status(&self) -> IpcResponse {
        match self.session.status().await {
            Ok((Some(session), completed)) => IpcResponse::success(
                "",
                Some(ResponseData::from_session(&session).with_completed(completed)),
            ),
            Ok((None, _)) => IpcResponse::success("No active session", None),
            Err(e) => session_error(e),
        }
    }

    /// Handles the save command.
    ///
    /// The session is unloaded before writing. If the write fails the
    /// stopped session is loaded back so the caller can try again.
    async fn handle_save(&self) -> IpcResponse {
        if let Err(response) = self.require_user() {
            return response;
        }

        let session = match self.session.finish().await {
            Ok(session) => session,
            Err(e) => return session_error(e),
        };
        let record = session.to_record();

        match self.store.save_session(&record).await {
            Ok(()) => {
                tracing::info!(session_id = %record.id, total = record.total_duration, "session saved");
                IpcResponse::success(
                    "Session saved",
                    Some(ResponseData {
                        record: Some(record),
                        ..ResponseData::default()
                    }),
                )
            }
            Err(e) => {
                tracing::error!(session_id = %record.id, "failed to save session: {}", e);
                if let Err(restore) = self.session.init(session).await {
                    tracing::error!("failed to restore unsaved session: {}", restore);
                }
                IpcResponse::error(format!("Failed to save session: {e}"))
            }
        }
    }

    /// Handles the sessions command.
    async fn handle_sessions(&self) -> IpcResponse {
        let user_id = match self.require_user() {
            Ok(user_id) => user_id,
            Err(response) => return response,
        };

        match self.store.get_user_sessions(&user_id).await {
            Ok(mut sessions) => {
                sort_newest_first(&mut sessions);
                IpcResponse::success(
                    "",
                    Some(ResponseData {
                        sessions: Some(sessions),
                        ..ResponseData::default()
                    }),
                )
            }
            Err(e) => IpcResponse::error(format!("Failed to load sessions: {e}")),
        }
    }

    /// Handles the show command.
    async fn handle_show(&self, id: &str) -> IpcResponse {
        let user_id = match self.require_user() {
            Ok(user_id) => user_id,
            Err(response) => return response,
        };

        match self.store.get_user_sessions(&user_id).await {
            Ok(sessions) => match sessions.into_iter().find(|r| r.id == id) {
                Some(record) => IpcResponse::success(
                    "",
                    Some(ResponseData {
                        record: Some(record),
                        ..ResponseData::default()
                    }),
                ),
                None => IpcResponse::error("Session not found."),
            },
            Err(e) => IpcResponse::error(format!("Failed to load sessions: {e}")),
        }
    }

    /// Handles the dashboard command.
    async fn handle_dashboard(&self) -> IpcResponse {
        let Some(user) = self.auth.current_user() else {
            return auth_error(AuthError::NotLoggedIn);
        };

        match self.store.get_user_sessions(&user.uid).await {
            Ok(sessions) => {
                let mut stats = DashboardStats::from_records(&sessions);
                stats.username = Some(user.username);
                IpcResponse::success(
                    "",
                    Some(ResponseData {
                        dashboard: Some(stats),
                        ..ResponseData::default()
                    }),
                )
            }
            Err(e) => IpcResponse::error(format!("Failed to load sessions: {e}")),
        }
    }

    /// Handles the register command.
    async fn handle_register(&self, username: &str, email: &str, password: &str) -> IpcResponse {
        match self.auth.register(username, email, password).await {
            Ok(uid) => IpcResponse::success(
                "Account created. Log in to continue",
                Some(ResponseData {
                    user_id: Some(uid),
                    ..ResponseData::default()
                }),
            ),
            Err(e) => auth_error(e),
        }
    }

    /// Handles the login command.
    async fn handle_login(&self, email: &str, password: &str) -> IpcResponse {
        match self.auth.login(email, password).await {
            Ok(uid) => IpcResponse::success(
                "Login successful",
                Some(ResponseData {
                    user_id: Some(uid),
                    ..ResponseData::default()
                }),
            ),
            Err(e) => auth_error(e),
        }
    }

    /// Handles the whoami command.
    fn handle_whoami(&self) -> IpcResponse {
        match self.auth.current_user() {
            Some(user) => IpcResponse::success(
                format!("Logged in as {} <{}>", user.username, user.email),
                Some(ResponseData {
                    user_id: Some(user.uid),
                    ..ResponseData::default()
                }),
            ),
            None => IpcResponse::success("Not logged in", None),
        }
    }
}

fn session_response(result: Result<Session, SessionError>, message: &str) -> IpcResponse {
    match result {
        Ok(session) => IpcResponse::success(message, Some(ResponseData::from_session(&session))),
        Err(e) => session_error(e),
    }
}

fn session_error(error: SessionError) -> IpcResponse {
    tracing::warn!("session command rejected: {}", error);
    IpcResponse::error(error.to_string())
}

fn auth_error(error: AuthError) -> IpcResponse {
    if error.is_user_error() {
        tracing::warn!("auth request rejected: {}", error);
    } else {
        tracing::error!("auth storage failure: {}", error);
    }
    IpcResponse::error(error.to_string())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::auth::LocalAuth;
    use crate::daemon::timer::TimerEngine;
    use crate::store::MockSessionStore;
    use crate::types::{Activity, TimerStatus};

    // ------------------------------------------------------------------------
    // Helper functions
    // ------------------------------------------------------------------------

    fn create_temp_socket_path() -> PathBuf {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.sock");
        // Keep the directory so it's not deleted
        std::mem::forget(dir);
        path
    }

    struct Fixture {
        handler: RequestHandler<MockSessionStore, LocalAuth>,
        store: Arc<MockSessionStore>,
        _dir: tempfile::TempDir,
    }

    async fn fixture(logged_in: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let auth = LocalAuth::open(dir.path()).await.unwrap();
        auth.register("ann", "ann@example.com", "secret1").await.unwrap();
        if logged_in {
            auth.login("ann@example.com", "secret1").await.unwrap();
        }

        let (tx, _rx) = mpsc::unbounded_channel();
        let (handle, _task) = TimerEngine::spawn(tx);
        let store = Arc::new(MockSessionStore::new());
        let handler = RequestHandler::new(
            handle,
            store.clone(),
            Arc::new(auth),
            SessionConfig::default(),
        );
        Fixture {
            handler,
            store,
            _dir: dir,
        }
    }

    fn init_request(name: &str) -> IpcRequest {
        IpcRequest::Init {
            params: InitParams {
                name: name.to_string(),
                ..InitParams::default()
            },
        }
    }

    // ------------------------------------------------------------------------
    // IpcServer Tests
    // ------------------------------------------------------------------------

    mod ipc_server_tests {
        use super::*;

        #[tokio::test]
        async fn test_server_removes_existing_socket() {
            let socket_path = create_temp_socket_path();
            std::fs::write(&socket_path, "dummy").unwrap();

            let server = IpcServer::new(&socket_path);
            assert!(server.is_ok());
        }

        #[tokio::test]
        async fn test_server_creates_parent_directory() {
            let dir = tempfile::tempdir().unwrap();
            let socket_path = dir.path().join("subdir").join("test.sock");

            let server = IpcServer::new(&socket_path);
            assert!(server.is_ok());
            assert!(socket_path.parent().unwrap().exists());
        }

        #[tokio::test]
        async fn test_receive_request_until_half_close() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let client = tokio::spawn(async move {
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                stream
                    .write_all(br#"{"command":"init","name":"Reading","#)
                    .await
                    .unwrap();
                stream.write_all(br#""pomodoroMinutes":40}"#).await.unwrap();
                stream.shutdown().await.unwrap();
            });

            let mut stream = server.accept().await.unwrap();
            let request = IpcServer::receive_request(&mut stream).await.unwrap();

            match request {
                IpcRequest::Init { params } => {
                    assert_eq!(params.name, "Reading");
                    assert_eq!(params.pomodoro_minutes, Some(40));
                }
                other => panic!("Expected Init request, got {:?}", other),
            }
            client.await.unwrap();
        }

        #[tokio::test]
        async fn test_receive_request_too_large() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let _client = tokio::spawn(async move {
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                let payload = vec![b' '; MAX_REQUEST_SIZE + 10];
                let _ = stream.write_all(&payload).await;
                let _ = stream.shutdown().await;
            });

            let mut stream = server.accept().await.unwrap();
            let err = IpcServer::receive_request(&mut stream).await.unwrap_err();
            assert!(err.to_string().contains("too large"));
        }

        #[tokio::test]
        async fn test_receive_request_invalid_json() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let _client = tokio::spawn(async move {
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                stream.write_all(b"not valid json").await.unwrap();
                stream.shutdown().await.unwrap();
            });

            let mut stream = server.accept().await.unwrap();
            assert!(IpcServer::receive_request(&mut stream).await.is_err());
        }

        #[tokio::test]
        async fn test_send_response() {
            let socket_path = create_temp_socket_path();
            let server = IpcServer::new(&socket_path).unwrap();

            let client_path = socket_path.clone();
            let client = tokio::spawn(async move {
                let mut stream = UnixStream::connect(&client_path).await.unwrap();
                let mut buffer = Vec::new();
                stream.read_to_end(&mut buffer).await.unwrap();
                serde_json::from_slice::<IpcResponse>(&buffer).unwrap()
            });

            let mut stream = server.accept().await.unwrap();
            let response = IpcResponse::success("Test message", None);
            IpcServer::send_response(&mut stream, &response).await.unwrap();

            let received = client.await.unwrap();
            assert!(received.is_success());
            assert_eq!(received.message, "Test message");
        }

        #[tokio::test]
        async fn test_server_drop_cleanup() {
            let socket_path = create_temp_socket_path();
            {
                let server = IpcServer::new(&socket_path).unwrap();
                assert_eq!(server.socket_path(), socket_path);
                assert!(socket_path.exists());
            }
            assert!(!socket_path.exists());
        }
    }

    // ------------------------------------------------------------------------
    // RequestHandler Tests
    // ------------------------------------------------------------------------

    mod request_handler_tests {
        use super::*;

        #[tokio::test]
        async fn test_status_without_session() {
            let f = fixture(true).await;

            let response = f.handler.handle(IpcRequest::Status).await;

            assert!(response.is_success());
            assert!(response.data.is_none());
        }

        #[tokio::test]
        async fn test_controls_without_session_report_missing_session() {
            let f = fixture(true).await;

            for request in [
                IpcRequest::Start,
                IpcRequest::Pause,
                IpcRequest::Resume,
                IpcRequest::Skip,
                IpcRequest::Cycle,
                IpcRequest::Save,
                IpcRequest::Discard,
            ] {
                let response = f.handler.handle(request).await;
                assert!(!response.is_success());
                assert_eq!(response.message, "No active session found.");
            }
        }

        #[tokio::test]
        async fn test_init_requires_login() {
            let f = fixture(false).await;

            let response = f.handler.handle(init_request("Focus")).await;

            assert!(!response.is_success());
            assert!(response.message.contains("Not logged in"));
        }

        #[tokio::test]
        async fn test_init_validates_name_and_lengths() {
            let f = fixture(true).await;

            let response = f.handler.handle(init_request("   ")).await;
            assert!(!response.is_success());

            let response = f.handler.handle(init_request(&"x".repeat(101))).await;
            assert!(!response.is_success());

            let response = f
                .handler
                .handle(IpcRequest::Init {
                    params: InitParams {
                        name: "Too long".to_string(),
                        pomodoro_minutes: Some(500),
                        ..InitParams::default()
                    },
                })
                .await;
            assert!(!response.is_success());
            assert!(response.message.contains("Invalid session configuration"));
        }

        #[tokio::test]
        async fn test_init_creates_idle_session_for_user() {
            let f = fixture(true).await;

            let response = f.handler.handle(init_request("  Focus  ")).await;

            assert!(response.is_success());
            let data = response.data.unwrap();
            assert_eq!(data.timer_display.as_deref(), Some("25:00"));
            assert_eq!(data.state, Some(TimerStatus::Idle));
            let session = data.session.unwrap();
            assert_eq!(session.name, "Focus");
            assert!(!session.user_id.is_empty());
        }

        #[tokio::test]
        async fn test_start_pause_resume() {
            let f = fixture(true).await;
            f.handler.handle(init_request("Focus")).await;

            let started = f.handler.handle(IpcRequest::Start).await;
            assert_eq!(started.data.unwrap().state, Some(TimerStatus::Running));

            let paused = f.handler.handle(IpcRequest::Pause).await;
            assert_eq!(paused.data.unwrap().state, Some(TimerStatus::Paused));

            let resumed = f.handler.handle(IpcRequest::Resume).await;
            assert_eq!(resumed.data.unwrap().state, Some(TimerStatus::Running));

            let cycle = f.handler.handle(IpcRequest::Cycle).await;
            assert!(!cycle.is_success());
            assert_eq!(cycle.message, "Cannot change activity during countdown.");
        }

        #[tokio::test]
        async fn test_skip_then_status_consumes_completion_once() {
            let f = fixture(true).await;
            f.handler.handle(init_request("Focus")).await;
            f.handler.handle(IpcRequest::Start).await;

            let skipped = f.handler.handle(IpcRequest::Skip).await;
            assert!(skipped.is_success());
            assert_eq!(skipped.message, "Pomodoro skipped");

            let status = f.handler.handle(IpcRequest::Status).await;
            let completed = status.data.unwrap().completed.unwrap();
            assert_eq!(completed.activity, Activity::Pomodoro);
            assert!(!completed.counted);

            let status = f.handler.handle(IpcRequest::Status).await;
            assert!(status.data.unwrap().completed.is_none());
        }

        #[tokio::test]
        async fn test_save_writes_record_and_unloads() {
            let f = fixture(true).await;
            f.handler.handle(init_request("Focus")).await;

            let response = f.handler.handle(IpcRequest::Save).await;

            assert!(response.is_success());
            let record = response.data.unwrap().record.unwrap();
            assert_eq!(record.name, "Focus");
            assert_eq!(f.store.records(), vec![record]);

            let status = f.handler.handle(IpcRequest::Status).await;
            assert!(status.data.is_none());
        }

        #[tokio::test]
        async fn test_save_failure_keeps_session_loaded() {
            let f = fixture(true).await;
            f.handler.handle(init_request("Focus")).await;
            f.handler.handle(IpcRequest::Start).await;
            f.store.set_should_fail(true);

            let response = f.handler.handle(IpcRequest::Save).await;

            assert!(!response.is_success());
            assert!(response.message.starts_with("Failed to save session"));
            assert_eq!(f.store.save_calls(), 1);

            let status = f.handler.handle(IpcRequest::Status).await;
            let data = status.data.unwrap();
            assert_eq!(data.session.unwrap().name, "Focus");
            assert_eq!(data.state, Some(TimerStatus::Idle));
        }

        #[tokio::test]
        async fn test_sessions_show_and_dashboard() {
            let f = fixture(true).await;
            for name in ["First", "Second"] {
                f.handler.handle(init_request(name)).await;
                f.handler.handle(IpcRequest::Save).await;
            }

            let list = f.handler.handle(IpcRequest::Sessions).await;
            let sessions = list.data.unwrap().sessions.unwrap();
            assert_eq!(sessions.len(), 2);

            let id = sessions[0].id.clone();
            let shown = f.handler.handle(IpcRequest::Show { id: id.clone() }).await;
            assert_eq!(shown.data.unwrap().record.unwrap().id, id);

            let missing = f
                .handler
                .handle(IpcRequest::Show {
                    id: "nope".to_string(),
                })
                .await;
            assert_eq!(missing.message, "Session not found.");

            let dashboard = f.handler.handle(IpcRequest::Dashboard).await;
            let stats = dashboard.data.unwrap().dashboard.unwrap();
            assert_eq!(stats.sessions_done, 2);
            assert_eq!(stats.username.as_deref(), Some("ann"));
        }

        #[tokio::test]
        async fn test_account_flow() {
            let f = fixture(false).await;

            let whoami = f.handler.handle(IpcRequest::Whoami).await;
            assert_eq!(whoami.message, "Not logged in");

            let bad = f
                .handler
                .handle(IpcRequest::Login {
                    email: "ann@example.com".to_string(),
                    password: "wrong".to_string(),
                })
                .await;
            assert!(!bad.is_success());

            let login = f
                .handler
                .handle(IpcRequest::Login {
                    email: "ann@example.com".to_string(),
                    password: "secret1".to_string(),
                })
                .await;
            assert!(login.is_success());

            let whoami = f.handler.handle(IpcRequest::Whoami).await;
            assert!(whoami.message.contains("ann@example.com"));

            let logout = f.handler.handle(IpcRequest::Logout).await;
            assert!(logout.is_success());
            let sessions = f.handler.handle(IpcRequest::Sessions).await;
            assert!(!sessions.is_success());
        }
    }
}
