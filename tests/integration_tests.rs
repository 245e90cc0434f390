//! Integration tests for Daemon-CLI IPC communication.
//!
//! These tests drive a real `TimerEngine` through the IPC server using the
//! CLI's `IpcClient`:
//! - Account commands and the login requirement
//! - Session controls and their error paths
//! - Completion notices delivered through `status`
//! - Save failures reported to the client
//! - Malformed requests and connection errors

use std::path::PathBuf;
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::sync::mpsc;

use pomodoro_session::auth::LocalAuth;
use pomodoro_session::cli::client::IpcClient;
use pomodoro_session::cli::commands::InitArgs;
use pomodoro_session::daemon::ipc::{IpcServer, RequestHandler};
use pomodoro_session::daemon::serve_connection;
use pomodoro_session::daemon::timer::TimerEngine;
use pomodoro_session::store::MockSessionStore;
use pomodoro_session::types::{Activity, IpcResponse, SessionConfig, TimerStatus};

// ============================================================================
// Test Helpers
// ============================================================================

/// Creates a temporary socket path for testing.
fn create_temp_socket_path() -> PathBuf {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("integration_test.sock");
    // Keep the directory so it's not deleted
    std::mem::forget(dir);
    path
}

struct Daemon {
    server: IpcServer,
    handler: RequestHandler<MockSessionStore, LocalAuth>,
    store: Arc<MockSessionStore>,
    client: IpcClient,
    _home: tempfile::TempDir,
}

async fn start_daemon() -> Daemon {
    let home = tempfile::tempdir().unwrap();
    let socket_path = create_temp_socket_path();

    let (tx, _rx) = mpsc::unbounded_channel();
    let (handle, _task) = TimerEngine::spawn(tx);
    let store = Arc::new(MockSessionStore::new());
    let auth = Arc::new(LocalAuth::open(home.path()).await.unwrap());
    let handler = RequestHandler::new(handle, store.clone(), auth, SessionConfig::default());

    Daemon {
        server: IpcServer::new(&socket_path).unwrap(),
        handler,
        store,
        client: IpcClient::with_socket_path(socket_path),
        _home: home,
    }
}

/// Answers requests until the surrounding `select!` drops this future.
async fn serve_forever(daemon: &Daemon) {
    loop {
        if let Ok(mut stream) = daemon.server.accept().await {
            serve_connection(&daemon.handler, &mut stream).await;
        }
    }
}

/// Runs `script` against the daemon while it serves requests.
macro_rules! with_daemon {
    ($daemon:expr, $script:expr) => {
        tokio::select! {
            _ = serve_forever(&$daemon) => unreachable!("server loop ended"),
            out = $script => out,
        }
    };
}

async fn sign_in(client: &IpcClient) {
    client
        .register("ann", "ann@example.com", "secret1")
        .await
        .unwrap();
    client.login("ann@example.com", "secret1").await.unwrap();
}

fn init_args(name: &str) -> InitArgs {
    InitArgs {
        name: name.to_string(),
        ..InitArgs::default()
    }
}

// ============================================================================
// Accounts
// ============================================================================

#[tokio::test]
async fn init_requires_login() {
    let daemon = start_daemon().await;
    let client = &daemon.client;

    let args = init_args("Focus");
    let result = with_daemon!(daemon, client.init(&args));

    let message = result.unwrap_err().to_string();
    assert!(message.contains("Not logged in"), "got: {}", message);
}

#[tokio::test]
async fn register_does_not_sign_in() {
    let daemon = start_daemon().await;
    let client = &daemon.client;

    let whoami = with_daemon!(daemon, async {
        client
            .register("ann", "ann@example.com", "secret1")
            .await
            .unwrap();
        client.whoami().await.unwrap()
    });

    assert_eq!(whoami.message, "Not logged in");
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let daemon = start_daemon().await;
    let client = &daemon.client;

    let result = with_daemon!(daemon, async {
        client
            .register("ann", "ann@example.com", "secret1")
            .await
            .unwrap();
        client.register("bob", "ann@example.com", "secret2").await
    });

    assert!(result.is_err());
}

// ============================================================================
// Session controls
// ============================================================================

#[tokio::test]
async fn controls_follow_the_state_machine() {
    let daemon = start_daemon().await;
    let client = &daemon.client;

    with_daemon!(daemon, async {
        sign_in(client).await;

        let created = client.init(&init_args("Focus")).await.unwrap();
        let data = created.data.unwrap();
        assert_eq!(data.timer_display.as_deref(), Some("25:00"));
        assert_eq!(data.state, Some(TimerStatus::Idle));

        let err = client.pause().await.unwrap_err();
        assert_eq!(err.to_string(), "No countdown is running.");

        let started = client.start().await.unwrap();
        assert_eq!(started.data.unwrap().state, Some(TimerStatus::Running));

        let err = client.cycle().await.unwrap_err();
        assert_eq!(err.to_string(), "Cannot change activity during countdown.");

        let paused = client.pause().await.unwrap();
        assert_eq!(paused.data.unwrap().state, Some(TimerStatus::Paused));

        let resumed = client.resume().await.unwrap();
        assert_eq!(resumed.data.unwrap().state, Some(TimerStatus::Running));
    });
}

#[tokio::test]
async fn skip_is_reported_once_by_status() {
    let daemon = start_daemon().await;
    let client = &daemon.client;

    with_daemon!(daemon, async {
        sign_in(client).await;
        client.init(&init_args("Focus")).await.unwrap();
        client.start().await.unwrap();
        client.skip().await.unwrap();

        let status = client.status().await.unwrap();
        let data = status.data.unwrap();
        let completed = data.completed.unwrap();
        assert_eq!(completed.activity, Activity::Pomodoro);
        assert!(!completed.counted);
        let session = data.session.unwrap();
        assert_eq!(session.completed_pomodoros, 0);
        assert_eq!(data.state, Some(TimerStatus::Idle));

        let status = client.status().await.unwrap();
        assert!(status.data.unwrap().completed.is_none());
    });
}

#[tokio::test]
async fn cycle_walks_through_activities() {
    let daemon = start_daemon().await;
    let client = &daemon.client;

    with_daemon!(daemon, async {
        sign_in(client).await;
        let args = InitArgs {
            name: "Custom".to_string(),
            pomodoro: Some(50),
            short_break: Some(10),
            long_break: Some(20),
        };
        client.init(&args).await.unwrap();

        let mut displays = Vec::new();
        for _ in 0..3 {
            let response = client.cycle().await.unwrap();
            displays.push(response.data.unwrap().timer_display.unwrap());
        }
        assert_eq!(displays, vec!["10:00", "20:00", "50:00"]);
    });
}

#[tokio::test]
async fn countdown_ticks_in_real_time() {
    let daemon = start_daemon().await;
    let client = &daemon.client;

    with_daemon!(daemon, async {
        sign_in(client).await;
        client.init(&init_args("Focus")).await.unwrap();
        client.start().await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(2200)).await;

        let status = client.status().await.unwrap();
        let timer = status.data.unwrap().session.unwrap().timer;
        assert!((1497..=1499).contains(&timer), "timer was {}", timer);
    });
}

// ============================================================================
// Saving
// ============================================================================

#[tokio::test]
async fn save_writes_record_and_unloads_session() {
    let daemon = start_daemon().await;
    let client = &daemon.client;

    let saved = with_daemon!(daemon, async {
        sign_in(client).await;
        client.init(&init_args("Focus")).await.unwrap();
        let saved = client.save().await.unwrap();
        let status = client.status().await.unwrap();
        assert!(status.data.is_none());
        saved
    });

    let record = saved.data.unwrap().record.unwrap();
    assert_eq!(daemon.store.records(), vec![record]);
}

#[tokio::test]
async fn save_failure_is_reported_and_session_kept() {
    let daemon = start_daemon().await;
    let client = &daemon.client;
    daemon.store.set_should_fail(true);

    with_daemon!(daemon, async {
        sign_in(client).await;
        client.init(&init_args("Focus")).await.unwrap();

        let err = client.save().await.unwrap_err();
        assert!(err.to_string().starts_with("Failed to save session"));

        let status = client.status().await.unwrap();
        assert_eq!(status.data.unwrap().session.unwrap().name, "Focus");
    });

    assert_eq!(daemon.store.save_calls(), 1);
}

#[tokio::test]
async fn missing_session_detail() {
    let daemon = start_daemon().await;
    let client = &daemon.client;

    let result = with_daemon!(daemon, async {
        sign_in(client).await;
        client.show("does-not-exist").await
    });

    assert_eq!(result.unwrap_err().to_string(), "Session not found.");
}

// ============================================================================
// Transport errors
// ============================================================================

#[tokio::test]
async fn malformed_request_gets_error_response() {
    let daemon = start_daemon().await;
    let socket_path = daemon.server.socket_path().to_path_buf();

    let response = with_daemon!(daemon, async {
        let mut stream = UnixStream::connect(&socket_path).await.unwrap();
        stream.write_all(b"{\"command\":\"explode\"}").await.unwrap();
        stream.shutdown().await.unwrap();

        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).await.unwrap();
        serde_json::from_slice::<IpcResponse>(&buffer).unwrap()
    });

    assert!(!response.is_success());
    assert!(response.message.starts_with("Invalid request"));
}

#[tokio::test]
async fn connection_error_without_daemon() {
    let client = IpcClient::with_socket_path(create_temp_socket_path());

    let err = client.status().await.unwrap_err();

    assert!(format!("{:#}", err).contains("Cannot connect to the daemon"));
}
