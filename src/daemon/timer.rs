//! Timer engine for the Pomodoro session timer.
//!
//! This module provides the single writer of session state:
//! - `TimerEngine` owns the loaded session and its one-second tick source
//! - `SessionHandle` sends commands to the engine and awaits typed replies
//! - Immutable snapshots are published on a `watch` channel after every change
//! - `TimerEvent`s are fired for logging and notification consumers

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::session::{Completion, Session, SessionError};
use crate::types::Activity;

/// Interval between countdown ticks.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Capacity of the command channel.
const COMMAND_BUFFER: usize = 32;

// ============================================================================
// TimerEvent
// ============================================================================

/// Timer events for notifications and external integrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// A new session was loaded
    SessionLoaded {
        session_id: String,
        name: String,
    },
    /// A countdown was armed for `activity`
    CountdownStarted {
        activity: Activity,
        remaining_seconds: u32,
    },
    /// One second elapsed
    Tick {
        remaining_seconds: u32,
    },
    /// Countdown paused
    Paused {
        remaining_seconds: u32,
    },
    /// Countdown resumed
    Resumed {
        remaining_seconds: u32,
    },
    /// An activity ended, naturally or by skip
    ActivityCompleted(Completion),
    /// The activity kind was cycled
    ActivityChanged {
        activity: Activity,
    },
    /// The session was unloaded
    SessionEnded {
        session_id: String,
    },
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Debug)]
enum Command {
    Init(Box<Session>),
    Start,
    Pause,
    Resume,
    Skip,
    Cycle,
    Snapshot,
    Status,
    Finish,
    Discard,
}

#[derive(Debug)]
enum Reply {
    Session(Box<Session>),
    Skipped(Box<Session>, Completion),
    Snapshot(Option<Session>),
    Status(Option<Session>, Option<Completion>),
}

struct Envelope {
    command: Command,
    reply: oneshot::Sender<Result<Reply, SessionError>>,
}

// ============================================================================
// SessionHandle
// ============================================================================

/// Cloneable handle used by the presentation side to drive the engine.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Envelope>,
    snapshots: watch::Receiver<Option<Session>>,
}

impl SessionHandle {
    /// Loads `session`, replacing any session that is currently loaded.
    pub async fn init(&self, session: Session) -> Result<Session, SessionError> {
        self.send(Command::Init(Box::new(session))).await?.into_session()
    }

    /// Arms the countdown for the current activity.
    pub async fn start(&self) -> Result<Session, SessionError> {
        self.send(Command::Start).await?.into_session()
    }

    /// Pauses the running countdown.
    pub async fn pause(&self) -> Result<Session, SessionError> {
        self.send(Command::Pause).await?.into_session()
    }

    /// Resumes a paused countdown.
    pub async fn resume(&self) -> Result<Session, SessionError> {
        self.send(Command::Resume).await?.into_session()
    }

    /// Skips the current activity without counting it.
    pub async fn skip(&self) -> Result<(Session, Completion), SessionError> {
        match self.send(Command::Skip).await? {
            Reply::Skipped(session, completion) => Ok((*session, completion)),
            other => Err(other.unexpected()),
        }
    }

    /// Advances to the next activity kind.
    pub async fn cycle(&self) -> Result<Session, SessionError> {
        self.send(Command::Cycle).await?.into_session()
    }

    /// Returns the loaded session, if any.
    pub async fn snapshot(&self) -> Result<Option<Session>, SessionError> {
        match self.send(Command::Snapshot).await? {
            Reply::Snapshot(session) => Ok(session),
            other => Err(other.unexpected()),
        }
    }

    /// Returns the loaded session together with the pending completion
    /// signal, clearing the signal. Both come from the same engine turn, so
    /// no tick can land between them.
    pub async fn status(&self) -> Result<(Option<Session>, Option<Completion>), SessionError> {
        match self.send(Command::Status).await? {
            Reply::Status(session, completion) => Ok((session, completion)),
            other => Err(other.unexpected()),
        }
    }

    /// Stops the countdown and unloads the session so it can be saved.
    pub async fn finish(&self) -> Result<Session, SessionError> {
        self.send(Command::Finish).await?.into_session()
    }

    /// Unloads the session without saving it.
    pub async fn discard(&self) -> Result<Session, SessionError> {
        self.send(Command::Discard).await?.into_session()
    }

    /// Returns a receiver of published session snapshots.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.snapshots.clone()
    }

    async fn send(&self, command: Command) -> Result<Reply, SessionError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Envelope { command, reply })
            .await
            .map_err(|_| SessionError::EngineStopped)?;
        response.await.map_err(|_| SessionError::EngineStopped)?
    }
}

impl Reply {
    fn into_session(self) -> Result<Session, SessionError> {
        match self {
            Reply::Session(session) => Ok(*session),
            other => Err(other.unexpected()),
        }
    }

    fn unexpected(self) -> SessionError {
        tracing::error!("unexpected engine reply: {:?}", self);
        SessionError::EngineStopped
    }
}

// ============================================================================
// TimerEngine
// ============================================================================

/// Owns the loaded session and drives its countdown.
pub struct TimerEngine {
    session: Option<Session>,
    completed: Option<Completion>,
    commands: mpsc::Receiver<Envelope>,
    snapshot_tx: watch::Sender<Option<Session>>,
    event_tx: mpsc::UnboundedSender<TimerEvent>,
}

impl TimerEngine {
    /// Creates an engine with no session loaded and a handle to control it.
    pub fn new(event_tx: mpsc::UnboundedSender<TimerEvent>) -> (Self, SessionHandle) {
        let (commands_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshots) = watch::channel(None);

        let engine = Self {
            session: None,
            completed: None,
            commands,
            snapshot_tx,
            event_tx,
        };
        let handle = SessionHandle {
            commands: commands_tx,
            snapshots,
        };
        (engine, handle)
    }

    /// Creates an engine and spawns its loop on the current runtime.
    pub fn spawn(event_tx: mpsc::UnboundedSender<TimerEvent>) -> (SessionHandle, JoinHandle<()>) {
        let (engine, handle) = Self::new(event_tx);
        let task = tokio::spawn(engine.run());
        (handle, task)
    }

    /// Runs the engine until every `SessionHandle` has been dropped.
    ///
    /// There is exactly one tick source. Starting a countdown resets it, so a
    /// restarted countdown never receives a stale tick from the previous one.
    pub async fn run(mut self) {
        let mut ticker = interval(TICK_PERIOD);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                envelope = self.commands.recv() => {
                    let Some(Envelope { command, reply }) = envelope else {
                        break;
                    };
                    let rearms = matches!(command, Command::Start);
                    let result = self.handle_command(command);
                    if rearms && result.is_ok() {
                        ticker.reset();
                    }
                    if reply.send(result).is_err() {
                        tracing::debug!("caller dropped before engine reply");
                    }
                }
                _ = ticker.tick() => self.on_tick(),
            }
        }

        tracing::debug!("timer engine stopped");
    }

    fn handle_command(&mut self, command: Command) -> Result<Reply, SessionError> {
        match command {
            Command::Init(session) => {
                if let Some(previous) = self.session.take() {
                    tracing::warn!(session_id = %previous.id, "replacing unsaved session");
                }
                self.completed = None;
                self.emit(TimerEvent::SessionLoaded {
                    session_id: session.id.clone(),
                    name: session.name.clone(),
                });
                self.session = Some(*session);
                self.publish();
                self.reply_session()
            }
            Command::Start => {
                let session = self.session.as_mut().ok_or(SessionError::NoSession)?;
                session.start();
                let event = TimerEvent::CountdownStarted {
                    activity: session.activity,
                    remaining_seconds: session.timer,
                };
                self.emit(event);
                self.publish();
                self.reply_session()
            }
            Command::Pause => {
                let session = self.session.as_mut().ok_or(SessionError::NoSession)?;
                session.pause()?;
                let event = TimerEvent::Paused {
                    remaining_seconds: session.timer,
                };
                self.emit(event);
                self.publish();
                self.reply_session()
            }
            Command::Resume => {
                let session = self.session.as_mut().ok_or(SessionError::NoSession)?;
                session.resume()?;
                let event = TimerEvent::Resumed {
                    remaining_seconds: session.timer,
                };
                self.emit(event);
                self.publish();
                self.reply_session()
            }
            Command::Skip => {
                let session = self.session.as_mut().ok_or(SessionError::NoSession)?;
                let completion = session.skip();
                let snapshot = Box::new(session.clone());
                self.record_completion(completion);
                self.publish();
                Ok(Reply::Skipped(snapshot, completion))
            }
            Command::Cycle => {
                let session = self.session.as_mut().ok_or(SessionError::NoSession)?;
                let activity = session.cycle_activity()?;
                self.emit(TimerEvent::ActivityChanged { activity });
                self.publish();
                self.reply_session()
            }
            Command::Snapshot => Ok(Reply::Snapshot(self.session.clone())),
            Command::Status => Ok(Reply::Status(
                self.session.clone(),
                self.completed.take(),
            )),
            Command::Finish | Command::Discard => {
                let mut session = self.session.take().ok_or(SessionError::NoSession)?;
                session.stop();
                self.completed = None;
                self.emit(TimerEvent::SessionEnded {
                    session_id: session.id.clone(),
                });
                self.publish();
                Ok(Reply::Session(Box::new(session)))
            }
        }
    }

    fn on_tick(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.is_countdown || session.is_paused {
            return;
        }

        let completion = session.tick();
        let remaining_seconds = session.timer;
        self.emit(TimerEvent::Tick { remaining_seconds });
        if let Some(completion) = completion {
            self.record_completion(completion);
        }
        self.publish();
    }

    fn record_completion(&mut self, completion: Completion) {
        self.completed = Some(completion);
        self.emit(TimerEvent::ActivityCompleted(completion));
    }

    fn reply_session(&self) -> Result<Reply, SessionError> {
        self.session
            .clone()
            .map(|session| Reply::Session(Box::new(session)))
            .ok_or(SessionError::NoSession)
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.session.clone());
    }

    fn emit(&self, event: TimerEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("no timer event listener");
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
