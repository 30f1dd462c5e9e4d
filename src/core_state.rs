//! Shared application state: the tutor pipeline and the live sessions.
//!
//! Sessions sit behind their own `Mutex` so one slow "generate" never
//! blocks other sessions. The registry `RwLock` is held only long enough
//! to clone a session handle. A session nobody has touched for the idle
//! timeout counts as ended and is dropped on the next sweep.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, TryLockError};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::config::DEFAULT_SESSION_IDLE_SECS;
use crate::pipeline::tutor::{PipelineInput, PipelineOutcome, Session, TutorPipeline};

/// Handle to one session's state.
pub type SessionHandle = Arc<Mutex<Session>>;

/// Registry entry: the session plus when it was last used.
struct SessionSlot {
    handle: SessionHandle,
    last_activity: Mutex<Instant>,
}

impl SessionSlot {
    fn new(session: Session) -> Self {
        Self {
            handle: Arc::new(Mutex::new(session)),
            last_activity: Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        if let Ok(mut last) = self.last_activity.lock() {
            *last = Instant::now();
        }
    }

    fn idle_for(&self) -> Duration {
        self.last_activity
            .lock()
            .map(|last| last.elapsed())
            .unwrap_or_default()
    }

    /// Idle past `timeout` and not mid-generate.
    fn is_expired(&self, timeout: Duration) -> bool {
        self.idle_for() > timeout
            && !matches!(self.handle.try_lock(), Err(TryLockError::WouldBlock))
    }
}

pub struct CoreState {
    pipeline: TutorPipeline,
    sessions: RwLock<HashMap<Uuid, SessionSlot>>,
    idle_timeout: Duration,
    started_at: Instant,
}

impl CoreState {
    pub fn new(pipeline: TutorPipeline) -> Self {
        Self {
            pipeline,
            sessions: RwLock::new(HashMap::new()),
            idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
            started_at: Instant::now(),
        }
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    pub fn model(&self) -> &str {
        self.pipeline.model()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    // ── Session registry ────────────────────────────────────

    pub fn create_session(&self) -> Result<Uuid, CoreError> {
        self.evict_idle_sessions()?;

        let session = Session::new();
        let id = session.id;
        self.sessions
            .write()
            .map_err(|_| CoreError::LockPoisoned)?
            .insert(id, SessionSlot::new(session));
        tracing::info!(session = %id, "Session started");
        Ok(id)
    }

    /// Drops the session and its history.
    pub fn end_session(&self, id: &Uuid) -> Result<(), CoreError> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| CoreError::LockPoisoned)?
            .remove(id);
        match removed {
            Some(_) => {
                tracing::info!(session = %id, "Session ended");
                Ok(())
            }
            None => Err(CoreError::SessionNotFound(*id)),
        }
    }

    /// Drop every session idle longer than the timeout. Returns how many went.
    pub fn evict_idle_sessions(&self) -> Result<usize, CoreError> {
        let mut sessions = self.sessions.write().map_err(|_| CoreError::LockPoisoned)?;
        let before = sessions.len();
        sessions.retain(|id, slot| {
            let expired = slot.is_expired(self.idle_timeout);
            if expired {
                tracing::info!(session = %id, idle_secs = slot.idle_for().as_secs(), "Session expired");
            }
            !expired
        });
        Ok(before - sessions.len())
    }

    pub fn session_count(&self) -> Result<usize, CoreError> {
        Ok(self
            .sessions
            .read()
            .map_err(|_| CoreError::LockPoisoned)?
            .len())
    }

    /// Look up a live session and mark it active. An expired session that
    /// has not been swept yet is already gone as far as callers can tell.
    pub fn session(&self, id: &Uuid) -> Result<SessionHandle, CoreError> {
        let sessions = self.sessions.read().map_err(|_| CoreError::LockPoisoned)?;
        let slot = sessions
            .get(id)
            .filter(|slot| !slot.is_expired(self.idle_timeout))
            .ok_or(CoreError::SessionNotFound(*id))?;
        slot.touch();
        Ok(Arc::clone(&slot.handle))
    }

    // ── Per-session access ──────────────────────────────────

    /// Run `f` on the session without waiting. A session that is
    /// mid-generate reports `SessionBusy`.
    pub fn with_session<R>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Result<R, CoreError> {
        let handle = self.session(id)?;
        let mut guard = try_lock_session(&handle)?;
        Ok(f(&mut guard))
    }

    /// One full pipeline run. Blocking: call from `spawn_blocking`.
    pub fn generate(&self, id: &Uuid, input: &PipelineInput) -> Result<PipelineOutcome, CoreError> {
        self.with_session(id, |session| self.pipeline.run(session, input))
    }
}

fn try_lock_session(handle: &SessionHandle) -> Result<MutexGuard<'_, Session>, CoreError> {
    match handle.try_lock() {
        Ok(guard) => Ok(guard),
        Err(TryLockError::WouldBlock) => Err(CoreError::SessionBusy),
        Err(TryLockError::Poisoned(_)) => Err(CoreError::LockPoisoned),
    }
}

/// Errors from CoreState operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),
    #[error("A request is already running for this session")]
    SessionBusy,
    #[error("Internal lock error")]
    LockPoisoned,
}
