use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::constants::MOCK_POSITION_STORAGE_KEY;
use crate::error::{ChannelError, ServiceError, StoreError};
use crate::hex_coords::GeoPoint;
use crate::store::{self, KeyValueStore};

use super::channel::{OverrideChannel, SessionId};
use super::MockPosition;

const IGNORED_URL_PREFIXES: [&str; 2] = ["chrome://", "chrome-extension://"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachOutcome {
    Attached,
    AlreadyAttached,
    /// Browser-internal pages cannot be overridden.
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Updated,
    /// The first push failed on a lost attachment and succeeded after
    /// re-attaching.
    Reconnected,
}

/// Per-session results of one position fan-out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BroadcastReport {
    pub updated: Vec<SessionId>,
    pub reconnected: Vec<SessionId>,
    pub failed: Vec<(SessionId, ChannelError)>,
}

impl BroadcastReport {
    pub fn delivered(&self) -> usize {
        self.updated.len() + self.reconnected.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn sort(&mut self) {
        self.updated.sort_unstable();
        self.reconnected.sort_unstable();
        self.failed.sort_unstable_by_key(|(session, _)| *session);
    }
}

#[derive(Debug)]
struct ServiceState {
    position: MockPosition,
    attached: HashSet<SessionId>,
    /// Sessions an `attach_session` call is still connecting.
    connecting: HashSet<SessionId>,
}

/// Keeps the current mock position and every attached session in sync.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Debug)]
pub struct GeolocationService<C, S> {
    channel: Arc<C>,
    store: Arc<S>,
    state: Arc<Mutex<ServiceState>>,
}

impl<C, S> Clone for GeolocationService<C, S> {
    fn clone(&self) -> Self {
        Self {
            channel: Arc::clone(&self.channel),
            store: Arc::clone(&self.store),
            state: Arc::clone(&self.state),
        }
    }
}

impl<C: OverrideChannel, S: KeyValueStore> GeolocationService<C, S> {
    /// Load the saved position, or persist the default one if there is none
    /// or it cannot be read.
    pub async fn start(channel: Arc<C>, store: Arc<S>) -> Result<Self, ServiceError> {
        let saved = match store::load::<MockPosition, _>(store.as_ref(), MOCK_POSITION_STORAGE_KEY).await {
            Ok(saved) => saved.filter(MockPosition::is_valid),
            Err(StoreError::Serde(e)) => {
                warn!("saved mock position is unreadable: {e}");
                None
            }
            Err(e) => return Err(e.into()),
        };

        let position = match saved {
            Some(position) => {
                info!(lat = position.latitude, lng = position.longitude, "loaded mock position");
                position
            }
            None => {
                let position = MockPosition::default();
                store::save(store.as_ref(), MOCK_POSITION_STORAGE_KEY, &position).await?;
                info!("initialized default mock position");
                position
            }
        };

        Ok(Self {
            channel,
            store,
            state: Arc::new(Mutex::new(ServiceState {
                position,
                attached: HashSet::new(),
                connecting: HashSet::new(),
            })),
        })
    }

    pub async fn position(&self) -> MockPosition {
        self.state.lock().await.position
    }

    pub async fn attached_sessions(&self) -> Vec<SessionId> {
        let mut sessions: Vec<_> = self.state.lock().await.attached.iter().copied().collect();
        sessions.sort_unstable();
        sessions
    }

    pub async fn is_attached(&self, session: SessionId) -> bool {
        self.state.lock().await.attached.contains(&session)
    }

    /// Attach to a session showing `url` and push the current position to it.
    pub async fn attach_session(&self, session: SessionId, url: &str) -> Result<AttachOutcome, ServiceError> {
        if IGNORED_URL_PREFIXES.iter().any(|prefix| url.starts_with(prefix)) {
            debug!(session, url, "ignoring browser-internal page");
            return Ok(AttachOutcome::Ignored);
        }
        {
            let mut state = self.state.lock().await;
            if state.attached.contains(&session) || !state.connecting.insert(session) {
                debug!(session, "already attached");
                return Ok(AttachOutcome::AlreadyAttached);
            }
        }

        let connected = self.connect(session).await;
        self.state.lock().await.connecting.remove(&session);
        connected?;
        info!(session, "attached");
        Ok(AttachOutcome::Attached)
    }

    async fn connect(&self, session: SessionId) -> Result<(), ChannelError> {
        self.channel.attach(session).await?;
        let position = {
            let mut state = self.state.lock().await;
            state.attached.insert(session);
            state.position
        };
        self.channel.set_override(session, position).await
    }

    /// Clear the override and detach. Returns `false` if the session was not
    /// attached.
    pub async fn detach_session(&self, session: SessionId) -> Result<bool, ServiceError> {
        if !self.is_attached(session).await {
            return Ok(false);
        }

        if let Err(e) = self.channel.clear_override(session).await {
            warn!(session, "clearing override failed: {e}");
        }
        self.channel.detach(session).await?;
        self.state.lock().await.attached.remove(&session);
        info!(session, "detached");
        Ok(true)
    }

    /// The session went away; drop it without surfacing errors.
    pub async fn session_closed(&self, session: SessionId) {
        if let Err(e) = self.detach_session(session).await {
            warn!(session, "detaching closed session failed: {e}");
            self.state.lock().await.attached.remove(&session);
        }
    }

    /// Validate, persist and broadcast a new position.
    pub async fn update_position(&self, point: GeoPoint) -> Result<BroadcastReport, ServiceError> {
        let position = MockPosition::at(point);
        if !position.is_valid() {
            return Err(ServiceError::InvalidPosition {
                latitude: point.lat,
                longitude: point.lng,
            });
        }

        self.state.lock().await.position = position;
        store::save(self.store.as_ref(), MOCK_POSITION_STORAGE_KEY, &position).await?;
        info!(lat = point.lat, lng = point.lng, "mock position updated");

        Ok(self.broadcast().await)
    }

    /// Push the current position to every attached session at once. Each
    /// session's result is independent of the others.
    pub async fn broadcast(&self) -> BroadcastReport {
        let (position, sessions) = {
            let state = self.state.lock().await;
            (state.position, state.attached.iter().copied().collect::<Vec<_>>())
        };

        let mut tasks = JoinSet::new();
        for session in sessions {
            let service = self.clone();
            tasks.spawn(async move { (session, service.push_position(session, position).await) });
        }

        let mut report = BroadcastReport::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((session, Ok(PushOutcome::Updated))) => report.updated.push(session),
                Ok((session, Ok(PushOutcome::Reconnected))) => report.reconnected.push(session),
                Ok((session, Err(e))) => {
                    warn!(session, "position push failed: {e}");
                    report.failed.push((session, e));
                }
                Err(e) => error!("position push task did not finish: {e}"),
            }
        }
        report.sort();
        debug!(delivered = report.delivered(), failed = report.failed.len(), "broadcast finished");
        report
    }

    /// Lost attachments get one detach + re-attach before giving up.
    async fn push_position(&self, session: SessionId, position: MockPosition) -> Result<PushOutcome, ChannelError> {
        match self.channel.set_override(session, position).await {
            Ok(()) => Ok(PushOutcome::Updated),
            Err(e) if e.is_reconnectable() => {
                warn!(session, "reconnecting after: {e}");
                let _ = self.channel.detach(session).await;
                self.state.lock().await.attached.remove(&session);
                self.connect(session).await?;
                Ok(PushOutcome::Reconnected)
            }
            Err(e) => Err(e),
        }
    }
}
