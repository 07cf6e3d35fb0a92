/// The privileged side of the override: something that can attach to a
/// browsing session and replace the position it reports.
///
/// Real implementations speak a debugger protocol; [`MemoryChannel`] keeps
/// everything in process and can be told to fail, which is what the service
/// tests and the report tool use.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;

use crate::error::ChannelError;

use super::MockPosition;

pub type SessionId = u32;

pub trait OverrideChannel: Send + Sync + 'static {
    fn attach(&self, session: SessionId) -> impl Future<Output = Result<(), ChannelError>> + Send;

    fn detach(&self, session: SessionId) -> impl Future<Output = Result<(), ChannelError>> + Send;

    fn set_override(
        &self,
        session: SessionId,
        position: MockPosition,
    ) -> impl Future<Output = Result<(), ChannelError>> + Send;

    fn clear_override(&self, session: SessionId) -> impl Future<Output = Result<(), ChannelError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelCall {
    Attach(SessionId),
    Detach(SessionId),
    SetOverride(SessionId),
    ClearOverride(SessionId),
}

#[derive(Debug, Default)]
struct ChannelState {
    attached: HashSet<SessionId>,
    overrides: HashMap<SessionId, MockPosition>,
    refused: HashSet<SessionId>,
    failing: HashMap<SessionId, ChannelError>,
    calls: Vec<ChannelCall>,
}

/// In-process channel with scriptable failures.
#[derive(Debug, Default)]
pub struct MemoryChannel {
    state: Mutex<ChannelState>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut ChannelState) -> T) -> Result<T, ChannelError> {
        let mut state = self.state.lock().map_err(|e| ChannelError::Transport(e.to_string()))?;
        Ok(f(&mut state))
    }

    /// Every attach to `session` fails with `Unavailable`.
    pub fn refuse_attach(&self, session: SessionId) {
        let _ = self.with_state(|s| s.refused.insert(session));
    }

    /// Every override push to `session` fails with `error`.
    pub fn fail_overrides(&self, session: SessionId, error: ChannelError) {
        let _ = self.with_state(|s| s.failing.insert(session, error));
    }

    /// Drop the attachment behind the caller's back, as when the user closes
    /// the debugger banner.
    pub fn drop_session(&self, session: SessionId) {
        let _ = self.with_state(|s| {
            s.attached.remove(&session);
            s.overrides.remove(&session);
        });
    }

    pub fn is_attached(&self, session: SessionId) -> bool {
        self.with_state(|s| s.attached.contains(&session)).unwrap_or(false)
    }

    pub fn override_for(&self, session: SessionId) -> Option<MockPosition> {
        self.with_state(|s| s.overrides.get(&session).copied()).ok().flatten()
    }

    pub fn calls(&self) -> Vec<ChannelCall> {
        self.with_state(|s| s.calls.clone()).unwrap_or_default()
    }
}

impl OverrideChannel for MemoryChannel {
    async fn attach(&self, session: SessionId) -> Result<(), ChannelError> {
        // a real attach round-trips to the browser
        tokio::task::yield_now().await;
        self.with_state(|s| {
            s.calls.push(ChannelCall::Attach(session));
            if s.refused.contains(&session) {
                return Err(ChannelError::Unavailable(session));
            }
            s.attached.insert(session);
            Ok(())
        })?
    }

    async fn detach(&self, session: SessionId) -> Result<(), ChannelError> {
        self.with_state(|s| {
            s.calls.push(ChannelCall::Detach(session));
            if !s.attached.remove(&session) {
                return Err(ChannelError::NotAttached(session));
            }
            s.overrides.remove(&session);
            Ok(())
        })?
    }

    async fn set_override(&self, session: SessionId, position: MockPosition) -> Result<(), ChannelError> {
        self.with_state(|s| {
            s.calls.push(ChannelCall::SetOverride(session));
            if let Some(error) = s.failing.get(&session) {
                return Err(error.clone());
            }
            if !s.attached.contains(&session) {
                return Err(ChannelError::NotAttached(session));
            }
            s.overrides.insert(session, position);
            Ok(())
        })?
    }

    async fn clear_override(&self, session: SessionId) -> Result<(), ChannelError> {
        self.with_state(|s| {
            s.calls.push(ChannelCall::ClearOverride(session));
            if !s.attached.contains(&session) {
                return Err(ChannelError::NotAttached(session));
            }
            s.overrides.remove(&session);
            Ok(())
        })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_channel_tracks_attachment() {
        let channel = MemoryChannel::new();
        let position = MockPosition::default();

        assert_eq!(channel.set_override(1, position).await, Err(ChannelError::NotAttached(1)));
        channel.attach(1).await.unwrap();
        channel.set_override(1, position).await.unwrap();
        assert_eq!(channel.override_for(1), Some(position));

        channel.drop_session(1);
        assert!(!channel.is_attached(1));
        assert_eq!(channel.detach(1).await, Err(ChannelError::NotAttached(1)));

        channel.refuse_attach(2);
        assert_eq!(channel.attach(2).await, Err(ChannelError::Unavailable(2)));
        assert_eq!(channel.calls().len(), 5);
    }
}
