//! Session notifications published on the client's event bus.

use sara_auth::UserId;
use sara_events::{EventBus, InMemoryEventBus};

/// Something the UI/router layer may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { user_id: UserId },
    LoggedOut,
    /// An authenticated call came back 401; persisted state is already gone.
    Expired,
    /// The persisted user record could not be parsed and was discarded.
    StorageCorrupted,
    /// Soft, in-app navigation.
    Navigate(String),
    /// Hard redirect: the consumer must drop all in-memory state (full reload).
    Reload(String),
}

pub type SessionBus = InMemoryEventBus<SessionEvent>;

pub(crate) fn publish(bus: &SessionBus, event: SessionEvent) {
    if let Err(err) = bus.publish(event) {
        tracing::error!(error = %err, "failed to publish session event");
    }
}
