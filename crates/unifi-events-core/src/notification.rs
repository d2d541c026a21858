// ── Notifications ──
//
// Everything a subscriber can observe: link lifecycle under the `unifi`
// namespace, plus classified controller events under `<group>.<name>`.

use std::borrow::Cow;

use crate::error::CoreError;
use crate::event::ClassifiedEvent;

/// Namespace for lifecycle channels.
pub const LIFECYCLE_NAMESPACE: &str = "unifi";

/// One published notification.
#[derive(Debug)]
pub enum Notification {
    /// `unifi.connect`: the event socket is open.
    Connected,
    /// `unifi.disconnect`: connectivity was lost. Published once per
    /// continuous outage.
    Disconnected,
    /// `unifi.reconnect`: a reconnect attempt is starting.
    Reconnecting { attempt: u32 },
    /// `unifi.error`: socket or message error.
    Error(CoreError),
    /// A classified controller event.
    Event(ClassifiedEvent),
}

impl Notification {
    /// Channel name, e.g. `unifi.connect` or `wu.connected`.
    pub fn channel(&self) -> Cow<'static, str> {
        match self {
            Self::Connected => Cow::Borrowed("unifi.connect"),
            Self::Disconnected => Cow::Borrowed("unifi.disconnect"),
            Self::Reconnecting { .. } => Cow::Borrowed("unifi.reconnect"),
            Self::Error(_) => Cow::Borrowed("unifi.error"),
            Self::Event(event) => Cow::Owned(event.channel()),
        }
    }

    pub fn is_lifecycle(&self) -> bool {
        !matches!(self, Self::Event(_))
    }

    pub fn as_event(&self) -> Option<&ClassifiedEvent> {
        match self {
            Self::Event(event) => Some(event),
            _ => None,
        }
    }
}
