//! Event engine between `unifi-events-api` and consumers (the CLI).
//!
//! - **[`EventClient`]**: owns the controller session and a supervisor
//!   task that keeps one event socket open. [`start()`](EventClient::start)
//!   logs in and connects; on any loss it waits a fixed delay and tries
//!   again, announcing the outage once.
//!
//! - **[`Subscription`]**: topic-filtered view of published
//!   [`Notification`]s. Topics are dotted channel names (`lu.login`),
//!   group wildcards (`wu.*`), `unifi.*` for lifecycle, or `*`.
//!
//! - **Classification** ([`event`]): raw records keyed `EVT_<GG>_<Name>`
//!   become [`ClassifiedEvent`]s on channel `<gg>.<name>`.
//!
//! - **Guarded requests**: [`EventClient::request`] and friends probe the
//!   session first and log in again when it has gone stale.

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod gateway;
pub mod notification;
pub mod reconnect;
pub mod resources;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use client::{EventClient, LoginAttempt};
pub use config::{ClientConfig, TlsVerification};
pub use error::CoreError;
pub use event::{ClassifiedEvent, EventGroup, classify};
pub use gateway::data_of;
pub use notification::Notification;
pub use reconnect::{ConnectionState, DisconnectOutcome};
pub use stream::{Dispatcher, NotificationStream, Subscription, Topic, TopicParseError};
pub use unifi_events_api::Method;
