// ── Event client ──
//
// Owns the controller session, the notification dispatcher, and the
// supervisor task that keeps one event socket open: log in, connect,
// stream, and on any loss wait the fixed delay and go round again.

use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use unifi_events_api::transport::TransportConfig;
use unifi_events_api::{ControllerSession, Credentials, EventStream, StreamEnd};

use crate::config::ClientConfig;
use crate::error::CoreError;
use crate::notification::Notification;
use crate::reconnect::{ConnectionState, DisconnectOutcome, LinkState};
use crate::stream::{Dispatcher, Subscription, Topic};

/// Whether a login belongs to a reconnect attempt.
///
/// A failed normal login counts as a disconnect; a failed reconnect login
/// is left to the reconnect cycle already in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginAttempt {
    Normal,
    Reconnect,
}

// ── EventClient ──────────────────────────────────────────────────────

/// Client for one controller site's event stream and REST API.
///
/// Cheaply cloneable via `Arc<ClientInner>`. Nothing happens until
/// [`start()`](Self::start); request helpers work without it.
#[derive(Clone)]
pub struct EventClient {
    pub(crate) inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub(crate) config: ClientConfig,
    pub(crate) session: ControllerSession,
    transport: TransportConfig,
    dispatcher: Dispatcher,
    link: LinkState,
    cancel: CancellationToken,
    /// Cancels the socket currently being streamed, if any.
    active_stream: StdMutex<Option<CancellationToken>>,
    supervisor: Mutex<Option<JoinHandle<()>>>,
}

impl EventClient {
    /// Validate the config and build the session. Does not connect.
    pub fn new(config: ClientConfig) -> Result<Self, CoreError> {
        config.validate()?;

        let transport = TransportConfig {
            tls: config.tls.into(),
            timeout: config.timeout,
            cookie_jar: None,
        }
        .with_cookie_jar();

        let credentials = Credentials {
            username: config.username.clone(),
            password: config.password.clone(),
        };
        let session = ControllerSession::new(
            config.url.clone(),
            config.site.clone(),
            credentials,
            &transport,
        )?;

        let link = LinkState::new(config.reconnect_delay);

        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                session,
                transport,
                dispatcher: Dispatcher::default(),
                link,
                cancel: CancellationToken::new(),
                active_stream: StdMutex::new(None),
                supervisor: Mutex::new(None),
            }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Subscribe to notifications matching `topic`.
    pub fn subscribe(&self, topic: Topic) -> Subscription {
        self.inner.dispatcher.subscribe(topic)
    }

    /// Watch the link state.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.link.subscribe()
    }

    /// Whether the session is currently believed valid.
    pub fn is_session_valid(&self) -> bool {
        self.inner.session.is_valid()
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Spawn the supervisor: log in, open the event socket, keep it open.
    /// Calling it again while running is a no-op.
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ClientShutdown);
        }

        let mut supervisor = self.inner.supervisor.lock().await;
        if supervisor.is_some() {
            debug!("event client already started");
            return Ok(());
        }

        info!(
            url = %self.inner.config.url,
            site = %self.inner.config.site,
            "starting event client"
        );
        let client = self.clone();
        *supervisor = Some(tokio::spawn(async move { client.supervise().await }));
        Ok(())
    }

    /// Stop the supervisor and close the socket. Subscriptions end once
    /// the last clone of the client is dropped.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let handle = self.inner.supervisor.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "supervisor task ended abnormally");
            }
        }

        self.inner.link.stop();
        info!("event client shut down");
    }

    // ── Login / disconnect ──────────────────────────────────────────

    /// Log in with the configured credentials.
    ///
    /// A failed [`LoginAttempt::Normal`] login is treated as a lost
    /// connection once the client is started; before that there is
    /// nothing to reconnect. A failed [`LoginAttempt::Reconnect`] login
    /// only logs.
    pub async fn login(&self, attempt: LoginAttempt) -> Result<(), CoreError> {
        match self.inner.session.login().await {
            Ok(()) => {
                info!(user = %self.inner.config.username, "logged in");
                Ok(())
            }
            Err(e) => {
                let err = CoreError::AuthenticationFailed {
                    message: e.to_string(),
                };
                match attempt {
                    LoginAttempt::Normal => {
                        warn!(error = %err, "login failed");
                        self.signal_disconnect();
                    }
                    LoginAttempt::Reconnect => {
                        warn!(error = %err, "login failed during reconnect attempt");
                    }
                }
                Err(err)
            }
        }
    }

    /// Report lost connectivity. Publishes `unifi.disconnect` at most
    /// once per outage and aborts the socket currently streaming.
    pub fn signal_disconnect(&self) -> DisconnectOutcome {
        let outcome = self.inner.link.on_disconnect();

        if outcome == DisconnectOutcome::Lost {
            info!("connection to controller lost");
            self.inner.dispatcher.publish(Notification::Disconnected);
        }
        if outcome != DisconnectOutcome::Ignored {
            if let Some(token) = self.active_stream().take() {
                token.cancel();
            }
        }
        outcome
    }

    fn active_stream(&self) -> std::sync::MutexGuard<'_, Option<CancellationToken>> {
        self.inner
            .active_stream
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    // ── Supervisor ───────────────────────────────────────────────────

    async fn supervise(&self) {
        let cancel = self.inner.cancel.clone();

        loop {
            let attempt = self.inner.link.begin_login();
            let kind = if attempt == 0 {
                LoginAttempt::Normal
            } else {
                LoginAttempt::Reconnect
            };

            let login = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                result = self.login(kind) => result,
            };

            // A failed normal login has already gone down the disconnect
            // path; opening the socket anyway would race the reconnect.
            let open_socket = login.is_ok() || kind == LoginAttempt::Reconnect;
            if open_socket && self.inner.link.begin_connect() {
                self.run_stream(&cancel).await;
            }
            if cancel.is_cancelled() {
                break;
            }

            self.signal_disconnect();

            let delay = self.inner.link.delay();
            info!(?delay, "reconnecting after delay");
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }

            let attempt = self.inner.link.current().attempt();
            info!(attempt, "reconnecting to controller");
            self.inner
                .dispatcher
                .publish(Notification::Reconnecting { attempt });
        }

        self.inner.link.stop();
        debug!("supervisor stopped");
    }

    /// Open one socket and stream it until it ends.
    async fn run_stream(&self, cancel: &CancellationToken) {
        let inner = &self.inner;

        let url = match inner.session.events_url() {
            Ok(url) => url,
            Err(e) => {
                inner.dispatcher.publish(Notification::Error(e.into()));
                return;
            }
        };
        let cookie = inner.session.cookie_header();

        let connect = EventStream::connect(
            &url,
            cookie.as_deref(),
            &inner.transport,
            inner.config.keepalive_interval,
        );
        let stream = tokio::select! {
            biased;
            () = cancel.cancelled() => return,
            result = connect => match result {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, "event stream connect failed");
                    inner.dispatcher.publish(Notification::Error(e.into()));
                    return;
                }
            },
        };

        let stream_cancel = cancel.child_token();
        *self.active_stream() = Some(stream_cancel.clone());

        if !inner.link.on_connected() {
            debug!("disconnect signalled during handshake, dropping socket");
            self.active_stream().take();
            return;
        }
        info!("connected to controller event stream");
        inner.dispatcher.publish(Notification::Connected);

        let dispatcher = &inner.dispatcher;
        let result = stream
            .run(&stream_cancel, |batch| match batch {
                Ok(records) => {
                    for record in records {
                        dispatcher.publish_record(record);
                    }
                }
                Err(e) => {
                    warn!(error = %e, "malformed event message");
                    dispatcher.publish(Notification::Error(e.into()));
                }
            })
            .await;
        self.active_stream().take();

        match result {
            Ok(StreamEnd::Closed { code, reason }) => {
                info!(?code, %reason, "event stream closed by controller");
            }
            Ok(StreamEnd::Ended) => info!("event stream ended"),
            Ok(StreamEnd::Cancelled) => debug!("event stream cancelled"),
            Err(e) => {
                warn!(error = %e, "event stream error");
                inner.dispatcher.publish(Notification::Error(e.into()));
            }
        }
    }
}
