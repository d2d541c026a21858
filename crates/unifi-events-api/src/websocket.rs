//! Controller event WebSocket.
//!
//! One [`EventStream`] is one socket to `/wss/s/{site}/events`. While it
//! runs it sends a literal `ping` text frame on a fixed interval, drops the
//! controller's literal `pong` replies, and hands every other text frame to
//! the caller as either a batch of raw event records or a
//! [`Error::MalformedMessage`]. Reconnection is *not* handled here -- when
//! [`EventStream::run`] returns, the socket is gone and the caller decides
//! what happens next.
//!
//! # Example
//!
//! ```rust,ignore
//! use unifi_events_api::websocket::{EventStream, KEEPALIVE_INTERVAL};
//!
//! let url = session.events_url()?;
//! let stream = EventStream::connect(&url, session.cookie_header().as_deref(), &transport, KEEPALIVE_INTERVAL).await?;
//! let end = stream.run(&cancel, |batch| match batch {
//!     Ok(records) => println!("{} records", records.len()),
//!     Err(e) => eprintln!("{e}"),
//! }).await?;
//! ```

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::TcpStream;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::tungstenite::{self, ClientRequestBuilder, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};
use url::Url;

use crate::error::Error;
use crate::transport::{TransportConfig, USER_AGENT};

/// Interval between keepalive `ping` frames.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(15);

const PING: &str = "ping";
const PONG: &str = "pong";

// ── Frame decoding ───────────────────────────────────────────────────

/// A decoded text frame from the event socket.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// The controller's reply to a keepalive `ping`.
    Pong,
    /// Raw event records from the `data` array, in message order.
    Records(Vec<serde_json::Value>),
}

/// Envelope the controller sends: `{ "meta": {...}, "data": [...] }`.
/// Only `data` matters here.
#[derive(Debug, Deserialize)]
struct WsEnvelope {
    data: Vec<serde_json::Value>,
}

/// Decode one text frame.
///
/// The literal `pong` is recognised before any JSON parsing. Everything
/// else must be a JSON object with a `data` array.
pub fn decode_frame(text: &str) -> Result<Frame, Error> {
    if text == PONG {
        return Ok(Frame::Pong);
    }

    serde_json::from_str::<WsEnvelope>(text)
        .map(|envelope| Frame::Records(envelope.data))
        .map_err(|e| Error::MalformedMessage {
            message: e.to_string(),
            frame: text.to_owned(),
        })
}

// ── StreamEnd ────────────────────────────────────────────────────────

/// How a stream finished without a socket error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The controller sent a close frame.
    Closed { code: Option<u16>, reason: String },
    /// The socket ended without a close frame.
    Ended,
    /// The caller's cancellation token fired.
    Cancelled,
}

// ── EventStream ──────────────────────────────────────────────────────

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// An open event socket, ready to [`run`](Self::run).
pub struct EventStream {
    socket: Socket,
    keepalive: Duration,
}

impl EventStream {
    /// Perform the WebSocket handshake.
    ///
    /// The upgrade request carries the fixed `User-Agent` and, when given,
    /// the session `Cookie`. Certificate checks follow `transport.tls`.
    pub async fn connect(
        url: &Url,
        cookie: Option<&str>,
        transport: &TransportConfig,
        keepalive: Duration,
    ) -> Result<Self, Error> {
        info!(url = %url, "Connecting to event stream");

        let uri: tungstenite::http::Uri = url.as_str().parse().map_err(
            |e: tungstenite::http::uri::InvalidUri| Error::WebSocketConnect(e.to_string()),
        )?;

        let mut request = ClientRequestBuilder::new(uri).with_header("User-Agent", USER_AGENT);
        if let Some(cookie_val) = cookie {
            request = request.with_header("Cookie", cookie_val);
        }

        let connector = if url.scheme() == "wss" {
            transport.websocket_connector()?
        } else {
            None
        };

        let (socket, _response) =
            tokio_tungstenite::connect_async_tls_with_config(request, None, false, connector)
                .await
                .map_err(|e| Error::WebSocketConnect(e.to_string()))?;

        info!("Event stream connected");
        Ok(Self { socket, keepalive })
    }

    /// Read frames until the socket closes, errors, or `cancel` fires.
    ///
    /// `on_batch` is called once per non-`pong` text frame, in receipt
    /// order: `Ok(records)` for a well-formed envelope, `Err` for a
    /// malformed one. Malformed frames never end the stream. A socket
    /// error ends it with `Err`; the keepalive timer dies with it.
    pub async fn run<F>(self, cancel: &CancellationToken, mut on_batch: F) -> Result<StreamEnd, Error>
    where
        F: FnMut(Result<Vec<serde_json::Value>, Error>),
    {
        let (mut write, mut read) = self.socket.split();

        let mut keepalive =
            tokio::time::interval_at(Instant::now() + self.keepalive, self.keepalive);
        keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("event stream cancelled, sending close frame");
                    let _ = write.send(Message::Close(None)).await;
                    return Ok(StreamEnd::Cancelled);
                }
                _ = keepalive.tick() => {
                    trace!("sending keepalive ping");
                    write
                        .send(Message::Text(PING.into()))
                        .await
                        .map_err(|e| Error::WebSocket(e.to_string()))?;
                }
                frame = read.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => match decode_frame(text.as_str()) {
                            Ok(Frame::Pong) => trace!("keepalive pong"),
                            Ok(Frame::Records(records)) => on_batch(Ok(records)),
                            Err(e) => on_batch(Err(e)),
                        },
                        Some(Ok(Message::Close(frame))) => {
                            let (code, reason) = match frame {
                                Some(cf) => (Some(u16::from(cf.code)), cf.reason.as_str().to_owned()),
                                None => (None, String::new()),
                            };
                            info!(?code, %reason, "Event stream close frame received");
                            return Ok(StreamEnd::Closed { code, reason });
                        }
                        Some(Ok(_)) => {
                            // Binary, protocol Ping/Pong, raw Frame -- ignore
                        }
                        Some(Err(e)) => return Err(Error::WebSocket(e.to_string())),
                        None => {
                            info!("Event stream ended");
                            return Ok(StreamEnd::Ended);
                        }
                    }
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
