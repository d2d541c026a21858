// unifi-events-api: session, request, and event-stream transport for UniFi controllers

pub mod error;
pub mod request;
pub mod session;
pub mod transport;
pub mod websocket;

pub use error::Error;
pub use reqwest::Method;
pub use session::{ControllerSession, Credentials};
pub use transport::{TlsMode, TransportConfig, USER_AGENT};
pub use websocket::{EventStream, Frame, StreamEnd};
