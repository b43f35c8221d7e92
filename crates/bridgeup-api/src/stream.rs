//! WebSocket stream with auto-reconnect.
//!
//! Connects to the BridgeUp push endpoint, sends a subscribe directive
//! naming the wanted channels, and forwards decoded [`ServerMessage`]s
//! as [`StreamEvent`]s through an mpsc channel. Reconnection uses
//! exponential backoff with jitter; after the attempt ceiling is hit the
//! task emits [`StreamEvent::Exhausted`] and exits for good -- callers
//! are expected to fall back to REST polling for the rest of the session.
//!
//! # Example
//!
//! ```rust,ignore
//! use bridgeup_api::stream::{ReconnectConfig, StreamHandle};
//! use bridgeup_api::types::Channel;
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let cancel = CancellationToken::new();
//! let url = Url::parse("wss://api.bridgeup.app/ws")?;
//!
//! let mut handle = StreamHandle::spawn(
//!     url,
//!     vec![Channel::Bridges, Channel::Boats],
//!     ReconnectConfig::default(),
//!     cancel.clone(),
//! );
//!
//! while let Some(event) = handle.next_event().await {
//!     println!("{event:?}");
//! }
//! ```

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::types::{BridgesResponse, Channel, ServerMessage, SubscribeDirective, VesselsResponse};

// ── Event channel capacity ───────────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 256;

// ── StreamEvent ──────────────────────────────────────────────────────

/// Events emitted by the background stream task, in delivery order.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A connection attempt is starting.
    Connecting,
    /// The socket opened and the subscribe directive was dispatched.
    Connected,
    /// The server acknowledged the subscription.
    Subscribed { channels: Vec<Channel> },
    /// A full bridges payload arrived.
    Bridges(BridgesResponse),
    /// A full vessels payload arrived.
    Boats(VesselsResponse),
    /// An open session ended (close frame, read error, or EOF).
    Disconnected { reason: String },
    /// A connection attempt never completed its handshake.
    ConnectFailed { attempt: u32, error: String },
    /// The reconnect budget is spent; the task is exiting and will not
    /// try the stream again this session.
    Exhausted,
}

// ── ReconnectConfig ──────────────────────────────────────────────────

/// Exponential backoff configuration for stream reconnection.
#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    /// Base delay before the first reconnection attempt. Default: 1s.
    pub base_delay: Duration,

    /// Upper bound on the total backoff delay (including jitter).
    /// Default: 30s.
    pub max_delay: Duration,

    /// Reconnection attempts before giving up for the session.
    /// Default: 5.
    pub max_attempts: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            max_attempts: 5,
        }
    }
}

// ── StreamHandle ─────────────────────────────────────────────────────

/// Handle to a running stream task.
///
/// Owns the receiving end of the event channel; there is exactly one
/// consumer. `next_event` returning `None` means the task has exited
/// (cancelled or exhausted).
pub struct StreamHandle {
    events: mpsc::Receiver<StreamEvent>,
    cancel: CancellationToken,
}

impl StreamHandle {
    /// Spawn the background stream task.
    ///
    /// Returns immediately; the first connection attempt happens
    /// asynchronously.
    pub fn spawn(
        ws_url: Url,
        channels: Vec<Channel>,
        reconnect: ReconnectConfig,
        cancel: CancellationToken,
    ) -> Self {
        let (event_tx, events) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            stream_loop(ws_url, channels, event_tx, reconnect, task_cancel).await;
        });

        Self { events, cancel }
    }

    /// Receive the next event, or `None` once the task has exited.
    pub async fn next_event(&mut self) -> Option<StreamEvent> {
        self.events.recv().await
    }

    /// Signal the background task to shut down.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Outcome of a single connection lifetime.
enum Session {
    /// The handshake never completed.
    Failed(String),
    /// The socket opened, then later closed or errored.
    Ended { reason: String },
}

/// Main loop: connect → read → on drop, backoff → reconnect, up to the
/// attempt ceiling.
async fn stream_loop(
    ws_url: Url,
    channels: Vec<Channel>,
    event_tx: mpsc::Sender<StreamEvent>,
    reconnect: ReconnectConfig,
    cancel: CancellationToken,
) {
    let mut attempt: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            session = connect_and_read(&ws_url, &channels, &event_tx, &cancel) => {
                if cancel.is_cancelled() {
                    break;
                }
                match session {
                    Session::Ended { reason } => {
                        tracing::info!(reason, "stream disconnected");
                        // A successful open resets the budget, so only
                        // consecutive failed attempts count toward it.
                        attempt = 0;
                        forward(&event_tx, StreamEvent::Disconnected { reason }).await;
                    }
                    Session::Failed(error) => {
                        tracing::warn!(error, attempt, "stream connection failed");
                        forward(&event_tx, StreamEvent::ConnectFailed { attempt, error }).await;
                    }
                }

                if attempt >= reconnect.max_attempts {
                    tracing::warn!(
                        max_attempts = reconnect.max_attempts,
                        "stream reconnect budget spent, giving up for this session"
                    );
                    forward(&event_tx, StreamEvent::Exhausted).await;
                    break;
                }

                let delay = calculate_backoff(attempt, &reconnect);
                attempt += 1;
                tracing::info!(
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    attempt,
                    "waiting before reconnect"
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    () = tokio::time::sleep(delay) => {}
                }
            }
        }
    }

    tracing::debug!("stream loop exiting");
}

/// Deliver an event, ignoring a dropped receiver (consumer gone).
async fn forward(event_tx: &mpsc::Sender<StreamEvent>, event: StreamEvent) {
    let _ = event_tx.send(event).await;
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one WebSocket connection, subscribe, and read frames until
/// the connection drops.
async fn connect_and_read(
    url: &Url,
    channels: &[Channel],
    event_tx: &mpsc::Sender<StreamEvent>,
    cancel: &CancellationToken,
) -> Session {
    tracing::info!(url = %url, "connecting to stream");
    forward(event_tx, StreamEvent::Connecting).await;

    let (ws_stream, _response) = match tokio_tungstenite::connect_async(url.as_str()).await {
        Ok(conn) => conn,
        Err(e) => return Session::Failed(e.to_string()),
    };

    tracing::info!("stream connected");
    let (mut write, mut read) = ws_stream.split();

    // Subscribe to the wanted channels. A send failure here is not
    // fatal to the session -- the server may still push unsolicited
    // updates -- but it is worth a warning.
    match serde_json::to_string(&SubscribeDirective::new(channels)) {
        Ok(payload) => {
            if let Err(e) = write.send(tungstenite::Message::Text(payload.into())).await {
                tracing::warn!(error = %e, "failed to send subscribe directive");
            }
        }
        Err(e) => tracing::warn!(error = %e, "failed to encode subscribe directive"),
    }

    forward(event_tx, StreamEvent::Connected).await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Session::Ended { reason: "cancelled".into() };
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        parse_and_forward(text.as_str(), event_tx).await;
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // tungstenite answers pings automatically
                        tracing::trace!("stream ping");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        let reason = frame
                            .map(|cf| format!("close frame (code {}): {}", cf.code, cf.reason))
                            .unwrap_or_else(|| "close frame (no payload)".into());
                        return Session::Ended { reason };
                    }
                    Some(Err(e)) => {
                        return Session::Ended { reason: e.to_string() };
                    }
                    None => {
                        return Session::Ended { reason: "stream ended".into() };
                    }
                    _ => {
                        // Binary, Pong, Frame -- ignore
                    }
                }
            }
        }
    }
}

// ── Message parsing ──────────────────────────────────────────────────

/// Decode a text frame and forward the payload event, if any.
///
/// Malformed frames and unrecognized message types are logged and
/// dropped; the connection stays alive.
async fn parse_and_forward(text: &str, event_tx: &mpsc::Sender<StreamEvent>) {
    let message: ServerMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            tracing::debug!(error = %e, "failed to parse stream message");
            return;
        }
    };

    let event = match message {
        ServerMessage::Subscribed { channels } => {
            tracing::debug!(?channels, "subscription acknowledged");
            StreamEvent::Subscribed { channels }
        }
        ServerMessage::Bridges { data } => StreamEvent::Bridges(data),
        ServerMessage::Boats { data } => StreamEvent::Boats(data),
        ServerMessage::Unknown => {
            tracing::debug!("ignoring unrecognized stream message type");
            return;
        }
    };

    forward(event_tx, event).await;
}

// ── Backoff calculation ──────────────────────────────────────────────

/// Exponential backoff with jitter.
///
/// `delay = min(base * 2^attempt + jitter, max)` where jitter lies in
/// `[0, 1000ms)`. Jitter spreads out reconnection storms from many
/// clients hitting the same outage.
fn calculate_backoff(attempt: u32, config: &ReconnectConfig) -> Duration {
    let base_ms = config.base_delay.as_millis() as f64 * 2.0_f64.powi(attempt.min(16) as i32);

    // Deterministic "jitter" seeded from the attempt number. Not
    // cryptographically random, but good enough for backoff spread.
    let jitter_ms = (f64::from(attempt.wrapping_add(1)) * 7.31).sin().abs() * 1000.0;

    let total = (base_ms + jitter_ms).min(config.max_delay.as_millis() as f64);
    Duration::from_millis(total as u64)
}

// ── Tests ────────────────────────────────────────────────────────────
