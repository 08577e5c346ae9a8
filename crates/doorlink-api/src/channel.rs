//! Push channel with auto-reconnect.
//!
//! Connects to the appliance's `/ws` endpoint and streams decoded
//! [`InboundMessage`]s through a [`tokio::sync::broadcast`] channel,
//! sending a heartbeat ping while open. On close or error the channel
//! reconnects after a fixed delay, indefinitely.
//!
//! The reconnect policy is deliberately a fixed 1-second delay with no
//! backoff growth and no retry cap: the link is to a single appliance
//! on the local network, and availability wins over congestion
//! avoidance. Do not change this to exponential backoff.
//!
//! # Example
//!
//! ```rust,ignore
//! use doorlink_api::channel::{ChannelConfig, ChannelEvent, PushChannel, push_channel_url};
//! use tokio_util::sync::CancellationToken;
//! use url::Url;
//!
//! let base: Url = "http://alarm.local:8080".parse()?;
//! let cancel = CancellationToken::new();
//! let channel = PushChannel::new(push_channel_url(&base)?, ChannelConfig::default(), cancel);
//!
//! let mut rx = channel.subscribe();
//! channel.connect();
//!
//! while let Ok(event) = rx.recv().await {
//!     match event {
//!         ChannelEvent::Inbound(msg) => println!("{msg:?}"),
//!         ChannelEvent::Opened | ChannelEvent::Closed => {}
//!     }
//! }
//!
//! channel.shutdown();
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, watch};
use tokio_tungstenite::tungstenite;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::codec::{self, InboundMessage};
use crate::error::Error;

// ── Broadcast channel capacity ───────────────────────────────────────

const EVENT_CHANNEL_CAPACITY: usize = 64;

// ── LinkState ────────────────────────────────────────────────────────

/// Liveness of the push channel, independent of the alarm's own state.
///
/// Owned exclusively by the [`PushChannel`]; observable via
/// [`PushChannel::link_state`]. Transitions for the lifetime of the
/// process, never destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Connecting,
    Open,
    Closed,
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        })
    }
}

// ── ChannelEvent ─────────────────────────────────────────────────────

/// Event emitted to subscribers.
///
/// `Opened`/`Closed` bracket each connection; consumers downgrade their
/// view of the appliance to unknown on `Closed`. Frames that decode to
/// [`InboundMessage::Unknown`] are logged and dropped before this point
/// and never reach subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    Opened,
    Closed,
    Inbound(InboundMessage),
}

// ── ChannelConfig ────────────────────────────────────────────────────

/// Timing configuration for the push channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Fixed delay between a drop and the next connect attempt.
    /// Default: 1s. No backoff growth, no retry cap.
    pub reconnect_delay: Duration,

    /// Heartbeat ping cadence while the channel is open. Default: 5s.
    pub heartbeat_interval: Duration,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            reconnect_delay: Duration::from_secs(1),
            heartbeat_interval: Duration::from_secs(5),
        }
    }
}

// ── URL mapping ──────────────────────────────────────────────────────

/// Derive the push-channel URL from the appliance base URL.
///
/// Mirrors the serving scheme: `https` maps to `wss`, `http` to `ws`,
/// with the path fixed at `/ws`. Any other scheme is rejected.
pub fn push_channel_url(base: &Url) -> Result<Url, Error> {
    let scheme = match base.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(Error::UnsupportedScheme {
                scheme: other.to_string(),
            });
        }
    };

    let mut url = base.clone();
    url.set_scheme(scheme).map_err(|()| Error::UnsupportedScheme {
        scheme: base.scheme().to_string(),
    })?;
    url.set_path("/ws");
    url.set_query(None);
    Ok(url)
}

// ── PushChannel ──────────────────────────────────────────────────────

/// Single-owner handle to the push channel.
///
/// At most one live connection exists at a time: [`connect`](Self::connect)
/// is idempotent, and [`shutdown`](Self::shutdown) makes it a permanent
/// no-op. Earlier revisions of this system kept the socket handle in
/// ambient scope and could race a second connection into existence;
/// the guard here is the explicit replacement for that pattern.
pub struct PushChannel {
    url: Url,
    config: ChannelConfig,
    event_tx: broadcast::Sender<ChannelEvent>,
    link_tx: watch::Sender<LinkState>,
    cancel: CancellationToken,
    running: AtomicBool,
}

impl PushChannel {
    /// Create a channel handle. Does not connect -- call
    /// [`connect`](Self::connect) from within a tokio runtime.
    pub fn new(url: Url, config: ChannelConfig, cancel: CancellationToken) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let (link_tx, _) = watch::channel(LinkState::Closed);
        Self {
            url,
            config,
            event_tx,
            link_tx,
            cancel,
            running: AtomicBool::new(false),
        }
    }

    /// Spawn the connect/read/reconnect loop.
    ///
    /// Returns `true` if a new channel task was started. Calling this
    /// while a task is already alive, or after [`shutdown`](Self::shutdown),
    /// is a no-op returning `false` -- there is never a second live
    /// channel.
    pub fn connect(&self) -> bool {
        if self.cancel.is_cancelled() {
            tracing::debug!("push channel is shut down, ignoring connect");
            return false;
        }
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::debug!("push channel already running, ignoring connect");
            return false;
        }

        let url = self.url.clone();
        let config = self.config.clone();
        let event_tx = self.event_tx.clone();
        let link_tx = self.link_tx.clone();
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            channel_loop(&url, &config, &event_tx, &link_tx, &cancel).await;
        });
        true
    }

    /// Get a new broadcast receiver for channel events.
    ///
    /// Subscribe before calling [`connect`](Self::connect) to observe the
    /// first `Opened`. A consumer that falls behind receives
    /// [`broadcast::error::RecvError::Lagged`].
    pub fn subscribe(&self) -> broadcast::Receiver<ChannelEvent> {
        self.event_tx.subscribe()
    }

    /// Watch the link state (connecting / open / closed).
    pub fn link_state(&self) -> watch::Receiver<LinkState> {
        self.link_tx.subscribe()
    }

    /// Whether a channel task has been started and not shut down.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst) && !self.cancel.is_cancelled()
    }

    /// Tear down the channel: cancels the heartbeat and any pending
    /// reconnect, and makes [`connect`](Self::connect) a no-op thereafter.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }
}

// ── Background reconnection loop ─────────────────────────────────────

/// Main loop: connect → read/heartbeat → on drop, fixed delay → reconnect.
async fn channel_loop(
    url: &Url,
    config: &ChannelConfig,
    event_tx: &broadcast::Sender<ChannelEvent>,
    link_tx: &watch::Sender<LinkState>,
    cancel: &CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = run_connection(url, config, event_tx, link_tx, cancel) => {
                match result {
                    Ok(()) => tracing::info!("push channel closed, reconnecting"),
                    Err(e) => tracing::warn!(error = %e, "push channel error"),
                }

                // Force the "states unknown while disconnected" rule at
                // the instant of disconnect, not lazily.
                link_tx.send_replace(LinkState::Closed);
                let _ = event_tx.send(ChannelEvent::Closed);

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = tokio::time::sleep(config.reconnect_delay) => {}
                }
            }
        }
    }

    link_tx.send_replace(LinkState::Closed);
    tracing::debug!("push channel loop exiting");
}

// ── Single connection lifecycle ──────────────────────────────────────

/// Establish one connection, then read frames and send heartbeats until
/// it drops. A heartbeat send failure is treated exactly like a close.
async fn run_connection(
    url: &Url,
    config: &ChannelConfig,
    event_tx: &broadcast::Sender<ChannelEvent>,
    link_tx: &watch::Sender<LinkState>,
    cancel: &CancellationToken,
) -> Result<(), Error> {
    tracing::info!(url = %url, "connecting to push channel");
    link_tx.send_replace(LinkState::Connecting);

    let uri: tungstenite::http::Uri = url
        .as_str()
        .parse()
        .map_err(|e: tungstenite::http::uri::InvalidUri| Error::ChannelConnect(e.to_string()))?;

    let (ws_stream, _response) = tokio_tungstenite::connect_async(uri)
        .await
        .map_err(|e| Error::ChannelConnect(e.to_string()))?;

    tracing::info!("push channel open");
    link_tx.send_replace(LinkState::Open);
    let _ = event_tx.send(ChannelEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    let mut heartbeat = tokio::time::interval(config.heartbeat_interval);
    heartbeat.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately; consume it so pings start
    // one full interval after open.
    heartbeat.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(()),
            _ = heartbeat.tick() => {
                write
                    .send(tungstenite::Message::Text(codec::HEARTBEAT_FRAME.into()))
                    .await
                    .map_err(|e| Error::ChannelConnect(format!("heartbeat send failed: {e}")))?;
                tracing::trace!("heartbeat sent");
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(tungstenite::Message::Text(text))) => {
                        match codec::decode_inbound(&text) {
                            InboundMessage::Unknown { tag, raw } => {
                                tracing::debug!(
                                    tag = tag.as_deref().unwrap_or("<none>"),
                                    raw = %raw,
                                    "dropping unrecognized frame"
                                );
                            }
                            msg => {
                                // Ignore send errors -- no active subscribers.
                                let _ = event_tx.send(ChannelEvent::Inbound(msg));
                            }
                        }
                    }
                    Some(Ok(tungstenite::Message::Ping(_))) => {
                        // tungstenite replies with a pong automatically
                        tracing::trace!("ws ping");
                    }
                    Some(Ok(tungstenite::Message::Close(frame))) => {
                        if let Some(ref cf) = frame {
                            tracing::info!(code = %cf.code, reason = %cf.reason, "close frame received");
                        } else {
                            tracing::info!("close frame received (no payload)");
                        }
                        return Ok(());
                    }
                    Some(Err(e)) => {
                        return Err(Error::ChannelConnect(e.to_string()));
                    }
                    None => {
                        tracing::info!("push channel stream ended");
                        return Ok(());
                    }
                    _ => {
                        // Binary, Pong, Frame -- ignore
                    }
                }
            }
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
