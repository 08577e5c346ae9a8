//! Session lifecycle: one push channel, one reconciler, one command path.
//!
//! `AlarmSession` is the single entry point for consumers. It owns the
//! channel handle and the control client, and funnels every state
//! mutation -- channel events and command acks alike -- through one
//! `Mutex<Reconciler>`, so mutations are serialized even on a
//! multi-threaded runtime.

use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use doorlink_api::channel::{
    ChannelConfig, ChannelEvent, LinkState, PushChannel, push_channel_url,
};
use doorlink_api::codec::{ControlCommand, SystemOp};
use doorlink_api::control::ControlClient;
use doorlink_api::transport::TransportConfig;

use crate::error::CoreError;
use crate::reconciler::{Reconciler, StateSink};
use crate::state::{ArmedState, DoorState};

/// A live client session against one appliance.
///
/// Created from the appliance base URL; the push-channel URL is derived
/// from it (same host, `ws`/`wss` mirroring the HTTP scheme, path `/ws`).
pub struct AlarmSession {
    reconciler: Arc<Mutex<Reconciler>>,
    control: ControlClient,
    channel: PushChannel,
    cancel: CancellationToken,
    pump: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl AlarmSession {
    /// Build a session. Does not open the push channel -- call
    /// [`connect`](Self::connect) for live updates; the control commands
    /// work without it.
    pub fn new(
        base_url: Url,
        transport: &TransportConfig,
        channel_config: ChannelConfig,
        sink: Box<dyn StateSink>,
    ) -> Result<Self, CoreError> {
        let control = ControlClient::new(base_url.clone(), transport)?;
        let ws_url = push_channel_url(&base_url)?;
        let cancel = CancellationToken::new();
        let channel = PushChannel::new(ws_url, channel_config, cancel.clone());

        Ok(Self {
            reconciler: Arc::new(Mutex::new(Reconciler::new(sink))),
            control,
            channel,
            cancel,
            pump: std::sync::Mutex::new(None),
        })
    }

    /// Open the push channel and start routing its events into the
    /// reconciler. Idempotent, and a no-op after [`shutdown`](Self::shutdown).
    /// Returns `true` if the channel was started by this call.
    pub fn connect(&self) -> bool {
        let rx = self.channel.subscribe();
        if !self.channel.connect() {
            return false;
        }

        let handle = tokio::spawn(route_events(
            rx,
            Arc::clone(&self.reconciler),
            self.cancel.clone(),
        ));
        *self.pump.lock().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(handle);
        true
    }

    /// Arm or disarm the alarm and reconcile the acknowledged state.
    ///
    /// The HTTP ack is authoritative and applies even while the push
    /// channel is down. On error, nothing is mutated -- the command may
    /// be retried manually.
    pub async fn set_armed(&self, armed: bool) -> Result<ArmedState, CoreError> {
        let command = ControlCommand::SetArmed(armed);
        let ack = self.control.set_armed(armed).await?;

        let mut rec = self.reconciler.lock().await;
        rec.on_command_ack(&command, Some(ack));
        Ok(rec.current_armed())
    }

    /// Run a system operation. The opaque result is returned as-is and
    /// never affects armed/door state.
    pub async fn system_operation(&self, op: SystemOp) -> Result<String, CoreError> {
        Ok(self.control.system_operation(op).await?)
    }

    /// Current armed state.
    pub async fn armed(&self) -> ArmedState {
        self.reconciler.lock().await.current_armed()
    }

    /// Current door state.
    pub async fn door(&self) -> DoorState {
        self.reconciler.lock().await.current_door()
    }

    /// Watch the push-channel link state.
    pub fn link_state(&self) -> watch::Receiver<LinkState> {
        self.channel.link_state()
    }

    /// Tear down the session: stops the channel (heartbeat and pending
    /// reconnect included) and the event pump. Idempotent;
    /// [`connect`](Self::connect) is a no-op afterwards.
    pub fn shutdown(&self) {
        debug!("shutting down session");
        self.cancel.cancel();
    }
}

/// Pump channel events into the reconciler until cancelled.
async fn route_events(
    mut rx: broadcast::Receiver<ChannelEvent>,
    reconciler: Arc<Mutex<Reconciler>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            event = rx.recv() => match event {
                Ok(ChannelEvent::Opened) => reconciler.lock().await.on_link_opened(),
                Ok(ChannelEvent::Closed) => reconciler.lock().await.on_link_closed(),
                Ok(ChannelEvent::Inbound(msg)) => reconciler.lock().await.on_inbound(&msg),
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    // A missed Closed must not leave a stale known value;
                    // the next push refreshes whatever was dropped.
                    warn!(missed, "event pump lagged, downgrading states");
                    reconciler.lock().await.on_link_closed();
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    }
    debug!("event pump exiting");
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use doorlink_api::codec::InboundMessage;

    use super::*;

    struct NullSink;
    impl StateSink for NullSink {
        fn render_armed(&mut self, _: ArmedState) {}
        fn render_door(&mut self, _: DoorState) {}
    }

    fn reconciler() -> Arc<Mutex<Reconciler>> {
        Arc::new(Mutex::new(Reconciler::new(Box::new(NullSink))))
    }

    #[tokio::test]
    async fn pump_applies_events_in_order() {
        let (tx, rx) = broadcast::channel(8);
        let rec = reconciler();
        let cancel = CancellationToken::new();
        let pump = tokio::spawn(route_events(rx, Arc::clone(&rec), cancel.clone()));

        tx.send(ChannelEvent::Opened).unwrap();
        tx.send(ChannelEvent::Inbound(InboundMessage::Armed(true))).unwrap();
        tx.send(ChannelEvent::Inbound(InboundMessage::Status("OPEN".into())))
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(rec.lock().await.current_armed(), ArmedState::Armed);
        assert_eq!(rec.lock().await.current_door(), DoorState::Open);

        tx.send(ChannelEvent::Closed).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(rec.lock().await.current_armed(), ArmedState::Unknown);
        assert_eq!(rec.lock().await.current_door(), DoorState::Unknown);

        cancel.cancel();
        pump.await.unwrap();
    }

    #[tokio::test]
    async fn pump_lag_downgrades_states() {
        // Capacity 2, three sends before the pump starts: the first
        // recv yields Lagged, which must force states to unknown
        // before the surviving events are applied.
        let (tx, rx) = broadcast::channel(2);
        let rec = reconciler();

        tx.send(ChannelEvent::Inbound(InboundMessage::Armed(true))).unwrap();
        tx.send(ChannelEvent::Inbound(InboundMessage::Status("OPEN".into())))
            .unwrap();
        tx.send(ChannelEvent::Inbound(InboundMessage::Armed(false))).unwrap();

        let cancel = CancellationToken::new();
        let pump = tokio::spawn(route_events(rx, Arc::clone(&rec), cancel.clone()));
        tokio::time::sleep(Duration::from_millis(50)).await;

        // The dropped Armed(true) never lands; the survivors do.
        assert_eq!(rec.lock().await.current_armed(), ArmedState::Disarmed);
        assert_eq!(rec.lock().await.current_door(), DoorState::Open);

        cancel.cancel();
        pump.await.unwrap();
    }

    #[tokio::test]
    async fn pump_stops_when_sender_is_dropped() {
        let (tx, rx) = broadcast::channel(8);
        let rec = reconciler();
        let pump = tokio::spawn(route_events(rx, rec, CancellationToken::new()));

        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), pump)
            .await
            .expect("pump should exit when the channel closes")
            .unwrap();
    }
}
