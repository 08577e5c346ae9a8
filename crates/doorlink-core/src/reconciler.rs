//! Authoritative client-side view of the appliance state.
//!
//! The reconciler is a pure state holder: no sockets, no timers. It is
//! driven by the push channel's dispatched messages and by command
//! acknowledgements, and it renders through a [`StateSink`] observer.
//! This replaces the original pattern of mutating the page directly
//! inside socket handlers -- the state machine here is auditable and
//! testable headlessly.

use tracing::{debug, trace};

use doorlink_api::codec::{ControlCommand, InboundMessage};

use crate::state::{ArmedState, DoorState};

/// Render target for state transitions (the UI sink).
///
/// Each method is invoked exactly once per actual value change; a
/// mutation that leaves the value unchanged renders nothing. `Unknown`
/// maps to a visually neutral/warning presentation distinct from both
/// known states.
pub trait StateSink: Send {
    fn render_armed(&mut self, state: ArmedState);
    fn render_door(&mut self, state: DoorState);
}

/// Reconciles pushed events, command acks, and link transitions into
/// the two observable states.
///
/// Both states start `Unknown` and are forced back to `Unknown` the
/// instant the link closes -- synchronously, before any other observer
/// can read a stale value.
pub struct Reconciler {
    armed: ArmedState,
    door: DoorState,
    sink: Box<dyn StateSink>,
}

impl Reconciler {
    pub fn new(sink: Box<dyn StateSink>) -> Self {
        Self {
            armed: ArmedState::Unknown,
            door: DoorState::Unknown,
            sink,
        }
    }

    /// The link came up. States stay as they are (`Unknown` after a
    /// disconnect) until the next push or ack supplies a value.
    pub fn on_link_opened(&mut self) {
        debug!("link open");
    }

    /// The link went down: both states become `Unknown` immediately.
    pub fn on_link_closed(&mut self) {
        debug!("link closed, downgrading states to unknown");
        self.set_armed(ArmedState::Unknown);
        self.set_door(DoorState::Unknown);
    }

    /// Apply a pushed event from the channel.
    pub fn on_inbound(&mut self, message: &InboundMessage) {
        match message {
            InboundMessage::Armed(flag) => self.set_armed(ArmedState::from_flag(*flag)),
            InboundMessage::Status(literal) => self.set_door(DoorState::from_literal(literal)),
            InboundMessage::Unknown { tag, .. } => {
                trace!(tag = tag.as_deref().unwrap_or("<none>"), "ignoring unknown message");
            }
        }
    }

    /// Apply a control-command acknowledgement.
    ///
    /// The synchronous HTTP ack for a set-armed command is authoritative
    /// and independent of the push channel -- it applies even while the
    /// link is closed. System operations never touch state; their
    /// results are surfaced to the caller, not here.
    pub fn on_command_ack(&mut self, command: &ControlCommand, response_armed: Option<bool>) {
        match (command, response_armed) {
            (ControlCommand::SetArmed(_), Some(armed)) => {
                self.set_armed(ArmedState::from_flag(armed));
            }
            (ControlCommand::SetArmed(_), None) => {
                // Absence of evidence is not evidence of a state change.
                debug!("set-armed ack without an armed flag, state unchanged");
            }
            (ControlCommand::System(op), _) => {
                debug!(operation = %op, "system ack, no state change");
            }
        }
    }

    pub fn current_armed(&self) -> ArmedState {
        self.armed
    }

    pub fn current_door(&self) -> DoorState {
        self.door
    }

    fn set_armed(&mut self, next: ArmedState) {
        if self.armed != next {
            self.armed = next;
            self.sink.render_armed(next);
        }
    }

    fn set_door(&mut self, next: DoorState) {
        if self.door != next {
            self.door = next;
            self.sink.render_door(next);
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────
