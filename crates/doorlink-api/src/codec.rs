//! Wire codec for the appliance protocol.
//!
//! Two message families share this module: the JSON bodies of the
//! control HTTP calls (`/status`, `/system`) and the frames exchanged
//! over the push channel. Encoding is total -- commands are built
//! internally, never from untrusted input. Decoding is also total:
//! anything the appliance sends that we don't recognize becomes
//! [`InboundMessage::Unknown`] instead of an error, because a garbled
//! frame must never take down the channel.

use serde::Deserialize;
use serde_json::json;

/// Fixed heartbeat payload sent every tick while the channel is open.
///
/// The appliance replies to a ping by re-sending both state frames,
/// but the reply is not used for liveness -- closure is detected via
/// the channel's own close/error events.
pub const HEARTBEAT_FRAME: &str = r#"{"message":"ping"}"#;

// ── Control commands ─────────────────────────────────────────────────

/// System-level operation accepted by the `/system` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemOp {
    Shutdown,
    Reboot,
    CheckUpdates,
}

impl SystemOp {
    /// Wire value for the `operation` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shutdown => "shutdown",
            Self::Reboot => "reboot",
            Self::CheckUpdates => "check-updates",
        }
    }
}

impl std::fmt::Display for SystemOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A control command issued by the user, one per action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Arm (`true`) or disarm (`false`) the alarm via `POST /status`.
    SetArmed(bool),
    /// Shutdown / reboot / update check via `POST /system`.
    System(SystemOp),
}

/// Serialize a control command to its JSON request body.
pub fn encode_command(command: &ControlCommand) -> String {
    match command {
        ControlCommand::SetArmed(armed) => json!({ "armed": armed }).to_string(),
        ControlCommand::System(op) => json!({ "operation": op.as_str() }).to_string(),
    }
}

// ── Inbound frames ───────────────────────────────────────────────────

/// A decoded push-channel frame, one per received text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundMessage {
    /// `{"type": "armed", "value": <bool>}` -- alarm armed/disarmed.
    Armed(bool),
    /// `{"type": "status", "value": <string>}` -- door status literal,
    /// normally `"OPEN"` or `"CLOSED"`. The literal is carried as-is;
    /// mapping to a door state (including unrecognized literals)
    /// happens in the reconciler.
    Status(String),
    /// Anything else: malformed JSON, missing `type`, unrecognized tag,
    /// or a recognized tag with a wrong-shaped `value`.
    Unknown {
        tag: Option<String>,
        raw: String,
    },
}

#[derive(Deserialize)]
struct InboundFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: serde_json::Value,
}

/// Decode a push-channel text frame.
///
/// Total: never fails and never panics. Unrecognized input decodes to
/// [`InboundMessage::Unknown`] carrying the tag (if one was present)
/// and the raw frame for logging.
pub fn decode_inbound(raw: &str) -> InboundMessage {
    let Ok(frame) = serde_json::from_str::<InboundFrame>(raw) else {
        return InboundMessage::Unknown {
            tag: None,
            raw: raw.to_string(),
        };
    };

    match frame.kind.as_str() {
        "armed" => match frame.value.as_bool() {
            Some(armed) => InboundMessage::Armed(armed),
            None => unknown(frame.kind, raw),
        },
        "status" => match frame.value.as_str() {
            Some(literal) => InboundMessage::Status(literal.to_string()),
            None => unknown(frame.kind, raw),
        },
        _ => unknown(frame.kind, raw),
    }
}

fn unknown(tag: String, raw: &str) -> InboundMessage {
    InboundMessage::Unknown {
        tag: Some(tag),
        raw: raw.to_string(),
    }
}

// ── Tests ────────────────────────────────────────────────────────────
