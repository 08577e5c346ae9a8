//! Tri-state domain model for the two observable appliance facts.
//!
//! Both states initialize to `Unknown` and are forced back to `Unknown`
//! whenever the push channel leaves the open state -- a known value
//! must never outlive the link that vouched for it.

/// Alarm armed/disarmed state, authoritative on the appliance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArmedState {
    Armed,
    Disarmed,
    #[default]
    Unknown,
}

impl ArmedState {
    /// Map the wire boolean (pushed event or `/status` ack) to a state.
    pub fn from_flag(armed: bool) -> Self {
        if armed { Self::Armed } else { Self::Disarmed }
    }
}

impl std::fmt::Display for ArmedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Armed => "armed",
            Self::Disarmed => "disarmed",
            Self::Unknown => "unknown",
        })
    }
}

/// Door sensor state.
///
/// There is no command that sets this; it only ever comes from pushed
/// `status` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DoorState {
    Open,
    Closed,
    #[default]
    Unknown,
}

impl DoorState {
    /// Map a pushed door literal to a state. Anything outside
    /// `OPEN`/`CLOSED` is unknown, not an error.
    pub fn from_literal(literal: &str) -> Self {
        match literal {
            "OPEN" => Self::Open,
            "CLOSED" => Self::Closed,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for DoorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Unknown => "unknown",
        })
    }
}
