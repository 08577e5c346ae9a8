//! Terminal rendering of state transitions.
//!
//! Mirrors the original status page's alert styling: success-green for
//! a safe known state, danger-red for an open door, warning-yellow for
//! unknown.

use owo_colors::OwoColorize;

use doorlink_core::{ArmedState, DoorState, StateSink};

pub struct TerminalSink;

impl StateSink for TerminalSink {
    fn render_armed(&mut self, state: ArmedState) {
        match state {
            ArmedState::Armed => println!("{}", "System Armed".green().bold()),
            ArmedState::Disarmed => println!("{}", "System Disarmed".yellow()),
            ArmedState::Unknown => println!("{}", "System Arming Unknown".yellow().dimmed()),
        }
    }

    fn render_door(&mut self, state: DoorState) {
        match state {
            DoorState::Open => println!("{}", "Door Open".red().bold()),
            DoorState::Closed => println!("{}", "Door Closed".green()),
            DoorState::Unknown => println!("{}", "Door Status Unknown".yellow().dimmed()),
        }
    }
}
