//! The message codec: a single discriminated `Message` enum covering
//! every inbound and outbound kind the controller exchanges with its
//! collaborators, plus the mailbox/sink abstractions a cycle reads
//! from and writes to. The protocol's vocabulary is small and closed,
//! so messages are a fixed set of named kinds rather than open-ended
//! named devices.

use crate::mode::AnnouncedMode;
use core::fmt;

/// Maximum number of messages the controller can emit in a single
/// cycle: a mode announcement, a valve toggle, one open/close per pump,
/// and one failure/repair-ack message per unit (water, steam, and two
/// per pump). Sized generously; `Controller::clock` never approaches it.
pub const MAX_OUTBOUND: usize = 32;

/// A single boiler-protocol message. Every kind carries at most the
/// parameters this protocol defines for it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Message {
    // -- inbound only --
    SteamBoilerWaiting,
    PhysicalUnitsReady,
    Level(f64),
    Steam(f64),
    PumpState { index: usize, on: bool },
    PumpControlState { index: usize, on: bool },
    LevelFailureAcknowledgement,
    SteamOutcomeFailureAcknowledgement,
    PumpFailureAcknowledgement { index: usize },
    PumpControlFailureAcknowledgement { index: usize },
    LevelRepaired,
    SteamRepaired,
    PumpRepaired { index: usize },
    PumpControlRepaired { index: usize },

    // -- outbound only --
    Mode(AnnouncedMode),
    ProgramReady,
    Valve,
    OpenPump { index: usize },
    ClosePump { index: usize },
    LevelFailureDetection,
    SteamFailureDetection,
    PumpFailureDetection { index: usize },
    PumpControlFailureDetection { index: usize },
    LevelRepairedAcknowledgement,
    SteamRepairedAcknowledgement,
    PumpRepairedAcknowledgement { index: usize },
    PumpControlRepairedAcknowledgement { index: usize },
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::SteamBoilerWaiting => write!(f, "STEAM_BOILER_WAITING"),
            Message::PhysicalUnitsReady => write!(f, "PHYSICAL_UNITS_READY"),
            Message::Level(v) => write!(f, "LEVEL_v={v}"),
            Message::Steam(v) => write!(f, "STEAM_v={v}"),
            Message::PumpState { index, on } => {
                write!(f, "PUMP_STATE_{index}_b={on}")
            }
            Message::PumpControlState { index, on } => {
                write!(f, "PUMP_CONTROL_STATE_{index}_b={on}")
            }
            Message::LevelFailureAcknowledgement => {
                write!(f, "LEVEL_FAILURE_ACKNOWLEDGEMENT")
            }
            Message::SteamOutcomeFailureAcknowledgement => {
                write!(f, "STEAM_OUTCOME_FAILURE_ACKNOWLEDGEMENT")
            }
            Message::PumpFailureAcknowledgement { index } => {
                write!(f, "PUMP_FAILURE_ACKNOWLEDGEMENT_{index}")
            }
            Message::PumpControlFailureAcknowledgement { index } => {
                write!(f, "PUMP_CONTROL_FAILURE_ACKNOWLEDGEMENT_{index}")
            }
            Message::LevelRepaired => write!(f, "LEVEL_REPAIRED"),
            Message::SteamRepaired => write!(f, "STEAM_REPAIRED"),
            Message::PumpRepaired { index } => {
                write!(f, "PUMP_REPAIRED_{index}")
            }
            Message::PumpControlRepaired { index } => {
                write!(f, "PUMP_CONTROL_REPAIRED_{index}")
            }
            Message::Mode(m) => write!(f, "MODE_m={m}"),
            Message::ProgramReady => write!(f, "PROGRAM_READY"),
            Message::Valve => write!(f, "VALVE"),
            Message::OpenPump { index } => write!(f, "OPEN_PUMP_{index}"),
            Message::ClosePump { index } => write!(f, "CLOSE_PUMP_{index}"),
            Message::LevelFailureDetection => {
                write!(f, "LEVEL_FAILURE_DETECTION")
            }
            Message::SteamFailureDetection => {
                write!(f, "STEAM_FAILURE_DETECTION")
            }
            Message::PumpFailureDetection { index } => {
                write!(f, "PUMP_FAILURE_DETECTION_{index}")
            }
            Message::PumpControlFailureDetection { index } => {
                write!(f, "PUMP_CONTROL_FAILURE_DETECTION_{index}")
            }
            Message::LevelRepairedAcknowledgement => {
                write!(f, "LEVEL_REPAIRED_ACKNOWLEDGEMENT")
            }
            Message::SteamRepairedAcknowledgement => {
                write!(f, "STEAM_REPAIRED_ACKNOWLEDGEMENT")
            }
            Message::PumpRepairedAcknowledgement { index } => {
                write!(f, "PUMP_REPAIRED_ACKNOWLEDGEMENT_{index}")
            }
            Message::PumpControlRepairedAcknowledgement { index } => {
                write!(f, "PUMP_CONTROL_REPAIRED_ACKNOWLEDGEMENT_{index}")
            }
        }
    }
}

/// A borrowed, ordered batch of inbound messages for a single cycle.
/// The controller reads it by index/scan; it never retains the
/// reference past the `clock` call that received it.
#[derive(Debug, Clone, Copy)]
pub struct Mailbox<'a> {
    messages: &'a [Message],
}

impl<'a> Mailbox<'a> {
    pub fn new(messages: &'a [Message]) -> Self {
        Mailbox { messages }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Message> {
        self.messages.iter()
    }

    pub fn contains(&self, pred: impl Fn(&Message) -> bool) -> bool {
        self.messages.iter().any(pred)
    }

    pub fn count(&self, pred: impl Fn(&Message) -> bool) -> usize {
        self.messages.iter().filter(|m| pred(m)).count()
    }
}

fn validate_index(index: usize) -> Result<(), crate::Error> {
    if index >= crate::MAX_PUMPS {
        Err(crate::Error::InvalidPumpIndex(index))
    } else {
        Ok(())
    }
}

impl Message {
    /// Builds a `PumpState` message, rejecting an index outside `0..MAX_PUMPS`.
    pub fn pump_state(index: usize, on: bool) -> Result<Message, crate::Error> {
        validate_index(index)?;
        Ok(Message::PumpState { index, on })
    }

    /// Builds a `PumpControlState` message, rejecting an index outside `0..MAX_PUMPS`.
    pub fn pump_control_state(index: usize, on: bool) -> Result<Message, crate::Error> {
        validate_index(index)?;
        Ok(Message::PumpControlState { index, on })
    }

    /// Builds a `PumpFailureAcknowledgement` message, rejecting an index outside `0..MAX_PUMPS`.
    pub fn pump_failure_acknowledgement(index: usize) -> Result<Message, crate::Error> {
        validate_index(index)?;
        Ok(Message::PumpFailureAcknowledgement { index })
    }

    /// Builds a `PumpControlFailureAcknowledgement` message, rejecting an index outside `0..MAX_PUMPS`.
    pub fn pump_control_failure_acknowledgement(index: usize) -> Result<Message, crate::Error> {
        validate_index(index)?;
        Ok(Message::PumpControlFailureAcknowledgement { index })
    }

    /// Builds a `PumpRepaired` message, rejecting an index outside `0..MAX_PUMPS`.
    pub fn pump_repaired(index: usize) -> Result<Message, crate::Error> {
        validate_index(index)?;
        Ok(Message::PumpRepaired { index })
    }

    /// Builds a `PumpControlRepaired` message, rejecting an index outside `0..MAX_PUMPS`.
    pub fn pump_control_repaired(index: usize) -> Result<Message, crate::Error> {
        validate_index(index)?;
        Ok(Message::PumpControlRepaired { index })
    }
}

/// A write-only sink for a single cycle's outbound messages. Backed by
/// a fixed-capacity buffer so a cycle never allocates.
#[derive(Debug, Default)]
pub struct OutboundSink {
    buf: heapless::Vec<Message, MAX_OUTBOUND>,
}

impl OutboundSink {
    pub fn new() -> Self {
        OutboundSink::default()
    }

    /// Clears the buffer so it can be reused for the next cycle.
    pub fn reset(&mut self) {
        self.buf.clear();
    }

    /// Appends a message. The buffer is sized so this never overflows
    /// in practice; if it somehow would, the message is dropped rather
    /// than panicking, since losing a diagnostic message is safer than
    /// aborting a safety-critical cycle.
    pub fn push(&mut self, msg: Message) {
        let _ = self.buf.push(msg);
    }

    pub fn messages(&self) -> &[Message] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mailbox_counts_and_finds() {
        let msgs = [
            Message::Level(500.0),
            Message::Steam(5.0),
            Message::PumpState { index: 0, on: true },
            Message::PumpState { index: 1, on: false },
        ];
        let mb = Mailbox::new(&msgs);

        assert_eq!(mb.count(|m| matches!(m, Message::PumpState { .. })), 2);
        assert!(mb.contains(|m| matches!(m, Message::Level(_))));
        assert!(!mb.contains(|m| matches!(m, Message::Valve)));
    }

    #[test]
    fn sink_reset_clears_buffer() {
        let mut sink = OutboundSink::new();

        sink.push(Message::Valve);
        sink.push(Message::ProgramReady);
        assert_eq!(sink.messages().len(), 2);

        sink.reset();
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn indexed_constructors_accept_in_range_indices() {
        assert_eq!(
            Message::pump_state(0, true),
            Ok(Message::PumpState { index: 0, on: true })
        );
    }

    #[test]
    fn indexed_constructors_reject_out_of_range_indices() {
        let err = Message::pump_repaired(crate::MAX_PUMPS).unwrap_err();
        assert_eq!(err, crate::Error::InvalidPumpIndex(crate::MAX_PUMPS));
    }
}
