//! Extracts a validated `CycleInputs` snapshot from a cycle's inbound
//! mailbox. A cycle whose sensor and actuator readings don't form a
//! complete, unambiguous batch is a transmission failure and has no
//! `CycleInputs` at all -- the caller drives the controller straight
//! to `EmergencyStop`.

use boiler_api::{Mailbox, Message, MAX_PUMPS};

/// One cycle's worth of inbound readings and handshake signals, with
/// the ambiguity of raw messages already resolved.
#[derive(Debug, Clone, Copy)]
pub struct CycleInputs {
    pub level: f64,
    pub steam: f64,
    pub pump_state: [bool; MAX_PUMPS],
    pub pump_control_state: [bool; MAX_PUMPS],

    pub steam_boiler_waiting: bool,
    pub physical_units_ready: bool,

    pub level_failure_ack: bool,
    pub steam_failure_ack: bool,
    pub pump_failure_ack: [bool; MAX_PUMPS],
    pub pump_control_failure_ack: [bool; MAX_PUMPS],

    pub level_repaired: bool,
    pub steam_repaired: bool,
    pub pump_repaired: [bool; MAX_PUMPS],
    pub pump_control_repaired: [bool; MAX_PUMPS],
}

/// Extracts and validates a cycle's inbound batch. Returns `None` if
/// the batch is missing, duplicates, or misindexes any of the
/// mandatory sensor/actuator readings: exactly one `LEVEL_v`, one
/// `STEAM_v`, and one `PUMP_STATE`/`PUMP_CONTROL_STATE` per pump index
/// in `0..pump_count`.
pub fn extract(mailbox: &Mailbox<'_>, pump_count: usize) -> Option<CycleInputs> {
    let mut level: Option<f64> = None;
    let mut steam: Option<f64> = None;
    let mut pump_state: [Option<bool>; MAX_PUMPS] = [None; MAX_PUMPS];
    let mut pump_control_state: [Option<bool>; MAX_PUMPS] = [None; MAX_PUMPS];

    let mut inputs = CycleInputs {
        level: 0.0,
        steam: 0.0,
        pump_state: [false; MAX_PUMPS],
        pump_control_state: [false; MAX_PUMPS],
        steam_boiler_waiting: false,
        physical_units_ready: false,
        level_failure_ack: false,
        steam_failure_ack: false,
        pump_failure_ack: [false; MAX_PUMPS],
        pump_control_failure_ack: [false; MAX_PUMPS],
        level_repaired: false,
        steam_repaired: false,
        pump_repaired: [false; MAX_PUMPS],
        pump_control_repaired: [false; MAX_PUMPS],
    };

    for msg in mailbox.iter() {
        match *msg {
            Message::Level(v) => {
                if level.is_some() {
                    return None;
                }
                level = Some(v);
            }
            Message::Steam(v) => {
                if steam.is_some() {
                    return None;
                }
                steam = Some(v);
            }
            Message::PumpState { index, on } => {
                if index >= pump_count || pump_state[index].is_some() {
                    return None;
                }
                pump_state[index] = Some(on);
            }
            Message::PumpControlState { index, on } => {
                if index >= pump_count || pump_control_state[index].is_some() {
                    return None;
                }
                pump_control_state[index] = Some(on);
            }
            Message::SteamBoilerWaiting => inputs.steam_boiler_waiting = true,
            Message::PhysicalUnitsReady => inputs.physical_units_ready = true,
            Message::LevelFailureAcknowledgement => inputs.level_failure_ack = true,
            Message::SteamOutcomeFailureAcknowledgement => inputs.steam_failure_ack = true,
            Message::PumpFailureAcknowledgement { index } if index < pump_count => {
                inputs.pump_failure_ack[index] = true;
            }
            Message::PumpControlFailureAcknowledgement { index } if index < pump_count => {
                inputs.pump_control_failure_ack[index] = true;
            }
            Message::LevelRepaired => inputs.level_repaired = true,
            Message::SteamRepaired => inputs.steam_repaired = true,
            Message::PumpRepaired { index } if index < pump_count => {
                inputs.pump_repaired[index] = true;
            }
            Message::PumpControlRepaired { index } if index < pump_count => {
                inputs.pump_control_repaired[index] = true;
            }
            _ => {}
        }
    }

    inputs.level = level?;
    inputs.steam = steam?;

    for i in 0..pump_count {
        inputs.pump_state[i] = pump_state[i]?;
        inputs.pump_control_state[i] = pump_control_state[i]?;
    }

    Some(inputs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(extra: &[Message]) -> heapless::Vec<Message, 16> {
        let mut v: heapless::Vec<Message, 16> = heapless::Vec::new();
        v.push(Message::Level(500.0)).unwrap();
        v.push(Message::Steam(5.0)).unwrap();
        for i in 0..2 {
            v.push(Message::PumpState { index: i, on: false }).unwrap();
            v.push(Message::PumpControlState { index: i, on: false })
                .unwrap();
        }
        for m in extra {
            v.push(*m).unwrap();
        }
        v
    }

    #[test]
    fn accepts_a_complete_batch() {
        let msgs = batch(&[]);
        let mb = Mailbox::new(&msgs);
        let inputs = extract(&mb, 2).expect("complete batch");
        assert_eq!(inputs.level, 500.0);
        assert_eq!(inputs.steam, 5.0);
    }

    #[test]
    fn rejects_a_duplicate_level_reading() {
        let msgs = batch(&[Message::Level(600.0)]);
        let mb = Mailbox::new(&msgs);
        assert!(extract(&mb, 2).is_none());
    }

    #[test]
    fn rejects_a_missing_pump_state() {
        let mut msgs: heapless::Vec<Message, 16> = heapless::Vec::new();
        msgs.push(Message::Level(500.0)).unwrap();
        msgs.push(Message::Steam(5.0)).unwrap();
        msgs.push(Message::PumpState { index: 0, on: false }).unwrap();
        msgs.push(Message::PumpControlState { index: 0, on: false })
            .unwrap();
        msgs.push(Message::PumpControlState { index: 1, on: false })
            .unwrap();
        let mb = Mailbox::new(&msgs);
        assert!(extract(&mb, 2).is_none());
    }

    #[test]
    fn rejects_a_pump_index_out_of_range() {
        let msgs = batch(&[Message::PumpState { index: 5, on: true }]);
        let mb = Mailbox::new(&msgs);
        assert!(extract(&mb, 2).is_none());
    }

    #[test]
    fn carries_handshake_signals_through() {
        let msgs = batch(&[Message::LevelRepaired, Message::PumpFailureAcknowledgement { index: 1 }]);
        let mb = Mailbox::new(&msgs);
        let inputs = extract(&mb, 2).expect("complete batch");
        assert!(inputs.level_repaired);
        assert!(inputs.pump_failure_ack[1]);
        assert!(!inputs.pump_failure_ack[0]);
    }
}
