//! A JSON-friendly description of one cycle's inbound batch, used only
//! by the demonstration harness in `main.rs` to replay canned
//! scenarios. The controller itself never sees this type -- it reads
//! `boiler_api::Message` batches built from it.

use boiler_api::{Error, Message};
use serde_derive::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ScenarioCycle {
    pub level: f64,
    pub steam: f64,
    pub pump_state: Vec<bool>,
    pub pump_control_state: Vec<bool>,
    #[serde(default)]
    pub steam_boiler_waiting: bool,
    #[serde(default)]
    pub physical_units_ready: bool,
    #[serde(default)]
    pub level_failure_ack: bool,
    #[serde(default)]
    pub steam_failure_ack: bool,
    #[serde(default)]
    pub pump_failure_ack: Vec<usize>,
    #[serde(default)]
    pub pump_control_failure_ack: Vec<usize>,
    #[serde(default)]
    pub level_repaired: bool,
    #[serde(default)]
    pub steam_repaired: bool,
    #[serde(default)]
    pub pump_repaired: Vec<usize>,
    #[serde(default)]
    pub pump_control_repaired: Vec<usize>,
}

impl ScenarioCycle {
    /// Builds this cycle's inbound message batch. Sized generously;
    /// a single cycle never comes close to filling it. Fails if any
    /// pump index in the scenario file falls outside `0..MAX_PUMPS`.
    pub fn into_messages(&self) -> Result<heapless::Vec<Message, 64>, Error> {
        let mut out: heapless::Vec<Message, 64> = heapless::Vec::new();

        let _ = out.push(Message::Level(self.level));
        let _ = out.push(Message::Steam(self.steam));

        for (index, &on) in self.pump_state.iter().enumerate() {
            let _ = out.push(Message::pump_state(index, on)?);
        }
        for (index, &on) in self.pump_control_state.iter().enumerate() {
            let _ = out.push(Message::pump_control_state(index, on)?);
        }

        if self.steam_boiler_waiting {
            let _ = out.push(Message::SteamBoilerWaiting);
        }
        if self.physical_units_ready {
            let _ = out.push(Message::PhysicalUnitsReady);
        }
        if self.level_failure_ack {
            let _ = out.push(Message::LevelFailureAcknowledgement);
        }
        if self.steam_failure_ack {
            let _ = out.push(Message::SteamOutcomeFailureAcknowledgement);
        }
        for &index in &self.pump_failure_ack {
            let _ = out.push(Message::pump_failure_acknowledgement(index)?);
        }
        for &index in &self.pump_control_failure_ack {
            let _ = out.push(Message::pump_control_failure_acknowledgement(index)?);
        }
        if self.level_repaired {
            let _ = out.push(Message::LevelRepaired);
        }
        if self.steam_repaired {
            let _ = out.push(Message::SteamRepaired);
        }
        for &index in &self.pump_repaired {
            let _ = out.push(Message::pump_repaired(index)?);
        }
        for &index in &self.pump_control_repaired {
            let _ = out.push(Message::pump_control_repaired(index)?);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_the_mandatory_readings_plus_requested_signals() {
        let cycle = ScenarioCycle {
            level: 500.0,
            steam: 5.0,
            pump_state: vec![true, false],
            pump_control_state: vec![true, false],
            steam_boiler_waiting: true,
            physical_units_ready: false,
            level_failure_ack: false,
            steam_failure_ack: false,
            pump_failure_ack: vec![],
            pump_control_failure_ack: vec![],
            level_repaired: false,
            steam_repaired: false,
            pump_repaired: vec![],
            pump_control_repaired: vec![],
        };

        let msgs = cycle.into_messages().expect("valid pump indices");
        assert!(msgs.contains(&Message::Level(500.0)));
        assert!(msgs.contains(&Message::SteamBoilerWaiting));
        assert!(!msgs.contains(&Message::PhysicalUnitsReady));
    }

    #[test]
    fn rejects_a_pump_index_out_of_range() {
        let cycle = ScenarioCycle {
            level: 500.0,
            steam: 5.0,
            pump_state: vec![true; boiler_api::MAX_PUMPS + 1],
            pump_control_state: vec![],
            steam_boiler_waiting: false,
            physical_units_ready: false,
            level_failure_ack: false,
            steam_failure_ack: false,
            pump_failure_ack: vec![],
            pump_control_failure_ack: vec![],
            level_repaired: false,
            steam_repaired: false,
            pump_repaired: vec![],
            pump_control_repaired: vec![],
        };

        assert_eq!(
            cycle.into_messages(),
            Err(Error::InvalidPumpIndex(boiler_api::MAX_PUMPS))
        );
    }
}
