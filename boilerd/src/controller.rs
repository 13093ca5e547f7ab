//! The cyclic controller: extracts a cycle's inputs, diagnoses faults,
//! acts according to the current mode, and emits that cycle's outbound
//! batch. All mutable state lives in one struct and is advanced through
//! small, separately-tested pure methods.

use boiler_api::{Config, Mailbox, Message, Mode, OutboundSink, Result, MAX_PUMPS};

use crate::diagnosis::{self, Attribution, FailureType, WaterEvidence};
use crate::extract::{self, CycleInputs};
use crate::prediction;
use crate::repair::{FailState, Handshake};

const ALL_OFF: [bool; MAX_PUMPS] = [false; MAX_PUMPS];

/// Decides the next `Normal`/`Degraded`/`Rescue` mode from the current
/// mode and the units' failure states. Water failures dominate; any
/// other active failure holds the mode at `Degraded`; no active
/// failures returns it to `Normal`. A no-op outside those three modes.
pub fn recompute_mode(current: Mode, water_failed: bool, others_failed: bool) -> Mode {
    match current {
        Mode::Normal | Mode::Degraded | Mode::Rescue => {
            if water_failed {
                Mode::Rescue
            } else if others_failed {
                Mode::Degraded
            } else {
                Mode::Normal
            }
        }
        other => other,
    }
}

/// The controller's full mutable state across cycles.
pub struct Controller {
    config: Config,
    mode: Mode,

    pump_commanded: [bool; MAX_PUMPS],

    water_fail: Handshake,
    steam_fail: Handshake,
    pump_fail: [Handshake; MAX_PUMPS],
    controller_fail: [Handshake; MAX_PUMPS],

    water_failure_type: FailureType,
    steam_failure_type: FailureType,
    pump_failure_type: [FailureType; MAX_PUMPS],
    controller_failure_type: [FailureType; MAX_PUMPS],

    predicted_band: (f64, f64),
    previous_water: f64,
    previous_steam: f64,
    water_stuck: u8,
    steam_stuck: u8,

    valve_open: bool,
    init_finished: bool,
    init_high_reference: Option<f64>,
    init_high_wait: u8,
}

impl Controller {
    pub fn new(config: Config) -> Result<Controller> {
        config.validate()?;
        Ok(Controller {
            config,
            mode: Mode::Waiting,
            pump_commanded: [false; MAX_PUMPS],
            water_fail: Handshake::new(),
            steam_fail: Handshake::new(),
            pump_fail: [Handshake::new(); MAX_PUMPS],
            controller_fail: [Handshake::new(); MAX_PUMPS],
            water_failure_type: FailureType::NoFailure,
            steam_failure_type: FailureType::NoFailure,
            pump_failure_type: [FailureType::NoFailure; MAX_PUMPS],
            controller_failure_type: [FailureType::NoFailure; MAX_PUMPS],
            predicted_band: (f64::NEG_INFINITY, f64::INFINITY),
            previous_water: 0.0,
            previous_steam: 0.0,
            water_stuck: 0,
            steam_stuck: 0,
            valve_open: false,
            init_finished: false,
            init_high_reference: None,
            init_high_wait: 0,
        })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn status(&self) -> String {
        self.mode.to_string()
    }

    /// Runs one control cycle: reads `inbound`, advances all internal
    /// state, and writes this cycle's outbound messages into `sink`.
    pub fn clock(&mut self, inbound: Mailbox, sink: &mut OutboundSink) {
        sink.reset();

        if self.mode.is_terminal() {
            sink.push(Message::Mode(self.mode.announced()));
            return;
        }

        let inputs = match extract::extract(&inbound, self.config.pump_count) {
            Some(inputs) => inputs,
            None => {
                tracing::error!("transmission failure: incomplete or malformed cycle batch");
                self.mode = Mode::EmergencyStop;
                sink.push(Message::Mode(self.mode.announced()));
                return;
            }
        };

        if self.mode == Mode::Initialisation && inputs.physical_units_ready {
            self.mode = recompute_mode(
                Mode::Normal,
                self.water_fail.is_failed(),
                self.any_non_water_failure(),
            );
        }

        if matches!(self.mode, Mode::Normal | Mode::Degraded | Mode::Rescue) {
            self.diagnose(&inputs, sink);

            if !self.mode.is_terminal() {
                self.process_handshakes(&inputs, sink);
                self.mode = recompute_mode(
                    self.mode,
                    self.water_fail.is_failed(),
                    self.any_non_water_failure(),
                );
            }
        }

        if !self.mode.is_terminal() {
            match self.mode {
                Mode::Waiting => {
                    if inputs.steam_boiler_waiting {
                        self.mode = Mode::Initialisation;
                        self.execute_initialisation(&inputs, sink);
                    }
                }
                Mode::Initialisation => self.execute_initialisation(&inputs, sink),
                Mode::Normal | Mode::Degraded => {
                    self.run_pump_control(inputs.level, inputs.steam, sink);
                }
                Mode::Rescue => {
                    let estimate = self.rescue_water_estimate();
                    self.run_pump_control(estimate, inputs.steam, sink);
                }
                Mode::EmergencyStop => {}
            }
        }

        sink.push(Message::Mode(self.mode.announced()));
        self.previous_water = inputs.level;
        self.previous_steam = inputs.steam;
    }

    fn any_non_water_failure(&self) -> bool {
        self.steam_fail.is_failed()
            || (0..self.config.pump_count)
                .any(|i| self.pump_fail[i].is_failed() || self.controller_fail[i].is_failed())
    }

    fn count_non_water_failures(&self) -> usize {
        let mut n = usize::from(self.steam_fail.is_failed());
        for i in 0..self.config.pump_count {
            n += usize::from(self.pump_fail[i].is_failed());
            n += usize::from(self.controller_fail[i].is_failed());
        }
        n
    }

    fn diagnose(&mut self, inputs: &CycleInputs, sink: &mut OutboundSink) {
        self.water_stuck =
            diagnosis::update_stuck_counter(inputs.level, self.previous_water, self.water_stuck);
        self.steam_stuck =
            diagnosis::update_stuck_counter(inputs.steam, self.previous_steam, self.steam_stuck);

        let water_candidate = if self.water_fail.state() == FailState::NoFail {
            diagnosis::diagnose_water(
                inputs.level,
                self.config.capacity,
                diagnosis::is_stuck(self.water_stuck),
                self.predicted_band,
            )
        } else {
            FailureType::NoFailure
        };

        let steam_candidate = if self.steam_fail.state() == FailState::NoFail {
            diagnosis::diagnose_steam(
                inputs.steam,
                self.previous_steam,
                diagnosis::is_stuck(self.steam_stuck),
                self.config.max_steam_rate,
            )
        } else {
            FailureType::NoFailure
        };

        let water_evidence = WaterEvidence::from(water_candidate);
        let failures_before = self.count_non_water_failures();
        let steam_attributed = steam_candidate != FailureType::NoFailure;

        let mut water_attributed = false;
        let mut pump_attr = [false; MAX_PUMPS];
        let mut controller_attr = [false; MAX_PUMPS];
        let mut pump_candidate = [FailureType::NoFailure; MAX_PUMPS];
        let mut controller_candidate = [FailureType::NoFailure; MAX_PUMPS];

        for i in 0..self.config.pump_count {
            pump_candidate[i] = if self.pump_fail[i].state() == FailState::NoFail {
                diagnosis::diagnose_actuator(inputs.pump_state[i], self.pump_commanded[i])
            } else {
                FailureType::NoFailure
            };
            controller_candidate[i] = if self.controller_fail[i].state() == FailState::NoFail {
                diagnosis::diagnose_actuator(inputs.pump_control_state[i], self.pump_commanded[i])
            } else {
                FailureType::NoFailure
            };

            let attribution = diagnosis::disambiguate(
                water_evidence,
                pump_candidate[i] != FailureType::NoFailure,
                controller_candidate[i] != FailureType::NoFailure,
                self.pump_commanded[i],
                failures_before,
            );

            match attribution {
                Attribution::Water => water_attributed = true,
                Attribution::Pump => pump_attr[i] = true,
                Attribution::Controller => controller_attr[i] = true,
                Attribution::None => {}
            }
        }

        if water_attributed && steam_attributed {
            tracing::error!("simultaneous water and steam sensor failure");
            self.mode = Mode::EmergencyStop;
            return;
        }

        if water_attributed {
            self.water_failure_type = water_candidate;
        }
        if self.water_fail.mark_detected(water_attributed) {
            sink.push(Message::LevelFailureDetection);
        }

        if steam_attributed {
            self.steam_failure_type = steam_candidate;
        }
        if self.steam_fail.mark_detected(steam_attributed) {
            sink.push(Message::SteamFailureDetection);
        }

        for i in 0..self.config.pump_count {
            if pump_attr[i] {
                self.pump_failure_type[i] = pump_candidate[i];
            }
            if self.pump_fail[i].mark_detected(pump_attr[i]) {
                sink.push(Message::PumpFailureDetection { index: i });
            }

            if controller_attr[i] {
                self.controller_failure_type[i] = controller_candidate[i];
            }
            if self.controller_fail[i].mark_detected(controller_attr[i]) {
                sink.push(Message::PumpControlFailureDetection { index: i });
            }
        }
    }

    fn process_handshakes(&mut self, inputs: &CycleInputs, sink: &mut OutboundSink) {
        if inputs.level_failure_ack {
            self.water_fail.on_ack();
        }
        if inputs.level_repaired && self.water_fail.on_repair() {
            self.water_failure_type = FailureType::NoFailure;
            self.water_stuck = 0;
            sink.push(Message::LevelRepairedAcknowledgement);
        }

        if inputs.steam_failure_ack {
            self.steam_fail.on_ack();
        }
        if inputs.steam_repaired && self.steam_fail.on_repair() {
            self.steam_failure_type = FailureType::NoFailure;
            self.steam_stuck = 0;
            sink.push(Message::SteamRepairedAcknowledgement);
        }

        for i in 0..self.config.pump_count {
            if inputs.pump_failure_ack[i] {
                self.pump_fail[i].on_ack();
            }
            if inputs.pump_repaired[i] && self.pump_fail[i].on_repair() {
                self.pump_failure_type[i] = FailureType::NoFailure;
                sink.push(Message::PumpRepairedAcknowledgement { index: i });
            }

            if inputs.pump_control_failure_ack[i] {
                self.controller_fail[i].on_ack();
            }
            if inputs.pump_control_repaired[i] && self.controller_fail[i].on_repair() {
                self.controller_failure_type[i] = FailureType::NoFailure;
                sink.push(Message::PumpControlRepairedAcknowledgement { index: i });
            }
        }
    }

    fn execute_initialisation(&mut self, inputs: &CycleInputs, sink: &mut OutboundSink) {
        if inputs.steam != 0.0 || !(0.0..=self.config.capacity).contains(&inputs.level) {
            tracing::error!("initialisation precondition violated");
            self.mode = Mode::EmergencyStop;
            return;
        }

        self.water_stuck =
            diagnosis::update_stuck_counter(inputs.level, self.previous_water, self.water_stuck);
        if diagnosis::is_stuck(self.water_stuck) {
            tracing::error!("water level sensor stuck during initialisation");
            self.mode = Mode::EmergencyStop;
            return;
        }

        if self.init_finished {
            sink.push(Message::ProgramReady);
            return;
        }

        if inputs.level >= self.config.normal_max {
            self.apply_pump_commands(&ALL_OFF, sink);
            if !self.valve_open {
                self.valve_open = true;
                sink.push(Message::Valve);
            }

            if let Some(previous) = self.init_high_reference {
                if inputs.level >= previous {
                    self.init_high_wait += 1;
                    if self.init_high_wait >= 2 {
                        tracing::error!("water level not falling during initialisation");
                        self.mode = Mode::EmergencyStop;
                        return;
                    }
                } else {
                    self.init_high_wait = 0;
                }
            }
            self.init_high_reference = Some(inputs.level);
        } else {
            self.init_high_reference = None;
            self.init_high_wait = 0;

            if inputs.level <= self.config.normal_min {
                let all_on = {
                    let mut on = [false; MAX_PUMPS];
                    on[..self.config.pump_count].fill(true);
                    on
                };
                self.apply_pump_commands(&all_on, sink);
                if self.valve_open {
                    self.valve_open = false;
                    sink.push(Message::Valve);
                }
            } else {
                self.apply_pump_commands(&ALL_OFF, sink);
                if self.valve_open {
                    self.valve_open = false;
                    sink.push(Message::Valve);
                }
                self.init_finished = true;
                sink.push(Message::ProgramReady);
            }
        }
    }

    fn rescue_water_estimate(&self) -> f64 {
        if self.previous_water < self.config.target_level() {
            self.predicted_band.0
        } else {
            self.predicted_band.1
        }
    }

    fn run_pump_control(&mut self, water: f64, steam: f64, sink: &mut OutboundSink) {
        let mut available: [f64; MAX_PUMPS] = [0.0; MAX_PUMPS];
        let mut available_indices: [usize; MAX_PUMPS] = [0; MAX_PUMPS];
        let mut count = 0;
        for i in 0..self.config.pump_count {
            if !self.pump_fail[i].is_failed() {
                available_indices[count] = i;
                available[count] = self.config.pump_capacity[i];
                count += 1;
            }
        }

        let selection =
            prediction::select_pump_count(water, steam, &self.config, &available[..count]);

        if selection.band.0 <= self.config.limit_min || selection.band.1 >= self.config.limit_max {
            tracing::error!("predicted water level would breach the safety limits");
            self.mode = Mode::EmergencyStop;
            return;
        }

        self.predicted_band = selection.band;

        let mut desired = [false; MAX_PUMPS];
        for &i in &available_indices[..selection.k] {
            desired[i] = true;
        }
        self.apply_pump_commands(&desired, sink);
    }

    fn apply_pump_commands(&mut self, desired: &[bool; MAX_PUMPS], sink: &mut OutboundSink) {
        for i in 0..self.config.pump_count {
            let want = desired[i] && !self.pump_fail[i].is_failed();
            if want != self.pump_commanded[i] {
                sink.push(if want {
                    Message::OpenPump { index: i }
                } else {
                    Message::ClosePump { index: i }
                });
                self.pump_commanded[i] = want;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_recompute_prioritises_water_over_everything() {
        assert_eq!(recompute_mode(Mode::Normal, true, true), Mode::Rescue);
        assert_eq!(recompute_mode(Mode::Rescue, false, true), Mode::Degraded);
        assert_eq!(recompute_mode(Mode::Degraded, false, false), Mode::Normal);
        assert_eq!(recompute_mode(Mode::Normal, false, false), Mode::Normal);
    }

    #[test]
    fn mode_recompute_leaves_other_modes_untouched() {
        assert_eq!(recompute_mode(Mode::Waiting, true, true), Mode::Waiting);
        assert_eq!(
            recompute_mode(Mode::EmergencyStop, false, false),
            Mode::EmergencyStop
        );
    }

    fn cfg() -> Config {
        Config {
            capacity: 1000.0,
            normal_min: 400.0,
            normal_max: 600.0,
            limit_min: 100.0,
            limit_max: 900.0,
            max_steam_rate: 10.0,
            pump_count: 2,
            pump_capacity: [4.0, 4.0, 0.0, 0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn stays_waiting_without_steam_boiler_waiting() {
        let mut controller = Controller::new(cfg()).unwrap();
        let msgs = [
            Message::Level(0.0),
            Message::Steam(0.0),
            Message::PumpState { index: 0, on: false },
            Message::PumpState { index: 1, on: false },
            Message::PumpControlState { index: 0, on: false },
            Message::PumpControlState { index: 1, on: false },
        ];
        let mut sink = OutboundSink::new();
        controller.clock(Mailbox::new(&msgs), &mut sink);

        assert_eq!(controller.mode(), Mode::Waiting);
        assert!(sink
            .messages()
            .contains(&Message::Mode(boiler_api::mode::AnnouncedMode::Initialisation)));
    }

    #[test]
    fn transmission_failure_forces_emergency_stop() {
        let mut controller = Controller::new(cfg()).unwrap();
        let msgs = [Message::Level(500.0)];
        let mut sink = OutboundSink::new();
        controller.clock(Mailbox::new(&msgs), &mut sink);
        assert_eq!(controller.mode(), Mode::EmergencyStop);
    }

    #[test]
    fn emergency_stop_is_sticky() {
        let mut controller = Controller::new(cfg()).unwrap();
        let bad = [Message::Level(500.0)];
        let mut sink = OutboundSink::new();
        controller.clock(Mailbox::new(&bad), &mut sink);
        assert_eq!(controller.mode(), Mode::EmergencyStop);

        let good = [
            Message::Level(500.0),
            Message::Steam(5.0),
            Message::PumpState { index: 0, on: false },
            Message::PumpState { index: 1, on: false },
            Message::PumpControlState { index: 0, on: false },
            Message::PumpControlState { index: 1, on: false },
        ];
        controller.clock(Mailbox::new(&good), &mut sink);
        assert_eq!(controller.mode(), Mode::EmergencyStop);
    }
}
