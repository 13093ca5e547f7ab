//! Per-unit repair handshakes. Each sensor, pump and pump controller
//! owns one `Handshake`, advanced by pure transition methods: state
//! plus event in, new state (and whatever the event should emit) out,
//! nothing else touched.

/// Where a single unit sits in its detect/acknowledge/repair cycle.
/// Transitions strictly in this order; nothing skips a state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailState {
    NoFail,
    FailDetected,
    WaitingFailAck,
    WaitingRepair,
}

/// The handshake for one monitored unit (a sensor, a pump, or a pump
/// controller).
#[derive(Debug, Clone, Copy, Default)]
pub struct Handshake {
    state: FailState,
}

impl Default for FailState {
    fn default() -> Self {
        FailState::NoFail
    }
}

impl Handshake {
    pub fn new() -> Self {
        Handshake::default()
    }

    pub fn state(&self) -> FailState {
        self.state
    }

    pub fn is_failed(&self) -> bool {
        self.state != FailState::NoFail
    }

    /// Called once per cycle during diagnosis with whether this unit
    /// was attributed a failure this cycle. Advances `NoFail ->
    /// FailDetected` on the cycle a failure is first attributed, then
    /// `FailDetected -> WaitingFailAck` on the *next* call regardless
    /// of `diagnosed` -- so `FailDetected` is always occupied for one
    /// full cycle before the detection message is emitted. Returns
    /// `true` on exactly the call that makes that second transition,
    /// telling the caller to emit the detection message now.
    pub fn mark_detected(&mut self, diagnosed: bool) -> bool {
        match self.state {
            FailState::NoFail if diagnosed => {
                self.state = FailState::FailDetected;
                false
            }
            FailState::FailDetected => {
                self.state = FailState::WaitingFailAck;
                true
            }
            _ => false,
        }
    }

    /// An acknowledgement of the failure arrived. Advances
    /// `WaitingFailAck -> WaitingRepair`. No message is emitted on
    /// this transition.
    pub fn on_ack(&mut self) -> bool {
        if self.state == FailState::WaitingFailAck {
            self.state = FailState::WaitingRepair;
            true
        } else {
            false
        }
    }

    /// A repair notification arrived. Advances `WaitingRepair ->
    /// NoFail`. Returns `true` exactly when that transition happens,
    /// telling the caller to emit a repaired-acknowledgement message.
    pub fn on_repair(&mut self) -> bool {
        if self.state == FailState::WaitingRepair {
            self.state = FailState::NoFail;
            true
        } else {
            false
        }
    }
}
