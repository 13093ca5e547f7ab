//! The controller's top-level operating mode.

use core::fmt;

/// The controller's operating mode. `EmergencyStop` is terminal: once
/// entered, no other variant is ever produced again for the lifetime
/// of the `Controller`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Waiting,
    Initialisation,
    Normal,
    Degraded,
    Rescue,
    EmergencyStop,
}

impl Mode {
    /// The `MODE_m` value this mode is announced as. `Waiting` and
    /// `Initialisation` both announce `INITIALISATION`.
    pub fn announced(self) -> AnnouncedMode {
        match self {
            Mode::Waiting | Mode::Initialisation => {
                AnnouncedMode::Initialisation
            }
            Mode::Normal => AnnouncedMode::Normal,
            Mode::Degraded => AnnouncedMode::Degraded,
            Mode::Rescue => AnnouncedMode::Rescue,
            Mode::EmergencyStop => AnnouncedMode::EmergencyStop,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Mode::EmergencyStop)
    }
}

/// The distinct values that can appear in an outbound `MODE_m`
/// message. Kept separate from `Mode` because `Waiting` and
/// `Initialisation` collapse to the same announced value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncedMode {
    Initialisation,
    Normal,
    Degraded,
    Rescue,
    EmergencyStop,
}

impl fmt::Display for AnnouncedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AnnouncedMode::Initialisation => "INITIALISATION",
            AnnouncedMode::Normal => "NORMAL",
            AnnouncedMode::Degraded => "DEGRADED",
            AnnouncedMode::Rescue => "RESCUE",
            AnnouncedMode::EmergencyStop => "EMERGENCY_STOP",
        };
        write!(f, "{s}")
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.announced())
    }
}
