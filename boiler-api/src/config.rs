//! The boiler's immutable physical configuration. Loading a `Config`
//! from a file is out of scope for this crate's contract, but the
//! type derives `serde::Deserialize` so a harness can load one from
//! TOML without this crate needing to know about file systems.

use crate::error::Error;
use crate::MAX_PUMPS;
use serde_derive::Deserialize;

/// Immutable boiler parameters: capacity, normal/limit bands, maximum
/// steam rate, and per-pump capacities.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Tank capacity, C (litres).
    pub capacity: f64,
    /// Lower bound of the normal operating band, N1.
    pub normal_min: f64,
    /// Upper bound of the normal operating band, N2.
    pub normal_max: f64,
    /// Lower bound of the safety limit band, M1.
    pub limit_min: f64,
    /// Upper bound of the safety limit band, M2.
    pub limit_max: f64,
    /// Maximum steam output rate, W (litres/second).
    pub max_steam_rate: f64,
    /// Number of pumps, P (1..=MAX_PUMPS).
    pub pump_count: usize,
    /// Per-pump capacity, in litres/second. Only the first
    /// `pump_count` entries are meaningful.
    pub pump_capacity: [f64; MAX_PUMPS],
}

impl Config {
    /// The midpoint of the normal band, `H = N1 + (N2-N1)/2`, used by
    /// the prediction engine to pick a target water level.
    pub fn target_level(&self) -> f64 {
        self.normal_min + (self.normal_max - self.normal_min) / 2.0
    }

    /// Validates the boiler's physical invariants:
    /// `M1 < N1 < N2 < M2 < C`; `1 <= P <= MAX_PUMPS`; every active
    /// pump capacity is positive.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.limit_min < self.normal_min
            && self.normal_min < self.normal_max
            && self.normal_max < self.limit_max
            && self.limit_max < self.capacity)
        {
            return Err(Error::ConfigError(
                "bands must satisfy M1 < N1 < N2 < M2 < C",
            ));
        }

        if !(1..=MAX_PUMPS).contains(&self.pump_count) {
            return Err(Error::ConfigError("pump_count must be in 1..=6"));
        }

        if self.max_steam_rate <= 0.0 {
            return Err(Error::ConfigError("max_steam_rate must be positive"));
        }

        for capacity in &self.pump_capacity[..self.pump_count] {
            if *capacity <= 0.0 {
                return Err(Error::ConfigError(
                    "every pump capacity must be positive",
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            capacity: 1000.0,
            normal_min: 400.0,
            normal_max: 600.0,
            limit_min: 100.0,
            limit_max: 900.0,
            max_steam_rate: 10.0,
            pump_count: 4,
            pump_capacity: [4.0, 4.0, 4.0, 4.0, 0.0, 0.0],
        }
    }

    #[test]
    fn accepts_well_formed_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn target_level_is_band_midpoint() {
        assert_eq!(valid().target_level(), 500.0);
    }

    #[test]
    fn rejects_misordered_bands() {
        let mut cfg = valid();
        cfg.normal_min = 950.0; // now N1 > M2
        assert_eq!(
            cfg.validate(),
            Err(Error::ConfigError("bands must satisfy M1 < N1 < N2 < M2 < C"))
        );
    }

    #[test]
    fn rejects_pump_count_out_of_range() {
        let mut cfg = valid();
        cfg.pump_count = 0;
        assert!(cfg.validate().is_err());

        cfg.pump_count = 7;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_nonpositive_pump_capacity() {
        let mut cfg = valid();
        cfg.pump_capacity[2] = 0.0;
        assert!(cfg.validate().is_err());
    }
}
