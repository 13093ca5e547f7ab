//! The prediction engine: for a candidate number of active pumps,
//! bounds where the water level could be one cycle from now, and picks
//! the candidate whose band is centred closest to the target level.

use boiler_api::Config;

/// The `[min, max]` band the water level could occupy one cycle from
/// now if `active_pump_capacity` litres/second of pumping is applied
/// starting this cycle.
pub fn predict_band(water: f64, steam: f64, max_steam_rate: f64, active_pump_capacity: f64) -> (f64, f64) {
    let min = water + 5.0 * active_pump_capacity - 5.0 * max_steam_rate;
    let max = water + 5.0 * active_pump_capacity - 5.0 * steam;
    (min, max)
}

fn midpoint(band: (f64, f64)) -> f64 {
    (band.0 + band.1) / 2.0
}

/// The outcome of choosing how many pumps to run this cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection {
    /// How many of `available` pumps (in the order given) to turn on.
    pub k: usize,
    /// The predicted band for that choice of `k`.
    pub band: (f64, f64),
}

/// Chooses the number of pumps to run, from zero up to `available.len()`,
/// minimizing the distance between the predicted band's midpoint and
/// the target level. `available` lists the capacities of pumps that
/// are not currently failed, in the order they would be switched on --
/// ties are broken towards the smaller `k` by only replacing the best
/// candidate on a strict improvement.
pub fn select_pump_count(water: f64, steam: f64, cfg: &Config, available: &[f64]) -> Selection {
    let target = cfg.target_level();

    let mut best = Selection {
        k: 0,
        band: predict_band(water, steam, cfg.max_steam_rate, 0.0),
    };
    let mut best_distance = (midpoint(best.band) - target).abs();

    let mut running_capacity = 0.0;
    for (k, capacity) in available.iter().enumerate() {
        running_capacity += capacity;
        let band = predict_band(water, steam, cfg.max_steam_rate, running_capacity);
        let distance = (midpoint(band) - target).abs();
        if distance < best_distance {
            best_distance = distance;
            best = Selection { k: k + 1, band };
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> Config {
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
    fn band_widens_with_more_capacity() {
        let narrow = predict_band(500.0, 5.0, 10.0, 0.0);
        let wide = predict_band(500.0, 5.0, 10.0, 20.0);
        assert!(wide.0 > narrow.0);
        assert!(wide.1 > narrow.1);
    }

    #[test]
    fn selects_the_k_whose_band_centres_on_target() {
        // Distances from target (500.0): k=0 -> 37.5, k=1 -> 17.5,
        // k=2 -> 2.5, k=3 -> 22.5, k=4 -> 42.5.
        let selection = select_pump_count(500.0, 5.0, &cfg(), &[4.0, 4.0, 4.0, 4.0]);
        assert_eq!(selection.k, 2);
    }

    #[test]
    fn ties_break_towards_fewer_pumps() {
        let selection = select_pump_count(500.0, 0.0, &cfg(), &[0.0, 0.0]);
        assert_eq!(selection.k, 0);
    }

    #[test]
    fn empty_available_pumps_only_ever_selects_zero() {
        let selection = select_pump_count(500.0, 5.0, &cfg(), &[]);
        assert_eq!(selection.k, 0);
    }
}
