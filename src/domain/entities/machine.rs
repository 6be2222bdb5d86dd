//! Machine entity module
//!
//! This module defines the machine directory entry and the capability facts
//! describing how a given subseries runs on a given machine.

use serde::{Deserialize, Serialize};

/// An injection-molding machine from the registration directory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Machine {
    /// Machine identifier shared with the planning board (`resourceId`)
    #[serde(rename = "machineID", alias = "_k2_machineID")]
    pub id: i64,
    /// Display name of the machine
    #[serde(rename = "machineName", default)]
    pub name: String,
}

/// Production statistics for one (subseries, machine, IML) combination
///
/// Capability rows come from the measured cycle-time collection. Cavity and
/// cycle average can be absent, in which case conservative defaults apply
/// and the fallback is surfaced in the task information.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MachineCapability {
    /// Product family this row describes
    pub subseries: i64,
    /// Machine this row describes
    pub machine_id: i64,
    /// Whether the machine can run this subseries with in-mold labeling
    pub iml_capable: bool,
    /// Parts produced per molding cycle, if measured
    pub cavity: Option<u32>,
    /// Mean seconds per molding cycle, if measured
    pub cycle_avg: Option<f64>,
}

impl MachineCapability {
    /// Cavity count assumed when no measurement exists.
    pub const DEFAULT_CAVITY: u32 = 4;

    /// Cycle average assumed when no measurement exists, in seconds.
    pub const DEFAULT_CYCLE_AVG: f64 = 10.0;

    /// The cavity count to plan with, plus whether the default was used.
    pub fn effective_cavity(&self) -> (u32, bool) {
        match self.cavity {
            Some(cavity) if cavity > 0 => (cavity, false),
            _ => (Self::DEFAULT_CAVITY, true),
        }
    }

    /// The cycle average to plan with, plus whether the default was used.
    pub fn effective_cycle_avg(&self) -> (f64, bool) {
        match self.cycle_avg {
            Some(avg) if avg > 0.0 => (avg, false),
            _ => (Self::DEFAULT_CYCLE_AVG, true),
        }
    }

    /// Seconds needed to produce `quantity` parts on this combination:
    /// `round((quantity / cavity) * cycle_avg)`.
    pub fn production_seconds(&self, quantity: u32) -> i64 {
        let (cavity, _) = self.effective_cavity();
        let (cycle_avg, _) = self.effective_cycle_avg();
        let cycles_needed = f64::from(quantity) / f64::from(cavity);
        (cycles_needed * cycle_avg).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capability(cavity: Option<u32>, cycle_avg: Option<f64>) -> MachineCapability {
        MachineCapability {
            subseries: 11,
            machine_id: 3,
            iml_capable: false,
            cavity,
            cycle_avg,
        }
    }

    #[test]
    fn test_production_seconds_with_data() {
        let cap = capability(Some(4), Some(10.0));
        // 8 parts / 4 cavities = 2 cycles, 10 s each
        assert_eq!(cap.production_seconds(8), 20);
    }

    #[test]
    fn test_production_seconds_rounds() {
        let cap = capability(Some(3), Some(7.5));
        // 10 / 3 * 7.5 = 25.0
        assert_eq!(cap.production_seconds(10), 25);
        let cap = capability(Some(8), Some(9.7));
        // 5 / 8 * 9.7 = 6.0625 -> 6
        assert_eq!(cap.production_seconds(5), 6);
    }

    #[test]
    fn test_defaults_apply_when_absent() {
        let cap = capability(None, None);
        assert_eq!(cap.effective_cavity(), (4, true));
        assert_eq!(cap.effective_cycle_avg(), (10.0, true));
        // 800 / 4 * 10 = 2000
        assert_eq!(cap.production_seconds(800), 2_000);
    }

    #[test]
    fn test_zero_cavity_counts_as_absent() {
        let cap = capability(Some(0), Some(12.0));
        assert_eq!(cap.effective_cavity(), (4, true));
        assert_eq!(cap.effective_cycle_avg(), (12.0, false));
    }
}
