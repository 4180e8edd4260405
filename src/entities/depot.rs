//! Battery depots.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::EntityError;
use super::location::{GeoPoint, Location};

/// A place where vehicles exchange flat batteries for charged ones.
///
/// Small depots hold a limited stock of charged batteries that recharges
/// linearly over time. The main depot is effectively unlimited.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Depot {
    pub id: usize,
    pub position: GeoPoint,
    /// Charged batteries currently available.
    pub capacity: f64,
    pub max_capacity: f64,
    /// Minutes needed to recharge one battery.
    pub charge_time_per_battery: f64,
    pub is_main: bool,
    /// Time of the last swap, used for charge recovery.
    pub last_service_time: f64,
}

impl Depot {
    /// The main depot, never limited in practice.
    pub fn main(id: usize, position: GeoPoint, capacity: f64) -> Self {
        Self {
            id,
            position,
            capacity,
            max_capacity: capacity,
            charge_time_per_battery: 0.0,
            is_main: true,
            last_service_time: 0.0,
        }
    }

    /// A capacity- and charge-rate-limited depot.
    pub fn small(id: usize, position: GeoPoint, capacity: f64, charge_time_per_battery: f64) -> Self {
        Self {
            id,
            position,
            capacity,
            max_capacity: capacity,
            charge_time_per_battery,
            is_main: false,
            last_service_time: 0.0,
        }
    }

    /// Charged batteries that would be available at `time`.
    pub fn get_available_battery_swaps(&self, time: f64) -> f64 {
        if self.is_main {
            return self.capacity;
        }
        let elapsed = (time - self.last_service_time).max(0.0);
        (self.capacity + elapsed / self.charge_time_per_battery).min(self.max_capacity)
    }

    /// Takes `n` charged batteries at `time` and returns the vehicle time spent.
    ///
    /// Small depots first recover charge since the last service.
    pub fn swap_battery_inventory(
        &mut self,
        time: f64,
        n: usize,
        swap_time_per_battery: f64,
    ) -> Result<f64, EntityError> {
        if !self.is_main {
            self.capacity = self.get_available_battery_swaps(time);
            self.last_service_time = self.last_service_time.max(time);
        }
        if n as f64 > self.capacity {
            return Err(EntityError::DepotCapacityExceeded {
                depot_id: self.id,
                requested: n,
                available: self.capacity,
            });
        }
        self.capacity -= n as f64;
        Ok(n as f64 * swap_time_per_battery)
    }
}

impl Location for Depot {
    fn id(&self) -> usize {
        self.id
    }

    fn position(&self) -> GeoPoint {
        self.position
    }
}
