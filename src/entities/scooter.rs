//! Individual e-scooters.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::EntityError;
use super::location::GeoPoint;

/// Full battery level in percent.
pub const FULL_BATTERY: f64 = 100.0;

/// A rentable scooter.
///
/// A scooter is never removed from the system: it is either a member of one
/// cluster, carried in one vehicle's inventory (no position), or riding
/// between two clusters inside a pending arrival event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Scooter {
    pub id: usize,
    /// `None` while the scooter is loaded on a vehicle.
    pub position: Option<GeoPoint>,
    /// Battery level in `[0, 100]`.
    pub battery: f64,
    /// Every position the scooter has been set down at.
    pub route: Vec<GeoPoint>,
}

impl Scooter {
    /// Creates a scooter at a position with a given battery level.
    pub fn new(id: usize, position: GeoPoint, battery: f64) -> Result<Self, EntityError> {
        if !(0.0..=FULL_BATTERY).contains(&battery) {
            return Err(EntityError::InvalidBattery(battery));
        }
        Ok(Self {
            id,
            position: Some(position),
            battery,
            route: vec![position],
        })
    }

    /// Consumes battery for a ride of `distance` kilometres; the level stays in `[0, 100]`.
    pub fn travel(&mut self, distance: f64, usage_per_km: f64) {
        self.battery = (self.battery - distance * usage_per_km).clamp(0.0, FULL_BATTERY);
    }

    /// Replaces the battery with a fully charged one.
    pub fn swap_battery(&mut self) {
        self.battery = FULL_BATTERY;
    }

    /// Places the scooter at a coordinate.
    pub fn set_position(&mut self, position: GeoPoint) {
        self.position = Some(position);
        self.route.push(position);
    }

    /// Removes the coordinates (the scooter is loaded on a vehicle).
    pub fn clear_position(&mut self) {
        self.position = None;
    }

    pub fn is_available(&self, battery_limit: f64) -> bool {
        self.battery >= battery_limit
    }

    /// Battery deficiency as a fraction of a full battery.
    pub fn deficiency(&self) -> f64 {
        (FULL_BATTERY - self.battery) / FULL_BATTERY
    }
}
