//! Service vehicles.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::error::EntityError;
use super::scooter::Scooter;

/// A van carrying spare batteries and a small load of scooters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vehicle {
    pub id: usize,
    pub battery_inventory: usize,
    pub battery_inventory_capacity: usize,
    pub scooter_inventory: Vec<Scooter>,
    pub scooter_inventory_capacity: usize,
    /// Location id of the cluster or depot the vehicle is at.
    pub current_location: usize,
    /// Every location id visited, in order.
    pub service_route: Vec<usize>,
}

impl Vehicle {
    /// Creates a vehicle with full battery inventory and an empty scooter bay.
    pub fn new(
        id: usize,
        start_location: usize,
        battery_inventory_capacity: usize,
        scooter_inventory_capacity: usize,
    ) -> Self {
        Self {
            id,
            battery_inventory: battery_inventory_capacity,
            battery_inventory_capacity,
            scooter_inventory: Vec::new(),
            scooter_inventory_capacity,
            current_location: start_location,
            service_route: vec![start_location],
        }
    }

    /// Loads a scooter, swapping its battery on the way in.
    pub fn pick_up(&mut self, mut scooter: Scooter) -> Result<(), EntityError> {
        if self.scooter_inventory.len() >= self.scooter_inventory_capacity {
            return Err(EntityError::ScooterInventoryFull {
                vehicle_id: self.id,
                capacity: self.scooter_inventory_capacity,
            });
        }
        self.change_battery(&mut scooter)?;
        scooter.clear_position();
        self.scooter_inventory.push(scooter);
        Ok(())
    }

    /// Swaps a scooter battery using one battery from the inventory.
    pub fn change_battery(&mut self, scooter: &mut Scooter) -> Result<(), EntityError> {
        if self.battery_inventory == 0 {
            return Err(EntityError::BatteryInventoryEmpty {
                vehicle_id: self.id,
            });
        }
        self.battery_inventory -= 1;
        scooter.swap_battery();
        Ok(())
    }

    /// Unloads a scooter from the inventory.
    pub fn drop_off(&mut self, scooter_id: usize) -> Result<Scooter, EntityError> {
        let idx = self
            .scooter_inventory
            .iter()
            .position(|s| s.id == scooter_id)
            .ok_or(EntityError::ScooterNotInInventory {
                vehicle_id: self.id,
                scooter_id,
            })?;
        Ok(self.scooter_inventory.remove(idx))
    }

    /// Moves to a location and records it in the service route.
    pub fn set_current_location(&mut self, location_id: usize) {
        self.current_location = location_id;
        self.service_route.push(location_id);
    }

    /// Batteries missing from a full inventory.
    pub fn flat_batteries(&self) -> usize {
        self.battery_inventory_capacity
            .saturating_sub(self.battery_inventory)
    }

    pub fn add_battery_inventory(&mut self, n: usize) {
        self.battery_inventory = (self.battery_inventory + n).min(self.battery_inventory_capacity);
    }

    /// Free scooter slots.
    pub fn scooter_room(&self) -> usize {
        self.scooter_inventory_capacity
            .saturating_sub(self.scooter_inventory.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::location::GeoPoint;

    fn scooter(id: usize, battery: f64) -> Scooter {
        Scooter::new(id, GeoPoint::new(59.91, 10.75), battery).unwrap()
    }

    #[test]
    fn new_vehicle_is_full_of_batteries() {
        let v = Vehicle::new(0, 5, 10, 3);
        assert_eq!(v.battery_inventory, 10);
        assert_eq!(v.flat_batteries(), 0);
        assert_eq!(v.service_route, vec![5]);
    }

    #[test]
    fn pick_up_consumes_a_battery() {
        let mut v = Vehicle::new(0, 0, 2, 3);
        v.pick_up(scooter(1, 10.0)).unwrap();
        assert_eq!(v.battery_inventory, 1);
        assert_eq!(v.scooter_inventory[0].battery, 100.0);
        assert!(v.scooter_inventory[0].position.is_none());
    }

    #[test]
    fn pick_up_over_capacity_fails() {
        let mut v = Vehicle::new(0, 0, 5, 1);
        v.pick_up(scooter(1, 10.0)).unwrap();
        assert_eq!(
            v.pick_up(scooter(2, 10.0)),
            Err(EntityError::ScooterInventoryFull {
                vehicle_id: 0,
                capacity: 1
            })
        );
    }

    #[test]
    fn pick_up_without_battery_fails() {
        let mut v = Vehicle::new(0, 0, 0, 3);
        assert_eq!(
            v.pick_up(scooter(1, 10.0)),
            Err(EntityError::BatteryInventoryEmpty { vehicle_id: 0 })
        );
        assert!(v.scooter_inventory.is_empty());
    }

    #[test]
    fn change_battery_with_empty_inventory_fails() {
        let mut v = Vehicle::new(2, 0, 0, 3);
        let mut s = scooter(1, 40.0);
        assert_eq!(
            v.change_battery(&mut s),
            Err(EntityError::BatteryInventoryEmpty { vehicle_id: 2 })
        );
        assert_eq!(s.battery, 40.0);
    }

    #[test]
    fn drop_off_unknown_scooter_fails() {
        let mut v = Vehicle::new(0, 0, 5, 3);
        assert_eq!(
            v.drop_off(4),
            Err(EntityError::ScooterNotInInventory {
                vehicle_id: 0,
                scooter_id: 4
            })
        );
    }

    #[test]
    fn refill_is_capped() {
        let mut v = Vehicle::new(0, 0, 5, 3);
        v.battery_inventory = 1;
        v.add_battery_inventory(10);
        assert_eq!(v.battery_inventory, 5);
    }

    #[test]
    fn route_is_append_only() {
        let mut v = Vehicle::new(0, 0, 5, 3);
        v.set_current_location(2);
        v.set_current_location(0);
        assert_eq!(v.service_route, vec![0, 2, 0]);
        assert_eq!(v.current_location, 0);
    }
}
