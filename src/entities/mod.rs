//! Physical objects of the simulation: scooters, clusters, depots and vehicles.

pub mod cluster;
pub mod depot;
pub mod error;
pub mod location;
pub mod scooter;
pub mod vehicle;

pub use cluster::Cluster;
pub use depot::Depot;
pub use error::EntityError;
pub use location::{GeoPoint, Location};
pub use scooter::{Scooter, FULL_BATTERY};
pub use vehicle::Vehicle;
