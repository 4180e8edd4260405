//! Time unit handling for shift configuration.
//!
//! The simulation clock runs in plain `f64` minutes. Durations supplied by
//! callers may be expressed in any qtty time unit (hours for a shift, minutes
//! for an iteration, ...) and are converted once, at configuration time.

use qtty::{Minute, Quantity, Unit};

/// Marker trait for units that share the same physical dimension.
///
/// Implemented for every pair of units where `From::Dim == To::Dim`, so a
/// shift given in hours and the clock running in minutes are checked at
/// compile time to be both durations.
pub trait SameDim<To: Unit>: Unit<Dim = To::Dim> {}

impl<From, To> SameDim<To> for From
where
    From: Unit,
    To: Unit<Dim = From::Dim>,
{
}

/// Converts a quantity from one unit to another unit of the same dimension.
#[inline]
pub const fn convert<From, To>(q: Quantity<From>) -> Quantity<To>
where
    From: SameDim<To>,
    To: Unit,
{
    q.to_const::<To>()
}

/// Converts any time quantity into simulation-clock minutes.
#[inline]
pub fn to_minutes<U>(q: Quantity<U>) -> f64
where
    U: SameDim<Minute>,
{
    convert::<U, Minute>(q).value()
}

/// Converts a distance in kilometres and a speed in km/h into minutes of travel.
#[inline]
pub fn travel_minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    distance_km / speed_kmh * 60.0
}
