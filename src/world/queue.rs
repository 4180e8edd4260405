//! Time-ordered event queue.
//!
//! Events are kept in a `BTreeMap` keyed by `(time, sequence)`: popping
//! always yields the earliest event, and events with equal times come out
//! in insertion order.

use std::collections::BTreeMap;

use super::error::WorldError;
use super::event::Event;

/// A total-order key for `f64` using IEEE-754 total order (`total_cmp`).
///
/// NaN times are rejected on insert.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct F64Key(pub(crate) f64);

impl F64Key {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Eq for F64Key {}

impl Ord for F64Key {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for F64Key {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending events sorted by time, FIFO among equal times.
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: BTreeMap<(F64Key, u64), Event>,
    next_sequence: u64,
}

/// Two queues are equal when they pop the same events in the same order.
impl PartialEq for EventQueue {
    fn eq(&self, other: &Self) -> bool {
        self.events.values().eq(other.events.values())
    }
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Inserts an event after every queued event with a time `<=` its own.
    pub fn push(&mut self, event: Event) -> Result<(), WorldError> {
        let time = event.time();
        if time.is_nan() {
            return Err(WorldError::NaNTime);
        }
        self.events.insert((F64Key(time), self.next_sequence), event);
        self.next_sequence += 1;
        Ok(())
    }

    /// Removes and returns the earliest event.
    pub fn pop(&mut self) -> Option<Event> {
        self.events.pop_first().map(|(_, e)| e)
    }

    /// Time of the earliest event.
    pub fn peek_time(&self) -> Option<f64> {
        self.events.keys().next().map(|(k, _)| k.value())
    }

    /// Events in the order they will be popped.
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.values()
    }

    /// Scooters riding inside pending arrival events.
    pub fn scooters_in_flight(&self) -> usize {
        self.iter()
            .filter(|e| matches!(e, Event::ScooterArrival { .. }))
            .count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

// =============================================================================
// EventQueue Serde Support
// =============================================================================

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::de::{SeqAccess, Visitor};
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    impl Serialize for EventQueue {
        fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for event in self.iter() {
                seq.serialize_element(event)?;
            }
            seq.end()
        }
    }

    impl<'de> Deserialize<'de> for EventQueue {
        fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where
            D: Deserializer<'de>,
        {
            struct QueueVisitor;

            impl<'de> Visitor<'de> for QueueVisitor {
                type Value = EventQueue;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("a sequence of events in pop order")
                }

                fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
                where
                    A: SeqAccess<'de>,
                {
                    let mut queue = EventQueue::new();
                    while let Some(event) = seq.next_element::<Event>()? {
                        queue.push(event).map_err(serde::de::Error::custom)?;
                    }
                    Ok(queue)
                }
            }

            deserializer.deserialize_seq(QueueVisitor)
        }
    }
}
