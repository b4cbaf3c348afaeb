//! Application core — pure domain logic, zero I/O.
//!
//! This module contains the business rules for the watering node:
//! sample scheduling, channel control, the temperature switch, and the
//! settings lifecycle.  All interaction with hardware happens through
//! **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
