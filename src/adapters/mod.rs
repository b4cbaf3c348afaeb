//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter       | Implements                  | Connects to            |
//! |---------------|-----------------------------|------------------------|
//! | `mem_storage` | StoragePort                 | In-memory EEPROM image |
//! | `log_sink`    | EventSink                   | Serial log output      |
//! | `sim`         | Sensor/Actuator/Probe/Radio | Host simulator         |
//!
//! The real board wires these same traits to the AVR EEPROM, the ADC
//! mux, and the RadioHead modem; those drivers live outside this crate.

pub mod log_sink;
pub mod mem_storage;
pub mod sim;
