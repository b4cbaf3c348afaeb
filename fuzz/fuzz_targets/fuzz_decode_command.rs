//! Fuzz target: `wire::decode_command`
//!
//! Drives arbitrary byte sequences into the inbound frame decoder and
//! asserts that it never panics, that undersized settings frames never
//! decode, and that any decoded settings record survives a pack/unpack
//! round trip.
//!
//! cargo fuzz run fuzz_decode_command

#![no_main]

use libfuzzer_sys::fuzz_target;
use watering_node::protocol::wire::{
    Command, SETTINGS_PAYLOAD_LEN, decode_command, pack_settings, unpack_settings,
};
use watering_node::protocol::MSG_SET_SETTINGS;

fuzz_target!(|data: &[u8]| {
    match decode_command(data) {
        Some(Command::SetSettings(settings)) => {
            // The length check must have been enforced.
            assert!(data[0] == MSG_SET_SETTINGS);
            assert!(data.len() >= 1 + SETTINGS_PAYLOAD_LEN);

            // Whatever decoded must round-trip exactly.
            let mut payload = [0u8; SETTINGS_PAYLOAD_LEN];
            pack_settings(&settings, &mut payload);
            assert_eq!(unpack_settings(&payload), settings);
        }
        Some(Command::Ping(payload)) => {
            assert!(payload.len() < data.len(), "echo must exclude the type byte");
        }
        _ => {}
    }
});
