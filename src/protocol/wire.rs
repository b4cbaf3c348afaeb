//! Explicit encode/decode pairs for every message layout.
//!
//! No memory-layout tricks: each message is a tagged value with a
//! documented byte layout, packed and unpacked field by field.
//!
//! SETTINGS / SET_SETTINGS payload (27 bytes after the type byte):
//!
//! ```text
//! ┌────┬──────────────────────────────────────────────────────────┐
//! │ 0  │ bitmask: bits 0–3 channel enables, bit 5 switch inverted,│
//! │    │          bit 6 push enabled, bit 7 send ADC values       │
//! │ 1  │ 4 × adc_trigger_value (u16 LE)                           │
//! │ 9  │ 4 × watering_time (u16 LE)                               │
//! │ 17 │ check_interval (u16 LE)                                  │
//! │ 19 │ temp_sensor_interval (u16 LE)                            │
//! │ 21 │ server_address (u8)                                      │
//! │ 22 │ own_address (u8)                                         │
//! │ 23 │ delay_after_send (u16 LE)                                │
//! │ 25 │ temp_switch_trigger_value (u8)                           │
//! │ 26 │ temp_switch_hyst_tenth (u8)                              │
//! └────┴──────────────────────────────────────────────────────────┘
//! ```

use heapless::Vec;

use super::{
    DataKind, MAX_FRAME_LEN, MSG_BATTERY, MSG_CHANNEL_STATE, MSG_CHECK_NOW, MSG_GET_SETTINGS,
    MSG_GET_VERSION, MSG_PAUSE, MSG_PAUSE_ON_OFF, MSG_PING, MSG_POLL_DATA, MSG_PONG, MSG_RESUME,
    MSG_SAVE_SETTINGS, MSG_SENSOR_VALUES, MSG_SET_SETTINGS, MSG_SETTINGS, MSG_START,
    MSG_TEMP_SENSOR_DATA, MSG_TURN_CHANNEL_ON_OFF, MSG_TURN_TEMP_SWITCH_ON_OFF, MSG_VERSION,
    VERSION_MAJOR, VERSION_MINOR, VERSION_PATCH,
};
use crate::config::{CHANNEL_COUNT, Settings};
use crate::sensors::{TEMP_INVALID, TempReading};

/// Packed settings payload length (without the type byte).
pub const SETTINGS_PAYLOAD_LEN: usize = 27;

const BIT_INVERTED: u8 = 1 << 5;
const BIT_PUSH: u8 = 1 << 6;
const BIT_SEND_ADC: u8 = 1 << 7;

// ───────────────────────────────────────────────────────────────
// Inbound commands
// ───────────────────────────────────────────────────────────────

/// A validated inbound command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    GetSettings,
    SetSettings(Settings),
    SaveSettings,
    CheckNow,
    /// Per-channel action: `Some(true)` on, `Some(false)` off, `None` no-op.
    TurnChannels([Option<bool>; CHANNEL_COUNT]),
    TurnTempSwitch(bool),
    Pause,
    Resume,
    PauseOnOff(bool),
    /// `None` = send every data message.
    PollData(Option<DataKind>),
    GetVersion,
    Ping(Vec<u8, MAX_FRAME_LEN>),
}

/// Parse one inbound frame (type byte included).
///
/// Returns `None` for unknown types and undersized payloads — both are
/// silently dropped without a reply.
pub fn decode_command(frame: &[u8]) -> Option<Command> {
    let (&msg_type, payload) = frame.split_first()?;
    match msg_type {
        MSG_GET_SETTINGS => Some(Command::GetSettings),
        MSG_SET_SETTINGS => {
            if payload.len() < SETTINGS_PAYLOAD_LEN {
                return None;
            }
            Some(Command::SetSettings(unpack_settings(payload)))
        }
        MSG_SAVE_SETTINGS => Some(Command::SaveSettings),
        MSG_CHECK_NOW => Some(Command::CheckNow),
        MSG_TURN_CHANNEL_ON_OFF => {
            if payload.len() < CHANNEL_COUNT {
                return None;
            }
            let mut actions = [None; CHANNEL_COUNT];
            for (action, &byte) in actions.iter_mut().zip(payload) {
                *action = match byte {
                    0x01 => Some(true),
                    0x00 => Some(false),
                    _ => None,
                };
            }
            Some(Command::TurnChannels(actions))
        }
        MSG_TURN_TEMP_SWITCH_ON_OFF => {
            let &state = payload.first()?;
            Some(Command::TurnTempSwitch(state == 0x01))
        }
        MSG_PAUSE => Some(Command::Pause),
        MSG_RESUME => Some(Command::Resume),
        MSG_PAUSE_ON_OFF => {
            let &state = payload.first()?;
            Some(Command::PauseOnOff(state == 0x01))
        }
        MSG_POLL_DATA => match payload.first() {
            None => Some(Command::PollData(None)),
            Some(&code) => DataKind::from_code(code).map(|k| Command::PollData(Some(k))),
        },
        MSG_GET_VERSION => Some(Command::GetVersion),
        MSG_PING => {
            let mut echo = Vec::new();
            echo.extend_from_slice(&payload[..payload.len().min(MAX_FRAME_LEN - 1)])
                .ok()?;
            Some(Command::Ping(echo))
        }
        _ => None,
    }
}

// ───────────────────────────────────────────────────────────────
// Settings payload
// ───────────────────────────────────────────────────────────────

/// Pack the settings record into its 27-byte payload.
pub fn pack_settings(s: &Settings, out: &mut [u8; SETTINGS_PAYLOAD_LEN]) {
    let mut bitmask = 0u8;
    for chan in 0..CHANNEL_COUNT {
        if s.channel_enabled[chan] {
            bitmask |= 1 << chan;
        }
    }
    if s.temp_switch_inverted {
        bitmask |= BIT_INVERTED;
    }
    if s.push_data_enabled {
        bitmask |= BIT_PUSH;
    }
    if s.send_adc_values {
        bitmask |= BIT_SEND_ADC;
    }
    out[0] = bitmask;
    for chan in 0..CHANNEL_COUNT {
        out[1 + chan * 2..3 + chan * 2].copy_from_slice(&s.adc_trigger_value[chan].to_le_bytes());
        out[9 + chan * 2..11 + chan * 2].copy_from_slice(&s.watering_time[chan].to_le_bytes());
    }
    out[17..19].copy_from_slice(&s.check_interval.to_le_bytes());
    out[19..21].copy_from_slice(&s.temp_sensor_interval.to_le_bytes());
    out[21] = s.server_address;
    out[22] = s.own_address;
    out[23..25].copy_from_slice(&s.delay_after_send.to_le_bytes());
    out[25] = s.temp_switch_trigger_value;
    out[26] = s.temp_switch_hyst_tenth;
}

/// Unpack a settings record from a payload of at least 27 bytes.
pub fn unpack_settings(payload: &[u8]) -> Settings {
    let bitmask = payload[0];
    let u16_at = |idx: usize| u16::from_le_bytes([payload[idx], payload[idx + 1]]);
    Settings {
        channel_enabled: core::array::from_fn(|chan| bitmask & (1 << chan) != 0),
        adc_trigger_value: core::array::from_fn(|chan| u16_at(1 + chan * 2)),
        watering_time: core::array::from_fn(|chan| u16_at(9 + chan * 2)),
        check_interval: u16_at(17),
        temp_sensor_interval: u16_at(19),
        server_address: payload[21],
        own_address: payload[22],
        delay_after_send: u16_at(23),
        temp_switch_trigger_value: payload[25],
        temp_switch_hyst_tenth: payload[26],
        temp_switch_inverted: bitmask & BIT_INVERTED != 0,
        push_data_enabled: bitmask & BIT_PUSH != 0,
        send_adc_values: bitmask & BIT_SEND_ADC != 0,
    }
}

// ───────────────────────────────────────────────────────────────
// Outbound encoders — each writes a full frame and returns its length
// ───────────────────────────────────────────────────────────────

pub fn encode_start(buf: &mut [u8; MAX_FRAME_LEN]) -> usize {
    buf[0] = MSG_START;
    1
}

pub fn encode_settings(s: &Settings, buf: &mut [u8; MAX_FRAME_LEN]) -> usize {
    buf[0] = MSG_SETTINGS;
    let mut payload = [0u8; SETTINGS_PAYLOAD_LEN];
    pack_settings(s, &mut payload);
    buf[1..=SETTINGS_PAYLOAD_LEN].copy_from_slice(&payload);
    1 + SETTINGS_PAYLOAD_LEN
}

pub fn encode_channel_state(states: &[bool; CHANNEL_COUNT], buf: &mut [u8; MAX_FRAME_LEN]) -> usize {
    buf[0] = MSG_CHANNEL_STATE;
    for (chan, &on) in states.iter().enumerate() {
        buf[1 + chan] = u8::from(on);
    }
    1 + CHANNEL_COUNT
}

/// TEMP_SENSOR_DATA: temperature, humidity only when the source provides
/// it, then the switch output state.
pub fn encode_temp_data(
    reading: &TempReading,
    source_has_humidity: bool,
    switch_on: bool,
    buf: &mut [u8; MAX_FRAME_LEN],
) -> usize {
    buf[0] = MSG_TEMP_SENSOR_DATA;
    buf[1..5].copy_from_slice(&reading.temperature.to_le_bytes());
    let mut at = 5;
    if source_has_humidity {
        let humidity = reading.humidity.unwrap_or(TEMP_INVALID);
        buf[5..9].copy_from_slice(&humidity.to_le_bytes());
        at = 9;
    }
    buf[at] = u8::from(switch_on);
    at + 1
}

/// SENSOR_VALUES: raw ADC words, zero for disabled channels.
pub fn encode_sensor_values(values: &[u16; CHANNEL_COUNT], buf: &mut [u8; MAX_FRAME_LEN]) -> usize {
    buf[0] = MSG_SENSOR_VALUES;
    for (chan, value) in values.iter().enumerate() {
        buf[1 + chan * 2..3 + chan * 2].copy_from_slice(&value.to_le_bytes());
    }
    1 + CHANNEL_COUNT * 2
}

pub fn encode_battery(percent: u8, raw: u16, buf: &mut [u8; MAX_FRAME_LEN]) -> usize {
    buf[0] = MSG_BATTERY;
    buf[1] = percent;
    buf[2..4].copy_from_slice(&raw.to_le_bytes());
    4
}

pub fn encode_version(buf: &mut [u8; MAX_FRAME_LEN]) -> usize {
    buf[0] = MSG_VERSION;
    buf[1] = VERSION_MAJOR;
    buf[2] = VERSION_MINOR;
    buf[3] = VERSION_PATCH;
    4
}

pub fn encode_pong(payload: &[u8], buf: &mut [u8; MAX_FRAME_LEN]) -> usize {
    buf[0] = MSG_PONG;
    let len = payload.len().min(MAX_FRAME_LEN - 1);
    buf[1..=len].copy_from_slice(&payload[..len]);
    1 + len
}
