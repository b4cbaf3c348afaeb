//! Watering node — host simulator entry point.
//!
//! Runs the exact control loop the board firmware runs, wired to the
//! simulator adapters: drifting moisture values, a loopback radio, the
//! host monotonic clock.  Useful for watching a full watering cycle and
//! the coordinator telemetry without hardware.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                 │
//! │   SimHardware      SimRadio      MemStorage   SimClock   │
//! │   (Sensor+Actuator (RadioPort)   (StoragePort)(ClockPort)│
//! │    +TempProbe)                                           │
//! │  ─────────────── Port Trait Boundary ──────────────────  │
//! │  ┌────────────────────────────────────────────────────┐  │
//! │  │  AppService · ProtocolEngine (pure logic)          │  │
//! │  └────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

use anyhow::Result;
use env_logger::Builder;
use log::{LevelFilter, info};

use watering_node::adapters::log_sink::LogEventSink;
use watering_node::adapters::mem_storage::MemStorage;
use watering_node::adapters::sim::{SimClock, SimHardware, SimRadio};
use watering_node::app::events::AppEvent;
use watering_node::app::ports::{ClockPort, EventSink};
use watering_node::app::service::AppService;
use watering_node::config;
use watering_node::diagnostics::Diagnostics;
use watering_node::events::ButtonMailbox;
use watering_node::protocol::engine::ProtocolEngine;
use watering_node::sensors::{SourceKind, TemperatureSource};

/// Simulator control tick.  The board loop spins freely; one tick per
/// 100 ms is plenty for watching schedules fire.
const TICK_MS: u64 = 100;

fn main() -> Result<()> {
    Builder::new().filter_level(LevelFilter::Info).init();

    info!("watering-node simulator starting");

    // ── Adapters ──────────────────────────────────────────────
    let mut storage = MemStorage::new();
    let mut hw = SimHardware::new();
    let mut radio = SimRadio::new();
    let mut clock = SimClock::new();
    let mut sink = LogEventSink::new();
    let mailbox = ButtonMailbox::new();

    // ── Settings + diagnostics from "EEPROM" ──────────────────
    let (settings, defaults_loaded) = config::load_or_default(&mut storage, false);
    let diagnostics = Diagnostics::load(&storage);

    // ── App service + protocol engine ─────────────────────────
    let now = clock.now_ms();
    let temp_source = TemperatureSource::new(SourceKind::Dht);
    let mut app = AppService::new(settings, temp_source, diagnostics, now);
    let mut engine = ProtocolEngine::new();

    sink.emit(&AppEvent::Started { defaults_loaded });
    engine.enqueue_start();
    engine.pump(&mut app, &mut radio, &mut clock, &mut sink);

    info!("entering control loop");

    // ── Control loop ──────────────────────────────────────────
    loop {
        std::thread::sleep(std::time::Duration::from_millis(TICK_MS));
        let now = clock.now_ms();

        // Buttons first, then sampling and channel evaluation, then the
        // radio — a just-arrived command never affects the current tick.
        let buttons = mailbox.drain();
        app.tick(now, buttons, &mut hw, &mut engine, &mut sink);
        engine.pump(&mut app, &mut radio, &mut clock, &mut sink);

        engine.poll(&mut app, &mut hw, &mut radio, &mut storage, &mut sink, now);
        engine.pump(&mut app, &mut radio, &mut clock, &mut sink);
    }
}
