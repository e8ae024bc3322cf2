mod parser;

use log::LevelFilter;
use std::sync::Once;

use crate::{
    nmea::checksum,
    prelude::{Constellation, Epoch, SatelliteRecord},
};

static INIT: Once = Once::new();

pub fn init_logger() {
    INIT.call_once(|| {
        env_logger::builder()
            .is_test(true)
            .filter_level(LevelFilter::Debug)
            .init();
    });
}

/// Frames this sentence content: '$' prefix, checksum and line terminator.
pub fn sentence(content: &str) -> Vec<u8> {
    format!("${}*{:02X}\r\n", content, checksum(content.as_bytes())).into_bytes()
}

/// Reference [Epoch] of all timing tests
pub fn t0() -> Epoch {
    Epoch::from_gregorian_utc_at_midnight(2024, 1, 1)
}

/// Shortcut to describe the expected records
pub fn record(system: Constellation, id: u16, snr: Option<u8>) -> SatelliteRecord {
    let record = SatelliteRecord::new(system, id);
    match snr {
        Some(snr) => record.with_snr(snr),
        None => record,
    }
}
