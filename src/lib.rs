#![doc = include_str!("../README.md")]
#![cfg_attr(docrs, feature(doc_cfg))]

extern crate gnss_rs as gnss;

// private modules
mod cfg;
mod device;
mod error;
mod nmea;
mod reader;
mod satellite;
mod source;
mod timer;
mod update;

#[cfg(test)]
mod tests;

// prelude
pub mod prelude {
    pub use crate::cfg::{Config, Error as ConfigError, UpdateMode};
    pub use crate::device::{LineDevice, NmeaFeed, NmeaReplay};
    pub use crate::error::Error;
    pub use crate::nmea::{InUseReport, InViewStatus, NmeaParser, SentenceParser};
    pub use crate::satellite::SatelliteRecord;
    pub use crate::source::{Event, SatelliteSource};
    pub use crate::update::SatelliteUpdate;
    // re-export
    pub use gnss::prelude::{Constellation, SV};
    pub use hifitime::{Duration, Epoch};
}

// pub export
pub use error::Error;
