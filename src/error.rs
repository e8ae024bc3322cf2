use thiserror::Error;

/// Errors reported by the [SatelliteSource](crate::prelude::SatelliteSource),
/// either returned or published on the [Event](crate::prelude::Event) channel.
/// Malformed or inconsistent NMEA content is never an error: it is dropped
/// and we simply wait for more data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// A one-shot request could not be satisfied within its deadline,
    /// or its deadline was below the minimal update interval.
    /// In continuous mode, we also wind up here when two consecutive update
    /// intervals went by without any valid update. This is recoverable,
    /// you may simply retry.
    #[error("update timeout")]
    UpdateTimeout,

    /// No data source was attached, or it could not be read.
    /// Attach a device with `set_device()` and retry.
    #[error("data source unavailable")]
    SourceUnavailable,
}
