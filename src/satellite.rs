//! Satellite description
use crate::prelude::{Constellation, SV};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// [SatelliteRecord] describes one satellite, as reported by the receiver.
/// A [SatelliteRecord] is identified by its ([Constellation], identifier) pair:
/// identifiers ranges overlap across constellations.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SatelliteRecord {
    /// [Constellation] this satellite belongs to.
    /// [Constellation::Mixed] when it could not be determined.
    pub system: Constellation,
    /// NMEA identifier, relative to [Self::system].
    pub id: u16,
    /// Signal to Noise ratio [dB.Hz], when reported.
    pub snr: Option<u8>,
    /// Elevation angle [°], when reported.
    pub elevation: Option<f64>,
    /// Azimuth angle to true north [°], when reported.
    pub azimuth: Option<f64>,
}

impl std::fmt::Display for SatelliteRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}({:02})", self.system, self.id)?;
        if let Some(snr) = self.snr {
            write!(f, " snr={}dB", snr)?;
        }
        if let Some(elev) = self.elevation {
            write!(f, " elev={:.1}°", elev)?;
        }
        if let Some(azim) = self.azimuth {
            write!(f, " azim={:.1}°", azim)?;
        }
        Ok(())
    }
}

impl SatelliteRecord {
    /// Builds a new [SatelliteRecord] with unknown signal and attitude.
    pub fn new(system: Constellation, id: u16) -> Self {
        Self {
            system,
            id,
            snr: None,
            elevation: None,
            azimuth: None,
        }
    }

    /// Copies and returns [SatelliteRecord] with updated SNR [dB.Hz]
    pub fn with_snr(&self, snr: u8) -> Self {
        let mut s = self.clone();
        s.snr = Some(snr);
        s
    }

    /// Copies and returns [SatelliteRecord] with updated elevation [°]
    pub fn with_elevation(&self, elevation: f64) -> Self {
        let mut s = self.clone();
        s.elevation = Some(elevation);
        s
    }

    /// Copies and returns [SatelliteRecord] with updated azimuth [°]
    pub fn with_azimuth(&self, azimuth: f64) -> Self {
        let mut s = self.clone();
        s.azimuth = Some(azimuth);
        s
    }

    /// Converts this NMEA description to a [SV].
    /// SBAS vehicles are reported within the GPS range (33..=64),
    /// their PRN is then 120..=151. Returns None when the identifier
    /// does not fall within the NMEA range of [Self::system].
    pub fn sv(&self) -> Option<SV> {
        let (constellation, prn) = match (self.system, self.id) {
            (Constellation::GPS, 1..=32) => (Constellation::GPS, self.id),
            (Constellation::GPS | Constellation::SBAS, 33..=64) => {
                (Constellation::SBAS, self.id + 87)
            },
            (Constellation::Glonass, 65..=96) => (Constellation::Glonass, self.id - 64),
            (Constellation::QZSS, 193..=202) => (Constellation::QZSS, self.id - 192),
            (Constellation::BeiDou, 201..=263) => (Constellation::BeiDou, self.id - 200),
            (Constellation::BeiDou, 401..=463) => (Constellation::BeiDou, self.id - 400),
            (Constellation::Galileo, 301..=336) => (Constellation::Galileo, self.id - 300),
            _ => return None,
        };
        let prn = u8::try_from(prn).ok()?;
        Some(SV::new(constellation, prn))
    }
}

/// Guesses the [Constellation] from the NMEA identifier range.
/// SBAS identifiers are attributed to GPS, since they are reported
/// within the GPS sentences. QZSS 201 and 202 overlap with BeiDou,
/// which wins.
pub(crate) fn constellation_from_id(id: u16) -> Option<Constellation> {
    match id {
        1..=64 => Some(Constellation::GPS),
        65..=96 => Some(Constellation::Glonass),
        193..=200 => Some(Constellation::QZSS),
        201..=263 | 401..=463 => Some(Constellation::BeiDou),
        301..=336 => Some(Constellation::Galileo),
        _ => None,
    }
}
