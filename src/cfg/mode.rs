use crate::cfg::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Update mode, selects how the data source is drained.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UpdateMode {
    /// Real time mode: the data source is a live receiver (serial port, socket..).
    /// Every notification of new data drains all complete lines, and updates
    /// are surfaced without any artificial delay.
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "realtime", alias = "real-time"))]
    RealTime,

    /// Simulation mode: the data source is a recorded log that is replayed
    /// at a fixed read rate. Each read consumes lines until one complete
    /// update (satellites in use and in view) was gathered.
    #[cfg_attr(feature = "serde", serde(alias = "simulation"))]
    Simulation,
}

impl std::fmt::Display for UpdateMode {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::RealTime => write!(fmt, "Real-Time"),
            Self::Simulation => write!(fmt, "Simulation"),
        }
    }
}

impl std::str::FromStr for UpdateMode {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "realtime" | "real-time" | "real time" => Ok(Self::RealTime),
            "simulation" | "sim" => Ok(Self::Simulation),
            _ => Err(Error::UnknownUpdateMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::UpdateMode;
    use std::str::FromStr;

    #[test]
    fn update_mode_parsing() {
        for (desc, expected) in [
            ("realtime", UpdateMode::RealTime),
            ("Real-Time", UpdateMode::RealTime),
            (" simulation ", UpdateMode::Simulation),
            ("SIM", UpdateMode::Simulation),
        ] {
            let mode = UpdateMode::from_str(desc).unwrap();
            assert_eq!(mode, expected, "failed to parse \"{}\"", desc);
        }

        assert!(UpdateMode::from_str("replay").is_err());
    }

    #[test]
    fn update_mode_display() {
        for mode in [UpdateMode::RealTime, UpdateMode::Simulation] {
            let formatted = mode.to_string();
            assert_eq!(UpdateMode::from_str(&formatted).unwrap(), mode);
        }
    }
}
