use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::prelude::Duration;

mod mode;
pub use mode::UpdateMode;

/// Configuration Error
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("unknown update mode \"{0}\"")]
    UnknownUpdateMode(String),
}

/// Fastest simulation read rate
fn min_read_interval() -> Duration {
    Duration::from_milliseconds(1.0)
}

fn default_update_interval() -> Duration {
    Duration::ZERO
}

/// Some chips are capable of over 100 updates per second.
fn default_minimum_update_interval() -> Duration {
    Duration::from_milliseconds(2.0)
}

fn default_simulation_read_interval() -> Duration {
    Duration::from_milliseconds(100.0)
}

fn default_request_timeout() -> Duration {
    Duration::from_seconds(300.0)
}

fn default_read_ahead_limit() -> usize {
    2
}

/// [SatelliteSource](crate::prelude::SatelliteSource) parametrization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// [UpdateMode] selects how the device is drained.
    #[cfg_attr(feature = "serde", serde(default))]
    pub mode: UpdateMode,
    /// Interval between two surfaced updates, in continuous mode.
    /// Zero means "as soon as new data is available".
    /// Any other value is raised to [Self::minimum_update_interval].
    #[cfg_attr(feature = "serde", serde(default = "default_update_interval"))]
    pub update_interval: Duration,
    /// Minimal update interval the device is capable of.
    /// One-shot requests with a shorter deadline fail immediately.
    #[cfg_attr(feature = "serde", serde(default = "default_minimum_update_interval"))]
    pub minimum_update_interval: Duration,
    /// Interval between two forced reads of the recorded log,
    /// only meaningful in [UpdateMode::Simulation].
    #[cfg_attr(feature = "serde", serde(default = "default_simulation_read_interval"))]
    pub simulation_read_interval: Duration,
    /// Deadline applied to one-shot requests issued with a null timeout.
    #[cfg_attr(feature = "serde", serde(default = "default_request_timeout"))]
    pub default_request_timeout: Duration,
    /// Number of times the very same report (kind and constellation) may be
    /// read within a single simulation read, before we give up on gathering
    /// a complete update. This protects us from spinning on short or corrupt logs.
    #[cfg_attr(feature = "serde", serde(default = "default_read_ahead_limit"))]
    pub read_ahead_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: UpdateMode::default(),
            update_interval: default_update_interval(),
            minimum_update_interval: default_minimum_update_interval(),
            simulation_read_interval: default_simulation_read_interval(),
            default_request_timeout: default_request_timeout(),
            read_ahead_limit: default_read_ahead_limit(),
        }
    }
}

impl Config {
    /// Returns [Config] preset to replay recorded logs,
    /// at the desired read rate.
    pub fn simulation_preset(read_interval: Duration) -> Self {
        Self::default()
            .with_update_mode(UpdateMode::Simulation)
            .with_simulation_read_interval(read_interval)
    }

    /// Copies and returns [Config] with updated [UpdateMode]
    pub fn with_update_mode(&self, mode: UpdateMode) -> Self {
        let mut s = self.clone();
        s.mode = mode;
        s
    }

    /// Copies and returns [Config] with updated update interval.
    /// The interval is clamped like [Self::clamped_update_interval] does.
    pub fn with_update_interval(&self, interval: Duration) -> Self {
        let mut s = self.clone();
        s.update_interval = s.clamped_update_interval(interval);
        s
    }

    /// Copies and returns [Config] with updated minimal update interval
    pub fn with_minimum_update_interval(&self, interval: Duration) -> Self {
        let mut s = self.clone();
        s.minimum_update_interval = interval;
        s
    }

    /// Copies and returns [Config] with updated simulation read interval
    pub fn with_simulation_read_interval(&self, interval: Duration) -> Self {
        let mut s = self.clone();
        s.simulation_read_interval = interval;
        s
    }

    /// Copies and returns [Config] with updated default request timeout
    pub fn with_default_request_timeout(&self, timeout: Duration) -> Self {
        let mut s = self.clone();
        s.default_request_timeout = timeout;
        s
    }

    /// Copies and returns [Config] with updated read ahead limit
    pub fn with_read_ahead_limit(&self, limit: usize) -> Self {
        let mut s = self.clone();
        s.read_ahead_limit = limit;
        s
    }

    /// Update interval is either null, or at least [Self::minimum_update_interval].
    pub(crate) fn clamped_update_interval(&self, interval: Duration) -> Duration {
        if interval <= Duration::ZERO {
            Duration::ZERO
        } else if interval < self.minimum_update_interval {
            self.minimum_update_interval
        } else {
            interval
        }
    }

    /// Simulation read rate, never faster than [Self::minimum_update_interval],
    /// and never null: a null read interval would never read.
    pub(crate) fn effective_read_interval(&self) -> Duration {
        let floor = if self.minimum_update_interval > min_read_interval() {
            self.minimum_update_interval
        } else {
            min_read_interval()
        };
        if self.simulation_read_interval < floor {
            floor
        } else {
            self.simulation_read_interval
        }
    }
}
