//! Device draining strategies
use std::collections::HashMap;

use log::{debug, warn};

use crate::{
    device::LineDevice,
    nmea::{InViewStatus, SentenceParser},
    prelude::{Constellation, Duration, Epoch, SatelliteUpdate},
    timer::Timer,
};

/// Complete report that one line brought into the [SatelliteUpdate]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Report {
    InUse(Constellation),
    InView(Constellation),
}

/// Feeds one line through the parser, into the [SatelliteUpdate].
/// Returns the report this line completed, if any.
pub(crate) fn process_line(
    parser: &mut dyn SentenceParser,
    update: &mut SatelliteUpdate,
    line: &[u8],
) -> Option<Report> {
    if let Some(report) = parser.parse_in_use(line) {
        let system = report.system;
        update.set_satellites_in_use(system, report.ids);
        return Some(Report::InUse(system));
    }

    match parser.parse_in_view(line) {
        InViewStatus::NotRecognized => None,
        InViewStatus::PartiallyParsed { system, .. } => {
            update.set_updating(system);
            None
        },
        InViewStatus::FullyParsed { system, satellites } => {
            update.set_satellites_in_view(system, satellites);
            Some(Report::InView(system))
        },
    }
}

/// Replays a recorded log at a fixed read rate
#[derive(Debug, Clone)]
pub(crate) struct SimulationReader {
    timer: Timer,
    read_ahead_limit: usize,
    /// Read ahead bound was already reported once
    warned: bool,
}

impl SimulationReader {
    pub fn new(read_ahead_limit: usize) -> Self {
        Self {
            timer: Timer::periodic(),
            read_ahead_limit: read_ahead_limit.max(1),
            warned: false,
        }
    }

    /// Consumes lines until one complete update was gathered:
    /// both an in use and an in view report, and a valid fresh result.
    /// Stops early when the device runs dry, or when the very same report
    /// keeps repeating (short or corrupt log).
    fn read(
        &mut self,
        device: &mut dyn LineDevice,
        parser: &mut dyn SentenceParser,
        update: &mut SatelliteUpdate,
    ) -> usize {
        let mut consumed = 0;
        let mut in_use_seen = false;
        let mut in_view_seen = false;
        let mut occurrences = HashMap::<Report, usize>::new();

        while let Some(line) = device.read_line() {
            consumed += 1;

            let report = match process_line(parser, update, &line) {
                Some(report) => report,
                None => continue,
            };

            match report {
                Report::InUse(_) => in_use_seen = true,
                Report::InView(_) => in_view_seen = true,
            }

            let both_seen = in_use_seen && in_view_seen;

            if both_seen && update.is_valid() && update.is_fresh() {
                break;
            }

            let count = occurrences.entry(report).or_insert(0);
            *count += 1;

            if *count >= self.read_ahead_limit && !both_seen {
                if self.warned {
                    debug!("simulation: {:?} repeated {} times", report, count);
                } else {
                    warn!(
                        "simulation: {:?} repeated {} times without complete update, log is short or corrupt",
                        report, count
                    );
                    self.warned = true;
                }
                break;
            }
        }

        consumed
    }
}

/// [Reader] drains the device, either as soon as data is available,
/// or at a fixed rate when replaying a recorded log.
#[derive(Debug, Clone)]
pub(crate) enum Reader {
    RealTime,
    Simulation(SimulationReader),
}

impl Reader {
    /// Reads what is available, according to this strategy.
    /// Returns the number of lines that were consumed.
    pub fn read(
        &mut self,
        device: &mut dyn LineDevice,
        parser: &mut dyn SentenceParser,
        update: &mut SatelliteUpdate,
    ) -> usize {
        match self {
            Self::RealTime => {
                let mut consumed = 0;
                while let Some(line) = device.read_line() {
                    process_line(parser, update, &line);
                    consumed += 1;
                }
                consumed
            },
            Self::Simulation(reader) => reader.read(device, parser, update),
        }
    }

    /// Arms the read timer, if this strategy has one and it is not armed yet.
    pub fn arm(&mut self, now: Epoch, interval: Duration) {
        if let Self::Simulation(reader) = self {
            if !reader.timer.is_active() {
                reader.timer.start(now, interval);
            }
        }
    }

    /// Restarts the read timer at a new rate, if it was armed.
    pub fn rearm(&mut self, now: Epoch, interval: Duration) {
        if let Self::Simulation(reader) = self {
            if reader.timer.is_active() {
                reader.timer.start(now, interval);
            }
        }
    }

    pub fn disarm(&mut self) {
        if let Self::Simulation(reader) = self {
            reader.timer.stop();
        }
    }

    pub fn deadline(&self) -> Option<Epoch> {
        match self {
            Self::RealTime => None,
            Self::Simulation(reader) => reader.timer.deadline(),
        }
    }

    pub fn expire(&mut self, now: Epoch) {
        if let Self::Simulation(reader) = self {
            reader.timer.expire(now);
        }
    }

    pub fn is_simulation(&self) -> bool {
        matches!(self, Self::Simulation(_))
    }
}
