//! Satellites information source
use std::collections::VecDeque;

use log::{debug, warn};

use crate::{
    device::LineDevice,
    nmea::{NmeaParser, SentenceParser},
    prelude::{Config, Duration, Epoch, Error, SatelliteRecord, SatelliteUpdate, UpdateMode},
    reader::{Reader, SimulationReader},
    timer::Timer,
    update::UpdateSnapshot,
};

/// [Event]s surfaced by the [SatelliteSource], in order of occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Satellites currently in view, all constellations
    SatellitesInView(Vec<SatelliteRecord>),
    /// Satellites currently used in the fix, always described in view
    SatellitesInUse(Vec<SatelliteRecord>),
    /// The source encountered an [Error]
    Error(Error),
}

/// Timers of the [SatelliteSource], by priority when due simultaneously
#[derive(Debug, Clone, Copy, PartialEq)]
enum Due {
    Read,
    Interval,
    Request,
}

/// [SatelliteSource] decodes satellites in view and in use from
/// an NMEA [LineDevice] and surfaces coherent, deduplicated updates as [Event]s.
///
/// [SatelliteSource] never reads the system clock: every operation that may
/// arm or fire a timer takes the current [Epoch]. Drive it from your event loop:
/// - call [Self::ready_read] when new bytes were written to the device
/// - call [Self::poll] at (or after) [Self::next_deadline]
/// - collect the results with [Self::drain_events].
pub struct SatelliteSource<D: LineDevice> {
    cfg: Config,
    device: Option<D>,
    parser: Box<dyn SentenceParser>,
    reader: Reader,
    /// Update being gathered
    pending: SatelliteUpdate,
    /// Last surfaced update
    last: UpdateSnapshot,
    error: Option<Error>,
    events: VecDeque<Event>,
    /// Continuous updates were started
    running: bool,
    /// Previous interval elapsed without anything surfaced
    no_update_last_interval: bool,
    /// Timeout reported for the current gap already
    update_timeout_sent: bool,
    update_timer: Timer,
    request_timer: Timer,
}

impl<D: LineDevice> SatelliteSource<D> {
    /// Builds a new [SatelliteSource] that understands standard NMEA sentences.
    pub fn new(cfg: Config) -> Self {
        Self::with_parser(cfg, Box::new(NmeaParser::default()))
    }

    /// Builds a new [SatelliteSource] with a custom [SentenceParser].
    pub fn with_parser(cfg: Config, parser: Box<dyn SentenceParser>) -> Self {
        let reader = match cfg.mode {
            UpdateMode::RealTime => Reader::RealTime,
            UpdateMode::Simulation => {
                Reader::Simulation(SimulationReader::new(cfg.read_ahead_limit))
            },
        };

        let update_interval = cfg.clamped_update_interval(cfg.update_interval);

        Self {
            cfg: Config {
                update_interval,
                ..cfg
            },
            device: None,
            parser,
            reader,
            pending: SatelliteUpdate::default(),
            last: UpdateSnapshot::default(),
            error: None,
            events: VecDeque::new(),
            running: false,
            no_update_last_interval: false,
            update_timeout_sent: false,
            update_timer: Timer::periodic(),
            request_timer: Timer::single_shot(),
        }
    }

    /// Attaches the data source. Only the first device is accepted.
    pub fn set_device(&mut self, device: D) {
        if self.device.is_some() {
            warn!("source device already set: ignoring new device");
            return;
        }
        self.device = Some(device);
    }

    pub fn device(&self) -> Option<&D> {
        self.device.as_ref()
    }

    /// Mutable access to the attached device, to push newly received data.
    pub fn device_mut(&mut self) -> Option<&mut D> {
        self.device.as_mut()
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn update_mode(&self) -> UpdateMode {
        self.cfg.mode
    }

    pub fn update_interval(&self) -> Duration {
        self.cfg.update_interval
    }

    pub fn minimum_update_interval(&self) -> Duration {
        self.cfg.minimum_update_interval
    }

    /// Modifies the continuous update cadence. The interval is either null
    /// (surface as soon as possible) or raised to [Self::minimum_update_interval].
    /// Data gathered so far is preserved.
    pub fn set_update_interval(&mut self, interval: Duration, now: Epoch) {
        let interval = self.cfg.clamped_update_interval(interval);
        self.cfg.update_interval = interval;

        if self.running {
            self.update_timer.stop();
            if interval > Duration::ZERO {
                self.update_timer.start(now, interval);
            }
        }
    }

    /// Replay read rate, in [UpdateMode::Simulation]
    pub fn simulation_read_interval(&self) -> Duration {
        self.cfg.effective_read_interval()
    }

    /// Modifies the replay read rate, in [UpdateMode::Simulation].
    /// It is never faster than [Self::minimum_update_interval].
    pub fn set_simulation_read_interval(&mut self, interval: Duration, now: Epoch) {
        self.cfg.simulation_read_interval = interval;
        let interval = self.cfg.effective_read_interval();
        self.reader.rearm(now, interval);
    }

    /// Last [Error] that occurred, reset by [Self::start_updates]
    /// and [Self::request_update].
    pub fn error(&self) -> Option<Error> {
        self.error
    }

    /// Returns true while continuous updates are running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Returns true while a one-shot request is outstanding.
    pub fn is_request_pending(&self) -> bool {
        self.request_timer.is_active()
    }

    /// Update being gathered.
    pub fn pending_update(&self) -> &SatelliteUpdate {
        &self.pending
    }

    /// Starts continuous updates. Has no effect if already started.
    /// In [UpdateMode::RealTime], data buffered on the device is skipped.
    pub fn start_updates(&mut self, now: Epoch) {
        if self.running {
            return;
        }

        self.error = None;

        if self.device.is_none() {
            warn!("no source device: call set_device() first");
            self.set_error(Error::SourceUnavailable);
            return;
        }

        if self.cfg.mode == UpdateMode::RealTime {
            if let Some(device) = self.device.as_mut() {
                device.skip_buffered();
            }
        }

        self.running = true;
        self.pending.clear();
        self.no_update_last_interval = false;
        self.update_timeout_sent = false;

        self.update_timer.stop();
        if self.cfg.update_interval > Duration::ZERO {
            self.update_timer.start(now, self.cfg.update_interval);
        }

        self.reader.arm(now, self.cfg.effective_read_interval());
        debug!("{} - started continuous updates", now);
    }

    /// Stops continuous updates. Has no effect if not started.
    /// An outstanding one-shot request is not affected.
    pub fn stop_updates(&mut self) {
        if !self.running {
            return;
        }

        self.running = false;
        self.update_timer.stop();
        self.no_update_last_interval = false;
        self.update_timeout_sent = false;

        if !self.request_timer.is_active() {
            self.pending.clear();
            self.reader.disarm();
        }
        debug!("stopped continuous updates");
    }

    /// Requests a single update, within `timeout`.
    /// A null `timeout` selects [Config::default_request_timeout].
    /// [Error::UpdateTimeout] is reported immediately when `timeout`
    /// is below [Self::minimum_update_interval], or later if nothing valid
    /// could be gathered in time. Only one request may be outstanding:
    /// new requests are ignored until the current one completes.
    pub fn request_update(&mut self, timeout: Duration, now: Epoch) {
        if self.request_timer.is_active() {
            return;
        }

        self.error = None;

        let timeout = if timeout == Duration::ZERO {
            self.cfg.default_request_timeout
        } else {
            timeout
        };

        if timeout < self.cfg.minimum_update_interval {
            self.set_error(Error::UpdateTimeout);
            return;
        }

        if self.device.is_none() {
            warn!("no source device: call set_device() first");
            self.set_error(Error::SourceUnavailable);
            return;
        }

        self.request_timer.start(now, timeout);
        self.reader.arm(now, self.cfg.effective_read_interval());
    }

    /// Notifies that new data was written to the device.
    /// In [UpdateMode::RealTime] it is read immediately. In [UpdateMode::Simulation]
    /// it will be read on the next read tick.
    pub fn ready_read(&mut self, now: Epoch) {
        if !self.is_reading() {
            return;
        }
        if self.reader.is_simulation() {
            self.reader.arm(now, self.cfg.effective_read_interval());
        } else {
            self.read_available();
        }
    }

    /// Notifies that the device was closed: complete lines still buffered are consumed.
    pub fn device_closed(&mut self, _now: Epoch) {
        if self.is_reading() {
            self.read_available();
        }
    }

    /// Fires every timer that is due at `now`, earliest first.
    pub fn poll(&mut self, now: Epoch) {
        while let Some(due) = self.next_due(now) {
            match due {
                Due::Read => {
                    self.reader.expire(now);
                    self.read_available();
                },
                Due::Interval => {
                    self.update_timer.expire(now);
                    self.emit_pending_update();
                },
                Due::Request => {
                    self.request_timer.expire(now);
                    self.request_timeout();
                },
            }
        }
    }

    /// Earliest armed deadline, if any.
    pub fn next_deadline(&self) -> Option<Epoch> {
        [
            self.reader.deadline(),
            self.update_timer.deadline(),
            self.request_timer.deadline(),
        ]
        .into_iter()
        .flatten()
        .reduce(|earliest, t| if t < earliest { t } else { earliest })
    }

    /// Returns (and forgets) the [Event]s surfaced so far.
    pub fn drain_events(&mut self) -> impl Iterator<Item = Event> + '_ {
        self.events.drain(..)
    }

    /// Returns (and forgets) the oldest [Event] surfaced so far.
    pub fn next_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    fn next_due(&self, now: Epoch) -> Option<Due> {
        let mut due: Option<(Epoch, Due)> = None;
        for (deadline, kind) in [
            (self.reader.deadline(), Due::Read),
            (self.update_timer.deadline(), Due::Interval),
            (self.request_timer.deadline(), Due::Request),
        ] {
            let deadline = match deadline {
                Some(deadline) if deadline <= now => deadline,
                _ => continue,
            };
            let earlier = due.map(|(t, _)| deadline < t).unwrap_or(true);
            if earlier {
                due = Some((deadline, kind));
            }
        }
        due.map(|(_, kind)| kind)
    }

    fn is_reading(&self) -> bool {
        self.running || self.request_timer.is_active()
    }

    fn set_error(&mut self, error: Error) {
        self.error = Some(error);
        self.events.push_back(Event::Error(error));
    }

    fn read_available(&mut self) {
        let device = match self.device.as_mut() {
            Some(device) => device,
            None => return,
        };

        self.reader
            .read(device, self.parser.as_mut(), &mut self.pending);

        self.notify_new_update();
    }

    /// Stops reading once nobody is waiting for data anymore
    fn refresh_reading(&mut self) {
        if !self.is_reading() {
            self.reader.disarm();
        }
    }

    fn request_timeout(&mut self) {
        debug!("update request timed out");
        self.set_error(Error::UpdateTimeout);
        self.refresh_reading();
    }

    /// New data was gathered: surface it according to current policy.
    fn notify_new_update(&mut self) {
        if !(self.pending.is_valid() && self.pending.is_fresh()) {
            return;
        }

        if self.request_timer.is_active() {
            self.request_timer.stop();
            self.emit_updated(true);
            self.refresh_reading();
        } else if self.running {
            if self.update_timer.is_active() {
                // previous tick found nothing: do not wait another interval
                if self.no_update_last_interval {
                    self.emit_pending_update();
                }
            } else {
                self.no_update_last_interval = !self.emit_updated(false);
            }
        }
    }

    /// Continuous update tick
    fn emit_pending_update(&mut self) {
        if self.pending.is_valid() && self.pending.is_fresh() {
            self.update_timeout_sent = false;
            self.no_update_last_interval = !self.emit_updated(false);
        } else {
            if self.no_update_last_interval && !self.update_timeout_sent {
                self.update_timeout_sent = true;
                self.set_error(Error::UpdateTimeout);
            }
            self.no_update_last_interval = true;
        }
    }

    /// Surfaces the pending update, unless it is identical to the
    /// previous one. Requested updates are always surfaced.
    /// Returns true if something was surfaced.
    fn emit_updated(&mut self, from_request: bool) -> bool {
        if !self.pending.is_fresh() {
            return false;
        }

        self.pending.consume();

        let snapshot = self.pending.snapshot();
        let in_use_updated = snapshot.in_use != self.last.in_use;
        let in_view_updated = snapshot.in_view != self.last.in_view;

        let mut emitted = false;

        if self.pending.valid_in_use() && (in_use_updated || from_request) {
            debug!("{} satellites in use", snapshot.in_use.len());
            self.events
                .push_back(Event::SatellitesInUse(snapshot.in_use.clone()));
            emitted = true;
        }

        if self.pending.valid_in_view() && (in_view_updated || from_request) {
            debug!("{} satellites in view", snapshot.in_view.len());
            self.events
                .push_back(Event::SatellitesInView(snapshot.in_view.clone()));
            emitted = true;
        }

        self.last = snapshot;
        emitted
    }
}
