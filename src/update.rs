//! Satellites in view / in use reconciliation
use std::collections::BTreeMap;

use itertools::Itertools;
use log::{debug, warn};

use crate::prelude::{Constellation, SatelliteRecord};

/// Reconciliation state of one [Constellation]
#[derive(Debug, Clone, Default, PartialEq)]
struct SystemState {
    /// Latest complete description of satellites in view
    in_view: Vec<SatelliteRecord>,
    /// Satellites in use, always a subset of [Self::in_view]
    in_use: Vec<SatelliteRecord>,
    /// Identifiers in use received before their description
    pending_in_use: Vec<u16>,
    /// An in use report was received since the previous in view description
    in_use_received: bool,
    /// A multi part in view description is being gathered
    updating_multi_part: bool,
    valid_in_view: bool,
    valid_in_use: bool,
}

impl SystemState {
    /// Holds a completed in view description. A constellation only known
    /// through unresolved in use identifiers is not described.
    fn is_described(&self) -> bool {
        self.valid_in_view || !self.in_view.is_empty()
    }
}

/// Resolves in use identifiers against satellites in view.
/// Returns None if any of them is missing.
fn resolve(ids: &[u16], in_view: &[SatelliteRecord]) -> Option<Vec<SatelliteRecord>> {
    ids.iter()
        .map(|id| in_view.iter().find(|sat| sat.id == *id).cloned())
        .collect()
}

/// [SatelliteUpdate] accumulates satellites in view and in use reports,
/// that arrive asynchronously and interleaved, and reconciles them per
/// [Constellation] into one coherent update.
/// An identifier is only considered "in use" once it was described as "in view".
#[derive(Debug, Clone, Default)]
pub struct SatelliteUpdate {
    systems: BTreeMap<Constellation, SystemState>,
    valid_in_view: bool,
    valid_in_use: bool,
    fresh: bool,
}

/// Snapshot of the last surfaced [SatelliteUpdate], used for deduplication.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct UpdateSnapshot {
    pub in_view: Vec<SatelliteRecord>,
    pub in_use: Vec<SatelliteRecord>,
}

impl SatelliteUpdate {
    /// Notifies that a multi part in view description started for this [Constellation].
    /// Reconciliation of in use reports is deferred until it completes.
    pub fn set_updating(&mut self, system: Constellation) {
        self.systems.entry(system).or_default().updating_multi_part = true;
    }

    /// Returns true while a multi part in view description is being
    /// gathered for this [Constellation].
    pub fn is_updating(&self, system: Constellation) -> bool {
        self.systems
            .get(&system)
            .map(|state| state.updating_multi_part)
            .unwrap_or(false)
    }

    /// Updates satellites in view of this [Constellation] with a complete description.
    /// Identifiers in use that were buffered, waiting for this description, are resolved now.
    pub fn set_satellites_in_view(
        &mut self,
        system: Constellation,
        satellites: Vec<SatelliteRecord>,
    ) {
        let state = self.systems.entry(system).or_default();

        state.updating_multi_part = false;
        state.in_view = satellites;
        state.valid_in_view = true;

        if !state.in_use_received {
            // Two consecutive descriptions without in use report in between:
            // nothing is in use. This is also how we handle empty $GNGSA,
            // that cannot be attributed to any constellation.
            state.in_use.clear();
            state.valid_in_use = true;
        }

        state.in_use_received = false;

        let pending = std::mem::take(&mut state.pending_in_use);

        if !pending.is_empty() {
            if pending.len() > state.in_view.len() {
                warn!(
                    "{:?}: {} satellites in use but only {} in view",
                    system,
                    pending.len(),
                    state.in_view.len()
                );
            }
            match resolve(&pending, &state.in_view) {
                Some(in_use) => {
                    state.in_use = in_use;
                    state.valid_in_use = true;
                },
                None => {
                    // received in use report prior this description, but it is unrelated
                    debug!(
                        "{:?}: discarding in use ({}): not described in view",
                        system,
                        pending.iter().join(",")
                    );
                    state.in_use.clear();
                    state.valid_in_use = false;
                },
            }
        } else if !state.in_use.is_empty() {
            // refresh with latest description, as long as it remains consistent
            let ids = state.in_use.iter().map(|sat| sat.id).collect::<Vec<_>>();
            match resolve(&ids, &state.in_view) {
                Some(in_use) => {
                    state.in_use = in_use;
                },
                None => {
                    debug!(
                        "{:?}: in use ({}) no longer in view",
                        system,
                        ids.iter().join(",")
                    );
                    state.in_use.clear();
                    state.valid_in_use = false;
                },
            }
        }

        self.refresh_validity();
        self.fresh = true;
    }

    /// Updates satellites in use of this [Constellation].
    /// Returns true if they could be resolved immediately. Otherwise, they are buffered
    /// until the related in view description completes.
    /// Reports that could not be attributed to any [Constellation] are dropped.
    pub fn set_satellites_in_use(&mut self, system: Constellation, ids: Vec<u16>) -> bool {
        if system == Constellation::Mixed {
            debug!(
                "dropping in use ({}): unknown constellation",
                ids.iter().join(",")
            );
            return false;
        }

        let state = self.systems.entry(system).or_default();

        state.in_use_received = true;
        state.in_use.clear();
        state.valid_in_use = false;

        if state.updating_multi_part {
            // a fresher description is being gathered
            state.pending_in_use = ids;
            state.valid_in_view = false;
            self.refresh_validity();
            return false;
        }

        if state.valid_in_view && ids.len() > state.in_view.len() {
            warn!(
                "{:?}: {} satellites in use but only {} in view",
                system,
                ids.len(),
                state.in_view.len()
            );
        }

        match resolve(&ids, &state.in_view) {
            Some(in_use) => {
                state.in_use = in_use;
                state.valid_in_use = true;
                state.pending_in_use.clear();
                self.refresh_validity();
                self.fresh = true;
                true
            },
            None => {
                // related description is still to come: buffer and wait for it
                state.pending_in_use = ids;
                state.in_view.clear();
                state.valid_in_view = false;
                self.refresh_validity();
                false
            },
        }
    }

    /// Aggregates over described constellations only: a stray in use report
    /// for a constellation that is never described must not block the others.
    fn refresh_validity(&mut self) {
        let (mut described, mut valid_in_view, mut valid_in_use) = (false, true, true);

        for state in self.systems.values().filter(|s| s.is_described()) {
            described = true;
            valid_in_view &= state.valid_in_view;
            valid_in_use &= state.valid_in_use;
        }

        self.valid_in_view = described && valid_in_view;
        self.valid_in_use = described && valid_in_use;
    }

    /// Satellites in view, for all constellations, in [Constellation] order.
    pub fn satellites_in_view(&self) -> Vec<SatelliteRecord> {
        self.systems
            .values()
            .flat_map(|state| state.in_view.iter().cloned())
            .collect()
    }

    /// Satellites in use, for all constellations, in [Constellation] order.
    pub fn satellites_in_use(&self) -> Vec<SatelliteRecord> {
        self.systems
            .values()
            .flat_map(|state| state.in_use.iter().cloned())
            .collect()
    }

    /// Identifiers in use buffered for this [Constellation],
    /// waiting for their in view description.
    pub fn pending_in_use(&self, system: Constellation) -> &[u16] {
        self.systems
            .get(&system)
            .map(|state| state.pending_in_use.as_slice())
            .unwrap_or(&[])
    }

    /// Returns true when every described constellation has a consistent in view description.
    pub fn valid_in_view(&self) -> bool {
        self.valid_in_view
    }

    /// Returns true when every described constellation has a consistent in use list.
    pub fn valid_in_use(&self) -> bool {
        self.valid_in_use
    }

    /// An update is usable as soon as either side is consistent.
    /// Many receivers do not emit GSA at all.
    pub fn is_valid(&self) -> bool {
        self.valid_in_view || self.valid_in_use
    }

    /// Returns true if new data arrived since last [Self::consume].
    pub fn is_fresh(&self) -> bool {
        self.fresh
    }

    /// Marks this update as consumed. Content is preserved.
    pub fn consume(&mut self) {
        self.fresh = false;
    }

    /// Resets all content.
    pub fn clear(&mut self) {
        self.systems.clear();
        self.valid_in_view = false;
        self.valid_in_use = false;
        self.fresh = false;
    }

    pub(crate) fn snapshot(&self) -> UpdateSnapshot {
        UpdateSnapshot {
            in_view: self.satellites_in_view(),
            in_use: self.satellites_in_use(),
        }
    }
}
