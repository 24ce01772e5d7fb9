//! Checks that need a whole table in memory: sequence order and cumulative
//! distance of shape points and stop times, the chronology of stop times, and
//! the parent-station hierarchy of stops.

use std::collections::BTreeMap;

use crate::config::ErrorPolicy;
use crate::error::{ParseError, RecordError};
use crate::feed::Feed;
use crate::notice::{
    ValidationNotice, NOTICE_CODE_DEFAULT_SUBSTITUTED, NOTICE_CODE_DISTANCE_CLEARED,
    NOTICE_CODE_SHAPE_POINT_REMOVED,
};
use crate::tables::{EntityKind, SHAPES_FILE, STOPS_FILE, STOP_TIMES_FILE};
use gtfs_model::{GtfsTime, Idx, ShapePoint, Stop, StopTime};

/// What the active policy does with one violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Remedy {
    Substitute,
    Drop,
    Fail,
}

impl Remedy {
    /// Substitution needs a default to exist; without one the policy degrades
    /// to dropping, then to failing.
    pub(crate) fn for_policy(policy: ErrorPolicy, has_default: bool) -> Self {
        if policy.use_default_on_error && has_default {
            Remedy::Substitute
        } else if policy.drop_erroneous {
            Remedy::Drop
        } else {
            Remedy::Fail
        }
    }
}

/// Rows removed and repairs made by one sweep.
#[derive(Debug, Default)]
pub(crate) struct SweepOutcome {
    pub dropped: usize,
    pub notices: Vec<ValidationNotice>,
}

impl SweepOutcome {
    fn drop_row(&mut self, code: Option<&str>, file: &str, line: u64, error: &RecordError) {
        tracing::warn!(file, line, error = %error, "dropping record");
        self.dropped += 1;
        let notice = match code {
            Some(code) => ValidationNotice::repaired(code, error.kind(), error.to_string())
                .with_location(file, line),
            None => ValidationNotice::record_dropped(file, line, error),
        };
        self.notices.push(notice);
    }

    fn repair(&mut self, code: &str, file: &str, line: u64, error: &RecordError) {
        tracing::warn!(file, line, error = %error, "repairing record");
        self.notices.push(
            ValidationNotice::repaired(code, error.kind(), error.to_string())
                .with_location(file, line),
        );
    }
}

/// Rows that carry a sequence number and a cumulative distance.
trait Sequenced {
    fn sequence(&self) -> u32;
    fn distance_mut(&mut self) -> &mut Option<f64>;
}

impl Sequenced for ShapePoint {
    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn distance_mut(&mut self) -> &mut Option<f64> {
        &mut self.dist_traveled
    }
}

impl Sequenced for StopTime {
    fn sequence(&self) -> u32 {
        self.sequence
    }

    fn distance_mut(&mut self) -> &mut Option<f64> {
        &mut self.shape_dist_traveled
    }
}

struct Sweep<'a> {
    file: &'static str,
    /// Notice code of a removed row; `None` reports it as a dropped record.
    drop_code: Option<&'static str>,
    policy: ErrorPolicy,
    outcome: &'a mut SweepOutcome,
}

impl Sweep<'_> {
    /// Sorts by sequence number and removes rows repeating one. A repeated
    /// sequence number has no default.
    fn order<T: Sequenced>(&mut self, mut rows: Vec<(u64, T)>) -> Result<Vec<(u64, T)>, ParseError> {
        rows.sort_by_key(|(_, item)| item.sequence());
        let mut kept: Vec<(u64, T)> = Vec::with_capacity(rows.len());
        for (line, item) in rows {
            if let Some((_, previous)) = kept.last() {
                if previous.sequence() == item.sequence() {
                    let error = RecordError::Ordering(format!(
                        "sequence number {} is used twice",
                        item.sequence()
                    ));
                    self.resolve(line, error, false)?;
                    continue;
                }
            }
            kept.push((line, item));
        }
        Ok(kept)
    }

    /// Cumulative distance may never fall below the maximum seen so far.
    /// Returns false when the row must be removed.
    fn check_distance<T: Sequenced>(
        &mut self,
        line: u64,
        item: &mut T,
        running_max: &mut Option<f64>,
    ) -> Result<bool, ParseError> {
        let Some(distance) = *item.distance_mut() else {
            return Ok(true);
        };
        match *running_max {
            Some(max) if distance < max => {
                let error = RecordError::Monotonicity(format!(
                    "distance {distance} is below the preceding distance {max}"
                ));
                match self.resolve(line, error.clone(), true)? {
                    Remedy::Substitute => {
                        *item.distance_mut() = None;
                        self.outcome
                            .repair(NOTICE_CODE_DISTANCE_CLEARED, self.file, line, &error);
                        Ok(true)
                    }
                    _ => Ok(false),
                }
            }
            _ => {
                *running_max = Some(distance);
                Ok(true)
            }
        }
    }

    /// Applies the policy to a violation. A dropped row is recorded here;
    /// substitution is left to the caller.
    fn resolve(&mut self, line: u64, error: RecordError, has_default: bool) -> Result<Remedy, ParseError> {
        match Remedy::for_policy(self.policy, has_default) {
            Remedy::Substitute => Ok(Remedy::Substitute),
            Remedy::Drop => {
                self.outcome.drop_row(self.drop_code, self.file, line, &error);
                Ok(Remedy::Drop)
            }
            Remedy::Fail => Err(ParseError::record(self.file, line, error)),
        }
    }
}

fn stage<T>(items: &mut Vec<T>, lines: Vec<u64>) -> Vec<(u64, T)> {
    lines.into_iter().zip(items.drain(..)).collect()
}

/// Orders the points of one shape and enforces non-decreasing distances.
/// `lines[i]` is the file line of `points[i]`.
pub(crate) fn sweep_shape_points(
    points: &mut Vec<ShapePoint>,
    lines: Vec<u64>,
    policy: ErrorPolicy,
) -> Result<SweepOutcome, ParseError> {
    let mut outcome = SweepOutcome::default();
    let mut sweep = Sweep {
        file: SHAPES_FILE,
        drop_code: Some(NOTICE_CODE_SHAPE_POINT_REMOVED),
        policy,
        outcome: &mut outcome,
    };
    let rows = sweep.order(stage(points, lines))?;
    let mut running_max = None;
    for (line, mut point) in rows {
        if sweep.check_distance(line, &mut point, &mut running_max)? {
            points.push(point);
        }
    }
    Ok(outcome)
}

/// Orders the stop times of one trip, enforces non-decreasing distances and
/// checks that no stop is reached before the previous one is left. Only the
/// immediately preceding kept row is compared; an untimed row breaks the chain.
pub(crate) fn sweep_stop_times(
    stop_times: &mut Vec<StopTime>,
    lines: Vec<u64>,
    policy: ErrorPolicy,
) -> Result<SweepOutcome, ParseError> {
    let mut outcome = SweepOutcome::default();
    let mut sweep = Sweep {
        file: STOP_TIMES_FILE,
        drop_code: None,
        policy,
        outcome: &mut outcome,
    };
    let rows = sweep.order(stage(stop_times, lines))?;
    let last = rows.len().saturating_sub(1);
    let mut running_max = None;
    let mut last_departure: Option<GtfsTime> = None;

    for (position, (line, mut stop_time)) in rows.into_iter().enumerate() {
        if !sweep.check_distance(line, &mut stop_time, &mut running_max)? {
            continue;
        }

        if let (Some(arrival), Some(departure)) = (stop_time.arrival_time, stop_time.departure_time) {
            if departure < arrival {
                let error = RecordError::Monotonicity(format!(
                    "departure_time {departure} precedes arrival_time {arrival}"
                ));
                match sweep.resolve(line, error.clone(), true)? {
                    Remedy::Substitute => {
                        stop_time.departure_time = Some(arrival);
                        sweep
                            .outcome
                            .repair(NOTICE_CODE_DEFAULT_SUBSTITUTED, STOP_TIMES_FILE, line, &error);
                    }
                    _ => continue,
                }
            }
        }

        if let (Some(arrival), Some(previous)) = (stop_time.arrival_time, last_departure) {
            if arrival < previous {
                let error = RecordError::Monotonicity(format!(
                    "arrival_time {arrival} precedes the previous departure_time {previous}"
                ));
                // The last stop of a trip must keep its times.
                match sweep.resolve(line, error.clone(), position != last)? {
                    Remedy::Substitute => {
                        stop_time.arrival_time = None;
                        stop_time.departure_time = None;
                        stop_time.flags.set_timepoint(false);
                        sweep
                            .outcome
                            .repair(NOTICE_CODE_DEFAULT_SUBSTITUTED, STOP_TIMES_FILE, line, &error);
                    }
                    _ => continue,
                }
            }
        }

        last_departure = stop_time.departure_time;
        stop_times.push(stop_time);
    }
    Ok(outcome)
}

impl Feed {
    /// Parent of `stop` per the location-type hierarchy. A parent removed by
    /// the boundary filter leaves the stop without a parent.
    fn parent_of(&self, stop: &Stop) -> Result<Option<Idx<Stop>>, RecordError> {
        let Some(parent_id) = &stop.parent_station else {
            return Ok(None);
        };
        let Some(parent_idx) = self.stops.idx(parent_id) else {
            if self.exclusions.stops.contains(parent_id) {
                return Ok(None);
            }
            return Err(RecordError::unresolved(STOPS_FILE, "parent_station", parent_id));
        };
        let Some(required) = stop.location_type.required_parent() else {
            return Err(RecordError::Hierarchy(format!(
                "station '{}' cannot have a parent station",
                stop.id
            )));
        };
        let parent_type = self
            .stops
            .get(parent_idx)
            .map(|parent| parent.location_type)
            .unwrap_or_default();
        if parent_type != required {
            return Err(RecordError::Hierarchy(format!(
                "'{}' of type {:?} cannot have '{}' of type {:?} as parent",
                stop.id, stop.location_type, parent_id, parent_type
            )));
        }
        Ok(Some(parent_idx))
    }

    /// Resolves `parent_station` once every stop is known. A dropped stop
    /// unresolves its children, so the pass repeats until nothing is dropped.
    pub(crate) fn link_parent_stations(
        &mut self,
        lines: &BTreeMap<Idx<Stop>, u64>,
        policy: ErrorPolicy,
    ) -> Result<(), ParseError> {
        loop {
            let mut dropped_any = false;
            for (&idx, &line) in lines {
                let Some(stop) = self.stops.get(idx) else {
                    continue;
                };
                let Some(parent_id) = stop.parent_station.clone() else {
                    continue;
                };
                let error = match self.parent_of(stop) {
                    Ok(parent) => {
                        if let Some(stop) = self.stops.get_mut(idx) {
                            stop.parent = parent;
                        }
                        continue;
                    }
                    Err(error) => error,
                };

                match Remedy::for_policy(policy, true) {
                    Remedy::Substitute => {
                        tracing::warn!(file = STOPS_FILE, line, error = %error, "clearing parent station");
                        self.notices.push(
                            ValidationNotice::default_substituted(
                                "parent_station",
                                &parent_id,
                                None::<String>,
                            )
                            .with_location(STOPS_FILE, line),
                        );
                        if let Some(stop) = self.stops.get_mut(idx) {
                            stop.parent_station = None;
                            stop.parent = None;
                        }
                    }
                    Remedy::Drop => {
                        tracing::warn!(file = STOPS_FILE, line, error = %error, "dropping record");
                        self.notices
                            .push(ValidationNotice::record_dropped(STOPS_FILE, line, &error));
                        self.count_dropped(EntityKind::Stop);
                        self.stops.remove(idx);
                        dropped_any = true;
                    }
                    Remedy::Fail => return Err(ParseError::record(STOPS_FILE, line, error)),
                }
            }
            if !dropped_any {
                return Ok(());
            }
        }
    }
}
