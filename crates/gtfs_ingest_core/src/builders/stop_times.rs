use crate::builders::resolve;
use crate::decode::FieldReader;
use crate::error::RecordError;
use crate::feed::Feed;
use crate::tables::{STOPS_FILE, TRIPS_FILE};
use gtfs_model::{ContinuousPickupDropOff, Idx, PickupDropOffType, StopTime, StopTimeFlags, Trip};

/// Builds one stop time of a trip. When only one of arrival and departure
/// is given, the other takes the same value.
pub(crate) fn build_stop_time(
    feed: &Feed,
    reader: &mut FieldReader<'_>,
) -> Result<(Idx<Trip>, StopTime), RecordError> {
    let trip = resolve(&feed.trips, reader, "trip_id", TRIPS_FILE)?;
    let stop = resolve(&feed.stops, reader, "stop_id", STOPS_FILE)?;
    let sequence = reader.required_int("stop_sequence", 0..=i64::from(u32::MAX), None)? as u32;

    let arrival = reader.optional_time("arrival_time")?;
    let departure = reader.optional_time("departure_time")?;
    let (arrival_time, departure_time) = match (arrival, departure) {
        (Some(arrival), None) => (Some(arrival), Some(arrival)),
        (None, Some(departure)) => (Some(departure), Some(departure)),
        pair => pair,
    };

    let flags = StopTimeFlags::new(
        reader
            .code("pickup_type", Some(PickupDropOffType::Regular))?
            .unwrap_or(PickupDropOffType::Regular),
        reader
            .code("drop_off_type", Some(PickupDropOffType::Regular))?
            .unwrap_or(PickupDropOffType::Regular),
        reader
            .code("continuous_pickup", Some(ContinuousPickupDropOff::NoContinuous))?
            .unwrap_or(ContinuousPickupDropOff::NoContinuous),
        reader
            .code("continuous_drop_off", Some(ContinuousPickupDropOff::NoContinuous))?
            .unwrap_or(ContinuousPickupDropOff::NoContinuous),
        reader.bool_flag("timepoint", arrival_time.is_some())?,
    );

    Ok((
        trip,
        StopTime {
            arrival_time,
            departure_time,
            stop,
            sequence,
            flags,
            shape_dist_traveled: reader.nullable_float("shape_dist_traveled", 0.0..=f64::MAX)?,
        },
    ))
}
