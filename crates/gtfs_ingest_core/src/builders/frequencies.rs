use crate::builders::resolve;
use crate::decode::FieldReader;
use crate::error::RecordError;
use crate::feed::Feed;
use crate::tables::TRIPS_FILE;
use gtfs_model::{Frequency, Idx, Trip};

pub(crate) fn build_frequency(
    feed: &Feed,
    reader: &mut FieldReader<'_>,
) -> Result<(Idx<Trip>, Frequency), RecordError> {
    let trip = resolve(&feed.trips, reader, "trip_id", TRIPS_FILE)?;
    let start_time = reader.time("start_time")?;
    let end_time = reader.time("end_time")?;
    if end_time <= start_time {
        return Err(RecordError::Range {
            field: "end_time",
            value: end_time.to_string(),
            bounds: format!("({start_time}, +inf)"),
        });
    }
    let headway_secs = reader.required_int("headway_secs", 1..=i64::from(u32::MAX), None)? as u32;

    Ok((
        trip,
        Frequency {
            start_time,
            end_time,
            headway_secs,
            exact_times: reader.bool_flag("exact_times", false)?,
        },
    ))
}
