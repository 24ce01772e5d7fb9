use crate::builders::{resolve, resolve_optional};
use crate::decode::FieldReader;
use crate::error::RecordError;
use crate::feed::Feed;
use crate::tables::{CALENDAR_FILE, ROUTES_FILE, SHAPES_FILE};
use gtfs_model::{BikesAllowed, Trip, WheelchairAccessible};

/// Builds a trip header; stop times and frequencies are attached later.
pub(crate) fn build_trip(feed: &Feed, reader: &mut FieldReader<'_>) -> Result<Trip, RecordError> {
    let id = reader.id("trip_id")?;
    let route = resolve(&feed.routes, reader, "route_id", ROUTES_FILE)?;
    let service = resolve(&feed.services, reader, "service_id", CALENDAR_FILE)?;

    let mut trip = Trip::new(id, route, service);
    trip.shape = resolve_optional(&feed.shapes, reader, "shape_id", SHAPES_FILE)?;
    trip.headsign = reader.optional_str("trip_headsign");
    trip.short_name = reader.optional_str("trip_short_name");
    trip.direction_id = reader.code("direction_id", None)?;
    trip.block_id = reader.optional_id("block_id");
    trip.wheelchair_accessible =
        reader.code("wheelchair_accessible", Some(WheelchairAccessible::NoInfo))?;
    trip.bikes_allowed = reader.code("bikes_allowed", Some(BikesAllowed::NoInfo))?;
    Ok(trip)
}
