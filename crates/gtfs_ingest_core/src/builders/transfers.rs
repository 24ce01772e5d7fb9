use crate::builders::resolve_optional;
use crate::decode::FieldReader;
use crate::error::RecordError;
use crate::feed::Feed;
use crate::tables::{ROUTES_FILE, STOPS_FILE, TRIPS_FILE};
use gtfs_model::{Transfer, TransferType};

/// Stops are required except for in-seat transfers, which link two trips.
pub(crate) fn build_transfer(
    feed: &Feed,
    reader: &mut FieldReader<'_>,
) -> Result<Transfer, RecordError> {
    let transfer_type = reader
        .code("transfer_type", Some(TransferType::Recommended))?
        .unwrap_or(TransferType::Recommended);

    let transfer = Transfer {
        from_stop: resolve_optional(&feed.stops, reader, "from_stop_id", STOPS_FILE)?,
        to_stop: resolve_optional(&feed.stops, reader, "to_stop_id", STOPS_FILE)?,
        from_route: resolve_optional(&feed.routes, reader, "from_route_id", ROUTES_FILE)?,
        to_route: resolve_optional(&feed.routes, reader, "to_route_id", ROUTES_FILE)?,
        from_trip: resolve_optional(&feed.trips, reader, "from_trip_id", TRIPS_FILE)?,
        to_trip: resolve_optional(&feed.trips, reader, "to_trip_id", TRIPS_FILE)?,
        transfer_type,
        min_transfer_time: reader
            .optional_int("min_transfer_time", 0..=i64::from(u32::MAX), None)?
            .map(|secs| secs as u32),
    };

    if transfer_type.is_in_seat() {
        if transfer.from_trip.is_none() {
            return Err(RecordError::MissingRequiredField { field: "from_trip_id" });
        }
        if transfer.to_trip.is_none() {
            return Err(RecordError::MissingRequiredField { field: "to_trip_id" });
        }
    } else {
        if transfer.from_stop.is_none() {
            return Err(RecordError::MissingRequiredField { field: "from_stop_id" });
        }
        if transfer.to_stop.is_none() {
            return Err(RecordError::MissingRequiredField { field: "to_stop_id" });
        }
    }
    Ok(transfer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::{record, strict};
    use gtfs_model::{Coordinates, Id, Stop};

    const HEADER: &str = "from_stop_id,to_stop_id,from_trip_id,to_trip_id,transfer_type,min_transfer_time";

    fn feed() -> Feed {
        let mut feed = Feed::default();
        for id in ["S1", "S2"] {
            feed.stops
                .push(Stop {
                    id: Id::from(id),
                    coordinates: Some(Coordinates::new(1.0, 1.0)),
                    ..Default::default()
                })
                .unwrap();
        }
        feed
    }

    #[test]
    fn builds_a_timed_transfer() {
        let feed = feed();
        let record = record(HEADER, "S1,S2,,,2,120");
        let transfer = build_transfer(&feed, &mut strict(&record)).unwrap();
        assert_eq!(transfer.transfer_type, TransferType::MinTime);
        assert_eq!(transfer.min_transfer_time, Some(120));
        assert_eq!(transfer.to_stop, feed.stops.idx("S2"));
    }

    #[test]
    fn stops_are_required_outside_in_seat_transfers() {
        let feed = feed();
        let record = record(HEADER, "S1,,,,0,");
        assert_eq!(
            build_transfer(&feed, &mut strict(&record)).unwrap_err(),
            RecordError::MissingRequiredField { field: "to_stop_id" }
        );
    }

    #[test]
    fn in_seat_transfers_need_trips() {
        let feed = feed();
        let record = record(HEADER, ",,,,4,");
        assert_eq!(
            build_transfer(&feed, &mut strict(&record)).unwrap_err(),
            RecordError::MissingRequiredField { field: "from_trip_id" }
        );
    }
}
