use crate::builders::resolve;
use crate::decode::FieldReader;
use crate::error::RecordError;
use crate::feed::Feed;
use crate::tables::STOPS_FILE;
use gtfs_model::{Pathway, PathwayMode};

pub(crate) fn build_pathway(feed: &Feed, reader: &mut FieldReader<'_>) -> Result<Pathway, RecordError> {
    let id = reader.id("pathway_id")?;
    let from_stop = resolve(&feed.stops, reader, "from_stop_id", STOPS_FILE)?;
    let to_stop = resolve(&feed.stops, reader, "to_stop_id", STOPS_FILE)?;
    let mode: PathwayMode = reader.required_code("pathway_mode")?;
    if !reader.has("is_bidirectional") {
        return Err(RecordError::MissingRequiredField {
            field: "is_bidirectional",
        });
    }
    let is_bidirectional = reader.bool_flag("is_bidirectional", false)?;

    Ok(Pathway {
        id,
        from_stop,
        to_stop,
        mode,
        is_bidirectional,
        length: reader.nullable_float("length", 0.0..=f64::MAX)?,
        traversal_time: reader
            .optional_int("traversal_time", 1..=i64::from(u32::MAX), None)?
            .map(|secs| secs as u32),
        stair_count: reader
            .optional_int("stair_count", i64::from(i32::MIN)..=i64::from(i32::MAX), None)?
            .map(|count| count as i32),
        max_slope: reader.nullable_float("max_slope", f64::MIN..=f64::MAX)?,
        min_width: reader.nullable_float("min_width", f64::MIN_POSITIVE..=f64::MAX)?,
        signposted_as: reader.optional_str("signposted_as"),
        reversed_signposted_as: reader.optional_str("reversed_signposted_as"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::{record, strict};
    use gtfs_model::{Id, LocationType, Stop};

    const HEADER: &str = "pathway_id,from_stop_id,to_stop_id,pathway_mode,is_bidirectional,stair_count";

    fn feed() -> Feed {
        let mut feed = Feed::default();
        for id in ["E1", "N1"] {
            feed.stops
                .push(Stop {
                    id: Id::from(id),
                    location_type: LocationType::GenericNode,
                    ..Default::default()
                })
                .unwrap();
        }
        feed
    }

    #[test]
    fn builds_stairs() {
        let feed = feed();
        let record = record(HEADER, "PW1,E1,N1,2,1,-12");
        let pathway = build_pathway(&feed, &mut strict(&record)).unwrap();
        assert_eq!(pathway.mode, PathwayMode::Stairs);
        assert!(pathway.is_bidirectional);
        assert_eq!(pathway.stair_count, Some(-12));
    }

    #[test]
    fn direction_flag_is_required() {
        let feed = feed();
        let record = record(HEADER, "PW1,E1,N1,1,,");
        assert_eq!(
            build_pathway(&feed, &mut strict(&record)).unwrap_err(),
            RecordError::MissingRequiredField {
                field: "is_bidirectional"
            }
        );
    }
}
