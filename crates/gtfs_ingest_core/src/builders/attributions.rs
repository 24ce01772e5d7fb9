use crate::builders::resolve_optional;
use crate::decode::FieldReader;
use crate::error::RecordError;
use crate::feed::Feed;
use crate::tables::{AGENCY_FILE, ROUTES_FILE, TRIPS_FILE};
use gtfs_model::Attribution;

/// An attribution applies to one agency, route or trip, or to the whole feed
/// when none is given.
pub(crate) fn build_attribution(
    feed: &Feed,
    reader: &mut FieldReader<'_>,
) -> Result<Attribution, RecordError> {
    let targets = ["agency_id", "route_id", "trip_id"]
        .iter()
        .filter(|field| reader.has(field))
        .count();
    if targets > 1 {
        return Err(RecordError::TypeOrFormat {
            field: "agency_id",
            value: reader.raw("agency_id").unwrap_or_default().to_string(),
            expected: "at most one of agency_id, route_id and trip_id",
        });
    }

    let attribution = Attribution {
        id: reader.optional_id("attribution_id"),
        agency: resolve_optional(&feed.agencies, reader, "agency_id", AGENCY_FILE)?,
        route: resolve_optional(&feed.routes, reader, "route_id", ROUTES_FILE)?,
        trip: resolve_optional(&feed.trips, reader, "trip_id", TRIPS_FILE)?,
        organization_name: reader.required_str("organization_name")?,
        is_producer: reader.bool_flag("is_producer", false)?,
        is_operator: reader.bool_flag("is_operator", false)?,
        is_authority: reader.bool_flag("is_authority", false)?,
        url: reader.url("attribution_url")?,
        email: reader.optional_str("attribution_email"),
        phone: reader.optional_str("attribution_phone"),
    };
    if !(attribution.is_producer || attribution.is_operator || attribution.is_authority) {
        return Err(RecordError::MissingRequiredField { field: "is_producer" });
    }
    Ok(attribution)
}
