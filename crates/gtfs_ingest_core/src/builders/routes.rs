use crate::builders::resolve;
use crate::decode::FieldReader;
use crate::error::RecordError;
use crate::feed::Feed;
use crate::loader::ParseContext;
use crate::tables::AGENCY_FILE;
use gtfs_model::{ContinuousPickupDropOff, GtfsCode, GtfsColor, Route, RouteType};

pub(crate) fn build_route(
    feed: &Feed,
    ctx: &ParseContext<'_>,
    reader: &mut FieldReader<'_>,
) -> Result<Route, RecordError> {
    let id = reader.id("route_id")?;
    let agency = if reader.has("agency_id") {
        Some(resolve(&feed.agencies, reader, "agency_id", AGENCY_FILE)?)
    } else {
        match ctx.default_agency() {
            Some(agency) => Some(agency),
            None => return Err(RecordError::MissingRequiredField { field: "agency_id" }),
        }
    };

    let short_name = reader.optional_str("route_short_name");
    let long_name = reader.optional_str("route_long_name");
    if short_name.is_none() && long_name.is_none() {
        return Err(RecordError::MissingRequiredField {
            field: "route_short_name",
        });
    }

    let mut route_type = reader
        .code("route_type", Some(RouteType::Bus))?
        .ok_or(RecordError::MissingRequiredField { field: "route_type" })?;
    if feed.config.normalize_route_types {
        route_type = route_type.normalized();
    }

    Ok(Route {
        id,
        agency,
        short_name,
        long_name,
        desc: reader.optional_str("route_desc"),
        route_type,
        url: reader.url("route_url")?,
        color: reader.color("route_color", GtfsColor::WHITE)?,
        text_color: reader.color("route_text_color", GtfsColor::BLACK)?,
        sort_order: reader
            .optional_int("route_sort_order", 0..=i64::from(u32::MAX), None)?
            .map(|order| order as u32),
        continuous_pickup: reader
            .code("continuous_pickup", Some(ContinuousPickupDropOff::NoContinuous))?
            .unwrap_or(ContinuousPickupDropOff::NoContinuous),
        continuous_drop_off: reader
            .code("continuous_drop_off", Some(ContinuousPickupDropOff::NoContinuous))?
            .unwrap_or(ContinuousPickupDropOff::NoContinuous),
    })
}

/// Whether the mode filter lets `route` through. A route is accepted when
/// either its declared code or its normalised code is listed.
pub(crate) fn mode_accepted(feed: &Feed, route_type: RouteType) -> bool {
    match &feed.config.route_types {
        None => true,
        Some(accepted) => {
            accepted.contains(&route_type.code()) || accepted.contains(&route_type.normalized().code())
        }
    }
}
