use crate::builders::resolve_optional;
use crate::decode::FieldReader;
use crate::error::RecordError;
use crate::feed::Feed;
use crate::tables::LEVELS_FILE;
use gtfs_model::{Coordinates, LocationType, Stop, WheelchairBoarding};

const NULL_ISLAND_EPSILON: f64 = 1e-4;

/// Coordinates so close to (0, 0) that they are almost surely a placeholder.
pub(crate) fn is_null_island(lat: f64, lon: f64) -> bool {
    lat.abs() < NULL_ISLAND_EPSILON && lon.abs() < NULL_ISLAND_EPSILON
}

/// Builds a stop. `parent_station` is kept raw here: the parent may appear
/// later in the file, so it is resolved once the whole table has been read.
pub(crate) fn build_stop(feed: &Feed, reader: &mut FieldReader<'_>) -> Result<Stop, RecordError> {
    let id = reader.id("stop_id")?;
    let location_type = reader
        .code("location_type", Some(LocationType::StopOrPlatform))?
        .unwrap_or_default();

    let name = reader.optional_str("stop_name");
    if name.is_none() && location_type.requires_coordinates() {
        return Err(RecordError::MissingRequiredField { field: "stop_name" });
    }

    let lat = reader.nullable_float("stop_lat", -90.0..=90.0)?;
    let lon = reader.nullable_float("stop_lon", -180.0..=180.0)?;
    let mut coordinates = match (lat, lon) {
        (Some(lat), Some(lon)) => Some(Coordinates::new(lat, lon)),
        _ => None,
    };
    if let Some(point) = coordinates {
        if feed.config.check_null_coordinates && is_null_island(point.lat, point.lon) {
            let raw = format!("{},{}", point.lat, point.lon);
            let error = RecordError::Range {
                field: "stop_lat",
                value: raw.clone(),
                bounds: "coordinates away from (0, 0)".to_string(),
            };
            let default = (!location_type.requires_coordinates()).then_some(None::<f64>);
            reader.substitute("stop_lat", &raw, default, error)?;
            coordinates = None;
        }
    }
    if coordinates.is_none() && location_type.requires_coordinates() {
        let field = if lat.is_none() { "stop_lat" } else { "stop_lon" };
        return Err(RecordError::MissingRequiredField { field });
    }

    Ok(Stop {
        id,
        code: reader.optional_str("stop_code"),
        name,
        desc: reader.optional_str("stop_desc"),
        coordinates,
        zone_id: reader.optional_id("zone_id"),
        url: reader.url("stop_url")?,
        location_type,
        parent_station: reader.optional_id("parent_station"),
        parent: None,
        timezone: reader.optional_timezone("stop_timezone")?,
        wheelchair_boarding: reader.code("wheelchair_boarding", Some(WheelchairBoarding::NoInfo))?,
        level: resolve_optional(&feed.levels, reader, "level_id", LEVELS_FILE)?,
        platform_code: reader.optional_str("platform_code"),
    })
}
