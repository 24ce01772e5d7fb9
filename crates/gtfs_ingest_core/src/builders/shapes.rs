use crate::builders::{is_null_island, resolve};
use crate::decode::FieldReader;
use crate::error::RecordError;
use crate::feed::Feed;
use crate::tables::SHAPES_FILE;
use gtfs_model::{Idx, Shape, ShapePoint};

/// Builds one point of a shape whose container the reservation pass created.
pub(crate) fn build_shape_point(
    feed: &Feed,
    reader: &mut FieldReader<'_>,
) -> Result<(Idx<Shape>, ShapePoint), RecordError> {
    let shape = resolve(&feed.shapes, reader, "shape_id", SHAPES_FILE)?;
    let lat = reader.required_float("shape_pt_lat", -90.0..=90.0)?;
    let lon = reader.required_float("shape_pt_lon", -180.0..=180.0)?;
    if feed.config.check_null_coordinates && is_null_island(lat, lon) {
        return Err(RecordError::Range {
            field: "shape_pt_lat",
            value: format!("{lat},{lon}"),
            bounds: "coordinates away from (0, 0)".to_string(),
        });
    }
    let sequence = reader.required_int("shape_pt_sequence", 0..=i64::from(u32::MAX), None)? as u32;
    let dist_traveled = reader.nullable_float("shape_dist_traveled", 0.0..=f64::MAX)?;

    Ok((
        shape,
        ShapePoint {
            lat,
            lon,
            sequence,
            dist_traveled,
        },
    ))
}
