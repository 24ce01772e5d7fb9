//! One builder per table. A builder turns one record into an entity, resolving
//! foreign keys against the collections built by earlier tables. A key that
//! does not resolve yields [`RecordError::UnresolvedReference`] so the loader
//! can tell filtered targets from broken ones.

mod agency;
mod attributions;
mod calendar;
mod fares;
mod feed_info;
mod frequencies;
mod levels;
mod pathways;
mod routes;
mod shapes;
mod stop_times;
mod stops;
mod transfers;
mod translations;
mod trips;

pub(crate) use agency::build_agency;
pub(crate) use attributions::build_attribution;
pub(crate) use calendar::{build_calendar_date, build_service};
pub(crate) use fares::{build_fare_attribute, build_fare_rule};
pub(crate) use feed_info::build_feed_info;
pub(crate) use frequencies::build_frequency;
pub(crate) use levels::build_level;
pub(crate) use pathways::build_pathway;
pub(crate) use routes::{build_route, mode_accepted};
pub(crate) use shapes::build_shape_point;
pub(crate) use stop_times::build_stop_time;
pub(crate) use stops::{build_stop, is_null_island};
pub(crate) use transfers::build_transfer;
pub(crate) use translations::build_translation;
pub(crate) use trips::build_trip;

use crate::decode::FieldReader;
use crate::error::RecordError;
use gtfs_model::{Collection, Identified, Idx};

pub(crate) fn resolve<T: Identified>(
    items: &Collection<T>,
    reader: &FieldReader<'_>,
    field: &'static str,
    table: &'static str,
) -> Result<Idx<T>, RecordError> {
    let id = reader.id(field)?;
    items
        .idx(&id)
        .ok_or(RecordError::UnresolvedReference { table, field, id })
}

pub(crate) fn resolve_optional<T: Identified>(
    items: &Collection<T>,
    reader: &FieldReader<'_>,
    field: &'static str,
    table: &'static str,
) -> Result<Option<Idx<T>>, RecordError> {
    if !reader.has(field) {
        return Ok(None);
    }
    resolve(items, reader, field, table).map(Some)
}
