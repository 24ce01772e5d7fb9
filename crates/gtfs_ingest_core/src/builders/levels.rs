use crate::decode::FieldReader;
use crate::error::RecordError;
use gtfs_model::Level;

pub(crate) fn build_level(reader: &mut FieldReader<'_>) -> Result<Level, RecordError> {
    Ok(Level {
        id: reader.id("level_id")?,
        index: reader.required_float("level_index", f64::MIN..=f64::MAX)?,
        name: reader.optional_str("level_name"),
    })
}
