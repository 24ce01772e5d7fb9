use crate::decode::FieldReader;
use crate::error::RecordError;
use gtfs_model::Translation;

pub(crate) fn build_translation(reader: &mut FieldReader<'_>) -> Result<Translation, RecordError> {
    let translation = Translation {
        table_name: reader.required_str("table_name")?,
        field_name: reader.required_str("field_name")?,
        language: reader.required_str("language")?,
        translation: reader.required_str("translation")?,
        record_id: reader.optional_str("record_id"),
        record_sub_id: reader.optional_str("record_sub_id"),
        field_value: reader.optional_str("field_value"),
    };
    if translation.record_id.is_none() && translation.field_value.is_none()
        && translation.table_name != "feed_info"
    {
        return Err(RecordError::MissingRequiredField { field: "record_id" });
    }
    Ok(translation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::{record, strict};

    const HEADER: &str = "table_name,field_name,language,translation,record_id,field_value";

    #[test]
    fn targets_a_record_or_a_value() {
        let by_id = record(HEADER, "stops,stop_name,de,Hauptbahnhof,S1,");
        assert!(build_translation(&mut strict(&by_id)).is_ok());
        let by_value = record(HEADER, "stops,stop_name,de,Hauptbahnhof,,Central");
        assert!(build_translation(&mut strict(&by_value)).is_ok());
        let feed_info = record(HEADER, "feed_info,feed_publisher_name,de,Verkehrsbund,,");
        assert!(build_translation(&mut strict(&feed_info)).is_ok());
        let dangling = record(HEADER, "stops,stop_name,de,Hauptbahnhof,,");
        assert!(build_translation(&mut strict(&dangling)).is_err());
    }
}
