use crate::decode::FieldReader;
use crate::error::RecordError;
use gtfs_model::FeedInfo;

pub(crate) fn build_feed_info(reader: &mut FieldReader<'_>) -> Result<FeedInfo, RecordError> {
    let start_date = reader.optional_date("feed_start_date")?;
    let end_date = reader.optional_date("feed_end_date")?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if end < start {
            return Err(RecordError::Range {
                field: "feed_end_date",
                value: end.to_string(),
                bounds: format!("[{start}, +inf)"),
            });
        }
    }

    Ok(FeedInfo {
        publisher_name: reader.required_str("feed_publisher_name")?,
        publisher_url: reader.required_url("feed_publisher_url")?,
        lang: reader.required_str("feed_lang")?,
        default_lang: reader.optional_str("default_lang"),
        start_date,
        end_date,
        version: reader.optional_str("feed_version"),
        contact_email: reader.optional_str("feed_contact_email"),
        contact_url: reader.url("feed_contact_url")?,
    })
}
