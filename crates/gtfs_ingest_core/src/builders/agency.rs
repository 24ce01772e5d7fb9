use crate::decode::FieldReader;
use crate::error::RecordError;
use crate::loader::ParseContext;
use gtfs_model::{Agency, Id};

/// `agency_id` may only be omitted by the single agency of a feed. Every
/// agency of one feed must share the first agency's timezone.
pub(crate) fn build_agency(
    ctx: &ParseContext<'_>,
    reader: &mut FieldReader<'_>,
) -> Result<Agency, RecordError> {
    let id = match reader.optional_id("agency_id") {
        Some(_) if ctx.anonymous_agency => {
            return Err(RecordError::MissingRequiredField { field: "agency_id" })
        }
        Some(id) => id,
        None if ctx.agency_count == 0 => Id::from(ctx.prefix),
        None => return Err(RecordError::MissingRequiredField { field: "agency_id" }),
    };

    let timezone = reader.timezone("agency_timezone")?;
    if let Some(expected) = &ctx.timezone {
        if *expected != timezone {
            return Err(RecordError::CrossEntity(format!(
                "agency '{id}' uses timezone '{timezone}' but the feed uses '{expected}'"
            )));
        }
    }

    Ok(Agency {
        name: reader.required_str("agency_name")?,
        url: reader.required_url("agency_url")?,
        timezone,
        lang: reader.optional_str("agency_lang"),
        phone: reader.optional_str("agency_phone"),
        fare_url: reader.url("agency_fare_url")?,
        email: reader.optional_str("agency_email"),
        id,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::{record, strict};
    use crate::error::ErrorKind;

    const HEADER: &str = "agency_id,agency_name,agency_url,agency_timezone";

    #[test]
    fn builds_a_complete_agency() {
        let record = record(HEADER, "A1,Metro,https://metro.example,Europe/Paris");
        let ctx = ParseContext::new("", Default::default());
        let agency = build_agency(&ctx, &mut strict(&record)).unwrap();
        assert_eq!(agency.id, "A1");
        assert_eq!(agency.timezone, "Europe/Paris");
        assert!(agency.lang.is_none());
    }

    #[test]
    fn single_agency_may_omit_its_id() {
        let record = record(HEADER, ",Metro,https://metro.example,Europe/Paris");
        let ctx = ParseContext::new("", Default::default());
        let agency = build_agency(&ctx, &mut strict(&record)).unwrap();
        assert_eq!(agency.id, "");
    }

    #[test]
    fn timezone_mismatch_is_a_cross_entity_error() {
        let record = record(HEADER, "A2,Bus,https://bus.example,Europe/Berlin");
        let mut ctx = ParseContext::new("", Default::default());
        ctx.timezone = Some("Europe/Paris".to_string());
        ctx.agency_count = 1;
        let err = build_agency(&ctx, &mut strict(&record)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CrossEntityConsistency);
    }

    #[test]
    fn rejects_relative_urls_and_unknown_zones() {
        let ctx = ParseContext::new("", Default::default());
        let record_url = record(HEADER, "A1,Metro,metro.example,Europe/Paris");
        assert!(build_agency(&ctx, &mut strict(&record_url)).is_err());
        let record_tz = record(HEADER, "A1,Metro,https://metro.example,Paris");
        assert!(build_agency(&ctx, &mut strict(&record_tz)).is_err());
    }
}
