use crate::builders::{resolve, resolve_optional};
use crate::decode::FieldReader;
use crate::error::RecordError;
use crate::feed::Feed;
use crate::loader::ParseContext;
use crate::tables::{AGENCY_FILE, FARE_ATTRIBUTES_FILE, ROUTES_FILE, STOPS_FILE};
use gtfs_model::{FareAttribute, FareRule, Id, Idx};

pub(crate) fn build_fare_attribute(
    feed: &Feed,
    ctx: &ParseContext<'_>,
    reader: &mut FieldReader<'_>,
) -> Result<FareAttribute, RecordError> {
    let id = reader.id("fare_id")?;
    let price = reader.required_float("price", 0.0..=f64::MAX)?;
    let currency = reader.required_str("currency_type")?;
    if currency.len() != 3 || !currency.chars().all(|ch| ch.is_ascii_alphabetic()) {
        return Err(RecordError::TypeOrFormat {
            field: "currency_type",
            value: currency,
            expected: "an ISO 4217 currency code",
        });
    }
    let payment_method = reader.required_code("payment_method")?;
    // An empty `transfers` cell means unlimited transfers.
    let transfers = reader
        .optional_int("transfers", 0..=2, None)?
        .map(|count| count as u8);
    let agency = match resolve_optional(&feed.agencies, reader, "agency_id", AGENCY_FILE)? {
        Some(agency) => Some(agency),
        None => ctx.default_agency(),
    };

    Ok(FareAttribute {
        id,
        price,
        currency: currency.to_ascii_uppercase(),
        payment_method,
        transfers,
        agency,
        transfer_duration: reader
            .optional_int("transfer_duration", 0..=i64::from(u32::MAX), None)?
            .map(|secs| secs as u32),
        rules: Vec::new(),
    })
}

/// Builds a rule of an existing fare. Zone ids must be carried by some stop
/// of the feed.
pub(crate) fn build_fare_rule(
    feed: &Feed,
    ctx: &ParseContext<'_>,
    reader: &mut FieldReader<'_>,
) -> Result<(Idx<FareAttribute>, FareRule), RecordError> {
    let fare = resolve(&feed.fare_attributes, reader, "fare_id", FARE_ATTRIBUTES_FILE)?;
    let route = resolve_optional(&feed.routes, reader, "route_id", ROUTES_FILE)?;
    let zone = |field: &'static str| -> Result<Option<Id>, RecordError> {
        match reader.optional_id(field) {
            Some(zone) if !ctx.zones.contains(&zone) => {
                Err(RecordError::UnresolvedReference {
                    table: STOPS_FILE,
                    field,
                    id: zone,
                })
            }
            zone => Ok(zone),
        }
    };

    Ok((
        fare,
        FareRule {
            route,
            origin_id: zone("origin_id")?,
            destination_id: zone("destination_id")?,
            contains_id: zone("contains_id")?,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::test_support::{record, strict};
    use gtfs_model::PaymentMethod;

    const FARE_HEADER: &str = "fare_id,price,currency_type,payment_method,transfers";
    const RULE_HEADER: &str = "fare_id,route_id,origin_id,destination_id";

    fn feed_with_fare() -> Feed {
        let mut feed = Feed::default();
        let ctx = ParseContext::new("", Default::default());
        let record = record(FARE_HEADER, "F1,2.50,eur,0,");
        let fare = build_fare_attribute(&feed, &ctx, &mut strict(&record)).unwrap();
        feed.fare_attributes.push(fare).unwrap();
        feed
    }

    #[test]
    fn empty_transfers_means_unlimited() {
        let feed = feed_with_fare();
        let fare = feed.fare_attribute_by_id("F1").unwrap();
        assert_eq!(fare.transfers, None);
        assert_eq!(fare.currency, "EUR");
        assert_eq!(fare.payment_method, PaymentMethod::OnBoard);
    }

    #[test]
    fn rejects_malformed_currency() {
        let feed = Feed::default();
        let ctx = ParseContext::new("", Default::default());
        let record = record(FARE_HEADER, "F1,2.50,EURO,0,");
        assert!(matches!(
            build_fare_attribute(&feed, &ctx, &mut strict(&record)),
            Err(RecordError::TypeOrFormat { field: "currency_type", .. })
        ));
    }

    #[test]
    fn zones_must_belong_to_a_stop() {
        let feed = feed_with_fare();
        let mut ctx = ParseContext::new("", Default::default());
        ctx.zones.insert(Id::from("Z1"));

        let known = record(RULE_HEADER, "F1,,Z1,");
        let (_, rule) = build_fare_rule(&feed, &ctx, &mut strict(&known)).unwrap();
        assert_eq!(rule.origin_id.as_deref(), Some("Z1"));
        assert!(rule.destination_id.is_none());

        let unknown = record(RULE_HEADER, "F1,,Z1,Z2");
        assert_eq!(
            build_fare_rule(&feed, &ctx, &mut strict(&unknown)).unwrap_err(),
            RecordError::unresolved(STOPS_FILE, "destination_id", "Z2")
        );
    }
}
