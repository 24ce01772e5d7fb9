use chrono::Weekday;

use crate::decode::FieldReader;
use crate::error::RecordError;
use gtfs_model::{ExceptionType, GtfsDate, Id, Service};

const WEEKDAY_COLUMNS: [(&str, Weekday); 7] = [
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("sunday", Weekday::Sun),
];

pub(crate) fn build_service(reader: &mut FieldReader<'_>) -> Result<Service, RecordError> {
    let mut service = Service::new(reader.id("service_id")?);
    for (field, weekday) in WEEKDAY_COLUMNS {
        if !reader.has(field) {
            return Err(RecordError::MissingRequiredField { field });
        }
        let active = reader.bool_flag(field, false)?;
        service.set_weekday(weekday, active);
    }

    let start = reader.date("start_date")?;
    let end = reader.date("end_date")?;
    if end < start {
        return Err(RecordError::Range {
            field: "end_date",
            value: end.to_string(),
            bounds: format!("[{start}, +inf)"),
        });
    }
    service.start_date = Some(start);
    service.end_date = Some(end);
    Ok(service)
}

/// One `calendar_dates.txt` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CalendarDate {
    pub service_id: Id,
    pub date: GtfsDate,
    pub exception: ExceptionType,
}

pub(crate) fn build_calendar_date(reader: &mut FieldReader<'_>) -> Result<CalendarDate, RecordError> {
    Ok(CalendarDate {
        service_id: reader.id("service_id")?,
        date: reader.date("date")?,
        exception: reader.required_code("exception_type")?,
    })
}
