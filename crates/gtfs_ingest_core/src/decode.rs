use std::fmt::Display;
use std::ops::RangeInclusive;

use serde::Serialize;

use crate::config::ErrorPolicy;
use crate::error::RecordError;
use crate::notice::ValidationNotice;
use crate::record::Record;
use gtfs_model::{GtfsCode, GtfsColor, GtfsDate, GtfsTime, Id};

/// Typed, policy-aware access to the cells of one record.
///
/// Every decoder yields the value, a default (recorded as a notice when the
/// policy allows substitution), or a [`RecordError`].
pub struct FieldReader<'r> {
    table: &'static str,
    record: &'r Record,
    policy: ErrorPolicy,
    prefix: &'r str,
    notices: Vec<ValidationNotice>,
}

impl<'r> FieldReader<'r> {
    pub fn new(
        table: &'static str,
        record: &'r Record,
        policy: ErrorPolicy,
        prefix: &'r str,
    ) -> Self {
        Self {
            table,
            record,
            policy,
            prefix,
            notices: Vec::new(),
        }
    }

    pub fn table(&self) -> &'static str {
        self.table
    }

    pub fn line(&self) -> u64 {
        self.record.line()
    }

    pub fn policy(&self) -> ErrorPolicy {
        self.policy
    }

    pub fn record(&self) -> &'r Record {
        self.record
    }

    pub fn take_notices(&mut self) -> Vec<ValidationNotice> {
        std::mem::take(&mut self.notices)
    }

    pub fn raw(&self, field: &str) -> Option<&'r str> {
        self.record.get(field)
    }

    pub fn has(&self, field: &str) -> bool {
        self.raw(field).is_some()
    }

    /// Substitutes `default` for an invalid cell when the policy allows it.
    pub(crate) fn substitute<T: Serialize>(
        &mut self,
        field: &'static str,
        raw: &str,
        default: Option<T>,
        error: RecordError,
    ) -> Result<T, RecordError> {
        match default {
            Some(value) if self.policy.use_default_on_error => {
                tracing::warn!(
                    file = self.table,
                    line = self.line(),
                    field,
                    value = raw,
                    "substituting default for invalid value"
                );
                self.notices.push(
                    ValidationNotice::default_substituted(field, raw, &value)
                        .with_location(self.table, self.line()),
                );
                Ok(value)
            }
            _ => Err(error),
        }
    }

    pub fn required_str(&self, field: &'static str) -> Result<String, RecordError> {
        self.raw(field)
            .map(str::to_string)
            .ok_or(RecordError::MissingRequiredField { field })
    }

    pub fn optional_str(&self, field: &str) -> Option<String> {
        self.raw(field).map(str::to_string)
    }

    fn prefixed(&self, value: &str) -> Id {
        if self.prefix.is_empty() {
            Id::from(value)
        } else {
            let mut id = Id::from(self.prefix);
            id.push_str(value);
            id
        }
    }

    /// Required identifier, carrying the parse's id prefix.
    pub fn id(&self, field: &'static str) -> Result<Id, RecordError> {
        self.raw(field)
            .map(|value| self.prefixed(value))
            .ok_or(RecordError::MissingRequiredField { field })
    }

    pub fn optional_id(&self, field: &str) -> Option<Id> {
        self.raw(field).map(|value| self.prefixed(value))
    }

    pub fn optional_int(
        &mut self,
        field: &'static str,
        bounds: RangeInclusive<i64>,
        default: Option<i64>,
    ) -> Result<Option<i64>, RecordError> {
        let Some(raw) = self.raw(field) else {
            return Ok(None);
        };
        let value = match raw.parse::<i64>() {
            Ok(value) => value,
            Err(_) => {
                let error = RecordError::TypeOrFormat {
                    field,
                    value: raw.to_string(),
                    expected: "an integer",
                };
                return self.substitute(field, raw, default, error).map(Some);
            }
        };
        if !bounds.contains(&value) {
            let error = RecordError::Range {
                field,
                value: raw.to_string(),
                bounds: describe(&bounds),
            };
            return self.substitute(field, raw, default, error).map(Some);
        }
        Ok(Some(value))
    }

    pub fn required_int(
        &mut self,
        field: &'static str,
        bounds: RangeInclusive<i64>,
        default: Option<i64>,
    ) -> Result<i64, RecordError> {
        self.optional_int(field, bounds, default)?
            .ok_or(RecordError::MissingRequiredField { field })
    }

    /// Absent, or invalid under default substitution, is `None` rather than zero.
    pub fn nullable_float(
        &mut self,
        field: &'static str,
        bounds: RangeInclusive<f64>,
    ) -> Result<Option<f64>, RecordError> {
        let Some(raw) = self.raw(field) else {
            return Ok(None);
        };
        match raw.parse::<f64>() {
            Ok(value) if value.is_finite() && bounds.contains(&value) => Ok(Some(value)),
            Ok(value) if value.is_finite() => {
                let error = RecordError::Range {
                    field,
                    value: raw.to_string(),
                    bounds: describe(&bounds),
                };
                self.substitute(field, raw, Some(None), error)
            }
            _ => {
                let error = RecordError::TypeOrFormat {
                    field,
                    value: raw.to_string(),
                    expected: "a decimal number",
                };
                self.substitute(field, raw, Some(None), error)
            }
        }
    }

    pub fn required_float(
        &mut self,
        field: &'static str,
        bounds: RangeInclusive<f64>,
    ) -> Result<f64, RecordError> {
        if !self.has(field) {
            return Err(RecordError::MissingRequiredField { field });
        }
        let policy = self.policy;
        self.policy = ErrorPolicy {
            use_default_on_error: false,
            ..policy
        };
        let value = self.nullable_float(field, bounds);
        self.policy = policy;
        value?.ok_or(RecordError::MissingRequiredField { field })
    }

    /// Only the literal digits `0` and `1` are accepted.
    pub fn bool_flag(&mut self, field: &'static str, default: bool) -> Result<bool, RecordError> {
        match self.raw(field) {
            None => Ok(default),
            Some("0") => Ok(false),
            Some("1") => Ok(true),
            Some(raw) => {
                let error = RecordError::TypeOrFormat {
                    field,
                    value: raw.to_string(),
                    expected: "0 or 1",
                };
                self.substitute(field, raw, Some(default), error)
            }
        }
    }

    pub fn optional_date(&self, field: &'static str) -> Result<Option<GtfsDate>, RecordError> {
        self.raw(field)
            .map(|raw| {
                GtfsDate::parse(raw).map_err(|_| RecordError::TypeOrFormat {
                    field,
                    value: raw.to_string(),
                    expected: "a YYYYMMDD date",
                })
            })
            .transpose()
    }

    pub fn date(&self, field: &'static str) -> Result<GtfsDate, RecordError> {
        self.optional_date(field)?
            .ok_or(RecordError::MissingRequiredField { field })
    }

    pub fn optional_time(&self, field: &'static str) -> Result<Option<GtfsTime>, RecordError> {
        self.raw(field)
            .map(|raw| {
                GtfsTime::parse(raw).map_err(|_| RecordError::TypeOrFormat {
                    field,
                    value: raw.to_string(),
                    expected: "an H:MM:SS time",
                })
            })
            .transpose()
    }

    pub fn time(&self, field: &'static str) -> Result<GtfsTime, RecordError> {
        self.optional_time(field)?
            .ok_or(RecordError::MissingRequiredField { field })
    }

    /// Absent yields `default`; malformed yields `default` only under substitution.
    pub fn color(&mut self, field: &'static str, default: GtfsColor) -> Result<GtfsColor, RecordError> {
        let Some(raw) = self.raw(field) else {
            return Ok(default);
        };
        match GtfsColor::parse(raw) {
            Ok(color) => Ok(color),
            Err(_) => {
                let error = RecordError::TypeOrFormat {
                    field,
                    value: raw.to_string(),
                    expected: "six hexadecimal digits",
                };
                self.substitute(field, raw, Some(default), error)
            }
        }
    }

    /// Enumerated code; `default` stands in for unknown codes under substitution.
    pub fn code<E>(&mut self, field: &'static str, default: Option<E>) -> Result<Option<E>, RecordError>
    where
        E: GtfsCode + Serialize,
    {
        let Some(raw) = self.raw(field) else {
            return Ok(None);
        };
        let parsed = raw.parse::<i64>();
        match parsed.ok().and_then(E::from_code) {
            Some(value) => Ok(Some(value)),
            None => {
                let error = RecordError::Range {
                    field,
                    value: raw.to_string(),
                    bounds: "the known codes".to_string(),
                };
                self.substitute(field, raw, default, error).map(Some)
            }
        }
    }

    pub fn required_code<E>(&mut self, field: &'static str) -> Result<E, RecordError>
    where
        E: GtfsCode + Serialize,
    {
        self.code(field, None)?
            .ok_or(RecordError::MissingRequiredField { field })
    }

    /// Absolute URL; a malformed value is cleared under substitution.
    pub fn url(&mut self, field: &'static str) -> Result<Option<String>, RecordError> {
        let Some(raw) = self.raw(field) else {
            return Ok(None);
        };
        match url::Url::parse(raw) {
            Ok(_) => Ok(Some(raw.to_string())),
            Err(_) => {
                let error = RecordError::TypeOrFormat {
                    field,
                    value: raw.to_string(),
                    expected: "an absolute URL",
                };
                self.substitute(field, raw, Some(None), error)
            }
        }
    }

    pub fn required_url(&mut self, field: &'static str) -> Result<String, RecordError> {
        let Some(raw) = self.raw(field) else {
            return Err(RecordError::MissingRequiredField { field });
        };
        url::Url::parse(raw)
            .map(|_| raw.to_string())
            .map_err(|_| RecordError::TypeOrFormat {
                field,
                value: raw.to_string(),
                expected: "an absolute URL",
            })
    }

    /// IANA timezone name.
    pub fn optional_timezone(&self, field: &'static str) -> Result<Option<String>, RecordError> {
        self.raw(field)
            .map(|raw| {
                raw.parse::<chrono_tz::Tz>()
                    .map(|_| raw.to_string())
                    .map_err(|_| RecordError::TypeOrFormat {
                        field,
                        value: raw.to_string(),
                        expected: "an IANA timezone",
                    })
            })
            .transpose()
    }

    pub fn timezone(&self, field: &'static str) -> Result<String, RecordError> {
        self.optional_timezone(field)?
            .ok_or(RecordError::MissingRequiredField { field })
    }
}

fn describe<T: Display>(bounds: &RangeInclusive<T>) -> String {
    format!("[{}, {}]", bounds.start(), bounds.end())
}
