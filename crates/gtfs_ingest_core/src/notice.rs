use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ErrorKind, RecordError};

pub const NOTICE_CODE_RECORD_DROPPED: &str = "record_dropped";
pub const NOTICE_CODE_DEFAULT_SUBSTITUTED: &str = "default_substituted";
pub const NOTICE_CODE_SHAPE_POINT_REMOVED: &str = "shape_point_removed";
pub const NOTICE_CODE_DISTANCE_CLEARED: &str = "distance_cleared";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeSeverity {
    Error,
    Warning,
    Info,
}

/// A lenient outcome of the parse: something was dropped or repaired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationNotice {
    pub code: String,
    pub severity: NoticeSeverity,
    pub message: String,
    pub file: Option<String>,
    pub row: Option<u64>,
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, Value>,
}

impl ValidationNotice {
    pub fn new(
        code: impl Into<String>,
        severity: NoticeSeverity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            severity,
            message: message.into(),
            file: None,
            row: None,
            field: None,
            context: BTreeMap::new(),
        }
    }

    pub fn record_dropped(file: &str, row: u64, error: &RecordError) -> Self {
        ValidationNotice::new(
            NOTICE_CODE_RECORD_DROPPED,
            NoticeSeverity::Error,
            error.to_string(),
        )
        .with_location(file, row)
        .with_context_field("errorKind", error.kind())
    }

    pub fn default_substituted(field: &str, value: &str, default: impl Serialize) -> Self {
        let mut notice = ValidationNotice::new(
            NOTICE_CODE_DEFAULT_SUBSTITUTED,
            NoticeSeverity::Warning,
            format!("invalid value '{value}' replaced by a default"),
        );
        notice.field = Some(field.to_string());
        notice.insert_context_field("value", value);
        notice.insert_context_field("default", default);
        notice
    }

    pub fn repaired(code: &str, kind: ErrorKind, message: impl Into<String>) -> Self {
        ValidationNotice::new(code, NoticeSeverity::Warning, message)
            .with_context_field("errorKind", kind)
    }

    pub fn insert_context_field<V: Serialize>(&mut self, name: impl Into<String>, value: V) {
        let serialized = serde_json::to_value(value).unwrap_or(Value::Null);
        self.context.insert(name.into(), serialized);
    }

    pub fn with_context_field<V: Serialize>(mut self, name: impl Into<String>, value: V) -> Self {
        self.insert_context_field(name, value);
        self
    }

    pub fn with_location(mut self, file: impl Into<String>, row: u64) -> Self {
        self.file = Some(file.into());
        self.row = Some(row);
        self
    }
}

#[derive(Debug, Default, Clone)]
pub struct NoticeContainer {
    notices: Vec<ValidationNotice>,
}

impl NoticeContainer {
    pub fn new() -> Self {
        Self {
            notices: Vec::new(),
        }
    }

    pub fn push(&mut self, notice: ValidationNotice) {
        self.notices.push(notice);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationNotice> {
        self.notices.iter()
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn count_code(&self, code: &str) -> usize {
        self.notices.iter().filter(|notice| notice.code == code).count()
    }

    pub fn merge(&mut self, other: NoticeContainer) {
        self.notices.extend(other.notices);
    }

    pub fn extend(&mut self, notices: impl IntoIterator<Item = ValidationNotice>) {
        self.notices.extend(notices);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_record_notice_carries_location_and_kind() {
        let error = RecordError::MissingRequiredField { field: "stop_id" };
        let notice = ValidationNotice::record_dropped("stops.txt", 4, &error);
        assert_eq!(notice.file.as_deref(), Some("stops.txt"));
        assert_eq!(notice.row, Some(4));
        assert_eq!(
            notice.context.get("errorKind"),
            Some(&Value::String("missing_required_field".into()))
        );
    }

    #[test]
    fn container_counts_by_code() {
        let mut notices = NoticeContainer::new();
        notices.push(ValidationNotice::default_substituted("route_color", "XYZ", "FFFFFF"));
        notices.push(ValidationNotice::new("other", NoticeSeverity::Info, "x"));
        assert_eq!(notices.len(), 2);
        assert_eq!(notices.count_code(NOTICE_CODE_DEFAULT_SUBSTITUTED), 1);
    }
}
