use serde::Serialize;

use crate::input::InputError;
use gtfs_model::Id;

/// Category of a parse failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    MissingRequiredField,
    TypeOrFormatViolation,
    RangeViolation,
    IdCollision,
    UnresolvedReference,
    OrderingViolation,
    MonotonicityViolation,
    HierarchyViolation,
    CrossEntityConsistency,
    UnderlyingIoFailure,
}

/// Failure to turn one record (or one swept entity) into a valid entity.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RecordError {
    #[error("missing required field '{field}'")]
    MissingRequiredField { field: &'static str },
    #[error("field '{field}' has invalid value '{value}', expected {expected}")]
    TypeOrFormat {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error("field '{field}' value '{value}' is outside {bounds}")]
    Range {
        field: &'static str,
        value: String,
        bounds: String,
    },
    #[error("duplicate {field} '{id}'")]
    IdCollision { field: &'static str, id: Id },
    #[error("{field} '{id}' not found in {table}")]
    UnresolvedReference {
        table: &'static str,
        field: &'static str,
        id: Id,
    },
    #[error("{0}")]
    Ordering(String),
    #[error("{0}")]
    Monotonicity(String),
    #[error("{0}")]
    Hierarchy(String),
    #[error("{0}")]
    CrossEntity(String),
}

impl RecordError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RecordError::MissingRequiredField { .. } => ErrorKind::MissingRequiredField,
            RecordError::TypeOrFormat { .. } => ErrorKind::TypeOrFormatViolation,
            RecordError::Range { .. } => ErrorKind::RangeViolation,
            RecordError::IdCollision { .. } => ErrorKind::IdCollision,
            RecordError::UnresolvedReference { .. } => ErrorKind::UnresolvedReference,
            RecordError::Ordering(_) => ErrorKind::OrderingViolation,
            RecordError::Monotonicity(_) => ErrorKind::MonotonicityViolation,
            RecordError::Hierarchy(_) => ErrorKind::HierarchyViolation,
            RecordError::CrossEntity(_) => ErrorKind::CrossEntityConsistency,
        }
    }

    pub(crate) fn unresolved(table: &'static str, field: &'static str, id: &str) -> Self {
        RecordError::UnresolvedReference {
            table,
            field,
            id: Id::from(id),
        }
    }
}

/// Terminal outcome of a failed parse: where it happened and why.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{table}:{line}: {source}")]
    Record {
        table: String,
        line: u64,
        #[source]
        source: RecordError,
    },
    #[error("{table}: required table is missing")]
    MissingTable { table: String },
    #[error("{table}:{line}: {source}")]
    Input {
        table: String,
        line: u64,
        #[source]
        source: InputError,
    },
}

impl ParseError {
    pub fn table(&self) -> &str {
        match self {
            ParseError::Record { table, .. }
            | ParseError::MissingTable { table }
            | ParseError::Input { table, .. } => table,
        }
    }

    /// 1-based line of the offending record; 0 when the failure is not tied to a line.
    pub fn line(&self) -> u64 {
        match self {
            ParseError::Record { line, .. } | ParseError::Input { line, .. } => *line,
            ParseError::MissingTable { .. } => 0,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Record { source, .. } => source.kind(),
            ParseError::MissingTable { .. } => ErrorKind::MissingRequiredField,
            ParseError::Input { .. } => ErrorKind::UnderlyingIoFailure,
        }
    }

    pub fn message(&self) -> String {
        match self {
            ParseError::Record { source, .. } => source.to_string(),
            ParseError::MissingTable { .. } => "required table is missing".to_string(),
            ParseError::Input { source, .. } => source.to_string(),
        }
    }

    pub(crate) fn record(table: &str, line: u64, source: RecordError) -> Self {
        ParseError::Record {
            table: table.to_string(),
            line,
            source,
        }
    }

    pub(crate) fn input(table: &str, line: u64, source: InputError) -> Self {
        ParseError::Input {
            table: table.to_string(),
            line,
            source,
        }
    }
}
