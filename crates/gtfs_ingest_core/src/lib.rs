//! Ordered ingestion of GTFS schedule tables into a cross-referenced entity
//! graph, with per-parse error policies and boundary, mode and date filters.

mod builders;
pub mod calendar;
pub mod config;
pub mod decode;
pub mod error;
pub mod feed;
pub mod input;
mod loader;
pub mod notice;
pub mod polygon;
pub mod progress;
pub mod record;
mod sweeps;
pub mod tables;

pub use calendar::clip_to_window;
pub use config::{ErrorPolicy, ParseConfig};
pub use decode::FieldReader;
pub use error::{ErrorKind, ParseError, RecordError};
pub use feed::{ExtraRow, Feed};
pub use input::{FeedInput, InputError};
pub use notice::{NoticeContainer, NoticeSeverity, ValidationNotice};
pub use polygon::{Boundary, Polygon};
pub use progress::{NoOpProgressHandler, ProgressHandler};
pub use record::{Columns, CsvRecordSource, Record, RecordSource};
pub use tables::EntityKind;

pub use gtfs_model;
