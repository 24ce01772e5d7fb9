use serde::{Deserialize, Serialize};

use crate::polygon::{Boundary, Polygon};
use gtfs_model::GtfsDate;

/// How a record that fails validation is handled.
///
/// Strict (both flags off) aborts the parse on the first failure.
/// `use_default_on_error` substitutes a default where one exists and falls
/// back to the other flags otherwise; `drop_erroneous` skips and counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorPolicy {
    pub use_default_on_error: bool,
    pub drop_erroneous: bool,
}

impl ErrorPolicy {
    pub const STRICT: ErrorPolicy = ErrorPolicy {
        use_default_on_error: false,
        drop_erroneous: false,
    };

    pub fn is_strict(self) -> bool {
        !self.use_default_on_error && !self.drop_erroneous
    }
}

/// Options recognised by [`crate::Feed::parse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseConfig {
    pub use_default_on_error: bool,
    pub drop_erroneous: bool,
    /// Validate everything but release stop times, shape points,
    /// translations and extra columns once they have been checked.
    pub dry_run: bool,
    pub check_null_coordinates: bool,
    /// Look for the tables in a subdirectory of the archive.
    pub zip_fix: bool,
    /// Rings of `[lat, lon]` vertices. A stop is kept when any ring contains it.
    pub boundaries: Vec<Vec<[f64; 2]>>,
    /// Accepted `route_type` codes; every mode is accepted when `None`.
    pub route_types: Option<Vec<i64>>,
    pub start_date: Option<GtfsDate>,
    pub end_date: Option<GtfsDate>,
    /// Retain unrecognised columns as per-entity side data.
    pub keep_extra_columns: bool,
    pub normalize_route_types: bool,
}

impl ParseConfig {
    pub fn from_json_str(value: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(value)
    }

    pub fn policy(&self) -> ErrorPolicy {
        ErrorPolicy {
            use_default_on_error: self.use_default_on_error,
            drop_erroneous: self.drop_erroneous,
        }
    }

    pub fn boundary(&self) -> Boundary {
        Boundary::new(
            self.boundaries
                .iter()
                .map(|ring| Polygon::from_lat_lon(ring))
                .collect(),
        )
    }

    pub fn has_date_filter(&self) -> bool {
        self.start_date.is_some() || self.end_date.is_some()
    }
}
