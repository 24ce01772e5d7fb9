use serde::Serialize;

pub const AGENCY_FILE: &str = "agency.txt";
pub const FEED_INFO_FILE: &str = "feed_info.txt";
pub const LEVELS_FILE: &str = "levels.txt";
pub const STOPS_FILE: &str = "stops.txt";
pub const SHAPES_FILE: &str = "shapes.txt";
pub const ROUTES_FILE: &str = "routes.txt";
pub const CALENDAR_FILE: &str = "calendar.txt";
pub const CALENDAR_DATES_FILE: &str = "calendar_dates.txt";
pub const TRIPS_FILE: &str = "trips.txt";
pub const STOP_TIMES_FILE: &str = "stop_times.txt";
pub const FARE_ATTRIBUTES_FILE: &str = "fare_attributes.txt";
pub const FARE_RULES_FILE: &str = "fare_rules.txt";
pub const FREQUENCIES_FILE: &str = "frequencies.txt";
pub const TRANSFERS_FILE: &str = "transfers.txt";
pub const PATHWAYS_FILE: &str = "pathways.txt";
pub const ATTRIBUTIONS_FILE: &str = "attributions.txt";
pub const TRANSLATIONS_FILE: &str = "translations.txt";

/// Kind of entity a table row becomes. Drop and filter counts are keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Agency,
    FeedInfo,
    Level,
    Stop,
    ShapePoint,
    Route,
    Calendar,
    CalendarDate,
    Trip,
    StopTime,
    FareAttribute,
    FareRule,
    Frequency,
    Transfer,
    Pathway,
    Attribution,
    Translation,
}

/// Static description of one table.
#[derive(Debug)]
pub struct TableDef {
    pub file: &'static str,
    pub kind: EntityKind,
    pub required: bool,
    /// Column naming the entity whose deletion removes this table's extra columns.
    pub owner: Option<(Owner, &'static str)>,
    pub columns: &'static [&'static str],
}

/// Entity kinds that own extra-column side data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Owner {
    Agency,
    Level,
    Stop,
    Shape,
    Route,
    Service,
    Trip,
    FareAttribute,
    Pathway,
    Attribution,
}

impl TableDef {
    pub fn is_known_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }
}

pub static AGENCY: TableDef = TableDef {
    file: AGENCY_FILE,
    kind: EntityKind::Agency,
    required: true,
    owner: Some((Owner::Agency, "agency_id")),
    columns: &[
        "agency_id",
        "agency_name",
        "agency_url",
        "agency_timezone",
        "agency_lang",
        "agency_phone",
        "agency_fare_url",
        "agency_email",
    ],
};

pub static FEED_INFO: TableDef = TableDef {
    file: FEED_INFO_FILE,
    kind: EntityKind::FeedInfo,
    required: false,
    owner: None,
    columns: &[
        "feed_publisher_name",
        "feed_publisher_url",
        "feed_lang",
        "default_lang",
        "feed_start_date",
        "feed_end_date",
        "feed_version",
        "feed_contact_email",
        "feed_contact_url",
    ],
};

pub static LEVELS: TableDef = TableDef {
    file: LEVELS_FILE,
    kind: EntityKind::Level,
    required: false,
    owner: Some((Owner::Level, "level_id")),
    columns: &["level_id", "level_index", "level_name"],
};

pub static STOPS: TableDef = TableDef {
    file: STOPS_FILE,
    kind: EntityKind::Stop,
    required: true,
    owner: Some((Owner::Stop, "stop_id")),
    columns: &[
        "stop_id",
        "stop_code",
        "stop_name",
        "stop_desc",
        "stop_lat",
        "stop_lon",
        "zone_id",
        "stop_url",
        "location_type",
        "parent_station",
        "stop_timezone",
        "wheelchair_boarding",
        "level_id",
        "platform_code",
    ],
};

pub static SHAPES: TableDef = TableDef {
    file: SHAPES_FILE,
    kind: EntityKind::ShapePoint,
    required: false,
    owner: Some((Owner::Shape, "shape_id")),
    columns: &[
        "shape_id",
        "shape_pt_lat",
        "shape_pt_lon",
        "shape_pt_sequence",
        "shape_dist_traveled",
    ],
};

pub static ROUTES: TableDef = TableDef {
    file: ROUTES_FILE,
    kind: EntityKind::Route,
    required: true,
    owner: Some((Owner::Route, "route_id")),
    columns: &[
        "route_id",
        "agency_id",
        "route_short_name",
        "route_long_name",
        "route_desc",
        "route_type",
        "route_url",
        "route_color",
        "route_text_color",
        "route_sort_order",
        "continuous_pickup",
        "continuous_drop_off",
    ],
};

pub static CALENDAR: TableDef = TableDef {
    file: CALENDAR_FILE,
    kind: EntityKind::Calendar,
    required: false,
    owner: Some((Owner::Service, "service_id")),
    columns: &[
        "service_id",
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
        "start_date",
        "end_date",
    ],
};

pub static CALENDAR_DATES: TableDef = TableDef {
    file: CALENDAR_DATES_FILE,
    kind: EntityKind::CalendarDate,
    required: false,
    owner: Some((Owner::Service, "service_id")),
    columns: &["service_id", "date", "exception_type"],
};

pub static TRIPS: TableDef = TableDef {
    file: TRIPS_FILE,
    kind: EntityKind::Trip,
    required: true,
    owner: Some((Owner::Trip, "trip_id")),
    columns: &[
        "route_id",
        "service_id",
        "trip_id",
        "trip_headsign",
        "trip_short_name",
        "direction_id",
        "block_id",
        "shape_id",
        "wheelchair_accessible",
        "bikes_allowed",
    ],
};

pub static STOP_TIMES: TableDef = TableDef {
    file: STOP_TIMES_FILE,
    kind: EntityKind::StopTime,
    required: true,
    owner: Some((Owner::Trip, "trip_id")),
    columns: &[
        "trip_id",
        "arrival_time",
        "departure_time",
        "stop_id",
        "stop_sequence",
        "pickup_type",
        "drop_off_type",
        "continuous_pickup",
        "continuous_drop_off",
        "shape_dist_traveled",
        "timepoint",
    ],
};

pub static FARE_ATTRIBUTES: TableDef = TableDef {
    file: FARE_ATTRIBUTES_FILE,
    kind: EntityKind::FareAttribute,
    required: false,
    owner: Some((Owner::FareAttribute, "fare_id")),
    columns: &[
        "fare_id",
        "price",
        "currency_type",
        "payment_method",
        "transfers",
        "agency_id",
        "transfer_duration",
    ],
};

pub static FARE_RULES: TableDef = TableDef {
    file: FARE_RULES_FILE,
    kind: EntityKind::FareRule,
    required: false,
    owner: Some((Owner::FareAttribute, "fare_id")),
    columns: &[
        "fare_id",
        "route_id",
        "origin_id",
        "destination_id",
        "contains_id",
    ],
};

pub static FREQUENCIES: TableDef = TableDef {
    file: FREQUENCIES_FILE,
    kind: EntityKind::Frequency,
    required: false,
    owner: Some((Owner::Trip, "trip_id")),
    columns: &["trip_id", "start_time", "end_time", "headway_secs", "exact_times"],
};

pub static TRANSFERS: TableDef = TableDef {
    file: TRANSFERS_FILE,
    kind: EntityKind::Transfer,
    required: false,
    owner: Some((Owner::Stop, "from_stop_id")),
    columns: &[
        "from_stop_id",
        "to_stop_id",
        "from_route_id",
        "to_route_id",
        "from_trip_id",
        "to_trip_id",
        "transfer_type",
        "min_transfer_time",
    ],
};

pub static PATHWAYS: TableDef = TableDef {
    file: PATHWAYS_FILE,
    kind: EntityKind::Pathway,
    required: false,
    owner: Some((Owner::Pathway, "pathway_id")),
    columns: &[
        "pathway_id",
        "from_stop_id",
        "to_stop_id",
        "pathway_mode",
        "is_bidirectional",
        "length",
        "traversal_time",
        "stair_count",
        "max_slope",
        "min_width",
        "signposted_as",
        "reversed_signposted_as",
    ],
};

pub static ATTRIBUTIONS: TableDef = TableDef {
    file: ATTRIBUTIONS_FILE,
    kind: EntityKind::Attribution,
    required: false,
    owner: Some((Owner::Attribution, "attribution_id")),
    columns: &[
        "attribution_id",
        "agency_id",
        "route_id",
        "trip_id",
        "organization_name",
        "is_producer",
        "is_operator",
        "is_authority",
        "attribution_url",
        "attribution_email",
        "attribution_phone",
    ],
};

pub static TRANSLATIONS: TableDef = TableDef {
    file: TRANSLATIONS_FILE,
    kind: EntityKind::Translation,
    required: false,
    owner: None,
    columns: &[
        "table_name",
        "field_name",
        "language",
        "translation",
        "record_id",
        "record_sub_id",
        "field_value",
    ],
};

/// Tables in the order they are read. Later tables resolve references into
/// the collections built from earlier ones.
pub static TABLE_ORDER: [&TableDef; 17] = [
    &AGENCY,
    &FEED_INFO,
    &LEVELS,
    &STOPS,
    &SHAPES,
    &ROUTES,
    &CALENDAR,
    &CALENDAR_DATES,
    &TRIPS,
    &STOP_TIMES,
    &FARE_ATTRIBUTES,
    &FARE_RULES,
    &FREQUENCIES,
    &TRANSFERS,
    &PATHWAYS,
    &ATTRIBUTIONS,
    &TRANSLATIONS,
];

pub fn table_def(file: &str) -> Option<&'static TableDef> {
    TABLE_ORDER.iter().copied().find(|def| def.file == file)
}
