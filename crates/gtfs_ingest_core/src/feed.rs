use std::collections::BTreeMap;

use chrono::{DateTime, Duration, TimeZone};
use chrono_tz::Tz;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::ParseConfig;
use crate::notice::NoticeContainer;
use crate::polygon::Boundary;
use crate::tables::{self, EntityKind, Owner, TableDef, TABLE_ORDER};
use gtfs_model::{
    Agency, Attribution, Collection, FareAttribute, FeedInfo, GtfsDate, Id, Idx, Level, Pathway,
    Route, Service, Shape, Stop, Transfer, Translation, Trip,
};

/// Unrecognised columns of one row, by column name.
pub type ExtraRow = BTreeMap<String, String>;

/// Identifiers removed on purpose. References to them are skipped, never reported.
#[derive(Debug, Default)]
pub(crate) struct Exclusions {
    /// Stops outside every boundary polygon.
    pub stops: FxHashSet<Id>,
    /// Zone ids that only geo-filtered stops carried.
    pub zones: FxHashSet<Id>,
    /// Routes whose mode is not accepted.
    pub routes: FxHashSet<Id>,
    /// Services left without an active date by the date window.
    pub services: FxHashSet<Id>,
    /// Trips of filtered routes or pruned services.
    pub trips: FxHashSet<Id>,
}

impl Exclusions {
    pub fn contains(&self, table: &str, field: &str, id: &str) -> bool {
        match table {
            tables::STOPS_FILE if is_zone_field(field) => self.zones.contains(id),
            tables::STOPS_FILE => self.stops.contains(id),
            tables::ROUTES_FILE => self.routes.contains(id),
            tables::CALENDAR_FILE => self.services.contains(id),
            tables::TRIPS_FILE => self.trips.contains(id),
            _ => false,
        }
    }
}

pub(crate) fn is_zone_field(field: &str) -> bool {
    matches!(field, "origin_id" | "destination_id" | "contains_id")
}

/// The parsed entity graph. Owns every collection; entities refer to each
/// other through [`Idx`] values into these collections.
#[derive(Debug)]
pub struct Feed {
    pub(crate) config: ParseConfig,
    pub(crate) boundary: Boundary,
    pub(crate) agencies: Collection<Agency>,
    pub(crate) feed_info: Vec<FeedInfo>,
    pub(crate) levels: Collection<Level>,
    pub(crate) stops: Collection<Stop>,
    pub(crate) shapes: Collection<Shape>,
    pub(crate) routes: Collection<Route>,
    pub(crate) services: Collection<Service>,
    pub(crate) trips: Collection<Trip>,
    pub(crate) fare_attributes: Collection<FareAttribute>,
    pub(crate) transfers: Vec<Transfer>,
    pub(crate) pathways: Collection<Pathway>,
    pub(crate) attributions: Vec<Attribution>,
    pub(crate) translations: Vec<Translation>,
    pub(crate) translation_count: usize,
    pub(crate) stop_time_count: usize,
    pub(crate) shape_point_count: usize,
    pub(crate) exclusions: Exclusions,
    pub(crate) dropped: BTreeMap<EntityKind, usize>,
    pub(crate) filtered: BTreeMap<EntityKind, usize>,
    pub(crate) column_order: BTreeMap<&'static str, Vec<String>>,
    pub(crate) extras: FxHashMap<&'static str, FxHashMap<Id, Vec<ExtraRow>>>,
    pub(crate) notices: NoticeContainer,
}

impl Default for Feed {
    fn default() -> Self {
        Feed::new(ParseConfig::default())
    }
}

impl Feed {
    pub fn new(config: ParseConfig) -> Self {
        let boundary = config.boundary();
        Self {
            config,
            boundary,
            agencies: Collection::new(),
            feed_info: Vec::new(),
            levels: Collection::new(),
            stops: Collection::new(),
            shapes: Collection::new(),
            routes: Collection::new(),
            services: Collection::new(),
            trips: Collection::new(),
            fare_attributes: Collection::new(),
            transfers: Vec::new(),
            pathways: Collection::new(),
            attributions: Vec::new(),
            translations: Vec::new(),
            translation_count: 0,
            stop_time_count: 0,
            shape_point_count: 0,
            exclusions: Exclusions::default(),
            dropped: BTreeMap::new(),
            filtered: BTreeMap::new(),
            column_order: BTreeMap::new(),
            extras: FxHashMap::default(),
            notices: NoticeContainer::new(),
        }
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    pub fn agencies(&self) -> &Collection<Agency> {
        &self.agencies
    }

    /// First `feed_info.txt` row read, if any.
    pub fn feed_info(&self) -> Option<&FeedInfo> {
        self.feed_info.first()
    }

    pub fn levels(&self) -> &Collection<Level> {
        &self.levels
    }

    pub fn stops(&self) -> &Collection<Stop> {
        &self.stops
    }

    pub fn shapes(&self) -> &Collection<Shape> {
        &self.shapes
    }

    pub fn routes(&self) -> &Collection<Route> {
        &self.routes
    }

    pub fn services(&self) -> &Collection<Service> {
        &self.services
    }

    pub fn trips(&self) -> &Collection<Trip> {
        &self.trips
    }

    pub fn fare_attributes(&self) -> &Collection<FareAttribute> {
        &self.fare_attributes
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn pathways(&self) -> &Collection<Pathway> {
        &self.pathways
    }

    pub fn attributions(&self) -> &[Attribution] {
        &self.attributions
    }

    /// Retained translations; empty after a dry run.
    pub fn translations(&self) -> &[Translation] {
        &self.translations
    }

    pub fn agency_by_id(&self, id: &str) -> Option<&Agency> {
        self.agencies.get_by_id(id)
    }

    pub fn level_by_id(&self, id: &str) -> Option<&Level> {
        self.levels.get_by_id(id)
    }

    pub fn stop_by_id(&self, id: &str) -> Option<&Stop> {
        self.stops.get_by_id(id)
    }

    pub fn shape_by_id(&self, id: &str) -> Option<&Shape> {
        self.shapes.get_by_id(id)
    }

    pub fn route_by_id(&self, id: &str) -> Option<&Route> {
        self.routes.get_by_id(id)
    }

    pub fn service_by_id(&self, id: &str) -> Option<&Service> {
        self.services.get_by_id(id)
    }

    pub fn trip_by_id(&self, id: &str) -> Option<&Trip> {
        self.trips.get_by_id(id)
    }

    pub fn fare_attribute_by_id(&self, id: &str) -> Option<&FareAttribute> {
        self.fare_attributes.get_by_id(id)
    }

    pub fn pathway_by_id(&self, id: &str) -> Option<&Pathway> {
        self.pathways.get_by_id(id)
    }

    /// Records of `kind` discarded because they were erroneous.
    pub fn dropped(&self, kind: EntityKind) -> usize {
        self.dropped.get(&kind).copied().unwrap_or(0)
    }

    pub fn dropped_counts(&self) -> &BTreeMap<EntityKind, usize> {
        &self.dropped
    }

    pub fn total_dropped(&self) -> usize {
        self.dropped.values().sum()
    }

    /// Records of `kind` removed by a boundary, mode or date filter, or
    /// skipped because they referenced such a record.
    pub fn filtered(&self, kind: EntityKind) -> usize {
        self.filtered.get(&kind).copied().unwrap_or(0)
    }

    pub fn filtered_counts(&self) -> &BTreeMap<EntityKind, usize> {
        &self.filtered
    }

    pub fn translation_count(&self) -> usize {
        self.translation_count
    }

    /// Stop times that passed validation, including those released by a dry run.
    pub fn stop_time_count(&self) -> usize {
        self.stop_time_count
    }

    pub fn shape_point_count(&self) -> usize {
        self.shape_point_count
    }

    /// Columns of `table` in file order, as first read.
    pub fn column_order(&self, table: &str) -> Option<&[String]> {
        self.column_order.get(table).map(Vec::as_slice)
    }

    /// Extra-column rows of `table` owned by the entity `id`.
    pub fn extra_columns(&self, table: &str, id: &str) -> &[ExtraRow] {
        self.extras
            .get(table)
            .and_then(|rows| rows.get(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn notices(&self) -> &NoticeContainer {
        &self.notices
    }

    pub fn is_filtered_stop(&self, id: &str) -> bool {
        self.exclusions.stops.contains(id)
    }

    pub fn is_filtered_route(&self, id: &str) -> bool {
        self.exclusions.routes.contains(id)
    }

    pub fn is_filtered_trip(&self, id: &str) -> bool {
        self.exclusions.trips.contains(id)
    }

    /// Timezone governing the times of `trip`: its route's agency, else the
    /// first agency of the feed.
    pub fn trip_timezone(&self, trip: &Trip) -> Option<Tz> {
        let agency = self
            .routes
            .get(trip.route)
            .and_then(|route| route.agency)
            .and_then(|agency| self.agencies.get(agency))
            .or_else(|| self.agencies.values().next())?;
        agency.timezone.parse().ok()
    }

    /// Departure (else arrival) of the `index`-th stop time of `trip` on
    /// service day `date`, as a zoned instant. Times count from noon minus
    /// twelve hours, which differs from midnight on DST change days.
    pub fn stop_time_instant(
        &self,
        trip: Idx<Trip>,
        index: usize,
        date: GtfsDate,
    ) -> Option<DateTime<Tz>> {
        let trip = self.trips.get(trip)?;
        let stop_time = trip.stop_times.get(index)?;
        let time = stop_time.departure_time.or(stop_time.arrival_time)?;
        let tz = self.trip_timezone(trip)?;
        let noon = date.to_naive().and_hms_opt(12, 0, 0)?;
        let noon = tz.from_local_datetime(&noon).earliest()?;
        Some(noon - Duration::hours(12) + Duration::seconds(i64::from(time.total_seconds())))
    }

    fn remove_extras(&mut self, owner: Owner, id: &str) {
        for def in TABLE_ORDER.iter().copied() {
            if def.owner.map(|(kind, _)| kind) != Some(owner) {
                continue;
            }
            if let Some(rows) = self.extras.get_mut(def.file) {
                rows.remove(id);
            }
        }
    }

    pub fn delete_agency(&mut self, id: &str) -> Option<Agency> {
        let removed = self.agencies.remove_by_id(id)?;
        self.remove_extras(Owner::Agency, id);
        Some(removed)
    }

    pub fn delete_level(&mut self, id: &str) -> Option<Level> {
        let removed = self.levels.remove_by_id(id)?;
        self.remove_extras(Owner::Level, id);
        Some(removed)
    }

    pub fn delete_stop(&mut self, id: &str) -> Option<Stop> {
        let removed = self.stops.remove_by_id(id)?;
        self.remove_extras(Owner::Stop, id);
        Some(removed)
    }

    pub fn delete_shape(&mut self, id: &str) -> Option<Shape> {
        let removed = self.shapes.remove_by_id(id)?;
        self.remove_extras(Owner::Shape, id);
        Some(removed)
    }

    pub fn delete_route(&mut self, id: &str) -> Option<Route> {
        let removed = self.routes.remove_by_id(id)?;
        self.remove_extras(Owner::Route, id);
        Some(removed)
    }

    pub fn delete_service(&mut self, id: &str) -> Option<Service> {
        let removed = self.services.remove_by_id(id)?;
        self.remove_extras(Owner::Service, id);
        Some(removed)
    }

    /// Removes the trip with its stop times and frequencies, and the extra
    /// columns of all three tables.
    pub fn delete_trip(&mut self, id: &str) -> Option<Trip> {
        let removed = self.trips.remove_by_id(id)?;
        self.remove_extras(Owner::Trip, id);
        Some(removed)
    }

    /// Removes the fare with its rules and their extra columns.
    pub fn delete_fare_attribute(&mut self, id: &str) -> Option<FareAttribute> {
        let removed = self.fare_attributes.remove_by_id(id)?;
        self.remove_extras(Owner::FareAttribute, id);
        Some(removed)
    }

    pub fn delete_pathway(&mut self, id: &str) -> Option<Pathway> {
        let removed = self.pathways.remove_by_id(id)?;
        self.remove_extras(Owner::Pathway, id);
        Some(removed)
    }

    pub fn delete_attribution(&mut self, id: &str) -> Option<Attribution> {
        let position = self
            .attributions
            .iter()
            .position(|attribution| attribution.id.as_deref() == Some(id))?;
        let removed = self.attributions.remove(position);
        self.remove_extras(Owner::Attribution, id);
        Some(removed)
    }

    pub(crate) fn count_dropped(&mut self, kind: EntityKind) {
        *self.dropped.entry(kind).or_insert(0) += 1;
    }

    pub(crate) fn count_filtered(&mut self, kind: EntityKind) {
        *self.filtered.entry(kind).or_insert(0) += 1;
    }

    pub(crate) fn record_column_order(&mut self, def: &TableDef, columns: &[String]) {
        self.column_order
            .entry(def.file)
            .or_insert_with(|| columns.to_vec());
    }
}
