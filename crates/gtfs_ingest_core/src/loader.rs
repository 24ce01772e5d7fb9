use std::collections::BTreeMap;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::builders::{
    build_agency, build_attribution, build_calendar_date, build_fare_attribute, build_fare_rule,
    build_feed_info, build_frequency, build_level, build_pathway, build_route, build_service,
    build_shape_point, build_stop, build_stop_time, build_transfer, build_translation, build_trip,
    mode_accepted,
};
use crate::config::ErrorPolicy;
use crate::decode::FieldReader;
use crate::error::{ParseError, RecordError};
use crate::feed::{ExtraRow, Feed};
use crate::input::FeedInput;
use crate::notice::ValidationNotice;
use crate::progress::{NoOpProgressHandler, ProgressHandler};
use crate::record::RecordSource;
use crate::sweeps::{sweep_shape_points, sweep_stop_times, SweepOutcome};
use crate::tables::{self, EntityKind, TableDef, TABLE_ORDER};
use gtfs_model::{Agency, DuplicateId, Id, Idx, Service, Shape, Stop, Transfer, Trip};

/// State carried from one table to the next during a parse.
#[derive(Debug)]
pub(crate) struct ParseContext<'p> {
    pub prefix: &'p str,
    pub policy: ErrorPolicy,
    pub agency_count: usize,
    pub first_agency: Option<Idx<Agency>>,
    /// Set once an agency without `agency_id` has been read.
    pub anonymous_agency: bool,
    pub timezone: Option<String>,
    /// Zone ids carried by stops that were kept.
    pub zones: FxHashSet<Id>,
}

impl<'p> ParseContext<'p> {
    pub fn new(prefix: &'p str, policy: ErrorPolicy) -> Self {
        Self {
            prefix,
            policy,
            agency_count: 0,
            first_agency: None,
            anonymous_agency: false,
            timezone: None,
            zones: FxHashSet::default(),
        }
    }

    pub fn register_agency(&mut self, agency: Idx<Agency>, timezone: &str) {
        self.agency_count += 1;
        self.first_agency.get_or_insert(agency);
        if self.timezone.is_none() {
            self.timezone = Some(timezone.to_string());
        }
    }

    /// The agency a record without `agency_id` belongs to: only defined when
    /// the feed has exactly one.
    pub fn default_agency(&self) -> Option<Idx<Agency>> {
        if self.agency_count == 1 {
            self.first_agency
        } else {
            None
        }
    }
}

/// Result of handling one record that did not fail.
pub(crate) enum Stored {
    Kept,
    /// Removed by a boundary, mode or date filter.
    Filtered,
}

fn collision(field: &'static str) -> impl Fn(DuplicateId) -> RecordError {
    move |DuplicateId(id)| RecordError::IdCollision { field, id }
}

impl Feed {
    /// Parses the feed at `path`, a directory or a zip archive. Every id read
    /// is prefixed with `id_prefix`.
    pub fn parse(&mut self, path: impl AsRef<Path>, id_prefix: Option<&str>) -> Result<(), ParseError> {
        let path = path.as_ref();
        let mut input = FeedInput::from_path(path, self.config.zip_fix)
            .map_err(|source| ParseError::input(&path.display().to_string(), 0, source))?;
        self.parse_input(&mut input, id_prefix)
    }

    pub fn parse_input(&mut self, input: &mut FeedInput, id_prefix: Option<&str>) -> Result<(), ParseError> {
        self.parse_input_with_progress(input, id_prefix, &NoOpProgressHandler)
    }

    pub fn parse_input_with_progress(
        &mut self,
        input: &mut FeedInput,
        id_prefix: Option<&str>,
        progress: &dyn ProgressHandler,
    ) -> Result<(), ParseError> {
        let mut ctx = ParseContext::new(id_prefix.unwrap_or(""), self.config.policy());
        progress.set_total_tables(TABLE_ORDER.len());

        for def in TABLE_ORDER.iter().copied() {
            progress.on_start_table(def.file);
            let retained = match def.kind {
                EntityKind::Agency => self.load_agencies(input, &mut ctx)?,
                EntityKind::FeedInfo => self.load_feed_info(input, &mut ctx)?,
                EntityKind::Level => self.load_levels(input, &mut ctx)?,
                EntityKind::Stop => self.load_stops(input, &mut ctx)?,
                EntityKind::ShapePoint => self.load_shapes(input, &mut ctx)?,
                EntityKind::Route => self.load_routes(input, &mut ctx)?,
                EntityKind::Calendar => self.load_calendar(input, &mut ctx)?,
                EntityKind::CalendarDate => self.load_calendar_dates(input, &mut ctx)?,
                EntityKind::Trip => self.load_trips(input, &mut ctx)?,
                EntityKind::StopTime => self.load_stop_times(input, &mut ctx)?,
                EntityKind::FareAttribute => self.load_fare_attributes(input, &mut ctx)?,
                EntityKind::FareRule => self.load_fare_rules(input, &mut ctx)?,
                EntityKind::Frequency => self.load_frequencies(input, &mut ctx)?,
                EntityKind::Transfer => self.load_transfers(input, &mut ctx)?,
                EntityKind::Pathway => self.load_pathways(input, &mut ctx)?,
                EntityKind::Attribution => self.load_attributions(input, &mut ctx)?,
                EntityKind::Translation => self.load_translations(input, &mut ctx)?,
            };
            tracing::info!(
                file = def.file,
                retained,
                dropped = self.dropped(def.kind),
                filtered = self.filtered(def.kind),
                "table loaded"
            );
            progress.on_finish_table(def.file, retained);
        }
        Ok(())
    }

    /// Reads every record of `def` through `handle`. Returns the number of
    /// records kept.
    fn read_table<'p, F>(
        &mut self,
        input: &mut FeedInput,
        def: &'static TableDef,
        ctx: &mut ParseContext<'p>,
        mut handle: F,
    ) -> Result<usize, ParseError>
    where
        F: FnMut(&mut Feed, &mut ParseContext<'p>, &mut FieldReader<'_>) -> Result<Stored, RecordError>,
    {
        let source = input
            .open_table(def.file)
            .map_err(|source| ParseError::input(def.file, 0, source))?;
        let Some(mut source) = source else {
            if def.required {
                return Err(ParseError::MissingTable {
                    table: def.file.to_string(),
                });
            }
            tracing::debug!(file = def.file, "optional table absent");
            return Ok(0);
        };
        self.record_column_order(def, source.columns());

        let prefix = ctx.prefix;
        let policy = ctx.policy;
        let keep_extras = self.config.keep_extra_columns && !self.config.dry_run;
        let mut retained = 0;
        loop {
            let record = match source.read_next_record() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(error) => return Err(ParseError::input(def.file, source.line(), error)),
            };
            let mut reader = FieldReader::new(def.file, &record, policy, prefix);
            match handle(self, ctx, &mut reader) {
                Ok(Stored::Kept) => {
                    retained += 1;
                    self.notices.extend(reader.take_notices());
                    if keep_extras {
                        self.store_extras(def, &reader, prefix);
                    }
                }
                Ok(Stored::Filtered) => self.count_filtered(def.kind),
                Err(RecordError::UnresolvedReference { table, field, id })
                    if self.exclusions.contains(table, field, &id) =>
                {
                    tracing::debug!(
                        file = def.file,
                        line = record.line(),
                        field,
                        id = %id,
                        "skipping reference to a filtered entity"
                    );
                    self.count_filtered(def.kind);
                    if def.kind == EntityKind::Trip {
                        if let Some(trip_id) = reader.optional_id("trip_id") {
                            self.exclusions.trips.insert(trip_id);
                        }
                    }
                }
                Err(error) => self.reject(def, record.line(), error)?,
            }
        }
        Ok(retained)
    }

    /// Drops the record when the policy allows it. Cross-entity errors are
    /// fatal under every policy.
    fn reject(&mut self, def: &TableDef, line: u64, error: RecordError) -> Result<(), ParseError> {
        if !self.config.drop_erroneous || matches!(error, RecordError::CrossEntity(_)) {
            return Err(ParseError::record(def.file, line, error));
        }
        tracing::warn!(file = def.file, line, error = %error, "dropping erroneous record");
        self.count_dropped(def.kind);
        self.notices
            .push(ValidationNotice::record_dropped(def.file, line, &error));
        Ok(())
    }

    fn store_extras(&mut self, def: &'static TableDef, reader: &FieldReader<'_>, prefix: &str) {
        let row: ExtraRow = reader
            .record()
            .iter()
            .filter(|(name, _)| !def.is_known_column(name))
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        if row.is_empty() {
            return;
        }
        let owner = def
            .owner
            .and_then(|(_, field)| reader.optional_id(field))
            .unwrap_or_else(|| Id::from(prefix));
        self.extras
            .entry(def.file)
            .or_default()
            .entry(owner)
            .or_default()
            .push(row);
    }

    fn absorb(&mut self, kind: EntityKind, outcome: SweepOutcome) {
        for _ in 0..outcome.dropped {
            self.count_dropped(kind);
        }
        self.notices.extend(outcome.notices);
    }

    fn load_agencies(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        self.read_table(input, &tables::AGENCY, ctx, |feed, ctx, reader| {
            let anonymous = !reader.has("agency_id");
            let agency = build_agency(ctx, reader)?;
            let timezone = agency.timezone.clone();
            let idx = feed.agencies.push(agency).map_err(collision("agency_id"))?;
            ctx.register_agency(idx, &timezone);
            ctx.anonymous_agency |= anonymous;
            Ok(Stored::Kept)
        })
    }

    fn load_feed_info(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        self.read_table(input, &tables::FEED_INFO, ctx, |feed, _, reader| {
            let info = build_feed_info(reader)?;
            feed.feed_info.push(info);
            Ok(Stored::Kept)
        })
    }

    fn load_levels(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        self.read_table(input, &tables::LEVELS, ctx, |feed, _, reader| {
            let level = build_level(reader)?;
            feed.levels.push(level).map_err(collision("level_id"))?;
            Ok(Stored::Kept)
        })
    }

    /// Stops outside the boundary are filtered, along with the zones only
    /// they carried. Parents are linked once the whole table is read.
    fn load_stops(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        let mut parent_lines: BTreeMap<Idx<Stop>, u64> = BTreeMap::new();
        let mut filtered_zones: FxHashSet<Id> = FxHashSet::default();
        self.read_table(input, &tables::STOPS, ctx, |feed, _, reader| {
            let stop = build_stop(feed, reader)?;
            if feed.stops.contains_id(&stop.id) || feed.exclusions.stops.contains(&stop.id) {
                return Err(RecordError::IdCollision {
                    field: "stop_id",
                    id: stop.id,
                });
            }
            if let Some(point) = stop.coordinates {
                if !feed.boundary.contains(point) {
                    tracing::debug!(stop_id = %stop.id, "stop outside the boundary");
                    filtered_zones.extend(stop.zone_id);
                    feed.exclusions.stops.insert(stop.id);
                    return Ok(Stored::Filtered);
                }
            }
            let has_parent = stop.parent_station.is_some();
            let idx = feed.stops.push(stop).map_err(collision("stop_id"))?;
            if has_parent {
                parent_lines.insert(idx, reader.line());
            }
            Ok(Stored::Kept)
        })?;

        self.link_parent_stations(&parent_lines, ctx.policy)?;
        // Zones are taken from the stops that survived the hierarchy pass.
        ctx.zones = self.stops.values().filter_map(|stop| stop.zone_id.clone()).collect();
        self.exclusions.zones = filtered_zones
            .into_iter()
            .filter(|zone| !ctx.zones.contains(zone))
            .collect();
        Ok(self.stops.len())
    }

    /// Rows per identifier in `field`, in order of first appearance.
    fn count_rows(
        input: &mut FeedInput,
        def: &'static TableDef,
        field: &'static str,
        ctx: &ParseContext<'_>,
    ) -> Result<Vec<(Id, usize)>, ParseError> {
        let source = input
            .open_table(def.file)
            .map_err(|source| ParseError::input(def.file, 0, source))?;
        let Some(mut source) = source else {
            return Ok(Vec::new());
        };
        let mut counts: Vec<(Id, usize)> = Vec::new();
        let mut positions: FxHashMap<Id, usize> = FxHashMap::default();
        while let Some(record) = source
            .read_next_record()
            .map_err(|error| ParseError::input(def.file, source.line(), error))?
        {
            let reader = FieldReader::new(def.file, &record, ctx.policy, ctx.prefix);
            let Some(id) = reader.optional_id(field) else {
                continue;
            };
            match positions.get(&id) {
                Some(&position) => counts[position].1 += 1,
                None => {
                    positions.insert(id.clone(), counts.len());
                    counts.push((id, 1));
                }
            }
        }
        Ok(counts)
    }

    /// Two passes: the first creates every shape with room for its points,
    /// the second fills them. Each shape is then ordered and checked.
    fn load_shapes(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        for (id, count) in Self::count_rows(input, &tables::SHAPES, "shape_id", ctx)? {
            self.shapes
                .push(Shape::with_capacity(id, count))
                .map_err(|DuplicateId(id)| {
                    ParseError::record(
                        tables::SHAPES_FILE,
                        0,
                        RecordError::IdCollision { field: "shape_id", id },
                    )
                })?;
        }

        let mut lines: BTreeMap<Idx<Shape>, Vec<u64>> = BTreeMap::new();
        self.read_table(input, &tables::SHAPES, ctx, |feed, _, reader| {
            let (shape, point) = build_shape_point(feed, reader)?;
            if let Some(target) = feed.shapes.get_mut(shape) {
                target.points.push(point);
                lines.entry(shape).or_default().push(reader.line());
            }
            Ok(Stored::Kept)
        })?;

        let dry_run = self.config.dry_run;
        let mut retained = 0;
        for (idx, lines) in lines {
            let Some(shape) = self.shapes.get_mut(idx) else {
                continue;
            };
            let outcome = sweep_shape_points(&mut shape.points, lines, ctx.policy)?;
            retained += shape.points.len();
            if dry_run {
                shape.points = Vec::new();
            }
            self.absorb(EntityKind::ShapePoint, outcome);
        }
        self.shape_point_count = retained;
        Ok(retained)
    }

    fn load_routes(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        self.read_table(input, &tables::ROUTES, ctx, |feed, ctx, reader| {
            let route = build_route(feed, ctx, reader)?;
            if feed.routes.contains_id(&route.id) || feed.exclusions.routes.contains(&route.id) {
                return Err(RecordError::IdCollision {
                    field: "route_id",
                    id: route.id,
                });
            }
            if !mode_accepted(feed, route.route_type) {
                tracing::debug!(route_id = %route.id, "route mode not accepted");
                feed.exclusions.routes.insert(route.id);
                return Ok(Stored::Filtered);
            }
            feed.routes.push(route).map_err(collision("route_id"))?;
            Ok(Stored::Kept)
        })
    }

    fn load_calendar(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        self.read_table(input, &tables::CALENDAR, ctx, |feed, _, reader| {
            let service = build_service(reader)?;
            feed.services.push(service).map_err(collision("service_id"))?;
            Ok(Stored::Kept)
        })
    }

    /// Exceptions may create a service that calendar.txt lacks. The date
    /// window is applied once all exceptions are known.
    fn load_calendar_dates(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        let retained = self.read_table(input, &tables::CALENDAR_DATES, ctx, |feed, _, reader| {
            let row = build_calendar_date(reader)?;
            let idx = match feed.services.idx(&row.service_id) {
                Some(idx) => idx,
                None => feed
                    .services
                    .push(Service::new(row.service_id.clone()))
                    .map_err(collision("service_id"))?,
            };
            let Some(service) = feed.services.get_mut(idx) else {
                return Err(RecordError::unresolved(tables::CALENDAR_FILE, "service_id", &row.service_id));
            };
            if service.exceptions.contains_key(&row.date) {
                return Err(RecordError::IdCollision {
                    field: "date",
                    id: Id::from(format!("{}:{}", row.service_id, row.date)),
                });
            }
            service.exceptions.insert(row.date, row.exception);
            Ok(Stored::Kept)
        })?;
        self.apply_date_window();
        Ok(retained)
    }

    fn load_trips(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        self.read_table(input, &tables::TRIPS, ctx, |feed, _, reader| {
            let id = reader.id("trip_id")?;
            if feed.trips.contains_id(&id) || feed.exclusions.trips.contains(&id) {
                return Err(RecordError::IdCollision { field: "trip_id", id });
            }
            let trip = build_trip(feed, reader)?;
            feed.trips.push(trip).map_err(collision("trip_id"))?;
            Ok(Stored::Kept)
        })
    }

    /// Reserves each trip's stop-time slots, fills them, then orders and
    /// checks every trip.
    fn load_stop_times(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        for (id, count) in Self::count_rows(input, &tables::STOP_TIMES, "trip_id", ctx)? {
            if let Some(trip) = self.trips.get_by_id_mut(&id) {
                trip.stop_times.reserve_exact(count);
            }
        }

        let mut lines: BTreeMap<Idx<Trip>, Vec<u64>> = BTreeMap::new();
        self.read_table(input, &tables::STOP_TIMES, ctx, |feed, _, reader| {
            let (trip, stop_time) = build_stop_time(feed, reader)?;
            if let Some(target) = feed.trips.get_mut(trip) {
                target.stop_times.push(stop_time);
                lines.entry(trip).or_default().push(reader.line());
            }
            Ok(Stored::Kept)
        })?;

        let dry_run = self.config.dry_run;
        let mut retained = 0;
        for (idx, lines) in lines {
            let Some(trip) = self.trips.get_mut(idx) else {
                continue;
            };
            let outcome = sweep_stop_times(&mut trip.stop_times, lines, ctx.policy)?;
            retained += trip.stop_times.len();
            if dry_run {
                trip.stop_times = Vec::new();
            }
            self.absorb(EntityKind::StopTime, outcome);
        }
        self.stop_time_count = retained;
        Ok(retained)
    }

    fn load_fare_attributes(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        self.read_table(input, &tables::FARE_ATTRIBUTES, ctx, |feed, ctx, reader| {
            let fare = build_fare_attribute(feed, ctx, reader)?;
            feed.fare_attributes.push(fare).map_err(collision("fare_id"))?;
            Ok(Stored::Kept)
        })
    }

    fn load_fare_rules(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        self.read_table(input, &tables::FARE_RULES, ctx, |feed, ctx, reader| {
            let (fare, rule) = build_fare_rule(feed, ctx, reader)?;
            if let Some(fare) = feed.fare_attributes.get_mut(fare) {
                fare.rules.push(rule);
            }
            Ok(Stored::Kept)
        })
    }

    fn load_frequencies(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        self.read_table(input, &tables::FREQUENCIES, ctx, |feed, _, reader| {
            let (trip, frequency) = build_frequency(feed, reader)?;
            if let Some(trip) = feed.trips.get_mut(trip) {
                trip.frequencies.push(frequency);
            }
            Ok(Stored::Kept)
        })
    }

    /// Identical transfers collapse into one.
    fn load_transfers(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        let mut seen: FxHashSet<Transfer> = FxHashSet::default();
        self.read_table(input, &tables::TRANSFERS, ctx, |feed, _, reader| {
            let transfer = build_transfer(feed, reader)?;
            if seen.insert(transfer.clone()) {
                feed.transfers.push(transfer);
            } else {
                tracing::debug!(line = reader.line(), "collapsing duplicate transfer");
            }
            Ok(Stored::Kept)
        })
    }

    fn load_pathways(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        self.read_table(input, &tables::PATHWAYS, ctx, |feed, _, reader| {
            let pathway = build_pathway(feed, reader)?;
            feed.pathways.push(pathway).map_err(collision("pathway_id"))?;
            Ok(Stored::Kept)
        })
    }

    fn load_attributions(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        let mut ids: FxHashSet<Id> = FxHashSet::default();
        self.read_table(input, &tables::ATTRIBUTIONS, ctx, |feed, _, reader| {
            let attribution = build_attribution(feed, reader)?;
            if let Some(id) = &attribution.id {
                if !ids.insert(id.clone()) {
                    return Err(RecordError::IdCollision {
                        field: "attribution_id",
                        id: id.clone(),
                    });
                }
            }
            feed.attributions.push(attribution);
            Ok(Stored::Kept)
        })
    }

    fn load_translations(&mut self, input: &mut FeedInput, ctx: &mut ParseContext<'_>) -> Result<usize, ParseError> {
        self.read_table(input, &tables::TRANSLATIONS, ctx, |feed, _, reader| {
            let translation = build_translation(reader)?;
            feed.translation_count += 1;
            if !feed.config.dry_run {
                feed.translations.push(translation);
            }
            Ok(Stored::Kept)
        })
    }
}
