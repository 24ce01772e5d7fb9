use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::io::{Cursor, Write};
use std::path::PathBuf;

use chrono::NaiveDate;
use gtfs_ingest_core::gtfs_model::{GtfsDate, RouteType};
use gtfs_ingest_core::notice::NOTICE_CODE_DEFAULT_SUBSTITUTED;
use gtfs_ingest_core::{
    EntityKind, ErrorKind, Feed, FeedInput, ParseConfig, ParseError, ProgressHandler,
};

const AGENCY: &str = "agency_id,agency_name,agency_url,agency_timezone\n\
A1,Metro,https://metro.example,Europe/Paris\n";
const STOPS: &str = "stop_id,stop_name,stop_lat,stop_lon\n\
S1,Central,48.85,2.35\n";
const ROUTES: &str = "route_id,agency_id,route_short_name,route_type\n\
R1,A1,1,3\n";
const CALENDAR: &str = "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
WK,1,1,1,1,1,1,1,20240101,20241231\n";
const TRIPS: &str = "route_id,service_id,trip_id\n\
R1,WK,T1\n";
const STOP_TIMES: &str = "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
T1,08:00:00,08:00:00,S1,1\n\
T1,08:10:00,08:10:00,S1,2\n";

fn minimal_tables() -> BTreeMap<&'static str, String> {
    BTreeMap::from([
        ("agency.txt", AGENCY.to_string()),
        ("stops.txt", STOPS.to_string()),
        ("routes.txt", ROUTES.to_string()),
        ("calendar.txt", CALENDAR.to_string()),
        ("trips.txt", TRIPS.to_string()),
        ("stop_times.txt", STOP_TIMES.to_string()),
    ])
}

fn parse_tables(config: ParseConfig, tables: &BTreeMap<&'static str, String>) -> (Feed, Result<(), ParseError>) {
    let mut input = FeedInput::from_tables(
        tables
            .iter()
            .map(|(name, body)| (name.to_string(), body.clone().into_bytes())),
    );
    let mut feed = Feed::new(config);
    let result = feed.parse_input(&mut input, None);
    (feed, result)
}

fn drop_erroneous() -> ParseConfig {
    ParseConfig {
        drop_erroneous: true,
        ..Default::default()
    }
}

fn temp_dir(prefix: &str) -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("{}_{}_{}", prefix, std::process::id(), nanos))
}

fn date(value: &str) -> GtfsDate {
    GtfsDate::parse(value).unwrap()
}

#[test]
fn minimal_feed_round_trips_under_strict_policy() {
    let (feed, result) = parse_tables(ParseConfig::default(), &minimal_tables());
    result.unwrap();

    assert_eq!(feed.agencies().len(), 1);
    assert_eq!(feed.stops().len(), 1);
    assert_eq!(feed.routes().len(), 1);
    assert_eq!(feed.services().len(), 1);
    assert_eq!(feed.trips().len(), 1);
    assert_eq!(feed.total_dropped(), 0);
    assert!(feed.notices().is_empty());

    let trip = feed.trip_by_id("T1").unwrap();
    assert_eq!(trip.stop_times.len(), 2);
    assert!(trip.stop_times[0].sequence < trip.stop_times[1].sequence);
    assert_eq!(feed.stop_time_count(), 2);
    assert_eq!(feed.route_by_id("R1").unwrap().agency, feed.agencies().idx("A1"));
    assert_eq!(
        feed.column_order("stop_times.txt").unwrap(),
        ["trip_id", "arrival_time", "departure_time", "stop_id", "stop_sequence"]
    );
}

#[test]
fn duplicate_identifier_fails_or_is_dropped() {
    let mut tables = minimal_tables();
    tables.insert("stops.txt", format!("{STOPS}S1,Again,48.86,2.36\n"));

    let (_, result) = parse_tables(ParseConfig::default(), &tables);
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IdCollision);
    assert_eq!(err.table(), "stops.txt");
    assert_eq!(err.line(), 3);

    let (feed, result) = parse_tables(drop_erroneous(), &tables);
    result.unwrap();
    assert_eq!(feed.dropped(EntityKind::Stop), 1);
    assert_eq!(feed.stop_by_id("S1").unwrap().name.as_deref(), Some("Central"));
}

fn paris_boundary() -> ParseConfig {
    ParseConfig {
        boundaries: vec![vec![[48.0, 2.0], [48.0, 3.0], [49.0, 3.0], [49.0, 2.0]]],
        ..Default::default()
    }
}

#[test]
fn duplicate_stop_outside_the_boundary_is_still_a_collision() {
    let mut tables = minimal_tables();
    tables.insert(
        "stops.txt",
        format!("{STOPS}FAR,Madrid,40.41,-3.70\nFAR,Madrid,40.41,-3.70\n"),
    );

    let (_, result) = parse_tables(paris_boundary(), &tables);
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IdCollision);
    assert_eq!(err.table(), "stops.txt");
    assert_eq!(err.line(), 3);
}

#[test]
fn kept_stop_repeated_outside_the_boundary_collides() {
    let mut tables = minimal_tables();
    tables.insert("stops.txt", format!("{STOPS}S1,Madrid,40.41,-3.70\n"));

    let (_, result) = parse_tables(paris_boundary(), &tables);
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IdCollision);
    assert_eq!(err.line(), 3);

    let config = ParseConfig {
        drop_erroneous: true,
        ..paris_boundary()
    };
    let (feed, result) = parse_tables(config, &tables);
    result.unwrap();
    assert_eq!(feed.dropped(EntityKind::Stop), 1);
    assert_eq!(feed.filtered(EntityKind::Stop), 0);
    assert!(!feed.is_filtered_stop("S1"));
    assert_eq!(feed.stop_by_id("S1").unwrap().name.as_deref(), Some("Central"));
}

#[test]
fn duplicate_route_outside_the_mode_filter_is_still_a_collision() {
    let mut tables = minimal_tables();
    tables.insert("routes.txt", format!("{ROUTES}RX,A1,T1,0\nRX,A1,T1,0\n"));
    let config = ParseConfig {
        route_types: Some(vec![3]),
        ..Default::default()
    };

    let (_, result) = parse_tables(config, &tables);
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IdCollision);
    assert_eq!(err.table(), "routes.txt");
    assert_eq!(err.line(), 4);
}

#[test]
fn duplicate_trip_of_a_filtered_route_is_still_a_collision() {
    let mut tables = minimal_tables();
    tables.insert("routes.txt", format!("{ROUTES}RX,A1,T1,0\n"));
    tables.insert("trips.txt", format!("{TRIPS}RX,WK,TX\nRX,WK,TX\n"));
    let config = ParseConfig {
        route_types: Some(vec![3]),
        ..Default::default()
    };

    let (_, result) = parse_tables(config, &tables);
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IdCollision);
    assert_eq!(err.table(), "trips.txt");
    assert_eq!(err.line(), 4);
}

#[test]
fn shapes_come_out_ordered_with_monotonic_distances() {
    let mut tables = minimal_tables();
    tables.insert(
        "shapes.txt",
        "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence,shape_dist_traveled\n\
         SH1,48.85,2.35,3,200\n\
         SH1,48.84,2.34,1,0\n\
         SH1,48.845,2.345,2,100\n"
            .to_string(),
    );
    tables.insert("trips.txt", "route_id,service_id,trip_id,shape_id\nR1,WK,T1,SH1\n".to_string());

    let (feed, result) = parse_tables(ParseConfig::default(), &tables);
    result.unwrap();
    let shape = feed.shape_by_id("SH1").unwrap();
    assert!(shape.points.windows(2).all(|pair| pair[0].sequence < pair[1].sequence));
    assert!(shape
        .points
        .windows(2)
        .all(|pair| pair[0].dist_traveled <= pair[1].dist_traveled));
    assert_eq!(feed.trip_by_id("T1").unwrap().shape, feed.shapes().idx("SH1"));
    assert_eq!(feed.shape_point_count(), 3);
}

#[test]
fn decreasing_shape_distance_follows_the_policy() {
    let mut tables = minimal_tables();
    tables.insert(
        "shapes.txt",
        "shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence,shape_dist_traveled\n\
         SH1,48.84,2.34,1,0\n\
         SH1,48.845,2.345,2,100\n\
         SH1,48.85,2.35,3,50\n"
            .to_string(),
    );

    let (_, result) = parse_tables(ParseConfig::default(), &tables);
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MonotonicityViolation);
    assert_eq!(err.table(), "shapes.txt");
    assert_eq!(err.line(), 4);

    let lenient = ParseConfig {
        use_default_on_error: true,
        ..Default::default()
    };
    let (feed, result) = parse_tables(lenient, &tables);
    result.unwrap();
    let shape = feed.shape_by_id("SH1").unwrap();
    assert_eq!(shape.points.len(), 3);
    assert_eq!(shape.points[2].dist_traveled, None);

    let (feed, result) = parse_tables(drop_erroneous(), &tables);
    result.unwrap();
    assert_eq!(feed.shape_by_id("SH1").unwrap().points.len(), 2);
    assert_eq!(feed.dropped(EntityKind::ShapePoint), 1);
}

#[test]
fn stop_reached_before_leaving_the_previous_one() {
    let mut tables = minimal_tables();
    tables.insert(
        "stop_times.txt",
        "trip_id,arrival_time,departure_time,stop_id,stop_sequence\n\
         T1,10:00:00,10:00:00,S1,1\n\
         T1,09:50:00,09:55:00,S1,2\n\
         T1,10:20:00,10:20:00,S1,3\n"
            .to_string(),
    );

    let (_, result) = parse_tables(ParseConfig::default(), &tables);
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MonotonicityViolation);
    assert_eq!(err.table(), "stop_times.txt");
    assert_eq!(err.line(), 3);

    let (feed, result) = parse_tables(drop_erroneous(), &tables);
    result.unwrap();
    assert_eq!(feed.dropped(EntityKind::StopTime), 1);
    let trip = feed.trip_by_id("T1").unwrap();
    assert_eq!(trip.stop_times.len(), 2);
    for pair in trip.stop_times.windows(2) {
        assert!(pair[0].sequence < pair[1].sequence);
        if let (Some(departure), Some(arrival)) = (pair[0].departure_time, pair[1].arrival_time) {
            assert!(arrival >= departure);
        }
    }
}

#[test]
fn stops_outside_the_boundary_are_filtered_silently() {
    let mut tables = minimal_tables();
    tables.insert("stops.txt", format!("{STOPS}S2,Madrid,40.41,-3.70\n"));
    tables.insert(
        "stop_times.txt",
        format!("{STOP_TIMES}T1,08:20:00,08:20:00,S2,3\n"),
    );
    tables.insert(
        "transfers.txt",
        "from_stop_id,to_stop_id,transfer_type\nS1,S2,0\nS1,S1,2\n".to_string(),
    );
    tables.insert(
        "pathways.txt",
        "pathway_id,from_stop_id,to_stop_id,pathway_mode,is_bidirectional\nPW1,S1,S2,1,1\n".to_string(),
    );
    let config = ParseConfig {
        boundaries: vec![vec![[48.0, 2.0], [48.0, 3.0], [49.0, 3.0], [49.0, 2.0]]],
        ..Default::default()
    };

    let (feed, result) = parse_tables(config, &tables);
    result.unwrap();
    assert!(feed.stop_by_id("S2").is_none());
    assert!(feed.is_filtered_stop("S2"));
    assert_eq!(feed.filtered(EntityKind::Stop), 1);
    assert_eq!(feed.filtered(EntityKind::StopTime), 1);
    assert_eq!(feed.filtered(EntityKind::Transfer), 1);
    assert_eq!(feed.filtered(EntityKind::Pathway), 1);
    assert_eq!(feed.total_dropped(), 0);
    assert_eq!(feed.trip_by_id("T1").unwrap().stop_times.len(), 2);
    assert_eq!(feed.transfers().len(), 1);
}

#[test]
fn routes_outside_the_mode_filter_take_their_trips_along() {
    let mut tables = minimal_tables();
    tables.insert("routes.txt", format!("{ROUTES}R2,A1,RER,2\n"));
    tables.insert("trips.txt", format!("{TRIPS}R2,WK,T2\n"));
    tables.insert(
        "stop_times.txt",
        format!("{STOP_TIMES}T2,09:00:00,09:00:00,S1,1\nT2,09:30:00,09:30:00,S1,2\n"),
    );
    tables.insert(
        "frequencies.txt",
        "trip_id,start_time,end_time,headway_secs\nT2,06:00:00,09:00:00,600\n".to_string(),
    );
    tables.insert(
        "fare_attributes.txt",
        "fare_id,price,currency_type,payment_method,transfers\nF1,2.10,EUR,0,\n".to_string(),
    );
    tables.insert("fare_rules.txt", "fare_id,route_id\nF1,R1\nF1,R2\n".to_string());
    tables.insert(
        "attributions.txt",
        "attribution_id,trip_id,organization_name,is_producer\nAT1,T2,Data Co,1\nAT2,,Data Co,1\n".to_string(),
    );
    let config = ParseConfig {
        route_types: Some(vec![3]),
        ..Default::default()
    };

    let (feed, result) = parse_tables(config, &tables);
    result.unwrap();
    assert!(feed.route_by_id("R2").is_none());
    assert!(feed.is_filtered_route("R2"));
    assert!(feed.trip_by_id("T2").is_none());
    assert!(feed.is_filtered_trip("T2"));
    assert_eq!(feed.filtered(EntityKind::Route), 1);
    assert_eq!(feed.filtered(EntityKind::Trip), 1);
    assert_eq!(feed.filtered(EntityKind::StopTime), 2);
    assert_eq!(feed.filtered(EntityKind::Frequency), 1);
    assert_eq!(feed.filtered(EntityKind::FareRule), 1);
    assert_eq!(feed.filtered(EntityKind::Attribution), 1);
    assert_eq!(feed.fare_attribute_by_id("F1").unwrap().rules.len(), 1);
    assert_eq!(feed.attributions().len(), 1);
    assert_eq!(feed.total_dropped(), 0);
}

#[test]
fn services_outside_the_date_window_are_pruned_with_their_trips() {
    let mut tables = minimal_tables();
    tables.insert(
        "calendar.txt",
        format!("{CALENDAR}OLD,1,1,1,1,1,0,0,20230101,20231231\n"),
    );
    tables.insert("trips.txt", format!("{TRIPS}R1,OLD,T2\n"));
    tables.insert(
        "stop_times.txt",
        format!("{STOP_TIMES}T2,09:00:00,09:00:00,S1,1\n"),
    );
    let config = ParseConfig {
        start_date: Some(date("20240301")),
        end_date: Some(date("20240331")),
        ..Default::default()
    };

    let (feed, result) = parse_tables(config, &tables);
    result.unwrap();
    assert!(feed.service_by_id("OLD").is_none());
    assert!(feed.trip_by_id("T2").is_none());
    assert_eq!(feed.filtered(EntityKind::Trip), 1);
    assert_eq!(feed.filtered(EntityKind::StopTime), 1);

    let service = feed.service_by_id("WK").unwrap();
    assert_eq!(service.start_date, Some(date("20240301")));
    assert_eq!(service.end_date, Some(date("20240331")));
}

#[test]
fn agencies_with_different_timezones_fail_under_every_policy() {
    let mut tables = minimal_tables();
    tables.insert(
        "agency.txt",
        format!("{AGENCY}A2,Regio,https://regio.example,Europe/Berlin\n"),
    );
    let use_default = ParseConfig {
        use_default_on_error: true,
        ..Default::default()
    };
    for config in [ParseConfig::default(), drop_erroneous(), use_default] {
        let (_, result) = parse_tables(config, &tables);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CrossEntityConsistency);
        assert_eq!(err.table(), "agency.txt");
        assert_eq!(err.line(), 3);
    }
}

#[test]
fn fare_zone_of_a_filtered_stop_is_suppressed() {
    let mut tables = minimal_tables();
    tables.insert(
        "stops.txt",
        "stop_id,stop_name,stop_lat,stop_lon,zone_id\n\
         S1,Central,48.85,2.35,Z1\n\
         S2,Madrid,40.41,-3.70,Z2\n"
            .to_string(),
    );
    tables.insert(
        "fare_attributes.txt",
        "fare_id,price,currency_type,payment_method,transfers\nF1,2.10,EUR,0,\n".to_string(),
    );
    tables.insert(
        "fare_rules.txt",
        "fare_id,origin_id,destination_id\nF1,Z1,Z1\nF1,Z1,Z2\n".to_string(),
    );
    let config = ParseConfig {
        boundaries: vec![vec![[48.0, 2.0], [48.0, 3.0], [49.0, 3.0], [49.0, 2.0]]],
        ..Default::default()
    };

    let (feed, result) = parse_tables(config.clone(), &tables);
    result.unwrap();
    assert_eq!(feed.filtered(EntityKind::FareRule), 1);
    assert_eq!(feed.fare_attribute_by_id("F1").unwrap().rules.len(), 1);

    tables.insert(
        "fare_rules.txt",
        "fare_id,origin_id,destination_id\nF1,Z1,Z9\n".to_string(),
    );
    let (_, result) = parse_tables(config, &tables);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::UnresolvedReference);
}

#[test]
fn zone_of_a_stop_dropped_by_the_hierarchy_is_unknown() {
    let mut tables = minimal_tables();
    tables.insert(
        "stops.txt",
        "stop_id,stop_name,stop_lat,stop_lon,location_type,parent_station,zone_id\n\
         S1,Central,48.85,2.35,0,,\n\
         ST,Station,48.85,2.35,1,,\n\
         B1,Gate,48.85,2.35,4,ST,Z9\n"
            .to_string(),
    );
    tables.insert(
        "fare_attributes.txt",
        "fare_id,price,currency_type,payment_method,transfers\nF1,2.10,EUR,0,\n".to_string(),
    );
    tables.insert("fare_rules.txt", "fare_id,origin_id\nF1,Z9\n".to_string());

    let (feed, result) = parse_tables(drop_erroneous(), &tables);
    result.unwrap();
    assert!(feed.stop_by_id("B1").is_none());
    assert_eq!(feed.dropped(EntityKind::Stop), 1);
    assert_eq!(feed.dropped(EntityKind::FareRule), 1);
    assert_eq!(feed.filtered(EntityKind::FareRule), 0);
    assert_eq!(feed.fare_attribute_by_id("F1").unwrap().rules.len(), 0);
}

#[test]
fn dry_run_keeps_counts_but_releases_bulk_tables() {
    let mut tables = minimal_tables();
    tables.insert(
        "translations.txt",
        "table_name,field_name,language,translation,record_id\nstops,stop_name,de,Zentrum,S1\n".to_string(),
    );
    tables.insert("stops.txt", "stop_id,stop_name,stop_lat,stop_lon,platform_color\nS1,Central,48.85,2.35,red\n".to_string());
    let config = ParseConfig {
        dry_run: true,
        keep_extra_columns: true,
        ..Default::default()
    };

    let (feed, result) = parse_tables(config, &tables);
    result.unwrap();
    assert_eq!(feed.stop_time_count(), 2);
    assert!(feed.trip_by_id("T1").unwrap().stop_times.is_empty());
    assert_eq!(feed.translation_count(), 1);
    assert!(feed.translations().is_empty());
    assert!(feed.extra_columns("stops.txt", "S1").is_empty());
}

#[test]
fn extra_columns_are_kept_and_deleted_with_their_owner() {
    let mut tables = minimal_tables();
    tables.insert(
        "stops.txt",
        "stop_id,stop_name,stop_lat,stop_lon,platform_color\nS1,Central,48.85,2.35,red\n".to_string(),
    );
    tables.insert(
        "stop_times.txt",
        "trip_id,arrival_time,departure_time,stop_id,stop_sequence,stop_headsign\n\
         T1,08:00:00,08:00:00,S1,1,Nord\n\
         T1,08:10:00,08:10:00,S1,2,Nord\n"
            .to_string(),
    );
    let config = ParseConfig {
        keep_extra_columns: true,
        ..Default::default()
    };

    let (mut feed, result) = parse_tables(config, &tables);
    result.unwrap();
    let extras = feed.extra_columns("stops.txt", "S1");
    assert_eq!(extras.len(), 1);
    assert_eq!(extras[0].get("platform_color").map(String::as_str), Some("red"));
    assert_eq!(feed.extra_columns("stop_times.txt", "T1").len(), 2);
    assert_eq!(
        feed.column_order("stops.txt").unwrap(),
        ["stop_id", "stop_name", "stop_lat", "stop_lon", "platform_color"]
    );

    assert!(feed.delete_stop("S1").is_some());
    assert!(feed.extra_columns("stops.txt", "S1").is_empty());
    assert!(feed.delete_trip("T1").is_some());
    assert!(feed.extra_columns("stop_times.txt", "T1").is_empty());
}

#[test]
fn invalid_values_fall_back_to_defaults_when_allowed() {
    let mut tables = minimal_tables();
    tables.insert(
        "routes.txt",
        "route_id,agency_id,route_short_name,route_type,route_color\nR1,A1,1,3,crimson\n".to_string(),
    );

    let (_, result) = parse_tables(ParseConfig::default(), &tables);
    assert_eq!(result.unwrap_err().kind(), ErrorKind::TypeOrFormatViolation);

    let config = ParseConfig {
        use_default_on_error: true,
        ..Default::default()
    };
    let (feed, result) = parse_tables(config, &tables);
    result.unwrap();
    assert_eq!(feed.route_by_id("R1").unwrap().color.to_string(), "FFFFFF");
    assert_eq!(feed.notices().count_code(NOTICE_CODE_DEFAULT_SUBSTITUTED), 1);
}

#[test]
fn extended_route_types_normalize_when_configured() {
    let mut tables = minimal_tables();
    tables.insert("routes.txt", "route_id,agency_id,route_short_name,route_type\nR1,A1,1,700\n".to_string());
    let config = ParseConfig {
        normalize_route_types: true,
        ..Default::default()
    };
    let (feed, result) = parse_tables(config, &tables);
    result.unwrap();
    assert_eq!(feed.route_by_id("R1").unwrap().route_type, RouteType::Bus);
}

#[test]
fn parent_station_may_appear_later_in_the_file() {
    let mut tables = minimal_tables();
    tables.insert(
        "stops.txt",
        "stop_id,stop_name,stop_lat,stop_lon,location_type,parent_station\n\
         S1,Central,48.85,2.35,0,ST\n\
         ST,Central Station,48.85,2.35,1,\n"
            .to_string(),
    );
    let (feed, result) = parse_tables(ParseConfig::default(), &tables);
    result.unwrap();
    assert_eq!(feed.stop_by_id("S1").unwrap().parent, feed.stops().idx("ST"));
}

#[test]
fn missing_required_table_is_reported() {
    let mut tables = minimal_tables();
    tables.remove("trips.txt");
    let (_, result) = parse_tables(ParseConfig::default(), &tables);
    let err = result.unwrap_err();
    assert_eq!(err.table(), "trips.txt");
    assert!(matches!(err, ParseError::MissingTable { .. }));
}

#[test]
fn stop_times_become_zoned_instants_from_noon() {
    let (feed, result) = parse_tables(ParseConfig::default(), &minimal_tables());
    result.unwrap();
    let trip = feed.trips().idx("T1").unwrap();
    // Clocks move forward at 02:00 on this day in Paris.
    let instant = feed.stop_time_instant(trip, 0, date("20240331")).unwrap();
    let expected = NaiveDate::from_ymd_opt(2024, 3, 31)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap();
    assert_eq!(instant.naive_utc(), expected);
}

#[test]
fn parses_a_directory_with_an_id_prefix() {
    let dir = temp_dir("gtfs_ingest_dir");
    fs::create_dir_all(&dir).unwrap();
    for (name, body) in minimal_tables() {
        fs::write(dir.join(name), body).unwrap();
    }

    let mut feed = Feed::new(ParseConfig::default());
    let result = feed.parse(&dir, Some("p_"));
    fs::remove_dir_all(&dir).ok();
    result.unwrap();
    assert!(feed.stop_by_id("p_S1").is_some());
    assert!(feed.trip_by_id("p_T1").is_some());
    assert!(feed.stop_by_id("S1").is_none());
}

fn zip_with_subdirectory() -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default();
    for (name, body) in minimal_tables() {
        writer.start_file(format!("feed/{name}"), options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn zip_fix_finds_tables_in_a_subdirectory() {
    let mut input = FeedInput::from_zip_bytes(zip_with_subdirectory(), true).unwrap();
    let mut feed = Feed::new(ParseConfig::default());
    feed.parse_input(&mut input, None).unwrap();
    assert_eq!(feed.trips().len(), 1);

    let mut input = FeedInput::from_zip_bytes(zip_with_subdirectory(), false).unwrap();
    let mut feed = Feed::new(ParseConfig::default());
    let err = feed.parse_input(&mut input, None).unwrap_err();
    assert_eq!(err.table(), "agency.txt");
}

#[derive(Default)]
struct RecordingProgress {
    started: RefCell<Vec<String>>,
    total: RefCell<usize>,
}

impl ProgressHandler for RecordingProgress {
    fn on_start_table(&self, table: &str) {
        self.started.borrow_mut().push(table.to_string());
    }

    fn on_finish_table(&self, _table: &str, _retained: usize) {}

    fn set_total_tables(&self, count: usize) {
        *self.total.borrow_mut() = count;
    }
}

#[test]
fn progress_follows_the_table_order() {
    let progress = RecordingProgress::default();
    let mut input = FeedInput::from_tables(
        minimal_tables()
            .into_iter()
            .map(|(name, body)| (name.to_string(), body.into_bytes())),
    );
    let mut feed = Feed::new(ParseConfig::default());
    feed.parse_input_with_progress(&mut input, None, &progress)
        .unwrap();

    let started = progress.started.borrow();
    assert_eq!(*progress.total.borrow(), started.len());
    assert_eq!(started[0], "agency.txt");
    let position = |name: &str| started.iter().position(|table| table == name).unwrap();
    assert!(position("stops.txt") < position("shapes.txt"));
    assert!(position("calendar_dates.txt") < position("trips.txt"));
    assert!(position("trips.txt") < position("stop_times.txt"));
}
