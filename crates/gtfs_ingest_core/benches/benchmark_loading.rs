use std::fmt::Write;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gtfs_ingest_core::{Feed, FeedInput, ParseConfig};

/// Builds the tables of a feed with `num_trips` trips, each calling at
/// `stops_per_trip` stops and following its own shape. Rows are written in
/// reverse sequence order so the sweeps have sorting to do.
fn generate_tables(num_trips: usize, stops_per_trip: usize) -> Vec<(String, Vec<u8>)> {
    let agency = "agency_id,agency_name,agency_url,agency_timezone\n\
                  A1,Bench Transit,https://bench.example,Europe/Paris\n"
        .to_string();
    let routes = "route_id,agency_id,route_short_name,route_type\nR1,A1,1,3\n".to_string();
    let calendar = "service_id,monday,tuesday,wednesday,thursday,friday,saturday,sunday,start_date,end_date\n\
                    WK,1,1,1,1,1,0,0,20240101,20241231\n"
        .to_string();

    let mut stops = String::from("stop_id,stop_name,stop_lat,stop_lon\n");
    for i in 0..stops_per_trip {
        let lat = 48.80 + (i as f64) * 0.001;
        writeln!(stops, "ST{i},Stop {i},{lat:.6},2.350000").ok();
    }

    let mut trips = String::from("route_id,service_id,trip_id,shape_id\n");
    let mut shapes =
        String::from("shape_id,shape_pt_lat,shape_pt_lon,shape_pt_sequence,shape_dist_traveled\n");
    let mut stop_times =
        String::from("trip_id,arrival_time,departure_time,stop_id,stop_sequence,shape_dist_traveled\n");
    for trip in 0..num_trips {
        writeln!(trips, "R1,WK,T{trip},SH{trip}").ok();
        let start = 5 * 3600 + (trip as u32) * 120;
        for i in (0..stops_per_trip).rev() {
            let lat = 48.80 + (i as f64) * 0.001;
            let dist = (i as f64) * 110.0;
            writeln!(shapes, "SH{trip},{lat:.6},2.350000,{i},{dist:.1}").ok();

            let seconds = start + (i as u32) * 90;
            let time = format!("{:02}:{:02}:{:02}", seconds / 3600, (seconds % 3600) / 60, seconds % 60);
            writeln!(stop_times, "T{trip},{time},{time},ST{i},{i},{dist:.1}").ok();
        }
    }

    [
        ("agency.txt", agency),
        ("stops.txt", stops),
        ("routes.txt", routes),
        ("calendar.txt", calendar),
        ("trips.txt", trips),
        ("shapes.txt", shapes),
        ("stop_times.txt", stop_times),
    ]
    .into_iter()
    .map(|(name, body)| (name.to_string(), body.into_bytes()))
    .collect()
}

fn parse(tables: &[(String, Vec<u8>)], config: &ParseConfig) -> Feed {
    let mut input = FeedInput::from_tables(tables.iter().cloned());
    let mut feed = Feed::new(config.clone());
    feed.parse_input(&mut input, None).unwrap();
    feed
}

fn benchmark_loading(c: &mut Criterion) {
    // 500 trips, 40 stops each: 20k stop times and 20k shape points
    let tables = generate_tables(500, 40);

    let strict = ParseConfig::default();
    c.bench_function("load_500_trips_40_stops", |b| {
        b.iter(|| black_box(parse(&tables, &strict)))
    });

    let dry_run = ParseConfig {
        dry_run: true,
        ..Default::default()
    };
    c.bench_function("load_500_trips_40_stops_dry_run", |b| {
        b.iter(|| black_box(parse(&tables, &dry_run)))
    });

    let filtered = ParseConfig {
        boundaries: vec![vec![[48.0, 2.0], [48.0, 3.0], [48.815, 3.0], [48.815, 2.0]]],
        ..Default::default()
    };
    c.bench_function("load_500_trips_40_stops_geo_filtered", |b| {
        b.iter(|| black_box(parse(&tables, &filtered)))
    });
}

criterion_group!(benches, benchmark_loading);
criterion_main!(benches);
