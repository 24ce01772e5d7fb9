#![no_main]
use arbitrary::Arbitrary;
use gtfs_ingest_core::Polygon;
use gtfs_model::Coordinates;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzPolygon {
    ring: Vec<[f64; 2]>,
    lat: f64,
    lon: f64,
}

fuzz_target!(|data: FuzzPolygon| {
    let polygon = Polygon::from_lat_lon(&data.ring);
    let _ = polygon.contains(Coordinates {
        lat: data.lat,
        lon: data.lon,
    });
});
