#![no_main]
use gtfs_model::{GtfsColor, GtfsDate, GtfsTime};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    if let Ok(date) = GtfsDate::parse(data) {
        assert_eq!(GtfsDate::parse(&date.to_string()), Ok(date));
        let _ = date.add_days(1);
    }
    if let Ok(time) = GtfsTime::parse(data) {
        assert_eq!(GtfsTime::parse(&time.to_string()), Ok(time));
    }
    let _ = GtfsColor::parse(data);
});
