#![no_main]
use arbitrary::Arbitrary;
use gtfs_ingest_core::tables::TABLE_ORDER;
use gtfs_ingest_core::{Feed, FeedInput, ParseConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct FuzzFeed {
    tables: Vec<(u8, Vec<u8>)>,
    use_default_on_error: bool,
    drop_erroneous: bool,
    dry_run: bool,
}

fuzz_target!(|data: FuzzFeed| {
    let tables = data.tables.into_iter().map(|(table, body)| {
        let def = TABLE_ORDER[usize::from(table) % TABLE_ORDER.len()];
        (def.file, body)
    });
    let mut input = FeedInput::from_tables(tables);
    let mut feed = Feed::new(ParseConfig {
        use_default_on_error: data.use_default_on_error,
        drop_erroneous: data.drop_erroneous,
        dry_run: data.dry_run,
        ..Default::default()
    });
    let _ = feed.parse_input(&mut input, None);
});
