/// Receives table-level progress events during a parse.
pub trait ProgressHandler {
    /// Called before the first record of a table is read.
    fn on_start_table(&self, table: &str);

    /// Called once a table and its sweeps are complete.
    fn on_finish_table(&self, table: &str, retained: usize);

    /// Number of tables the parse will visit (optional usage)
    fn set_total_tables(&self, count: usize) {
        let _ = count;
    }
}

/// A no-op progress handler
pub struct NoOpProgressHandler;

impl ProgressHandler for NoOpProgressHandler {
    fn on_start_table(&self, _table: &str) {}
    fn on_finish_table(&self, _table: &str, _retained: usize) {}
}
