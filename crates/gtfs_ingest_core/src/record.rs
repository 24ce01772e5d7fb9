use std::collections::HashMap;
use std::io::Read;
use std::sync::Arc;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::input::InputError;

/// Column names of one table, normalised to trimmed lower case, in file order.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Columns {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|name| {
                name.as_ref()
                    .trim_start_matches('\u{feff}')
                    .trim()
                    .to_ascii_lowercase()
            })
            .collect();
        let mut index = HashMap::with_capacity(names.len());
        for (position, name) in names.iter().enumerate() {
            index.entry(name.clone()).or_insert(position);
        }
        Self { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index(&self) -> &HashMap<String, usize> {
        &self.index
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
}

/// One row of a table: field name to string value.
#[derive(Debug, Clone)]
pub struct Record {
    columns: Arc<Columns>,
    values: StringRecord,
    line: u64,
}

impl Record {
    pub fn new(columns: Arc<Columns>, values: StringRecord, line: u64) -> Self {
        Self {
            columns,
            values,
            line,
        }
    }

    /// Trimmed value of `name`; `None` when the column is absent or the cell is blank.
    pub fn get(&self, name: &str) -> Option<&str> {
        let position = self.columns.position(name)?;
        self.values
            .get(position)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    pub fn line(&self) -> u64 {
        self.line
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .names()
            .iter()
            .zip(self.values.iter())
            .map(|(name, value)| (name.as_str(), value.trim()))
    }
}

/// Supplies the records of one logical table in file order.
pub trait RecordSource {
    fn columns(&self) -> &[String];
    fn column_index(&self) -> &HashMap<String, usize>;
    fn read_next_record(&mut self) -> Result<Option<Record>, InputError>;
    /// Line of the most recently read record (1 is the header line).
    fn line(&self) -> u64;
}

pub struct CsvRecordSource<R: Read> {
    file: String,
    reader: csv::Reader<R>,
    columns: Arc<Columns>,
    line: u64,
}

impl<R: Read> CsvRecordSource<R> {
    pub fn new(file: &str, data: R) -> Result<Self, InputError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::None)
            .from_reader(data);
        let headers = reader.headers().map_err(|source| InputError::Csv {
            file: file.to_string(),
            source,
        })?;
        let columns = Arc::new(Columns::new(headers.iter()));
        Ok(Self {
            file: file.to_string(),
            reader,
            columns,
            line: 1,
        })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn shared_columns(&self) -> Arc<Columns> {
        Arc::clone(&self.columns)
    }
}

impl<R: Read> RecordSource for CsvRecordSource<R> {
    fn columns(&self) -> &[String] {
        self.columns.names()
    }

    fn column_index(&self) -> &HashMap<String, usize> {
        self.columns.index()
    }

    fn read_next_record(&mut self) -> Result<Option<Record>, InputError> {
        let mut values = StringRecord::new();
        let more = self
            .reader
            .read_record(&mut values)
            .map_err(|source| InputError::Csv {
                file: self.file.clone(),
                source,
            })?;
        if !more {
            return Ok(None);
        }
        self.line = values
            .position()
            .map(|position| position.line())
            .unwrap_or(self.line + 1);
        Ok(Some(Record::new(
            Arc::clone(&self.columns),
            values,
            self.line,
        )))
    }

    fn line(&self) -> u64 {
        self.line
    }
}
