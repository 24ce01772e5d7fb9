use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Seek};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use crate::record::CsvRecordSource;

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("input path does not exist: {0}")]
    MissingPath(PathBuf),
    #[error("input must be a directory or a .zip archive: {0}")]
    InvalidPath(PathBuf),
    #[error("io error on {file}: {source}")]
    Io {
        file: String,
        #[source]
        source: io::Error,
    },
    #[error("zip error on {file}: {source}")]
    Zip {
        file: String,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("csv error in {file}: {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },
}

pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek> ReadSeek for T {}

pub type TableSource<'a> = CsvRecordSource<Box<dyn Read + 'a>>;

/// Provider of the physical file behind each logical table.
///
/// An archive is opened once and reused for every table. Only one table
/// stream can be open at a time since each borrows the input mutably.
pub enum FeedInput {
    Directory {
        root: PathBuf,
    },
    Zip {
        archive: ZipArchive<Box<dyn ReadSeek>>,
        prefix: String,
    },
    Memory {
        tables: HashMap<String, Vec<u8>>,
    },
}

impl std::fmt::Debug for FeedInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedInput::Directory { root } => f.debug_struct("Directory").field("root", root).finish(),
            FeedInput::Zip { archive, prefix } => f
                .debug_struct("Zip")
                .field("entries", &archive.len())
                .field("prefix", prefix)
                .finish(),
            FeedInput::Memory { tables } => f
                .debug_struct("Memory")
                .field("tables", &tables.keys().collect::<Vec<_>>())
                .finish(),
        }
    }
}

impl FeedInput {
    pub fn from_path(path: impl AsRef<Path>, zip_fix: bool) -> Result<Self, InputError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InputError::MissingPath(path.to_path_buf()));
        }
        if path.is_dir() {
            return Ok(FeedInput::Directory {
                root: path.to_path_buf(),
            });
        }
        let is_zip = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("zip"))
            .unwrap_or(false);
        if !is_zip {
            return Err(InputError::InvalidPath(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|source| InputError::Io {
            file: path.display().to_string(),
            source,
        })?;
        Self::from_zip_reader(BufReader::new(file), zip_fix)
    }

    pub fn from_zip_bytes(bytes: Vec<u8>, zip_fix: bool) -> Result<Self, InputError> {
        Self::from_zip_reader(Cursor::new(bytes), zip_fix)
    }

    pub fn from_zip_reader<R: Read + Seek + 'static>(
        reader: R,
        zip_fix: bool,
    ) -> Result<Self, InputError> {
        let reader: Box<dyn ReadSeek> = Box::new(reader);
        let archive = ZipArchive::new(reader).map_err(|source| InputError::Zip {
            file: "archive".to_string(),
            source,
        })?;
        let prefix = if zip_fix {
            table_root(archive.file_names())
        } else {
            String::new()
        };
        if !prefix.is_empty() {
            tracing::info!(prefix = %prefix, "reading tables from archive subdirectory");
        }
        Ok(FeedInput::Zip { archive, prefix })
    }

    pub fn from_tables<I, N, B>(tables: I) -> Self
    where
        I: IntoIterator<Item = (N, B)>,
        N: Into<String>,
        B: Into<Vec<u8>>,
    {
        FeedInput::Memory {
            tables: tables
                .into_iter()
                .map(|(name, bytes)| (name.into(), bytes.into()))
                .collect(),
        }
    }

    pub fn has_table(&self, name: &str) -> bool {
        match self {
            FeedInput::Directory { root } => root.join(name).is_file(),
            FeedInput::Zip { archive, prefix } => {
                let entry = format!("{prefix}{name}");
                archive.file_names().any(|candidate| candidate == entry)
            }
            FeedInput::Memory { tables } => tables.contains_key(name),
        }
    }

    /// Opens the table `name`; `Ok(None)` when the feed does not contain it.
    pub fn open_table(&mut self, name: &str) -> Result<Option<TableSource<'_>>, InputError> {
        let data: Box<dyn Read + '_> = match self {
            FeedInput::Directory { root } => {
                let path = root.join(name);
                match File::open(&path) {
                    Ok(file) => Box::new(BufReader::new(file)),
                    Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
                    Err(source) => {
                        return Err(InputError::Io {
                            file: name.to_string(),
                            source,
                        })
                    }
                }
            }
            FeedInput::Zip { archive, prefix } => {
                let entry = format!("{prefix}{name}");
                match archive.by_name(&entry) {
                    Ok(file) => Box::new(file),
                    Err(zip::result::ZipError::FileNotFound) => return Ok(None),
                    Err(source) => {
                        return Err(InputError::Zip {
                            file: name.to_string(),
                            source,
                        })
                    }
                }
            }
            FeedInput::Memory { tables } => match tables.get(name) {
                Some(bytes) => Box::new(bytes.as_slice()),
                None => return Ok(None),
            },
        };
        CsvRecordSource::new(name, data).map(Some)
    }
}

/// Directory prefix (with trailing slash) of the shallowest `agency.txt`,
/// or the empty prefix when the archive root already has one.
fn table_root<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut best: Option<&str> = None;
    for name in names {
        if name == "agency.txt" {
            return String::new();
        }
        if let Some(dir) = name.strip_suffix("agency.txt") {
            if !dir.ends_with('/') || dir.starts_with("__MACOSX") {
                continue;
            }
            if best.map_or(true, |current| dir.len() < current.len()) {
                best = Some(dir);
            }
        }
    }
    best.unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordSource;
    use std::io::Write;
    use zip::write::FileOptions;

    fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            for (name, content) in entries {
                writer.start_file(*name, FileOptions::default()).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn finds_the_shallowest_table_root() {
        let names = ["feed/nested/agency.txt", "feed/agency.txt", "__MACOSX/feed/agency.txt"];
        assert_eq!(table_root(names.into_iter()), "feed/");
        assert_eq!(table_root(["agency.txt", "x/agency.txt"].into_iter()), "");
        assert_eq!(table_root(["stops.txt"].into_iter()), "");
    }

    #[test]
    fn zip_fix_reads_tables_from_a_subdirectory() {
        let bytes = zip_with(&[("gtfs/agency.txt", "agency_name\nDemo\n")]);

        let mut plain = FeedInput::from_zip_bytes(bytes.clone(), false).unwrap();
        assert!(plain.open_table("agency.txt").unwrap().is_none());

        let mut fixed = FeedInput::from_zip_bytes(bytes, true).unwrap();
        assert!(fixed.has_table("agency.txt"));
        let mut source = fixed.open_table("agency.txt").unwrap().unwrap();
        let record = source.read_next_record().unwrap().unwrap();
        assert_eq!(record.get("agency_name"), Some("Demo"));
    }

    #[test]
    fn memory_tables_report_missing_tables() {
        let mut input = FeedInput::from_tables([("stops.txt", "stop_id\nS1\n")]);
        assert!(input.open_table("levels.txt").unwrap().is_none());
        assert!(input.open_table("stops.txt").unwrap().is_some());
    }

    #[test]
    fn rejects_paths_that_are_neither_directories_nor_archives() {
        let path = std::env::temp_dir().join(format!("gtfs_ingest_input_{}.txt", std::process::id()));
        std::fs::write(&path, "x").unwrap();
        assert!(matches!(
            FeedInput::from_path(&path, false),
            Err(InputError::InvalidPath(_))
        ));
        let _ = std::fs::remove_file(path);
        assert!(matches!(
            FeedInput::from_path("/definitely/not/here", false),
            Err(InputError::MissingPath(_))
        ));
    }
}
