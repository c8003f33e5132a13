use polars::prelude::*;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::MSError;
use crate::host::LogEntry;

pub const COLUMNS: [&str; 6] = ["name", "id", "status", "player_a", "player_b", "timestamp"];

#[derive(Debug, PartialEq)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

/// Reads a scouts' log export into host log entries, one per row.
pub fn load_entries(path: &Path) -> Result<Vec<LogEntry>, MSError> {
    let file_type = get_file_type(path)?;
    let frame = match file_type {
        FileType::CSV => load_csv(path)?,
        FileType::PARQUET => load_parquet(path)?,
        FileType::ARROW => load_arrow(path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;
    let columns = COLUMNS
        .iter()
        .map(|name| load_column(&df, name))
        .collect::<Result<Vec<Vec<String>>, MSError>>()?;

    let entries: Vec<LogEntry> = (0..df.height())
        .map(|i| LogEntry {
            name: columns[0][i].clone(),
            id: columns[1][i].clone(),
            status: columns[2][i].clone(),
            player_a: columns[3][i].clone(),
            player_b: columns[4][i].clone(),
            timestamp: columns[5][i].clone(),
        })
        .collect();

    info!(
        "Loaded {} entries from {:?} ({file_type:?}) in {}ms",
        entries.len(),
        path,
        start_time.elapsed().as_millis()
    );
    Ok(entries)
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<Vec<String>, MSError> {
    let col = df
        .column(col_name)
        .map_err(|_| MSError::MissingColumn(col_name.to_string()))?
        .cast(&DataType::String)?;
    let series = col.str()?;
    let data: Vec<String> = series
        .into_iter()
        .map(|value| value.map(|s| s.trim().to_string()).unwrap_or_default())
        .collect();
    debug!("Column \"{col_name}\": {} values", data.len());
    Ok(data)
}

fn get_file_type(path: &Path) -> Result<FileType, MSError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => MSError::LoadingFailed(format!("{} not found", path.display())),
        ErrorKind::PermissionDenied => {
            MSError::LoadingFailed(format!("{}: permission denied", path.display()))
        }
        _ => MSError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(MSError::LoadingFailed("Not a file!".into()));
    }
    detect_file_type(path)
}

fn detect_file_type(path: &Path) -> Result<FileType, MSError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(MSError::UnknownFileType),
    }
}

fn local(path: &Path) -> PlPath {
    PlPath::Local(path.into())
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(local(path)).with_has_header(true).finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(local(path), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        local(path),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_csv_entries_in_file_order() {
        let file = csv_file(
            "name,id,status,player_a,player_b,timestamp\n\
             Zeta,12,Need A,alice,,2024-03-01 10:00:00\n\
             alpha,3,Need B,bob,alice,2024-03-02 10:00:00\n",
        );
        let entries = load_entries(file.path()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Zeta");
        assert_eq!(entries[0].id, "12");
        assert_eq!(entries[0].player_b, "");
        assert_eq!(entries[1].player_b, "alice");
    }

    #[test]
    fn missing_column_is_reported() {
        let file = csv_file("name,id\nZeta,12\n");
        assert!(matches!(
            load_entries(file.path()),
            Err(MSError::MissingColumn(c)) if c == "status"
        ));
    }

    #[test]
    fn rejects_unknown_extension() {
        assert!(matches!(
            detect_file_type(Path::new("log.txt")),
            Err(MSError::UnknownFileType)
        ));
        assert_eq!(detect_file_type(Path::new("log.PQ")).unwrap(), FileType::PARQUET);
    }

    #[test]
    fn missing_file_fails_loading() {
        assert!(matches!(
            load_entries(Path::new("/definitely/not/here.csv")),
            Err(MSError::LoadingFailed(_))
        ));
    }
}
