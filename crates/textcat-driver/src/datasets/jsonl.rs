//! Local datasets stored as one JSON object per line

use super::{Record, RecordStream};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use textcat_core::{Error, Result};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tracing::debug;

/// Parse one line; `None` for blank lines
fn parse_line(path: &Path, number: usize, line: &str) -> Option<Result<Record>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let parsed = match serde_json::from_str::<serde_json::Value>(line) {
        Ok(serde_json::Value::Object(record)) => Ok(record),
        Ok(_) => Err(Error::dataset(format!(
            "{}:{number}: expected a JSON object",
            path.display()
        ))),
        Err(e) => Err(Error::dataset(format!("{}:{number}: {e}", path.display()))),
    };
    Some(parsed)
}

/// Read and parse the whole file up front
pub async fn open_eager(path: &Path) -> Result<RecordStream> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::dataset(format!("cannot read {}: {e}", path.display())))?;

    let records = contents
        .lines()
        .enumerate()
        .filter_map(|(i, line)| parse_line(path, i + 1, line))
        .collect::<Result<Vec<_>>>()?;

    debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(stream::iter(records.into_iter().map(Ok)).boxed())
}

struct LineReader {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    number: usize,
    done: bool,
}

/// Read records lazily as the stream is polled
pub async fn open_streaming(path: &Path) -> Result<RecordStream> {
    let file = File::open(path)
        .await
        .map_err(|e| Error::dataset(format!("cannot open {}: {e}", path.display())))?;

    let reader = LineReader {
        path: path.to_path_buf(),
        lines: BufReader::new(file).lines(),
        number: 0,
        done: false,
    };

    let records = stream::unfold(reader, |mut reader| async move {
        while !reader.done {
            match reader.lines.next_line().await {
                Ok(Some(line)) => {
                    reader.number += 1;
                    if let Some(record) = parse_line(&reader.path, reader.number, &line) {
                        if record.is_err() {
                            reader.done = true;
                        }
                        return Some((record, reader));
                    }
                }
                Ok(None) => reader.done = true,
                Err(e) => {
                    reader.done = true;
                    return Some((Err(e.into()), reader));
                }
            }
        }
        None
    });
    Ok(records.boxed())
}
