//! Snapshot table readers. Each table is a JSON-lines file with one row per
//! line; a row missing a required column fails the whole load.

use recs_core::{ItemId, RecsError, RecsResult, UserId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::info;

/// One row of the item-similarity table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimilarRow {
    pub item_id_1: ItemId,
    pub item_id_2: ItemId,
    pub score: f64,
}

/// One row of the personal ranking table. Rows for a user appear in rank order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersonalRow {
    pub user_id: UserId,
    pub item_id: ItemId,
}

/// One row of the global popularity ranking, in rank order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PopularRow {
    pub item_id: ItemId,
}

/// Read every row of a snapshot file. Any failure is reported as
/// `RecsError::Snapshot` naming the file.
pub fn read_table<T: DeserializeOwned>(path: &Path) -> RecsResult<Vec<T>> {
    let source = path.display().to_string();
    let rows = File::open(path)
        .map_err(RecsError::from)
        .and_then(|file| parse_rows(BufReader::new(file), &source))
        .map_err(|e| e.into_snapshot(&source))?;
    info!(path = %path.display(), rows = rows.len(), "Snapshot table loaded");
    Ok(rows)
}

/// Parse JSON-lines rows from any reader. `source` names the input in errors.
pub fn parse_rows<T, R>(reader: R, source: &str) -> RecsResult<Vec<T>>
where
    T: DeserializeOwned,
    R: BufRead,
{
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let row = serde_json::from_str(trimmed).map_err(|e| {
            RecsError::snapshot(source, format!("line {}: {}", idx + 1, e))
        })?;
        rows.push(row);
    }
    Ok(rows)
}
