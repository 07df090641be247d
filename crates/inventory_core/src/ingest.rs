use std::collections::HashSet;

use serde_json::Value;
use thiserror::Error;

use crate::contract::{InventoryItem, COUNT_ATTRIBUTE, PARTITION_KEY, SORT_KEY};

/// Maximum number of write requests the table service accepts per batch.
pub const WRITE_BATCH_SIZE: usize = 25;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("inventory file is not valid UTF-8: {0}")]
    Encoding(String),
    #[error("malformed CSV: {0}")]
    Malformed(String),
    #[error("CSV header is missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("row {row} has an empty `{column}` value")]
    EmptyKey { row: usize, column: &'static str },
    #[error("row {row} has a non-integer Count `{value}`")]
    InvalidCount { row: usize, value: String },
    #[error("row {row} repeats key ({store}, {item})")]
    DuplicateKey {
        row: usize,
        store: String,
        item: String,
    },
}

/// Parses a delimited inventory file (header row + data rows) into table items.
///
/// Column names become attribute names verbatim. `Count`, when present, is
/// stored as an integer; every other cell stays a string. The whole file is
/// validated before anything is returned so callers can refuse to touch the
/// table on bad input.
pub fn parse_inventory_csv(bytes: &[u8]) -> Result<Vec<InventoryItem>, IngestError> {
    let text =
        std::str::from_utf8(bytes).map_err(|error| IngestError::Encoding(error.to_string()))?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|error| IngestError::Malformed(error.to_string()))?
        .clone();

    for required in [PARTITION_KEY, SORT_KEY] {
        if !headers.iter().any(|column| column == required) {
            return Err(IngestError::MissingColumn(required));
        }
    }

    let mut items = Vec::new();
    let mut seen = HashSet::new();
    for (index, record) in reader.records().enumerate() {
        let row = index + 1;
        let record = record.map_err(|error| IngestError::Malformed(error.to_string()))?;

        let mut item = InventoryItem::new();
        for (column, cell) in headers.iter().zip(record.iter()) {
            let value = if column == COUNT_ATTRIBUTE {
                let count = cell
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| IngestError::InvalidCount {
                        row,
                        value: cell.to_string(),
                    })?;
                Value::from(count)
            } else {
                Value::from(cell)
            };
            item.insert(column.to_string(), value);
        }

        for column in [PARTITION_KEY, SORT_KEY] {
            let empty = item
                .get(column)
                .and_then(Value::as_str)
                .map(str::is_empty)
                .unwrap_or(true);
            if empty {
                return Err(IngestError::EmptyKey { row, column });
            }
        }

        // One batch may not write the same key twice.
        if let Some((store, name)) = item_key(&item) {
            if !seen.insert((store.clone(), name.clone())) {
                return Err(IngestError::DuplicateKey {
                    row,
                    store,
                    item: name,
                });
            }
        }

        items.push(item);
    }

    Ok(items)
}

/// Rewrites `Count` as a JSON integer when it holds a number or numeric text.
pub fn coerce_count(item: &mut InventoryItem) {
    let Some(current) = item.get(COUNT_ATTRIBUTE) else {
        return;
    };

    let coerced = match current {
        Value::Number(number) if number.is_i64() || number.is_u64() => return,
        Value::Number(number) => number.as_f64().map(|value| value.trunc() as i64),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };

    if let Some(count) = coerced {
        item.insert(COUNT_ATTRIBUTE.to_string(), Value::from(count));
    }
}

/// Primary key (Store, Item) of a table item, if both parts are strings.
pub fn item_key(item: &InventoryItem) -> Option<(String, String)> {
    let store = item.get(PARTITION_KEY)?.as_str()?;
    let name = item.get(SORT_KEY)?.as_str()?;
    Some((store.to_string(), name.to_string()))
}
