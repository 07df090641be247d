use inventory_core::contract::{IngestResponse, StorageEvent};
use inventory_core::ingest::{item_key, parse_inventory_csv};
use serde_json::Value;
use tracing::{error, info};

use crate::adapters::object_source::ObjectSource;
use crate::adapters::table::InventoryTable;

/// Replaces the whole inventory with the contents of the uploaded file.
///
/// The return value is informational only; the storage service invokes this
/// asynchronously and does not act on it.
pub fn handle_ingest_event(
    event: Value,
    source: &impl ObjectSource,
    table: &impl InventoryTable,
) -> IngestResponse {
    match reload_inventory(event, source, table) {
        Ok(inserted) => {
            info!(inserted, "inventory reload completed");
            IngestResponse {
                status_code: 200,
                body: format!("Processed {inserted} items."),
            }
        }
        Err(message) => {
            error!(error = %message, "inventory reload failed");
            IngestResponse {
                status_code: 500,
                body: message,
            }
        }
    }
}

fn reload_inventory(
    event: Value,
    source: &impl ObjectSource,
    table: &impl InventoryTable,
) -> Result<usize, String> {
    let event: StorageEvent = serde_json::from_value(event)
        .map_err(|error| format!("invalid storage event: {error}"))?;
    let (bucket, key) = event
        .first_object()
        .ok_or_else(|| "storage event contains no records".to_string())?;

    info!(bucket, key, "processing inventory file");

    let body = source.read_object(bucket, key)?;
    let rows = parse_inventory_csv(&body).map_err(|error| error.to_string())?;

    let cleared = clear_table(table)?;
    info!(cleared, "removed previous inventory items");

    table.put_items(&rows)?;
    Ok(rows.len())
}

/// Scan-then-delete. Fine for a small catalog, linear in table size.
fn clear_table(table: &impl InventoryTable) -> Result<usize, String> {
    let keys: Vec<(String, String)> = table.scan_items()?.iter().filter_map(item_key).collect();
    if !keys.is_empty() {
        table.delete_items(&keys)?;
    }
    Ok(keys.len())
}
