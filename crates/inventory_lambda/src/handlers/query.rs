use inventory_core::contract::{ApiGatewayResponse, HttpApiRequest};
use inventory_core::ingest::coerce_count;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::adapters::table::InventoryTable;

pub const STORE_PATH_PARAMETER: &str = "store";

/// `GET /items` scans the table, `GET /items/{store}` queries one partition.
pub fn handle_query_event(event: Value, table: &impl InventoryTable) -> ApiGatewayResponse {
    let request = match serde_json::from_value::<HttpApiRequest>(event) {
        Ok(value) => value,
        Err(error) => {
            return ApiGatewayResponse::error(
                500,
                query_headers(),
                format!("invalid request event: {error}"),
            )
        }
    };

    let store = request.path_parameter(STORE_PATH_PARAMETER);
    let lookup = match store {
        Some(store) => table.query_store(store),
        None => table.scan_items(),
    };

    match lookup {
        Ok(mut items) => {
            items.iter_mut().for_each(coerce_count);
            info!(store = store.unwrap_or("*"), returned = items.len(), "inventory lookup");
            ApiGatewayResponse::json(200, query_headers(), &items)
        }
        Err(message) => {
            error!(error = %message, "inventory lookup failed");
            ApiGatewayResponse::error(500, query_headers(), message)
        }
    }
}

fn query_headers() -> Value {
    json!({
        "Content-Type": "application/json",
        "Access-Control-Allow-Origin": "*",
        "Access-Control-Allow-Methods": "GET",
    })
}
