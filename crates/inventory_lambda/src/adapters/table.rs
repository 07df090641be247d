use inventory_core::contract::InventoryItem;

/// Inventory table operations used by the ingest and query handlers.
pub trait InventoryTable {
    fn scan_items(&self) -> Result<Vec<InventoryItem>, String>;

    /// Items whose partition key equals `store`.
    fn query_store(&self, store: &str) -> Result<Vec<InventoryItem>, String>;

    /// Deletes items by (Store, Item) key.
    fn delete_items(&self, keys: &[(String, String)]) -> Result<(), String>;

    fn put_items(&self, items: &[InventoryItem]) -> Result<(), String>;
}
