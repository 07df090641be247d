use std::collections::BTreeMap;
use std::sync::Mutex;

use inventory_core::contract::InventoryItem;
use inventory_core::ingest::item_key;
use serde_json::{json, Value};

use crate::adapters::table::InventoryTable;

/// Map-backed table keyed by (Store, Item).
#[derive(Default)]
pub struct MemoryTable {
    items: Mutex<BTreeMap<(String, String), InventoryItem>>,
    fail_reads: bool,
    fail_puts: bool,
}

impl MemoryTable {
    pub fn failing_reads() -> Self {
        Self {
            fail_reads: true,
            ..Self::default()
        }
    }

    pub fn failing_puts() -> Self {
        Self {
            fail_puts: true,
            ..Self::default()
        }
    }

    pub fn seeded(items: Vec<Value>) -> Self {
        let table = Self::default();
        for item in items {
            let item = item.as_object().cloned().expect("object");
            let key = item_key(&item).expect("key");
            table.items.lock().expect("poisoned mutex").insert(key, item);
        }
        table
    }

    pub fn snapshot(&self) -> Vec<InventoryItem> {
        self.items
            .lock()
            .expect("poisoned mutex")
            .values()
            .cloned()
            .collect()
    }
}

impl InventoryTable for MemoryTable {
    fn scan_items(&self) -> Result<Vec<InventoryItem>, String> {
        if self.fail_reads {
            return Err("simulated read failure".to_string());
        }
        Ok(self.snapshot())
    }

    fn query_store(&self, store: &str) -> Result<Vec<InventoryItem>, String> {
        if self.fail_reads {
            return Err("simulated read failure".to_string());
        }
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|item| item["Store"] == json!(store))
            .collect())
    }

    fn delete_items(&self, keys: &[(String, String)]) -> Result<(), String> {
        let mut items = self.items.lock().expect("poisoned mutex");
        for key in keys {
            items.remove(key);
        }
        Ok(())
    }

    fn put_items(&self, rows: &[InventoryItem]) -> Result<(), String> {
        if self.fail_puts {
            return Err("simulated write failure".to_string());
        }
        let mut items = self.items.lock().expect("poisoned mutex");
        for row in rows {
            items.insert(item_key(row).expect("key"), row.clone());
        }
        Ok(())
    }
}
