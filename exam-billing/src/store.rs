use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use crate::error::BillingResult;
use crate::models::{CustomMapping, StoredMapping};

/// Persistence for operator-defined exam type mappings
pub trait MappingStore {
    /// All stored mappings, ordered by original name
    fn load_all(&self) -> BillingResult<Vec<StoredMapping>>;

    /// Inserts new mappings and overwrites the category of existing ones.
    ///
    /// An existing mapping keeps its id and creation time; only its category
    /// and update time change.
    fn upsert_many(&mut self, mappings: &[CustomMapping]) -> BillingResult<()>;

    fn load_mappings(&self) -> BillingResult<Vec<CustomMapping>> {
        Ok(self.load_all()?.iter().map(StoredMapping::to_mapping).collect())
    }
}

/// Applies `mappings` onto a name-keyed map with upsert semantics.
///
/// Shared by store implementations that hold the whole catalog in memory.
pub fn merge_mappings(entries: &mut BTreeMap<String, StoredMapping>, mappings: &[CustomMapping]) {
    let now = Utc::now();
    for mapping in mappings {
        entries
            .entry(mapping.original_name.clone())
            .and_modify(|stored| {
                stored.mapped_category = mapping.mapped_category;
                stored.updated_at = now;
            })
            .or_insert_with(|| StoredMapping {
                id: Uuid::new_v4(),
                original_name: mapping.original_name.clone(),
                mapped_category: mapping.mapped_category,
                created_at: now,
                updated_at: now,
            });
    }
}

/// In-memory mapping store for tests and one-shot runs
#[derive(Debug, Default)]
pub struct InMemoryMappingStore {
    entries: BTreeMap<String, StoredMapping>,
}

impl InMemoryMappingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mappings(mappings: &[CustomMapping]) -> Self {
        let mut store = Self::new();
        merge_mappings(&mut store.entries, mappings);
        store
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MappingStore for InMemoryMappingStore {
    fn load_all(&self) -> BillingResult<Vec<StoredMapping>> {
        Ok(self.entries.values().cloned().collect())
    }

    fn upsert_many(&mut self, mappings: &[CustomMapping]) -> BillingResult<()> {
        merge_mappings(&mut self.entries, mappings);
        Ok(())
    }
}
