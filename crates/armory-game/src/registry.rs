//! Item definition registry
//!
//! Built explicitly and passed to whoever needs item lookups. Loaded from a TOML
//! catalog of `[[items]]` tables or assembled from records directly.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use armory_core::Name;
use serde::Deserialize;
use tracing::info;

use crate::item::{ItemId, ItemRecord, ItemSlotKind};

/// Errors that can occur while building or querying the registry
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("failed to parse item catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("I/O error reading catalog '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("item '{0}' defined twice")]
    DuplicateItem(Name),

    #[error("item id {0:?} used by both '{1}' and '{2}'")]
    DuplicateId(ItemId, Name, Name),

    #[error("unknown item '{0}'")]
    UnknownItem(Name),
}

#[derive(Deserialize)]
struct Catalog {
    #[serde(default)]
    items: Vec<ItemRecord>,
}

/// All known item definitions, keyed by name
#[derive(Debug, Clone, Default)]
pub struct ItemRegistry {
    by_name: BTreeMap<Name, ItemRecord>,
    by_id: HashMap<ItemId, Name>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from records. Names and ids must be unique.
    pub fn from_items(items: impl IntoIterator<Item = ItemRecord>) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for item in items {
            registry.insert(item)?;
        }
        Ok(registry)
    }

    /// Parse a TOML catalog
    pub fn from_toml_str(content: &str) -> Result<Self, RegistryError> {
        let catalog: Catalog = toml::from_str(content)?;
        Self::from_items(catalog.items)
    }

    /// Load a TOML catalog from disk
    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content =
            fs::read_to_string(path).map_err(|e| RegistryError::Io(path.to_path_buf(), e))?;
        let registry = Self::from_toml_str(&content)?;
        info!("Loaded {} item definitions from {:?}", registry.len(), path);
        Ok(registry)
    }

    /// Add one item definition
    pub fn insert(&mut self, item: ItemRecord) -> Result<(), RegistryError> {
        if self.by_name.contains_key(&item.name) {
            return Err(RegistryError::DuplicateItem(item.name));
        }
        if let Some(existing) = self.by_id.get(&item.id) {
            return Err(RegistryError::DuplicateId(item.id, existing.clone(), item.name));
        }
        self.by_id.insert(item.id, item.name.clone());
        self.by_name.insert(item.name.clone(), item);
        Ok(())
    }

    pub fn get(&self, name: &Name) -> Option<&ItemRecord> {
        self.by_name.get(name)
    }

    /// Like [`get`](Self::get) but an error for unknown names
    pub fn require(&self, name: &Name) -> Result<&ItemRecord, RegistryError> {
        self.get(name)
            .ok_or_else(|| RegistryError::UnknownItem(name.clone()))
    }

    pub fn get_by_id(&self, id: ItemId) -> Option<&ItemRecord> {
        self.by_id.get(&id).and_then(|name| self.by_name.get(name))
    }

    /// Items that go into the given slot kind, in name order
    pub fn items_for_slot(&self, kind: ItemSlotKind) -> Vec<&ItemRecord> {
        self.by_name
            .values()
            .filter(|item| item.slot_kind == kind)
            .collect()
    }

    /// All items in name order
    pub fn iter(&self) -> impl Iterator<Item = &ItemRecord> {
        self.by_name.values()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
