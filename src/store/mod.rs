//! Data access for the reporting entities.
//!
//! The aggregator never talks to storage directly; callers pull snapshots
//! through a [`DataStore`] and hand plain slices to the analysis functions.

pub mod json_file;

pub use json_file::JsonFileStore;

use crate::models::{Client, Month, Note, Setting, Squad, StageRecord, SystemVersion, User};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Errors surfaced by a data store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{collection} '{id}' not found")]
    NotFound { collection: &'static str, id: String },

    #[error("{collection} '{id}' already exists")]
    Duplicate { collection: &'static str, id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Every collection the dashboard persists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    pub clients: Vec<Client>,
    pub stage_records: Vec<StageRecord>,
    pub squads: Vec<Squad>,
    pub notes: Vec<Note>,
    pub settings: Vec<Setting>,
    pub system_versions: Vec<SystemVersion>,
    pub users: Vec<User>,
}

/// A persisted entity type with a string identity.
pub trait Entity: Clone {
    /// Collection name used in messages.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn collection(snapshot: &Snapshot) -> &Vec<Self>;
    fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self>;
}

macro_rules! impl_entity {
    ($ty:ty, $field:ident, $name:literal) => {
        impl Entity for $ty {
            const COLLECTION: &'static str = $name;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn collection(snapshot: &Snapshot) -> &Vec<Self> {
                &snapshot.$field
            }

            fn collection_mut(snapshot: &mut Snapshot) -> &mut Vec<Self> {
                &mut snapshot.$field
            }
        }
    };
}

impl_entity!(Client, clients, "client");
impl_entity!(StageRecord, stage_records, "stage record");
impl_entity!(Squad, squads, "squad");
impl_entity!(Note, notes, "note");
impl_entity!(Setting, settings, "setting");
impl_entity!(SystemVersion, system_versions, "system version");
impl_entity!(User, users, "user");

/// Generic list/filter/create/update/delete access per entity type.
pub trait DataStore {
    /// All entities of a type, in stored order.
    fn list<E: Entity>(&self) -> Vec<E>;

    /// Entities matching a predicate, in stored order.
    fn filter<E: Entity, P: Fn(&E) -> bool>(&self, predicate: P) -> Vec<E>;

    /// Insert a new entity. An empty id is replaced by a fresh UUID.
    fn create<E: Entity>(&mut self, entity: E) -> Result<E, StoreError>;

    /// Replace the entity stored under `id`.
    fn update<E: Entity>(&mut self, id: &str, entity: E) -> Result<E, StoreError>;

    /// Remove the entity stored under `id`.
    fn delete<E: Entity>(&mut self, id: &str) -> Result<(), StoreError>;

    /// Look up a single entity by id.
    fn get<E: Entity>(&self, id: &str) -> Option<E> {
        self.filter::<E, _>(|e| e.id() == id).into_iter().next()
    }
}

/// In-memory store over a [`Snapshot`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: Snapshot,
}

impl MemoryStore {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl DataStore for MemoryStore {
    fn list<E: Entity>(&self) -> Vec<E> {
        E::collection(&self.snapshot).clone()
    }

    fn filter<E: Entity, P: Fn(&E) -> bool>(&self, predicate: P) -> Vec<E> {
        E::collection(&self.snapshot)
            .iter()
            .filter(|e| predicate(e))
            .cloned()
            .collect()
    }

    fn create<E: Entity>(&mut self, mut entity: E) -> Result<E, StoreError> {
        if entity.id().is_empty() {
            entity.set_id(Uuid::new_v4().to_string());
        }

        let items = E::collection_mut(&mut self.snapshot);
        if items.iter().any(|e| e.id() == entity.id()) {
            return Err(StoreError::Duplicate {
                collection: E::COLLECTION,
                id: entity.id().to_string(),
            });
        }

        debug!("Created {} {}", E::COLLECTION, entity.id());
        items.push(entity.clone());
        Ok(entity)
    }

    fn update<E: Entity>(&mut self, id: &str, mut entity: E) -> Result<E, StoreError> {
        let slot = E::collection_mut(&mut self.snapshot)
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: E::COLLECTION,
                id: id.to_string(),
            })?;

        entity.set_id(id.to_string());
        *slot = entity.clone();
        debug!("Updated {} {}", E::COLLECTION, id);
        Ok(entity)
    }

    fn delete<E: Entity>(&mut self, id: &str) -> Result<(), StoreError> {
        let items = E::collection_mut(&mut self.snapshot);
        let before = items.len();
        items.retain(|e| e.id() != id);

        if items.len() == before {
            return Err(StoreError::NotFound {
                collection: E::COLLECTION,
                id: id.to_string(),
            });
        }

        debug!("Deleted {} {}", E::COLLECTION, id);
        Ok(())
    }
}

/// Save a month of stage data the way the entry form does: update the
/// record for the same client, stage and month if one exists, else create.
pub fn upsert_stage_record<S: DataStore>(
    store: &mut S,
    record: StageRecord,
) -> Result<StageRecord, StoreError> {
    let stage = record.stage();
    let month: Month = record.month;
    let existing = store
        .filter::<StageRecord, _>(|r| {
            r.client_id == record.client_id && r.stage() == stage && r.month == month
        })
        .into_iter()
        .next();

    match existing {
        Some(current) => store.update(&current.id, record),
        None => store.create(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RawStageRecord, Squad};

    fn record(id: &str, client: &str, stage: u8, month: &str, leads: f64) -> StageRecord {
        StageRecord::try_from(RawStageRecord {
            id: id.to_string(),
            client_id: client.to_string(),
            stage,
            month: month.to_string(),
            leads_whatsapp: Some(leads),
            ..Default::default()
        })
        .unwrap()
    }

    fn squad(id: &str, name: &str) -> Squad {
        Squad {
            id: id.to_string(),
            name: name.to_string(),
            client_ids: vec![],
            color: None,
            description: None,
            team_members: vec![],
            team_photo_url: None,
        }
    }

    #[test]
    fn test_create_assigns_id() {
        let mut store = MemoryStore::default();
        let created = store.create(squad("", "Alpha")).unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(store.list::<Squad>().len(), 1);
    }

    #[test]
    fn test_create_rejects_duplicate_id() {
        let mut store = MemoryStore::default();
        store.create(squad("s1", "Alpha")).unwrap();
        let err = store.create(squad("s1", "Beta")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[test]
    fn test_update_and_delete() {
        let mut store = MemoryStore::default();
        store.create(squad("s1", "Alpha")).unwrap();

        let updated = store.update("s1", squad("", "Renamed")).unwrap();
        assert_eq!(updated.id, "s1");
        assert_eq!(store.get::<Squad>("s1").map(|s| s.name), Some("Renamed".to_string()));

        store.delete::<Squad>("s1").unwrap();
        assert!(store.list::<Squad>().is_empty());
        assert!(matches!(
            store.delete::<Squad>("s1"),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_filter_by_client() {
        let mut store = MemoryStore::default();
        store.create(record("a", "c1", 2, "2024-01", 10.0)).unwrap();
        store.create(record("b", "c2", 2, "2024-01", 20.0)).unwrap();
        store.create(record("c", "c1", 3, "2024-01", 30.0)).unwrap();

        let c1 = store.filter::<StageRecord, _>(|r| r.client_id == "c1");
        assert_eq!(c1.len(), 2);
    }

    #[test]
    fn test_upsert_updates_same_month() {
        let mut store = MemoryStore::default();
        store.create(record("a", "c1", 2, "2024-01", 10.0)).unwrap();

        let saved = upsert_stage_record(&mut store, record("", "c1", 2, "2024-01", 99.0)).unwrap();
        assert_eq!(saved.id, "a");
        assert_eq!(store.list::<StageRecord>().len(), 1);
        assert_eq!(store.get::<StageRecord>("a").map(|r| r.leads()), Some(99.0));

        upsert_stage_record(&mut store, record("", "c1", 2, "2024-02", 5.0)).unwrap();
        assert_eq!(store.list::<StageRecord>().len(), 2);
    }
}
