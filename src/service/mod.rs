//! Per-resource orchestration on top of a [`Store`].
//!
//! Each operation validates and parses its input before the first store
//! call, so a rejected request never touches persistence. Updates follow
//! fetch, merge, save; concurrent updates to one entity are last-writer-wins.

pub mod medical_records;
pub mod owners;
pub mod pets;

use std::sync::Arc;

use crate::config::AppConfig;
use crate::logic::RecordNumberGenerator;
use crate::model::DateParser;
use crate::store::traits::Store;

#[derive(Debug)]
pub struct Service<S> {
    store: Arc<S>,
    dates: DateParser,
    record_numbers: RecordNumberGenerator,
}

impl<S> Clone for Service<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            dates: self.dates.clone(),
            record_numbers: self.record_numbers.clone(),
        }
    }
}

impl<S: Store> Service<S> {
    /// Service with the default accepted date formats and record prefix
    pub fn new(store: Arc<S>) -> Self {
        Self::with_parts(store, DateParser::default(), RecordNumberGenerator::default())
    }

    pub fn with_parts(
        store: Arc<S>,
        dates: DateParser,
        record_numbers: RecordNumberGenerator,
    ) -> Self {
        Self {
            store,
            dates,
            record_numbers,
        }
    }

    pub fn from_config(store: Arc<S>, config: &AppConfig) -> Self {
        Self::with_parts(
            store,
            config.date_parser(),
            RecordNumberGenerator::new(&config.records.number_prefix),
        )
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn dates(&self) -> &DateParser {
        &self.dates
    }

    /// Best-effort store reachability; never fails the caller.
    pub async fn database_reachable(&self) -> bool {
        match self.store.ping().await {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Database ping failed: {:#}", e);
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::Service;
    use crate::model::{NewMedicalRecord, NewOwner, NewPet};
    use crate::store::MemoryStore;

    pub fn service() -> Service<MemoryStore> {
        Service::new(Arc::new(MemoryStore::new()))
    }

    pub fn new_owner(name: &str) -> NewOwner {
        NewOwner {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn new_pet(owner_id: &str, name: &str) -> NewPet {
        NewPet {
            owner_id: owner_id.to_string(),
            name: name.to_string(),
            species: "dog".to_string(),
            ..Default::default()
        }
    }

    pub fn new_record(pet_id: &str, owner_id: &str, visit_date: &str) -> NewMedicalRecord {
        NewMedicalRecord {
            pet_id: pet_id.to_string(),
            owner_id: owner_id.to_string(),
            visit_date: visit_date.to_string(),
            chief_complaint: "limping".to_string(),
            ..Default::default()
        }
    }
}
