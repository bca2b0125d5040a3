use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::RwLock;

use crate::error::{AppError, Result};
use crate::model::{Id, MedicalRecord, Owner, OwnerSummary, Pet, PetSummary};
use crate::store::traits::{HealthStore, MedicalRecordStore, OwnerStore, PetStore, Store};

/// Store kept entirely in process memory.
///
/// Used for tests and local experiments; it mirrors the PostgreSQL store's
/// contract, including ordering, joins and not-found reporting.
#[derive(Debug, Default)]
pub struct MemoryStore {
    owners: RwLock<HashMap<Id, Owner>>,
    pets: RwLock<HashMap<Id, Pet>>,
    records: RwLock<HashMap<Id, MedicalRecord>>,
    operations: AtomicUsize,
    offline: AtomicBool,
    ping_delay: Option<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose health check waits `delay` before answering
    pub fn with_ping_delay(delay: Duration) -> Self {
        Self {
            ping_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Make `ping` fail while `offline` is set; data access is unaffected.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of store calls served so far
    pub fn operation_count(&self) -> usize {
        self.operations.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.operations.fetch_add(1, Ordering::SeqCst);
    }

    async fn with_relations(&self, mut records: Vec<MedicalRecord>) -> Vec<MedicalRecord> {
        let owners = self.owners.read().await;
        let pets = self.pets.read().await;

        for record in records.iter_mut() {
            record.pet = pets.get(&record.pet_id).map(|p| PetSummary {
                id: p.id,
                name: p.name.clone(),
                species: p.species.clone(),
                breed: p.breed.clone(),
                pet_number: p.pet_number.clone(),
            });
            record.owner = owners.get(&record.owner_id).map(|o| OwnerSummary {
                id: o.id,
                name: o.name.clone(),
                name_kana: o.name_kana.clone(),
                phone: o.phone.clone(),
            });
        }

        records.sort_by(|a, b| {
            b.visit_date
                .cmp(&a.visit_date)
                .then(b.created_at.cmp(&a.created_at))
                .then(a.id.cmp(&b.id))
        });
        records
    }

    async fn records_where(&self, keep: impl Fn(&MedicalRecord) -> bool) -> Vec<MedicalRecord> {
        let selected: Vec<MedicalRecord> = self
            .records
            .read()
            .await
            .values()
            .filter(|r| keep(r))
            .cloned()
            .collect();
        self.with_relations(selected).await
    }

    fn newest_first_pets(mut pets: Vec<Pet>) -> Vec<Pet> {
        pets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        pets
    }

    async fn ensure_unique_pet_number(&self, pet: &Pet) -> Result<()> {
        let Some(number) = &pet.pet_number else {
            return Ok(());
        };
        let pets = self.pets.read().await;
        if pets
            .values()
            .any(|p| p.id != pet.id && p.pet_number.as_ref() == Some(number))
        {
            return Err(AppError::invalid(format!("pet_number {} already exists", number)));
        }
        Ok(())
    }

    async fn ensure_unique_record_no(&self, record: &MedicalRecord) -> Result<()> {
        let records = self.records.read().await;
        if records
            .values()
            .any(|r| r.id != record.id && r.record_no == record.record_no)
        {
            return Err(AppError::invalid(format!(
                "record_no {} already exists",
                record.record_no
            )));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl OwnerStore for MemoryStore {
    async fn list_owners(&self) -> Result<Vec<Owner>> {
        self.touch();
        let mut owners: Vec<Owner> = self.owners.read().await.values().cloned().collect();
        owners.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(owners)
    }

    async fn get_owner(&self, id: &Id) -> Result<Owner> {
        self.touch();
        let mut owner = self
            .owners
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("owner", id))?;

        let pets: Vec<Pet> = self
            .pets
            .read()
            .await
            .values()
            .filter(|p| p.owner_id == *id)
            .cloned()
            .collect();
        owner.pets = Self::newest_first_pets(pets);
        Ok(owner)
    }

    async fn create_owner(&self, mut owner: Owner) -> Result<()> {
        self.touch();
        owner.pets.clear();
        self.owners.write().await.insert(owner.id, owner);
        Ok(())
    }

    async fn save_owner(&self, mut owner: Owner) -> Result<()> {
        self.touch();
        owner.pets.clear();
        self.owners.write().await.insert(owner.id, owner);
        Ok(())
    }

    async fn delete_owner(&self, id: &Id) -> Result<()> {
        self.touch();
        match self.owners.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("owner", id)),
        }
    }
}

#[async_trait::async_trait]
impl PetStore for MemoryStore {
    async fn list_pets(&self) -> Result<Vec<Pet>> {
        self.touch();
        let pets = self.pets.read().await.values().cloned().collect();
        Ok(Self::newest_first_pets(pets))
    }

    async fn list_pets_by_owner(&self, owner_id: &Id) -> Result<Vec<Pet>> {
        self.touch();
        let pets = self
            .pets
            .read()
            .await
            .values()
            .filter(|p| p.owner_id == *owner_id)
            .cloned()
            .collect();
        Ok(Self::newest_first_pets(pets))
    }

    async fn get_pet(&self, id: &Id) -> Result<Pet> {
        self.touch();
        self.pets
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("pet", id))
    }

    async fn create_pet(&self, pet: Pet) -> Result<()> {
        self.touch();
        self.ensure_unique_pet_number(&pet).await?;
        self.pets.write().await.insert(pet.id, pet);
        Ok(())
    }

    async fn save_pet(&self, pet: Pet) -> Result<()> {
        self.touch();
        self.ensure_unique_pet_number(&pet).await?;
        self.pets.write().await.insert(pet.id, pet);
        Ok(())
    }

    async fn delete_pet(&self, id: &Id) -> Result<()> {
        self.touch();
        match self.pets.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("pet", id)),
        }
    }
}

#[async_trait::async_trait]
impl MedicalRecordStore for MemoryStore {
    async fn list_medical_records(&self) -> Result<Vec<MedicalRecord>> {
        self.touch();
        Ok(self.records_where(|_| true).await)
    }

    async fn list_medical_records_by_pet(&self, pet_id: &Id) -> Result<Vec<MedicalRecord>> {
        self.touch();
        Ok(self.records_where(|r| r.pet_id == *pet_id).await)
    }

    async fn list_medical_records_by_owner(&self, owner_id: &Id) -> Result<Vec<MedicalRecord>> {
        self.touch();
        Ok(self.records_where(|r| r.owner_id == *owner_id).await)
    }

    async fn get_medical_record(&self, id: &Id) -> Result<MedicalRecord> {
        self.touch();
        self.records_where(|r| r.id == *id)
            .await
            .pop()
            .ok_or_else(|| AppError::not_found("medical record", id))
    }

    async fn create_medical_record(&self, record: MedicalRecord) -> Result<()> {
        self.touch();
        self.ensure_unique_record_no(&record).await?;
        self.records
            .write()
            .await
            .insert(record.id, record.without_relations());
        Ok(())
    }

    async fn save_medical_record(&self, record: MedicalRecord) -> Result<()> {
        self.touch();
        self.ensure_unique_record_no(&record).await?;
        self.records
            .write()
            .await
            .insert(record.id, record.without_relations());
        Ok(())
    }

    async fn delete_medical_record(&self, id: &Id) -> Result<()> {
        self.touch();
        match self.records.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(AppError::not_found("medical record", id)),
        }
    }
}

#[async_trait::async_trait]
impl HealthStore for MemoryStore {
    async fn ping(&self) -> anyhow::Result<()> {
        if let Some(delay) = self.ping_delay {
            tokio::time::sleep(delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            anyhow::bail!("memory store is offline");
        }
        Ok(())
    }
}

impl Store for MemoryStore {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{generate_id, DateParser, NewMedicalRecord, NewOwner, NewPet};

    fn owner(name: &str) -> Owner {
        NewOwner {
            name: name.to_string(),
            ..Default::default()
        }
        .into_owner()
    }

    fn pet(owner_id: Id, number: Option<&str>) -> Pet {
        NewPet {
            owner_id: owner_id.to_string(),
            name: "Tama".to_string(),
            species: "cat".to_string(),
            pet_number: number.map(str::to_string),
            ..Default::default()
        }
        .into_pet(&DateParser::default())
        .unwrap()
    }

    fn record(pet: &Pet, visit_date: &str) -> MedicalRecord {
        NewMedicalRecord {
            pet_id: pet.id.to_string(),
            owner_id: pet.owner_id.to_string(),
            visit_date: visit_date.to_string(),
            ..Default::default()
        }
        .into_record(format!("MR-{}", generate_id().simple()), &DateParser::default())
        .unwrap()
    }

    #[tokio::test]
    async fn test_offline_store_fails_ping_but_keeps_data() {
        let store = MemoryStore::new();
        let owner = owner("Ito");
        store.create_owner(owner.clone()).await.unwrap();

        store.set_offline(true);
        assert!(store.ping().await.is_err());
        assert_eq!(store.get_owner(&owner.id).await.unwrap().name, "Ito");

        store.set_offline(false);
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let store = MemoryStore::new();
        let id = generate_id();

        assert!(store.get_owner(&id).await.unwrap_err().is_not_found());
        assert!(store.get_pet(&id).await.unwrap_err().is_not_found());
        assert!(store.get_medical_record(&id).await.unwrap_err().is_not_found());
        assert!(store.delete_pet(&id).await.unwrap_err().is_not_found());
        assert!(store.delete_owner(&id).await.unwrap_err().is_not_found());
        assert!(store.delete_medical_record(&id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_owner_read_loads_pets() {
        let store = MemoryStore::new();
        let o = owner("Suzuki");
        store.create_owner(o.clone()).await.unwrap();
        store.create_pet(pet(o.id, None)).await.unwrap();
        store.create_pet(pet(generate_id(), None)).await.unwrap();

        let loaded = store.get_owner(&o.id).await.unwrap();
        assert_eq!(loaded.pets.len(), 1);
        assert!(store.list_owners().await.unwrap()[0].pets.is_empty());
    }

    #[tokio::test]
    async fn test_records_ordered_newest_visit_first_with_summaries() {
        let store = MemoryStore::new();
        let o = owner("Suzuki");
        let p = pet(o.id, Some("P-1"));
        store.create_owner(o.clone()).await.unwrap();
        store.create_pet(p.clone()).await.unwrap();

        let older = record(&p, "2026-01-01");
        let newer = record(&p, "2026-02-01");
        store.create_medical_record(older.clone()).await.unwrap();
        store.create_medical_record(newer.clone()).await.unwrap();

        let listed = store.list_medical_records_by_pet(&p.id).await.unwrap();
        assert_eq!(listed.iter().map(|r| r.id).collect::<Vec<_>>(), vec![newer.id, older.id]);
        assert_eq!(listed[0].pet.as_ref().unwrap().pet_number.as_deref(), Some("P-1"));
        assert_eq!(listed[0].owner.as_ref().unwrap().name, "Suzuki");
    }

    #[tokio::test]
    async fn test_duplicate_pet_number_is_invalid_input() {
        let store = MemoryStore::new();
        let owner_id = generate_id();
        store.create_pet(pet(owner_id, Some("P-7"))).await.unwrap();
        let err = store.create_pet(pet(owner_id, Some("P-7"))).await.unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[tokio::test]
    async fn test_owner_delete_leaves_pets_in_place() {
        let store = MemoryStore::new();
        let o = owner("Suzuki");
        store.create_owner(o.clone()).await.unwrap();
        store.create_pet(pet(o.id, None)).await.unwrap();

        store.delete_owner(&o.id).await.unwrap();
        assert_eq!(store.list_pets_by_owner(&o.id).await.unwrap().len(), 1);
    }
}
