use crate::error::Result;
use crate::model::{Id, MedicalRecord, Owner, Pet};

/// Single-row reads report a missing row as `AppError::NotFound`; deletes do
/// the same when no row matched. Every other failure is `AppError::Internal`.
#[async_trait::async_trait]
pub trait OwnerStore: Send + Sync {
    async fn list_owners(&self) -> Result<Vec<Owner>>;
    /// Loads the owner's pets alongside it
    async fn get_owner(&self, id: &Id) -> Result<Owner>;
    async fn create_owner(&self, owner: Owner) -> Result<()>;
    /// Write the whole record (insert or overwrite)
    async fn save_owner(&self, owner: Owner) -> Result<()>;
    async fn delete_owner(&self, id: &Id) -> Result<()>;
}

#[async_trait::async_trait]
pub trait PetStore: Send + Sync {
    async fn list_pets(&self) -> Result<Vec<Pet>>;
    async fn list_pets_by_owner(&self, owner_id: &Id) -> Result<Vec<Pet>>;
    async fn get_pet(&self, id: &Id) -> Result<Pet>;
    async fn create_pet(&self, pet: Pet) -> Result<()>;
    async fn save_pet(&self, pet: Pet) -> Result<()>;
    async fn delete_pet(&self, id: &Id) -> Result<()>;
}

/// Record reads are ordered by visit date, then creation time, both newest
/// first, and carry the pet/owner summaries.
#[async_trait::async_trait]
pub trait MedicalRecordStore: Send + Sync {
    async fn list_medical_records(&self) -> Result<Vec<MedicalRecord>>;
    async fn list_medical_records_by_pet(&self, pet_id: &Id) -> Result<Vec<MedicalRecord>>;
    async fn list_medical_records_by_owner(&self, owner_id: &Id) -> Result<Vec<MedicalRecord>>;
    async fn get_medical_record(&self, id: &Id) -> Result<MedicalRecord>;
    async fn create_medical_record(&self, record: MedicalRecord) -> Result<()>;
    async fn save_medical_record(&self, record: MedicalRecord) -> Result<()>;
    async fn delete_medical_record(&self, id: &Id) -> Result<()>;
}

#[async_trait::async_trait]
pub trait HealthStore: Send + Sync {
    /// Cheap reachability probe
    async fn ping(&self) -> anyhow::Result<()>;
}

pub trait Store: OwnerStore + PetStore + MedicalRecordStore + HealthStore + Send + Sync {}
