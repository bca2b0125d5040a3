use crate::error::Result;
use crate::logic::{validate_new_owner, validate_owner_update};
use crate::model::{parse_id, NewOwner, Owner, OwnerUpdate, Pet};
use crate::service::Service;
use crate::store::traits::Store;

impl<S: Store> Service<S> {
    pub async fn list_owners(&self) -> Result<Vec<Owner>> {
        self.store.list_owners().await
    }

    /// Owner with its pets loaded
    pub async fn get_owner(&self, id: &str) -> Result<Owner> {
        let id = parse_id(id, "owner ID")?;
        self.store.get_owner(&id).await
    }

    pub async fn create_owner(&self, request: NewOwner) -> Result<Owner> {
        validate_new_owner(&request)?;

        let owner = request.into_owner();
        self.store.create_owner(owner.clone()).await?;
        log::info!("Created owner {}", owner.id);
        Ok(owner)
    }

    pub async fn update_owner(&self, id: &str, update: OwnerUpdate) -> Result<Owner> {
        let id = parse_id(id, "owner ID")?;
        validate_owner_update(&update)?;

        let mut owner = self.store.get_owner(&id).await?;
        owner.apply_update(update);
        owner.pets.clear();

        self.store.save_owner(owner).await?;
        log::info!("Updated owner {}", id);
        self.store.get_owner(&id).await
    }

    pub async fn delete_owner(&self, id: &str) -> Result<()> {
        let id = parse_id(id, "owner ID")?;
        self.store.delete_owner(&id).await?;
        log::info!("Deleted owner {}", id);
        Ok(())
    }

    pub async fn list_pets_by_owner(&self, owner_id: &str) -> Result<Vec<Pet>> {
        let owner_id = parse_id(owner_id, "owner ID")?;
        self.store.list_pets_by_owner(&owner_id).await
    }
}
