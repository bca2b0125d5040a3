use crate::error::Result;
use crate::logic::{validate_new_pet, validate_pet_update};
use crate::model::{parse_id, NewPet, Pet, PetUpdate};
use crate::service::Service;
use crate::store::traits::Store;

impl<S: Store> Service<S> {
    pub async fn list_pets(&self) -> Result<Vec<Pet>> {
        self.store.list_pets().await
    }

    pub async fn get_pet(&self, id: &str) -> Result<Pet> {
        let id = parse_id(id, "pet ID")?;
        self.store.get_pet(&id).await
    }

    pub async fn create_pet(&self, request: NewPet) -> Result<Pet> {
        let request = request.normalized();
        validate_new_pet(&request, &self.dates)?;

        let pet = request.into_pet(&self.dates)?;
        self.store.create_pet(pet.clone()).await?;
        log::info!("Created pet {} for owner {}", pet.id, pet.owner_id);
        Ok(pet)
    }

    pub async fn update_pet(&self, id: &str, update: PetUpdate) -> Result<Pet> {
        let id = parse_id(id, "pet ID")?;
        validate_pet_update(&update, &self.dates)?;

        let mut pet = self.store.get_pet(&id).await?;
        pet.apply_update(update, &self.dates)?;
        self.store.save_pet(pet).await?;
        log::info!("Updated pet {}", id);
        self.store.get_pet(&id).await
    }

    pub async fn delete_pet(&self, id: &str) -> Result<()> {
        let id = parse_id(id, "pet ID")?;
        self.store.delete_pet(&id).await?;
        log::info!("Deleted pet {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::{generate_id, Gender, Patch, PetStatus};
    use crate::service::test_support::*;

    use super::*;

    #[tokio::test]
    async fn test_missing_required_fields_never_reach_store() {
        let service = service();
        let cases = [
            NewPet {
                name: String::new(),
                ..new_pet(&generate_id().to_string(), "x")
            },
            NewPet {
                species: String::new(),
                ..new_pet(&generate_id().to_string(), "Pochi")
            },
            new_pet("", "Pochi"),
        ];

        for request in cases {
            let err = service.create_pet(request).await.unwrap_err();
            assert!(err.is_invalid_input());
        }
        assert_eq!(service.store().operation_count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_gender_lists_allowed_values() {
        let service = service();
        let request = NewPet {
            gender: Some("unknown-value".to_string()),
            ..new_pet(&generate_id().to_string(), "Pochi")
        };

        let err = service.create_pet(request).await.unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err
            .to_string()
            .contains("gender must be one of 'male', 'female', 'unknown'"));
    }

    #[tokio::test]
    async fn test_create_applies_defaults_and_ignores_blank_optionals() {
        let service = service();
        let request = NewPet {
            gender: Some(String::new()),
            birth_date: Some(String::new()),
            ..new_pet(&generate_id().to_string(), "Pochi")
        };

        let pet = service.create_pet(request).await.unwrap();
        assert!(!pet.id.is_nil());
        assert_eq!(pet.status, PetStatus::Alive);
        assert_eq!(pet.gender, None);
        assert_eq!(pet.birth_date, None);
    }

    #[tokio::test]
    async fn test_update_can_clear_nullable_fields() {
        let service = service();
        let request = NewPet {
            gender: Some("female".to_string()),
            weight: Some(4.5),
            ..new_pet(&generate_id().to_string(), "Tama")
        };
        let pet = service.create_pet(request).await.unwrap();
        assert_eq!(pet.gender, Some(Gender::Female));

        let update: PetUpdate =
            serde_json::from_str(r#"{"weight": null, "notes": "calm"}"#).unwrap();
        let updated = service.update_pet(&pet.id.to_string(), update).await.unwrap();

        assert_eq!(updated.weight, None);
        assert_eq!(updated.notes, "calm");
        assert_eq!(updated.gender, Some(Gender::Female));
        assert_eq!(service.get_pet(&pet.id.to_string()).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_invalid_update_leaves_pet_untouched() {
        let service = service();
        let pet = service
            .create_pet(new_pet(&generate_id().to_string(), "Pochi"))
            .await
            .unwrap();
        let before = service.store().operation_count();

        let update = PetUpdate {
            name: Patch::Present(String::new()),
            ..Default::default()
        };
        let err = service
            .update_pet(&pet.id.to_string(), update)
            .await
            .unwrap_err();

        assert!(err.is_invalid_input());
        assert_eq!(service.store().operation_count(), before);
        assert_eq!(service.get_pet(&pet.id.to_string()).await.unwrap(), pet);
    }

    #[tokio::test]
    async fn test_clearing_pet_numbers_on_two_pets() {
        let service = service();
        let owner_id = generate_id().to_string();
        let mut ids = Vec::new();
        for (name, number) in [("Pochi", "P-1"), ("Hachi", "P-2")] {
            let request = NewPet {
                pet_number: Some(number.to_string()),
                ..new_pet(&owner_id, name)
            };
            ids.push(service.create_pet(request).await.unwrap().id.to_string());
        }

        for id in &ids {
            let clear: PetUpdate = serde_json::from_str(r#"{"pet_number": ""}"#).unwrap();
            let updated = service.update_pet(id, clear).await.unwrap();
            assert_eq!(updated.pet_number, None);
        }

        let reuse = NewPet {
            pet_number: Some("P-1".to_string()),
            ..new_pet(&owner_id, "Kuro")
        };
        assert!(service.create_pet(reuse).await.is_ok());
    }

    #[tokio::test]
    async fn test_update_response_matches_stored_pet() {
        let service = service();
        let pet = service
            .create_pet(new_pet(&generate_id().to_string(), "Pochi"))
            .await
            .unwrap();
        let id = pet.id.to_string();
        assert_eq!(pet, service.get_pet(&id).await.unwrap());

        let update: PetUpdate = serde_json::from_str(r#"{"notes": "shy"}"#).unwrap();
        let updated = service.update_pet(&id, update).await.unwrap();

        assert_eq!(updated, service.get_pet(&id).await.unwrap());
        assert_eq!(updated.created_at.timestamp_subsec_nanos() % 1_000, 0);
        assert_eq!(updated.updated_at.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[tokio::test]
    async fn test_delete_unknown_pet_is_not_found() {
        let service = service();
        let err = service
            .delete_pet(&generate_id().to_string())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(service.delete_pet("42").await.unwrap_err().is_invalid_input());
    }

    #[tokio::test]
    async fn test_concurrent_updates_last_writer_wins() {
        let service = service();
        let pet = service
            .create_pet(new_pet(&generate_id().to_string(), "Pochi"))
            .await
            .unwrap();
        let id = pet.id.to_string();

        let rename = |name: &str| PetUpdate {
            name: Patch::Present(name.to_string()),
            ..Default::default()
        };
        let (a, b) = tokio::join!(
            service.update_pet(&id, rename("Hachi")),
            service.update_pet(&id, rename("Kuro")),
        );
        assert!(a.is_ok());
        assert!(b.is_ok());

        let stored = service.get_pet(&id).await.unwrap();
        assert!(stored.name == "Hachi" || stored.name == "Kuro");
    }
}
