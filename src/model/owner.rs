use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{generate_id, timestamp_now, Id, Patch, Pet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Id,
    pub name: String,
    pub name_kana: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Loaded only on single-owner reads
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pets: Vec<Pet>,
}

/// Input model for creating a new owner
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewOwner {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub name_kana: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub notes: String,
}

impl NewOwner {
    /// Convert to a full Owner with server-generated fields
    pub fn into_owner(self) -> Owner {
        let now = timestamp_now();
        Owner {
            id: generate_id(),
            name: self.name.trim().to_string(),
            name_kana: self.name_kana,
            phone: self.phone,
            email: self.email,
            address: self.address,
            notes: self.notes,
            created_at: now,
            updated_at: now,
            pets: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerUpdate {
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub name_kana: Patch<String>,
    #[serde(default)]
    pub phone: Patch<String>,
    #[serde(default)]
    pub email: Patch<String>,
    #[serde(default)]
    pub address: Patch<String>,
    #[serde(default)]
    pub notes: Patch<String>,
}

impl Owner {
    /// Apply every supplied field. The update must already be validated.
    pub fn apply_update(&mut self, update: OwnerUpdate) {
        if let Patch::Present(name) = update.name {
            self.name = name.trim().to_string();
        }
        update.name_kana.apply_to(&mut self.name_kana);
        update.phone.apply_to(&mut self.phone);
        update.email.apply_to(&mut self.email);
        update.address.apply_to(&mut self.address);
        update.notes.apply_to(&mut self.notes);
        self.updated_at = timestamp_now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_update_touches_only_present_fields() {
        let mut owner = NewOwner {
            name: "Sato Hanako".to_string(),
            phone: "03-1234-5678".to_string(),
            ..Default::default()
        }
        .into_owner();
        let before = owner.clone();

        let update: OwnerUpdate = serde_json::from_str(r#"{"email": "hanako@example.com"}"#).unwrap();
        owner.apply_update(update);

        assert_eq!(owner.email, "hanako@example.com");
        assert_eq!(owner.name, before.name);
        assert_eq!(owner.phone, before.phone);
        assert_eq!(owner.created_at, before.created_at);
        assert!(owner.updated_at >= before.updated_at);
    }

    #[test]
    fn test_pets_omitted_when_not_loaded() {
        let owner = NewOwner {
            name: "Sato".to_string(),
            ..Default::default()
        }
        .into_owner();
        let json = serde_json::to_value(&owner).unwrap();
        assert!(json.get("pets").is_none());
    }
}
