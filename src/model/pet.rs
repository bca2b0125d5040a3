use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::dates::parse_birth_date;
use crate::model::{
    generate_id, non_empty, parse_id, timestamp_now, DateParser, Id, LiteralEnum, Patch,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl LiteralEnum for Gender {
    const FIELD: &'static str = "gender";
    const ALL: &'static [Self] = &[Gender::Male, Gender::Female, Gender::Unknown];

    fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Indoor,
    Outdoor,
    Mixed,
}

impl LiteralEnum for Environment {
    const FIELD: &'static str = "environment";
    const ALL: &'static [Self] = &[Environment::Indoor, Environment::Outdoor, Environment::Mixed];

    fn as_str(&self) -> &'static str {
        match self {
            Environment::Indoor => "indoor",
            Environment::Outdoor => "outdoor",
            Environment::Mixed => "mixed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PetStatus {
    #[default]
    Alive,
    Deceased,
}

impl LiteralEnum for PetStatus {
    const FIELD: &'static str = "status";
    const ALL: &'static [Self] = &[PetStatus::Alive, PetStatus::Deceased];

    fn as_str(&self) -> &'static str {
        match self {
            PetStatus::Alive => "alive",
            PetStatus::Deceased => "deceased",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pet {
    pub id: Id,
    pub owner_id: Id,
    pub pet_number: Option<String>,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub gender: Option<Gender>,
    pub birth_date: Option<NaiveDate>,
    pub weight: Option<f64>,
    pub microchip_id: String,
    pub environment: Option<Environment>,
    pub status: PetStatus,
    pub insurance_name: String,
    pub insurance_details: String,
    pub last_visit: Option<NaiveDate>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input model for registering a pet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewPet {
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub pet_number: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub breed: String,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub microchip_id: String,
    #[serde(default)]
    pub environment: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub insurance_name: String,
    #[serde(default)]
    pub insurance_details: String,
    #[serde(default)]
    pub last_visit: Option<String>,
    #[serde(default)]
    pub notes: String,
}

impl NewPet {
    /// Empty optional strings count as not supplied on create.
    pub fn normalized(mut self) -> Self {
        self.pet_number = non_empty(self.pet_number);
        self.gender = non_empty(self.gender);
        self.birth_date = non_empty(self.birth_date);
        self.environment = non_empty(self.environment);
        self.status = non_empty(self.status);
        self.last_visit = non_empty(self.last_visit);
        self
    }

    /// Convert to a full Pet with server-generated fields.
    /// Expects a normalized, validated request.
    pub fn into_pet(self, dates: &DateParser) -> Result<Pet> {
        let now = timestamp_now();
        Ok(Pet {
            id: generate_id(),
            owner_id: parse_id(&self.owner_id, "owner ID")?,
            pet_number: self.pet_number,
            name: self.name.trim().to_string(),
            species: self.species.trim().to_string(),
            breed: self.breed,
            gender: self.gender.as_deref().map(Gender::parse_or_invalid).transpose()?,
            birth_date: self.birth_date.as_deref().map(parse_birth_date).transpose()?,
            weight: self.weight,
            microchip_id: self.microchip_id,
            environment: self
                .environment
                .as_deref()
                .map(Environment::parse_or_invalid)
                .transpose()?,
            status: self
                .status
                .as_deref()
                .map(PetStatus::parse_or_invalid)
                .transpose()?
                .unwrap_or_default(),
            insurance_name: self.insurance_name,
            insurance_details: self.insurance_details,
            last_visit: self
                .last_visit
                .as_deref()
                .map(|v| dates.parse_date(v, "last_visit"))
                .transpose()?,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PetUpdate {
    #[serde(default)]
    pub owner_id: Patch<String>,
    #[serde(default)]
    pub pet_number: Patch<Option<String>>,
    #[serde(default)]
    pub name: Patch<String>,
    #[serde(default)]
    pub species: Patch<String>,
    #[serde(default)]
    pub breed: Patch<String>,
    #[serde(default)]
    pub gender: Patch<Option<String>>,
    #[serde(default)]
    pub birth_date: Patch<Option<String>>,
    #[serde(default)]
    pub weight: Patch<Option<f64>>,
    #[serde(default)]
    pub microchip_id: Patch<String>,
    #[serde(default)]
    pub environment: Patch<Option<String>>,
    #[serde(default)]
    pub status: Patch<String>,
    #[serde(default)]
    pub insurance_name: Patch<String>,
    #[serde(default)]
    pub insurance_details: Patch<String>,
    #[serde(default)]
    pub last_visit: Patch<Option<String>>,
    #[serde(default)]
    pub notes: Patch<String>,
}

impl Pet {
    /// Merge a validated update into this pet.
    ///
    /// Every supplied value is converted before anything is written, so a
    /// conversion failure leaves the pet untouched.
    pub fn apply_update(&mut self, update: PetUpdate, dates: &DateParser) -> Result<()> {
        let owner_id = update.owner_id.try_map(|v| parse_id(&v, "owner ID"))?;
        let gender = update
            .gender
            .try_map(|v| v.as_deref().map(Gender::parse_or_invalid).transpose())?;
        let birth_date = update
            .birth_date
            .try_map(|v| v.as_deref().map(parse_birth_date).transpose())?;
        let environment = update
            .environment
            .try_map(|v| v.as_deref().map(Environment::parse_or_invalid).transpose())?;
        let status = update.status.try_map(|v| PetStatus::parse_or_invalid(&v))?;
        let last_visit = update.last_visit.try_map(|v| {
            v.as_deref()
                .map(|d| dates.parse_date(d, "last_visit"))
                .transpose()
        })?;

        owner_id.apply_to(&mut self.owner_id);
        if let Patch::Present(number) = update.pet_number {
            // Blank clears, so cleared pets never share a "" number.
            self.pet_number = non_empty(number);
        }
        if let Patch::Present(name) = update.name {
            self.name = name.trim().to_string();
        }
        if let Patch::Present(species) = update.species {
            self.species = species.trim().to_string();
        }
        update.breed.apply_to(&mut self.breed);
        gender.apply_to(&mut self.gender);
        birth_date.apply_to(&mut self.birth_date);
        update.weight.apply_to(&mut self.weight);
        update.microchip_id.apply_to(&mut self.microchip_id);
        environment.apply_to(&mut self.environment);
        status.apply_to(&mut self.status);
        update.insurance_name.apply_to(&mut self.insurance_name);
        update.insurance_details.apply_to(&mut self.insurance_details);
        last_visit.apply_to(&mut self.last_visit);
        update.notes.apply_to(&mut self.notes);

        self.updated_at = timestamp_now();
        Ok(())
    }
}
