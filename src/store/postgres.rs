use std::time::Duration;

use anyhow::{anyhow, Context};
use sqlx::{postgres::PgPoolOptions, postgres::PgRow, PgPool, Row};

use crate::config::DatabaseConfig;
use crate::error::{AppError, Result};
use crate::model::{
    Environment, Gender, Id, LiteralEnum, MedicalRecord, Owner, OwnerSummary, Pet, PetStatus,
    PetSummary, RecordStatus, VisitType,
};
use crate::store::traits::{HealthStore, MedicalRecordStore, OwnerStore, PetStore, Store};

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str, config: &DatabaseConfig) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(20))
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run database migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Unique violations describe the caller's payload; everything else is internal.
fn write_error(err: sqlx::Error, action: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("idx_pets_pet_number") => "pet_number",
                Some("idx_mr_record_no") => "record_no",
                _ => "record",
            };
            return AppError::invalid(format!("{} already exists", field));
        }
    }
    AppError::Internal(anyhow::Error::new(err).context(format!("Failed to {}", action)))
}

fn decode_literal<E: LiteralEnum>(value: &str) -> anyhow::Result<E> {
    E::parse(value).ok_or_else(|| anyhow!("unexpected {} value in database: {:?}", E::FIELD, value))
}

const OWNER_COLUMNS: &str =
    "id, name, name_kana, phone, email, address, notes, created_at, updated_at";

fn owner_from_row(row: &PgRow) -> anyhow::Result<Owner> {
    Ok(Owner {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        name_kana: row.try_get("name_kana")?,
        phone: row.try_get("phone")?,
        email: row.try_get("email")?,
        address: row.try_get("address")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        pets: Vec::new(),
    })
}

const PET_COLUMNS: &str = "id, owner_id, pet_number, name, species, breed, gender, birth_date, \
     weight, microchip_id, environment, status, insurance_name, insurance_details, last_visit, \
     notes, created_at, updated_at";

fn pet_from_row(row: &PgRow) -> anyhow::Result<Pet> {
    let gender: Option<String> = row.try_get("gender")?;
    let environment: Option<String> = row.try_get("environment")?;
    let status: String = row.try_get("status")?;

    Ok(Pet {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        pet_number: row.try_get("pet_number")?,
        name: row.try_get("name")?,
        species: row.try_get("species")?,
        breed: row.try_get("breed")?,
        gender: gender.as_deref().map(decode_literal::<Gender>).transpose()?,
        birth_date: row.try_get("birth_date")?,
        weight: row.try_get("weight")?,
        microchip_id: row.try_get("microchip_id")?,
        environment: environment
            .as_deref()
            .map(decode_literal::<Environment>)
            .transpose()?,
        status: decode_literal::<PetStatus>(&status)?,
        insurance_name: row.try_get("insurance_name")?,
        insurance_details: row.try_get("insurance_details")?,
        last_visit: row.try_get("last_visit")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

const RECORD_SELECT: &str = r#"
    SELECT mr.id, mr.record_no, mr.pet_id, mr.owner_id, mr.doctor_id, mr.visit_date,
           mr.visit_type, mr.chief_complaint, mr.subjective, mr.objective, mr.assessment,
           mr.plan, mr.surgery_notes, mr.diagnosis, mr.treatment, mr.prescription, mr.notes,
           mr.status, mr.created_at, mr.updated_at,
           p.id AS joined_pet_id, p.name AS pet_name, p.species AS pet_species,
           p.breed AS pet_breed, p.pet_number AS pet_number,
           o.id AS joined_owner_id, o.name AS owner_name, o.name_kana AS owner_name_kana,
           o.phone AS owner_phone
    FROM medical_records mr
    LEFT JOIN pets p ON p.id = mr.pet_id
    LEFT JOIN owners o ON o.id = mr.owner_id
"#;

const RECORD_ORDER: &str = "ORDER BY mr.visit_date DESC, mr.created_at DESC";

fn record_from_row(row: &PgRow) -> anyhow::Result<MedicalRecord> {
    let visit_type: String = row.try_get("visit_type")?;
    let status: String = row.try_get("status")?;

    let pet = match row.try_get::<Option<Id>, _>("joined_pet_id")? {
        Some(id) => Some(PetSummary {
            id,
            name: row.try_get("pet_name")?,
            species: row.try_get("pet_species")?,
            breed: row.try_get("pet_breed")?,
            pet_number: row.try_get("pet_number")?,
        }),
        None => None,
    };
    let owner = match row.try_get::<Option<Id>, _>("joined_owner_id")? {
        Some(id) => Some(OwnerSummary {
            id,
            name: row.try_get("owner_name")?,
            name_kana: row.try_get("owner_name_kana")?,
            phone: row.try_get("owner_phone")?,
        }),
        None => None,
    };

    Ok(MedicalRecord {
        id: row.try_get("id")?,
        record_no: row.try_get("record_no")?,
        pet_id: row.try_get("pet_id")?,
        owner_id: row.try_get("owner_id")?,
        doctor_id: row.try_get("doctor_id")?,
        visit_date: row.try_get("visit_date")?,
        visit_type: decode_literal::<VisitType>(&visit_type)?,
        chief_complaint: row.try_get("chief_complaint")?,
        subjective: row.try_get("subjective")?,
        objective: row.try_get("objective")?,
        assessment: row.try_get("assessment")?,
        plan: row.try_get("plan")?,
        surgery_notes: row.try_get("surgery_notes")?,
        diagnosis: row.try_get("diagnosis")?,
        treatment: row.try_get("treatment")?,
        prescription: row.try_get("prescription")?,
        notes: row.try_get("notes")?,
        status: decode_literal::<RecordStatus>(&status)?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
        pet,
        owner,
    })
}

fn collect<T>(rows: Vec<PgRow>, decode: fn(&PgRow) -> anyhow::Result<T>) -> Result<Vec<T>> {
    rows.iter()
        .map(|row| decode(row).map_err(AppError::from))
        .collect()
}

#[async_trait::async_trait]
impl OwnerStore for PostgresStore {
    async fn list_owners(&self) -> Result<Vec<Owner>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM owners ORDER BY created_at DESC",
            OWNER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list owners")?;

        collect(rows, owner_from_row)
    }

    async fn get_owner(&self, id: &Id) -> Result<Owner> {
        let row = sqlx::query(&format!("SELECT {} FROM owners WHERE id = $1", OWNER_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch owner")?;

        let Some(row) = row else {
            return Err(AppError::not_found("owner", id));
        };

        let mut owner = owner_from_row(&row)?;
        owner.pets = self.list_pets_by_owner(id).await?;
        Ok(owner)
    }

    async fn create_owner(&self, owner: Owner) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO owners (id, name, name_kana, phone, email, address, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(owner.id)
        .bind(&owner.name)
        .bind(&owner.name_kana)
        .bind(&owner.phone)
        .bind(&owner.email)
        .bind(&owner.address)
        .bind(&owner.notes)
        .bind(owner.created_at)
        .bind(owner.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "create owner"))?;

        Ok(())
    }

    async fn save_owner(&self, owner: Owner) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO owners (id, name, name_kana, phone, email, address, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                name_kana = EXCLUDED.name_kana,
                phone = EXCLUDED.phone,
                email = EXCLUDED.email,
                address = EXCLUDED.address,
                notes = EXCLUDED.notes,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(owner.id)
        .bind(&owner.name)
        .bind(&owner.name_kana)
        .bind(&owner.phone)
        .bind(&owner.email)
        .bind(&owner.address)
        .bind(&owner.notes)
        .bind(owner.created_at)
        .bind(owner.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| write_error(e, "save owner"))?;

        Ok(())
    }

    async fn delete_owner(&self, id: &Id) -> Result<()> {
        let result = sqlx::query("DELETE FROM owners WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete owner")?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("owner", id));
        }
        Ok(())
    }
}

const PET_UPSERT: &str = r#"
    INSERT INTO pets (id, owner_id, pet_number, name, species, breed, gender, birth_date, weight,
                      microchip_id, environment, status, insurance_name, insurance_details,
                      last_visit, notes, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
"#;

const PET_ON_CONFLICT: &str = r#"
    ON CONFLICT (id) DO UPDATE SET
        owner_id = EXCLUDED.owner_id,
        pet_number = EXCLUDED.pet_number,
        name = EXCLUDED.name,
        species = EXCLUDED.species,
        breed = EXCLUDED.breed,
        gender = EXCLUDED.gender,
        birth_date = EXCLUDED.birth_date,
        weight = EXCLUDED.weight,
        microchip_id = EXCLUDED.microchip_id,
        environment = EXCLUDED.environment,
        status = EXCLUDED.status,
        insurance_name = EXCLUDED.insurance_name,
        insurance_details = EXCLUDED.insurance_details,
        last_visit = EXCLUDED.last_visit,
        notes = EXCLUDED.notes,
        updated_at = EXCLUDED.updated_at
"#;

impl PostgresStore {
    async fn write_pet(&self, sql: &str, pet: &Pet, action: &str) -> Result<()> {
        sqlx::query(sql)
            .bind(pet.id)
            .bind(pet.owner_id)
            .bind(&pet.pet_number)
            .bind(&pet.name)
            .bind(&pet.species)
            .bind(&pet.breed)
            .bind(pet.gender.map(|g| g.as_str()))
            .bind(pet.birth_date)
            .bind(pet.weight)
            .bind(&pet.microchip_id)
            .bind(pet.environment.map(|e| e.as_str()))
            .bind(pet.status.as_str())
            .bind(&pet.insurance_name)
            .bind(&pet.insurance_details)
            .bind(pet.last_visit)
            .bind(&pet.notes)
            .bind(pet.created_at)
            .bind(pet.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, action))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PetStore for PostgresStore {
    async fn list_pets(&self) -> Result<Vec<Pet>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM pets ORDER BY created_at DESC",
            PET_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list pets")?;

        collect(rows, pet_from_row)
    }

    async fn list_pets_by_owner(&self, owner_id: &Id) -> Result<Vec<Pet>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM pets WHERE owner_id = $1 ORDER BY created_at DESC",
            PET_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list pets for owner")?;

        collect(rows, pet_from_row)
    }

    async fn get_pet(&self, id: &Id) -> Result<Pet> {
        let row = sqlx::query(&format!("SELECT {} FROM pets WHERE id = $1", PET_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .context("Failed to fetch pet")?;

        match row {
            Some(row) => Ok(pet_from_row(&row)?),
            None => Err(AppError::not_found("pet", id)),
        }
    }

    async fn create_pet(&self, pet: Pet) -> Result<()> {
        self.write_pet(PET_UPSERT, &pet, "create pet").await
    }

    async fn save_pet(&self, pet: Pet) -> Result<()> {
        let sql = format!("{}{}", PET_UPSERT, PET_ON_CONFLICT);
        self.write_pet(&sql, &pet, "save pet").await
    }

    async fn delete_pet(&self, id: &Id) -> Result<()> {
        let result = sqlx::query("DELETE FROM pets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete pet")?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("pet", id));
        }
        Ok(())
    }
}

const RECORD_INSERT: &str = r#"
    INSERT INTO medical_records (id, record_no, pet_id, owner_id, doctor_id, visit_date, visit_type,
                                 chief_complaint, subjective, objective, assessment, plan,
                                 surgery_notes, diagnosis, treatment, prescription, notes, status,
                                 created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
"#;

const RECORD_ON_CONFLICT: &str = r#"
    ON CONFLICT (id) DO UPDATE SET
        pet_id = EXCLUDED.pet_id,
        owner_id = EXCLUDED.owner_id,
        doctor_id = EXCLUDED.doctor_id,
        visit_date = EXCLUDED.visit_date,
        visit_type = EXCLUDED.visit_type,
        chief_complaint = EXCLUDED.chief_complaint,
        subjective = EXCLUDED.subjective,
        objective = EXCLUDED.objective,
        assessment = EXCLUDED.assessment,
        plan = EXCLUDED.plan,
        surgery_notes = EXCLUDED.surgery_notes,
        diagnosis = EXCLUDED.diagnosis,
        treatment = EXCLUDED.treatment,
        prescription = EXCLUDED.prescription,
        notes = EXCLUDED.notes,
        status = EXCLUDED.status,
        updated_at = EXCLUDED.updated_at
"#;

impl PostgresStore {
    async fn write_record(&self, sql: &str, record: &MedicalRecord, action: &str) -> Result<()> {
        sqlx::query(sql)
            .bind(record.id)
            .bind(&record.record_no)
            .bind(record.pet_id)
            .bind(record.owner_id)
            .bind(record.doctor_id)
            .bind(record.visit_date)
            .bind(record.visit_type.as_str())
            .bind(&record.chief_complaint)
            .bind(&record.subjective)
            .bind(&record.objective)
            .bind(&record.assessment)
            .bind(&record.plan)
            .bind(&record.surgery_notes)
            .bind(&record.diagnosis)
            .bind(&record.treatment)
            .bind(&record.prescription)
            .bind(&record.notes)
            .bind(record.status.as_str())
            .bind(record.created_at)
            .bind(record.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| write_error(e, action))?;
        Ok(())
    }

    async fn fetch_records(&self, filter: &str, bound: Option<&Id>) -> Result<Vec<MedicalRecord>> {
        let sql = format!("{} {} {}", RECORD_SELECT, filter, RECORD_ORDER);
        let mut query = sqlx::query(&sql);
        if let Some(id) = bound {
            query = query.bind(id);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("Failed to list medical records")?;

        collect(rows, record_from_row)
    }
}

#[async_trait::async_trait]
impl MedicalRecordStore for PostgresStore {
    async fn list_medical_records(&self) -> Result<Vec<MedicalRecord>> {
        self.fetch_records("", None).await
    }

    async fn list_medical_records_by_pet(&self, pet_id: &Id) -> Result<Vec<MedicalRecord>> {
        self.fetch_records("WHERE mr.pet_id = $1", Some(pet_id)).await
    }

    async fn list_medical_records_by_owner(&self, owner_id: &Id) -> Result<Vec<MedicalRecord>> {
        self.fetch_records("WHERE mr.owner_id = $1", Some(owner_id)).await
    }

    async fn get_medical_record(&self, id: &Id) -> Result<MedicalRecord> {
        self.fetch_records("WHERE mr.id = $1", Some(id))
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found("medical record", id))
    }

    async fn create_medical_record(&self, record: MedicalRecord) -> Result<()> {
        self.write_record(RECORD_INSERT, &record, "create medical record").await
    }

    async fn save_medical_record(&self, record: MedicalRecord) -> Result<()> {
        let sql = format!("{}{}", RECORD_INSERT, RECORD_ON_CONFLICT);
        self.write_record(&sql, &record, "save medical record").await
    }

    async fn delete_medical_record(&self, id: &Id) -> Result<()> {
        let result = sqlx::query("DELETE FROM medical_records WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete medical record")?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("medical record", id));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl HealthStore for PostgresStore {
    async fn ping(&self) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }
}

impl Store for PostgresStore {}
