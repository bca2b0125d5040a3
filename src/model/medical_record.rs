use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::logic::MAX_RECORD_NO_LEN;
use crate::model::{
    generate_id, non_empty, parse_id, timestamp_now, DateParser, Id, LiteralEnum, Patch,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VisitType {
    #[default]
    FirstVisit,
    FollowUp,
}

impl LiteralEnum for VisitType {
    const FIELD: &'static str = "visit_type";
    const ALL: &'static [Self] = &[VisitType::FirstVisit, VisitType::FollowUp];

    fn as_str(&self) -> &'static str {
        match self {
            VisitType::FirstVisit => "first-visit",
            VisitType::FollowUp => "follow-up",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    #[default]
    Draft,
    Finalized,
}

impl LiteralEnum for RecordStatus {
    const FIELD: &'static str = "status";
    const ALL: &'static [Self] = &[RecordStatus::Draft, RecordStatus::Finalized];

    fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Draft => "draft",
            RecordStatus::Finalized => "finalized",
        }
    }
}

/// Pet columns joined onto a record for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PetSummary {
    pub id: Id,
    pub name: String,
    pub species: String,
    pub breed: String,
    pub pet_number: Option<String>,
}

/// Owner columns joined onto a record for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnerSummary {
    pub id: Id,
    pub name: String,
    pub name_kana: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecord {
    pub id: Id,
    pub record_no: String,
    pub pet_id: Id,
    pub owner_id: Id,
    pub doctor_id: Option<Id>,
    pub visit_date: DateTime<Utc>,
    pub visit_type: VisitType,
    pub chief_complaint: String,
    pub subjective: String,
    pub objective: String,
    pub assessment: String,
    pub plan: String,
    pub surgery_notes: String,
    pub diagnosis: String,
    pub treatment: String,
    pub prescription: String,
    pub notes: String,
    pub status: RecordStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet: Option<PetSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerSummary>,
}

impl MedicalRecord {
    /// Persisted fields only; joined summaries are dropped.
    pub fn without_relations(mut self) -> Self {
        self.pet = None;
        self.owner = None;
        self
    }
}

/// Input model for writing a new chart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMedicalRecord {
    #[serde(default)]
    pub pet_id: String,
    #[serde(default)]
    pub owner_id: String,
    #[serde(default)]
    pub doctor_id: Option<String>,
    #[serde(default)]
    pub visit_date: String,
    #[serde(default)]
    pub visit_type: Option<String>,
    #[serde(default)]
    pub chief_complaint: String,
    #[serde(default)]
    pub subjective: String,
    #[serde(default)]
    pub objective: String,
    #[serde(default)]
    pub assessment: String,
    #[serde(default)]
    pub plan: String,
    #[serde(default)]
    pub surgery_notes: String,
    #[serde(default)]
    pub diagnosis: String,
    #[serde(default)]
    pub treatment: String,
    #[serde(default)]
    pub prescription: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl NewMedicalRecord {
    pub fn normalized(mut self) -> Self {
        self.doctor_id = non_empty(self.doctor_id);
        self.visit_type = non_empty(self.visit_type);
        self.status = non_empty(self.status);
        self
    }

    /// Convert to a full record. Visit type falls back to first-visit and
    /// status to draft when not supplied.
    pub fn into_record(self, record_no: String, dates: &DateParser) -> Result<MedicalRecord> {
        let now = timestamp_now();
        Ok(MedicalRecord {
            id: generate_id(),
            record_no,
            pet_id: parse_id(&self.pet_id, "pet ID")?,
            owner_id: parse_id(&self.owner_id, "owner ID")?,
            doctor_id: self
                .doctor_id
                .as_deref()
                .map(|v| parse_id(v, "doctor ID"))
                .transpose()?,
            visit_date: dates.parse(&self.visit_date, "visit_date")?,
            visit_type: self
                .visit_type
                .as_deref()
                .map(VisitType::parse_or_invalid)
                .transpose()?
                .unwrap_or_default(),
            chief_complaint: self.chief_complaint,
            subjective: self.subjective,
            objective: self.objective,
            assessment: self.assessment,
            plan: self.plan,
            surgery_notes: self.surgery_notes,
            diagnosis: self.diagnosis,
            treatment: self.treatment,
            prescription: self.prescription,
            notes: self.notes,
            status: self
                .status
                .as_deref()
                .map(RecordStatus::parse_or_invalid)
                .transpose()?
                .unwrap_or_default(),
            created_at: now,
            updated_at: now,
            pet: None,
            owner: None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecordUpdate {
    #[serde(default)]
    pub pet_id: Patch<String>,
    #[serde(default)]
    pub owner_id: Patch<String>,
    #[serde(default)]
    pub doctor_id: Patch<Option<String>>,
    #[serde(default)]
    pub visit_date: Patch<String>,
    #[serde(default)]
    pub visit_type: Patch<String>,
    #[serde(default)]
    pub chief_complaint: Patch<String>,
    #[serde(default)]
    pub subjective: Patch<String>,
    #[serde(default)]
    pub objective: Patch<String>,
    #[serde(default)]
    pub assessment: Patch<String>,
    #[serde(default)]
    pub plan: Patch<String>,
    #[serde(default)]
    pub surgery_notes: Patch<String>,
    #[serde(default)]
    pub diagnosis: Patch<String>,
    #[serde(default)]
    pub treatment: Patch<String>,
    #[serde(default)]
    pub prescription: Patch<String>,
    #[serde(default)]
    pub notes: Patch<String>,
    #[serde(default)]
    pub status: Patch<String>,
}

impl MedicalRecord {
    /// Merge a validated update. Conversions run before any field is written.
    pub fn apply_update(&mut self, update: MedicalRecordUpdate, dates: &DateParser) -> Result<()> {
        let pet_id = update.pet_id.try_map(|v| parse_id(&v, "pet ID"))?;
        let owner_id = update.owner_id.try_map(|v| parse_id(&v, "owner ID"))?;
        let doctor_id = update
            .doctor_id
            .try_map(|v| v.as_deref().map(|d| parse_id(d, "doctor ID")).transpose())?;
        let visit_date = update.visit_date.try_map(|v| dates.parse(&v, "visit_date"))?;
        let visit_type = update.visit_type.try_map(|v| VisitType::parse_or_invalid(&v))?;
        let status = update.status.try_map(|v| RecordStatus::parse_or_invalid(&v))?;

        if let Patch::Present(id) = pet_id {
            if id != self.pet_id {
                self.pet = None;
            }
            self.pet_id = id;
        }
        if let Patch::Present(id) = owner_id {
            if id != self.owner_id {
                self.owner = None;
            }
            self.owner_id = id;
        }
        doctor_id.apply_to(&mut self.doctor_id);
        visit_date.apply_to(&mut self.visit_date);
        visit_type.apply_to(&mut self.visit_type);
        update.chief_complaint.apply_to(&mut self.chief_complaint);
        update.subjective.apply_to(&mut self.subjective);
        update.objective.apply_to(&mut self.objective);
        update.assessment.apply_to(&mut self.assessment);
        update.plan.apply_to(&mut self.plan);
        update.surgery_notes.apply_to(&mut self.surgery_notes);
        update.diagnosis.apply_to(&mut self.diagnosis);
        update.treatment.apply_to(&mut self.treatment);
        update.prescription.apply_to(&mut self.prescription);
        update.notes.apply_to(&mut self.notes);
        status.apply_to(&mut self.status);

        self.updated_at = timestamp_now();
        Ok(())
    }
}

/// One page of charts plus navigation metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicalRecordPage {
    pub records: Vec<MedicalRecord>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Raw listing filters as received from the query string
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MedicalRecordQuery {
    pub pet_id: Option<String>,
    pub owner_id: Option<String>,
    pub visit_type: Option<String>,
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl MedicalRecordQuery {
    pub fn is_empty(&self) -> bool {
        [
            &self.pet_id,
            &self.owner_id,
            &self.visit_type,
            &self.status,
            &self.date_from,
            &self.date_to,
        ]
        .iter()
        .all(|v| v.as_deref().map_or(true, |s| s.trim().is_empty()))
    }
}

pub(crate) fn ensure_record_no(record_no: &str) -> Result<()> {
    if record_no.is_empty() || record_no.chars().any(char::is_whitespace) {
        return Err(AppError::Internal(anyhow::anyhow!(
            "generated record number {:?} is not a single token",
            record_no
        )));
    }
    if record_no.chars().count() > MAX_RECORD_NO_LEN {
        return Err(AppError::Internal(anyhow::anyhow!(
            "generated record number {:?} exceeds {} characters",
            record_no,
            MAX_RECORD_NO_LEN
        )));
    }
    Ok(())
}
