//! Request payload checks.
//!
//! Every entry point collects all violations of a request and reports them
//! together as one `InvalidInput` whose message joins them with `"; "`.
//! Nothing here touches storage.

use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::model::dates::parse_birth_date;
use crate::model::{
    DateParser, Environment, Gender, LiteralEnum, MedicalRecordUpdate, NewMedicalRecord,
    NewOwner, NewPet, OwnerUpdate, Patch, PetStatus, PetUpdate, RecordStatus, VisitType,
};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email pattern")
});

static PHONE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9+\-\s()]+$").expect("valid phone pattern"));

pub const NAME_MAX: usize = 100;
pub const SPECIES_MAX: usize = 50;
pub const PHONE_MAX: usize = 20;
pub const EMAIL_MAX: usize = 255;
pub const ADDRESS_MAX: usize = 500;
pub const PET_NUMBER_MAX: usize = 20;
pub const MICROCHIP_MAX: usize = 50;
pub const SHORT_TEXT_MAX: usize = 1000;
pub const LONG_TEXT_MAX: usize = 2000;
pub const WEIGHT_LIMIT: f64 = 1000.0;

/// Accumulates violation messages for a single request.
#[derive(Debug, Default)]
pub struct Violations {
    messages: Vec<String>,
}

impl Violations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Non-blank and within `max` characters.
    pub fn required(&mut self, field: &str, value: &str, max: usize) {
        if value.trim().is_empty() {
            self.push(format!("{} is required", field));
        } else {
            self.max_len(field, value, max);
        }
    }

    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        if value.chars().count() > max {
            self.push(format!("{} must be at most {} characters", field, max));
        }
    }

    pub fn literal<E: LiteralEnum>(&mut self, value: &str) {
        if E::parse(value).is_none() {
            self.push(E::mismatch_message());
        }
    }

    pub fn uuid(&mut self, label: &str, value: &str) {
        if Uuid::parse_str(value.trim()).is_err() {
            self.push(format!("invalid {} format", label));
        }
    }

    /// Required foreign key: present and UUID-shaped.
    pub fn required_uuid(&mut self, field: &str, label: &str, value: &str) {
        if value.trim().is_empty() {
            self.push(format!("{} is required", field));
        } else {
            self.uuid(label, value);
        }
    }

    pub fn date(&mut self, dates: &DateParser, field: &str, value: &str) {
        if dates.try_parse(value).is_none() {
            self.push(dates.format_message(field));
        }
    }

    pub fn birth_date(&mut self, value: &str) {
        if let Err(err) = parse_birth_date(value) {
            self.push(err.to_string());
        }
    }

    pub fn weight(&mut self, value: f64) {
        if !value.is_finite() || value < 0.0 {
            self.push("weight cannot be negative");
        } else if value >= WEIGHT_LIMIT {
            self.push(format!("weight must be less than {}", WEIGHT_LIMIT));
        }
    }

    pub fn phone(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        self.max_len("phone", value, PHONE_MAX);
        if !PHONE_PATTERN.is_match(value) {
            self.push("invalid phone number format");
        }
    }

    pub fn email(&mut self, value: &str) {
        if value.is_empty() {
            return;
        }
        self.max_len("email", value, EMAIL_MAX);
        if !EMAIL_PATTERN.is_match(value) {
            self.push("invalid email format");
        }
    }

    pub fn into_result(self) -> Result<()> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidInput(format!(
                "validation failed: {}",
                self.messages.join("; ")
            )))
        }
    }
}

fn present<T>(patch: &Patch<T>) -> Option<&T> {
    match patch {
        Patch::Present(v) => Some(v),
        Patch::Absent => None,
    }
}

/// Present-and-non-null value of a nullable update field.
fn present_value<T>(patch: &Patch<Option<T>>) -> Option<&T> {
    present(patch).and_then(Option::as_ref)
}

pub fn validate_new_owner(req: &NewOwner) -> Result<()> {
    let mut v = Violations::new();
    v.required("name", &req.name, NAME_MAX);
    v.max_len("name_kana", &req.name_kana, NAME_MAX);
    v.phone(&req.phone);
    v.email(&req.email);
    v.max_len("address", &req.address, ADDRESS_MAX);
    v.max_len("notes", &req.notes, LONG_TEXT_MAX);
    v.into_result()
}

pub fn validate_owner_update(req: &OwnerUpdate) -> Result<()> {
    let mut v = Violations::new();
    if let Some(name) = present(&req.name) {
        v.required("name", name, NAME_MAX);
    }
    if let Some(kana) = present(&req.name_kana) {
        v.max_len("name_kana", kana, NAME_MAX);
    }
    if let Some(phone) = present(&req.phone) {
        v.phone(phone);
    }
    if let Some(email) = present(&req.email) {
        v.email(email);
    }
    if let Some(address) = present(&req.address) {
        v.max_len("address", address, ADDRESS_MAX);
    }
    if let Some(notes) = present(&req.notes) {
        v.max_len("notes", notes, LONG_TEXT_MAX);
    }
    v.into_result()
}

/// Expects `req` to have gone through `NewPet::normalized`.
pub fn validate_new_pet(req: &NewPet, dates: &DateParser) -> Result<()> {
    let mut v = Violations::new();
    v.required_uuid("owner_id", "owner ID", &req.owner_id);
    v.required("name", &req.name, NAME_MAX);
    v.required("species", &req.species, SPECIES_MAX);
    v.max_len("breed", &req.breed, NAME_MAX);
    if let Some(number) = &req.pet_number {
        v.max_len("pet_number", number, PET_NUMBER_MAX);
    }
    if let Some(gender) = &req.gender {
        v.literal::<Gender>(gender);
    }
    if let Some(birth_date) = &req.birth_date {
        v.birth_date(birth_date);
    }
    if let Some(weight) = req.weight {
        v.weight(weight);
    }
    v.max_len("microchip_id", &req.microchip_id, MICROCHIP_MAX);
    if let Some(environment) = &req.environment {
        v.literal::<Environment>(environment);
    }
    if let Some(status) = &req.status {
        v.literal::<PetStatus>(status);
    }
    v.max_len("insurance_name", &req.insurance_name, NAME_MAX);
    v.max_len("insurance_details", &req.insurance_details, LONG_TEXT_MAX);
    if let Some(last_visit) = &req.last_visit {
        v.date(dates, "last_visit", last_visit);
    }
    v.max_len("notes", &req.notes, LONG_TEXT_MAX);
    v.into_result()
}

pub fn validate_pet_update(req: &PetUpdate, dates: &DateParser) -> Result<()> {
    let mut v = Violations::new();
    if let Some(owner_id) = present(&req.owner_id) {
        v.required_uuid("owner_id", "owner ID", owner_id);
    }
    if let Some(number) = present_value(&req.pet_number) {
        v.max_len("pet_number", number, PET_NUMBER_MAX);
    }
    if let Some(name) = present(&req.name) {
        v.required("name", name, NAME_MAX);
    }
    if let Some(species) = present(&req.species) {
        v.required("species", species, SPECIES_MAX);
    }
    if let Some(breed) = present(&req.breed) {
        v.max_len("breed", breed, NAME_MAX);
    }
    if let Some(gender) = present_value(&req.gender) {
        v.literal::<Gender>(gender);
    }
    if let Some(birth_date) = present_value(&req.birth_date) {
        v.birth_date(birth_date);
    }
    if let Some(weight) = present_value(&req.weight) {
        v.weight(*weight);
    }
    if let Some(chip) = present(&req.microchip_id) {
        v.max_len("microchip_id", chip, MICROCHIP_MAX);
    }
    if let Some(environment) = present_value(&req.environment) {
        v.literal::<Environment>(environment);
    }
    if let Some(status) = present(&req.status) {
        v.literal::<PetStatus>(status);
    }
    if let Some(name) = present(&req.insurance_name) {
        v.max_len("insurance_name", name, NAME_MAX);
    }
    if let Some(details) = present(&req.insurance_details) {
        v.max_len("insurance_details", details, LONG_TEXT_MAX);
    }
    if let Some(last_visit) = present_value(&req.last_visit) {
        v.date(dates, "last_visit", last_visit);
    }
    if let Some(notes) = present(&req.notes) {
        v.max_len("notes", notes, LONG_TEXT_MAX);
    }
    v.into_result()
}

struct ClinicalText<'a> {
    chief_complaint: Option<&'a String>,
    subjective: Option<&'a String>,
    objective: Option<&'a String>,
    assessment: Option<&'a String>,
    plan: Option<&'a String>,
    surgery_notes: Option<&'a String>,
    diagnosis: Option<&'a String>,
    treatment: Option<&'a String>,
    prescription: Option<&'a String>,
    notes: Option<&'a String>,
}

fn check_clinical_text(v: &mut Violations, text: ClinicalText<'_>) {
    let limits = [
        ("chief_complaint", text.chief_complaint, SHORT_TEXT_MAX),
        ("subjective", text.subjective, LONG_TEXT_MAX),
        ("objective", text.objective, LONG_TEXT_MAX),
        ("assessment", text.assessment, LONG_TEXT_MAX),
        ("plan", text.plan, LONG_TEXT_MAX),
        ("surgery_notes", text.surgery_notes, LONG_TEXT_MAX),
        ("diagnosis", text.diagnosis, SHORT_TEXT_MAX),
        ("treatment", text.treatment, LONG_TEXT_MAX),
        ("prescription", text.prescription, LONG_TEXT_MAX),
        ("notes", text.notes, LONG_TEXT_MAX),
    ];
    for (field, value, max) in limits {
        if let Some(value) = value {
            v.max_len(field, value, max);
        }
    }
}

/// Expects `req` to have gone through `NewMedicalRecord::normalized`.
pub fn validate_new_medical_record(req: &NewMedicalRecord, dates: &DateParser) -> Result<()> {
    let mut v = Violations::new();
    v.required_uuid("pet_id", "pet ID", &req.pet_id);
    v.required_uuid("owner_id", "owner ID", &req.owner_id);
    if let Some(doctor_id) = &req.doctor_id {
        v.uuid("doctor ID", doctor_id);
    }
    if req.visit_date.trim().is_empty() {
        v.push("visit_date is required");
    } else {
        v.date(dates, "visit_date", &req.visit_date);
    }
    if let Some(visit_type) = &req.visit_type {
        v.literal::<VisitType>(visit_type);
    }
    if let Some(status) = &req.status {
        v.literal::<RecordStatus>(status);
    }
    check_clinical_text(
        &mut v,
        ClinicalText {
            chief_complaint: Some(&req.chief_complaint),
            subjective: Some(&req.subjective),
            objective: Some(&req.objective),
            assessment: Some(&req.assessment),
            plan: Some(&req.plan),
            surgery_notes: Some(&req.surgery_notes),
            diagnosis: Some(&req.diagnosis),
            treatment: Some(&req.treatment),
            prescription: Some(&req.prescription),
            notes: Some(&req.notes),
        },
    );
    v.into_result()
}

pub fn validate_medical_record_update(req: &MedicalRecordUpdate, dates: &DateParser) -> Result<()> {
    let mut v = Violations::new();
    if let Some(pet_id) = present(&req.pet_id) {
        v.required_uuid("pet_id", "pet ID", pet_id);
    }
    if let Some(owner_id) = present(&req.owner_id) {
        v.required_uuid("owner_id", "owner ID", owner_id);
    }
    if let Some(doctor_id) = present_value(&req.doctor_id) {
        v.uuid("doctor ID", doctor_id);
    }
    if let Some(visit_date) = present(&req.visit_date) {
        if visit_date.trim().is_empty() {
            v.push("visit_date is required");
        } else {
            v.date(dates, "visit_date", visit_date);
        }
    }
    if let Some(visit_type) = present(&req.visit_type) {
        v.literal::<VisitType>(visit_type);
    }
    if let Some(status) = present(&req.status) {
        v.literal::<RecordStatus>(status);
    }
    check_clinical_text(
        &mut v,
        ClinicalText {
            chief_complaint: present(&req.chief_complaint),
            subjective: present(&req.subjective),
            objective: present(&req.objective),
            assessment: present(&req.assessment),
            plan: present(&req.plan),
            surgery_notes: present(&req.surgery_notes),
            diagnosis: present(&req.diagnosis),
            treatment: present(&req.treatment),
            prescription: present(&req.prescription),
            notes: present(&req.notes),
        },
    );
    v.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::generate_id;

    fn message(result: Result<()>) -> String {
        match result {
            Err(AppError::InvalidInput(msg)) => msg,
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_owner_requires_name() {
        let msg = message(validate_new_owner(&NewOwner::default()));
        assert_eq!(msg, "validation failed: name is required");
    }

    #[test]
    fn test_owner_collects_every_violation() {
        let req = NewOwner {
            name: "x".repeat(101),
            phone: "call me".to_string(),
            email: "nope".to_string(),
            ..Default::default()
        };
        let msg = message(validate_new_owner(&req));
        assert!(msg.contains("name must be at most 100 characters"));
        assert!(msg.contains("invalid phone number format"));
        assert!(msg.contains("invalid email format"));
        assert_eq!(msg.matches("; ").count(), 2);
    }

    #[test]
    fn test_owner_accepts_japanese_name_by_characters() {
        let req = NewOwner {
            name: "山".repeat(100),
            phone: "+81 (3) 1234-5678".to_string(),
            email: "yamada@example.co.jp".to_string(),
            ..Default::default()
        };
        assert!(validate_new_owner(&req).is_ok());
    }

    #[test]
    fn test_owner_update_rejects_blank_name() {
        let update = OwnerUpdate {
            name: Patch::Present("  ".to_string()),
            ..Default::default()
        };
        assert!(message(validate_owner_update(&update)).contains("name is required"));
        assert!(validate_owner_update(&OwnerUpdate::default()).is_ok());
    }

    #[test]
    fn test_pet_missing_required_fields() {
        let msg = message(validate_new_pet(&NewPet::default(), &DateParser::default()));
        assert!(msg.contains("owner_id is required"));
        assert!(msg.contains("name is required"));
        assert!(msg.contains("species is required"));
    }

    #[test]
    fn test_pet_gender_mismatch_lists_allowed_set() {
        let req = NewPet {
            owner_id: generate_id().to_string(),
            name: "Pochi".to_string(),
            species: "dog".to_string(),
            gender: Some("unknown-value".to_string()),
            ..Default::default()
        };
        let msg = message(validate_new_pet(&req, &DateParser::default()));
        assert!(msg.contains("gender must be one of 'male', 'female', 'unknown'"));
    }

    #[test]
    fn test_pet_weight_bounds() {
        let base = NewPet {
            owner_id: generate_id().to_string(),
            name: "Pochi".to_string(),
            species: "dog".to_string(),
            ..Default::default()
        };
        let dates = DateParser::default();

        for ok in [0.0, 999.99] {
            let req = NewPet { weight: Some(ok), ..base.clone() };
            assert!(validate_new_pet(&req, &dates).is_ok(), "weight {}", ok);
        }
        for bad in [-0.1, 1000.0] {
            let req = NewPet { weight: Some(bad), ..base.clone() };
            assert!(validate_new_pet(&req, &dates).is_err(), "weight {}", bad);
        }
    }

    #[test]
    fn test_pet_owner_id_must_be_uuid() {
        let req = NewPet {
            owner_id: "owner-1".to_string(),
            name: "Pochi".to_string(),
            species: "dog".to_string(),
            birth_date: Some("2020/01/01".to_string()),
            ..Default::default()
        };
        let msg = message(validate_new_pet(&req, &DateParser::default()));
        assert!(msg.contains("invalid owner ID format"));
        assert!(msg.contains("invalid birth date format"));
    }

    #[test]
    fn test_pet_update_checks_only_present_fields() {
        let dates = DateParser::default();
        assert!(validate_pet_update(&PetUpdate::default(), &dates).is_ok());

        let clearing: PetUpdate =
            serde_json::from_str(r#"{"weight": null, "gender": null, "environment": null}"#).unwrap();
        assert!(validate_pet_update(&clearing, &dates).is_ok());

        let bad: PetUpdate =
            serde_json::from_str(r#"{"species": "", "environment": "space", "weight": 1200}"#).unwrap();
        let msg = message(validate_pet_update(&bad, &dates));
        assert!(msg.contains("species is required"));
        assert!(msg.contains("environment must be one of"));
        assert!(msg.contains("weight must be less than 1000"));
    }

    #[test]
    fn test_medical_record_missing_required_fields() {
        let msg = message(validate_new_medical_record(
            &NewMedicalRecord::default(),
            &DateParser::default(),
        ));
        assert_eq!(
            msg,
            "validation failed: pet_id is required; owner_id is required; visit_date is required"
        );
    }

    #[test]
    fn test_medical_record_text_limits() {
        let req = NewMedicalRecord {
            pet_id: generate_id().to_string(),
            owner_id: generate_id().to_string(),
            visit_date: "2026-01-25".to_string(),
            chief_complaint: "a".repeat(1001),
            plan: "b".repeat(2000),
            diagnosis: "c".repeat(1001),
            ..Default::default()
        };
        let msg = message(validate_new_medical_record(&req, &DateParser::default()));
        assert!(msg.contains("chief_complaint must be at most 1000 characters"));
        assert!(msg.contains("diagnosis must be at most 1000 characters"));
        assert!(!msg.contains("plan"));
    }

    #[test]
    fn test_medical_record_rejects_bad_date_and_enums() {
        let req = NewMedicalRecord {
            pet_id: generate_id().to_string(),
            owner_id: generate_id().to_string(),
            visit_date: "25/01/2026".to_string(),
            visit_type: Some("emergency".to_string()),
            status: Some("closed".to_string()),
            doctor_id: Some("dr-who".to_string()),
            ..Default::default()
        };
        let msg = message(validate_new_medical_record(&req, &DateParser::default()));
        assert!(msg.contains("visit_date must be a valid date"));
        assert!(msg.contains("visit_type must be one of 'first-visit', 'follow-up'"));
        assert!(msg.contains("status must be one of 'draft', 'finalized'"));
        assert!(msg.contains("invalid doctor ID format"));
    }

    #[test]
    fn test_medical_record_update_allows_clearing_doctor() {
        let update: MedicalRecordUpdate = serde_json::from_str(r#"{"doctor_id": null}"#).unwrap();
        assert!(validate_medical_record_update(&update, &DateParser::default()).is_ok());

        let blank: MedicalRecordUpdate = serde_json::from_str(r#"{"visit_date": ""}"#).unwrap();
        assert!(validate_medical_record_update(&blank, &DateParser::default()).is_err());
    }
}
