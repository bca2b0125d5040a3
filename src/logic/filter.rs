use chrono::NaiveDate;

use crate::error::Result;
use crate::logic::validate::Violations;
use crate::model::{
    non_empty, parse_id, DateParser, Id, LiteralEnum, MedicalRecord, MedicalRecordQuery,
    RecordStatus, VisitType,
};

/// Parsed listing filters for medical records. Every bound is optional and
/// all present bounds must hold for a record to match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
    pub pet_id: Option<Id>,
    pub owner_id: Option<Id>,
    pub visit_type: Option<VisitType>,
    pub status: Option<RecordStatus>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn from_query(query: MedicalRecordQuery, dates: &DateParser) -> Result<Self> {
        let pet_id = non_empty(query.pet_id);
        let owner_id = non_empty(query.owner_id);
        let visit_type = non_empty(query.visit_type);
        let status = non_empty(query.status);
        let date_from = non_empty(query.date_from);
        let date_to = non_empty(query.date_to);

        let mut v = Violations::new();
        if let Some(id) = &pet_id {
            v.uuid("pet ID", id);
        }
        if let Some(id) = &owner_id {
            v.uuid("owner ID", id);
        }
        if let Some(t) = &visit_type {
            v.literal::<VisitType>(t);
        }
        if let Some(s) = &status {
            v.literal::<RecordStatus>(s);
        }
        if let Some(d) = &date_from {
            v.date(dates, "date_from", d);
        }
        if let Some(d) = &date_to {
            v.date(dates, "date_to", d);
        }
        v.into_result()?;

        Ok(Self {
            pet_id: pet_id.map(|id| parse_id(&id, "pet ID")).transpose()?,
            owner_id: owner_id.map(|id| parse_id(&id, "owner ID")).transpose()?,
            visit_type: visit_type.as_deref().and_then(VisitType::parse),
            status: status.as_deref().and_then(RecordStatus::parse),
            date_from: date_from
                .map(|d| dates.parse_date(&d, "date_from"))
                .transpose()?,
            date_to: date_to.map(|d| dates.parse_date(&d, "date_to")).transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &MedicalRecord) -> bool {
        let day = record.visit_date.date_naive();
        self.pet_id.map_or(true, |id| record.pet_id == id)
            && self.owner_id.map_or(true, |id| record.owner_id == id)
            && self.visit_type.map_or(true, |t| record.visit_type == t)
            && self.status.map_or(true, |s| record.status == s)
            && self.date_from.map_or(true, |from| day >= from)
            && self.date_to.map_or(true, |to| day <= to)
    }

    pub fn apply(&self, records: Vec<MedicalRecord>) -> Vec<MedicalRecord> {
        if self.is_empty() {
            return records;
        }
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
