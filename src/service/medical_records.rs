use crate::error::Result;
use crate::logic::{
    paginate, validate_medical_record_update, validate_new_medical_record, PageRequest,
    RecordFilter,
};
use crate::model::medical_record::ensure_record_no;
use crate::model::{
    parse_id, MedicalRecord, MedicalRecordPage, MedicalRecordQuery, MedicalRecordUpdate,
    NewMedicalRecord,
};
use crate::service::Service;
use crate::store::traits::Store;

impl<S: Store> Service<S> {
    pub async fn list_medical_records(&self) -> Result<Vec<MedicalRecord>> {
        self.store.list_medical_records().await
    }

    /// Filters are checked before the store is read; the page itself is cut
    /// from the full filtered listing in memory.
    pub async fn list_medical_records_paginated(
        &self,
        request: PageRequest,
        query: MedicalRecordQuery,
    ) -> Result<MedicalRecordPage> {
        let filter = RecordFilter::from_query(query, &self.dates)?;

        let records = filter.apply(self.store.list_medical_records().await?);
        let page = paginate(records, request);

        Ok(MedicalRecordPage {
            records: page.items,
            current_page: page.current_page,
            per_page: page.per_page,
            total: page.total,
            total_pages: page.total_pages,
            has_next: page.has_next,
            has_prev: page.has_prev,
        })
    }

    pub async fn list_medical_records_by_pet(&self, pet_id: &str) -> Result<Vec<MedicalRecord>> {
        let pet_id = parse_id(pet_id, "pet ID")?;
        self.store.list_medical_records_by_pet(&pet_id).await
    }

    pub async fn list_medical_records_by_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<MedicalRecord>> {
        let owner_id = parse_id(owner_id, "owner ID")?;
        self.store.list_medical_records_by_owner(&owner_id).await
    }

    pub async fn get_medical_record(&self, id: &str) -> Result<MedicalRecord> {
        let id = parse_id(id, "medical record ID")?;
        self.store.get_medical_record(&id).await
    }

    pub async fn create_medical_record(&self, request: NewMedicalRecord) -> Result<MedicalRecord> {
        let request = request.normalized();
        validate_new_medical_record(&request, &self.dates)?;

        let record_no = self.record_numbers.generate();
        ensure_record_no(&record_no)?;

        let record = request.into_record(record_no, &self.dates)?;
        self.store.create_medical_record(record.clone()).await?;
        log::info!(
            "Created medical record {} ({}) for pet {}",
            record.id,
            record.record_no,
            record.pet_id
        );

        self.store.get_medical_record(&record.id).await
    }

    pub async fn update_medical_record(
        &self,
        id: &str,
        update: MedicalRecordUpdate,
    ) -> Result<MedicalRecord> {
        let id = parse_id(id, "medical record ID")?;
        validate_medical_record_update(&update, &self.dates)?;

        let mut record = self.store.get_medical_record(&id).await?;
        record.apply_update(update, &self.dates)?;
        self.store
            .save_medical_record(record.without_relations())
            .await?;
        log::info!("Updated medical record {}", id);

        // Summaries follow the possibly changed pet/owner references.
        self.store.get_medical_record(&id).await
    }

    pub async fn delete_medical_record(&self, id: &str) -> Result<()> {
        let id = parse_id(id, "medical record ID")?;
        self.store.get_medical_record(&id).await?;
        self.store.delete_medical_record(&id).await?;
        log::info!("Deleted medical record {}", id);
        Ok(())
    }
}
