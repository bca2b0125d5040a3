use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Json,
};

use crate::api::handlers::{error_response, request_body, ApiError, AppState, MessageResponse};
use crate::logic::PageRequest;
use crate::model::{
    MedicalRecord, MedicalRecordPage, MedicalRecordQuery, MedicalRecordUpdate, NewMedicalRecord,
};
use crate::store::traits::Store;

pub async fn list_medical_records<S: Store>(
    State(service): State<AppState<S>>,
) -> Result<Json<Vec<MedicalRecord>>, ApiError> {
    service
        .list_medical_records()
        .await
        .map(Json)
        .map_err(error_response)
}

/// `page`/`limit` never fail the request; filter values are validated.
pub async fn list_medical_records_paginated<S: Store>(
    State(service): State<AppState<S>>,
    params: Option<Query<HashMap<String, String>>>,
) -> Result<Json<MedicalRecordPage>, ApiError> {
    let params = params.map(|Query(p)| p).unwrap_or_default();
    let page = PageRequest::from_query(
        params.get("page").map(String::as_str),
        params.get("limit").map(String::as_str),
    );
    let filters = MedicalRecordQuery {
        pet_id: params.get("pet_id").cloned(),
        owner_id: params.get("owner_id").cloned(),
        visit_type: params.get("visit_type").cloned(),
        status: params.get("status").cloned(),
        date_from: params.get("date_from").cloned(),
        date_to: params.get("date_to").cloned(),
    };

    service
        .list_medical_records_paginated(page, filters)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn get_medical_record<S: Store>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<MedicalRecord>, ApiError> {
    service
        .get_medical_record(&id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn create_medical_record<S: Store>(
    State(service): State<AppState<S>>,
    payload: Result<Json<NewMedicalRecord>, JsonRejection>,
) -> Result<(StatusCode, Json<MedicalRecord>), ApiError> {
    let request = request_body(payload)?;
    let record = service
        .create_medical_record(request)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update_medical_record<S: Store>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<MedicalRecordUpdate>, JsonRejection>,
) -> Result<Json<MedicalRecord>, ApiError> {
    let update = request_body(payload)?;
    service
        .update_medical_record(&id, update)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_medical_record<S: Store>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service
        .delete_medical_record(&id)
        .await
        .map_err(error_response)?;
    Ok(MessageResponse::new("medical record deleted"))
}

pub async fn list_pet_medical_records<S: Store>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MedicalRecord>>, ApiError> {
    service
        .list_medical_records_by_pet(&id)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn list_owner_medical_records<S: Store>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MedicalRecord>>, ApiError> {
    service
        .list_medical_records_by_owner(&id)
        .await
        .map(Json)
        .map_err(error_response)
}
