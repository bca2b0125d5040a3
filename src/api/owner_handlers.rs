use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};

use crate::api::handlers::{error_response, request_body, ApiError, AppState, MessageResponse};
use crate::model::{NewOwner, Owner, OwnerUpdate, Pet};
use crate::store::traits::Store;

pub async fn list_owners<S: Store>(
    State(service): State<AppState<S>>,
) -> Result<Json<Vec<Owner>>, ApiError> {
    service.list_owners().await.map(Json).map_err(error_response)
}

pub async fn get_owner<S: Store>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Owner>, ApiError> {
    service.get_owner(&id).await.map(Json).map_err(error_response)
}

pub async fn create_owner<S: Store>(
    State(service): State<AppState<S>>,
    payload: Result<Json<NewOwner>, JsonRejection>,
) -> Result<(StatusCode, Json<Owner>), ApiError> {
    let request = request_body(payload)?;
    let owner = service.create_owner(request).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(owner)))
}

pub async fn update_owner<S: Store>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<OwnerUpdate>, JsonRejection>,
) -> Result<Json<Owner>, ApiError> {
    let update = request_body(payload)?;
    service
        .update_owner(&id, update)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_owner<S: Store>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_owner(&id).await.map_err(error_response)?;
    Ok(MessageResponse::new("owner deleted"))
}

pub async fn list_owner_pets<S: Store>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Pet>>, ApiError> {
    service
        .list_pets_by_owner(&id)
        .await
        .map(Json)
        .map_err(error_response)
}
