use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};

use crate::api::handlers::{error_response, request_body, ApiError, AppState, MessageResponse};
use crate::model::{NewPet, Pet, PetUpdate};
use crate::store::traits::Store;

pub async fn list_pets<S: Store>(
    State(service): State<AppState<S>>,
) -> Result<Json<Vec<Pet>>, ApiError> {
    service.list_pets().await.map(Json).map_err(error_response)
}

pub async fn get_pet<S: Store>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Pet>, ApiError> {
    service.get_pet(&id).await.map(Json).map_err(error_response)
}

pub async fn create_pet<S: Store>(
    State(service): State<AppState<S>>,
    payload: Result<Json<NewPet>, JsonRejection>,
) -> Result<(StatusCode, Json<Pet>), ApiError> {
    let request = request_body(payload)?;
    let pet = service.create_pet(request).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(pet)))
}

pub async fn update_pet<S: Store>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
    payload: Result<Json<PetUpdate>, JsonRejection>,
) -> Result<Json<Pet>, ApiError> {
    let update = request_body(payload)?;
    service
        .update_pet(&id, update)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn delete_pet<S: Store>(
    State(service): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    service.delete_pet(&id).await.map_err(error_response)?;
    Ok(MessageResponse::new("pet deleted"))
}
