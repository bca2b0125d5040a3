use axum::{
    middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
};

use crate::api::handlers::{self, AppState};
use crate::api::{medical_record_handlers, middleware::access_log, owner_handlers, pet_handlers};
use crate::service::Service;
use crate::store::traits::Store;

pub fn create_router<S: Store + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/", get(handlers::welcome))
        // Health check
        .route("/health", get(handlers::health_check::<S>))
        // Owners
        .route(
            "/owners",
            get(owner_handlers::list_owners::<S>).post(owner_handlers::create_owner::<S>),
        )
        .route(
            "/owners/:id",
            get(owner_handlers::get_owner::<S>)
                .put(owner_handlers::update_owner::<S>)
                .delete(owner_handlers::delete_owner::<S>),
        )
        .route("/owners/:id/pets", get(owner_handlers::list_owner_pets::<S>))
        .route(
            "/owners/:id/medical-records",
            get(medical_record_handlers::list_owner_medical_records::<S>),
        )
        // Pets
        .route(
            "/pets",
            get(pet_handlers::list_pets::<S>).post(pet_handlers::create_pet::<S>),
        )
        .route(
            "/pets/:id",
            get(pet_handlers::get_pet::<S>)
                .put(pet_handlers::update_pet::<S>)
                .delete(pet_handlers::delete_pet::<S>),
        )
        .route(
            "/pets/:id/medical-records",
            get(medical_record_handlers::list_pet_medical_records::<S>),
        )
        // Medical records
        .route(
            "/medical-records",
            get(medical_record_handlers::list_medical_records::<S>)
                .post(medical_record_handlers::create_medical_record::<S>),
        )
        .route(
            "/medical-records/paginated",
            get(medical_record_handlers::list_medical_records_paginated::<S>),
        )
        .route(
            "/medical-records/:id",
            get(medical_record_handlers::get_medical_record::<S>)
                .put(medical_record_handlers::update_medical_record::<S>)
                .delete(medical_record_handlers::delete_medical_record::<S>),
        )
}

/// Router with state and the middleware stack: request id, access log,
/// CORS and a per-request timeout that drops the in-flight handler.
pub fn build_app<S: Store + 'static>(service: Service<S>, request_timeout: Duration) -> Router {
    create_router::<S>()
        .with_state(Arc::new(service))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(middleware::from_fn(access_log))
                .layer(CorsLayer::permissive())
                .layer(TimeoutLayer::new(request_timeout)),
        )
}
