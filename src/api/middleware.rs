use std::time::Instant;

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use log::Level;

/// One access-log line per request, at a level chosen by response status.
pub async fn access_log(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let path = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let request_id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();
    let started = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let level = if status.is_server_error() {
        Level::Error
    } else if status.is_client_error() {
        Level::Warn
    } else {
        Level::Info
    };
    log::log!(
        level,
        "{} {} {} {}ms request_id={}",
        method,
        path,
        status.as_u16(),
        started.elapsed().as_millis(),
        request_id
    );

    response
}
