use serde_json::json;
use std::convert::Infallible;
use warp::{Filter, Reply};

use crate::catalog_store::CatalogStore;
use crate::warp_helpers::with_store;

pub async fn health_check() -> Result<impl Reply, Infallible> {
    Ok(warp::reply::json(&json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

pub async fn ready_check(store: CatalogStore) -> Result<impl Reply, Infallible> {
    let catalog = store.snapshot();
    Ok(warp::reply::json(&json!({
        "status": "ready",
        "photos": catalog.len(),
        "fingerprint": catalog.fingerprint(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })))
}

pub fn build_health_routes(
    store: CatalogStore,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and_then(health_check);

    let ready = warp::path("ready")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store(store))
        .and_then(ready_check);

    health.or(ready)
}
