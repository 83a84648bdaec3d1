use std::convert::Infallible;
use warp::{Filter, Reply};

use crate::catalog_store::CatalogStore;
use crate::handlers_health::build_health_routes;
use crate::handlers_photo::build_photo_routes;
use crate::warp_helpers::{cors, handle_rejection};

/// Full filter tree served by the binary: every route, CORS, request logging,
/// and rejections rendered as JSON errors.
pub fn build_routes(
    store: CatalogStore,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    build_health_routes(store.clone())
        .or(build_photo_routes(store))
        .with(cors())
        .with(warp::log("photo_catalog"))
        .recover(handle_rejection)
}
