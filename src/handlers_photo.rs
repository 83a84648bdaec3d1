use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::str::FromStr;
use warp::http::StatusCode;
use warp::{reject, Filter, Rejection, Reply};

use crate::catalog::Catalog;
use crate::catalog_store::CatalogStore;
use crate::photo_record::PhotoRecord;
use crate::warp_helpers::{with_store, NotFoundError, ValidationError};

#[derive(Debug, Default, Deserialize)]
pub struct PhotoQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoSort {
    /// Order of the generator's output.
    Source,
    /// Order the gallery page shows photos in.
    Gallery,
}

impl FromStr for PhotoSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "source" => Ok(PhotoSort::Source),
            "gallery" => Ok(PhotoSort::Gallery),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PhotosResponse<'a> {
    pub photos: Vec<&'a PhotoRecord>,
    pub total: usize,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CategorySummary<'a> {
    pub name: &'a str,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse<'a> {
    pub categories: Vec<CategorySummary<'a>>,
}

pub fn select_photos<'a>(
    catalog: &'a Catalog,
    query: &PhotoQuery,
) -> Result<Vec<&'a PhotoRecord>, ValidationError> {
    let sort = match query.sort.as_deref() {
        None => PhotoSort::Source,
        Some(raw) => raw.parse().map_err(|_| ValidationError {
            message: format!("Unknown sort order '{}', expected 'source' or 'gallery'", raw),
        })?,
    };
    let category = query.category.as_deref();

    let photos = match sort {
        PhotoSort::Source => catalog.list(category).collect(),
        PhotoSort::Gallery => catalog
            .gallery_order()
            .into_iter()
            .filter(|record| category.is_none_or(|c| record.category == c))
            .collect(),
    };
    Ok(photos)
}

pub fn summarize_categories(catalog: &Catalog) -> Vec<CategorySummary<'_>> {
    catalog
        .category_counts()
        .into_iter()
        .map(|(name, count)| CategorySummary { name, count })
        .collect()
}

/// True when an `If-None-Match` header value names `etag` (or is `*`).
pub fn etag_matches(if_none_match: &str, etag: &str) -> bool {
    if_none_match
        .split(',')
        .map(str::trim)
        .any(|tag| tag == "*" || tag.trim_start_matches("W/") == etag)
}

pub async fn list_photos(
    query: PhotoQuery,
    if_none_match: Option<String>,
    store: CatalogStore,
) -> Result<Box<dyn Reply>, Rejection> {
    let catalog = store.snapshot();
    let photos = select_photos(&catalog, &query).map_err(reject::custom)?;
    let etag = format!("\"{}\"", catalog.fingerprint());

    if if_none_match
        .as_deref()
        .is_some_and(|header| etag_matches(header, &etag))
    {
        let reply = warp::reply::with_status(warp::reply(), StatusCode::NOT_MODIFIED);
        return Ok(Box::new(warp::reply::with_header(reply, "etag", etag)));
    }

    let total = photos.len();
    let reply = warp::reply::json(&PhotosResponse { photos, total });
    Ok(Box::new(warp::reply::with_header(reply, "etag", etag)))
}

pub async fn get_photo(filename: String, store: CatalogStore) -> Result<impl Reply, Rejection> {
    let catalog = store.snapshot();
    match catalog.get(&filename) {
        Some(record) => Ok(warp::reply::json(record)),
        None => {
            log::debug!("No catalog entry for {}", filename);
            Err(reject::custom(NotFoundError))
        }
    }
}

pub async fn list_categories(store: CatalogStore) -> Result<impl Reply, Infallible> {
    let catalog = store.snapshot();
    Ok(warp::reply::json(&CategoriesResponse {
        categories: summarize_categories(&catalog),
    }))
}

pub fn build_photo_routes(
    store: CatalogStore,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let api_photos_list = warp::path("api")
        .and(warp::path("photos"))
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<PhotoQuery>())
        .and(warp::header::optional::<String>("if-none-match"))
        .and(with_store(store.clone()))
        .and_then(list_photos);

    let api_photo_get = warp::path("api")
        .and(warp::path("photos"))
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store(store.clone()))
        .and_then(get_photo);

    let api_categories = warp::path("api")
        .and(warp::path("categories"))
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store(store))
        .and_then(list_categories);

    api_photos_list.or(api_photo_get).or(api_categories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::photo_record::tests::sample_record;

    fn catalog() -> Catalog {
        let mut pinned = sample_record("c.jpg", "nature");
        pinned.order = Some(1);
        Catalog::from_records(vec![
            sample_record("b.jpg", "urban"),
            sample_record("a.jpg", "nature"),
            pinned,
        ])
        .unwrap()
    }

    fn names(photos: &[&PhotoRecord]) -> Vec<String> {
        photos.iter().map(|p| p.filename.clone()).collect()
    }

    #[test]
    fn test_default_query_lists_everything_in_source_order() {
        let catalog = catalog();
        let photos = select_photos(&catalog, &PhotoQuery::default()).unwrap();
        assert_eq!(names(&photos), vec!["b.jpg", "a.jpg", "c.jpg"]);
    }

    #[test]
    fn test_gallery_sort_with_category() {
        let catalog = catalog();
        let query = PhotoQuery {
            category: Some("nature".to_string()),
            sort: Some("gallery".to_string()),
        };
        let photos = select_photos(&catalog, &query).unwrap();
        assert_eq!(names(&photos), vec!["c.jpg", "a.jpg"]);
    }

    #[test]
    fn test_unknown_sort_is_rejected() {
        let catalog = catalog();
        let query = PhotoQuery {
            category: None,
            sort: Some("newest".to_string()),
        };
        let err = select_photos(&catalog, &query).unwrap_err();
        assert!(err.message.contains("newest"));
    }

    #[test]
    fn test_category_summary() {
        let catalog = catalog();
        assert_eq!(
            summarize_categories(&catalog),
            vec![
                CategorySummary {
                    name: "nature",
                    count: 2
                },
                CategorySummary {
                    name: "urban",
                    count: 1
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_get_photo_miss_is_rejected() {
        let store = CatalogStore::new(catalog());
        assert!(get_photo("missing.jpg".to_string(), store.clone())
            .await
            .is_err());

        let reply = get_photo("a.jpg".to_string(), store)
            .await
            .unwrap()
            .into_response();
        assert_eq!(reply.status(), warp::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn test_list_photos_carries_fingerprint_etag() {
        let store = CatalogStore::new(catalog());
        let fingerprint = store.snapshot().fingerprint().to_string();

        let reply = list_photos(PhotoQuery::default(), None, store)
            .await
            .unwrap()
            .into_response();
        assert_eq!(
            reply.headers().get("etag").unwrap(),
            &format!("\"{}\"", fingerprint)
        );
    }

    #[test]
    fn test_etag_matching() {
        let etag = "\"abc\"";
        assert!(etag_matches("\"abc\"", etag));
        assert!(etag_matches("\"old\", W/\"abc\"", etag));
        assert!(etag_matches("*", etag));
        assert!(!etag_matches("\"old\"", etag));
        assert!(!etag_matches("abc", etag));
    }

    #[tokio::test]
    async fn test_matching_if_none_match_is_not_modified() {
        let store = CatalogStore::new(catalog());
        let etag = format!("\"{}\"", store.snapshot().fingerprint());

        let reply = list_photos(PhotoQuery::default(), Some(etag.clone()), store.clone())
            .await
            .unwrap()
            .into_response();
        assert_eq!(reply.status(), StatusCode::NOT_MODIFIED);
        assert_eq!(reply.headers().get("etag").unwrap(), &etag);

        let reply = list_photos(PhotoQuery::default(), Some("\"stale\"".to_string()), store)
            .await
            .unwrap()
            .into_response();
        assert_eq!(reply.status(), StatusCode::OK);
    }
}
