pub mod catalog;
pub mod catalog_diff;
pub mod catalog_store;
pub mod config;
pub mod handlers_health;
pub mod handlers_photo;
pub mod photo_record;
pub mod routes;
pub mod scheduler;
pub mod warp_helpers;

pub use catalog::{Catalog, CatalogError, CatalogResult};
pub use catalog_diff::{diff, CatalogDiff};
pub use catalog_store::CatalogStore;
pub use photo_record::{
    Dimensions, ExifData, PhotoRecord, ProcessedAt, RecordDefect, ThumbnailSize, ThumbnailSizes,
};
