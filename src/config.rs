use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub metadata_path: PathBuf,
    /// Seconds between catalog file checks; 0 disables reloading.
    pub reload_interval: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Config {
            port: env::var("PHOTO_CATALOG_PORT")
                .unwrap_or_else(|_| "18474".to_string())
                .parse()?,
            host: env::var("PHOTO_CATALOG_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            metadata_path: env::var("PHOTO_CATALOG_METADATA_PATH")
                .unwrap_or_else(|_| {
                    "./content/images/photography/gallery_metadata.json".to_string()
                })
                .into(),
            reload_interval: env::var("PHOTO_CATALOG_RELOAD_INTERVAL")
                .unwrap_or_else(|_| "300".to_string())
                .parse()?,
        })
    }
}
