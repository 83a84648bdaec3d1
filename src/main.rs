use log::{error, info};
use mimalloc::MiMalloc;
use std::net::{SocketAddr, TcpListener};

use photo_catalog::config::Config;
use photo_catalog::routes::build_routes;
use photo_catalog::scheduler::CatalogReloader;
use photo_catalog::{Catalog, CatalogStore};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("Starting photo catalog server on {}", addr);
    info!("Metadata path: {}", config.metadata_path.display());

    // Check if port is available BEFORE loading the catalog
    if !is_port_available(addr) {
        error!(
            "Port {} is already in use. Please stop any existing instance or use a different port.",
            config.port
        );
        return Err(format!("Port {} is already in use", config.port).into());
    }

    let catalog = Catalog::load_file(&config.metadata_path).map_err(|e| {
        error!("Failed to load catalog: {}", e);
        e
    })?;
    let store = CatalogStore::new(catalog);

    if config.reload_interval > 0 {
        let reloader = CatalogReloader::new(config.metadata_path.clone(), store.clone());
        let _reloader_handle = reloader.start(config.reload_interval);
    } else {
        info!("Catalog reloading disabled");
    }

    let routes = build_routes(store);

    info!(
        "Server started successfully, listening on http://localhost:{}",
        config.port
    );

    warp::serve(routes).run(addr).await;

    Ok(())
}

fn is_port_available(addr: SocketAddr) -> bool {
    TcpListener::bind(addr).is_ok()
}
