pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod services;

use services::dataset_loader::DatasetLoader;

// Application state
pub struct AppState {
    pub config: config::Config,
    pub loader: DatasetLoader,
}

impl AppState {
    pub fn new(config: config::Config) -> Self {
        let loader = DatasetLoader::new(&config);
        Self { config, loader }
    }
}
