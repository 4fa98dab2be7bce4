use actix_web::{web, HttpServer};
use log::{info, warn};
use std::sync::Arc;

use student_portal_backend::analysis::AnalysisClient;
use student_portal_backend::config::Config;
use student_portal_backend::store::PgStore;
use student_portal_backend::{create_app, init_db, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = dotenv::dotenv() {
        warn!("No .env file loaded: {}", e);
    }

    let config = Config::from_env().map_err(|e| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    let db_pool = init_db(&config.database)
        .await
        .map_err(|e| std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to initialize database: {}", e)
        ))?;

    info!(
        "Database initialized successfully (pool size {})",
        config.database.pool_size
    );

    if config.analysis.api_key.is_empty() {
        warn!("GEMINI_API_KEY is not set; analysis requests will return the fallback text");
    }

    let analysis = AnalysisClient::new(&config.analysis).map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to build analysis client: {}", e),
        )
    })?;

    if !config.static_dir.is_dir() {
        warn!("Static directory {:?} does not exist; the frontend will not be served", config.static_dir);
    }

    let app_state = web::Data::new(AppState {
        store: Arc::new(PgStore::new(db_pool)),
        analysis,
        static_dir: config.static_dir.clone(),
    });

    info!("Starting server at http://{}:{}", config.bind_addr, config.port);

    HttpServer::new(move || create_app(app_state.clone()))
        .bind((config.bind_addr.as_str(), config.port))?
        .run()
        .await
}
