pub mod analysis;
pub mod announcements;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod models;
pub mod records;
pub mod responses;
pub mod store;
pub mod students;

use actix_cors::Cors;
use actix_files as fs;
use actix_web::{middleware, web, App};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::path::PathBuf;
use std::sync::Arc;

use crate::analysis::AnalysisClient;
use crate::config::DatabaseConfig;
use crate::store::PortalStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PortalStore>,
    pub analysis: AnalysisClient,
    pub static_dir: PathBuf,
}

pub fn create_app(app_state: web::Data<AppState>) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let static_dir = app_state.static_dir.clone();

    App::new()
        .app_data(app_state)
        .app_data(web::JsonConfig::default().error_handler(responses::json_error_handler))
        .app_data(web::PathConfig::default().error_handler(responses::path_error_handler))
        .wrap(
            Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600)
        )
        .wrap(middleware::Logger::default())
        .configure(auth::configure)
        .configure(students::configure)
        .configure(records::configure)
        .configure(announcements::configure)
        .configure(dashboard::configure)
        .configure(analysis::configure)
        // Frontend last so it never shadows an API route.
        .service(fs::Files::new("/", static_dir).index_file("index.html"))
}

pub async fn init_db(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.pool_size)
        .connect_with(config.connect_options()?)
        .await?;

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await?;

    Ok(pool)
}
