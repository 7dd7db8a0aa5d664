mod api;
mod database;
mod middleware;
mod models;
mod services;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::env;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use services::{
    AppState, Edition, HttpResetLinkService, MongoPermissionChecker, MongoUserStore,
    NoopPermissionChecker, PermissionChecker,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    // Get configuration from environment
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3003".to_string());
    let database_url = env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set");
    let auth_provider_url = env::var("AUTH_PROVIDER_URL")
        .expect("AUTH_PROVIDER_URL must be set");
    let auth_provider_api_key = env::var("AUTH_PROVIDER_API_KEY").unwrap_or_default();

    log::info!("🚀 Starting User Profile Service...");
    log::info!("📊 Database: {}", database_url);

    // Initialize MongoDB connection
    let db = database::MongoDB::new(&database_url)
        .await
        .expect("Failed to connect to MongoDB");

    log::info!("✅ MongoDB connected successfully");

    // Edition selects the permission strategy once, at startup
    let edition = Edition::from_env();
    let permissions: Arc<dyn PermissionChecker> = if edition.is_gated() {
        log::info!("🔒 Enterprise edition: permission gating enabled");
        Arc::new(MongoPermissionChecker::new(db.clone()))
    } else {
        log::info!("🔓 OSS edition: permission gating disabled");
        Arc::new(NoopPermissionChecker)
    };

    let state = web::Data::new(AppState {
        users: Arc::new(MongoUserStore::new(db.clone())),
        permissions,
        reset_links: Arc::new(HttpResetLinkService::new(
            auth_provider_url,
            auth_provider_api_key,
        )),
    });

    log::info!("🌐 Server starting on {}:{}", host, port);
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", host, port);
    log::info!("📄 OpenAPI spec at: http://{}:{}/api-docs/openapi.json", host, port);

    // Start HTTP server
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allowed_headers(vec![
                actix_web::http::header::AUTHORIZATION,
                actix_web::http::header::CONTENT_TYPE,
                actix_web::http::header::ACCEPT,
            ])
            .supports_credentials()
            .max_age(3600);

        // Generate OpenAPI specification
        let openapi = api::swagger::ApiDoc::openapi();

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(middleware::SecurityHeaders)
            .wrap(Logger::default())
            // Swagger UI
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-docs/openapi.json", openapi.clone())
            )
            // Health check
            .route("/health", web::get().to(api::health::health_check))
            // Profile endpoints - Requires JWT
            .service(
                web::scope("/api/v1/profile")
                    .wrap(middleware::auth::AuthMiddleware)
                    .route("", web::get().to(api::profile::user_profile))
                    .route("/reset-password", web::post().to(api::profile::reset_user_password))
            )
    })
    .bind(format!("{}:{}", host, port))?
    .run()
    .await
}
