use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feed_service::db::{
    PgContentStore, PgInteractionStore, PgProfileStore, PgSocialGraphStore,
};
use feed_service::handlers::{get_feed, get_suggested_locations, FeedHandlerState};
use feed_service::services::{FeedComposer, LocationSuggestionService};
use feed_service::{metrics, Config};

struct HealthState {
    db_pool: sqlx::Pool<sqlx::Postgres>,
}

async fn health_summary(state: web::Data<HealthState>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(&state.db_pool).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "feed-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "feed-service"
        })),
    }
}

async fn metrics_endpoint() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/plain; version=0.0.4")
        .body(metrics::export())
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Structured JSON logging with env-filter overrides
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_line_number(true)
                .with_file(true)
                .with_target(true),
        )
        .init();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!("Starting feed-service v{}", env!("CARGO_PKG_VERSION"));
    info!("Environment: {}", config.app.env);
    info!("Home country: {}", config.feed.home_country);

    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("failed to connect to Postgres")
        .map_err(|e| {
            tracing::error!("Database initialization failed: {:#}", e);
            io::Error::new(io::ErrorKind::Other, e)
        })?;

    let content = Arc::new(PgContentStore::new(db_pool.clone()));
    let graph = Arc::new(PgSocialGraphStore::new(db_pool.clone()));
    let profiles = Arc::new(PgProfileStore::new(db_pool.clone()));
    let interactions = Arc::new(PgInteractionStore::new(db_pool.clone()));

    let port = config.app.port;
    let home_country = config.feed.home_country.clone();

    info!("Feed service listening on 0.0.0.0:{}", port);

    HttpServer::new(move || {
        let state = FeedHandlerState {
            composer: FeedComposer::new(
                content.clone(),
                graph.clone(),
                profiles.clone(),
                home_country.clone(),
            ),
            suggestions: LocationSuggestionService::new(interactions.clone()),
        };

        App::new()
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .app_data(web::Data::new(HealthState {
                db_pool: db_pool.clone(),
            }))
            .app_data(web::Data::new(state))
            .route("/health", web::get().to(health_summary))
            .route("/metrics", web::get().to(metrics_endpoint))
            .service(
                web::scope("/api/posts")
                    .service(get_feed)
                    .service(get_suggested_locations),
            )
    })
    .bind(("0.0.0.0", port))?
    .run()
    .await
}
