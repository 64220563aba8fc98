use axum::{routing::get, routing::post, Json, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use portfolio_api::config::AppConfig;
use portfolio_api::handlers::resource::{self, ResourceKind};
use portfolio_api::state::AppState;
use portfolio_api::store::DocumentStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;

    // The store connection is established once and shared for the process
    // lifetime.
    let store = DocumentStore::connect(&config.store.database_url).await?;
    store.ensure_collections().await?;

    let state = AppState {
        store,
        security: config.security.clone(),
    };
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("portfolio API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        // Liveness probe
        .route("/", get(root))
        // Credential endpoints
        .merge(auth_routes())
        // Resource CRUD, one instantiation per kind
        .merge(resource::routes(ResourceKind::Skill))
        .merge(resource::routes(ResourceKind::Project))
        .merge(resource::routes(ResourceKind::Blog))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use portfolio_api::handlers::auth;

    Router::new()
        .route("/api/v1/register", post(auth::register))
        .route("/api/v1/login", post(auth::login))
}

async fn root() -> Json<Value> {
    Json(json!({
        "message": "Server is running smoothly",
        "timestamp": chrono::Utc::now()
    }))
}
