use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use todo_api_rust::config::{self, Environment};
use todo_api_rust::database::manager::DatabaseManager;
use todo_api_rust::handlers::{health, tasks};
use todo_api_rust::middleware::jwt_auth_middleware;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, BETTER_AUTH_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting Todo API in {:?} mode", config.environment);

    if config.security.auth_secret.is_empty() {
        tracing::warn!("BETTER_AUTH_SECRET is not set; all requests will be rejected");
    }

    // Ensure the pool and schema up front when the database is reachable.
    // Failure is not fatal: the pool is retried lazily on first use.
    if let Err(e) = DatabaseManager::pool().await {
        tracing::warn!("Database unavailable at startup, will retry on demand: {}", e);
    }

    let app = app();

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Todo API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        // Public
        .route("/", get(health::root))
        .route("/health", get(health::health))
        // Protected task API
        .merge(task_routes())
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn task_routes() -> Router {
    Router::new()
        .route(
            "/api/:user_id/tasks",
            post(tasks::task_create).get(tasks::task_list),
        )
        .route(
            "/api/:user_id/tasks/:task_id",
            get(tasks::task_get)
                .put(tasks::task_update)
                .delete(tasks::task_delete),
        )
        .route(
            "/api/:user_id/tasks/:task_id/complete",
            patch(tasks::task_complete),
        )
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    let config = config::config();
    match config.environment {
        Environment::Development => CorsLayer::permissive(),
        _ => {
            let origins: Vec<_> = config
                .security
                .cors_origins
                .iter()
                .filter_map(|origin| origin.parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }
}
