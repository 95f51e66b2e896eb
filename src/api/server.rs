//! HTTP API server

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{require_owner, TokenService};
use crate::config::Config;
use crate::error::Result;
use crate::store::{PgStore, Store};

use super::{accounts, expenses, todos};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub tokens: TokenService,
    pub store: Arc<dyn Store>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Result<Self> {
        config.validate()?;
        let tokens = TokenService::from_config(&config.auth)?;
        Ok(Self {
            config,
            tokens,
            store,
        })
    }
}

pub type SharedState = Arc<AppState>;

/// Connect to PostgreSQL and run the HTTP API server
pub async fn run_server(config: Config, host: &str, port: u16) -> Result<()> {
    let store = PgStore::connect(&config.database.url).await?;
    tracing::info!("Connected to PostgreSQL");

    let state = Arc::new(AppState::new(config, Arc::new(store))?);
    let addr = format!("{}:{}", host, port);
    let listener = TcpListener::bind(&addr).await?;

    serve(listener, state).await
}

/// Serve the API on an already bound listener
pub async fn serve(listener: TcpListener, state: SharedState) -> Result<()> {
    tracing::info!("Server listening on {}", listener.local_addr()?);

    let app = create_router(state);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes.
///
/// Routes keyed by `{email}` form one group behind the owner gate, so a new
/// per-user route cannot be added without it.
pub fn create_router(state: SharedState) -> Router {
    let owner_routes = Router::new()
        .route("/users/{email}", get(accounts::get_user))
        .route(
            "/todos/{email}",
            get(todos::list_todos).post(todos::create_todo),
        )
        .route(
            "/todos/{email}/{id}",
            put(todos::update_todo).delete(todos::delete_todo),
        )
        .route(
            "/expenses/{email}",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route("/expenses/{email}/{id}", delete(expenses::delete_expense))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_owner));

    Router::new()
        .route("/", get(accounts::index))
        .route("/health", get(accounts::health))
        .route("/signup", post(accounts::signup))
        // Older clients post signups here
        .route("/signin", post(accounts::signup))
        .route("/login", post(accounts::login))
        .merge(owner_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
