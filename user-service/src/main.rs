use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method, StatusCode,
    },
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use common_auth::{JwtConfig, JwtVerifier};
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info};

use user_service::config::load_auth_config;
use user_service::metrics::AuthMetrics;
use user_service::repository::PgUserRepository;
use user_service::tokens::{TokenConfig, TokenSigner};
use user_service::user_handlers::{
    create_user, delete_user, list_roles, list_users, login_user, update_user,
};
use user_service::AppState;

async fn health() -> &'static str {
    "ok"
}

async fn metrics_text(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(response) => response,
        Err(err) => {
            error!(error = ?err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    // Missing secret or database address is a boot failure, never a
    // silently degraded process.
    let config = load_auth_config()?;
    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let db_pool = PgPool::connect(&database_url).await?;

    let verifier = Arc::new(JwtVerifier::new(
        config.jwt_secret.as_bytes(),
        JwtConfig::new().with_leeway(config.token_leeway_seconds),
    ));
    let signer = Arc::new(TokenSigner::new(
        config.jwt_secret.as_bytes(),
        TokenConfig {
            ttl_seconds: config.token_ttl_seconds,
        },
    ));
    let metrics = Arc::new(AuthMetrics::new()?);

    let state = AppState {
        repo: Arc::new(PgUserRepository::new(db_pool)),
        verifier,
        signer,
        metrics,
    };

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list([HeaderValue::from_static(
            "http://localhost:4200",
        )]))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true);

    let app = Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics_text))
        .route("/login", post(login_user))
        .route("/users", post(create_user).get(list_users))
        .route("/users/:id", put(update_user).delete(delete_user))
        .route("/roles", get(list_roles))
        .with_state(state)
        .layer(cors);

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let ip: std::net::IpAddr = host.parse()?;
    let addr = SocketAddr::from((ip, port));

    info!(%addr, "starting user-service");
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
