use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use echos_service::ContentService;
use echos_store::Database;

mod admin;
mod comments;
mod likes;
mod middleware;
mod posts;
mod state;
mod tags;

use state::{AppState, AppStateInner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "echos=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let db_path = std::env::var("ECHOS_DB_PATH").unwrap_or_else(|_| "echos.db".into());
    let host = std::env::var("ECHOS_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("ECHOS_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init content store
    let db = Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner {
        service: ContentService::new(Arc::new(db)),
    });

    // Every route runs behind the trusted-identity boundary: the
    // upstream identity provider has already authenticated the caller.
    let app = Router::new()
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/{post_id}",
            get(posts::get_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route("/posts/{post_id}/review", put(posts::review_post))
        .route(
            "/posts/{post_id}/like",
            get(likes::has_liked).post(likes::toggle_like),
        )
        .route("/posts/{post_id}/comments", post(comments::add_comment))
        .route("/comments/{comment_id}", delete(comments::delete_comment))
        .route("/tags", get(tags::list_tags).post(tags::create_tag))
        .route("/tags/{tag_id}", get(tags::get_tag))
        .route(
            "/admin/users",
            get(admin::list_users).post(admin::create_user),
        )
        .route("/admin/users/{user_id}/role", put(admin::change_role))
        .route("/admin/users/{user_id}", delete(admin::delete_user))
        .layer(from_fn(middleware::require_identity))
        .with_state(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Echos server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
