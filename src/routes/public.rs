use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Unauthenticated, read-only endpoints.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /articles
        // Index: redirects to the list.
        .route("/articles", get(handlers::index))
        // GET /articles/list
        // Every article with its author, in the store's natural order.
        .route("/articles/list", get(handlers::list_articles))
        // GET /articles/details?id=...
        // A single article. 400 without an id, 404 for an unknown one.
        .route("/articles/details", get(handlers::get_article_details))
}
