use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Article mutation endpoints. The whole router sits behind the auth
/// middleware, so every handler runs for an authenticated caller. Edit rights
/// (author or "Admin") are checked by the service on the form/confirmation
/// GETs only.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET/POST /articles/create
        // Empty form, then submission. The author is taken from the caller.
        .route(
            "/articles/create",
            get(handlers::get_create_form).post(handlers::create_article),
        )
        // GET /articles/edit?id=...  POST /articles/edit
        // Edit form (author or admin), then submission of id/title/content.
        .route(
            "/articles/edit",
            get(handlers::get_edit_form).post(handlers::edit_article),
        )
        // GET/POST /articles/delete?id=...
        // Confirmation view (author or admin), then permanent deletion.
        .route(
            "/articles/delete",
            get(handlers::get_delete_confirmation).post(handlers::delete_article),
        )
}
