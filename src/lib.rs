use axum::{
    extract::{FromRef, Request},
    http::HeaderName,
    Router,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod service;
pub mod store;
pub mod validation;

// Routing segregation (Public, Authenticated).
pub mod routes;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use models::Principal;
pub use service::ArticleService;
pub use store::{ArticleStoreState, InMemoryArticleStore, PostgresArticleStore};

/// ApiDoc
///
/// OpenAPI document aggregated from the `#[utoipa::path]` handlers and the
/// `ToSchema` models, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::index, handlers::list_articles, handlers::get_article_details,
        handlers::get_create_form, handlers::create_article, handlers::get_edit_form,
        handlers::edit_article, handlers::get_delete_confirmation, handlers::delete_article
    ),
    components(
        schemas(
            models::Article, models::Author, models::ArticleInput, models::ArticleEditInput,
            models::ArticleEditForm, validation::FieldError, error::RejectedForm,
        )
    ),
    tags(
        (name = "blog", description = "Blog Article API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Shared, immutable container for the services every request needs.
#[derive(Clone)]
pub struct AppState {
    /// Persistence gateway (Postgres in production, in-memory in tests).
    pub store: ArticleStoreState,
    /// The loaded environment configuration.
    pub config: AppConfig,
}

impl AppState {
    pub fn new(store: ArticleStoreState, config: AppConfig) -> Self {
        Self { store, config }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for ArticleStoreState {
    fn from_ref(app_state: &AppState) -> ArticleStoreState {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for ArticleService {
    fn from_ref(app_state: &AppState) -> ArticleService {
        ArticleService::new(app_state.store.clone())
    }
}

/// auth_middleware
///
/// Rejects the request with 401 unless a `Principal` can be extracted; the
/// extractor does all the work.
async fn auth_middleware(_principal: Principal, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routes, applies the auth and observability layers, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                // Every request gets an x-request-id before it is traced.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one HTTP request, correlated by its `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
