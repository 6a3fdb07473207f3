use crate::{
    error::{AppError, RejectedForm},
    models::{Article, ArticleEditForm, ArticleEditInput, ArticleInput, Principal},
    service::ArticleService,
};
use axum::{
    Json,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;

/// Where successful mutations send the client.
pub const INDEX_PATH: &str = "/articles";
pub const LIST_PATH: &str = "/articles/list";

// --- Filter Structs ---

/// ArticleIdQuery
///
/// `?id=` parameter. Left optional so that a missing id reaches the service
/// and is answered with 400.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct ArticleIdQuery {
    /// Article ID.
    pub id: Option<i32>,
}

// --- Handlers ---

/// index
///
/// [Public Route] Redirects to the article list.
#[utoipa::path(
    get,
    path = "/articles",
    responses((status = 303, description = "Redirect to /articles/list"))
)]
pub async fn index() -> Redirect {
    Redirect::to(LIST_PATH)
}

/// list_articles
///
/// [Public Route] Every article with its author. No filtering or paging.
#[utoipa::path(
    get,
    path = "/articles/list",
    responses((status = 200, description = "All articles", body = [Article]))
)]
pub async fn list_articles(
    State(articles): State<ArticleService>,
) -> Result<Json<Vec<Article>>, AppError> {
    Ok(Json(articles.list().await?))
}

/// get_article_details
///
/// [Public Route] A single article with its author.
#[utoipa::path(
    get,
    path = "/articles/details",
    params(ArticleIdQuery),
    responses(
        (status = 200, description = "Found", body = Article),
        (status = 400, description = "Missing id"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_article_details(
    State(articles): State<ArticleService>,
    Query(query): Query<ArticleIdQuery>,
) -> Result<Json<Article>, AppError> {
    Ok(Json(articles.get_details(query.id).await?))
}

/// get_create_form
///
/// [Authenticated Route] The empty create form.
#[utoipa::path(
    get,
    path = "/articles/create",
    responses((status = 200, description = "Empty form", body = ArticleInput))
)]
pub async fn get_create_form(
    _principal: Principal,
    State(articles): State<ArticleService>,
) -> Json<ArticleInput> {
    Json(articles.create_form())
}

/// create_article
///
/// [Authenticated Route] Submits a new article. The author is always the
/// authenticated caller.
#[utoipa::path(
    post,
    path = "/articles/create",
    request_body = ArticleInput,
    responses(
        (status = 303, description = "Created, redirect to the index"),
        (status = 422, description = "Invalid form", body = RejectedForm)
    )
)]
pub async fn create_article(
    principal: Principal,
    State(articles): State<ArticleService>,
    Json(payload): Json<ArticleInput>,
) -> Result<Redirect, AppError> {
    articles.create(&principal.name, payload).await?;
    Ok(Redirect::to(INDEX_PATH))
}

/// get_edit_form
///
/// [Authenticated Route] The editable fields of an article.
///
/// *Authorization*: author or "Admin" only.
#[utoipa::path(
    get,
    path = "/articles/edit",
    params(ArticleIdQuery),
    responses(
        (status = 200, description = "Edit form", body = ArticleEditForm),
        (status = 400, description = "Missing id"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_edit_form(
    principal: Principal,
    State(articles): State<ArticleService>,
    Query(query): Query<ArticleIdQuery>,
) -> Result<Json<ArticleEditForm>, AppError> {
    Ok(Json(articles.get_edit_form(query.id, &principal).await?))
}

/// edit_article
///
/// [Authenticated Route] Overwrites title and content.
///
/// *Note*: authentication is enforced by the router layer, but edit rights
/// are only checked when the form is fetched.
#[utoipa::path(
    post,
    path = "/articles/edit",
    request_body = ArticleEditInput,
    responses(
        (status = 303, description = "Edited, redirect to the index"),
        (status = 404, description = "Not Found"),
        (status = 422, description = "Invalid form", body = RejectedForm)
    )
)]
pub async fn edit_article(
    State(articles): State<ArticleService>,
    Json(payload): Json<ArticleEditInput>,
) -> Result<Redirect, AppError> {
    articles.edit(payload).await?;
    Ok(Redirect::to(INDEX_PATH))
}

/// get_delete_confirmation
///
/// [Authenticated Route] The full article, shown before deletion.
///
/// *Authorization*: author or "Admin" only.
#[utoipa::path(
    get,
    path = "/articles/delete",
    params(ArticleIdQuery),
    responses(
        (status = 200, description = "Article to delete", body = Article),
        (status = 400, description = "Missing id"),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_delete_confirmation(
    principal: Principal,
    State(articles): State<ArticleService>,
    Query(query): Query<ArticleIdQuery>,
) -> Result<Json<Article>, AppError> {
    Ok(Json(articles.get_delete_confirmation(query.id, &principal).await?))
}

/// delete_article
///
/// [Authenticated Route] Permanently deletes an article. Like `edit_article`,
/// edit rights are not re-checked here.
#[utoipa::path(
    post,
    path = "/articles/delete",
    params(ArticleIdQuery),
    responses(
        (status = 303, description = "Deleted, redirect to the index"),
        (status = 400, description = "Missing id"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_article(
    State(articles): State<ArticleService>,
    Query(query): Query<ArticleIdQuery>,
) -> Result<Redirect, AppError> {
    articles.delete_confirmed(query.id).await?;
    Ok(Redirect::to(INDEX_PATH))
}
