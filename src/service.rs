//! Article controller logic.
//!
//! Every operation takes its caller identity as an explicit argument and
//! returns either the data for the view or an [`AppError`] outcome.
//!
//! `edit` and `delete_confirmed` mutate without re-running
//! [`is_authorized_to_edit`]; only the form/confirmation steps check it.

use crate::{
    error::{AppError, RejectedForm},
    models::{Article, ArticleEditForm, ArticleEditInput, ArticleInput, Author, NewArticle, Principal},
    store::{ArticleStoreState, StoreError},
    validation::{FieldError, validate_article},
};

/// True iff the principal is an admin or the article's author.
pub fn is_authorized_to_edit(article: &Article, principal: &Principal) -> bool {
    principal.is_admin() || article.is_author(&principal.name)
}

/// ArticleService
///
/// Cheap to clone: it only holds the shared store handle.
#[derive(Clone)]
pub struct ArticleService {
    store: ArticleStoreState,
}

impl ArticleService {
    pub fn new(store: ArticleStoreState) -> Self {
        Self { store }
    }

    /// All articles with their authors. Public.
    pub async fn list(&self) -> Result<Vec<Article>, AppError> {
        Ok(self.store.list_all_with_authors().await?)
    }

    /// One article with its author. Public.
    pub async fn get_details(&self, id: Option<i32>) -> Result<Article, AppError> {
        let id = require_id(id)?;
        self.store
            .find_with_author(id)
            .await?
            .ok_or_else(|| AppError::article_not_found(id))
    }

    /// The blank create form.
    pub fn create_form(&self) -> ArticleInput {
        ArticleInput::default()
    }

    /// Validates the form, resolves the author from `principal_name` and
    /// persists the article.
    pub async fn create(&self, principal_name: &str, input: ArticleInput) -> Result<Article, AppError> {
        let fields = validate_article(&input)
            .map_err(|errors| AppError::Validation(RejectedForm::new(&input, errors)))?;

        let Some(author) = self.store.find_user_by_name(principal_name).await? else {
            tracing::warn!(principal = %principal_name, "author resolution failed");
            return Err(AppError::Validation(RejectedForm::new(
                &input,
                vec![FieldError::form("The current user could not be resolved to an author.")],
            )));
        };

        let mut article = self
            .store
            .insert(NewArticle {
                title: fields.title,
                content: fields.content,
                author_id: author.id,
            })
            .await?;
        article.author = Some(Author::from(&author));

        tracing::info!(article_id = article.id, author = %author.user_name, "article created");
        Ok(article)
    }

    /// The editable projection of an article, for its author or an admin.
    pub async fn get_edit_form(
        &self,
        id: Option<i32>,
        principal: &Principal,
    ) -> Result<ArticleEditForm, AppError> {
        let article = self.authorized_article(id, principal).await?;
        Ok(ArticleEditForm::from(article))
    }

    /// Overwrites title and content of an existing article.
    pub async fn edit(&self, input: ArticleEditInput) -> Result<Article, AppError> {
        let fields = validate_article(&input.fields())
            .map_err(|errors| AppError::Validation(RejectedForm::new(&input, errors)))?;

        let mut article = self
            .store
            .find(input.id)
            .await?
            .ok_or_else(|| AppError::article_not_found(input.id))?;

        article.title = fields.title;
        article.content = fields.content;

        match self.store.update(&article).await {
            Ok(()) => {}
            Err(StoreError::ArticleNotFound(id)) => return Err(AppError::article_not_found(id)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(article_id = article.id, "article edited");
        Ok(article)
    }

    /// The full article shown before deletion, for its author or an admin.
    pub async fn get_delete_confirmation(
        &self,
        id: Option<i32>,
        principal: &Principal,
    ) -> Result<Article, AppError> {
        self.authorized_article(id, principal).await
    }

    /// Permanently removes an article.
    pub async fn delete_confirmed(&self, id: Option<i32>) -> Result<(), AppError> {
        let id = require_id(id)?;
        let article = self
            .store
            .find(id)
            .await?
            .ok_or_else(|| AppError::article_not_found(id))?;

        match self.store.remove(&article).await {
            Ok(()) => {}
            Err(StoreError::ArticleNotFound(id)) => return Err(AppError::article_not_found(id)),
            Err(e) => return Err(e.into()),
        }

        tracing::info!(article_id = id, "article deleted");
        Ok(())
    }

    async fn authorized_article(
        &self,
        id: Option<i32>,
        principal: &Principal,
    ) -> Result<Article, AppError> {
        let id = require_id(id)?;
        let article = self
            .store
            .find_with_author(id)
            .await?
            .ok_or_else(|| AppError::article_not_found(id))?;

        if !is_authorized_to_edit(&article, principal) {
            tracing::warn!(article_id = id, principal = %principal.name, "edit rights refused");
            return Err(AppError::Forbidden);
        }
        Ok(article)
    }
}

fn require_id(id: Option<i32>) -> Result<i32, AppError> {
    id.ok_or_else(|| AppError::BadRequest("An article id is required".to_string()))
}
