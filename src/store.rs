use crate::models::{Article, Author, NewArticle, User};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by every store operation. None of them are retried.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx (connection, query or constraint failure).
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The article disappeared between lookup and write.
    #[error("article {0} not found")]
    ArticleNotFound(i32),

    /// A write referenced a row that does not exist.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// The backend could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// ArticleStore Trait
///
/// Persistence gateway for articles and the users that own them. Each call is
/// self-contained: it acquires whatever backend resource it needs and releases
/// it before returning, on success and on error alike.
///
/// **Send + Sync + async_trait** make `Arc<dyn ArticleStore>` shareable across
/// Axum's request tasks.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Article without its author.
    async fn find(&self, id: i32) -> Result<Option<Article>, StoreError>;
    /// Article with `author` populated.
    async fn find_with_author(&self, id: i32) -> Result<Option<Article>, StoreError>;
    /// Every article with `author` populated, in the backend's natural order.
    async fn list_all_with_authors(&self) -> Result<Vec<Article>, StoreError>;
    /// Persists a new article and returns it with its assigned id.
    async fn insert(&self, article: NewArticle) -> Result<Article, StoreError>;
    /// Overwrites title and content. The author is never touched.
    async fn update(&self, article: &Article) -> Result<(), StoreError>;
    /// Permanently deletes the article.
    async fn remove(&self, article: &Article) -> Result<(), StoreError>;
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, StoreError>;
}

/// ArticleStoreState
///
/// The concrete type used to share the store across the application state.
pub type ArticleStoreState = Arc<dyn ArticleStore>;

// --- Postgres ---

#[derive(Debug, FromRow)]
struct ArticleRow {
    id: i32,
    title: String,
    content: String,
    author_id: Uuid,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            author_id: row.author_id,
            author: None,
        }
    }
}

/// Article joined with `users.user_name`.
#[derive(Debug, FromRow)]
struct ArticleAuthorRow {
    id: i32,
    title: String,
    content: String,
    author_id: Uuid,
    author_user_name: String,
}

impl From<ArticleAuthorRow> for Article {
    fn from(row: ArticleAuthorRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            author_id: row.author_id,
            author: Some(Author {
                id: row.author_id,
                user_name: row.author_user_name,
            }),
        }
    }
}

/// PostgresArticleStore
///
/// `ArticleStore` backed by PostgreSQL. Reads hold a pooled connection for
/// the single query; writes run inside a transaction that is committed before
/// returning. Dropping either guard hands the connection back to the pool (and
/// rolls back an uncommitted transaction) on every error path.
pub struct PostgresArticleStore {
    pool: PgPool,
}

impl PostgresArticleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ArticleStore for PostgresArticleStore {
    async fn find(&self, id: i32) -> Result<Option<Article>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, ArticleRow>(
            "SELECT id, title, content, author_id FROM articles WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row.map(Article::from))
    }

    async fn find_with_author(&self, id: i32) -> Result<Option<Article>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query_as::<_, ArticleAuthorRow>(
            r#"
            SELECT a.id, a.title, a.content, a.author_id, u.user_name AS author_user_name
            FROM articles a
            JOIN users u ON u.id = a.author_id
            WHERE a.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(row.map(Article::from))
    }

    async fn list_all_with_authors(&self) -> Result<Vec<Article>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query_as::<_, ArticleAuthorRow>(
            r#"
            SELECT a.id, a.title, a.content, a.author_id, u.user_name AS author_user_name
            FROM articles a
            JOIN users u ON u.id = a.author_id
            "#,
        )
        .fetch_all(&mut *conn)
        .await?;
        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn insert(&self, article: NewArticle) -> Result<Article, StoreError> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, ArticleRow>(
            r#"
            INSERT INTO articles (title, content, author_id)
            VALUES ($1, $2, $3)
            RETURNING id, title, content, author_id
            "#,
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.author_id)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn update(&self, article: &Article) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("UPDATE articles SET title = $1, content = $2 WHERE id = $3")
            .bind(&article.title)
            .bind(&article.content)
            .bind(article.id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::ArticleNotFound(article.id));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn remove(&self, article: &Article) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM articles WHERE id = $1")
            .bind(article.id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::ArticleNotFound(article.id));
        }
        tx.commit().await?;
        Ok(())
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let user = sqlx::query_as::<_, User>(
            "SELECT id, user_name, roles FROM users WHERE user_name = $1",
        )
        .bind(name)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(user)
    }
}

// --- In-memory ---

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    articles: BTreeMap<i32, Article>,
    last_id: i32,
}

impl MemoryState {
    fn with_author(&self, article: &Article) -> Option<Article> {
        // Inner-join semantics: an article whose author is gone is not listed.
        let user = self.users.iter().find(|u| u.id == article.author_id)?;
        Some(Article {
            author: Some(Author::from(user)),
            ..article.clone()
        })
    }
}

/// InMemoryArticleStore
///
/// Process-local `ArticleStore` with the same observable semantics as the
/// Postgres store: sequential ids, author joins, and a foreign-key check on
/// insert. Backs the test suites.
pub struct InMemoryArticleStore {
    state: Mutex<MemoryState>,
    /// When true, every operation fails as if the backend were down.
    pub should_fail: bool,
}

impl Default for InMemoryArticleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryArticleStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            should_fail: false,
        }
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::new()
        }
    }

    /// Seeds a user, replacing any existing user with the same id.
    pub fn with_user(self, user: User) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.users.retain(|u| u.id != user.id);
            state.users.push(user);
        }
        self
    }

    /// Scoped access to the state for the duration of one operation.
    fn acquire(&self) -> Result<MutexGuard<'_, MemoryState>, StoreError> {
        if self.should_fail {
            return Err(StoreError::Unavailable("simulated outage".to_string()));
        }
        self.state
            .lock()
            .map_err(|_| StoreError::Unavailable("state lock poisoned".to_string()))
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn find(&self, id: i32) -> Result<Option<Article>, StoreError> {
        let state = self.acquire()?;
        Ok(state.articles.get(&id).cloned())
    }

    async fn find_with_author(&self, id: i32) -> Result<Option<Article>, StoreError> {
        let state = self.acquire()?;
        Ok(state.articles.get(&id).and_then(|a| state.with_author(a)))
    }

    async fn list_all_with_authors(&self) -> Result<Vec<Article>, StoreError> {
        let state = self.acquire()?;
        Ok(state
            .articles
            .values()
            .filter_map(|a| state.with_author(a))
            .collect())
    }

    async fn insert(&self, article: NewArticle) -> Result<Article, StoreError> {
        let mut state = self.acquire()?;
        if !state.users.iter().any(|u| u.id == article.author_id) {
            return Err(StoreError::Constraint(format!(
                "author {} does not exist",
                article.author_id
            )));
        }
        state.last_id += 1;
        let stored = Article {
            id: state.last_id,
            title: article.title,
            content: article.content,
            author_id: article.author_id,
            author: None,
        };
        state.articles.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, article: &Article) -> Result<(), StoreError> {
        let mut state = self.acquire()?;
        let stored = state
            .articles
            .get_mut(&article.id)
            .ok_or(StoreError::ArticleNotFound(article.id))?;
        stored.title = article.title.clone();
        stored.content = article.content.clone();
        Ok(())
    }

    async fn remove(&self, article: &Article) -> Result<(), StoreError> {
        let mut state = self.acquire()?;
        state
            .articles
            .remove(&article.id)
            .map(|_| ())
            .ok_or(StoreError::ArticleNotFound(article.id))
    }

    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>, StoreError> {
        let state = self.acquire()?;
        Ok(state.users.iter().find(|u| u.user_name == name).cloned())
    }
}
