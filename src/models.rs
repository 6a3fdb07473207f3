use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

/// Role name that grants edit and delete rights over every article.
pub const ADMIN_ROLE: &str = "Admin";

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Identity record stored in the `users` table. The blog only reads it: the
/// identity subsystem owns creation, passwords and sessions.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    // Matched against the principal name during author resolution.
    pub user_name: String,
    pub roles: Vec<String>,
}

/// Author
///
/// Display projection of the User owning an article, loaded through a join.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Author {
    pub id: Uuid,
    pub user_name: String,
}

impl From<&User> for Author {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.clone(),
        }
    }
}

/// Article
///
/// A blog post from the `articles` table. `id` is assigned by the store and
/// `author_id` is fixed at creation; only `title` and `content` ever change.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Article {
    pub id: i32,
    pub title: String,
    pub content: String,
    // FK to users.id.
    pub author_id: Uuid,
    /// Present only when the store loaded the author eagerly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
}

impl Article {
    /// True when `user_name` names the loaded author of this article.
    pub fn is_author(&self, user_name: &str) -> bool {
        self.author
            .as_ref()
            .is_some_and(|author| author.user_name == user_name)
    }
}

/// NewArticle
///
/// Validated insert payload. The author id always comes from author
/// resolution, never from the client.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
}

/// Principal
///
/// The authenticated caller of a single request. Passed explicitly into every
/// service operation that needs it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Principal {
    pub name: String,
    pub roles: Vec<String>,
}

impl Principal {
    pub fn new(name: impl Into<String>, roles: Vec<String>) -> Self {
        Self {
            name: name.into(),
            roles,
        }
    }

    pub fn is_in_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.is_in_role(ADMIN_ROLE)
    }
}

// --- Request Payloads (Input Schemas) ---

/// ArticleInput
///
/// Submitted create form (POST /articles/create). Both fields are optional on
/// the wire so that a missing value is reported as a field error instead of a
/// deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct ArticleInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// ArticleEditInput
///
/// Submitted edit form (POST /articles/edit). A missing `id` binds as 0, which
/// never matches a stored article.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct ArticleEditInput {
    #[serde(default)]
    pub id: i32,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ArticleEditInput {
    /// The title/content part of the form, validated with the create rules.
    pub fn fields(&self) -> ArticleInput {
        ArticleInput {
            title: self.title.clone(),
            content: self.content.clone(),
        }
    }
}

// --- View Schemas (Output) ---

/// ArticleEditForm
///
/// Edit view projection: id, title and content only.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct ArticleEditForm {
    pub id: i32,
    pub title: String,
    pub content: String,
}

impl From<Article> for ArticleEditForm {
    fn from(article: Article) -> Self {
        Self {
            id: article.id,
            title: article.title,
            content: article.content,
        }
    }
}
