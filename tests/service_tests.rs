use blog_portal::{
    AppError, ArticleService, InMemoryArticleStore, Principal,
    models::{ADMIN_ROLE, Article, ArticleEditInput, ArticleInput, Author, User},
    service::is_authorized_to_edit,
    store::{ArticleStore, ArticleStoreState},
};
use std::sync::Arc;
use uuid::Uuid;

// --- TEST UTILITIES ---

const ALICE_ID: Uuid = Uuid::from_u128(1);
const BOB_ID: Uuid = Uuid::from_u128(2);
const ROOT_ID: Uuid = Uuid::from_u128(3);

fn user(id: Uuid, name: &str, roles: &[&str]) -> User {
    User {
        id,
        user_name: name.to_string(),
        roles: roles.iter().map(|r| r.to_string()).collect(),
    }
}

fn seeded_store() -> Arc<InMemoryArticleStore> {
    Arc::new(
        InMemoryArticleStore::new()
            .with_user(user(ALICE_ID, "alice", &[]))
            .with_user(user(BOB_ID, "bob", &[]))
            .with_user(user(ROOT_ID, "root", &[ADMIN_ROLE])),
    )
}

fn service(store: &Arc<InMemoryArticleStore>) -> ArticleService {
    ArticleService::new(store.clone() as ArticleStoreState)
}

fn alice() -> Principal {
    Principal::new("alice", vec![])
}
fn bob() -> Principal {
    Principal::new("bob", vec![])
}
fn root() -> Principal {
    Principal::new("root", vec![ADMIN_ROLE.to_string()])
}

fn input(title: &str, content: &str) -> ArticleInput {
    ArticleInput {
        title: Some(title.to_string()),
        content: Some(content.to_string()),
    }
}

async fn create_as(service: &ArticleService, name: &str, title: &str) -> Article {
    service
        .create(name, input(title, "World"))
        .await
        .expect("create should succeed")
}

// --- AUTHORIZATION PREDICATE ---

fn article_by(author: &str) -> Article {
    Article {
        id: 1,
        title: "t".to_string(),
        content: "c".to_string(),
        author_id: ALICE_ID,
        author: Some(Author {
            id: ALICE_ID,
            user_name: author.to_string(),
        }),
    }
}

#[test]
fn test_authorized_admin_and_author() {
    let principal = Principal::new("alice", vec![ADMIN_ROLE.to_string()]);
    assert!(is_authorized_to_edit(&article_by("alice"), &principal));
}

#[test]
fn test_authorized_admin_not_author() {
    assert!(is_authorized_to_edit(&article_by("alice"), &root()));
}

#[test]
fn test_authorized_author_not_admin() {
    assert!(is_authorized_to_edit(&article_by("alice"), &alice()));
}

#[test]
fn test_refused_neither_admin_nor_author() {
    assert!(!is_authorized_to_edit(&article_by("alice"), &bob()));
}

#[test]
fn test_role_and_name_comparisons_are_exact() {
    let lowercase_admin = Principal::new("mallory", vec!["admin".to_string()]);
    assert!(!is_authorized_to_edit(&article_by("alice"), &lowercase_admin));
    assert!(!is_authorized_to_edit(&article_by("alice"), &Principal::new("Alice", vec![])));
}

#[test]
fn test_article_without_loaded_author_only_admin() {
    let mut article = article_by("alice");
    article.author = None;
    assert!(!is_authorized_to_edit(&article, &alice()));
    assert!(is_authorized_to_edit(&article, &root()));
}

// --- CREATE ---

#[tokio::test]
async fn test_create_assigns_author_from_principal() {
    let store = seeded_store();
    let service = service(&store);

    let created = service.create("alice", input("Hello", "World")).await.unwrap();

    assert_eq!(created.author_id, ALICE_ID);
    assert_eq!(created.author.as_ref().map(|a| a.user_name.as_str()), Some("alice"));

    let stored = store.find(created.id).await.unwrap().unwrap();
    assert_eq!(stored.author_id, ALICE_ID);
    assert_eq!(stored.title, "Hello");
    assert_eq!(stored.content, "World");
}

#[tokio::test]
async fn test_create_ignores_client_supplied_author() {
    let store = seeded_store();
    let service = service(&store);

    let payload: ArticleInput = serde_json::from_value(serde_json::json!({
        "title": "Hijack",
        "content": "Body",
        "author_id": BOB_ID,
    }))
    .unwrap();

    let created = service.create("alice", payload).await.unwrap();
    assert_eq!(created.author_id, ALICE_ID);
}

#[tokio::test]
async fn test_create_assigns_fresh_ids() {
    let store = seeded_store();
    let service = service(&store);

    let first = create_as(&service, "alice", "One").await;
    let second = create_as(&service, "bob", "Two").await;

    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn test_create_title_length_boundary() {
    let store = seeded_store();
    let service = service(&store);

    let ok = service.create("alice", input(&"a".repeat(255), "body")).await;
    assert!(ok.is_ok());

    let too_long = service.create("alice", input(&"a".repeat(256), "body")).await;
    match too_long {
        Err(AppError::Validation(rejected)) => {
            assert_eq!(rejected.errors.len(), 1);
            assert_eq!(rejected.errors[0].field, "title");
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(store.list_all_with_authors().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_missing_content_echoes_form() {
    let store = seeded_store();
    let service = service(&store);

    let result = service
        .create(
            "alice",
            ArticleInput {
                title: Some("Only a title".to_string()),
                content: None,
            },
        )
        .await;

    match result {
        Err(AppError::Validation(rejected)) => {
            assert_eq!(rejected.form["title"], "Only a title");
            assert_eq!(rejected.errors[0].field, "content");
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_create_unknown_principal_rerenders() {
    let store = seeded_store();
    let service = service(&store);

    let result = service.create("mallory", input("Hello", "World")).await;

    match result {
        Err(AppError::Validation(rejected)) => {
            assert_eq!(rejected.errors.len(), 1);
            assert!(rejected.errors[0].field.is_empty());
        }
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert!(store.list_all_with_authors().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_form_is_empty() {
    let store = seeded_store();
    assert_eq!(service(&store).create_form(), ArticleInput::default());
}

// --- LIST & DETAILS ---

#[tokio::test]
async fn test_list_returns_every_article_with_author() {
    let store = seeded_store();
    let service = service(&store);
    create_as(&service, "alice", "One").await;
    create_as(&service, "bob", "Two").await;

    let articles = service.list().await.unwrap();

    assert_eq!(articles.len(), 2);
    assert!(articles.iter().all(|a| a.author.is_some()));
}

#[tokio::test]
async fn test_details_missing_id_is_bad_request() {
    let store = seeded_store();
    let result = service(&store).get_details(None).await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
}

#[tokio::test]
async fn test_details_unknown_id_is_not_found() {
    let store = seeded_store();
    let result = service(&store).get_details(Some(999_999)).await;
    match result {
        Err(AppError::NotFound(message)) => {
            assert_eq!(message, "Cannot find article with ID 999999");
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[tokio::test]
async fn test_details_returns_exact_record() {
    let store = seeded_store();
    let service = service(&store);
    create_as(&service, "alice", "One").await;
    let second = create_as(&service, "bob", "Two").await;

    let found = service.get_details(Some(second.id)).await.unwrap();

    assert_eq!(found, store.find_with_author(second.id).await.unwrap().unwrap());
    assert_eq!(found.title, "Two");
    assert_eq!(found.author.unwrap().user_name, "bob");
}

// --- EDIT ---

#[tokio::test]
async fn test_edit_form_forbidden_for_other_user() {
    let store = seeded_store();
    let service = service(&store);
    let article = create_as(&service, "alice", "Hello").await;
    assert_eq!(article.author_id, ALICE_ID);

    let result = service.get_edit_form(Some(article.id), &bob()).await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_edit_form_for_author_and_admin() {
    let store = seeded_store();
    let service = service(&store);
    let article = create_as(&service, "alice", "Hello").await;

    let form = service.get_edit_form(Some(article.id), &alice()).await.unwrap();
    assert_eq!(form.id, article.id);
    assert_eq!(form.title, "Hello");
    assert_eq!(form.content, "World");

    assert!(service.get_edit_form(Some(article.id), &root()).await.is_ok());
}

#[tokio::test]
async fn test_edit_form_id_checks() {
    let store = seeded_store();
    let service = service(&store);

    assert!(matches!(
        service.get_edit_form(None, &root()).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        service.get_edit_form(Some(42), &root()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_edit_changes_only_title_and_content() {
    let store = seeded_store();
    let service = service(&store);
    let article = create_as(&service, "alice", "Hello").await;

    let edited = service
        .edit(ArticleEditInput {
            id: article.id,
            title: Some("Hello again".to_string()),
            content: Some("New body".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(edited.id, article.id);
    assert_eq!(edited.author_id, ALICE_ID);

    let stored = store.find(article.id).await.unwrap().unwrap();
    assert_eq!(stored.id, article.id);
    assert_eq!(stored.author_id, ALICE_ID);
    assert_eq!(stored.title, "Hello again");
    assert_eq!(stored.content, "New body");
}

#[tokio::test]
async fn test_edit_validation_leaves_record_untouched() {
    let store = seeded_store();
    let service = service(&store);
    let article = create_as(&service, "alice", "Hello").await;

    let result = service
        .edit(ArticleEditInput {
            id: article.id,
            title: Some("x".repeat(256)),
            content: Some("New body".to_string()),
        })
        .await;

    match result {
        Err(AppError::Validation(rejected)) => assert_eq!(rejected.form["id"], article.id),
        other => panic!("expected validation failure, got {other:?}"),
    }
    let stored = store.find(article.id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Hello");
}

#[tokio::test]
async fn test_edit_unknown_article_is_not_found() {
    let store = seeded_store();
    let result = service(&store)
        .edit(ArticleEditInput {
            id: 999_999,
            title: Some("t".to_string()),
            content: Some("c".to_string()),
        })
        .await;
    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_edit_submit_does_not_recheck_authorization() {
    // Only the form step checks edit rights; the submit step trusts it.
    let store = seeded_store();
    let service = service(&store);
    let article = create_as(&service, "alice", "Hello").await;

    let result = service
        .edit(ArticleEditInput {
            id: article.id,
            title: Some("Changed".to_string()),
            content: Some("Changed".to_string()),
        })
        .await;

    assert!(result.is_ok());
}

// --- DELETE ---

#[tokio::test]
async fn test_delete_confirmation_forbidden_for_other_user() {
    let store = seeded_store();
    let service = service(&store);
    let article = create_as(&service, "alice", "Hello").await;

    let result = service.get_delete_confirmation(Some(article.id), &bob()).await;

    assert!(matches!(result, Err(AppError::Forbidden)));
}

#[tokio::test]
async fn test_admin_deletes_any_article() {
    let store = seeded_store();
    let service = service(&store);
    let article = create_as(&service, "alice", "Hello").await;

    let confirmation = service
        .get_delete_confirmation(Some(article.id), &root())
        .await
        .unwrap();
    assert_eq!(confirmation.author.as_ref().unwrap().user_name, "alice");

    service.delete_confirmed(Some(article.id)).await.unwrap();

    assert!(matches!(
        service.get_details(Some(article.id)).await,
        Err(AppError::NotFound(_))
    ));
    assert!(store.find(article.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_delete_confirmed_id_checks() {
    let store = seeded_store();
    let service = service(&store);

    assert!(matches!(
        service.delete_confirmed(None).await,
        Err(AppError::BadRequest(_))
    ));
    assert!(matches!(
        service.delete_confirmed(Some(7)).await,
        Err(AppError::NotFound(_))
    ));
}

// --- BACKEND FAILURE ---

#[tokio::test]
async fn test_store_failure_propagates() {
    let store = Arc::new(InMemoryArticleStore::new_failing());
    let service = service(&store);

    assert!(matches!(service.list().await, Err(AppError::Store(_))));
    assert!(matches!(
        service.get_details(Some(1)).await,
        Err(AppError::Store(_))
    ));
    assert!(matches!(
        service.create("alice", input("Hello", "World")).await,
        Err(AppError::Store(_))
    ));
}
