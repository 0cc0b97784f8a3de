use std::sync::Arc;

use chrono::Utc;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

use yatube_core::domain::{Group, NewPost, Post, PostDraft, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, GroupRepository, PostRepository, UserRepository};

use crate::database::entity::{group, post, user};
use crate::database::postgres_base::map_db_err;
use crate::database::postgres_repo::{
    PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};

fn post_model(id: i64, text: &str, group_id: Option<i64>) -> post::Model {
    post::Model {
        id,
        text: text.to_owned(),
        pub_date: Utc::now().into(),
        author_id: 1,
        group_id,
    }
}

#[tokio::test]
async fn test_find_post_by_id() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(42, "Тестовый пост", Some(3))]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);

    let result: Option<Post> = repo.find_by_id(42).await.unwrap();

    let post = result.unwrap();
    assert_eq!(post.id, 42);
    assert_eq!(post.text, "Тестовый пост");
    assert_eq!(post.group_id, Some(3));
}

#[tokio::test]
async fn test_create_post_returns_stored_row() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_model(1, "Новый пост", Some(2))]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let draft = PostDraft::new("Новый пост", Some(2));

    let post = repo.create(NewPost::new(1, draft)).await.unwrap();

    assert_eq!(post.id, 1);
    assert_eq!(post.author_id, 1);
    assert_eq!(post.group_id, Some(2));
}

#[tokio::test]
async fn test_update_post_changes_text_and_group() {
    let before = post_model(5, "old", Some(1));
    let mut after = before.clone();
    after.text = "new".to_owned();
    after.group_id = None;

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![before.clone()], vec![after]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = repo.update(5, PostDraft::new("new", None)).await.unwrap();

    assert_eq!(post.text, "new");
    assert_eq!(post.group_id, None);
    assert_eq!(post.pub_date, chrono::DateTime::<Utc>::from(before.pub_date));
}

#[tokio::test]
async fn test_update_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let err = repo.update(99, PostDraft::new("x", None)).await.unwrap_err();

    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn test_find_user_by_username() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user::Model {
            id: 1,
            username: "UserTest".to_owned(),
            password_hash: "hash".to_owned(),
            is_staff: false,
            date_joined: Utc::now().into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let user: User = repo.find_by_username("UserTest").await.unwrap().unwrap();

    assert_eq!(user.id, 1);
    assert!(!user.is_staff);
}

#[tokio::test]
async fn test_find_group_by_slug() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![group::Model {
            id: 3,
            title: "Тестовая группа".to_owned(),
            slug: "test-slug".to_owned(),
            description: "Описание тестовой группы".to_owned(),
        }]])
        .into_connection();

    let repo = PostgresGroupRepository::new(db);
    let group: Group = repo.find_by_slug("test-slug").await.unwrap().unwrap();

    assert_eq!(group.id, 3);
    assert_eq!(group.to_string(), "Тестовая группа");
}

#[tokio::test]
async fn test_repositories_share_one_pool() {
    let db = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![group::Model {
                id: 3,
                title: "Тестовая группа".to_owned(),
                slug: "test-slug".to_owned(),
                description: String::new(),
            }]])
            .append_query_results(vec![vec![user::Model {
                id: 1,
                username: "UserTest".to_owned(),
                password_hash: "hash".to_owned(),
                is_staff: true,
                date_joined: Utc::now().into(),
            }]])
            .into_connection(),
    );

    let groups = PostgresGroupRepository::new(Arc::clone(&db));
    let users = PostgresUserRepository::new(Arc::clone(&db));

    let group = groups.find_by_slug("test-slug").await.unwrap().unwrap();
    let user = users.find_by_username("UserTest").await.unwrap().unwrap();

    assert_eq!(group.id, 3);
    assert!(user.is_staff);
    assert_eq!(Arc::strong_count(&db), 3);
}

#[test]
fn test_db_errors_are_classified() {
    let err = map_db_err(DbErr::RecordNotFound("posts".to_owned()));
    assert!(matches!(err, RepoError::NotFound));

    let err = map_db_err(DbErr::Conn(sea_orm::RuntimeErr::Internal("refused".to_owned())));
    assert!(matches!(err, RepoError::Connection(_)));

    let err = map_db_err(DbErr::Custom("syntax error".to_owned()));
    assert!(matches!(err, RepoError::Query(_)));
}
