//! In-memory store - used when no database is configured, and in tests.
//!
//! The three repositories share one [`InMemoryStore`] so that foreign keys,
//! unique columns and delete rules behave like the PostgreSQL schema.
//! Data is lost on process restart.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use yatube_core::domain::{
    Group, NewGroup, NewPost, NewUser, Page, PageRequest, Post, PostDraft, PostFilter, User,
};
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, GroupRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    groups: BTreeMap<i64, Group>,
    posts: BTreeMap<i64, Post>,
    next_user_id: i64,
    next_group_id: i64,
    next_post_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl Tables {
    fn check_group(&self, group_id: Option<i64>) -> Result<(), RepoError> {
        match group_id {
            Some(id) if !self.groups.contains_key(&id) => Err(RepoError::Constraint(format!(
                "group {id} does not exist"
            ))),
            _ => Ok(()),
        }
    }
}

/// Shared tables behind an async lock.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository {
            store: self.clone(),
        }
    }

    pub fn groups(&self) -> InMemoryGroupRepository {
        InMemoryGroupRepository {
            store: self.clone(),
        }
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository {
            store: self.clone(),
        }
    }
}

/// In-memory user repository.
pub struct InMemoryUserRepository {
    store: InMemoryStore,
}

/// In-memory group repository.
pub struct InMemoryGroupRepository {
    store: InMemoryStore,
}

/// In-memory post repository.
pub struct InMemoryPostRepository {
    store: InMemoryStore,
}

#[async_trait]
impl BaseRepository<User, i64> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        Ok(self.store.tables.read().await.users.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.users.remove(&id).ok_or(RepoError::NotFound)?;
        // posts.author_id ON DELETE CASCADE
        tables.posts.retain(|_, post| post.author_id != id);
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.tables.read().await.users.len() as u64)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(&self, new_user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.store.tables.write().await;
        if tables.users.values().any(|u| u.username == new_user.username) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        let user = User {
            id: next_id(&mut tables.next_user_id),
            username: new_user.username,
            password_hash: new_user.password_hash,
            is_staff: new_user.is_staff,
            date_joined: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl BaseRepository<Group, i64> for InMemoryGroupRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, RepoError> {
        Ok(self.store.tables.read().await.groups.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.groups.remove(&id).ok_or(RepoError::NotFound)?;
        // posts.group_id ON DELETE SET NULL
        for post in tables.posts.values_mut() {
            if post.group_id == Some(id) {
                post.group_id = None;
            }
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.tables.read().await.groups.len() as u64)
    }
}

#[async_trait]
impl GroupRepository for InMemoryGroupRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.groups.values().find(|g| g.slug == slug).cloned())
    }

    async fn create(&self, new_group: NewGroup) -> Result<Group, RepoError> {
        let mut tables = self.store.tables.write().await;
        if tables.groups.values().any(|g| g.slug == new_group.slug) {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        let group = Group {
            id: next_id(&mut tables.next_group_id),
            title: new_group.title,
            slug: new_group.slug,
            description: new_group.description,
        };
        tables.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn list(&self) -> Result<Vec<Group>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut groups: Vec<Group> = tables.groups.values().cloned().collect();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.store.tables.read().await.posts.get(&id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.posts.remove(&id).ok_or(RepoError::NotFound)?;
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.store.tables.read().await.posts.len() as u64)
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;
        if !tables.users.contains_key(&new_post.author_id) {
            return Err(RepoError::Constraint(format!(
                "user {} does not exist",
                new_post.author_id
            )));
        }
        tables.check_group(new_post.group_id)?;

        let post = Post {
            id: next_id(&mut tables.next_post_id),
            text: new_post.text,
            pub_date: Utc::now(),
            author_id: new_post.author_id,
            group_id: new_post.group_id,
        };
        tables.posts.insert(post.id, post.clone());
        tracing::debug!(post_id = post.id, author_id = post.author_id, "Post created");
        Ok(post)
    }

    async fn update(&self, id: i64, draft: PostDraft) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;
        tables.check_group(draft.group_id)?;

        let post = tables.posts.get_mut(&id).ok_or(RepoError::NotFound)?;
        post.text = draft.text;
        post.group_id = draft.group_id;
        Ok(post.clone())
    }

    async fn page(
        &self,
        filter: PostFilter,
        request: PageRequest,
    ) -> Result<Page<Post>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut matching: Vec<&Post> = tables
            .posts
            .values()
            .filter(|post| filter.matches(post))
            .collect();
        matching.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let number = request.resolve(total);
        let items = matching
            .into_iter()
            .skip(request.offset(number) as usize)
            .take(request.per_page as usize)
            .cloned()
            .collect();

        Ok(Page::new(items, number, request.per_page, total))
    }

    async fn count_by_author(&self, author_id: i64) -> Result<u64, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .posts
            .values()
            .filter(|post| post.author_id == author_id)
            .count() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded() -> (InMemoryStore, User, Group) {
        let store = InMemoryStore::new();
        let user = store
            .users()
            .create(NewUser::new("UserTest", "hash"))
            .await
            .unwrap();
        let group = store
            .groups()
            .create(NewGroup::new("Тестовая группа", "test-slug", "Описание"))
            .await
            .unwrap();
        (store, user, group)
    }

    #[tokio::test]
    async fn test_unique_slug_and_username() {
        let (store, _, _) = seeded().await;

        let err = store
            .groups()
            .create(NewGroup::new("Other", "test-slug", "Other"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));

        let err = store
            .users()
            .create(NewUser::new("UserTest", "hash"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn test_post_foreign_keys_are_checked() {
        let (store, user, _) = seeded().await;
        let posts = store.posts();

        let err = posts
            .create(NewPost::new(user.id, PostDraft::new("text", Some(999))))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));

        let err = posts
            .create(NewPost::new(999, PostDraft::new("text", None)))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
        assert_eq!(posts.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_listing_is_newest_first() {
        let (store, user, group) = seeded().await;
        let posts = store.posts();
        for text in ["first", "second", "third"] {
            posts
                .create(NewPost::new(user.id, PostDraft::new(text, Some(group.id))))
                .await
                .unwrap();
        }

        let page = posts
            .page(PostFilter::Group(group.id), PageRequest::new(1, 10))
            .await
            .unwrap();
        let texts: Vec<_> = page.items.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_page_past_the_end_serves_last_page() {
        let (store, user, _) = seeded().await;
        let posts = store.posts();
        for i in 0..13 {
            posts
                .create(NewPost::new(user.id, PostDraft::new(&format!("post {i}"), None)))
                .await
                .unwrap();
        }

        let page = posts
            .page(PostFilter::All, PageRequest::new(7, 10))
            .await
            .unwrap();
        assert_eq!(page.number, 2);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total, 13);
        assert_eq!(page.items.last().unwrap().text, "post 0");
    }

    #[tokio::test]
    async fn test_update_keeps_author_and_date() {
        let (store, user, group) = seeded().await;
        let posts = store.posts();
        let post = posts
            .create(NewPost::new(user.id, PostDraft::new("old", Some(group.id))))
            .await
            .unwrap();

        let updated = posts
            .update(post.id, PostDraft::new("new", None))
            .await
            .unwrap();
        assert_eq!(updated.text, "new");
        assert_eq!(updated.group_id, None);
        assert_eq!(updated.pub_date, post.pub_date);
        assert_eq!(updated.author_id, user.id);
        assert_eq!(posts.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deleting_group_clears_post_group() {
        let (store, user, group) = seeded().await;
        let post = store
            .posts()
            .create(NewPost::new(user.id, PostDraft::new("text", Some(group.id))))
            .await
            .unwrap();

        store.groups().delete(group.id).await.unwrap();

        let post = store.posts().find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(post.group_id, None);
    }

    #[tokio::test]
    async fn test_deleting_user_deletes_their_posts() {
        let (store, user, _) = seeded().await;
        let other = store
            .users()
            .create(NewUser::new("other", "hash"))
            .await
            .unwrap();
        store
            .posts()
            .create(NewPost::new(user.id, PostDraft::new("mine", None)))
            .await
            .unwrap();
        store
            .posts()
            .create(NewPost::new(other.id, PostDraft::new("theirs", None)))
            .await
            .unwrap();

        store.users().delete(user.id).await.unwrap();

        assert_eq!(store.posts().count().await.unwrap(), 1);
        assert_eq!(store.posts().count_by_author(other.id).await.unwrap(), 1);
    }
}
