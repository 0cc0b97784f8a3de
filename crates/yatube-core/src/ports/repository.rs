use async_trait::async_trait;

use crate::domain::{
    Group, NewGroup, NewPost, NewUser, Page, PageRequest, Post, PostDraft, PostFilter, User,
};
use crate::error::RepoError;

/// Operations every table supports.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID, applying the schema's cascade rules.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;

    /// Total number of rows.
    async fn count(&self) -> Result<u64, RepoError>;
}

/// User accounts.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;

    /// Insert a user. A taken username is a `RepoError::Constraint`.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;
}

/// Groups, looked up by slug in URLs.
#[async_trait]
pub trait GroupRepository: BaseRepository<Group, i64> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError>;

    /// Insert a group. A taken slug is a `RepoError::Constraint`.
    async fn create(&self, group: NewGroup) -> Result<Group, RepoError>;

    /// All groups ordered by title.
    async fn list(&self) -> Result<Vec<Group>, RepoError>;
}

/// Posts, always listed newest first.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    /// Insert a post stamped with the current time.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Replace text and group of an existing post. `pub_date` and author never change.
    async fn update(&self, id: i64, draft: PostDraft) -> Result<Post, RepoError>;

    /// One page of the posts matching `filter`.
    async fn page(&self, filter: PostFilter, request: PageRequest)
    -> Result<Page<Post>, RepoError>;

    /// Number of posts written by a user.
    async fn count_by_author(&self, author_id: i64) -> Result<u64, RepoError>;
}
