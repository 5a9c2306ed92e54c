pub mod kv;
pub mod memory;
pub mod pg;
pub mod pool;
pub mod schema;

use async_trait::async_trait;
use social_common::{PostId, UserId};

use crate::error::ApiError;
use crate::models::post::{NewPost, Post, UpdatePost};
use crate::models::user::{NewUser, UpdateUser, User};

/// User account storage. The credential verifier only needs
/// [`find_by_username`](UserRepository::find_by_username); the rest backs the
/// user routes.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exact, case-sensitive match.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;
    async fn get(&self, id: UserId) -> Result<Option<User>, ApiError>;
    async fn list(&self) -> Result<Vec<User>, ApiError>;
    /// Fails with `409 CONFLICT` when the username is taken.
    async fn create(&self, user: NewUser) -> Result<User, ApiError>;
    async fn update(&self, id: UserId, changes: UpdateUser) -> Result<Option<User>, ApiError>;
    /// Deletes the user and their posts, returning the removed row.
    async fn delete(&self, id: UserId) -> Result<Option<User>, ApiError>;
}

/// Post storage. Every lookup is scoped to the owning user.
#[async_trait]
pub trait PostRepository: Send + Sync {
    async fn list_for_user(&self, user: UserId) -> Result<Vec<Post>, ApiError>;
    async fn get(&self, user: UserId, id: PostId) -> Result<Option<Post>, ApiError>;
    async fn create(&self, post: NewPost) -> Result<Post, ApiError>;
    async fn update(
        &self,
        user: UserId,
        id: PostId,
        changes: UpdatePost,
    ) -> Result<Option<Post>, ApiError>;
    async fn delete(&self, user: UserId, id: PostId) -> Result<Option<Post>, ApiError>;
}
