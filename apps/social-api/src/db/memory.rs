//! In-memory repositories for tests and local runs without PostgreSQL.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use social_common::{PostId, UserId};

use crate::db::{PostRepository, UserRepository};
use crate::error::ApiError;
use crate::models::post::{NewPost, Post, UpdatePost};
use crate::models::user::{NewUser, UpdateUser, User};

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, Post>,
}

/// Users and posts share one lock so deleting a user removes their posts
/// atomically, like the cascading foreign key does in PostgreSQL.
#[derive(Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn username_taken(&self, username: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.username == username && Some(u.id) != except)
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let tables = self.tables.lock();
        Ok(tables
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, ApiError> {
        Ok(self.tables.lock().users.get(&id.get()).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, ApiError> {
        Ok(self.tables.lock().users.values().cloned().collect())
    }

    async fn create(&self, user: NewUser) -> Result<User, ApiError> {
        let mut tables = self.tables.lock();
        if tables.username_taken(&user.username, None) {
            return Err(ApiError::conflict("Username is already taken"));
        }
        let now = Utc::now();
        let row = User {
            id: user.id,
            username: user.username,
            password_hash: user.password_hash,
            name: user.name,
            email: user.email,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(&self, id: UserId, changes: UpdateUser) -> Result<Option<User>, ApiError> {
        let mut tables = self.tables.lock();
        if let Some(ref username) = changes.username {
            if tables.username_taken(username, Some(id.get())) {
                return Err(ApiError::conflict("Username is already taken"));
            }
        }
        let Some(user) = tables.users.get_mut(&id.get()) else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            user.username = username;
        }
        if let Some(hash) = changes.password_hash {
            user.password_hash = hash;
        }
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        user.updated_at = changes.updated_at;
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<Option<User>, ApiError> {
        let mut tables = self.tables.lock();
        let removed = tables.users.remove(&id.get());
        if removed.is_some() {
            tables.posts.retain(|_, p| p.user_id != id.get());
        }
        Ok(removed)
    }
}

#[async_trait]
impl PostRepository for MemoryRepository {
    async fn list_for_user(&self, user: UserId) -> Result<Vec<Post>, ApiError> {
        Ok(self
            .tables
            .lock()
            .posts
            .values()
            .filter(|p| p.user_id == user.get())
            .cloned()
            .collect())
    }

    async fn get(&self, user: UserId, id: PostId) -> Result<Option<Post>, ApiError> {
        Ok(self
            .tables
            .lock()
            .posts
            .get(&id.get())
            .filter(|p| p.user_id == user.get())
            .cloned())
    }

    async fn create(&self, post: NewPost) -> Result<Post, ApiError> {
        let mut tables = self.tables.lock();
        if !tables.users.contains_key(&post.user_id) {
            return Err(ApiError::not_found("User not found"));
        }
        let now = Utc::now();
        let row = Post {
            id: post.id,
            user_id: post.user_id,
            content: post.content,
            likes: 0,
            created_at: now,
            updated_at: now,
        };
        tables.posts.insert(row.id, row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        user: UserId,
        id: PostId,
        changes: UpdatePost,
    ) -> Result<Option<Post>, ApiError> {
        let mut tables = self.tables.lock();
        let Some(post) = tables
            .posts
            .get_mut(&id.get())
            .filter(|p| p.user_id == user.get())
        else {
            return Ok(None);
        };
        if let Some(content) = changes.content {
            post.content = content;
        }
        if let Some(likes) = changes.likes {
            post.likes = likes;
        }
        post.updated_at = changes.updated_at;
        Ok(Some(post.clone()))
    }

    async fn delete(&self, user: UserId, id: PostId) -> Result<Option<Post>, ApiError> {
        let mut tables = self.tables.lock();
        let owned = tables
            .posts
            .get(&id.get())
            .is_some_and(|p| p.user_id == user.get());
        Ok(if owned {
            tables.posts.remove(&id.get())
        } else {
            None
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(id: i64, username: &str) -> NewUser {
        NewUser {
            id,
            username: username.to_string(),
            password_hash: "hash".to_string(),
            name: String::new(),
            email: String::new(),
        }
    }

    #[tokio::test]
    async fn username_lookup_is_case_sensitive() {
        let repo = MemoryRepository::new();
        UserRepository::create(&repo, new_user(1, "blink")).await.unwrap();

        assert!(repo.find_by_username("blink").await.unwrap().is_some());
        assert!(repo.find_by_username("Blink").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let repo = MemoryRepository::new();
        UserRepository::create(&repo, new_user(1, "blink")).await.unwrap();
        let err = UserRepository::create(&repo, new_user(2, "blink"))
            .await
            .unwrap_err();
        assert_eq!(err.code, "CONFLICT");
    }

    #[tokio::test]
    async fn deleting_user_removes_their_posts() {
        let repo = MemoryRepository::new();
        UserRepository::create(&repo, new_user(1, "a")).await.unwrap();
        UserRepository::create(&repo, new_user(2, "b")).await.unwrap();
        for (id, owner) in [(10, 1), (11, 2)] {
            PostRepository::create(
                &repo,
                NewPost {
                    id,
                    user_id: owner,
                    content: "hi".to_string(),
                },
            )
            .await
            .unwrap();
        }

        UserRepository::delete(&repo, UserId::new(1)).await.unwrap();

        assert!(repo.list_for_user(UserId::new(1)).await.unwrap().is_empty());
        assert_eq!(repo.list_for_user(UserId::new(2)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn posts_are_scoped_to_their_author() {
        let repo = MemoryRepository::new();
        UserRepository::create(&repo, new_user(1, "a")).await.unwrap();
        PostRepository::create(
            &repo,
            NewPost {
                id: 10,
                user_id: 1,
                content: "hi".to_string(),
            },
        )
        .await
        .unwrap();

        let other = UserId::new(2);
        assert!(PostRepository::get(&repo, other, PostId::new(10))
            .await
            .unwrap()
            .is_none());
        assert!(PostRepository::delete(&repo, other, PostId::new(10))
            .await
            .unwrap()
            .is_none());
        assert!(PostRepository::get(&repo, UserId::new(1), PostId::new(10))
            .await
            .unwrap()
            .is_some());
    }
}
