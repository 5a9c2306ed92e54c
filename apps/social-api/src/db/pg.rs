//! PostgreSQL repositories over the diesel-async pool.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use social_common::{PostId, UserId};

use crate::db::pool::DbPool;
use crate::db::schema::{posts, users};
use crate::db::{PostRepository, UserRepository};
use crate::error::ApiError;
use crate::models::post::{NewPost, Post, UpdatePost};
use crate::models::user::{NewUser, UpdateUser, User};

#[derive(Clone)]
pub struct PgRepository {
    pool: DbPool,
}

impl PgRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn username_conflict(err: DieselError) -> ApiError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ApiError::conflict("Username is already taken")
        }
        other => ApiError::from(other),
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let mut conn = self.pool.get().await?;

        let user = users::table
            .filter(users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(user)
    }

    async fn get(&self, id: UserId) -> Result<Option<User>, ApiError> {
        let mut conn = self.pool.get().await?;

        let user = users::table
            .find(id.get())
            .select(User::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, ApiError> {
        let mut conn = self.pool.get().await?;

        let list = users::table
            .order(users::id.asc())
            .select(User::as_select())
            .load(&mut conn)
            .await?;

        Ok(list)
    }

    async fn create(&self, user: NewUser) -> Result<User, ApiError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(users::table)
            .values(&user)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(username_conflict)
    }

    async fn update(&self, id: UserId, changes: UpdateUser) -> Result<Option<User>, ApiError> {
        let mut conn = self.pool.get().await?;

        diesel::update(users::table.find(id.get()))
            .set(&changes)
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(username_conflict)
    }

    async fn delete(&self, id: UserId) -> Result<Option<User>, ApiError> {
        let mut conn = self.pool.get().await?;

        // Posts go with the user via ON DELETE CASCADE.
        let user = diesel::delete(users::table.find(id.get()))
            .returning(User::as_returning())
            .get_result(&mut conn)
            .await
            .optional()?;

        Ok(user)
    }
}

#[async_trait]
impl PostRepository for PgRepository {
    async fn list_for_user(&self, user: UserId) -> Result<Vec<Post>, ApiError> {
        let mut conn = self.pool.get().await?;

        let list = posts::table
            .filter(posts::user_id.eq(user.get()))
            .order(posts::id.asc())
            .select(Post::as_select())
            .load(&mut conn)
            .await?;

        Ok(list)
    }

    async fn get(&self, user: UserId, id: PostId) -> Result<Option<Post>, ApiError> {
        let mut conn = self.pool.get().await?;

        let post = posts::table
            .filter(posts::id.eq(id.get()))
            .filter(posts::user_id.eq(user.get()))
            .select(Post::as_select())
            .first(&mut conn)
            .await
            .optional()?;

        Ok(post)
    }

    async fn create(&self, post: NewPost) -> Result<Post, ApiError> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(posts::table)
            .values(&post)
            .returning(Post::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|e| match e {
                // Author deleted while still holding a live session.
                DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                    ApiError::not_found("User not found")
                }
                other => ApiError::from(other),
            })
    }

    async fn update(
        &self,
        user: UserId,
        id: PostId,
        changes: UpdatePost,
    ) -> Result<Option<Post>, ApiError> {
        let mut conn = self.pool.get().await?;

        let post = diesel::update(
            posts::table
                .filter(posts::id.eq(id.get()))
                .filter(posts::user_id.eq(user.get())),
        )
        .set(&changes)
        .returning(Post::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?;

        Ok(post)
    }

    async fn delete(&self, user: UserId, id: PostId) -> Result<Option<Post>, ApiError> {
        let mut conn = self.pool.get().await?;

        let post = diesel::delete(
            posts::table
                .filter(posts::id.eq(id.get()))
                .filter(posts::user_id.eq(user.get())),
        )
        .returning(Post::as_returning())
        .get_result(&mut conn)
        .await
        .optional()?;

        Ok(post)
    }
}
