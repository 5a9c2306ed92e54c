use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::posts;

#[derive(Debug, Clone, Queryable, Selectable, Serialize, ToSchema)]
#[diesel(table_name = posts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub likes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPost {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
}

#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = posts)]
pub struct UpdatePost {
    pub content: Option<String>,
    pub likes: Option<i32>,
    pub updated_at: DateTime<Utc>,
}
