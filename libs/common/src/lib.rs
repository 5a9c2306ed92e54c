pub mod id;
pub mod snowflake;

pub use id::{ParseIdError, PostId, UserId};
pub use snowflake::SnowflakeGenerator;
