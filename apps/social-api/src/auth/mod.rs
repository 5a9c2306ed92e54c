pub mod credentials;
pub mod middleware;
pub mod ownership;
pub mod password;
pub mod tokens;
